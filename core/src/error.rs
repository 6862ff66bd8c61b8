//! # Error Handling
//!
//! Provides the unified `AppError` enum used across the workspace.

use derive_more::{Display, From};

/// The Global Error Enum.
///
/// Every pipeline condition is terminal for the current run. String errors
/// default to `General`.
#[derive(Debug, Display, From)]
pub enum AppError {
    /// Wrapper for standard IO errors.
    #[display("IO Error: {_0}")]
    Io(std::io::Error),

    /// A Reference names a Component that is not in the Component Table.
    #[from(ignore)]
    #[display("Unresolved reference '{identifier}' in {endpoint}")]
    UnresolvedReference {
        /// Label of the endpoint whose schema tree holds the reference.
        endpoint: String,
        /// The missing Component identifier.
        identifier: String,
    },

    /// A Component transitively references itself.
    #[from(ignore)]
    #[display("Reference cycle: {}", chain.join(" -> "))]
    ReferenceCycle {
        /// Component identifiers along the cycle, first and last equal.
        chain: Vec<String>,
    },

    /// An endpoint or mount names a Router that was never declared.
    #[from(ignore)]
    #[display("Dangling router '{router}' referenced by {referrer}")]
    DanglingRouter {
        /// The missing Router identifier.
        router: String,
        /// What referenced it (an endpoint label or a mount edge).
        referrer: String,
    },

    /// A Router participates in its own ancestry.
    #[from(ignore)]
    #[display("Router cycle: {}", chain.join(" -> "))]
    RouterCycle {
        /// Router identifiers along the cycle, first and last equal.
        chain: Vec<String>,
    },

    /// The extractor could not produce records.
    #[from(ignore)]
    #[display("Extraction failure: {_0}")]
    ExtractionFailure(String),

    /// Raw extracted text could not be converted into the typed model.
    #[from(ignore)]
    #[display("Tokenization failure: {_0}")]
    TokenizationFailure(String),

    /// The document could not be built, validated or written.
    #[from(ignore)]
    #[display("Generation failure: {_0}")]
    GenerationFailure(String),

    /// Generic errors.
    #[display("General Error: {_0}")]
    General(String),
}

/// Class of an [`AppError`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`AppError::Io`].
    Io,
    /// See [`AppError::UnresolvedReference`].
    UnresolvedReference,
    /// See [`AppError::ReferenceCycle`].
    ReferenceCycle,
    /// See [`AppError::DanglingRouter`].
    DanglingRouter,
    /// See [`AppError::RouterCycle`].
    RouterCycle,
    /// See [`AppError::ExtractionFailure`].
    ExtractionFailure,
    /// See [`AppError::TokenizationFailure`].
    TokenizationFailure,
    /// See [`AppError::GenerationFailure`].
    GenerationFailure,
    /// See [`AppError::General`].
    General,
}

impl AppError {
    /// Returns the class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Io(_) => ErrorKind::Io,
            AppError::UnresolvedReference { .. } => ErrorKind::UnresolvedReference,
            AppError::ReferenceCycle { .. } => ErrorKind::ReferenceCycle,
            AppError::DanglingRouter { .. } => ErrorKind::DanglingRouter,
            AppError::RouterCycle { .. } => ErrorKind::RouterCycle,
            AppError::ExtractionFailure(_) => ErrorKind::ExtractionFailure,
            AppError::TokenizationFailure(_) => ErrorKind::TokenizationFailure,
            AppError::GenerationFailure(_) => ErrorKind::GenerationFailure,
            AppError::General(_) => ErrorKind::General,
        }
    }
}

/// Manual implementation of the standard Error trait.
impl std::error::Error for AppError {}

/// Helper type alias for Result using AppError.
pub type AppResult<T> = Result<T, AppError>;
