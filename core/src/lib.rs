#![deny(missing_docs)]

//! # Apidoc Core
//!
//! Turns endpoint annotations scattered across a source tree into one OpenAPI
//! document: extract, bind schema references, tokenize, resolve router mounts,
//! reduce, generate.

/// Shared error types.
pub mod error;

/// Components, routers, endpoints and the document aggregate.
pub mod model;

/// Comment-annotation extraction.
pub mod extract;

/// Raw text to typed model.
pub mod token;

/// Schema reference binding and cycle detection.
pub mod reference;

/// Router mount chains and absolute paths.
pub mod topology;

/// Validity filtering, de-duplication and ordering.
pub mod reduce;

/// OpenAPI serialization.
pub mod generate;

/// Stage sequencing.
pub mod pipeline;

pub use error::{AppError, AppResult, ErrorKind};
pub use extract::AnnotationExtractor;
pub use generate::OpenApiGenerator;
pub use model::{Document, Endpoint, HttpMethod};
pub use pipeline::{
    App, Configuration, Extractor, Generator, PipelineContext, RunState, Stage, Tokenizer,
    OUTPUT_FILE, VERSION,
};
pub use reduce::Reducer;
pub use reference::ReferenceResolver;
pub use token::AnnotationTokenizer;
pub use topology::{normalize_path, TopologyResolver};
