#![deny(missing_docs)]

//! # Pipeline Orchestration
//!
//! Runs the stages strictly in order:
//!
//! `Start -> Extracted -> ReferencesResolved -> Tokenized -> TopologyResolved -> Reduced -> Generated`
//!
//! Any stage may instead move the run to `Aborted`, which is terminal. Nothing
//! is written unless every earlier stage succeeded, and the generator publishes
//! its output with a single rename.

use crate::error::{AppError, AppResult, ErrorKind};
use crate::extract::AnnotationExtractor;
use crate::generate::OpenApiGenerator;
use crate::model::{Document, ExtractionResult, TokenResult};
use crate::reduce::Reducer;
use crate::reference::ReferenceResolver;
use crate::token::AnnotationTokenizer;
use crate::topology::TopologyResolver;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// Fixed name of the generated document inside the output directory.
pub const OUTPUT_FILE: &str = "openapi.yaml";

/// Tool version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Options recognised by a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    /// Root of the scanned tree.
    pub source_dir: PathBuf,
    /// File carrying `@title`, `@version` and friends, relative to `source_dir`.
    pub main_file: PathBuf,
    /// Subtree scanned for endpoint blocks, relative to `source_dir`.
    pub endpoints_root: PathBuf,
    /// Destination directory of the generated document.
    pub output_dir: PathBuf,
    /// Report non-fatal diagnostics.
    pub verbose: bool,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("."),
            main_file: PathBuf::new(),
            endpoints_root: PathBuf::from("."),
            output_dir: PathBuf::from("docs"),
            verbose: false,
        }
    }
}

impl Configuration {
    /// Full path of the generated document.
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(OUTPUT_FILE)
    }
}

/// Produces raw records from the source tree.
pub trait Extractor {
    /// Runs extraction.
    fn extract(&self) -> AppResult<ExtractionResult>;
}

/// Turns raw records into the typed model.
pub trait Tokenizer {
    /// Runs tokenization. Reference bindings must be carried over.
    fn tokenize(&self, extraction: &ExtractionResult) -> AppResult<TokenResult>;
}

/// Serializes the final document.
pub trait Generator {
    /// Writes `document` to `output`. Either the whole document lands or
    /// nothing does.
    fn generate(&self, document: &Document, output: &Path) -> AppResult<()>;
}

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    /// Nothing has run.
    Start,
    /// Raw records extracted.
    Extracted,
    /// Every reference bound.
    ReferencesResolved,
    /// Typed model built.
    Tokenized,
    /// Paths made absolute.
    TopologyResolved,
    /// Invalid and duplicate endpoints removed.
    Reduced,
    /// Document written.
    Generated,
}

impl Stage {
    /// The stage that must have completed before this one.
    pub fn previous(self) -> Option<Stage> {
        match self {
            Stage::Start => None,
            Stage::Extracted => Some(Stage::Start),
            Stage::ReferencesResolved => Some(Stage::Extracted),
            Stage::Tokenized => Some(Stage::ReferencesResolved),
            Stage::TopologyResolved => Some(Stage::Tokenized),
            Stage::Reduced => Some(Stage::TopologyResolved),
            Stage::Generated => Some(Stage::Reduced),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Start => "start",
            Stage::Extracted => "extraction",
            Stage::ReferencesResolved => "reference resolution",
            Stage::Tokenized => "tokenization",
            Stage::TopologyResolved => "topology resolution",
            Stage::Reduced => "reduction",
            Stage::Generated => "generation",
        };
        f.write_str(name)
    }
}

/// Where a run currently stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunState {
    /// The last stage that completed.
    Completed(Stage),
    /// Terminal failure while attempting `stage`.
    Aborted {
        /// The stage that failed.
        stage: Stage,
        /// Class of the failure.
        kind: ErrorKind,
        /// Rendered condition.
        reason: String,
    },
}

/// Per-run state, created fresh for every run and dropped afterwards.
#[derive(Debug)]
pub struct PipelineContext {
    state: RunState,
}

impl Default for PipelineContext {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineContext {
    /// A context at `Start`.
    pub fn new() -> Self {
        Self {
            state: RunState::Completed(Stage::Start),
        }
    }

    /// Current state.
    pub fn state(&self) -> &RunState {
        &self.state
    }

    /// Runs `work` as `stage`.
    ///
    /// Refuses to run out of order or after an abort. A failure moves the
    /// context to `Aborted` and is logged here, once.
    pub fn advance<T>(&mut self, stage: Stage, work: impl FnOnce() -> AppResult<T>) -> AppResult<T> {
        match &self.state {
            RunState::Completed(done) if Some(*done) == stage.previous() => {}
            RunState::Completed(done) => {
                return Err(AppError::General(format!(
                    "Stage '{}' cannot run after '{}'",
                    stage, done
                )))
            }
            RunState::Aborted { stage: failed, .. } => {
                return Err(AppError::General(format!(
                    "Stage '{}' cannot run, the run aborted during '{}'",
                    stage, failed
                )))
            }
        }

        match work() {
            Ok(value) => {
                debug!("Completed {}", stage);
                self.state = RunState::Completed(stage);
                Ok(value)
            }
            Err(err) => {
                error!(stage = %stage, kind = ?err.kind(), "{}", err);
                self.state = RunState::Aborted {
                    stage,
                    kind: err.kind(),
                    reason: err.to_string(),
                };
                Err(err)
            }
        }
    }
}

/// The orchestrator.
pub struct App {
    config: Configuration,
    extractor: Box<dyn Extractor>,
    tokenizer: Box<dyn Tokenizer>,
    generator: Box<dyn Generator>,
}

impl App {
    /// Creates an orchestrator with the stock collaborators.
    pub fn new(config: Configuration) -> Self {
        let verbose = config.verbose;
        let extractor = AnnotationExtractor::new(&config);
        Self::with_collaborators(
            config,
            Box::new(extractor),
            Box::new(AnnotationTokenizer::new(verbose)),
            Box::new(OpenApiGenerator::new()),
        )
    }

    /// Creates an orchestrator with custom collaborators.
    pub fn with_collaborators(
        config: Configuration,
        extractor: Box<dyn Extractor>,
        tokenizer: Box<dyn Tokenizer>,
        generator: Box<dyn Generator>,
    ) -> Self {
        Self {
            config,
            extractor,
            tokenizer,
            generator,
        }
    }

    /// The configuration this orchestrator runs with.
    pub fn config(&self) -> &Configuration {
        &self.config
    }

    /// Runs every stage and returns the path of the written document.
    pub fn start(&self) -> AppResult<PathBuf> {
        self.run(&mut PipelineContext::new())
    }

    /// Like [`App::start`], on a caller-supplied context.
    pub fn run(&self, ctx: &mut PipelineContext) -> AppResult<PathBuf> {
        info!("apidoc {}: generating documentation", VERSION);
        let document = self.resolve(ctx)?;

        let output = self.config.output_path();
        ctx.advance(Stage::Generated, || {
            self.generator.generate(&document, &output)
        })?;

        info!("{} has been generated!", output.display());
        Ok(output)
    }

    /// Runs every stage up to `Reduced` and returns the document that would
    /// be written.
    pub fn check(&self) -> AppResult<Document> {
        self.resolve(&mut PipelineContext::new())
    }

    fn resolve(&self, ctx: &mut PipelineContext) -> AppResult<Document> {
        let verbose = self.config.verbose;

        let mut extraction = ctx.advance(Stage::Extracted, || self.extractor.extract())?;

        ctx.advance(Stage::ReferencesResolved, || {
            ReferenceResolver::new(&extraction.components)
                .resolve(&mut extraction.endpoints)
        })?;

        let tokens = ctx.advance(Stage::Tokenized, || self.tokenizer.tokenize(&extraction))?;

        let ExtractionResult {
            components,
            routers,
            ..
        } = extraction;

        let endpoints = ctx.advance(Stage::TopologyResolved, || {
            TopologyResolver::new(&routers).resolve(tokens.endpoints)
        })?;

        let endpoints = ctx.advance(Stage::Reduced, || Ok(Reducer::new(verbose).reduce(endpoints)))?;

        Ok(Document {
            info: tokens.main,
            components,
            endpoints,
        })
    }
}
