#![deny(missing_docs)]

//! # Annotation Extraction
//!
//! Walks the source tree and turns annotation blocks into raw records:
//!
//! - **annotations**: comment-line lexing and argument splitting.
//! - **types**: type-expression parsing into schema trees.
//!
//! Components and routers are collected from every scanned file, endpoints only
//! from files under the endpoints root, and top-level metadata only from the
//! main file.

pub mod annotations;
pub mod types;

use crate::error::{AppError, AppResult};
use crate::model::{
    Component, ExtractionResult, MainMeta, Mount, Property, RawEndpoint, RawParam,
    RawRequest, RawResponse, Router, SchemaNode, SourceLocation,
};
use crate::pipeline::{Configuration, Extractor};
use annotations::{join_rest, lex, split_args, Annotation, Block, BlockKind};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use types::parse_type;
use walkdir::WalkDir;

/// Source extensions scanned when none are configured.
pub const DEFAULT_EXTENSIONS: &[&str] = &[
    "rs", "go", "ts", "js", "py", "java", "kt", "php", "rb", "cs", "swift",
];

/// Extracts annotation blocks from comment lines in a source tree.
pub struct AnnotationExtractor {
    source_dir: PathBuf,
    main_file: PathBuf,
    endpoints_root: PathBuf,
    extensions: Vec<String>,
    verbose: bool,
}

impl AnnotationExtractor {
    /// Creates an extractor for `config`. Relative main-file and endpoints
    /// paths are taken relative to the source directory.
    pub fn new(config: &Configuration) -> Self {
        Self {
            source_dir: config.source_dir.clone(),
            main_file: config.source_dir.join(&config.main_file),
            endpoints_root: config.source_dir.join(&config.endpoints_root),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            verbose: config.verbose,
        }
    }

    /// Replaces the extension allow-list. An empty list keeps the defaults.
    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        if !extensions.is_empty() {
            self.extensions = extensions
                .into_iter()
                .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
                .collect();
        }
        self
    }

    fn note(&self, message: &str) {
        if self.verbose {
            warn!("{}", message);
        } else {
            debug!("{}", message);
        }
    }

    fn relative(&self, path: &Path) -> PathBuf {
        path.strip_prefix(&self.source_dir)
            .unwrap_or(path)
            .to_path_buf()
    }

    fn is_source(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| self.extensions.iter().any(|x| x.eq_ignore_ascii_case(e)))
            .unwrap_or(false)
    }

    fn check_dirs(&self) -> AppResult<()> {
        for (what, dir) in [
            ("source directory", &self.source_dir),
            ("endpoints root", &self.endpoints_root),
        ] {
            if !dir.is_dir() {
                return Err(AppError::ExtractionFailure(format!(
                    "{} '{}' does not exist or is not a directory",
                    what,
                    dir.display()
                )));
            }
        }
        Ok(())
    }

    fn source_files(&self) -> Vec<PathBuf> {
        let mut files = Vec::new();
        for entry in WalkDir::new(&self.source_dir).sort_by_file_name() {
            match entry {
                Ok(entry) if entry.file_type().is_file() && self.is_source(entry.path()) => {
                    files.push(entry.into_path());
                }
                Ok(_) => {}
                Err(e) => self.note(&format!("Skipping unreadable entry: {}", e)),
            }
        }
        files
    }

    /// Reads a file as UTF-8. `None` means the file was skipped.
    fn read(&self, path: &Path) -> AppResult<Option<String>> {
        match fs::read_to_string(path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                self.note(&format!("Skipping non UTF-8 file {}", path.display()));
                Ok(None)
            }
            Err(e) => Err(AppError::ExtractionFailure(format!(
                "cannot read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    fn extract_main(&self) -> AppResult<MainMeta> {
        let content = fs::read_to_string(&self.main_file).map_err(|e| {
            AppError::ExtractionFailure(format!(
                "cannot read main file {}: {}",
                self.main_file.display(),
                e
            ))
        })?;

        let mut meta = MainMeta {
            location: SourceLocation::new(self.relative(&self.main_file), 1),
            ..Default::default()
        };

        for annotation in lex(&content).loose {
            let value = Some(annotation.value.clone()).filter(|v| !v.is_empty());
            match annotation.key.as_str() {
                "title" => meta.title = value,
                "version" => meta.version = value,
                "description" => meta.description = value,
                "server" => meta.servers.extend(value),
                other => self.note(&format!(
                    "Ignoring unknown main annotation @{} at {}:{}",
                    other,
                    meta.location.file.display(),
                    annotation.line
                )),
            }
        }

        Ok(meta)
    }

    fn extract_file(
        &self,
        path: &Path,
        content: &str,
        result: &mut ExtractionResult,
    ) -> AppResult<()> {
        let file = self.relative(path);
        let in_endpoints = path.starts_with(&self.endpoints_root);

        for block in lex(content).blocks {
            let location = SourceLocation::new(file.clone(), block.head.line);
            match block.kind {
                BlockKind::Endpoint if in_endpoints => {
                    let endpoint = self.endpoint(&block, location)?;
                    result.endpoints.push(endpoint);
                }
                BlockKind::Endpoint => debug!(
                    "Ignoring endpoint at {} outside the endpoints root",
                    location
                ),
                BlockKind::Component => {
                    let component = self.component(&block, location)?;
                    result.components.insert(component)?;
                }
                BlockKind::Router => {
                    let (router, mounts) = self.router(&block, &file, location)?;
                    result.routers.insert_router(router)?;
                    for mount in mounts {
                        result.routers.add_mount(mount);
                    }
                }
            }
        }
        Ok(())
    }

    fn endpoint(&self, block: &Block, location: SourceLocation) -> AppResult<RawEndpoint> {
        let head = split_args(&block.head.value);
        let (method, path) = match head.as_slice() {
            [] => return Err(missing_operand("@endpoint", &location)),
            [only] if only.text.starts_with('/') => (String::new(), only.text.clone()),
            [only] => (only.text.clone(), String::new()),
            [method, path, ..] => (method.text.clone(), path.text.clone()),
        };

        let mut endpoint = RawEndpoint {
            method,
            path,
            location,
            ..Default::default()
        };

        for annotation in &block.body {
            let at = line_of(&endpoint.location, annotation);
            let args = split_args(&annotation.value);
            match annotation.key.as_str() {
                "group" => endpoint.group = args.first().map(|a| a.text.clone()),
                "summary" => endpoint.summary = text(annotation),
                "description" => endpoint.description = text(annotation),
                "tag" => endpoint.tags.extend(args.into_iter().map(|a| a.text)),
                "operation" => endpoint.operation_id = args.first().map(|a| a.text.clone()),
                "deprecated" => endpoint.deprecated = true,
                "exclude" => endpoint.excluded = true,
                "param" => endpoint.params.push(param(&args, &at)?),
                "request" => {
                    let ty = args.first().ok_or_else(|| missing_operand("@request", &at))?;
                    endpoint.request = Some(RawRequest {
                        schema: schema_at(&ty.text, &at)?,
                        content_type: args.get(1).map(|a| a.text.clone()),
                    });
                }
                "response" => endpoint.responses.push(response(&args, &at)?),
                other => self.note(&format!("Ignoring unknown endpoint annotation @{} at {}", other, at)),
            }
        }

        Ok(endpoint)
    }

    fn component(&self, block: &Block, location: SourceLocation) -> AppResult<Component> {
        let head = split_args(&block.head.value);
        let name = head
            .first()
            .map(|a| a.text.clone())
            .ok_or_else(|| missing_operand("@component", &location))?;
        let declared = head
            .get(1)
            .map(|a| schema_at(&a.text, &location))
            .transpose()?;

        let mut description = None;
        let mut properties = Vec::new();
        for annotation in &block.body {
            let at = line_of(&location, annotation);
            match annotation.key.as_str() {
                "description" => description = text(annotation),
                "property" => properties.push(property(&split_args(&annotation.value), &at)?),
                other => self.note(&format!("Ignoring unknown component annotation @{} at {}", other, at)),
            }
        }

        let schema = match declared {
            Some(_) if !properties.is_empty() => {
                return Err(AppError::ExtractionFailure(format!(
                    "{}: component '{}' declares both a type and properties",
                    location, name
                )))
            }
            Some(schema) => schema,
            None => SchemaNode::Object(properties),
        };

        Ok(Component {
            name,
            description,
            schema,
            location,
        })
    }

    fn router(
        &self,
        block: &Block,
        file: &Path,
        location: SourceLocation,
    ) -> AppResult<(Router, Vec<Mount>)> {
        let head = split_args(&block.head.value);
        let id = head
            .first()
            .map(|a| a.text.clone())
            .ok_or_else(|| missing_operand("@router", &location))?;
        let segment = head.get(1).map(|a| a.text.clone()).unwrap_or_default();

        let mut mounts = Vec::new();
        for annotation in &block.body {
            let at = SourceLocation::new(file, annotation.line);
            match annotation.key.as_str() {
                "mount" => {
                    let args = split_args(&annotation.value);
                    let parent = args.first().ok_or_else(|| missing_operand("@mount", &at))?;
                    mounts.push(Mount {
                        parent: parent.text.clone(),
                        child: id.clone(),
                        path: args.get(1).map(|a| a.text.clone()).unwrap_or_default(),
                        location: at,
                    });
                }
                other => self.note(&format!("Ignoring unknown router annotation @{} at {}", other, at)),
            }
        }

        Ok((
            Router {
                id,
                segment,
                location,
            },
            mounts,
        ))
    }
}

impl Extractor for AnnotationExtractor {
    fn extract(&self) -> AppResult<ExtractionResult> {
        self.check_dirs()?;

        let mut result = ExtractionResult {
            main: self.extract_main()?,
            ..Default::default()
        };

        let files = self.source_files();
        for path in &files {
            if let Some(content) = self.read(path)? {
                self.extract_file(path, &content, &mut result)?;
            }
        }

        debug!(
            files = files.len(),
            endpoints = result.endpoints.len(),
            components = result.components.len(),
            routers = result.routers.len(),
            "Extraction finished"
        );
        Ok(result)
    }
}

fn missing_operand(key: &str, location: &SourceLocation) -> AppError {
    AppError::ExtractionFailure(format!("{}: {} requires an operand", location, key))
}

fn line_of(block: &SourceLocation, annotation: &Annotation) -> SourceLocation {
    SourceLocation::new(block.file.clone(), annotation.line)
}

fn text(annotation: &Annotation) -> Option<String> {
    let value = annotation.value.trim_matches('"').trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn schema_at(expr: &str, location: &SourceLocation) -> AppResult<SchemaNode> {
    parse_type(expr).map_err(|e| AppError::ExtractionFailure(format!("{}: {}", location, e)))
}

/// Splits an optional bare `required` flag off the front of `rest`.
fn required_and_description(rest: &[annotations::Arg]) -> (bool, Option<String>) {
    match rest.split_first() {
        Some((first, tail)) if !first.quoted && first.text.eq_ignore_ascii_case("required") => {
            (true, join_rest(tail))
        }
        _ => (false, join_rest(rest)),
    }
}

fn param(args: &[annotations::Arg], at: &SourceLocation) -> AppResult<RawParam> {
    let [name, location, ty, rest @ ..] = args else {
        return Err(AppError::ExtractionFailure(format!(
            "{}: @param expects <name> <in> <type>",
            at
        )));
    };
    let (required, description) = required_and_description(rest);
    Ok(RawParam {
        name: name.text.clone(),
        location: location.text.clone(),
        schema: schema_at(&ty.text, at)?,
        required,
        description,
    })
}

fn property(args: &[annotations::Arg], at: &SourceLocation) -> AppResult<Property> {
    let [name, ty, rest @ ..] = args else {
        return Err(AppError::ExtractionFailure(format!(
            "{}: @property expects <name> <type>",
            at
        )));
    };
    let (required, description) = required_and_description(rest);
    Ok(Property {
        name: name.text.clone(),
        schema: schema_at(&ty.text, at)?,
        required,
        description,
    })
}

fn response(args: &[annotations::Arg], at: &SourceLocation) -> AppResult<RawResponse> {
    let (code, rest) = args
        .split_first()
        .ok_or_else(|| missing_operand("@response", at))?;
    let (schema, rest) = match rest.split_first() {
        Some((ty, tail)) if !ty.quoted => (Some(schema_at(&ty.text, at)?), tail),
        _ => (None, rest),
    };
    Ok(RawResponse {
        code: code.text.clone(),
        schema,
        description: join_rest(rest),
    })
}
