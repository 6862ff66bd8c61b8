#![deny(missing_docs)]

//! # OpenAPI Generation
//!
//! Builds an OpenAPI 3.1 document from the final `Document` as a
//! `serde_json::Value`, checks it against the `utoipa` model, then publishes
//! it as YAML with a temp-file-and-rename so readers never observe a partial
//! document.

use crate::error::{AppError, AppResult};
use crate::model::{Document, Endpoint, MainInfo, SchemaNode, StatusCode};
use crate::pipeline::Generator;
use serde_json::{json, Map, Value};
use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::debug;
use utoipa::openapi::OpenApi;

/// OpenAPI version written into every document.
pub const OPENAPI_VERSION: &str = "3.1.0";

const SCHEMA_PREFIX: &str = "#/components/schemas/";

/// Writes the document as OpenAPI 3.1 YAML.
#[derive(Debug, Default, Clone, Copy)]
pub struct OpenApiGenerator;

impl OpenApiGenerator {
    /// Creates a generator.
    pub fn new() -> Self {
        Self
    }

    /// Builds the document without writing it.
    pub fn build(&self, document: &Document) -> Value {
        let mut doc = Map::new();
        doc.insert("openapi".to_string(), json!(OPENAPI_VERSION));
        doc.insert("info".to_string(), info_value(&document.info));

        if !document.info.servers.is_empty() {
            let servers: Vec<Value> = document
                .info
                .servers
                .iter()
                .map(|url| json!({ "url": url }))
                .collect();
            doc.insert("servers".to_string(), Value::Array(servers));
        }

        doc.insert("paths".to_string(), paths_value(&document.endpoints));

        let mut schemas = Map::new();
        for component in document.components.sorted() {
            let mut schema = schema_value(&component.schema);
            if let (Some(desc), Value::Object(obj)) = (&component.description, &mut schema) {
                obj.insert("description".to_string(), json!(desc));
            }
            schemas.insert(component.name.clone(), schema);
        }
        if !schemas.is_empty() {
            doc.insert("components".to_string(), json!({ "schemas": schemas }));
        }

        Value::Object(doc)
    }

    /// Builds, validates and serializes the document to YAML.
    pub fn render(&self, document: &Document) -> AppResult<String> {
        let value = self.build(document);

        serde_json::from_value::<OpenApi>(value.clone()).map_err(|e| {
            AppError::GenerationFailure(format!("Generated document is not valid OpenAPI: {}", e))
        })?;

        serde_yaml::to_string(&value)
            .map_err(|e| AppError::GenerationFailure(format!("Failed to serialize YAML: {}", e)))
    }
}

impl Generator for OpenApiGenerator {
    fn generate(&self, document: &Document, output: &Path) -> AppResult<()> {
        let yaml = self.render(document)?;
        write_atomic(output, yaml.as_bytes())?;

        debug!(
            paths = document.endpoints.len(),
            schemas = document.components.len(),
            "Wrote {}",
            output.display()
        );
        Ok(())
    }
}

/// Replaces `path` with `data` in one rename. On failure the previous file,
/// if any, is left untouched and the temp file is removed.
pub fn write_atomic(path: &Path, data: &[u8]) -> AppResult<()> {
    let failure = |what: &str, e: std::io::Error| {
        AppError::GenerationFailure(format!("{} for {}: {}", what, path.display(), e))
    };

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(|e| failure("create output directory", e))?;

    let mut tmp =
        tempfile::NamedTempFile::new_in(parent).map_err(|e| failure("create temp file", e))?;
    tmp.write_all(data)
        .map_err(|e| failure("write temp file", e))?;
    tmp.flush().map_err(|e| failure("flush temp file", e))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| failure("fsync temp file", e))?;
    tmp.persist(path)
        .map_err(|e| failure("rename into place", e.error))?;

    Ok(())
}

fn info_value(info: &MainInfo) -> Value {
    let mut obj = Map::new();
    obj.insert("title".to_string(), json!(info.title));
    obj.insert("version".to_string(), json!(info.version));
    if let Some(desc) = &info.description {
        obj.insert("description".to_string(), json!(desc));
    }
    Value::Object(obj)
}

fn paths_value(endpoints: &[Endpoint]) -> Value {
    let mut paths = Map::new();
    let mut used_ids = HashSet::new();

    for endpoint in endpoints {
        let Some(method) = endpoint.method else {
            continue;
        };
        let id = unique_operation_id(
            endpoint
                .operation_id
                .clone()
                .unwrap_or_else(|| default_operation_id(endpoint)),
            &mut used_ids,
        );

        let item = paths
            .entry(endpoint.path.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(item) = item {
            item.insert(method.key(), operation_value(endpoint, id));
        }
    }

    Value::Object(paths)
}

/// `GET /users/{id}` becomes `get_users_id`.
fn default_operation_id(endpoint: &Endpoint) -> String {
    let method = endpoint.method.map(|m| m.key()).unwrap_or_default();
    let words: Vec<&str> = endpoint
        .path
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    if words.is_empty() {
        method
    } else {
        format!("{}_{}", method, words.join("_").to_ascii_lowercase())
    }
}

fn unique_operation_id(base: String, used: &mut HashSet<String>) -> String {
    if used.insert(base.clone()) {
        return base;
    }
    let mut n = 2;
    loop {
        let candidate = format!("{}_{}", base, n);
        if used.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

fn operation_value(endpoint: &Endpoint, operation_id: String) -> Value {
    let mut op = Map::new();
    if !endpoint.tags.is_empty() {
        op.insert("tags".to_string(), json!(endpoint.tags));
    }
    if let Some(summary) = &endpoint.summary {
        op.insert("summary".to_string(), json!(summary));
    }
    if let Some(desc) = &endpoint.description {
        op.insert("description".to_string(), json!(desc));
    }
    op.insert("operationId".to_string(), json!(operation_id));

    if !endpoint.parameters.is_empty() {
        let params: Vec<Value> = endpoint
            .parameters
            .iter()
            .map(|p| {
                let mut obj = Map::new();
                obj.insert("name".to_string(), json!(p.name));
                obj.insert("in".to_string(), json!(p.location.as_str()));
                if let Some(desc) = &p.description {
                    obj.insert("description".to_string(), json!(desc));
                }
                obj.insert("required".to_string(), json!(p.required));
                obj.insert("schema".to_string(), schema_value(&p.schema));
                Value::Object(obj)
            })
            .collect();
        op.insert("parameters".to_string(), Value::Array(params));
    }

    if let Some(request) = &endpoint.request {
        let media_type = request.content_type.clone();
        op.insert(
            "requestBody".to_string(),
            json!({
                "content": { media_type: { "schema": schema_value(&request.schema) } },
                "required": true
            }),
        );
    }

    let mut responses = Map::new();
    for response in &endpoint.responses {
        let mut obj = Map::new();
        let description = response
            .description
            .clone()
            .unwrap_or_else(|| default_description(response.status).to_string());
        obj.insert("description".to_string(), json!(description));
        if let Some(schema) = &response.schema {
            obj.insert(
                "content".to_string(),
                json!({ "application/json": { "schema": schema_value(schema) } }),
            );
        }
        responses.insert(response.status.to_string(), Value::Object(obj));
    }
    if responses.is_empty() {
        responses.insert(
            StatusCode::Default.to_string(),
            json!({ "description": default_description(StatusCode::Default) }),
        );
    }
    op.insert("responses".to_string(), Value::Object(responses));

    if endpoint.deprecated {
        op.insert("deprecated".to_string(), json!(true));
    }

    Value::Object(op)
}

fn default_description(status: StatusCode) -> &'static str {
    match status {
        StatusCode::Default => "Default response",
        StatusCode::Code(200) => "OK",
        StatusCode::Code(201) => "Created",
        StatusCode::Code(202) => "Accepted",
        StatusCode::Code(204) => "No Content",
        StatusCode::Code(400) => "Bad Request",
        StatusCode::Code(401) => "Unauthorized",
        StatusCode::Code(403) => "Forbidden",
        StatusCode::Code(404) => "Not Found",
        StatusCode::Code(409) => "Conflict",
        StatusCode::Code(422) => "Unprocessable Entity",
        StatusCode::Code(500) => "Internal Server Error",
        StatusCode::Code(_) => "Response",
    }
}

/// Converts a schema tree to its JSON Schema form.
pub fn schema_value(node: &SchemaNode) -> Value {
    match node {
        SchemaNode::Primitive { kind, format } => {
            let mut obj = Map::new();
            obj.insert("type".to_string(), json!(kind.as_str()));
            if let Some(format) = format {
                obj.insert("format".to_string(), json!(format));
            }
            Value::Object(obj)
        }
        SchemaNode::Array(items) => json!({ "type": "array", "items": schema_value(items) }),
        SchemaNode::Map(values) => {
            json!({ "type": "object", "additionalProperties": schema_value(values) })
        }
        SchemaNode::Object(props) => {
            let mut properties = Map::new();
            let mut required = Vec::new();
            for prop in props {
                let mut schema = schema_value(&prop.schema);
                if let (Some(desc), Value::Object(obj)) = (&prop.description, &mut schema) {
                    obj.insert("description".to_string(), json!(desc));
                }
                properties.insert(prop.name.clone(), schema);
                if prop.required {
                    required.push(json!(prop.name));
                }
            }

            let mut obj = Map::new();
            obj.insert("type".to_string(), json!("object"));
            if !properties.is_empty() {
                obj.insert("properties".to_string(), Value::Object(properties));
            }
            if !required.is_empty() {
                obj.insert("required".to_string(), Value::Array(required));
            }
            Value::Object(obj)
        }
        SchemaNode::Ref(reference) => {
            json!({ "$ref": format!("{}{}", SCHEMA_PREFIX, reference.target) })
        }
    }
}
