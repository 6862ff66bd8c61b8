#![deny(missing_docs)]

//! # Endpoints
//!
//! Two shapes of the same operation: `RawEndpoint` as the extractor sees it
//! (text fields, schema trees already parsed) and `Endpoint`, the typed record
//! produced by the tokenizer and consumed by topology resolution, reduction
//! and generation.

use crate::model::location::SourceLocation;
use crate::model::schema::SchemaNode;
use std::fmt;

/// HTTP methods the generated document can carry, in their output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HttpMethod {
    /// GET
    Get,
    /// HEAD
    Head,
    /// POST
    Post,
    /// PUT
    Put,
    /// PATCH
    Patch,
    /// DELETE
    Delete,
    /// OPTIONS
    Options,
    /// TRACE
    Trace,
}

impl HttpMethod {
    /// Parses a method name, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Some(HttpMethod::Get),
            "HEAD" => Some(HttpMethod::Head),
            "POST" => Some(HttpMethod::Post),
            "PUT" => Some(HttpMethod::Put),
            "PATCH" => Some(HttpMethod::Patch),
            "DELETE" => Some(HttpMethod::Delete),
            "OPTIONS" => Some(HttpMethod::Options),
            "TRACE" => Some(HttpMethod::Trace),
            _ => None,
        }
    }

    /// Upper-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Head => "HEAD",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Trace => "TRACE",
        }
    }

    /// Lower-case name, as used for Path Item keys.
    pub fn key(&self) -> String {
        self.as_str().to_ascii_lowercase()
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Progress of an endpoint through reference resolution and reduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolutionStatus {
    /// Not yet visited by the Reference Resolver.
    #[default]
    Unresolved,
    /// Every reference bound.
    Resolved,
    /// Rejected by the Reducer.
    Invalid,
}

/// Where a parameter is carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamLocation {
    /// `/users/{id}`
    Path,
    /// `?page=1`
    Query,
    /// Request header.
    Header,
    /// Cookie.
    Cookie,
}

impl ParamLocation {
    /// Parses `path`, `query`, `header` or `cookie`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "path" => Some(ParamLocation::Path),
            "query" => Some(ParamLocation::Query),
            "header" => Some(ParamLocation::Header),
            "cookie" => Some(ParamLocation::Cookie),
            _ => None,
        }
    }

    /// OpenAPI `in` value.
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamLocation::Path => "path",
            ParamLocation::Query => "query",
            ParamLocation::Header => "header",
            ParamLocation::Cookie => "cookie",
        }
    }
}

/// Response key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StatusCode {
    /// A concrete HTTP status.
    Code(u16),
    /// The catch-all `default` response.
    Default,
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusCode::Code(code) => write!(f, "{}", code),
            StatusCode::Default => f.write_str("default"),
        }
    }
}

/// A parameter as written in the annotation.
#[derive(Debug, Clone, PartialEq)]
pub struct RawParam {
    /// Parameter name.
    pub name: String,
    /// Location text (`path`, `query`, ...).
    pub location: String,
    /// Parameter schema.
    pub schema: SchemaNode,
    /// Whether `required` was given.
    pub required: bool,
    /// Optional description.
    pub description: Option<String>,
}

/// A request body as written in the annotation.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRequest {
    /// Body schema.
    pub schema: SchemaNode,
    /// Media type, if declared.
    pub content_type: Option<String>,
}

/// A response as written in the annotation.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    /// Status text (`200`, `default`, ...).
    pub code: String,
    /// Body schema, if any.
    pub schema: Option<SchemaNode>,
    /// Optional description.
    pub description: Option<String>,
}

/// One endpoint block straight out of the extractor.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawEndpoint {
    /// Method text; may be empty.
    pub method: String,
    /// Path fragment relative to the owning router.
    pub path: String,
    /// Owning router identifier.
    pub group: Option<String>,
    /// `@summary`
    pub summary: Option<String>,
    /// `@description`
    pub description: Option<String>,
    /// `@tag` values.
    pub tags: Vec<String>,
    /// `@operation`
    pub operation_id: Option<String>,
    /// `@deprecated`
    pub deprecated: bool,
    /// `@exclude`
    pub excluded: bool,
    /// `@param` lines.
    pub params: Vec<RawParam>,
    /// `@request`
    pub request: Option<RawRequest>,
    /// `@response` lines.
    pub responses: Vec<RawResponse>,
    /// Declaring source location.
    pub location: SourceLocation,
    /// Resolution progress.
    pub status: ResolutionStatus,
}

/// A typed parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    /// Parameter name.
    pub name: String,
    /// Where the parameter is carried.
    pub location: ParamLocation,
    /// Parameter schema.
    pub schema: SchemaNode,
    /// Required flag. Path parameters are always required.
    pub required: bool,
    /// Optional description.
    pub description: Option<String>,
}

/// A typed request body.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestBody {
    /// Body schema.
    pub schema: SchemaNode,
    /// Media type.
    pub content_type: String,
}

/// A typed response.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// Response key.
    pub status: StatusCode,
    /// Body schema, if any.
    pub schema: Option<SchemaNode>,
    /// Optional description.
    pub description: Option<String>,
}

/// One documented operation in the typed model.
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoint {
    /// `None` when the annotation's method was empty or unrecognised.
    pub method: Option<HttpMethod>,
    /// Relative fragment before topology resolution, absolute afterwards.
    pub path: String,
    /// Owning router identifier.
    pub router: Option<String>,
    /// Short summary.
    pub summary: Option<String>,
    /// Long description.
    pub description: Option<String>,
    /// Tags.
    pub tags: Vec<String>,
    /// Declared operation id.
    pub operation_id: Option<String>,
    /// Deprecated flag.
    pub deprecated: bool,
    /// Explicitly excluded by its own annotation.
    pub excluded: bool,
    /// Parameters.
    pub parameters: Vec<Parameter>,
    /// Request body.
    pub request: Option<RequestBody>,
    /// Responses, sorted by status.
    pub responses: Vec<Response>,
    /// Where the original declaration lives. Shared by every fan-out copy.
    pub location: SourceLocation,
    /// Router identifiers from root to owner that produced `path`.
    pub mount_chain: Vec<String>,
    /// Resolution progress.
    pub status: ResolutionStatus,
}

/// Common view over anything carrying schema trees, so the Reference Resolver
/// can work on extraction output as well as on the typed model.
pub trait SchemaHolder {
    /// Human-readable label used in error messages.
    fn label(&self) -> String;
    /// Declaring source location.
    fn location(&self) -> &SourceLocation;
    /// Every schema tree, read-only.
    fn schemas(&self) -> Vec<&SchemaNode>;
    /// Every schema tree, mutable.
    fn schemas_mut(&mut self) -> Vec<&mut SchemaNode>;
    /// Updates resolution progress.
    fn set_status(&mut self, status: ResolutionStatus);

    /// Whether any reference reachable from this holder is unbound.
    fn has_unresolved_reference(&self) -> bool {
        self.schemas().iter().any(|s| s.has_unresolved())
    }
}

impl SchemaHolder for RawEndpoint {
    fn label(&self) -> String {
        let method = if self.method.is_empty() {
            "?"
        } else {
            self.method.as_str()
        };
        format!("{} {} ({})", method, self.path, self.location)
    }

    fn location(&self) -> &SourceLocation {
        &self.location
    }

    fn schemas(&self) -> Vec<&SchemaNode> {
        let mut out: Vec<&SchemaNode> = self.params.iter().map(|p| &p.schema).collect();
        out.extend(self.request.iter().map(|r| &r.schema));
        out.extend(self.responses.iter().filter_map(|r| r.schema.as_ref()));
        out
    }

    fn schemas_mut(&mut self) -> Vec<&mut SchemaNode> {
        let mut out: Vec<&mut SchemaNode> =
            self.params.iter_mut().map(|p| &mut p.schema).collect();
        out.extend(self.request.iter_mut().map(|r| &mut r.schema));
        out.extend(self.responses.iter_mut().filter_map(|r| r.schema.as_mut()));
        out
    }

    fn set_status(&mut self, status: ResolutionStatus) {
        self.status = status;
    }
}

impl SchemaHolder for Endpoint {
    fn label(&self) -> String {
        let method = self.method.map(|m| m.as_str()).unwrap_or("?");
        format!("{} {} ({})", method, self.path, self.location)
    }

    fn location(&self) -> &SourceLocation {
        &self.location
    }

    fn schemas(&self) -> Vec<&SchemaNode> {
        let mut out: Vec<&SchemaNode> = self.parameters.iter().map(|p| &p.schema).collect();
        out.extend(self.request.iter().map(|r| &r.schema));
        out.extend(self.responses.iter().filter_map(|r| r.schema.as_ref()));
        out
    }

    fn schemas_mut(&mut self) -> Vec<&mut SchemaNode> {
        let mut out: Vec<&mut SchemaNode> =
            self.parameters.iter_mut().map(|p| &mut p.schema).collect();
        out.extend(self.request.iter_mut().map(|r| &mut r.schema));
        out.extend(self.responses.iter_mut().filter_map(|r| r.schema.as_mut()));
        out
    }

    fn set_status(&mut self, status: ResolutionStatus) {
        self.status = status;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_parse_and_order() {
        assert_eq!(HttpMethod::parse("get"), Some(HttpMethod::Get));
        assert_eq!(HttpMethod::parse(" Delete "), Some(HttpMethod::Delete));
        assert_eq!(HttpMethod::parse(""), None);
        assert_eq!(HttpMethod::parse("CONNECT"), None);
        assert!(HttpMethod::Get < HttpMethod::Post);
        assert!(HttpMethod::Patch < HttpMethod::Delete);
    }

    #[test]
    fn test_raw_endpoint_exposes_all_schema_trees() {
        let raw = RawEndpoint {
            method: "POST".into(),
            path: "/users".into(),
            params: vec![RawParam {
                name: "X-Trace".into(),
                location: "header".into(),
                schema: SchemaNode::reference("TraceId"),
                required: false,
                description: None,
            }],
            request: Some(RawRequest {
                schema: SchemaNode::reference("UserInput"),
                content_type: None,
            }),
            responses: vec![
                RawResponse {
                    code: "201".into(),
                    schema: Some(SchemaNode::reference("User")),
                    description: None,
                },
                RawResponse {
                    code: "204".into(),
                    schema: None,
                    description: None,
                },
            ],
            location: SourceLocation::new("users.go", 4),
            ..Default::default()
        };

        assert_eq!(raw.schemas().len(), 3);
        assert!(raw.has_unresolved_reference());
        assert_eq!(raw.label(), "POST /users (users.go:4)");
    }

    #[test]
    fn test_status_code_display() {
        assert_eq!(StatusCode::Code(404).to_string(), "404");
        assert_eq!(StatusCode::Default.to_string(), "default");
        assert!(StatusCode::Code(500) < StatusCode::Default);
    }
}
