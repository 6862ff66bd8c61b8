#![deny(missing_docs)]

//! # Tokenization
//!
//! Converts raw extracted text into the typed model: methods, status codes,
//! parameter locations and top-level metadata. Schema trees, including any
//! bindings already recorded on their references, are moved across untouched.

use crate::error::{AppError, AppResult};
use crate::model::{
    Endpoint, ExtractionResult, HttpMethod, MainInfo, MainMeta, ParamLocation, Parameter,
    RawEndpoint, RawParam, RawResponse, RequestBody, Response, StatusCode, TokenResult,
};
use crate::pipeline::Tokenizer;
use tracing::{debug, warn};
use url::Url;

/// Media type used when `@request` omits one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// The stock tokenizer for annotation-extracted records.
pub struct AnnotationTokenizer {
    verbose: bool,
}

impl AnnotationTokenizer {
    /// Creates a tokenizer.
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    fn main(&self, meta: &MainMeta) -> AppResult<MainInfo> {
        let title = meta.title.clone().ok_or_else(|| {
            AppError::TokenizationFailure(format!("{}: missing @title", meta.location.file.display()))
        })?;
        let version = meta.version.clone().ok_or_else(|| {
            AppError::TokenizationFailure(format!(
                "{}: missing @version",
                meta.location.file.display()
            ))
        })?;

        let servers = meta
            .servers
            .iter()
            .map(|raw| {
                Url::parse(raw).map(|_| raw.clone()).map_err(|e| {
                    AppError::TokenizationFailure(format!("invalid server URL '{}': {}", raw, e))
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok(MainInfo {
            title,
            version,
            description: meta.description.clone(),
            servers,
        })
    }

    fn endpoint(&self, raw: &RawEndpoint) -> AppResult<Endpoint> {
        let method = HttpMethod::parse(&raw.method);
        if method.is_none() {
            if self.verbose {
                warn!(
                    "{}: method '{}' is not a recognised HTTP verb",
                    raw.location, raw.method
                );
            } else {
                debug!(
                    "{}: method '{}' is not a recognised HTTP verb",
                    raw.location, raw.method
                );
            }
        }

        let parameters = raw
            .params
            .iter()
            .map(|p| parameter(raw, p))
            .collect::<AppResult<Vec<_>>>()?;

        let mut responses = raw
            .responses
            .iter()
            .map(|r| response(raw, r))
            .collect::<AppResult<Vec<_>>>()?;
        responses.sort_by_key(|r| r.status);
        if let Some(pair) = responses.windows(2).find(|w| w[0].status == w[1].status) {
            return Err(AppError::TokenizationFailure(format!(
                "{}: duplicate response status '{}'",
                raw.location, pair[0].status
            )));
        }

        Ok(Endpoint {
            method,
            path: raw.path.trim().to_string(),
            router: raw.group.clone(),
            summary: raw.summary.clone(),
            description: raw.description.clone(),
            tags: raw.tags.clone(),
            operation_id: raw.operation_id.clone(),
            deprecated: raw.deprecated,
            excluded: raw.excluded,
            parameters,
            request: raw.request.as_ref().map(|r| RequestBody {
                schema: r.schema.clone(),
                content_type: r
                    .content_type
                    .clone()
                    .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string()),
            }),
            responses,
            location: raw.location.clone(),
            mount_chain: Vec::new(),
            status: raw.status,
        })
    }
}

impl Tokenizer for AnnotationTokenizer {
    fn tokenize(&self, extraction: &ExtractionResult) -> AppResult<TokenResult> {
        let main = self.main(&extraction.main)?;
        let endpoints = extraction
            .endpoints
            .iter()
            .map(|e| self.endpoint(e))
            .collect::<AppResult<Vec<_>>>()?;

        debug!(endpoints = endpoints.len(), "Tokenized endpoints");
        Ok(TokenResult { main, endpoints })
    }
}

fn parameter(endpoint: &RawEndpoint, raw: &RawParam) -> AppResult<Parameter> {
    let location = ParamLocation::parse(&raw.location).ok_or_else(|| {
        AppError::TokenizationFailure(format!(
            "{}: unknown location '{}' for parameter '{}'",
            endpoint.location, raw.location, raw.name
        ))
    })?;

    Ok(Parameter {
        name: raw.name.clone(),
        location,
        schema: raw.schema.clone(),
        required: raw.required || location == ParamLocation::Path,
        description: raw.description.clone(),
    })
}

/// Parses `default` or a numeric status in `100..=599`.
pub fn parse_status(code: &str) -> Option<StatusCode> {
    if code.eq_ignore_ascii_case("default") {
        return Some(StatusCode::Default);
    }
    code.parse::<u16>()
        .ok()
        .filter(|c| (100..=599).contains(c))
        .map(StatusCode::Code)
}

fn response(endpoint: &RawEndpoint, raw: &RawResponse) -> AppResult<Response> {
    let status = parse_status(&raw.code).ok_or_else(|| {
        AppError::TokenizationFailure(format!(
            "{}: invalid response status '{}'",
            endpoint.location, raw.code
        ))
    })?;

    Ok(Response {
        status,
        schema: raw.schema.clone(),
        description: raw.description.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::model::{RawRequest, SchemaNode, SourceLocation};

    fn extraction(endpoints: Vec<RawEndpoint>) -> ExtractionResult {
        ExtractionResult {
            main: MainMeta {
                title: Some("Pets".into()),
                version: Some("1.0".into()),
                description: None,
                servers: vec!["https://api.example.com/v1".into()],
                location: SourceLocation::new("main.go", 1),
            },
            endpoints,
            ..Default::default()
        }
    }

    fn raw(method: &str, path: &str) -> RawEndpoint {
        RawEndpoint {
            method: method.into(),
            path: path.into(),
            location: SourceLocation::new("api.go", 3),
            ..Default::default()
        }
    }

    #[test]
    fn test_converts_endpoint_fields() {
        let mut e = raw("post", "/users/{id}");
        e.params.push(RawParam {
            name: "id".into(),
            location: "PATH".into(),
            schema: SchemaNode::reference("UserId"),
            required: false,
            description: None,
        });
        e.request = Some(RawRequest {
            schema: SchemaNode::reference("User"),
            content_type: None,
        });
        e.responses = vec![
            RawResponse {
                code: "default".into(),
                schema: None,
                description: None,
            },
            RawResponse {
                code: "201".into(),
                schema: None,
                description: None,
            },
        ];

        let tokens = AnnotationTokenizer::new(false)
            .tokenize(&extraction(vec![e]))
            .unwrap();
        let endpoint = &tokens.endpoints[0];

        assert_eq!(tokens.main.title, "Pets");
        assert_eq!(endpoint.method, Some(HttpMethod::Post));
        assert_eq!(endpoint.parameters[0].location, ParamLocation::Path);
        assert!(endpoint.parameters[0].required);
        assert_eq!(
            endpoint.request.as_ref().unwrap().content_type,
            DEFAULT_CONTENT_TYPE
        );
        assert_eq!(
            endpoint
                .responses
                .iter()
                .map(|r| r.status)
                .collect::<Vec<_>>(),
            vec![StatusCode::Code(201), StatusCode::Default]
        );
    }

    #[test]
    fn test_unknown_method_is_left_for_the_reducer() {
        let tokens = AnnotationTokenizer::new(true)
            .tokenize(&extraction(vec![raw("FETCH", "/x"), raw("", "/y")]))
            .unwrap();
        assert!(tokens.endpoints.iter().all(|e| e.method.is_none()));
    }

    #[test]
    fn test_duplicate_response_status_is_rejected() {
        let mut twice = raw("GET", "/a");
        for description in ["Found", "Also found"] {
            twice.responses.push(RawResponse {
                code: "200".into(),
                schema: None,
                description: Some(description.into()),
            });
        }

        let err = AnnotationTokenizer::new(false)
            .tokenize(&extraction(vec![twice]))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TokenizationFailure);
        assert_eq!(
            err.to_string(),
            "Tokenization failure: api.go:3: duplicate response status '200'"
        );

        let mut distinct = raw("GET", "/a");
        for code in ["200", "default"] {
            distinct.responses.push(RawResponse {
                code: code.into(),
                schema: None,
                description: None,
            });
        }
        assert!(AnnotationTokenizer::new(false)
            .tokenize(&extraction(vec![distinct]))
            .is_ok());
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!(parse_status("200"), Some(StatusCode::Code(200)));
        assert_eq!(parse_status("DEFAULT"), Some(StatusCode::Default));
        assert_eq!(parse_status("99"), None);
        assert_eq!(parse_status("600"), None);
        assert_eq!(parse_status("2xx"), None);
    }

    #[test]
    fn test_failures() {
        let mut missing_title = extraction(vec![]);
        missing_title.main.title = None;

        let mut bad_server = extraction(vec![]);
        bad_server.main.servers = vec!["not a url".into()];

        let mut bad_status = raw("GET", "/a");
        bad_status.responses.push(RawResponse {
            code: "700".into(),
            schema: None,
            description: None,
        });

        let mut bad_location = raw("GET", "/a");
        bad_location.params.push(RawParam {
            name: "q".into(),
            location: "body".into(),
            schema: SchemaNode::reference("Q"),
            required: false,
            description: None,
        });

        for input in [
            missing_title,
            bad_server,
            extraction(vec![bad_status]),
            extraction(vec![bad_location]),
        ] {
            let err = AnnotationTokenizer::new(false).tokenize(&input).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::TokenizationFailure);
        }
    }
}
