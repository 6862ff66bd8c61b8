#![deny(missing_docs)]

//! # Endpoint Reduction
//!
//! Drops individually invalid endpoints, collapses `(method, path)` duplicates
//! with last-declared-wins, and orders the survivors by path then method.
//!
//! "Last" is defined by a fixed traversal order (path, method, declaration
//! location, mount chain), never by discovery order.

use crate::model::{Endpoint, HttpMethod, ResolutionStatus, SchemaHolder, SourceLocation};
use std::fmt;
use tracing::{debug, warn};

/// Why an endpoint was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Method empty or not a recognised HTTP verb.
    InvalidMethod,
    /// No path.
    EmptyPath,
    /// A schema tree still holds an unbound reference.
    UnresolvedReference,
    /// The annotation asked for exclusion.
    Excluded,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            DropReason::InvalidMethod => "missing or unrecognised method",
            DropReason::EmptyPath => "empty path",
            DropReason::UnresolvedReference => "unresolved schema reference",
            DropReason::Excluded => "excluded by annotation",
        };
        f.write_str(text)
    }
}

/// Returns the first validity rule `endpoint` breaks, if any.
pub fn invalid_reason(endpoint: &Endpoint) -> Option<DropReason> {
    if endpoint.method.is_none() {
        return Some(DropReason::InvalidMethod);
    }
    if endpoint.path.is_empty() {
        return Some(DropReason::EmptyPath);
    }
    if endpoint.has_unresolved_reference() {
        return Some(DropReason::UnresolvedReference);
    }
    if endpoint.excluded {
        return Some(DropReason::Excluded);
    }
    None
}

type TraversalKey<'a> = (
    &'a str,
    Option<HttpMethod>,
    &'a SourceLocation,
    &'a [String],
);

fn traversal_key(endpoint: &Endpoint) -> TraversalKey<'_> {
    (
        endpoint.path.as_str(),
        endpoint.method,
        &endpoint.location,
        endpoint.mount_chain.as_slice(),
    )
}

/// Applies validity and duplicate policy. Never fails.
pub struct Reducer {
    verbose: bool,
}

impl Reducer {
    /// Creates a reducer. With `verbose`, every drop and override is reported
    /// at `warn` level instead of `debug`.
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Reduces `endpoints` to a valid, duplicate-free, ordered set.
    pub fn reduce(&self, endpoints: Vec<Endpoint>) -> Vec<Endpoint> {
        let mut valid = Vec::with_capacity(endpoints.len());
        for mut endpoint in endpoints {
            match invalid_reason(&endpoint) {
                Some(reason) => {
                    endpoint.status = ResolutionStatus::Invalid;
                    self.report(&format!("Dropping {}: {}", endpoint.label(), reason));
                }
                None => valid.push(endpoint),
            }
        }

        valid.sort_by(|a, b| traversal_key(a).cmp(&traversal_key(b)));

        let mut reduced: Vec<Endpoint> = Vec::with_capacity(valid.len());
        for endpoint in valid {
            if let Some(previous) = reduced.last_mut() {
                if previous.method == endpoint.method && previous.path == endpoint.path {
                    self.report(&format!(
                        "{} overrides the declaration at {}",
                        endpoint.label(),
                        previous.location
                    ));
                    *previous = endpoint;
                    continue;
                }
            }
            reduced.push(endpoint);
        }

        reduced
    }

    fn report(&self, message: &str) {
        if self.verbose {
            warn!("{}", message);
        } else {
            debug!("{}", message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Response, SchemaNode, StatusCode};

    fn endpoint(method: Option<HttpMethod>, path: &str, file: &str, line: usize) -> Endpoint {
        Endpoint {
            method,
            path: path.into(),
            router: None,
            summary: None,
            description: None,
            tags: vec![],
            operation_id: None,
            deprecated: false,
            excluded: false,
            parameters: vec![],
            request: None,
            responses: vec![],
            location: SourceLocation::new(file, line),
            mount_chain: vec![],
            status: ResolutionStatus::Resolved,
        }
    }

    fn routes(endpoints: &[Endpoint]) -> Vec<String> {
        endpoints
            .iter()
            .map(|e| format!("{} {}", e.method.map(|m| m.as_str()).unwrap_or("?"), e.path))
            .collect()
    }

    #[test]
    fn test_invalid_endpoints_are_dropped() {
        let mut unresolved = endpoint(Some(HttpMethod::Get), "/pets", "a.go", 3);
        unresolved.responses.push(Response {
            status: StatusCode::Code(200),
            schema: Some(SchemaNode::reference("Pet")),
            description: None,
        });
        let mut excluded = endpoint(Some(HttpMethod::Get), "/internal", "a.go", 4);
        excluded.excluded = true;

        let reduced = Reducer::new(false).reduce(vec![
            endpoint(None, "/users", "a.go", 1),
            endpoint(Some(HttpMethod::Get), "", "a.go", 2),
            unresolved,
            excluded,
            endpoint(Some(HttpMethod::Get), "/ok", "a.go", 5),
        ]);

        assert_eq!(routes(&reduced), vec!["GET /ok"]);
    }

    #[test]
    fn test_invalid_reason_precedence() {
        let mut e = endpoint(None, "", "a.go", 1);
        e.excluded = true;
        assert_eq!(invalid_reason(&e), Some(DropReason::InvalidMethod));
        e.method = Some(HttpMethod::Get);
        assert_eq!(invalid_reason(&e), Some(DropReason::EmptyPath));
        e.path = "/x".into();
        assert_eq!(invalid_reason(&e), Some(DropReason::Excluded));
    }

    #[test]
    fn test_duplicate_keeps_later_declaration() {
        let mut generic = endpoint(Some(HttpMethod::Get), "/v1/users", "a_generic.go", 10);
        generic.summary = Some("generic".into());
        let mut specific = endpoint(Some(HttpMethod::Get), "/v1/users", "b_specific.go", 2);
        specific.summary = Some("specific".into());

        for input in [
            vec![generic.clone(), specific.clone()],
            vec![specific.clone(), generic.clone()],
        ] {
            let reduced = Reducer::new(true).reduce(input);
            assert_eq!(reduced.len(), 1);
            assert_eq!(reduced[0].summary.as_deref(), Some("specific"));
        }
    }

    #[test]
    fn test_output_is_ordered_by_path_then_method() {
        let reduced = Reducer::new(false).reduce(vec![
            endpoint(Some(HttpMethod::Delete), "/b", "x.go", 1),
            endpoint(Some(HttpMethod::Post), "/a", "x.go", 2),
            endpoint(Some(HttpMethod::Get), "/b", "x.go", 3),
            endpoint(Some(HttpMethod::Get), "/a", "x.go", 4),
        ]);
        assert_eq!(routes(&reduced), vec!["GET /a", "POST /a", "GET /b", "DELETE /b"]);
    }

    #[test]
    fn test_same_method_different_paths_are_kept() {
        let reduced = Reducer::new(false).reduce(vec![
            endpoint(Some(HttpMethod::Get), "/v1/users", "x.go", 1),
            endpoint(Some(HttpMethod::Get), "/v2/users", "x.go", 1),
        ]);
        assert_eq!(reduced.len(), 2);
    }

    #[test]
    fn test_permutations_reduce_identically() {
        let base = vec![
            endpoint(Some(HttpMethod::Put), "/users/{id}", "u.go", 8),
            endpoint(Some(HttpMethod::Get), "/users", "u.go", 1),
            endpoint(Some(HttpMethod::Get), "/users", "v.go", 1),
            endpoint(Some(HttpMethod::Post), "/users", "u.go", 4),
            endpoint(None, "/users", "u.go", 9),
        ];
        let expected = Reducer::new(false).reduce(base.clone());

        let mut reversed = base.clone();
        reversed.reverse();
        let mut rotated = base;
        rotated.rotate_left(2);

        assert_eq!(Reducer::new(false).reduce(reversed), expected);
        assert_eq!(Reducer::new(false).reduce(rotated), expected);
        assert_eq!(expected[0].location, SourceLocation::new("v.go", 1));
    }
}
