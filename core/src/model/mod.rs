#![deny(missing_docs)]

//! # Data Model
//!
//! - **schema**: schema trees and references.
//! - **component**: the Component Table.
//! - **router**: the router mount graph.
//! - **endpoint**: raw and typed endpoint records.
//! - **location**: source provenance.

pub mod component;
pub mod endpoint;
pub mod location;
pub mod router;
pub mod schema;

pub use component::{Component, ComponentTable};
pub use endpoint::{
    Endpoint, HttpMethod, ParamLocation, Parameter, RawEndpoint, RawParam, RawRequest,
    RawResponse, RequestBody, ResolutionStatus, Response, SchemaHolder, StatusCode,
};
pub use location::SourceLocation;
pub use router::{Mount, Router, RouterGraph};
pub use schema::{Primitive, Property, Reference, SchemaNode};

/// Top-level metadata as written in the main document file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MainMeta {
    /// `@title`
    pub title: Option<String>,
    /// `@version`
    pub version: Option<String>,
    /// `@description`
    pub description: Option<String>,
    /// `@server` values.
    pub servers: Vec<String>,
    /// The main file, relative to the source directory.
    pub location: SourceLocation,
}

/// Typed top-level metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MainInfo {
    /// API title.
    pub title: String,
    /// API version.
    pub version: String,
    /// Optional description.
    pub description: Option<String>,
    /// Validated server URLs.
    pub servers: Vec<String>,
}

/// Everything the extractor found.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractionResult {
    /// Main document metadata.
    pub main: MainMeta,
    /// Endpoint blocks, in discovery order.
    pub endpoints: Vec<RawEndpoint>,
    /// Component Table.
    pub components: ComponentTable,
    /// Router hierarchy.
    pub routers: RouterGraph,
}

/// The typed model produced by the tokenizer.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenResult {
    /// Typed metadata.
    pub main: MainInfo,
    /// Typed endpoints, still carrying relative paths.
    pub endpoints: Vec<Endpoint>,
}

/// The final aggregate handed to the generator.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Metadata.
    pub info: MainInfo,
    /// Component Table.
    pub components: ComponentTable,
    /// Resolved, reduced and ordered endpoints.
    pub endpoints: Vec<Endpoint>,
}
