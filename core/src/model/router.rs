#![deny(missing_docs)]

//! # Router Hierarchy
//!
//! Routers are nodes keyed by identifier; mount relationships are an explicit
//! edge list so that one router may be mounted under several parents.

use crate::error::{AppError, AppResult};
use crate::model::location::SourceLocation;
use indexmap::IndexMap;

/// A node in the mount hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Router {
    /// Router identifier.
    pub id: String,
    /// The router's own relative path segment (may be empty).
    pub segment: String,
    /// Declaring source location.
    pub location: SourceLocation,
}

/// A `(parent, child, path)` mount edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mount {
    /// Identifier of the router mounted into.
    pub parent: String,
    /// Identifier of the mounted router.
    pub child: String,
    /// Extra path placed between the parent's path and the child's segment.
    pub path: String,
    /// Declaring source location.
    pub location: SourceLocation,
}

/// The mount graph assembled during extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouterGraph {
    routers: IndexMap<String, Router>,
    mounts: Vec<Mount>,
}

impl RouterGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a router. Identifiers must be unique.
    pub fn insert_router(&mut self, router: Router) -> AppResult<()> {
        if let Some(existing) = self.routers.get(&router.id) {
            return Err(AppError::ExtractionFailure(format!(
                "Router '{}' declared at {} is already declared at {}",
                router.id, router.location, existing.location
            )));
        }
        self.routers.insert(router.id.clone(), router);
        Ok(())
    }

    /// Adds a mount edge. Identifiers are not checked here; the topology
    /// resolver reports dangling ones.
    pub fn add_mount(&mut self, mount: Mount) {
        self.mounts.push(mount);
    }

    /// Looks a router up by identifier.
    pub fn get(&self, id: &str) -> Option<&Router> {
        self.routers.get(id)
    }

    /// Whether a router with this identifier exists.
    pub fn contains(&self, id: &str) -> bool {
        self.routers.contains_key(id)
    }

    /// Number of routers.
    pub fn len(&self) -> usize {
        self.routers.len()
    }

    /// Whether the graph has no routers.
    pub fn is_empty(&self) -> bool {
        self.routers.is_empty()
    }

    /// Routers in insertion order.
    pub fn routers(&self) -> impl Iterator<Item = &Router> {
        self.routers.values()
    }

    /// All mount edges.
    pub fn mounts(&self) -> &[Mount] {
        &self.mounts
    }

    /// Edges mounting `id` under a parent.
    pub fn parents<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Mount> + 'a {
        self.mounts.iter().filter(move |m| m.child == id)
    }

    /// Routers without any parent edge.
    pub fn roots(&self) -> impl Iterator<Item = &Router> {
        self.routers
            .values()
            .filter(move |r| self.parents(&r.id).next().is_none())
    }
}
