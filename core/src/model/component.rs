#![deny(missing_docs)]

//! # Component Table
//!
//! Flat `name -> Component` store. Edges between components are names inside
//! schema bodies, never owning links, so cyclic graphs stay representable.

use crate::error::{AppError, AppResult};
use crate::model::location::SourceLocation;
use crate::model::schema::SchemaNode;
use indexmap::IndexMap;
use std::sync::Arc;

/// A named, reusable schema fragment.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    /// Unique name within the table.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Schema body; may contain references to other components.
    pub schema: SchemaNode,
    /// Declaring source location.
    pub location: SourceLocation,
}

/// Store of every Component discovered during extraction.
///
/// Populated once, read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComponentTable {
    components: IndexMap<String, Arc<Component>>,
}

impl ComponentTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a component. Names must be unique.
    pub fn insert(&mut self, component: Component) -> AppResult<()> {
        if let Some(existing) = self.components.get(&component.name) {
            return Err(AppError::ExtractionFailure(format!(
                "Component '{}' declared at {} is already declared at {}",
                component.name, component.location, existing.location
            )));
        }
        self.components
            .insert(component.name.clone(), Arc::new(component));
        Ok(())
    }

    /// Looks a component up by name.
    pub fn get(&self, name: &str) -> Option<&Arc<Component>> {
        self.components.get(name)
    }

    /// Whether a component with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.components.contains_key(name)
    }

    /// Number of components.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Components sorted by name, for reproducible output.
    pub fn sorted(&self) -> Vec<&Arc<Component>> {
        let mut all: Vec<&Arc<Component>> = self.components.values().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all
    }
}
