#![deny(missing_docs)]

//! # Reference Resolution
//!
//! Binds every `Reference` reachable from an endpoint's schema trees to its
//! Component, walking component bodies depth-first with three-colour marks so
//! that reference cycles abort instead of recursing forever.
//!
//! Endpoints are visited in source order, which makes the reported failure the
//! same on every run regardless of how the input was discovered.

use crate::error::{AppError, AppResult};
use crate::model::{Component, ComponentTable, ResolutionStatus, SchemaHolder};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// DFS colour of a component. Absent from the map means unvisited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    InProgress,
    Resolved,
}

/// Resolves symbolic references against a read-only Component Table.
pub struct ReferenceResolver<'a> {
    components: &'a ComponentTable,
}

impl<'a> ReferenceResolver<'a> {
    /// Creates a resolver over `components`.
    pub fn new(components: &'a ComponentTable) -> Self {
        Self { components }
    }

    /// Binds every reference in `endpoints`.
    ///
    /// The first `UnresolvedReference` or `ReferenceCycle` aborts the whole
    /// call. Bindings made before the failure are left in place but the caller
    /// is expected to discard the run.
    pub fn resolve<E: SchemaHolder>(&self, endpoints: &mut [E]) -> AppResult<()> {
        let mut marks: HashMap<String, Mark> = HashMap::new();

        let mut order: Vec<usize> = (0..endpoints.len()).collect();
        order.sort_by(|a, b| endpoints[*a].location().cmp(endpoints[*b].location()));

        let mut bound = 0usize;
        for idx in order {
            let endpoint = &mut endpoints[idx];
            let label = endpoint.label();

            for schema in endpoint.schemas_mut() {
                schema.try_visit_references_mut(&mut |reference| {
                    let component = self.lookup(&reference.target, &label)?;
                    self.visit(component, &mut marks, &mut Vec::new(), &label)?;
                    reference.bind(component);
                    bound += 1;
                    Ok(())
                })?;
            }

            endpoint.set_status(ResolutionStatus::Resolved);
        }

        debug!(
            references = bound,
            components = marks.len(),
            "Bound schema references"
        );
        Ok(())
    }

    fn lookup(&self, identifier: &str, endpoint: &str) -> AppResult<&'a Arc<Component>> {
        self.components
            .get(identifier)
            .ok_or_else(|| AppError::UnresolvedReference {
                endpoint: endpoint.to_string(),
                identifier: identifier.to_string(),
            })
    }

    /// Walks a component body. `path` holds the components currently
    /// in progress, outermost first.
    fn visit(
        &self,
        component: &'a Arc<Component>,
        marks: &mut HashMap<String, Mark>,
        path: &mut Vec<String>,
        endpoint: &str,
    ) -> AppResult<()> {
        match marks.get(&component.name) {
            Some(Mark::Resolved) => return Ok(()),
            Some(Mark::InProgress) => {
                let start = path
                    .iter()
                    .position(|name| *name == component.name)
                    .unwrap_or(0);
                let mut chain = path[start..].to_vec();
                chain.push(component.name.clone());
                return Err(AppError::ReferenceCycle { chain });
            }
            None => {}
        }

        marks.insert(component.name.clone(), Mark::InProgress);
        path.push(component.name.clone());

        for reference in component.schema.references() {
            let via = format!("{} via component '{}'", endpoint, component.name);
            let target = self.lookup(&reference.target, &via)?;
            self.visit(target, marks, path, endpoint)?;
            reference.bind(target);
        }

        path.pop();
        marks.insert(component.name.clone(), Mark::Resolved);
        Ok(())
    }
}
