#![deny(missing_docs)]

//! # Router Topology Resolution
//!
//! Turns `(owning router, relative fragment)` pairs into absolute paths.
//!
//! Every router gets the set of its mount chains, i.e. every root-to-router walk
//! through the mount graph. An endpoint on a router with `n` chains fans out
//! into `n` endpoints that share the original declaration's location. Duplicate
//! `(method, path)` pairs produced here are left for the reducer.

use crate::error::{AppError, AppResult};
use crate::model::{Endpoint, Mount, RouterGraph, SchemaHolder};
use indexmap::IndexMap;
use std::collections::HashMap;
use tracing::debug;

/// Collapses repeated separators, strips the trailing one and prefixes exactly
/// one leading separator. The empty path normalizes to `/`.
///
/// ```
/// use apidoc_core::topology::normalize_path;
///
/// assert_eq!(normalize_path("//v1//users/"), "/v1/users");
/// assert_eq!(normalize_path(""), "/");
/// ```
pub fn normalize_path(raw: &str) -> String {
    let segments: Vec<&str> = raw
        .split('/')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    format!("/{}", segments.join("/"))
}

/// One root-to-router walk.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct MountChain {
    /// Normalized path contributed by the walk.
    pub prefix: String,
    /// Router identifiers, root first.
    pub routers: Vec<String>,
}

/// Resolves relative endpoint paths against a read-only router graph.
pub struct TopologyResolver<'a> {
    graph: &'a RouterGraph,
}

impl<'a> TopologyResolver<'a> {
    /// Creates a resolver over `graph`.
    pub fn new(graph: &'a RouterGraph) -> Self {
        Self { graph }
    }

    /// Computes the mount chains of every router, keyed by identifier in
    /// identifier order.
    ///
    /// Fails with `DanglingRouter` when a mount edge names an undeclared router
    /// and with `RouterCycle` when a router is its own ancestor.
    pub fn mount_chains(&self) -> AppResult<IndexMap<String, Vec<MountChain>>> {
        self.check_mounts()?;

        let mut ids: Vec<&str> = self.graph.routers().map(|r| r.id.as_str()).collect();
        ids.sort_unstable();

        let mut memo: HashMap<String, Vec<MountChain>> = HashMap::new();
        let mut all = IndexMap::new();
        for id in ids {
            let chains = self.chains_of(id, &mut memo, &mut Vec::new())?;
            all.insert(id.to_string(), chains);
        }

        debug!(
            routers = all.len(),
            roots = self.graph.roots().count(),
            "Computed mount chains"
        );
        Ok(all)
    }

    /// Rewrites every endpoint's path into its absolute form(s).
    ///
    /// Endpoints without an owning router are treated as mounted at the root.
    /// An empty fragment stays empty so the reducer can drop it.
    pub fn resolve(&self, endpoints: Vec<Endpoint>) -> AppResult<Vec<Endpoint>> {
        let chains = self.mount_chains()?;

        let mut endpoints = endpoints;
        endpoints.sort_by(|a, b| a.location.cmp(&b.location));

        let mut resolved = Vec::with_capacity(endpoints.len());
        for endpoint in endpoints {
            let Some(router) = endpoint.router.clone() else {
                let mut endpoint = endpoint;
                endpoint.path = absolute("", &endpoint.path);
                resolved.push(endpoint);
                continue;
            };

            let router_chains =
                chains
                    .get(&router)
                    .ok_or_else(|| AppError::DanglingRouter {
                        router: router.clone(),
                        referrer: endpoint.label(),
                    })?;

            if router_chains.len() > 1 {
                debug!(
                    endpoint = %endpoint.label(),
                    chains = router_chains.len(),
                    "Fanning out endpoint over multiple mount points"
                );
            }

            for chain in router_chains {
                let mut copy = endpoint.clone();
                copy.path = absolute(&chain.prefix, &endpoint.path);
                copy.mount_chain = chain.routers.clone();
                resolved.push(copy);
            }
        }

        Ok(resolved)
    }

    fn check_mounts(&self) -> AppResult<()> {
        let mut mounts: Vec<&Mount> = self.graph.mounts().iter().collect();
        mounts.sort_by(|a, b| a.location.cmp(&b.location));

        for mount in mounts {
            for id in [&mount.parent, &mount.child] {
                if !self.graph.contains(id) {
                    return Err(AppError::DanglingRouter {
                        router: id.clone(),
                        referrer: format!(
                            "mount of '{}' under '{}' ({})",
                            mount.child, mount.parent, mount.location
                        ),
                    });
                }
            }
        }
        Ok(())
    }

    /// `in_progress` holds the routers being expanded, from the starting
    /// router upwards through its ancestors.
    fn chains_of(
        &self,
        id: &str,
        memo: &mut HashMap<String, Vec<MountChain>>,
        in_progress: &mut Vec<String>,
    ) -> AppResult<Vec<MountChain>> {
        if let Some(done) = memo.get(id) {
            return Ok(done.clone());
        }
        if let Some(pos) = in_progress.iter().position(|r| r == id) {
            let mut chain = in_progress[pos..].to_vec();
            chain.push(id.to_string());
            chain.reverse();
            return Err(AppError::RouterCycle { chain });
        }

        let router = self
            .graph
            .get(id)
            .ok_or_else(|| AppError::DanglingRouter {
                router: id.to_string(),
                referrer: "router hierarchy".to_string(),
            })?;

        let mut parents: Vec<&Mount> = self.graph.parents(id).collect();
        parents.sort_by(|a, b| {
            (&a.parent, &a.path, &a.location).cmp(&(&b.parent, &b.path, &b.location))
        });

        in_progress.push(id.to_string());
        let mut out = Vec::new();
        if parents.is_empty() {
            out.push(MountChain {
                prefix: normalize_path(&router.segment),
                routers: vec![id.to_string()],
            });
        }
        for mount in parents {
            for parent_chain in self.chains_of(&mount.parent, memo, in_progress)? {
                let mut routers = parent_chain.routers;
                routers.push(id.to_string());
                out.push(MountChain {
                    prefix: normalize_path(&format!(
                        "{}/{}/{}",
                        parent_chain.prefix, mount.path, router.segment
                    )),
                    routers,
                });
            }
        }
        in_progress.pop();

        out.sort();
        out.dedup();
        memo.insert(id.to_string(), out.clone());
        Ok(out)
    }
}

fn absolute(prefix: &str, fragment: &str) -> String {
    if fragment.trim().is_empty() {
        return String::new();
    }
    normalize_path(&format!("{}/{}", prefix, fragment))
}
