//! Route groups and the dispatch table.

use std::collections::BTreeMap;

use actix_web::{http::Method, web, Route};
use serde::Serialize;

use crate::{Result, ServerError};

/// Builds the handler of an endpoint. The method guard is added on mount.
pub type RouteFactory = fn() -> Route;

/// Single path/handler binding of a blueprint.
#[derive(Clone)]
pub struct Endpoint {
    name: &'static str,
    method: Method,
    path: &'static str,
    factory: RouteFactory,
}

/// Named group of endpoints sharing a path prefix.
#[derive(Clone)]
pub struct Blueprint {
    name: &'static str,
    url_prefix: &'static str,
    endpoints: Vec<Endpoint>,
}

impl Blueprint {
    /// Create an empty blueprint.
    pub fn new(name: &'static str, url_prefix: &'static str) -> Self {
        Self {
            name,
            url_prefix,
            endpoints: Vec::new(),
        }
    }

    /// Add an endpoint.
    pub fn endpoint(
        mut self,
        name: &'static str,
        method: Method,
        path: &'static str,
        factory: RouteFactory,
    ) -> Self {
        self.endpoints.push(Endpoint {
            name,
            method,
            path,
            factory,
        });
        self
    }

    pub fn name(&self) -> &str {
        self.name
    }

    fn full_path(&self, endpoint: &Endpoint) -> String {
        let path = format!("{}{}", self.url_prefix, endpoint.path);
        if path.is_empty() {
            "/".into()
        } else {
            path
        }
    }
}

/// Dispatch table entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteEntry {
    /// `<blueprint>.<endpoint>`
    pub endpoint: String,
    pub method: String,
    pub path: String,
}

/// Application dispatch table.
///
/// Entries are keyed by endpoint name, so the table does not depend on
/// registration order.
#[derive(Default)]
pub struct BlueprintRegistry {
    blueprints: Vec<&'static str>,
    routes: BTreeMap<String, RouteEntry>,
    factories: BTreeMap<String, (Method, RouteFactory)>,
}

impl BlueprintRegistry {
    pub fn new() -> Self {
        Default::default()
    }

    /// Register every endpoint of a blueprint.
    ///
    /// Nothing is registered when the blueprint name or one of its
    /// method/path bindings is already taken.
    pub fn register(&mut self, blueprint: Blueprint) -> Result<()> {
        if self.blueprints.contains(&blueprint.name) {
            return Err(ServerError::DuplicateBlueprint {
                name: blueprint.name.into(),
            });
        }

        let mut pending: Vec<RouteEntry> = Vec::with_capacity(blueprint.endpoints.len());
        for endpoint in &blueprint.endpoints {
            let entry = RouteEntry {
                endpoint: format!("{}.{}", blueprint.name, endpoint.name),
                method: endpoint.method.to_string(),
                path: blueprint.full_path(endpoint),
            };

            let clash = self
                .routes
                .values()
                .chain(pending.iter())
                .find(|e| {
                    e.endpoint == entry.endpoint || (e.method == entry.method && e.path == entry.path)
                });
            if let Some(existing) = clash {
                return Err(ServerError::DuplicateRoute {
                    method: entry.method,
                    path: entry.path,
                    endpoint: entry.endpoint,
                    existing: existing.endpoint.clone(),
                });
            }

            pending.push(entry);
        }

        for (entry, endpoint) in pending.into_iter().zip(blueprint.endpoints) {
            tracing::debug!(
                endpoint = %entry.endpoint,
                method = %entry.method,
                path = %entry.path,
                message = "Registering route"
            );
            self.factories.insert(
                entry.endpoint.clone(),
                (endpoint.method, endpoint.factory),
            );
            self.routes.insert(entry.endpoint.clone(), entry);
        }
        self.blueprints.push(blueprint.name);

        Ok(())
    }

    /// Resolve an endpoint name to its path.
    pub fn url_for(&self, endpoint: &str) -> Result<String> {
        self.routes
            .get(endpoint)
            .map(|e| e.path.clone())
            .ok_or_else(|| ServerError::UnknownEndpoint {
                name: endpoint.into(),
            })
    }

    /// Dispatch table, sorted by endpoint name.
    pub fn routes(&self) -> Vec<RouteEntry> {
        self.routes.values().cloned().collect()
    }

    /// Registered blueprint names, in registration order.
    pub fn blueprints(&self) -> &[&'static str] {
        &self.blueprints
    }

    /// Mount every route.
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        for (name, (method, factory)) in &self.factories {
            if let Some(entry) = self.routes.get(name) {
                cfg.route(&entry.path, factory().method(method.clone()));
            }
        }
    }
}
