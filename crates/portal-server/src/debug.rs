//! Debug toolbar routes.

use std::collections::BTreeMap;

use actix_web::{web, HttpResponse};

use crate::server::AppContext;

/// Path prefix of the debug routes.
pub const DEBUG_PREFIX: &str = "/_debug";

/// Exposes resolved settings and routes when enabled.
#[derive(Debug, Clone, Copy)]
pub struct DebugToolbar {
    enabled: bool,
}

impl DebugToolbar {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Mount the debug routes, if enabled.
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        if self.enabled {
            cfg.service(
                web::scope(DEBUG_PREFIX)
                    .route("/settings", web::get().to(settings_route))
                    .route("/routes", web::get().to(routes_route)),
            );
        }
    }
}

async fn settings_route(ctx: web::Data<AppContext>) -> HttpResponse {
    let settings = ctx.config.settings.redacted();
    let settings: BTreeMap<&str, &str> = settings.iter().collect();

    HttpResponse::Ok().json(serde_json::json!({
        "profile": ctx.config.profile.name(),
        "settings": settings,
    }))
}

async fn routes_route(ctx: web::Data<AppContext>) -> HttpResponse {
    HttpResponse::Ok().json(ctx.registry.routes())
}
