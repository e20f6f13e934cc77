//! Landing routes.

use actix_identity::Identity;
use actix_web::{http::Method, web, HttpResponse};
use actix_web_httpauth::extractors::basic::BasicAuth;

use crate::{blueprint::Blueprint, server::AppContext};

pub fn blueprint() -> Blueprint {
    Blueprint::new("home", "")
        .endpoint("index", Method::GET, "/", || web::route().to(index))
        .endpoint("status", Method::GET, "/status", || web::route().to(status))
}

async fn index(
    ctx: web::Data<AppContext>,
    identity: Option<Identity>,
) -> crate::Result<HttpResponse> {
    let user = ctx
        .extensions
        .login_manager
        .current_user(identity.as_ref())
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": format!("Welcome on {}!", ctx.config.name),
        "user": user.map(|u| u.username),
    })))
}

async fn status(
    ctx: web::Data<AppContext>,
    credentials: Option<BasicAuth>,
) -> actix_web::Result<HttpResponse> {
    ctx.extensions
        .basic_auth
        .authenticate(credentials.as_ref())?;

    let queue = &ctx.config.jobs.default_queue;
    let db_status = ctx.extensions.db_service.health_check().await.is_ok();
    let pending_jobs = ctx.extensions.job_queue.queue_length(queue).await.ok();

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "version": ctx.config.version,
        "profile": ctx.config.profile.name(),
        "database": db_status,
        "jobs": pending_jobs.is_some(),
        "pending_jobs": pending_jobs,
    })))
}
