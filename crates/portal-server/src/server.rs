//! Server module.

use std::sync::Arc;

use actix_identity::IdentityMiddleware;
use actix_session::{storage::CookieSessionStore, SessionMiddleware};
use actix_web::{
    body::MessageBody,
    cookie::Key,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    error,
    middleware::{Condition, Logger},
    web::{self, Data},
    App, HttpResponse, HttpServer,
};
use actix_web_httpauth::middleware::HttpAuthentication;
use portal_config::Config;
use portal_crypto::SessionKey;
use tracing::info;

use crate::{
    blueprint::BlueprintRegistry,
    extensions::{basic_auth_validator, Extensions},
    health::health_check_route,
    home,
    login::DbUserLoader,
    users, Result, ServerError,
};

/// Name of the session cookie.
pub const SESSION_COOKIE_NAME: &str = "portal_session";

/// App context.
pub struct AppContext {
    /// Config.
    pub config: Config,
    /// Attached extensions.
    pub extensions: Extensions,
    /// Dispatch table.
    pub registry: BlueprintRegistry,
    session_key: Key,
}

impl AppContext {
    /// Register blueprints and the user loader around attached extensions.
    pub fn new(config: Config, mut extensions: Extensions) -> Result<Self> {
        let session_key = SessionKey::derive(&config.session.secret_key)
            .map(|k| Key::from(&k[..]))
            .map_err(|e| ServerError::extension("session", e))?;

        let registry = build_registry()?;
        registry.url_for(extensions.login_manager.login_view())?;

        let loader = DbUserLoader::new(Arc::clone(&extensions.db_service));
        extensions.login_manager.set_user_loader(Arc::new(loader));

        Ok(Self {
            config,
            extensions,
            registry,
            session_key,
        })
    }
}

/// Dispatch table with the `users` and `home` blueprints.
pub fn build_registry() -> Result<BlueprintRegistry> {
    let mut registry = BlueprintRegistry::new();
    registry.register(users::blueprint())?;
    registry.register(home::blueprint())?;
    Ok(registry)
}

/// Create the application from a resolved configuration.
///
/// Logging is expected to be configured already.
pub fn create_app(config: Config) -> Result<AppContext> {
    let extensions = Extensions::attach(&config)?;
    AppContext::new(config, extensions)
}

/// Build Actix app.
pub fn build_actix_app(
    context: Data<AppContext>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let session = SessionMiddleware::builder(
        CookieSessionStore::default(),
        context.session_key.clone(),
    )
    .cookie_name(SESSION_COOKIE_NAME.into())
    .cookie_secure(context.config.session.cookie_secure)
    .build();

    let routes_context = context.clone();
    let debug_context = context.clone();

    App::new()
        .app_data(context.clone())
        .wrap(Condition::new(
            context.extensions.basic_auth.force(),
            HttpAuthentication::basic(basic_auth_validator),
        ))
        .wrap(IdentityMiddleware::default())
        .wrap(session)
        .wrap(Logger::default())
        .route("/health", web::get().to(health_check_route))
        .configure(move |cfg| routes_context.registry.configure(cfg))
        .configure(move |cfg| debug_context.extensions.debug_toolbar.configure(cfg))
        .app_data(web::FormConfig::default().error_handler(|err, _req| {
            error::InternalError::from_response(
                "",
                HttpResponse::BadRequest().json(serde_json::json!({
                    "error": err.to_string()
                })),
            )
            .into()
        }))
        .app_data(web::JsonConfig::default().error_handler(|err, _req| {
            error::InternalError::from_response(
                "",
                HttpResponse::BadRequest().json(serde_json::json!({
                    "error": err.to_string()
                })),
            )
            .into()
        }))
}

/// Run server.
pub async fn run_server(context: AppContext) -> Result<()> {
    let address = get_bind_address(&context.config);

    info!(
        version = context.config.version,
        profile = context.config.profile.name(),
        address = %address,
        message = "Starting server",
    );

    run_server_internal(address, context).await
}

fn get_bind_address(config: &Config) -> String {
    format!("{}:{}", config.server.bind_ip, config.server.bind_port)
}

async fn run_server_internal(ip_with_port: String, context: AppContext) -> Result<()> {
    let context = Data::new(context);
    let cloned_context = context.clone();

    let running = {
        let mut server = HttpServer::new(move || build_actix_app(context.clone()));

        if let Some(workers) = cloned_context.config.server.workers_count {
            server = server.workers(workers as usize);
        }

        server
            .bind(ip_with_port)
            .map_err(|e| ServerError::IoError { source: e })?
            .run()
    };

    running
        .await
        .map_err(|e| ServerError::IoError { source: e })
}
