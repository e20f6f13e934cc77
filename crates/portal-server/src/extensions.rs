//! Application extensions.

use std::sync::Arc;

use actix_web::{
    dev::ServiceRequest,
    http::{header, StatusCode},
    web, Error, HttpResponse, ResponseError,
};
use actix_web_httpauth::extractors::basic::BasicAuth;
use portal_config::{BasicAuthConfig, Config, DatabaseDriver, JobQueueDriver};
use portal_crypto::{secure_compare, PasswordHasher};
use portal_database_interface::DbService;
use portal_database_memory::MemoryDb;
use portal_database_pg::{establish_lazy_pool, PostgresDb};
use portal_jobs_interface::JobQueueService;
use portal_jobs_memory::MemoryJobQueue;
use portal_jobs_redis::RedisJobQueue;
use thiserror::Error;
use tracing::info;

use crate::{debug::DebugToolbar, login::LoginManager, server::AppContext, Result, ServerError};

/// Endpoint of the login page.
pub const LOGIN_VIEW: &str = "users.login";

/// Everything attached to the application at startup.
pub struct Extensions {
    pub password_hasher: PasswordHasher,
    pub job_queue: Arc<dyn JobQueueService>,
    pub basic_auth: BasicAuthGuard,
    pub db_service: Arc<dyn DbService>,
    pub login_manager: LoginManager,
    pub debug_toolbar: DebugToolbar,
}

impl Extensions {
    /// Attach every extension, using the configured drivers.
    pub fn attach(config: &Config) -> Result<Self> {
        let password_hasher = build_password_hasher(config)?;
        let job_queue = build_job_queue(config)?;
        let basic_auth = BasicAuthGuard::new(&config.basic_auth);
        let db_service = build_db_service(config)?;

        Ok(Self {
            password_hasher,
            job_queue,
            basic_auth,
            db_service,
            login_manager: LoginManager::new(LOGIN_VIEW),
            debug_toolbar: DebugToolbar::new(config.debug_toolbar_enabled),
        })
    }

    /// Attach extensions around existing adapters.
    pub fn with_services(
        config: &Config,
        db_service: Arc<dyn DbService>,
        job_queue: Arc<dyn JobQueueService>,
    ) -> Result<Self> {
        Ok(Self {
            password_hasher: build_password_hasher(config)?,
            job_queue,
            basic_auth: BasicAuthGuard::new(&config.basic_auth),
            db_service,
            login_manager: LoginManager::new(LOGIN_VIEW),
            debug_toolbar: DebugToolbar::new(config.debug_toolbar_enabled),
        })
    }
}

fn build_password_hasher(config: &Config) -> Result<PasswordHasher> {
    PasswordHasher::new(config.bcrypt_log_rounds).map_err(|e| ServerError::extension("bcrypt", e))
}

fn build_job_queue(config: &Config) -> Result<Arc<dyn JobQueueService>> {
    match config.jobs.driver {
        JobQueueDriver::Memory => {
            info!("Using memory job queue driver");
            Ok(Arc::new(MemoryJobQueue::new()))
        }
        JobQueueDriver::Redis => {
            info!(url = %config.jobs.redis_url, message = "Using redis job queue driver");
            RedisJobQueue::new(&config.jobs.redis_url)
                .map(|q| Arc::new(q) as Arc<dyn JobQueueService>)
                .map_err(|e| ServerError::extension("rq", e))
        }
    }
}

fn build_db_service(config: &Config) -> Result<Arc<dyn DbService>> {
    match config.database.driver {
        DatabaseDriver::Memory => {
            info!("Using memory database driver");
            Ok(Arc::new(MemoryDb::new()))
        }
        DatabaseDriver::Postgres => {
            info!("Using postgres database driver");
            let pool = establish_lazy_pool(config).map_err(|e| ServerError::extension("db", e))?;
            Ok(Arc::new(PostgresDb::new(pool)))
        }
    }
}

/// HTTP basic authentication guard.
#[derive(Debug, Clone)]
pub struct BasicAuthGuard {
    username: String,
    password: String,
    realm: String,
    force: bool,
}

impl BasicAuthGuard {
    pub fn new(config: &BasicAuthConfig) -> Self {
        Self {
            username: config.username.clone(),
            password: config.password.clone(),
            realm: config.realm.clone(),
            force: config.force,
        }
    }

    /// Guard every route.
    pub fn force(&self) -> bool {
        self.force
    }

    /// Check credentials. Nothing passes when no username is configured.
    pub fn check_credentials(&self, username: &str, password: &str) -> bool {
        if self.username.is_empty() {
            return false;
        }

        let username_ok = secure_compare(username, &self.username);
        let password_ok = secure_compare(password, &self.password);
        username_ok && password_ok
    }

    /// Check extracted credentials, if any.
    pub fn authenticate(&self, credentials: Option<&BasicAuth>) -> Result<(), BasicAuthError> {
        let valid = credentials
            .map(|c| self.check_credentials(c.user_id(), c.password().unwrap_or_default()))
            .unwrap_or(false);

        if valid {
            Ok(())
        } else {
            Err(BasicAuthError {
                realm: self.realm.clone(),
            })
        }
    }
}

/// Missing or wrong basic credentials.
#[derive(Debug, Error)]
#[error("Invalid credentials")]
pub struct BasicAuthError {
    realm: String,
}

impl ResponseError for BasicAuthError {
    fn status_code(&self) -> StatusCode {
        StatusCode::UNAUTHORIZED
    }

    fn error_response(&self) -> HttpResponse {
        let challenge = if self.realm.is_empty() {
            "Basic".to_string()
        } else {
            format!("Basic realm=\"{}\"", self.realm)
        };

        HttpResponse::Unauthorized()
            .insert_header((header::WWW_AUTHENTICATE, challenge))
            .json(serde_json::json!({"error": self.to_string()}))
    }
}

/// Validator used when every route is guarded.
pub async fn basic_auth_validator(
    req: ServiceRequest,
    credentials: BasicAuth,
) -> core::result::Result<ServiceRequest, (Error, ServiceRequest)> {
    let outcome = match req.app_data::<web::Data<AppContext>>() {
        Some(ctx) => ctx
            .extensions
            .basic_auth
            .authenticate(Some(&credentials))
            .map_err(Error::from),
        None => Err(ServerError::MissingContext.into()),
    };

    match outcome {
        Ok(()) => Ok(req),
        Err(e) => Err((e, req)),
    }
}
