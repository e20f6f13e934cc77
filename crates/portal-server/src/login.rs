//! Session login management.

use std::{num::ParseIntError, sync::Arc};

use actix_identity::Identity;
use actix_web::{
    dev::Payload, error::InternalError, http::header, web, FromRequest, HttpRequest, HttpResponse,
};
use async_trait::async_trait;
use futures::future::LocalBoxFuture;
use portal_database_interface::{DatabaseError, DbService};
use portal_models::User;
use thiserror::Error;
use tracing::warn;

use crate::{server::AppContext, ServerError};

/// Login error.
#[derive(Debug, Error)]
pub enum LoginError {
    #[error("Invalid user ID '{}',\n  caused by: {}", value, source)]
    InvalidUserId {
        value: String,
        source: ParseIntError,
    },

    #[error("No user loader registered")]
    MissingUserLoader,

    #[error("Database error,\n  caused by: {}", source)]
    DatabaseError { source: DatabaseError },
}

/// Resolves a session identifier to a user.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserLoader: Send + Sync {
    async fn load_user(&self, user_id: &str) -> Result<Option<User>, LoginError>;
}

/// Loads users by primary key.
pub struct DbUserLoader {
    db_service: Arc<dyn DbService>,
}

impl DbUserLoader {
    pub fn new(db_service: Arc<dyn DbService>) -> Self {
        Self { db_service }
    }
}

#[async_trait]
impl UserLoader for DbUserLoader {
    #[tracing::instrument(skip(self), ret)]
    async fn load_user(&self, user_id: &str) -> Result<Option<User>, LoginError> {
        let id: u64 = user_id.parse().map_err(|e| LoginError::InvalidUserId {
            value: user_id.into(),
            source: e,
        })?;

        self.db_service
            .users_get(id)
            .await
            .map_err(|e| LoginError::DatabaseError { source: e })
    }
}

/// Tracks who is logged in.
pub struct LoginManager {
    login_view: String,
    user_loader: Option<Arc<dyn UserLoader>>,
}

impl LoginManager {
    /// Create a manager redirecting anonymous users to `login_view`.
    pub fn new<T: Into<String>>(login_view: T) -> Self {
        Self {
            login_view: login_view.into(),
            user_loader: None,
        }
    }

    pub fn set_user_loader(&mut self, loader: Arc<dyn UserLoader>) {
        self.user_loader = Some(loader);
    }

    /// Endpoint name of the login page.
    pub fn login_view(&self) -> &str {
        &self.login_view
    }

    pub async fn load_user(&self, user_id: &str) -> Result<Option<User>, LoginError> {
        match &self.user_loader {
            Some(loader) => loader.load_user(user_id).await,
            None => Err(LoginError::MissingUserLoader),
        }
    }

    /// User behind a session identity.
    ///
    /// Unreadable or malformed identities count as anonymous.
    pub async fn current_user(
        &self,
        identity: Option<&Identity>,
    ) -> Result<Option<User>, LoginError> {
        let Some(identity) = identity else {
            return Ok(None);
        };

        let user_id = match identity.id() {
            Ok(id) => id,
            Err(e) => {
                warn!(error = %e, message = "Unreadable session identity");
                return Ok(None);
            }
        };

        match self.load_user(&user_id).await {
            Err(e @ LoginError::InvalidUserId { .. }) => {
                warn!(error = %e, message = "Ignoring malformed session identity");
                Ok(None)
            }
            other => other,
        }
    }
}

/// Logged-in user. Anonymous requests are redirected to the login view.
pub struct CurrentUser(pub User);

impl FromRequest for CurrentUser {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        Box::pin(extract_current_user(req.clone()))
    }
}

async fn extract_current_user(req: HttpRequest) -> Result<CurrentUser, actix_web::Error> {
    let identity = Option::<Identity>::extract(&req).await.ok().flatten();
    let ctx = req
        .app_data::<web::Data<AppContext>>()
        .cloned()
        .ok_or(ServerError::MissingContext)?;

    let manager = &ctx.extensions.login_manager;
    match manager
        .current_user(identity.as_ref())
        .await
        .map_err(ServerError::from)?
    {
        Some(user) => Ok(CurrentUser(user)),
        None => {
            let login_url = ctx.registry.url_for(manager.login_view())?;
            let location = login_redirect_location(&login_url, req.path());

            Err(InternalError::from_response(
                "login required",
                HttpResponse::Found()
                    .insert_header((header::LOCATION, location))
                    .finish(),
            )
            .into())
        }
    }
}

pub(crate) fn login_redirect_location(login_url: &str, next: &str) -> String {
    let next: String = url::form_urlencoded::byte_serialize(next.as_bytes()).collect();
    format!("{login_url}?next={next}")
}

/// `next` when it stays on this site.
pub(crate) fn local_next(next: Option<&str>) -> Option<&str> {
    next.filter(|n| n.starts_with('/') && !n.starts_with("//") && !n.starts_with("/\\"))
}

/// Keep redirects on this site.
pub(crate) fn safe_next(next: Option<&str>, fallback: String) -> String {
    local_next(next).map(Into::into).unwrap_or(fallback)
}
