//! User routes.

use actix_identity::Identity;
use actix_web::{http::header, http::Method, web, HttpMessage, HttpRequest, HttpResponse};
use portal_models::User;
use serde::Deserialize;
use tracing::{info, warn};

use crate::{
    blueprint::Blueprint,
    login::{local_next, login_redirect_location, safe_next, CurrentUser},
    server::AppContext,
    Result, ServerError,
};

/// Job sent after a successful registration.
pub const WELCOME_EMAIL_JOB: &str = "send_welcome_email";

pub fn blueprint() -> Blueprint {
    Blueprint::new("users", "/users")
        .endpoint("login", Method::GET, "/login", || web::route().to(login))
        .endpoint("login_submit", Method::POST, "/login", || {
            web::route().to(login_submit)
        })
        .endpoint("logout", Method::GET, "/logout", || web::route().to(logout))
        .endpoint("register", Method::POST, "/register", || {
            web::route().to(register)
        })
        .endpoint("profile", Method::GET, "/profile", || web::route().to(profile))
}

#[derive(Debug, Deserialize)]
pub struct NextQuery {
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    username: String,
    password: String,
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    username: String,
    email: String,
    password: String,
}

fn redirect(location: String) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}

async fn login(
    ctx: web::Data<AppContext>,
    identity: Option<Identity>,
    query: web::Query<NextQuery>,
) -> Result<HttpResponse> {
    let manager = &ctx.extensions.login_manager;
    if manager.current_user(identity.as_ref()).await?.is_some() {
        return Ok(redirect(ctx.registry.url_for("home.index")?));
    }

    let mut action = ctx.registry.url_for("users.login_submit")?;
    if let Some(next) = local_next(query.next.as_deref()) {
        action = login_redirect_location(&action, next);
    }
    let tpl = format!(
        r#"
        <!doctype html>
        <html>
        <head><title>Login</title></head>
        <body>
            <form method="post" action="{action}">
            Username: <input name="username"></input>
            Password: <input name="password" type="password"></input>
            <button type="submit">Submit</button>
            </form>
        </body>
        </html>
        "#
    );

    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(tpl))
}

async fn login_submit(
    req: HttpRequest,
    ctx: web::Data<AppContext>,
    query: web::Query<NextQuery>,
    form: web::Form<LoginForm>,
) -> Result<HttpResponse> {
    let LoginForm {
        username,
        password,
        next,
    } = form.into_inner();
    let next = next.or_else(|| query.into_inner().next);

    let user = ctx
        .extensions
        .db_service
        .users_get_by_username(&username)
        .await?;

    // Unknown and inactive users pay the same bcrypt cost as a wrong password.
    let hasher = ctx.extensions.password_hasher;
    let authenticated = web::block(move || match user {
        Some(user) => {
            let valid = user.check_password(&hasher, &password)?;
            Ok::<_, portal_crypto::CryptoError>((valid && user.active).then_some(user))
        }
        None => {
            hasher.verify_missing(&password);
            Ok(None)
        }
    })
    .await??;

    match authenticated {
        Some(user) => {
            Identity::login(&req.extensions(), user.id.to_string()).map_err(|e| {
                ServerError::SessionError {
                    message: e.to_string(),
                }
            })?;
            info!(user_id = user.id, message = "User logged in");

            let fallback = ctx.registry.url_for("home.index")?;
            Ok(redirect(safe_next(next.as_deref(), fallback)))
        }
        None => {
            warn!(username = %username, message = "Invalid login attempt");
            Ok(HttpResponse::Unauthorized().json(serde_json::json!({
                "error": "Invalid credentials"
            })))
        }
    }
}

async fn logout(ctx: web::Data<AppContext>, identity: Option<Identity>) -> Result<HttpResponse> {
    if let Some(identity) = identity {
        identity.logout();
    }

    Ok(redirect(
        ctx.registry
            .url_for(ctx.extensions.login_manager.login_view())?,
    ))
}

async fn register(
    ctx: web::Data<AppContext>,
    form: web::Json<RegisterForm>,
) -> Result<HttpResponse> {
    let RegisterForm {
        username,
        email,
        password,
    } = form.into_inner();

    if username.trim().is_empty() || password.is_empty() {
        return Err(ServerError::InvalidForm {
            reason: "username and password are required".into(),
        });
    }
    if !email.contains('@') {
        return Err(ServerError::InvalidForm {
            reason: format!("invalid email '{email}'"),
        });
    }

    let hasher = ctx.extensions.password_hasher;
    let user = web::block(move || {
        User {
            username: username.trim().into(),
            email,
            active: true,
            ..Default::default()
        }
        .with_password(&hasher, &password)
    })
    .await??;

    let user = ctx.extensions.db_service.users_create(user).await?;
    let job = ctx
        .extensions
        .job_queue
        .enqueue(
            &ctx.config.jobs.default_queue,
            WELCOME_EMAIL_JOB,
            serde_json::json!({"user_id": user.id, "email": user.email}),
        )
        .await?;

    info!(user_id = user.id, job_id = %job.id, message = "User registered");
    Ok(HttpResponse::Created().json(serde_json::json!({
        "user": user,
        "job_id": job.id,
    })))
}

async fn profile(CurrentUser(user): CurrentUser) -> HttpResponse {
    HttpResponse::Ok().json(user)
}
