//! Server module.

#![warn(clippy::all)]

pub mod blueprint;
pub mod debug;
pub mod errors;
pub mod extensions;
mod health;
mod home;
pub mod login;
pub mod server;
mod users;


pub use errors::{Result, ServerError};
pub use server::{build_actix_app, build_registry, create_app, run_server, AppContext};
