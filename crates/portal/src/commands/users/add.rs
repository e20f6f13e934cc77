use async_trait::async_trait;
use clap::Parser;
use portal_crypto::PasswordHasher;
use portal_models::User;

use crate::{
    commands::{Command, CommandContext},
    Result,
};

/// Create a user
#[derive(Parser)]
pub(crate) struct UserAddCommand {
    /// Username
    pub username: String,
    /// Email address
    pub email: String,
    /// Password
    pub password: String,
    /// Create the user as inactive
    #[arg(long)]
    pub inactive: bool,
}

#[async_trait]
impl Command for UserAddCommand {
    async fn execute(self, ctx: CommandContext) -> Result<()> {
        let hasher = PasswordHasher::new(ctx.config.bcrypt_log_rounds)?;
        let user = User {
            username: self.username,
            email: self.email,
            active: !self.inactive,
            ..Default::default()
        }
        .with_password(&hasher, &self.password)?;

        let user = ctx.db_service.users_create(user).await?;

        writeln!(
            ctx.writer.write().await,
            "User '{}' created with ID {}.",
            user.username,
            user.id
        )?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use portal_database_interface::DbService;
    use pretty_assertions::assert_eq;

    use crate::testutils::{test_command, CommandContextTest};

    #[tokio::test]
    async fn run() -> Result<(), Box<dyn Error>> {
        let ctx = CommandContextTest::new();
        let db = ctx.db_service.clone();

        assert_eq!(
            test_command(ctx, &["users", "add", "me", "me@example.com", "hunter2"]).await,
            "User 'me' created with ID 1.\n"
        );

        let user = db.users_get_by_username_expect("me").await?;
        assert!(user.active);
        assert!(user.password_hash.starts_with("$2b$04$"));

        Ok(())
    }

    #[tokio::test]
    async fn run_inactive() -> Result<(), Box<dyn Error>> {
        let ctx = CommandContextTest::new();
        let db = ctx.db_service.clone();

        test_command(
            ctx,
            &["users", "add", "me", "me@example.com", "hunter2", "--inactive"],
        )
        .await;

        assert!(!db.users_get_expect(1).await?.active);

        Ok(())
    }
}
