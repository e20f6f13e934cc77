use async_trait::async_trait;
use clap::Parser;

use crate::{
    commands::{Command, CommandContext},
    Result,
};

/// Show resolved settings, secrets masked
#[derive(Parser)]
pub(crate) struct ConfigShowCommand;

#[async_trait]
impl Command for ConfigShowCommand {
    async fn execute(self, ctx: CommandContext) -> Result<()> {
        let mut writer = ctx.writer.write().await;
        writeln!(writer, "# profile: {}", ctx.config.profile)?;

        for (key, value) in ctx.config.settings.redacted().iter() {
            writeln!(writer, "{key}={value}")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::testutils::{test_command, CommandContextTest};

    #[tokio::test]
    async fn run() {
        let output = test_command(CommandContextTest::new(), &["config", "show"]).await;
        let mut lines = output.lines();

        assert_eq!(lines.next(), Some("# profile: testing"));
        assert!(output.contains("\nAPP_ENV=testing\n"));
        assert!(output.contains("\nSECRET_KEY=********\n"));
        assert!(output.contains("\nDATABASE_DRIVER=memory\n"));
        assert!(!output.contains("testing-secret-key"));
    }
}
