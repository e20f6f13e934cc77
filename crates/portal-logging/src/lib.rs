//! Log configuration.

mod format;

use std::str::FromStr;

pub use format::LogFormat;
use portal_config::Config;
use thiserror::Error;
use tracing::{Level, Subscriber};
use tracing_error::ErrorLayer;
use tracing_log::LogTracer;
use tracing_subscriber::{fmt::MakeWriter, layer::SubscriberExt, EnvFilter};

const DEFAULT_DIRECTIVES: &str = "sqlx=warn,actix_server=info";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error(
        "Could not set tracing global default subscriber,\n  caused by: {}",
        source
    )]
    TracingSetGlobalDefaultError {
        source: tracing::subscriber::SetGlobalDefaultError,
    },
    #[error("Could not initialize tracing log tracer,\n  caused by: {}", source)]
    TracingLogTracerError {
        source: tracing_log::log::SetLoggerError,
    },
    #[error(
        "Wrong env filter configuration: {}\n  caused by: {}",
        configuration,
        source
    )]
    EnvFilterConfigurationError {
        source: tracing_subscriber::filter::ParseError,
        configuration: String,
    },
}

/// Base log level: debug when testing, info otherwise.
pub fn log_level(config: &Config) -> Level {
    if config.testing {
        Level::DEBUG
    } else {
        Level::INFO
    }
}

/// Configure logging.
///
/// Installs a single formatting sink on stdout. Calling it twice fails
/// with [`LoggingError::TracingLogTracerError`], as the `log` bridge is
/// installed first.
pub fn configure_logging(config: &Config) -> Result<(), LoggingError> {
    LogTracer::init().map_err(|e| LoggingError::TracingLogTracerError { source: e })?;

    let subscriber = build_subscriber(config, std::io::stdout)?;
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| LoggingError::TracingSetGlobalDefaultError { source: e })?;

    Ok(())
}

/// Build the subscriber stack writing to `writer`.
///
/// `RUST_LOG` directives are appended to the configured base level.
pub fn build_subscriber<W>(
    config: &Config,
    writer: W,
) -> Result<impl Subscriber + Send + Sync, LoggingError>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    subscriber_stack(log_level(config), std::env::var("RUST_LOG").ok(), writer)
}

fn subscriber_stack<W>(
    level: Level,
    extra_directives: Option<String>,
    writer: W,
) -> Result<impl Subscriber + Send + Sync, LoggingError>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let mut directives = vec![level.to_string().to_lowercase(), DEFAULT_DIRECTIVES.to_string()];
    directives.extend(extra_directives.filter(|d| !d.trim().is_empty()));
    let log_config = directives.join(",");

    let filter_layer = EnvFilter::from_str(&log_config).map_err(|e| {
        LoggingError::EnvFilterConfigurationError {
            source: e,
            configuration: log_config,
        }
    })?;
    let format_layer = tracing_subscriber::fmt::layer()
        .event_format(LogFormat)
        .with_ansi(false)
        .with_writer(writer);

    Ok(tracing_subscriber::registry()
        .with(ErrorLayer::default())
        .with(format_layer)
        .with(filter_layer))
}

#[cfg(test)]
mod tests {
    use std::{
        io::Write,
        sync::{Arc, Mutex},
    };

    use portal_config::{Profile, Settings};
    use pretty_assertions::assert_eq;

    use super::*;

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl SharedBuffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().write(buf)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for SharedBuffer {
        type Writer = Self;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn production_config() -> Config {
        Config::resolve_from_settings(Some(Profile::Production), Settings::new()).unwrap()
    }

    #[test]
    fn level_from_testing_flag() {
        assert_eq!(log_level(&Config::testing().unwrap()), Level::DEBUG);
        assert_eq!(log_level(&production_config()), Level::INFO);
    }

    #[test]
    fn debug_events_hidden_at_info_level() {
        let buffer = SharedBuffer::default();
        let subscriber = subscriber_stack(Level::INFO, None, buffer.clone()).unwrap();

        tracing::subscriber::with_default(subscriber, || {
            tracing::debug!("hidden");
            tracing::info!("shown");
        });

        let contents = buffer.contents();
        assert!(!contents.contains("hidden"));
        assert!(contents.contains("INFO - shown"));
    }

    #[test]
    fn debug_events_shown_at_debug_level() {
        let buffer = SharedBuffer::default();
        let subscriber = subscriber_stack(Level::DEBUG, None, buffer.clone()).unwrap();

        tracing::subscriber::with_default(subscriber, || {
            tracing::debug!("details");
        });

        assert!(buffer.contents().contains("DEBUG - details"));
    }

    #[test]
    fn single_line_per_event() {
        let buffer = SharedBuffer::default();
        let subscriber = subscriber_stack(Level::INFO, None, buffer.clone()).unwrap();

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("once");
        });

        assert_eq!(buffer.contents().lines().count(), 1);
    }

    #[test]
    fn line_format() {
        let buffer = SharedBuffer::default();
        let subscriber = subscriber_stack(Level::INFO, None, buffer.clone()).unwrap();

        tracing::subscriber::with_default(subscriber, || {
            let span = tracing::info_span!("load_user");
            let _entered = span.enter();
            tracing::warn!("lookup");
        });

        let contents = buffer.contents();
        let line = contents.lines().next().unwrap();
        assert!(line.starts_with('['), "{line}");
        assert!(line.contains("] {lib.rs#load_user:"), "{line}");
        assert!(line.ends_with("} WARN - lookup"), "{line}");
    }

    #[test]
    fn invalid_directives() {
        assert!(matches!(
            subscriber_stack(Level::INFO, Some("sqlx=loud".into()), SharedBuffer::default()),
            Err(LoggingError::EnvFilterConfigurationError { .. })
        ));
    }
}
