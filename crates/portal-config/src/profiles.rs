//! Static configuration profiles.

use std::fmt::Display;

use crate::{ConfigError, Result, Settings};

/// Configuration profile, selected by `APP_ENV`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    Development,
    Testing,
    Staging,
    Production,
}

/// Mapping from environment name to profile.
pub const PROFILES: &[(&str, Profile)] = &[
    ("development", Profile::Development),
    ("testing", Profile::Testing),
    ("staging", Profile::Staging),
    ("production", Profile::Production),
];

impl Profile {
    /// Find the profile registered for an environment name.
    pub fn lookup(name: &str) -> Result<Self> {
        let key = name.trim().to_lowercase();
        PROFILES
            .iter()
            .find(|(n, _)| *n == key)
            .map(|(_, p)| *p)
            .ok_or_else(|| ConfigError::UnknownProfile { name: name.into() })
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Testing => "testing",
            Self::Staging => "staging",
            Self::Production => "production",
        }
    }

    /// Default settings carried by the profile.
    pub fn defaults(self) -> Settings {
        let mut settings = base_defaults();
        settings.set("APP_ENV", self.name());

        match self {
            Self::Development => {
                settings.set("DEBUG", "true");
                settings.set("DEBUG_TB_ENABLED", "true");
                settings.set("SECRET_KEY", "development-secret-key");
                settings.set("BCRYPT_LOG_ROUNDS", "4");
                settings.set("DATABASE_URL", "postgres://localhost/portal_dev");
            }
            Self::Testing => {
                settings.set("DEBUG", "true");
                settings.set("TESTING", "true");
                settings.set("SECRET_KEY", "testing-secret-key");
                settings.set("BCRYPT_LOG_ROUNDS", "4");
                settings.set("DATABASE_DRIVER", "memory");
                settings.set("RQ_DRIVER", "memory");
            }
            Self::Staging => {
                settings.set("SESSION_COOKIE_SECURE", "true");
            }
            Self::Production => {
                settings.set("BCRYPT_LOG_ROUNDS", "13");
                settings.set("SESSION_COOKIE_SECURE", "true");
                settings.set("SERVER_BIND_IP", "0.0.0.0");
            }
        }

        settings
    }
}

impl Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

fn base_defaults() -> Settings {
    Settings::from_iter([
        ("APP_NAME", "portal"),
        ("DEBUG", "false"),
        ("TESTING", "false"),
        ("SECRET_KEY", ""),
        ("SESSION_COOKIE_SECURE", "false"),
        ("BCRYPT_LOG_ROUNDS", "12"),
        ("DEBUG_TB_ENABLED", "false"),
        ("DATABASE_DRIVER", "pg"),
        ("DATABASE_URL", ""),
        ("DATABASE_POOL_SIZE", "10"),
        ("DATABASE_CONNECTION_TIMEOUT", "5"),
        ("RQ_DRIVER", "redis"),
        ("RQ_DEFAULT_URL", "redis://localhost:6379/0"),
        ("RQ_DEFAULT_QUEUE", "default"),
        ("BASIC_AUTH_USERNAME", ""),
        ("BASIC_AUTH_PASSWORD", ""),
        ("BASIC_AUTH_REALM", ""),
        ("BASIC_AUTH_FORCE", "false"),
        ("SERVER_BIND_IP", "127.0.0.1"),
        ("SERVER_BIND_PORT", "5000"),
    ])
}
