use std::{fmt::Display, str::FromStr};

use crate::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseDriver {
    Memory,
    Postgres,
}

impl FromStr for DatabaseDriver {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match &s.to_lowercase()[..] {
            "memory" => Ok(Self::Memory),
            "pg" => Ok(Self::Postgres),
            _ => Err(ConfigError::InvalidDriverKind {
                setting: "DATABASE_DRIVER".into(),
                kind: s.into(),
            }),
        }
    }
}

impl Display for DatabaseDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Memory => "memory",
            Self::Postgres => "pg",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobQueueDriver {
    Memory,
    Redis,
}

impl FromStr for JobQueueDriver {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match &s.to_lowercase()[..] {
            "memory" => Ok(Self::Memory),
            "redis" => Ok(Self::Redis),
            _ => Err(ConfigError::InvalidDriverKind {
                setting: "RQ_DRIVER".into(),
                kind: s.into(),
            }),
        }
    }
}

impl Display for JobQueueDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Memory => "memory",
            Self::Redis => "redis",
        })
    }
}
