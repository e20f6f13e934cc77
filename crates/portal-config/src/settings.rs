//! Raw settings store.

use std::{collections::BTreeMap, path::Path};

use crate::{ConfigError, Result};

const REDACTED_MARKERS: &[&str] = &["SECRET", "PASSWORD", "TOKEN", "DATABASE_URL", "RQ_DEFAULT_URL"];
const REDACTED_VALUE: &str = "********";

/// Ordered mapping from setting name to raw value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings(BTreeMap<String, String>);

impl Settings {
    pub fn new() -> Self {
        Default::default()
    }

    /// Read key/values declared in an env file.
    ///
    /// A missing file gives empty settings.
    pub fn from_env_file(path: &Path) -> Result<Self> {
        let to_error = |source: dotenv::Error| ConfigError::EnvFileError {
            path: path.display().to_string(),
            source,
        };

        let iter = match dotenv::from_path_iter(path) {
            Ok(iter) => iter,
            Err(e) if e.not_found() => return Ok(Self::new()),
            Err(e) => return Err(to_error(e)),
        };

        let mut settings = Self::new();
        for item in iter {
            let (key, value) = item.map_err(to_error)?;
            settings.set(key, value);
        }

        Ok(settings)
    }

    pub fn set<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Layer `other` on top of these settings. Values from `other` win.
    pub fn merge(&mut self, other: Settings) {
        self.0.extend(other.0);
    }

    /// Copy of the settings with sensitive values masked.
    pub fn redacted(&self) -> Self {
        self.0
            .iter()
            .map(|(k, v)| {
                if !v.is_empty() && REDACTED_MARKERS.iter().any(|m| k.contains(m)) {
                    (k.clone(), REDACTED_VALUE.to_string())
                } else {
                    (k.clone(), v.clone())
                }
            })
            .collect()
    }

    pub(crate) fn to_str(&self, name: &str, default: &str) -> String {
        self.get(name).unwrap_or(default).replace("\\n", "\n")
    }

    pub(crate) fn to_bool(&self, name: &str, default: bool) -> bool {
        self.get(name)
            .and_then(|v| match &v.trim().to_lowercase()[..] {
                "1" | "true" | "yes" | "on" => Some(true),
                "0" | "false" | "no" | "off" | "" => Some(false),
                _ => None,
            })
            .unwrap_or(default)
    }

    pub(crate) fn to_u16(&self, name: &str, default: u16) -> u16 {
        self.get(name)
            .map(|e| e.parse().unwrap_or(default))
            .unwrap_or(default)
    }

    pub(crate) fn to_optional_u16(&self, name: &str, default: Option<u16>) -> Option<u16> {
        self.get(name)
            .map(|e| e.parse::<u16>().map(Some).unwrap_or(default))
            .unwrap_or(default)
    }

    pub(crate) fn to_u32(&self, name: &str, default: u32) -> u32 {
        self.get(name)
            .map(|e| e.parse().unwrap_or(default))
            .unwrap_or(default)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Settings {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn read_env_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# comment").unwrap();
        writeln!(file, "SECRET_KEY=from-file").unwrap();
        writeln!(file, "DATABASE_POOL_SIZE=3").unwrap();

        let settings = Settings::from_env_file(file.path()).unwrap();
        assert_eq!(
            settings,
            Settings::from_iter([("SECRET_KEY", "from-file"), ("DATABASE_POOL_SIZE", "3")])
        );
    }

    #[test]
    fn missing_env_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::from_env_file(&dir.path().join(".env")).unwrap();
        assert!(settings.is_empty());
    }

    #[test]
    fn merge_overrides() {
        let mut base = Settings::from_iter([("A", "1"), ("B", "2")]);
        base.merge(Settings::from_iter([("B", "3"), ("C", "4")]));

        assert_eq!(
            base,
            Settings::from_iter([("A", "1"), ("B", "3"), ("C", "4")])
        );
    }

    #[test]
    fn typed_accessors() {
        let settings = Settings::from_iter([
            ("FLAG_ON", "True"),
            ("FLAG_OFF", "0"),
            ("FLAG_BAD", "maybe"),
            ("PORT", "8080"),
            ("PORT_BAD", "eighty"),
            ("MULTILINE", "a\\nb"),
        ]);

        assert!(settings.to_bool("FLAG_ON", false));
        assert!(!settings.to_bool("FLAG_OFF", true));
        assert!(settings.to_bool("FLAG_BAD", true));
        assert!(!settings.to_bool("FLAG_MISSING", false));
        assert_eq!(settings.to_u16("PORT", 1), 8080);
        assert_eq!(settings.to_u16("PORT_BAD", 1), 1);
        assert_eq!(settings.to_optional_u16("PORT_MISSING", None), None);
        assert_eq!(settings.to_str("MULTILINE", ""), "a\nb");
    }

    #[test]
    fn redaction() {
        let settings = Settings::from_iter([
            ("SECRET_KEY", "s3cr3t"),
            ("BASIC_AUTH_PASSWORD", ""),
            ("DEBUG", "true"),
        ]);

        assert_eq!(
            settings.redacted(),
            Settings::from_iter([
                ("SECRET_KEY", "********"),
                ("BASIC_AUTH_PASSWORD", ""),
                ("DEBUG", "true"),
            ])
        );
    }
}
