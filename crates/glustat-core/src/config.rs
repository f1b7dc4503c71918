//! Collector configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default location of the gluster CLI.
pub const DEFAULT_BINARY: &str = "/usr/sbin/gluster";
/// Default volume list.
pub const DEFAULT_VOLUME: &str = "vol0";
/// Default per-invocation timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

/// Settings for one collector. Read-only for the lifetime of the collector.
///
/// Missing keys take their defaults when deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlusterConfig {
    /// Volumes to profile, in collection order.
    pub volumes: Vec<String>,
    /// Path to the gluster binary.
    pub binary: PathBuf,
    /// Wall-clock limit for each gluster invocation.
    #[serde(with = "millis")]
    pub timeout: Duration,
    /// Run gluster through `sudo`.
    pub use_sudo: bool,
}

impl Default for GlusterConfig {
    fn default() -> Self {
        Self {
            volumes: vec![DEFAULT_VOLUME.to_string()],
            binary: PathBuf::from(DEFAULT_BINARY),
            timeout: DEFAULT_TIMEOUT,
            use_sudo: false,
        }
    }
}

impl GlusterConfig {
    pub fn with_volumes<I, S>(mut self, volumes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.volumes = volumes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = binary.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_sudo(mut self, use_sudo: bool) -> Self {
        self.use_sudo = use_sudo;
        self
    }
}

/// Timeout stored as integer milliseconds.
mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GlusterConfig::default();
        assert_eq!(config.volumes, vec!["vol0"]);
        assert_eq!(config.binary, PathBuf::from("/usr/sbin/gluster"));
        assert_eq!(config.timeout, Duration::from_secs(1));
        assert!(!config.use_sudo);
    }

    #[test]
    fn test_builders() {
        let config = GlusterConfig::default()
            .with_volumes(["data", "logs"])
            .with_binary("/opt/gluster/bin/gluster")
            .with_timeout(Duration::from_millis(2500))
            .with_sudo(true);
        assert_eq!(config.volumes, vec!["data", "logs"]);
        assert_eq!(config.binary, PathBuf::from("/opt/gluster/bin/gluster"));
        assert_eq!(config.timeout, Duration::from_millis(2500));
        assert!(config.use_sudo);
    }

    #[test]
    fn test_deserialize_partial() {
        let config: GlusterConfig =
            serde_json::from_str(r#"{"volumes": ["a", "b"], "timeout": 1500}"#).unwrap();
        assert_eq!(config.volumes, vec!["a", "b"]);
        assert_eq!(config.timeout, Duration::from_millis(1500));
        assert_eq!(config.binary, PathBuf::from(DEFAULT_BINARY));
        assert!(!config.use_sudo);
    }

    #[test]
    fn test_serialize_timeout_as_millis() {
        let json = serde_json::to_value(GlusterConfig::default()).unwrap();
        assert_eq!(json["timeout"], 1000);
        assert_eq!(json["use_sudo"], false);
    }

    #[test]
    fn test_serialize_huge_timeout_saturates() {
        let config = GlusterConfig::default().with_timeout(Duration::MAX);
        let json = serde_json::to_value(config).unwrap();
        assert_eq!(json["timeout"], u64::MAX);
    }
}
