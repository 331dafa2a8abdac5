/*!
 * Container Configuration
 *
 * Construction-time settings shared by all adapters
 */

/// Environment variable holding the default initial capacity
pub const ENV_INITIAL_CAPACITY: &str = "CONTAINERS_INITIAL_CAPACITY";
/// Environment variable holding the default log label
pub const ENV_LABEL: &str = "CONTAINERS_LABEL";

const DEFAULT_LABEL: &str = "container";

/// Adapter configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerConfig {
    /// Capacity reserved up front in the wrapped container
    pub initial_capacity: usize,
    /// Name attached to tracing events emitted by the adapter
    pub label: String,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 0,
            label: DEFAULT_LABEL.to_string(),
        }
    }
}

impl ContainerConfig {
    /// Configuration with a pre-reserved capacity
    pub fn with_capacity(initial_capacity: usize) -> Self {
        Self {
            initial_capacity,
            ..Default::default()
        }
    }

    /// Replace the label used in log fields
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Replace the initial capacity
    pub fn initial_capacity(mut self, initial_capacity: usize) -> Self {
        self.initial_capacity = initial_capacity;
        self
    }

    /// Load from `CONTAINERS_INITIAL_CAPACITY` / `CONTAINERS_LABEL`
    ///
    /// Missing or unparsable values fall back to the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let initial_capacity = lookup(ENV_INITIAL_CAPACITY)
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(defaults.initial_capacity);

        let label = lookup(ENV_LABEL)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.label);

        Self {
            initial_capacity,
            label,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ContainerConfig::default();
        assert_eq!(config.initial_capacity, 0);
        assert_eq!(config.label, "container");
    }

    #[test]
    fn test_builder() {
        let config = ContainerConfig::with_capacity(64).label("jobs");
        assert_eq!(config.initial_capacity, 64);
        assert_eq!(config.label, "jobs");
    }

    #[test]
    fn test_from_lookup_reads_values() {
        let config = ContainerConfig::from_lookup(lookup_from(&[
            (ENV_INITIAL_CAPACITY, " 128 "),
            (ENV_LABEL, "ingest"),
        ]));
        assert_eq!(config.initial_capacity, 128);
        assert_eq!(config.label, "ingest");
    }

    #[test]
    fn test_from_lookup_falls_back_on_garbage() {
        let config = ContainerConfig::from_lookup(lookup_from(&[
            (ENV_INITIAL_CAPACITY, "lots"),
            (ENV_LABEL, "   "),
        ]));
        assert_eq!(config, ContainerConfig::default());
    }
}
