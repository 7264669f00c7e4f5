use serde::Deserialize;

/// Configuration for a [`RequestController`](crate::RequestController).
///
/// Deserializable with `serde`, so it can be sliced directly out of an
/// application's configuration tree:
///
/// ```rust
/// use gantry::ControllerConfig;
///
/// let config: ControllerConfig =
///     serde_json::from_str(r#"{ "max_concurrent_requests": 512 }"#).unwrap();
///
/// assert_eq!(config.max_concurrent_requests, 512);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// The process-wide ceiling on concurrently executing requests.
    ///
    /// A value of `0` (the default) means unlimited: the global gate then
    /// only counts requests and never rejects on capacity grounds.
    pub max_concurrent_requests: usize,
}

impl ControllerConfig {
    /// Creates a configuration with the given process-wide concurrency
    /// ceiling (`0` meaning unlimited).
    pub const fn with_max_concurrent_requests(max_concurrent_requests: usize) -> Self {
        Self {
            max_concurrent_requests,
        }
    }
}

impl Default for ControllerConfig {
    /// Defaults to an unlimited global gate.
    fn default() -> Self {
        Self {
            max_concurrent_requests: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_is_unlimited() {
        assert_eq!(ControllerConfig::default().max_concurrent_requests, 0);
    }

    #[test]
    fn deserializes_with_defaults() {
        // Given
        let input = "{}";

        // When
        let config: ControllerConfig = serde_json::from_str(input).unwrap();

        // Then
        assert_eq!(config, ControllerConfig::default());
    }

    #[test]
    fn deserializes_explicit_ceiling() {
        // Given
        let input = r#"{ "max_concurrent_requests": 16 }"#;

        // When
        let config: ControllerConfig = serde_json::from_str(input).unwrap();

        // Then
        assert_eq!(config, ControllerConfig::with_max_concurrent_requests(16));
    }
}
