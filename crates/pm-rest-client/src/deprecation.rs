//! Deprecation notices for retired operations.

/// Target used for every deprecation warning, so subscribers can filter on it.
pub const DEPRECATION_TARGET: &str = "pingme::deprecation";

/// A retired operation and the one that replaces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deprecation {
    pub operation: &'static str,
    pub replacement: &'static str,
}

impl Deprecation {
    pub const fn new(operation: &'static str, replacement: &'static str) -> Self {
        Self {
            operation,
            replacement,
        }
    }

    /// Emit the warning, then run the operation unchanged.
    pub fn wrap<T>(&self, call: impl FnOnce() -> T) -> T {
        tracing::warn!(
            target: DEPRECATION_TARGET,
            operation = self.operation,
            replacement = self.replacement,
            "{} is deprecated, use {} instead",
            self.operation,
            self.replacement
        );
        call()
    }
}

pub const GET_METRICS: Deprecation = Deprecation::new("get_metrics", "get_host_measurements");
pub const GET_METRIC: Deprecation = Deprecation::new("get_metric", "get_host_measurements");
pub const GET_DEVICE_METRIC: Deprecation =
    Deprecation::new("get_device_metric", "get_disk_measurements");
pub const GET_DATABASE_METRIC: Deprecation =
    Deprecation::new("get_database_metric", "get_database_measurements");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_returns_call_value() {
        assert_eq!(GET_METRICS.wrap(|| 42), 42);
    }

    #[test]
    fn test_replacements() {
        assert_eq!(GET_DEVICE_METRIC.replacement, "get_disk_measurements");
        assert_eq!(GET_DATABASE_METRIC.replacement, "get_database_measurements");
    }
}
