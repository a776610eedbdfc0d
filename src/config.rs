/// Tuning knobs for a [`Manager`][crate::manager::Manager].
#[derive(Debug, Clone, PartialEq)]
pub struct ManagerConfig {
    /// Number of buckets each per-variable subtable starts with (and never shrinks below).
    pub initial_buckets: usize,
    /// Sifting stops moving a variable in one direction once the diagram grows
    /// beyond `max_growth` times the best size seen so far.
    pub max_growth: f64,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            initial_buckets: 4,
            max_growth: 1.2,
        }
    }
}

impl ManagerConfig {
    pub fn with_initial_buckets(mut self, buckets: usize) -> Self {
        self.initial_buckets = buckets.max(1);
        self
    }

    pub fn with_max_growth(mut self, max_growth: f64) -> Self {
        self.max_growth = max_growth;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ManagerConfig::default();
        assert_eq!(config.initial_buckets, 4);
        assert_eq!(config.max_growth, 1.2);
    }

    #[test]
    fn test_builders() {
        let config = ManagerConfig::default().with_initial_buckets(0).with_max_growth(2.0);
        assert_eq!(config.initial_buckets, 1);
        assert_eq!(config.max_growth, 2.0);
    }
}
