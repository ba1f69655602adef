//! Service configuration

/// Configuration for the tournament service
#[derive(Clone, Debug)]
pub struct ServiceConfig {
    /// Random seed for pairings (None = seeded from the OS)
    pub seed: Option<u64>,
    /// Try to draw the next round after every reported result
    pub auto_advance: bool,
    /// Participants required before a tournament can start
    pub min_participants: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            seed: None,
            auto_advance: true,
            min_participants: 2,
        }
    }
}

impl ServiceConfig {
    /// Set random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Enable or disable automatic round advancement
    pub fn with_auto_advance(mut self, auto_advance: bool) -> Self {
        self.auto_advance = auto_advance;
        self
    }

    /// Set the minimum field size (never below two)
    pub fn with_min_participants(mut self, min_participants: usize) -> Self {
        self.min_participants = min_participants.max(2);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_config_defaults() {
        let config = ServiceConfig::default();
        assert!(config.seed.is_none());
        assert!(config.auto_advance);
        assert_eq!(config.min_participants, 2);
    }

    #[test]
    fn test_service_config_builders() {
        let config = ServiceConfig::default()
            .with_seed(42)
            .with_auto_advance(false)
            .with_min_participants(1);
        assert_eq!(config.seed, Some(42));
        assert!(!config.auto_advance);
        assert_eq!(config.min_participants, 2);
    }
}
