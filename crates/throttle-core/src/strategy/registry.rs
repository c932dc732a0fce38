use std::collections::HashMap;
use std::sync::Arc;

use super::{Algorithm, FixedWindow, RollingWindow, Strategy};
use crate::clock::Clock;
use crate::error::DomainError;
use crate::ports::CounterStore;

/// Maps algorithm identifiers to strategies bound to a shared counter store
/// and clock.
pub struct StrategyRegistry {
    strategies: HashMap<Algorithm, Arc<dyn Strategy>>,
}

impl StrategyRegistry {
    /// Build a registry holding every supported algorithm.
    pub fn new(counters: Arc<dyn CounterStore>, clock: Arc<dyn Clock>) -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(FixedWindow::new(counters.clone(), clock.clone())));
        registry.register(Arc::new(RollingWindow::new(counters, clock)));
        registry
    }

    pub fn empty() -> Self {
        Self {
            strategies: HashMap::new(),
        }
    }

    /// Add a strategy, replacing any previous one for the same algorithm.
    pub fn register(&mut self, strategy: Arc<dyn Strategy>) {
        self.strategies.insert(strategy.algorithm(), strategy);
    }

    pub fn get(&self, algorithm: Algorithm) -> Option<Arc<dyn Strategy>> {
        self.strategies.get(&algorithm).cloned()
    }

    /// Resolve a configured identifier such as `"fixed-window"`.
    pub fn resolve(&self, identifier: &str) -> Result<Arc<dyn Strategy>, DomainError> {
        let algorithm: Algorithm = identifier.parse()?;
        self.get(algorithm)
            .ok_or_else(|| DomainError::UnsupportedAlgorithm(identifier.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::testing::FakeCounterStore;

    fn registry() -> StrategyRegistry {
        let clock = Arc::new(ManualClock::at_epoch_secs(0));
        StrategyRegistry::new(Arc::new(FakeCounterStore::new(clock.clone())), clock)
    }

    #[test]
    fn test_resolves_every_algorithm() {
        let registry = registry();
        for algorithm in Algorithm::ALL {
            let strategy = registry.resolve(algorithm.as_str()).unwrap();
            assert_eq!(strategy.algorithm(), algorithm);
        }
    }

    #[test]
    fn test_unknown_identifier_is_unsupported() {
        let err = registry().resolve("leaky-bucket").err().unwrap();
        assert!(matches!(err, DomainError::UnsupportedAlgorithm(_)));
    }

    #[test]
    fn test_known_but_unregistered_is_unsupported() {
        let err = StrategyRegistry::empty().resolve("fixed-window").err().unwrap();
        assert!(matches!(err, DomainError::UnsupportedAlgorithm(_)));
    }
}
