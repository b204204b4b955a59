//! Registry of named signal providers.
//!
//! Lets alternate recommenders run side by side against the same history so
//! their decisions can be compared.

use std::collections::BTreeMap;
use std::sync::Arc;

use crash_signal_core::{Recommendation, RoundEvent, SignalProvider};

use crate::recommender::RuleRecommender;

/// Named collection of `SignalProvider`s.
#[derive(Clone)]
pub struct SignalRegistry {
    providers: BTreeMap<String, Arc<dyn SignalProvider>>,
}

impl Default for SignalRegistry {
    /// A registry holding only the rule-based provider under `"rules"`.
    fn default() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(RuleRecommender::new()));
        registry
    }
}

impl std::fmt::Debug for SignalRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalRegistry")
            .field("providers", &self.names())
            .finish()
    }
}

impl SignalRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            providers: BTreeMap::new(),
        }
    }

    /// Registers a provider under its own name, replacing any previous one.
    pub fn register(&mut self, provider: Arc<dyn SignalProvider>) {
        let name = provider.name().to_string();
        self.providers.insert(name, provider);
    }

    /// Registers a provider under a custom name.
    pub fn register_with_name(&mut self, provider: Arc<dyn SignalProvider>, name: &str) {
        self.providers.insert(name.to_string(), provider);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn SignalProvider>> {
        self.providers.get(name).cloned()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.providers.contains_key(name)
    }

    /// Registered names in sorted order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.providers.keys().map(String::as_str).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn remove(&mut self, name: &str) -> Option<Arc<dyn SignalProvider>> {
        self.providers.remove(name)
    }

    /// Asks every provider for a recommendation on the same history.
    #[must_use]
    pub fn recommend_all(&self, history: &[RoundEvent]) -> BTreeMap<String, Recommendation> {
        self.providers
            .iter()
            .map(|(name, provider)| (name.clone(), provider.recommend(history)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crash_signal_core::{Action, Confidence};

    struct AlwaysBet;

    impl SignalProvider for AlwaysBet {
        fn recommend(&self, _history: &[RoundEvent]) -> Recommendation {
            Recommendation {
                action: Action::Bet,
                target: Some(1.2),
                confidence: Confidence::Low,
                score: 2,
                reasons: vec!["always".to_string()],
                probability_above_2x: 0.0,
                probability_above_1_5x: 0.0,
            }
        }

        fn name(&self) -> &str {
            "always-bet"
        }
    }

    #[test]
    fn default_registry_holds_rules() {
        let registry = SignalRegistry::default();
        assert!(registry.contains("rules"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn new_registry_is_empty() {
        let registry = SignalRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.get("rules").is_none());
    }

    #[test]
    fn register_replaces_same_name() {
        let mut registry = SignalRegistry::new();
        registry.register(Arc::new(AlwaysBet));
        registry.register(Arc::new(AlwaysBet));
        assert_eq!(registry.names(), vec!["always-bet"]);
    }

    #[test]
    fn register_with_name_and_remove() {
        let mut registry = SignalRegistry::new();
        registry.register_with_name(Arc::new(AlwaysBet), "variant");
        assert!(registry.contains("variant"));
        assert!(registry.remove("variant").is_some());
        assert!(registry.is_empty());
    }

    #[test]
    fn recommend_all_runs_every_provider() {
        let mut registry = SignalRegistry::default();
        registry.register(Arc::new(AlwaysBet));

        let history: Vec<RoundEvent> = (0..5).map(|i| RoundEvent::new(1.3, i).unwrap()).collect();
        let results = registry.recommend_all(&history);

        assert_eq!(results.len(), 2);
        assert_eq!(results["rules"], Recommendation::neutral());
        assert_eq!(results["always-bet"].action, Action::Bet);
    }
}
