//! Window statistics, pattern rules, recommendation scoring and alerting.

pub mod alerts;
pub mod analyzer;
pub mod patterns;
pub mod recommender;
pub mod registry;

pub use alerts::AlertRules;
pub use analyzer::{
    ols_slope, suffix, ThresholdFrequency, WindowAnalyzer, WindowSet, WindowStats,
    FREQUENCY_THRESHOLDS,
};
pub use patterns::PatternDetector;
pub use recommender::RuleRecommender;
pub use registry::SignalRegistry;
