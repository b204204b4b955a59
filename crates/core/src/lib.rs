pub mod config;
pub mod config_loader;
pub mod error;
pub mod round;
pub mod signal;
pub mod traits;

pub use config::{AppConfig, PipelineConfig, ServerConfig, SimulationDefaults, StorageConfig};
pub use config_loader::ConfigLoader;
pub use error::{CollaboratorError, PolicyError, ValidationError};
pub use round::{
    now_millis, validate_multiplier, Origin, RawId, RawNumber, RawRound, RoundEvent,
    MAX_MULTIPLIER, MIN_MULTIPLIER,
};
pub use signal::{
    Action, AlertKind, Confidence, Notification, NotificationPayload, Pattern, PatternConfidence,
    PatternKind, Recommendation, MIN_PATTERN_HISTORY, MIN_RECOMMENDATION_HISTORY,
};
pub use traits::{NotificationSink, PersistenceStore, SignalProvider, SourceFeed};
