pub mod detection;
pub mod engine;
pub mod error;
pub mod events;
pub mod models;
pub mod noise;
pub mod registry;
pub mod resume;
pub mod rules;
pub mod spatial;
pub mod zones;

pub use detection::{detect, ConflictPair, Detection, Geometry, Intrusion, PairTiming, Severity};
pub use engine::{SeparationEngine, TickReport};
pub use error::{AreaError, ConfigError};
pub use events::{AircraftSnapshot, ConflictEvent, EventAction, EventKind};
pub use models::{AircraftState, Traffic};
pub use registry::{ConflictRegistry, PairKey, Transitions};
pub use resume::{
    resume_navigation, FlowClassifier, PairState, ResumeDirective, ResumeOutcome, ResumeReport,
    SuffixParity,
};
pub use rules::SeparationRules;
pub use spatial::haversine_distance;
pub use zones::{Area, AreaShape, ZoneMap, CORE_ZONE, OUTSIDE_ZONES};
