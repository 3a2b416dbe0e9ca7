//! Core planning library for the Shotweaver music video generator.
//!
//! One decoded audio track goes in, one [`Recipe`] comes out: a time-ordered
//! plan of short video shots, each carrying a generative-video prompt,
//! timing, transitions and effect tags, ready for a downstream renderer and
//! compositor. The pipeline runs strictly forward — feature extraction,
//! style selection, casting, thread scheduling, shot synthesis, continuity
//! smoothing, assembly — and every call is a pure, synchronous batch
//! computation over one immutable [`AudioAnalysis`].
//!
//! Audio decoding and video rendering stay outside this crate; callers hand
//! in PCM samples (or a ready-made analysis) and take away a serializable
//! document.

pub mod analysis;
pub mod casting;
pub mod continuity;
pub mod error;
pub mod recipe;
pub mod shots;
pub mod style;
pub mod threads;

pub use analysis::{
    AudioAnalysis, Beat, EnergyExtractor, FeatureExtractor, Segment, SegmentKind,
    SpectralExtractor,
};
pub use casting::{cast_for_structure, CastMember, Chapter, CharacterId, Role, ThreadId, VisualCharacter};
pub use continuity::enforce_continuity;
pub use error::{PlanError, Result};
pub use recipe::{plan_recipe, PlanMode, PlanOptions, Recipe, RecipeMetadata, RecipeStyle};
pub use shots::{Shot, ShotSource, Transition};
pub use style::{
    select_aesthetic, select_structure, Aesthetic, AestheticId, CameraStyle, MotionIntensity,
    NarrativeStructure,
};
pub use threads::{schedule_threads, Appearance, CharacterThread};
