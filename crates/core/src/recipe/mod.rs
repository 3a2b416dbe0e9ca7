use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::analysis::AudioAnalysis;
use crate::casting::{cast_for_structure, CastMember};
use crate::continuity::enforce_continuity;
use crate::shots::{
    section_pair_transition, synthesize_character_shots, synthesize_section_shots, Shot,
    ShotSource, Transition,
};
use crate::style::{
    select_aesthetic, select_structure, Aesthetic, AestheticId, NarrativeStructure,
};
use crate::threads::{schedule_threads, CharacterThread};
use crate::{PlanError, Result};

const RECIPE_VERSION: &str = "1.0";

/// Which synthesis mode drives the shot list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlanMode {
    /// Section-driven planning against one aesthetic preset.
    Aesthetic,
    /// Character-driven planning against a narrative structure.
    #[default]
    Narrative,
}

/// Caller-facing knobs for one generation run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanOptions {
    #[serde(default)]
    pub mode: PlanMode,
    /// Catalog key forcing a specific aesthetic; bypasses the cascade.
    #[serde(default)]
    pub aesthetic_override: Option<String>,
    /// Catalog key forcing a specific narrative structure.
    #[serde(default)]
    pub narrative_override: Option<String>,
    /// Seed for subject and impact-prompt selection. Same analysis,
    /// options and seed always produce the same recipe.
    #[serde(default)]
    pub seed: u64,
}

/// The style the recipe was planned against.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecipeStyle {
    Aesthetic(&'static Aesthetic),
    Narrative(NarrativeStructure),
}

/// Aggregate facts about the analysed track.
#[derive(Debug, Clone, Serialize)]
pub struct RecipeMetadata {
    pub duration: f32,
    pub bpm: u32,
    pub beat_count: usize,
    pub section_count: usize,
    pub avg_energy: f32,
}

/// How tightly the compositor snaps cuts onto the beat grid.
#[derive(Debug, Clone, Serialize)]
pub struct BeatSync {
    pub mode: &'static str,
    pub beat_threshold: f32,
    pub snap_to_beats: bool,
}

impl Default for BeatSync {
    fn default() -> Self {
        Self {
            mode: "strict",
            beat_threshold: 0.05,
            snap_to_beats: true,
        }
    }
}

/// Which live audio band drives which render parameter.
#[derive(Debug, Clone, Serialize)]
pub struct AudioReactive {
    pub bass_drives: &'static str,
    pub mids_drive: &'static str,
    pub highs_drive: &'static str,
    pub kick_triggers: &'static str,
}

impl Default for AudioReactive {
    fn default() -> Self {
        Self {
            bass_drives: "scale",
            mids_drive: "rotation",
            highs_drive: "brightness",
            kick_triggers: "flash",
        }
    }
}

/// Encoding defaults handed to the compositor.
#[derive(Debug, Clone, Serialize)]
pub struct OutputSettings {
    pub resolution: &'static str,
    pub fps: u32,
    pub codec: &'static str,
    pub crf: u8,
    pub audio_bitrate: &'static str,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            resolution: "1920x1080",
            fps: 60,
            codec: "libx264",
            crf: 18,
            audio_bitrate: "320k",
        }
    }
}

/// A key moment's effects, positioned on the global timeline.
#[derive(Debug, Clone, Serialize)]
pub struct EffectsEvent {
    pub time: f32,
    pub event: &'static str,
    pub effects: Vec<&'static str>,
}

/// Everything the compositor needs besides the shots themselves.
#[derive(Debug, Clone, Serialize)]
pub struct AssemblyInstructions {
    pub beat_sync: BeatSync,
    /// Transition per labeled section handover, keyed `from_to_to`.
    pub transitions: BTreeMap<String, Transition>,
    pub effects_timeline: Vec<EffectsEvent>,
    pub audio_reactive: AudioReactive,
    pub output: OutputSettings,
}

/// Full generation plan for one track. Immutable once assembled; a
/// stateless batch artifact consumed exactly once by the renderer.
#[derive(Debug, Clone, Serialize)]
pub struct Recipe {
    pub version: &'static str,
    pub metadata: RecipeMetadata,
    pub style: RecipeStyle,
    pub cast: Vec<CastMember>,
    pub threads: Vec<CharacterThread>,
    pub shots: Vec<Shot>,
    pub assembly_instructions: AssemblyInstructions,
}

/// Plans one recipe from one analysis. Pure: no side effects, no shared
/// state, safe to call concurrently.
pub fn plan_recipe(analysis: &AudioAnalysis, options: &PlanOptions) -> Result<Recipe> {
    if analysis.duration <= 0.0 {
        return Err(PlanError::invalid_audio(format!(
            "analysis duration must be positive, got {}",
            analysis.duration
        )));
    }

    let mut rng = StdRng::seed_from_u64(options.seed);

    let recipe = match options.mode {
        PlanMode::Narrative => {
            let structure = match &options.narrative_override {
                Some(key) => NarrativeStructure::from_key(key)?,
                None => select_structure(analysis),
            };
            let cast = cast_for_structure(structure);
            let threads = schedule_threads(&cast, analysis, structure);
            let mut shots = synthesize_character_shots(&threads, analysis, &mut rng);
            enforce_continuity(&mut shots);
            assemble(analysis, RecipeStyle::Narrative(structure), cast, threads, shots)
        }
        PlanMode::Aesthetic => {
            let aesthetic = match &options.aesthetic_override {
                Some(key) => AestheticId::from_key(key)?.descriptor(),
                None => select_aesthetic(analysis),
            };
            let mut shots = synthesize_section_shots(analysis, aesthetic, &mut rng);
            enforce_continuity(&mut shots);
            assemble(
                analysis,
                RecipeStyle::Aesthetic(aesthetic),
                Vec::new(),
                Vec::new(),
                shots,
            )
        }
    };

    tracing::info!(
        shots = recipe.shots.len(),
        mode = ?options.mode,
        "recipe complete"
    );
    Ok(recipe)
}

/// Pure aggregation; no new planning happens here.
fn assemble(
    analysis: &AudioAnalysis,
    style: RecipeStyle,
    cast: Vec<CastMember>,
    threads: Vec<CharacterThread>,
    shots: Vec<Shot>,
) -> Recipe {
    let metadata = RecipeMetadata {
        duration: analysis.duration,
        bpm: analysis.bpm,
        beat_count: analysis.beats.len(),
        section_count: analysis.section_count(),
        avg_energy: analysis.avg_energy(),
    };

    let mut transitions = BTreeMap::new();
    for pair in analysis.segments.windows(2) {
        if let (Some(from), Some(to)) = (pair[0].kind, pair[1].kind) {
            transitions.insert(
                format!("{}_to_{}", from.as_str(), to.as_str()),
                section_pair_transition(pair[0].kind, pair[1].kind),
            );
        }
    }

    let effects_timeline = shots
        .iter()
        .filter(|s| s.is_key_moment)
        .map(|s| EffectsEvent {
            time: s.timestamp,
            event: match s.source {
                ShotSource::Section(Some(kind)) => kind.as_str(),
                _ => "key-moment",
            },
            effects: s.effects.clone(),
        })
        .collect();

    Recipe {
        version: RECIPE_VERSION,
        metadata,
        style,
        cast,
        threads,
        shots,
        assembly_instructions: AssemblyInstructions {
            beat_sync: BeatSync::default(),
            transitions,
            effects_timeline,
            audio_reactive: AudioReactive::default(),
            output: OutputSettings::default(),
        },
    }
}
