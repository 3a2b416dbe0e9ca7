use serde::{Deserialize, Serialize};

use crate::{AudioAnalysis, PlanError, Result};

/// Catalog key for one aesthetic preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AestheticId {
    CyberpunkRave,
    NeonAbstract,
    DreamyEthereal,
    MinimalCalm,
    VibrantDynamic,
}

impl AestheticId {
    pub const ALL: [AestheticId; 5] = [
        AestheticId::CyberpunkRave,
        AestheticId::NeonAbstract,
        AestheticId::DreamyEthereal,
        AestheticId::MinimalCalm,
        AestheticId::VibrantDynamic,
    ];

    /// Stable kebab-case key, matching the serialized form.
    pub fn key(&self) -> &'static str {
        match self {
            Self::CyberpunkRave => "cyberpunk-rave",
            Self::NeonAbstract => "neon-abstract",
            Self::DreamyEthereal => "dreamy-ethereal",
            Self::MinimalCalm => "minimal-calm",
            Self::VibrantDynamic => "vibrant-dynamic",
        }
    }

    /// Looks up a caller-supplied override key.
    pub fn from_key(key: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|id| id.key() == key)
            .ok_or_else(|| PlanError::configuration(format!("unknown aesthetic `{key}`")))
    }

    pub fn descriptor(&self) -> &'static Aesthetic {
        match self {
            Self::CyberpunkRave => &CYBERPUNK_RAVE,
            Self::NeonAbstract => &NEON_ABSTRACT,
            Self::DreamyEthereal => &DREAMY_ETHEREAL,
            Self::MinimalCalm => &MINIMAL_CALM,
            Self::VibrantDynamic => &VIBRANT_DYNAMIC,
        }
    }
}

/// How hard the generated footage should move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MotionIntensity {
    Minimal,
    Low,
    MediumHigh,
    High,
    Extreme,
}

/// Camera vocabulary attached to a preset. Each style carries its own
/// movement phrases, ordered hot-to-cold so an energy band can index them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CameraStyle {
    AggressiveHandheld,
    SmoothDynamic,
    SlowDrift,
    StaticContemplative,
    Dynamic,
}

impl CameraStyle {
    pub fn movements(&self) -> &'static [&'static str] {
        match self {
            Self::AggressiveHandheld => &[
                "aggressive handheld camera shake",
                "rapid camera movements",
                "intense dolly zoom",
                "dynamic whip pan",
            ],
            Self::SmoothDynamic => &[
                "smooth camera dolly",
                "elegant crane shot",
                "flowing steadicam",
                "gentle camera orbit",
            ],
            Self::SlowDrift => &[
                "slow camera drift",
                "subtle camera float",
                "gentle push in",
                "minimal camera sway",
            ],
            Self::StaticContemplative => &[
                "static camera",
                "locked-off composition",
                "subtle camera breathe",
            ],
            Self::Dynamic => &[
                "dynamic camera movement",
                "sweeping camera arc",
                "smooth tracking shot",
            ],
        }
    }

    /// Picks a movement phrase by energy band: hotter tracks take the
    /// more aggressive entries at the front of the list.
    pub fn movement_for_energy(&self, energy: f32) -> &'static str {
        let movements = self.movements();
        let band = if energy > 0.7 {
            0
        } else if energy > 0.4 {
            1
        } else {
            2
        };
        movements[band.min(movements.len() - 1)]
    }
}

/// One read-only aesthetic preset: palette, vocabulary and candidate
/// subject phrases for prompt synthesis.
#[derive(Debug, Clone, Serialize)]
pub struct Aesthetic {
    pub id: AestheticId,
    pub name: &'static str,
    pub color_palette: &'static [&'static str],
    pub keywords: &'static [&'static str],
    pub motion_intensity: MotionIntensity,
    pub camera_style: CameraStyle,
    pub subjects: &'static [&'static str],
}

pub static CYBERPUNK_RAVE: Aesthetic = Aesthetic {
    id: AestheticId::CyberpunkRave,
    name: "Cyberpunk Rave",
    color_palette: &["#ff006e", "#00f5ff", "#7209b7", "#00ff88", "#ff0080"],
    keywords: &["neon", "digital", "glitch", "holographic", "cyberpunk", "futuristic"],
    motion_intensity: MotionIntensity::Extreme,
    camera_style: CameraStyle::AggressiveHandheld,
    subjects: &[
        "neon geometric shapes pulsing violently",
        "holographic particles exploding",
        "digital glitch waves rippling through space",
        "laser beams cutting through dense fog",
        "abstract circuit patterns flowing rapidly",
        "matrix-style digital rain cascading",
        "chromatic aberration geometric tunnels",
    ],
};

pub static NEON_ABSTRACT: Aesthetic = Aesthetic {
    id: AestheticId::NeonAbstract,
    name: "Neon Abstract",
    color_palette: &["#ff006e", "#00f5ff", "#7209b7", "#ffbe0b"],
    keywords: &["neon", "abstract", "fluid", "vivid", "electric"],
    motion_intensity: MotionIntensity::High,
    camera_style: CameraStyle::SmoothDynamic,
    subjects: &[
        "neon liquid pouring in slow motion",
        "abstract neon shapes morphing",
        "electric plasma waves flowing",
        "vibrant geometric patterns expanding",
        "neon paint splashes in zero gravity",
        "glowing fluid simulations swirling",
    ],
};

pub static DREAMY_ETHEREAL: Aesthetic = Aesthetic {
    id: AestheticId::DreamyEthereal,
    name: "Dreamy Ethereal",
    color_palette: &["#a8dadc", "#f1faee", "#e63946", "#457b9d", "#1d3557"],
    keywords: &["soft", "dreamy", "ethereal", "floating", "peaceful", "clouds"],
    motion_intensity: MotionIntensity::Low,
    camera_style: CameraStyle::SlowDrift,
    subjects: &[
        "soft pastel clouds morphing gently",
        "ethereal light rays piercing through mist",
        "floating geometric crystals rotating slowly",
        "smooth gradient waves flowing",
        "delicate particles drifting upward",
        "dreamy bokeh lights twinkling",
    ],
};

pub static MINIMAL_CALM: Aesthetic = Aesthetic {
    id: AestheticId::MinimalCalm,
    name: "Minimal Calm",
    color_palette: &["#264653", "#2a9d8f", "#e9c46a", "#f4a261", "#e76f51"],
    keywords: &["minimal", "calm", "simple", "clean", "meditative"],
    motion_intensity: MotionIntensity::Minimal,
    camera_style: CameraStyle::StaticContemplative,
    subjects: &[
        "single geometric shape rotating slowly",
        "minimal line patterns breathing",
        "simple color gradients shifting",
        "zen-like abstract forms",
        "clean geometric compositions",
    ],
};

pub static VIBRANT_DYNAMIC: Aesthetic = Aesthetic {
    id: AestheticId::VibrantDynamic,
    name: "Vibrant Dynamic",
    color_palette: &["#06ffa5", "#fffb00", "#ff006e", "#8338ec"],
    keywords: &["vibrant", "dynamic", "energetic", "colorful", "bold"],
    motion_intensity: MotionIntensity::MediumHigh,
    camera_style: CameraStyle::Dynamic,
    subjects: &[
        "colorful abstract shapes dancing",
        "vibrant particle explosions",
        "dynamic geometric patterns",
        "bold color waves colliding",
        "energetic fluid simulations",
    ],
};

/// Template governing how presence is distributed across the visual cast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NarrativeStructure {
    /// One main visual motif dominates every shot.
    HyperPresentHero,
    /// Multiple visual themes share roughly equal presence.
    Ensemble,
    /// Two visual threads alternate, joined by a bridge motif.
    ParallelNarratives,
    /// Distinct visual chapters with a recurring motif across all of them.
    Episodic,
}

impl NarrativeStructure {
    pub const ALL: [NarrativeStructure; 4] = [
        NarrativeStructure::HyperPresentHero,
        NarrativeStructure::Ensemble,
        NarrativeStructure::ParallelNarratives,
        NarrativeStructure::Episodic,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Self::HyperPresentHero => "hyper-present-hero",
            Self::Ensemble => "ensemble",
            Self::ParallelNarratives => "parallel-narratives",
            Self::Episodic => "episodic",
        }
    }

    pub fn from_key(key: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|s| s.key() == key)
            .ok_or_else(|| PlanError::configuration(format!("unknown narrative structure `{key}`")))
    }
}

/// First-match-wins aesthetic cascade over the aggregate audio stats.
pub fn select_aesthetic(analysis: &AudioAnalysis) -> &'static Aesthetic {
    let avg_energy = analysis.avg_energy();
    let bpm = analysis.bpm;

    let id = if avg_energy > 0.8 && bpm > 120 {
        AestheticId::CyberpunkRave
    } else if avg_energy > 0.6 && bpm > 110 {
        AestheticId::NeonAbstract
    } else if avg_energy < 0.4 && bpm < 100 {
        AestheticId::DreamyEthereal
    } else if avg_energy < 0.3 {
        AestheticId::MinimalCalm
    } else {
        AestheticId::VibrantDynamic
    };

    tracing::debug!(aesthetic = id.key(), avg_energy, bpm, "aesthetic selected");
    id.descriptor()
}

/// First-match-wins narrative cascade. High variance across five or more
/// sections reads as distinct chapters; a hot, simple track reads as a
/// single dominating motif.
pub fn select_structure(analysis: &AudioAnalysis) -> NarrativeStructure {
    let avg_energy = analysis.avg_energy();
    let sections = analysis.section_count();

    let structure = if avg_energy > 0.8 && sections <= 3 {
        NarrativeStructure::HyperPresentHero
    } else if sections >= 5 && analysis.energy_stddev() > 0.15 {
        NarrativeStructure::Episodic
    } else if avg_energy > 0.5 && sections >= 4 {
        NarrativeStructure::ParallelNarratives
    } else {
        NarrativeStructure::Ensemble
    };

    tracing::debug!(
        structure = structure.key(),
        avg_energy,
        sections,
        "narrative structure selected"
    );
    structure
}
