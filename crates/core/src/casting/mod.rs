use serde::{Deserialize, Serialize};

use crate::style::NarrativeStructure;

/// Catalog key for one visual character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CharacterId {
    NeonHero,
    ParticleEnsemble,
    LiquidProtagonist,
    GlitchAntagonist,
    CameraNarrator,
}

impl CharacterId {
    pub fn key(&self) -> &'static str {
        match self {
            Self::NeonHero => "neon-hero",
            Self::ParticleEnsemble => "particle-ensemble",
            Self::LiquidProtagonist => "liquid-protagonist",
            Self::GlitchAntagonist => "glitch-antagonist",
            Self::CameraNarrator => "camera-narrator",
        }
    }

    pub fn descriptor(&self) -> &'static VisualCharacter {
        match self {
            Self::NeonHero => &NEON_HERO,
            Self::ParticleEnsemble => &PARTICLE_ENSEMBLE,
            Self::LiquidProtagonist => &LIQUID_PROTAGONIST,
            Self::GlitchAntagonist => &GLITCH_ANTAGONIST,
            Self::CameraNarrator => &CAMERA_NARRATOR,
        }
    }
}

/// Reusable descriptive motif cast into a recipe. Read-only catalog entry;
/// the planner never mutates these.
#[derive(Debug, Clone, Serialize)]
pub struct VisualCharacter {
    pub id: CharacterId,
    pub name: &'static str,
    pub description: &'static str,
    pub visual_traits: &'static [&'static str],
    pub color_palette: &'static [&'static str],
    pub subjects: &'static [&'static str],
}

pub static NEON_HERO: VisualCharacter = VisualCharacter {
    id: CharacterId::NeonHero,
    name: "Neon Hero",
    description: "Primary visual motif - neon geometric shapes",
    visual_traits: &["geometric", "neon", "pulsing", "abstract"],
    color_palette: &["#ff006e", "#00f5ff", "#7209b7"],
    subjects: &[
        "neon geometric shapes pulsing rhythmically",
        "glowing abstract forms rotating",
        "electric geometric patterns flowing",
    ],
};

pub static PARTICLE_ENSEMBLE: VisualCharacter = VisualCharacter {
    id: CharacterId::ParticleEnsemble,
    name: "Particle Ensemble",
    description: "Supporting visual - particle systems",
    visual_traits: &["particles", "swarm", "organic", "flowing"],
    color_palette: &["#00ff88", "#ffbe0b", "#ff006e"],
    subjects: &[
        "particle swarms forming patterns",
        "glowing particles exploding",
        "ethereal particle clouds morphing",
    ],
};

pub static LIQUID_PROTAGONIST: VisualCharacter = VisualCharacter {
    id: CharacterId::LiquidProtagonist,
    name: "Liquid Protagonist",
    description: "Fluid simulations as main character",
    visual_traits: &["liquid", "fluid", "flowing", "morphing"],
    color_palette: &["#a8dadc", "#457b9d", "#e63946"],
    subjects: &[
        "liquid metal flowing in slow motion",
        "fluid simulations swirling",
        "viscous liquid morphing shapes",
    ],
};

pub static GLITCH_ANTAGONIST: VisualCharacter = VisualCharacter {
    id: CharacterId::GlitchAntagonist,
    name: "Glitch Antagonist",
    description: "Disruption and chaos element",
    visual_traits: &["glitch", "distortion", "chaos", "digital"],
    color_palette: &["#ff0080", "#00f5ff", "#000000"],
    subjects: &[
        "reality glitching and fragmenting",
        "digital corruption spreading",
        "matrix-style digital breakdown",
    ],
};

pub static CAMERA_NARRATOR: VisualCharacter = VisualCharacter {
    id: CharacterId::CameraNarrator,
    name: "Camera Narrator",
    description: "Camera movement as storytelling device",
    visual_traits: &["dynamic", "cinematic", "flowing"],
    color_palette: &["#ffffff", "#aaaaaa"],
    subjects: &[
        "smooth dolly push revealing detail",
        "orbiting crane shot around subject",
        "handheld drift following motion",
        "slow zoom building tension",
    ],
};

/// Dramatic function a cast member plays in the recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    Protagonist,
    Supporting,
    CoLead,
    Thread,
    Bridge,
    Chapter,
    Recurring,
}

/// Which alternating thread a parallel-narrative member belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThreadId {
    A,
    B,
    /// Bridge members appear on both threads.
    Both,
}

/// Chapter assignment for episodic structures. Chapters are 1-based and
/// map onto the analysis segments in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Chapter {
    Index(u32),
    All,
}

/// One cast slot filled for a single generation run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CastMember {
    pub character: CharacterId,
    pub role: Role,
    pub presence_target_pct: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread: Option<ThreadId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapter: Option<Chapter>,
}

impl CastMember {
    fn new(character: CharacterId, role: Role, presence_target_pct: u8) -> Self {
        Self {
            character,
            role,
            presence_target_pct,
            thread: None,
            chapter: None,
        }
    }

    fn on_thread(mut self, thread: ThreadId) -> Self {
        self.thread = Some(thread);
        self
    }

    fn in_chapter(mut self, chapter: Chapter) -> Self {
        self.chapter = Some(chapter);
        self
    }
}

/// Fixed cast template per structure. No randomness: the same structure
/// always yields the same cast.
pub fn cast_for_structure(structure: NarrativeStructure) -> Vec<CastMember> {
    match structure {
        NarrativeStructure::HyperPresentHero => vec![
            CastMember::new(CharacterId::NeonHero, Role::Protagonist, 95),
            CastMember::new(CharacterId::ParticleEnsemble, Role::Supporting, 20),
        ],
        NarrativeStructure::Ensemble => vec![
            CastMember::new(CharacterId::NeonHero, Role::CoLead, 70),
            CastMember::new(CharacterId::LiquidProtagonist, Role::CoLead, 65),
            CastMember::new(CharacterId::ParticleEnsemble, Role::CoLead, 60),
            CastMember::new(CharacterId::GlitchAntagonist, Role::Supporting, 30),
        ],
        NarrativeStructure::ParallelNarratives => vec![
            CastMember::new(CharacterId::NeonHero, Role::Thread, 50).on_thread(ThreadId::A),
            CastMember::new(CharacterId::LiquidProtagonist, Role::Thread, 50)
                .on_thread(ThreadId::B),
            CastMember::new(CharacterId::GlitchAntagonist, Role::Bridge, 20)
                .on_thread(ThreadId::Both),
        ],
        NarrativeStructure::Episodic => vec![
            CastMember::new(CharacterId::NeonHero, Role::Chapter, 100).in_chapter(Chapter::Index(1)),
            CastMember::new(CharacterId::LiquidProtagonist, Role::Chapter, 100)
                .in_chapter(Chapter::Index(2)),
            CastMember::new(CharacterId::ParticleEnsemble, Role::Chapter, 100)
                .in_chapter(Chapter::Index(3)),
            CastMember::new(CharacterId::CameraNarrator, Role::Recurring, 100)
                .in_chapter(Chapter::All),
        ],
    }
}

/// Trait overlap between two characters, `|shared| / max(|a|, |b|)`.
pub fn trait_similarity(a: CharacterId, b: CharacterId) -> f32 {
    let traits_a = a.descriptor().visual_traits;
    let traits_b = b.descriptor().visual_traits;
    if traits_a.is_empty() || traits_b.is_empty() {
        return 0.0;
    }

    let shared = traits_a.iter().filter(|t| traits_b.contains(t)).count();
    shared as f32 / traits_a.len().max(traits_b.len()) as f32
}
