use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::analysis::{AudioAnalysis, Segment, SegmentKind};
use crate::casting::CharacterId;
use crate::style::Aesthetic;
use crate::threads::CharacterThread;

/// Generated clips run at Mochi's native frame rate.
pub const FRAME_RATE: f32 = 24.0;

const CHARACTER_QUALITY_SUFFIX: &str = "cinematic, high quality, 4K, smooth motion";
const SECTION_QUALITY_SUFFIX: &str = "cinematic, high quality, 4K, smooth motion, professional";
const IMPACT_QUALITY_SUFFIX: &str = "cinematic drama, 4K quality, smooth motion, high impact";

/// Cut styles the compositor understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Transition {
    Fade,
    Dissolve,
    QuickCut,
    HardCut,
    Glitch,
    Explosion,
    SlowFade,
    ZoomBlur,
    SlowDissolve,
    QuickCuts,
    CrossDissolveSlow,
    GlitchDissolve,
}

/// What a shot was synthesized from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShotSource {
    /// A cast member's appearance (character-driven mode).
    Character(CharacterId),
    /// A structural section (section-driven mode). `None` means the
    /// analysis carried no semantic label for the section.
    Section(Option<SegmentKind>),
}

/// One timestamped unit of final video with its own prompt and effects.
#[derive(Debug, Clone, Serialize)]
pub struct Shot {
    pub id: String,
    pub timestamp: f32,
    pub duration: f32,
    pub source: ShotSource,
    pub prompt: String,
    pub energy_level: f32,
    pub effects: Vec<&'static str>,
    pub transition_in: Transition,
    pub transition_out: Transition,
    pub frame_count: u32,
    pub is_key_moment: bool,
}

fn frame_count(duration: f32) -> u32 {
    (duration * FRAME_RATE).round() as u32
}

fn shot_id(counter: usize) -> String {
    format!("shot_{counter:03}")
}

/// Flattens all threads into a sorted shot list. Each appearance becomes one
/// shot; ties on timestamp keep thread declaration order. Subject phrases
/// are drawn through the injected generator so runs are reproducible.
pub fn synthesize_character_shots(
    threads: &[CharacterThread],
    analysis: &AudioAnalysis,
    rng: &mut StdRng,
) -> Vec<Shot> {
    let mut flattened: Vec<(CharacterId, &crate::threads::Appearance)> = Vec::new();
    for thread in threads {
        for appearance in &thread.appearances {
            flattened.push((thread.character, appearance));
        }
    }
    // Stable sort: per-thread appearances are already in time order, so
    // equal timestamps resolve to thread declaration order.
    flattened.sort_by(|a, b| a.1.time.total_cmp(&b.1.time));

    let shots: Vec<Shot> = flattened
        .iter()
        .enumerate()
        .map(|(i, (character, appearance))| {
            let energy = analysis.energy_at(appearance.time);
            let (transition_in, transition_out) = transitions_for(None, energy);
            Shot {
                id: shot_id(i + 1),
                timestamp: appearance.time,
                duration: appearance.duration,
                source: ShotSource::Character(*character),
                prompt: character_prompt(*character, energy, rng),
                energy_level: energy,
                effects: character_effects(*character, energy),
                transition_in,
                transition_out,
                frame_count: frame_count(appearance.duration),
                is_key_moment: false,
            }
        })
        .collect();

    tracing::debug!(shots = shots.len(), "character shots synthesized");
    shots
}

fn character_prompt(character: CharacterId, energy: f32, rng: &mut StdRng) -> String {
    let descriptor = character.descriptor();
    let subject = descriptor.subjects[rng.gen_range(0..descriptor.subjects.len())];
    let motion = if energy > 0.7 {
        "fast aggressive motion"
    } else if energy > 0.4 {
        "smooth flowing motion"
    } else {
        "slow deliberate motion"
    };
    format!("{subject}, {motion}, dynamic camera movement, {CHARACTER_QUALITY_SUFFIX}")
}

fn character_effects(character: CharacterId, energy: f32) -> Vec<&'static str> {
    let traits = character.descriptor().visual_traits;
    let mut effects: Vec<&'static str> = if traits.contains(&"glitch") {
        vec!["glitch-heavy", "chromatic-aberration-extreme"]
    } else if traits.contains(&"liquid") {
        vec!["fluid-distortion", "displacement-map"]
    } else if traits.contains(&"neon") {
        vec!["bloom-intense", "glow"]
    } else {
        Vec::new()
    };

    if energy > 0.8 {
        effects.push("screen-shake");
        effects.push("radial-blur");
    }
    effects
}

/// Tiles every structural section with fixed-length shots and splices a
/// dedicated key-moment shot into each buildup/drop/break boundary.
pub fn synthesize_section_shots(
    analysis: &AudioAnalysis,
    aesthetic: &Aesthetic,
    rng: &mut StdRng,
) -> Vec<Shot> {
    let mut shots = Vec::new();
    for segment in &analysis.segments {
        plan_section(segment, aesthetic, &mut shots);
    }

    insert_key_moments(&mut shots, analysis, rng);
    shots.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));

    tracing::debug!(shots = shots.len(), "section shots synthesized");
    shots
}

fn plan_section(segment: &Segment, aesthetic: &Aesthetic, shots: &mut Vec<Shot>) {
    let energy = segment.energy();
    let shot_length = shot_length(segment.kind, energy);
    let count = (segment.duration() / shot_length).ceil() as usize;

    for i in 0..count {
        let timestamp = segment.start_time + i as f32 * shot_length;
        let duration = shot_length.min(segment.end_time - timestamp);
        if duration <= 0.0 {
            break;
        }

        let (transition_in, transition_out) = transitions_for(segment.kind, energy);
        shots.push(Shot {
            id: shot_id(shots.len() + 1),
            timestamp,
            duration,
            source: ShotSource::Section(segment.kind),
            prompt: section_prompt(segment, i, aesthetic),
            energy_level: energy,
            effects: section_effects(segment.kind, energy),
            transition_in,
            transition_out,
            frame_count: frame_count(duration),
            is_key_moment: false,
        });
    }
}

/// High energy means shorter cuts; intros and outros breathe.
fn shot_length(kind: Option<SegmentKind>, energy: f32) -> f32 {
    match kind {
        Some(SegmentKind::Drop) | Some(SegmentKind::Buildup) => {
            if energy > 0.8 {
                2.0
            } else {
                3.0
            }
        }
        Some(SegmentKind::Intro) | Some(SegmentKind::Outro) => 6.0,
        _ => {
            if energy > 0.7 {
                3.0
            } else if energy > 0.4 {
                5.0
            } else {
                7.0
            }
        }
    }
}

fn section_prompt(segment: &Segment, shot_index: usize, aesthetic: &Aesthetic) -> String {
    let energy = segment.energy();
    let subject = aesthetic.subjects[shot_index % aesthetic.subjects.len()];
    let motion = if energy > 0.8 {
        "fast aggressive motion, rapid movement, intense dynamics"
    } else if energy > 0.6 {
        "dynamic flowing motion, energetic movement"
    } else if energy > 0.4 {
        "smooth moderate motion, gentle flow"
    } else {
        "slow deliberate motion, calm drift"
    };
    let camera = aesthetic.camera_style.movement_for_energy(energy);
    let lighting = lighting_for(segment.kind);
    format!("{subject}, {motion}, {camera}, {lighting}, {SECTION_QUALITY_SUFFIX}")
}

fn lighting_for(kind: Option<SegmentKind>) -> &'static str {
    match kind {
        Some(SegmentKind::Intro) => "soft ambient lighting, gentle glow",
        Some(SegmentKind::Verse) => "balanced lighting, natural illumination",
        Some(SegmentKind::Buildup) => "dramatic lighting building intensity, growing brightness",
        Some(SegmentKind::Drop) => "explosive lighting, intense flashes, high contrast",
        Some(SegmentKind::Chorus) => "vibrant colorful lighting, energetic illumination",
        Some(SegmentKind::Break) => "moody atmospheric lighting, dim ambiance",
        Some(SegmentKind::Outro) => "fading gentle lighting, soft sunset glow",
        None => "balanced cinematic lighting",
    }
}

fn section_effects(kind: Option<SegmentKind>, energy: f32) -> Vec<&'static str> {
    let mut effects: Vec<&'static str> = if energy > 0.8 {
        vec!["chromatic-aberration-heavy", "screen-shake", "bloom-intense"]
    } else if energy > 0.6 {
        vec!["chromatic-aberration-medium", "bloom", "glow"]
    } else if energy > 0.4 {
        vec!["chromatic-aberration-light", "subtle-bloom", "vignette"]
    } else {
        vec!["soft-glow", "gentle-vignette"]
    };

    if kind == Some(SegmentKind::Drop) {
        effects.push("flash");
        effects.push("radial-blur");
    }
    effects
}

/// Default `(transition_in, transition_out)` pair by section kind and
/// energy band.
fn transitions_for(kind: Option<SegmentKind>, energy: f32) -> (Transition, Transition) {
    if kind == Some(SegmentKind::Drop) {
        (Transition::Explosion, Transition::HardCut)
    } else if energy > 0.7 {
        (Transition::QuickCut, Transition::Glitch)
    } else if energy > 0.4 {
        (Transition::Dissolve, Transition::Fade)
    } else {
        (Transition::SlowFade, Transition::Dissolve)
    }
}

/// Transition to use when one labeled section hands over to the next,
/// consumed by the assembly instructions.
pub fn section_pair_transition(from: Option<SegmentKind>, to: Option<SegmentKind>) -> Transition {
    match (from, to) {
        (Some(SegmentKind::Intro), Some(SegmentKind::Verse)) => Transition::SlowDissolve,
        (Some(SegmentKind::Verse), Some(SegmentKind::Buildup)) => Transition::QuickCuts,
        (Some(SegmentKind::Buildup), Some(SegmentKind::Drop)) => Transition::Explosion,
        (Some(SegmentKind::Drop), Some(SegmentKind::Chorus)) => Transition::ZoomBlur,
        (Some(SegmentKind::Chorus), Some(SegmentKind::Verse)) => Transition::Dissolve,
        (Some(SegmentKind::Verse), Some(SegmentKind::Outro)) => Transition::SlowFade,
        _ => Transition::Dissolve,
    }
}

fn impact_prompt_pool(kind: SegmentKind) -> &'static [&'static str] {
    match kind {
        SegmentKind::Buildup => &[
            "tension building with accelerating particles, anticipation growing",
            "energy accumulating into vortex, spiral intensifying",
            "compressed spring about to release, pressure mounting",
        ],
        SegmentKind::Break => &[
            "sudden silence visualized as frozen particles, time stop",
            "empty void with single floating element, isolation",
            "calm after storm, settling dust particles",
        ],
        _ => &[
            "massive explosion of neon particles, shockwave expanding, extreme intensity",
            "reality shattering into fractal pieces, kaleidoscope explosion",
            "supernova burst of colored energy, universe collapsing",
            "digital world glitching and reconstructing, matrix breakdown",
        ],
    }
}

/// Forces a short, maximum-impact shot at every buildup/drop/break start,
/// replacing whichever ordinary shot occupies that timestamp.
fn insert_key_moments(shots: &mut Vec<Shot>, analysis: &AudioAnalysis, rng: &mut StdRng) {
    for segment in &analysis.segments {
        let kind = match segment.kind {
            Some(kind @ (SegmentKind::Drop | SegmentKind::Buildup | SegmentKind::Break)) => kind,
            _ => continue,
        };
        let duration = if kind == SegmentKind::Drop { 2.0 } else { 1.5 };
        let pool = impact_prompt_pool(kind);
        let template = pool[rng.gen_range(0..pool.len())];

        let impact = Shot {
            id: format!("impact_{}_{}", kind.as_str(), segment.start_time.round() as i64),
            timestamp: segment.start_time,
            duration,
            source: ShotSource::Section(segment.kind),
            prompt: format!("{template}, {IMPACT_QUALITY_SUFFIX}"),
            energy_level: 1.0,
            effects: vec![
                "screen-shake-extreme",
                "flash-white",
                "chromatic-aberration-extreme",
                "radial-blur",
            ],
            transition_in: Transition::Explosion,
            transition_out: Transition::HardCut,
            frame_count: frame_count(duration),
            is_key_moment: true,
        };

        match shots.iter().position(|s| s.timestamp >= segment.start_time) {
            Some(index) => shots[index] = impact,
            None => shots.push(impact),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::test_support::{analysis_from_beats, analysis_from_sections};
    use crate::casting::cast_for_structure;
    use crate::style::{NarrativeStructure, VIBRANT_DYNAMIC};
    use crate::threads::schedule_threads;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    fn character_fixture() -> (Vec<CharacterThread>, AudioAnalysis) {
        let analysis = analysis_from_beats(&[0.0, 0.5, 1.0, 1.5, 2.0, 2.5], 10.0);
        let cast = cast_for_structure(NarrativeStructure::ParallelNarratives);
        let threads = schedule_threads(&cast, &analysis, NarrativeStructure::ParallelNarratives);
        (threads, analysis)
    }

    #[test]
    fn character_shots_are_sorted_with_stable_ties() {
        let (threads, analysis) = character_fixture();
        let shots = synthesize_character_shots(&threads, &analysis, &mut rng());

        for pair in shots.windows(2) {
            assert!(pair[0].timestamp <= pair[1].timestamp);
        }
        // The bridge thread shares every beat; on ties the earlier-declared
        // thread comes first.
        let first_two: Vec<ShotSource> = shots.iter().take(2).map(|s| s.source).collect();
        assert_eq!(
            first_two,
            vec![
                ShotSource::Character(CharacterId::NeonHero),
                ShotSource::Character(CharacterId::GlitchAntagonist),
            ]
        );
    }

    #[test]
    fn frame_counts_follow_durations() {
        let (threads, analysis) = character_fixture();
        let shots = synthesize_character_shots(&threads, &analysis, &mut rng());
        for shot in &shots {
            assert_eq!(shot.frame_count, (shot.duration * 24.0).round() as u32);
        }
    }

    #[test]
    fn same_seed_reproduces_prompts() {
        let (threads, analysis) = character_fixture();
        let a = synthesize_character_shots(&threads, &analysis, &mut StdRng::seed_from_u64(42));
        let b = synthesize_character_shots(&threads, &analysis, &mut StdRng::seed_from_u64(42));
        let prompts_a: Vec<&str> = a.iter().map(|s| s.prompt.as_str()).collect();
        let prompts_b: Vec<&str> = b.iter().map(|s| s.prompt.as_str()).collect();
        assert_eq!(prompts_a, prompts_b);
    }

    #[test]
    fn hot_appearances_gain_shake_and_blur() {
        let analysis = analysis_from_sections(&[(0.0, 4.0, 0.9, None)]);
        let cast = cast_for_structure(NarrativeStructure::HyperPresentHero);
        let threads = schedule_threads(&cast, &analysis, NarrativeStructure::HyperPresentHero);
        let shots = synthesize_character_shots(&threads, &analysis, &mut rng());

        assert!(!shots.is_empty());
        for shot in &shots {
            assert!(shot.effects.contains(&"screen-shake"));
            assert!(shot.effects.contains(&"radial-blur"));
        }
    }

    #[test]
    fn sections_are_tiled_within_bounds() {
        let analysis = analysis_from_sections(&[
            (0.0, 10.0, 0.5, Some(SegmentKind::Verse)),
            (10.0, 14.0, 0.9, Some(SegmentKind::Chorus)),
        ]);
        let shots = synthesize_section_shots(&analysis, &VIBRANT_DYNAMIC, &mut rng());

        for segment in &analysis.segments {
            let length = shot_length(segment.kind, segment.energy());
            let total: f32 = shots
                .iter()
                .filter(|s| segment.contains(s.timestamp))
                .map(|s| s.duration)
                .sum();
            assert!(total <= segment.duration() + length);
        }
        for pair in shots.windows(2) {
            assert!(pair[0].timestamp <= pair[1].timestamp);
        }
    }

    #[test]
    fn shot_lengths_follow_kind_and_energy() {
        assert_eq!(shot_length(Some(SegmentKind::Drop), 0.9), 2.0);
        assert_eq!(shot_length(Some(SegmentKind::Buildup), 0.6), 3.0);
        assert_eq!(shot_length(Some(SegmentKind::Intro), 0.9), 6.0);
        assert_eq!(shot_length(None, 0.8), 3.0);
        assert_eq!(shot_length(None, 0.5), 5.0);
        assert_eq!(shot_length(None, 0.2), 7.0);
    }

    #[test]
    fn drop_sections_get_a_key_moment_shot() {
        let analysis = analysis_from_sections(&[
            (0.0, 8.0, 0.5, Some(SegmentKind::Verse)),
            (8.0, 12.0, 0.95, Some(SegmentKind::Drop)),
        ]);
        let shots = synthesize_section_shots(&analysis, &VIBRANT_DYNAMIC, &mut rng());

        let impact = shots
            .iter()
            .find(|s| s.is_key_moment)
            .expect("drop produces a key moment");
        assert_eq!(impact.timestamp, 8.0);
        assert_eq!(impact.duration, 2.0);
        assert_eq!(impact.energy_level, 1.0);
        assert_eq!(impact.transition_in, Transition::Explosion);
        assert_eq!(impact.transition_out, Transition::HardCut);
        assert!(impact.id.starts_with("impact_drop_"));

        // It replaced the ordinary shot at the section start.
        assert_eq!(
            shots
                .iter()
                .filter(|s| s.timestamp == 8.0)
                .count(),
            1
        );
    }

    #[test]
    fn unlabeled_sections_plan_without_key_moments() {
        let analysis = analysis_from_sections(&[(0.0, 12.0, 0.6, None)]);
        let shots = synthesize_section_shots(&analysis, &VIBRANT_DYNAMIC, &mut rng());

        assert!(!shots.is_empty());
        assert!(shots.iter().all(|s| !s.is_key_moment));
        assert!(shots.iter().all(|s| s.prompt.contains("balanced cinematic lighting")));
    }

    #[test]
    fn drop_shots_default_to_explosion_and_hard_cut() {
        let analysis = analysis_from_sections(&[(0.0, 3.0, 0.5, Some(SegmentKind::Drop))]);
        let shots = synthesize_section_shots(&analysis, &VIBRANT_DYNAMIC, &mut rng());
        for shot in &shots {
            assert_eq!(shot.transition_in, Transition::Explosion);
            assert_eq!(shot.transition_out, Transition::HardCut);
            assert!(shot.effects.contains(&"radial-blur"));
        }
    }
}
