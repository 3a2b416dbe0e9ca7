use crate::casting::trait_similarity;
use crate::shots::{Shot, ShotSource, Transition};

/// Character pairs sharing less than this trait overlap get a slow
/// cross-dissolve instead of whatever cut they carried.
const SIMILARITY_FLOOR: f32 = 0.3;

/// Energy jumps larger than this read as jarring and get smoothed.
const ENERGY_JUMP_LIMIT: f32 = 0.4;

/// Post-hoc smoothing over adjacent shots. Mutates transition fields only
/// and preserves shot order; repeated application with no reordering leaves
/// the list unchanged.
pub fn enforce_continuity(shots: &mut [Shot]) {
    let mut smoothed = 0_usize;
    for i in 1..shots.len() {
        // Cutting between visually unrelated characters needs a softer join.
        if let (ShotSource::Character(prev), ShotSource::Character(curr)) =
            (shots[i - 1].source, shots[i].source)
        {
            if prev != curr && trait_similarity(prev, curr) < SIMILARITY_FLOOR {
                shots[i].transition_in = Transition::CrossDissolveSlow;
                smoothed += 1;
            }
        }

        // Large energy jumps between ordinary section shots get a glitch
        // dissolve; key moments are meant to hit hard and stay untouched.
        if let (ShotSource::Section(_), ShotSource::Section(_)) =
            (shots[i - 1].source, shots[i].source)
        {
            let jump = (shots[i].energy_level - shots[i - 1].energy_level).abs();
            if jump > ENERGY_JUMP_LIMIT && !shots[i].is_key_moment {
                shots[i].transition_in = Transition::GlitchDissolve;
                smoothed += 1;
            }
        }

        // Two hard cuts in a row read as monotonous; soften the second.
        if shots[i - 1].transition_out == Transition::HardCut
            && shots[i].transition_in == Transition::HardCut
        {
            shots[i].transition_in = Transition::QuickCut;
        }
    }

    if smoothed > 0 {
        tracing::debug!(smoothed, "continuity transitions adjusted");
    }
}
