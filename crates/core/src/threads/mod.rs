use serde::{Deserialize, Serialize};

use crate::analysis::{AudioAnalysis, Beat};
use crate::casting::{CastMember, Chapter, CharacterId, Role, ThreadId};
use crate::style::NarrativeStructure;

/// Duration given to an appearance with no following beat to close it.
pub const TRAILING_APPEARANCE_SECONDS: f32 = 2.0;

/// One on-screen presence of a character.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appearance {
    pub time: f32,
    pub duration: f32,
    /// Threads sharing the screen, for bridge members.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub co_occurrence: Vec<ThreadId>,
    /// 1-based chapter this appearance belongs to, for episodic structures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapter: Option<u32>,
}

/// Appearance timeline for one cast member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterThread {
    pub character: CharacterId,
    pub appearances: Vec<Appearance>,
}

/// Turns the cast and the beat grid into one appearance timeline per cast
/// member, according to the chosen structure's presence pattern.
pub fn schedule_threads(
    cast: &[CastMember],
    analysis: &AudioAnalysis,
    structure: NarrativeStructure,
) -> Vec<CharacterThread> {
    let threads: Vec<CharacterThread> = cast
        .iter()
        .map(|member| CharacterThread {
            character: member.character,
            appearances: appearances_for(member, analysis, structure),
        })
        .collect();

    tracing::debug!(
        structure = structure.key(),
        threads = threads.len(),
        appearances = threads.iter().map(|t| t.appearances.len()).sum::<usize>(),
        "threads scheduled"
    );
    threads
}

fn appearances_for(
    member: &CastMember,
    analysis: &AudioAnalysis,
    structure: NarrativeStructure,
) -> Vec<Appearance> {
    let beats = &analysis.beats;
    match structure {
        NarrativeStructure::HyperPresentHero => {
            // Only the protagonist's timeline is defined for this pattern;
            // supporting members stay off the beat grid.
            if member.role != Role::Protagonist {
                return Vec::new();
            }
            (0..beats.len())
                .map(|i| Appearance {
                    time: beats[i].time,
                    duration: duration_to_next(beats, i),
                    co_occurrence: Vec::new(),
                    chapter: None,
                })
                .collect()
        }
        NarrativeStructure::ParallelNarratives => {
            let Some(thread) = member.thread else {
                return Vec::new();
            };
            beats
                .iter()
                .enumerate()
                .filter(|(i, _)| match thread {
                    ThreadId::A => i % 2 == 0,
                    ThreadId::B => i % 2 == 1,
                    ThreadId::Both => true,
                })
                .map(|(i, beat)| Appearance {
                    time: beat.time,
                    duration: duration_to_next(beats, i),
                    co_occurrence: if thread == ThreadId::Both {
                        vec![ThreadId::A, ThreadId::B]
                    } else {
                        Vec::new()
                    },
                    chapter: None,
                })
                .collect()
        }
        NarrativeStructure::Episodic => {
            let Some(chapter) = member.chapter else {
                return Vec::new();
            };
            let mut appearances = Vec::new();
            for (idx, segment) in analysis.segments.iter().enumerate() {
                let chapter_number = idx as u32 + 1;
                let assigned = match chapter {
                    Chapter::All => true,
                    Chapter::Index(n) => n == chapter_number,
                };
                if !assigned {
                    continue;
                }

                let section_beats: Vec<&Beat> = beats
                    .iter()
                    .filter(|b| segment.contains(b.time))
                    .collect();
                for (i, beat) in section_beats.iter().enumerate() {
                    let duration = section_beats
                        .get(i + 1)
                        .map(|next| next.time - beat.time)
                        .unwrap_or(TRAILING_APPEARANCE_SECONDS);
                    appearances.push(Appearance {
                        time: beat.time,
                        duration,
                        co_occurrence: Vec::new(),
                        chapter: Some(chapter_number),
                    });
                }
            }
            appearances
        }
        NarrativeStructure::Ensemble => {
            let target = beats.len() * member.presence_target_pct as usize / 100;
            if target == 0 {
                return Vec::new();
            }
            let step = (beats.len() / target).max(1);

            let mut appearances = Vec::new();
            let mut i = 0;
            while i < beats.len() && appearances.len() < target {
                appearances.push(Appearance {
                    time: beats[i].time,
                    duration: duration_to_next(beats, i),
                    co_occurrence: Vec::new(),
                    chapter: None,
                });
                i += step;
            }
            appearances
        }
    }
}

fn duration_to_next(beats: &[Beat], index: usize) -> f32 {
    beats
        .get(index + 1)
        .map(|next| next.time - beats[index].time)
        .unwrap_or(TRAILING_APPEARANCE_SECONDS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::test_support::analysis_from_beats;
    use crate::analysis::Segment;
    use crate::casting::cast_for_structure;

    fn episodic_analysis() -> AudioAnalysis {
        let beat = |time: f32| Beat {
            time,
            confidence: 1.0,
            energy: 0.6,
        };
        AudioAnalysis {
            duration: 6.0,
            bpm: 120,
            beats: vec![beat(0.5), beat(1.0), beat(2.5), beat(3.0), beat(4.5), beat(5.0)],
            segments: vec![
                Segment {
                    start_time: 0.0,
                    end_time: 2.0,
                    intensity: 0.5,
                    kind: None,
                },
                Segment {
                    start_time: 2.0,
                    end_time: 4.0,
                    intensity: 0.7,
                    kind: None,
                },
                Segment {
                    start_time: 4.0,
                    end_time: 6.0,
                    intensity: 0.9,
                    kind: None,
                },
            ],
        }
    }

    #[test]
    fn protagonist_appears_on_every_beat() {
        let analysis = analysis_from_beats(&[1.0, 2.0, 3.0, 4.0], 10.0);
        let cast = cast_for_structure(NarrativeStructure::HyperPresentHero);
        let threads = schedule_threads(&cast, &analysis, NarrativeStructure::HyperPresentHero);

        assert_eq!(threads[0].appearances.len(), 4);
        assert_eq!(threads[0].appearances[0].duration, 1.0);
        assert_eq!(
            threads[0].appearances.last().unwrap().duration,
            TRAILING_APPEARANCE_SECONDS
        );
        // Supporting members have no defined timeline in this pattern.
        assert!(threads[1].appearances.is_empty());
    }

    #[test]
    fn parallel_threads_alternate_by_beat_parity() {
        let analysis = analysis_from_beats(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0], 10.0);
        let cast = cast_for_structure(NarrativeStructure::ParallelNarratives);
        let threads = schedule_threads(&cast, &analysis, NarrativeStructure::ParallelNarratives);

        let times_a: Vec<f32> = threads[0].appearances.iter().map(|a| a.time).collect();
        let times_b: Vec<f32> = threads[1].appearances.iter().map(|a| a.time).collect();
        assert_eq!(times_a, vec![0.0, 2.0, 4.0]);
        assert_eq!(times_b, vec![1.0, 3.0, 5.0]);

        let bridge = &threads[2];
        assert_eq!(bridge.appearances.len(), 6);
        for appearance in &bridge.appearances {
            assert_eq!(appearance.co_occurrence, vec![ThreadId::A, ThreadId::B]);
        }
    }

    #[test]
    fn episodic_members_stay_inside_their_chapter() {
        let analysis = episodic_analysis();
        let cast = cast_for_structure(NarrativeStructure::Episodic);
        let threads = schedule_threads(&cast, &analysis, NarrativeStructure::Episodic);

        // Chapter-bound members only take beats inside their own section.
        for (thread, chapter) in threads.iter().take(3).zip(1u32..) {
            assert_eq!(thread.appearances.len(), 2);
            for appearance in &thread.appearances {
                assert_eq!(appearance.chapter, Some(chapter));
            }
        }

        // The recurring member collects appearances from every chapter.
        let recurring = &threads[3];
        let chapters: Vec<Option<u32>> = recurring.appearances.iter().map(|a| a.chapter).collect();
        assert_eq!(
            chapters,
            vec![Some(1), Some(1), Some(2), Some(2), Some(3), Some(3)]
        );
    }

    #[test]
    fn ensemble_strides_toward_presence_targets() {
        let analysis = analysis_from_beats(
            &[0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0],
            20.0,
        );
        let cast = cast_for_structure(NarrativeStructure::Ensemble);
        let threads = schedule_threads(&cast, &analysis, NarrativeStructure::Ensemble);

        // 70% of 10 beats -> 7 appearances at stride 1.
        assert_eq!(threads[0].appearances.len(), 7);
        // 30% of 10 beats -> 3 appearances at stride 3.
        let times: Vec<f32> = threads[3].appearances.iter().map(|a| a.time).collect();
        assert_eq!(times, vec![0.0, 3.0, 6.0]);
    }

    #[test]
    fn ensemble_with_no_beats_yields_empty_threads() {
        let analysis = analysis_from_beats(&[], 30.0);
        let cast = cast_for_structure(NarrativeStructure::Ensemble);
        let threads = schedule_threads(&cast, &analysis, NarrativeStructure::Ensemble);
        assert!(threads.iter().all(|t| t.appearances.is_empty()));
    }

    #[test]
    fn appearances_never_have_negative_durations() {
        let analysis = analysis_from_beats(&[0.2, 0.9, 1.1, 4.0, 4.1], 8.0);
        for structure in NarrativeStructure::ALL {
            let cast = cast_for_structure(structure);
            let threads = schedule_threads(&cast, &analysis, structure);
            for thread in &threads {
                for appearance in &thread.appearances {
                    assert!(appearance.duration >= 0.0);
                }
            }
        }
    }
}
