use serde::{Deserialize, Serialize};

use crate::{PlanError, Result};

mod energy;
mod spectral;

pub use energy::EnergyExtractor;
pub use spectral::SpectralExtractor;

/// BPM reported when a track yields fewer than two beats.
pub const DEFAULT_BPM: u32 = 120;

/// Intensity assigned to the single whole-track segment of a beatless track.
pub const DEFAULT_INTENSITY: f32 = 0.5;

/// Energy assumed for timestamps that fall outside every segment.
pub const FALLBACK_ENERGY: f32 = 0.5;

/// Semantic label for one structural section of a track. The built-in
/// extractors never assign these; richer external analyzers may.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    Intro,
    Verse,
    Buildup,
    Drop,
    Chorus,
    Break,
    Outro,
}

impl SegmentKind {
    /// Stable lowercase name, matching the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Intro => "intro",
            Self::Verse => "verse",
            Self::Buildup => "buildup",
            Self::Drop => "drop",
            Self::Chorus => "chorus",
            Self::Break => "break",
            Self::Outro => "outro",
        }
    }
}

/// A detected rhythmic onset.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Beat {
    /// Onset time in seconds from the start of the track.
    pub time: f32,
    /// Detection confidence in `[0, 1]`.
    pub confidence: f32,
    /// Window energy at the onset.
    pub energy: f32,
}

/// A contiguous time slice bounded by consecutive beats.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Segment {
    pub start_time: f32,
    pub end_time: f32,
    /// Raw energy of the beat that opened the segment.
    pub intensity: f32,
    #[serde(default)]
    pub kind: Option<SegmentKind>,
}

impl Segment {
    pub fn duration(&self) -> f32 {
        self.end_time - self.start_time
    }

    /// Intensity clamped into `[0, 1]` for the planning stages.
    pub fn energy(&self) -> f32 {
        self.intensity.clamp(0.0, 1.0)
    }

    /// Whether the timestamp falls inside `[start_time, end_time)`.
    pub fn contains(&self, time: f32) -> bool {
        time >= self.start_time && time < self.end_time
    }
}

/// Full analysis of one decoded track. May come from either built-in
/// backend or an external analyzer; planning never depends on which.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioAnalysis {
    /// Track length in seconds, probed by the external decoder.
    pub duration: f32,
    pub bpm: u32,
    /// Beat times are strictly increasing.
    pub beats: Vec<Beat>,
    /// Contiguous, non-overlapping, covering `[0, duration]`.
    pub segments: Vec<Segment>,
}

impl AudioAnalysis {
    /// Mean segment energy across the track.
    pub fn avg_energy(&self) -> f32 {
        if self.segments.is_empty() {
            return 0.0;
        }
        let total: f32 = self.segments.iter().map(Segment::energy).sum();
        total / self.segments.len() as f32
    }

    /// Standard deviation of segment energies. High variance indicates
    /// distinct structural sections.
    pub fn energy_stddev(&self) -> f32 {
        if self.segments.is_empty() {
            return 0.0;
        }
        let avg = self.avg_energy();
        let variance: f32 = self
            .segments
            .iter()
            .map(|s| (s.energy() - avg).powi(2))
            .sum::<f32>()
            / self.segments.len() as f32;
        variance.sqrt()
    }

    /// Energy of the segment containing the timestamp, or a neutral value
    /// when no segment covers it.
    pub fn energy_at(&self, time: f32) -> f32 {
        self.segments
            .iter()
            .find(|s| s.contains(time))
            .map(Segment::energy)
            .unwrap_or(FALLBACK_ENERGY)
    }

    pub fn section_count(&self) -> usize {
        self.segments.len()
    }
}

/// Common interface over the pluggable analysis backends. Implementations
/// must be pure: same samples and duration always produce the same analysis.
pub trait FeatureExtractor {
    /// Analyses a decoded mono sample buffer. `duration` is the externally
    /// probed track length in seconds.
    fn extract(&self, samples: &[f32], duration: f32) -> Result<AudioAnalysis>;
}

/// Rejects input no backend can work with.
pub(crate) fn validate_input(samples: &[f32], duration: f32) -> Result<()> {
    if duration <= 0.0 {
        return Err(PlanError::invalid_audio(format!(
            "duration must be positive, got {duration}"
        )));
    }
    if samples.is_empty() {
        return Err(PlanError::invalid_audio("sample buffer is empty"));
    }
    Ok(())
}

/// Average-interval tempo estimate. Fewer than two beats cannot yield an
/// interval, so the default tempo is reported instead.
pub(crate) fn bpm_from_beats(beats: &[Beat]) -> u32 {
    if beats.len() < 2 {
        return DEFAULT_BPM;
    }

    let total: f32 = beats.windows(2).map(|pair| pair[1].time - pair[0].time).sum();
    let avg_interval = total / (beats.len() - 1) as f32;
    if avg_interval <= f32::EPSILON {
        return DEFAULT_BPM;
    }

    (60.0 / avg_interval).round() as u32
}

/// Builds the contiguous segment list for a beat grid. Segments always cover
/// `[0, duration]`: a lead-in segment is prepended when the first beat lands
/// after zero, and a beatless track becomes a single whole-track segment.
pub(crate) fn segments_from_beats(beats: &[Beat], duration: f32) -> Vec<Segment> {
    if beats.is_empty() {
        return vec![Segment {
            start_time: 0.0,
            end_time: duration,
            intensity: DEFAULT_INTENSITY,
            kind: None,
        }];
    }

    let mut segments = Vec::with_capacity(beats.len() + 1);
    if beats[0].time > 0.0 {
        segments.push(Segment {
            start_time: 0.0,
            end_time: beats[0].time,
            intensity: beats[0].energy,
            kind: None,
        });
    }

    for (i, beat) in beats.iter().enumerate() {
        let end_time = beats.get(i + 1).map(|b| b.time).unwrap_or(duration);
        segments.push(Segment {
            start_time: beat.time,
            end_time,
            intensity: beat.energy,
            kind: None,
        });
    }

    segments
}
