use crate::Result;

use super::{
    bpm_from_beats, segments_from_beats, validate_input, AudioAnalysis, Beat, FeatureExtractor,
};

const WINDOW_SECONDS: f32 = 0.1;
const THRESHOLD_GAIN: f32 = 1.5;

/// Windowed mean-amplitude beat detector. The reference backend: cheap,
/// dependency-free, and good enough to drive the planner on percussive
/// material.
#[derive(Debug, Clone)]
pub struct EnergyExtractor {
    window_seconds: f32,
}

impl Default for EnergyExtractor {
    fn default() -> Self {
        Self {
            window_seconds: WINDOW_SECONDS,
        }
    }
}

impl EnergyExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mean absolute amplitude per window, 50% hop.
    fn window_energies(&self, samples: &[f32], window: usize, hop: usize) -> Vec<f32> {
        let mut energies = Vec::new();
        if samples.len() <= window {
            return energies;
        }

        let mut start = 0;
        while start < samples.len() - window {
            let sum: f32 = samples[start..start + window].iter().map(|s| s.abs()).sum();
            energies.push(sum / window as f32);
            start += hop;
        }
        energies
    }
}

impl FeatureExtractor for EnergyExtractor {
    fn extract(&self, samples: &[f32], duration: f32) -> Result<AudioAnalysis> {
        validate_input(samples, duration)?;

        // The decoder probes duration separately, so the effective sample
        // rate falls out of the buffer length.
        let sample_rate = samples.len() as f32 / duration;
        let window = ((sample_rate * self.window_seconds) as usize).max(2);
        let hop = (window / 2).max(1);

        let energies = self.window_energies(samples, window, hop);

        let mean = if energies.is_empty() {
            0.0
        } else {
            energies.iter().sum::<f32>() / energies.len() as f32
        };
        let threshold = mean * THRESHOLD_GAIN;

        // A beat is a strict local maximum above the threshold.
        let mut beats = Vec::new();
        for i in 1..energies.len().saturating_sub(1) {
            let energy = energies[i];
            if energy > threshold && energy > energies[i - 1] && energy > energies[i + 1] {
                beats.push(Beat {
                    time: (i * hop) as f32 / sample_rate,
                    confidence: (energy / threshold).min(1.0),
                    energy,
                });
            }
        }

        let bpm = bpm_from_beats(&beats);
        let segments = segments_from_beats(&beats, duration);
        tracing::debug!(
            beats = beats.len(),
            bpm,
            segments = segments.len(),
            "energy analysis complete"
        );

        Ok(AudioAnalysis {
            duration,
            bpm,
            beats,
            segments,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PlanError;

    /// Quiet buffer with full-scale 100-sample pulses at the given times.
    /// At 1000 Hz the extractor uses 100-sample windows with a 50-sample
    /// hop, so each pulse produces exactly one strict energy maximum.
    fn pulse_buffer(duration: f32, pulse_times: &[f32]) -> Vec<f32> {
        let sample_rate = 1000;
        let mut samples = vec![0.0_f32; (duration * sample_rate as f32) as usize];
        for &time in pulse_times {
            let center = (time * sample_rate as f32) as usize;
            for sample in samples.iter_mut().skip(center - 50).take(100) {
                *sample = 1.0;
            }
        }
        samples
    }

    #[test]
    fn rejects_invalid_input() {
        let extractor = EnergyExtractor::new();
        assert!(matches!(
            extractor.extract(&[], 10.0),
            Err(PlanError::InvalidAudio(_))
        ));
        assert!(matches!(
            extractor.extract(&[0.5], 0.0),
            Err(PlanError::InvalidAudio(_))
        ));
        assert!(matches!(
            extractor.extract(&[0.5], -3.0),
            Err(PlanError::InvalidAudio(_))
        ));
    }

    #[test]
    fn detects_regular_pulses_at_120_bpm() {
        let pulses: Vec<f32> = (0..7).map(|i| 0.5 + i as f32 * 0.5).collect();
        let samples = pulse_buffer(4.0, &pulses);

        let analysis = EnergyExtractor::new().extract(&samples, 4.0).unwrap();
        assert_eq!(analysis.beats.len(), 7);
        assert_eq!(analysis.bpm, 120);
        for beat in &analysis.beats {
            assert!(beat.confidence > 0.0 && beat.confidence <= 1.0);
        }
    }

    #[test]
    fn detects_one_second_spacing_as_60_bpm() {
        let pulses: Vec<f32> = (0..4).map(|i| 0.5 + i as f32).collect();
        let samples = pulse_buffer(4.0, &pulses);

        let analysis = EnergyExtractor::new().extract(&samples, 4.0).unwrap();
        assert_eq!(analysis.beats.len(), 4);
        assert_eq!(analysis.bpm, 60);
    }

    #[test]
    fn beat_times_strictly_increase() {
        let pulses: Vec<f32> = (0..10).map(|i| 0.5 + i as f32 * 0.7).collect();
        let samples = pulse_buffer(8.0, &pulses);

        let analysis = EnergyExtractor::new().extract(&samples, 8.0).unwrap();
        assert!(analysis.beats.len() >= 2);
        for pair in analysis.beats.windows(2) {
            assert!(pair[1].time > pair[0].time);
        }
    }

    #[test]
    fn segments_span_whole_track() {
        let samples = pulse_buffer(4.0, &[1.0, 2.0, 3.0]);
        let analysis = EnergyExtractor::new().extract(&samples, 4.0).unwrap();

        assert_eq!(analysis.segments[0].start_time, 0.0);
        assert_eq!(analysis.segments.last().unwrap().end_time, 4.0);
        for pair in analysis.segments.windows(2) {
            assert_eq!(pair[0].end_time, pair[1].start_time);
        }
    }

    #[test]
    fn flat_signal_recovers_with_defaults() {
        let samples = vec![0.01_f32; 30_000];
        let analysis = EnergyExtractor::new().extract(&samples, 30.0).unwrap();

        assert!(analysis.beats.is_empty());
        assert_eq!(analysis.bpm, 120);
        assert_eq!(analysis.segments.len(), 1);
        assert_eq!(analysis.segments[0].start_time, 0.0);
        assert_eq!(analysis.segments[0].end_time, 30.0);
    }
}
