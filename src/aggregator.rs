//! Observation aggregation
//!
//! Reduces a session's emotion and voice samples into percentage ratios.
//!
//! Two windowing policies coexist and are kept apart on purpose:
//! - [`LiveRatios`] look at a trailing window (last 10 emotions, last 5 voice
//!   samples by default) and feed the running risk estimate.
//! - [`ReportMetrics`] look at every sample of the session and feed the
//!   retrospective analysis report.

use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_EMOTION_WINDOW, DEFAULT_VOICE_WINDOW};
use crate::types::{EmotionSample, Sentiment, VoiceSample};

/// Windowed ratios used by the live risk estimate
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LiveRatios {
    /// Negative emotions in the trailing emotion window (0-100)
    pub emotional_instability_pct: f64,
    /// Negative voice samples in the trailing voice window (0-100)
    pub voice_negativity_pct: f64,
}

/// Whole-session metrics used by the analysis report
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportMetrics {
    /// Negative emotions across the session (0-100)
    pub emotional_negativity_pct: f64,
    /// Negative voice samples across the session (0-100)
    pub voice_negativity_pct: f64,
    /// Population standard deviation of emotion intensity (0-100)
    pub emotional_variability_pct: f64,
    /// Mean vocal stress (0-100)
    pub avg_stress_level_pct: f64,
    /// Happy or surprised emotions across the session (0-100)
    pub positive_emotion_ratio_pct: f64,
    /// Positive voice samples across the session (0-100)
    pub positive_voice_ratio_pct: f64,
}

/// Aggregator for emotion and voice observations
pub struct ObservationAggregator;

impl ObservationAggregator {
    /// Windowed ratios with the default 10/5 trailing windows
    pub fn live(emotions: &[EmotionSample], voices: &[VoiceSample]) -> LiveRatios {
        Self::live_with_windows(emotions, voices, DEFAULT_EMOTION_WINDOW, DEFAULT_VOICE_WINDOW)
    }

    /// Windowed ratios with explicit trailing window sizes
    pub fn live_with_windows(
        emotions: &[EmotionSample],
        voices: &[VoiceSample],
        emotion_window: usize,
        voice_window: usize,
    ) -> LiveRatios {
        let recent_emotions = trailing(emotions, emotion_window);
        let recent_voices = trailing(voices, voice_window);

        LiveRatios {
            emotional_instability_pct: percentage(
                count_negative_emotions(recent_emotions),
                recent_emotions.len(),
            ),
            voice_negativity_pct: percentage(
                count_sentiment(recent_voices, Sentiment::Negative),
                recent_voices.len(),
            ),
        }
    }

    /// Unwindowed metrics over the whole session
    pub fn report(emotions: &[EmotionSample], voices: &[VoiceSample]) -> ReportMetrics {
        let intensities: Vec<f64> = emotions.iter().map(|e| e.intensity).collect();

        ReportMetrics {
            emotional_negativity_pct: percentage(count_negative_emotions(emotions), emotions.len()),
            voice_negativity_pct: percentage(
                count_sentiment(voices, Sentiment::Negative),
                voices.len(),
            ),
            emotional_variability_pct: (population_std_dev(&intensities) * 100.0)
                .clamp(0.0, 100.0),
            avg_stress_level_pct: average_stress(voices),
            positive_emotion_ratio_pct: percentage(
                emotions.iter().filter(|e| e.emotion.is_positive()).count(),
                emotions.len(),
            ),
            positive_voice_ratio_pct: percentage(
                count_sentiment(voices, Sentiment::Positive),
                voices.len(),
            ),
        }
    }
}

/// Last `window` items of `items`, or all of them when shorter
fn trailing<T>(items: &[T], window: usize) -> &[T] {
    &items[items.len().saturating_sub(window)..]
}

pub(crate) fn count_negative_emotions(emotions: &[EmotionSample]) -> usize {
    emotions.iter().filter(|e| e.emotion.is_negative()).count()
}

pub(crate) fn count_sentiment(voices: &[VoiceSample], sentiment: Sentiment) -> usize {
    voices.iter().filter(|v| v.sentiment == sentiment).count()
}

/// `count / total` as a percentage clamped to [0, 100]; 0 for an empty total
fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (count as f64 / total as f64 * 100.0).clamp(0.0, 100.0)
}

fn average_stress(voices: &[VoiceSample]) -> f64 {
    if voices.is_empty() {
        return 0.0;
    }
    let total: f64 = voices.iter().map(|v| v.stress_level).sum();
    (total / voices.len() as f64 * 100.0).clamp(0.0, 100.0)
}

/// Population standard deviation; 0 for fewer than two values
fn population_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}
