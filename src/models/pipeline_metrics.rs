use serde::{Deserialize, Serialize};

/// Metrics emitted by the post-processing pipeline for a single completed job.
/// Immutable once the job terminates; persisted as `confidence_metrics_json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineMetrics {
    pub word_count: usize,
    pub exact_match_count: usize,
    pub fuzzy_match_count: usize,
    pub confidence_score: f64,
    pub step_durations_ms: StepDurations,
    pub length_deltas: LengthDeltas,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StepDurations {
    pub lexicon_ms: u64,
    pub cleanup_ms: u64,
    pub numeral_ms: u64,
    pub polish_ms: u64,
}

/// Character-length change introduced by each step, `processed - input`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LengthDeltas {
    pub lexicon: i64,
    pub cleanup: i64,
    pub numeral: i64,
    pub polish: i64,
}

/// Human-facing quality bucket derived from `confidence_score`; never stored.
pub fn confidence_bucket(score: f64) -> &'static str {
    if score >= 0.95 {
        "excellent"
    } else if score >= 0.85 {
        "good"
    } else if score >= 0.70 {
        "fair"
    } else {
        "poor"
    }
}
