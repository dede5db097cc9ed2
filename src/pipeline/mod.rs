pub mod cleanup;
pub mod confidence;
pub mod fuzzy;
pub mod lexicon_step;
pub mod numerals;
pub mod polish;

use std::time::Instant;

use crate::clients::PolishClient;
use crate::config::settings::PipelineConfig;
use crate::models::lexicon::CompiledLexicon;
use crate::models::pipeline_metrics::{LengthDeltas, PipelineMetrics, StepDurations};
use crate::pipeline::numerals::NumeralStrategy;

/// Runs the deterministic post-processing pipeline (C9) over a raw recognizer transcript:
/// lexicon substitution, cleanup, numeral normalization, then optional LLM polish, each
/// individually toggleable via `PipelineConfig`. Returns the final text plus the metrics
/// recorded at every step, which the caller persists alongside the job.
pub async fn run(
    raw_text: &str,
    lexicon: &CompiledLexicon,
    language: Option<&str>,
    config: &PipelineConfig,
    polish_client: &dyn PolishClient,
    polish_timeout_secs: u64,
) -> (String, PipelineMetrics) {
    let word_count = raw_text.split_whitespace().count().max(1);
    let original_len = raw_text.chars().count() as i64;

    let mut text = raw_text.to_string();
    let mut exact_match_count = 0;
    let mut fuzzy_match_count = 0;
    let mut durations = StepDurations::default();
    let mut deltas = LengthDeltas::default();

    if config.enable_lexicon {
        let before_len = text.chars().count() as i64;
        let started = Instant::now();
        let result = lexicon_step::apply(&text, lexicon, config.fuzzy_enabled, config.fuzzy_threshold);
        durations.lexicon_ms = started.elapsed().as_millis() as u64;
        exact_match_count = result.exact_match_count;
        fuzzy_match_count = result.fuzzy_match_count;
        text = result.text;
        deltas.lexicon = text.chars().count() as i64 - before_len;
    }

    if config.enable_cleanup {
        let before_len = text.chars().count() as i64;
        let started = Instant::now();
        text = cleanup::apply(&text, config.language_normalisations_enabled);
        durations.cleanup_ms = started.elapsed().as_millis() as u64;
        deltas.cleanup = text.chars().count() as i64 - before_len;
    }

    if config.enable_numeral {
        let before_len = text.chars().count() as i64;
        let started = Instant::now();
        let strategy = NumeralStrategy::parse(&config.numeral_strategy);
        text = numerals::apply(&text, strategy, language);
        durations.numeral_ms = started.elapsed().as_millis() as u64;
        deltas.numeral = text.chars().count() as i64 - before_len;
    }

    if config.enable_large_model_polish {
        let before_len = text.chars().count() as i64;
        let started = Instant::now();
        text = polish::apply(&text, polish_client, true, polish_timeout_secs).await;
        durations.polish_ms = started.elapsed().as_millis() as u64;
        deltas.polish = text.chars().count() as i64 - before_len;
    }

    let _ = original_len;
    let confidence_score = confidence::compute(
        word_count,
        exact_match_count,
        fuzzy_match_count,
        config.confidence_alpha,
        config.confidence_beta,
        config.confidence_gamma,
    );

    let metrics = PipelineMetrics {
        word_count,
        exact_match_count,
        fuzzy_match_count,
        confidence_score,
        step_durations_ms: durations,
        length_deltas: deltas,
    };

    (text, metrics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::ClientError;
    use crate::models::lexicon::CompiledEntry;
    use async_trait::async_trait;

    struct NoopPolishClient;

    #[async_trait]
    impl PolishClient for NoopPolishClient {
        async fn polish(&self, _system_prompt: &str, _text: &str) -> Result<String, ClientError> {
            Ok(String::new())
        }
    }

    fn config() -> PipelineConfig {
        PipelineConfig {
            enable_lexicon: true,
            enable_cleanup: true,
            enable_numeral: true,
            enable_large_model_polish: false,
            numeral_strategy: "preserve".to_string(),
            fuzzy_enabled: false,
            fuzzy_threshold: 85,
            language_normalisations_enabled: false,
            confidence_alpha: 0.02,
            confidence_beta: 0.05,
            confidence_gamma: 0.5,
        }
    }

    #[tokio::test]
    async fn runs_full_pipeline_without_polish() {
        let lexicon = CompiledLexicon {
            lexicon_id: "radiology".to_string(),
            entries: vec![CompiledEntry {
                normalized_term: "mri".to_string(),
                replacement: "MRI".to_string(),
            }],
        };
        let client = NoopPolishClient;
        let (text, metrics) = run("order an mri   scan", &lexicon, None, &config(), &client, 5).await;
        assert_eq!(text, "order an MRI scan");
        assert_eq!(metrics.exact_match_count, 1);
        assert!(metrics.confidence_score <= 1.0);
    }
}
