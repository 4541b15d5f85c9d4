// SPDX-FileCopyrightText: 2026 Tidewell Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! External generation with deterministic fallback.
//!
//! [`GeneratorWithFallback::generate`] never fails and never returns an empty
//! list: every provider error, timeout or blank response is absorbed and
//! answered by the [`RuleEngine`].

use std::sync::Arc;
use std::time::Duration;

use tidewell_config::model::GeneratorConfig;
use tidewell_core::{MoodSample, ProviderAdapter, RecommendationDraft, TidewellError};
use tracing::{debug, info, warn};

use crate::decoder::{Decoding, decode_response};
use crate::prompt::build_prompt;
use crate::rules::RuleEngine;

/// Wraps an optional provider and falls back to the rule engine.
#[derive(Clone)]
pub struct GeneratorWithFallback {
    rules: RuleEngine,
    provider: Option<Arc<dyn ProviderAdapter>>,
    enabled: bool,
    timeout: Duration,
}

impl GeneratorWithFallback {
    pub fn new(provider: Option<Arc<dyn ProviderAdapter>>, config: &GeneratorConfig) -> Self {
        Self {
            rules: RuleEngine::new(),
            provider,
            enabled: config.enabled,
            timeout: config.timeout(),
        }
    }

    /// A generator that always answers from the rule engine.
    pub fn rules_only() -> Self {
        Self {
            rules: RuleEngine::new(),
            provider: None,
            enabled: false,
            timeout: GeneratorConfig::default().timeout(),
        }
    }

    /// Whether a provider will be consulted at all.
    pub fn uses_provider(&self) -> bool {
        self.enabled && self.provider.is_some()
    }

    /// Recommendations for `user_id`. Infallible; never empty.
    pub async fn generate(&self, user_id: &str, samples: &[MoodSample]) -> Vec<RecommendationDraft> {
        let provider = match &self.provider {
            Some(provider) if self.enabled => provider,
            _ => {
                debug!(user_id, "external generator disabled, using rules");
                return self.rules.generate(user_id, samples);
            }
        };

        match self.attempt(provider.as_ref(), user_id, samples).await {
            Ok(drafts) => drafts,
            Err(e) => {
                warn!(user_id, provider = provider.name(), error = %e, "external generation failed, falling back to rules");
                self.rules.generate(user_id, samples)
            }
        }
    }

    async fn attempt(
        &self,
        provider: &dyn ProviderAdapter,
        user_id: &str,
        samples: &[MoodSample],
    ) -> Result<Vec<RecommendationDraft>, TidewellError> {
        let prompt = build_prompt(samples);
        let raw = tokio::time::timeout(self.timeout, provider.complete(&prompt))
            .await
            .map_err(|_| TidewellError::Timeout {
                duration: self.timeout,
            })??;

        let decoding = decode_response(&raw);
        match &decoding {
            Decoding::Empty => {
                return Err(TidewellError::provider("provider returned an empty response"));
            }
            Decoding::Unstructured(_) => {
                warn!(user_id, "could not decode generator output, keeping it as one recommendation");
            }
            Decoding::Decoded(lines) => {
                info!(user_id, count = lines.len(), "generated recommendations");
            }
        }
        Ok(decoding.into_drafts(user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use tidewell_core::{
        AdapterType, HealthStatus, PluginAdapter, RecommendationSource, RecommendationType,
    };
    use tracing_test::traced_test;

    enum Reply {
        Text(&'static str),
        Fail,
        Stall(Duration),
    }

    struct StubProvider(Reply);

    #[async_trait]
    impl PluginAdapter for StubProvider {
        fn name(&self) -> &str {
            "stub"
        }
        fn version(&self) -> semver::Version {
            semver::Version::new(0, 0, 0)
        }
        fn adapter_type(&self) -> AdapterType {
            AdapterType::Provider
        }
        async fn health_check(&self) -> Result<HealthStatus, TidewellError> {
            Ok(HealthStatus::Healthy)
        }
        async fn shutdown(&self) -> Result<(), TidewellError> {
            Ok(())
        }
    }

    #[async_trait]
    impl ProviderAdapter for StubProvider {
        async fn complete(&self, _prompt: &str) -> Result<String, TidewellError> {
            match &self.0 {
                Reply::Text(text) => Ok((*text).to_string()),
                Reply::Fail => Err(TidewellError::provider("quota exceeded")),
                Reply::Stall(d) => {
                    tokio::time::sleep(*d).await;
                    Ok("1. [FOCUS]: too late".to_string())
                }
            }
        }
    }

    fn enabled(reply: Reply) -> GeneratorWithFallback {
        let config = GeneratorConfig {
            enabled: true,
            timeout_secs: 20,
        };
        GeneratorWithFallback::new(Some(Arc::new(StubProvider(reply))), &config)
    }

    fn stressed() -> Vec<MoodSample> {
        let d = NaiveDate::from_ymd_opt(2026, 4, 10).unwrap();
        vec![
            MoodSample::new("u1", d, 3, 4, 3),
            MoodSample::new("u1", d.pred_opt().unwrap(), 3, 5, 3),
        ]
    }

    #[tokio::test]
    async fn disabled_generator_matches_rule_engine() {
        let config = GeneratorConfig {
            enabled: false,
            timeout_secs: 20,
        };
        let generator = GeneratorWithFallback::new(
            Some(Arc::new(StubProvider(Reply::Text("1. [MUSIC]: hi")))),
            &config,
        );
        assert!(!generator.uses_provider());
        assert_eq!(
            generator.generate("u1", &stressed()).await,
            RuleEngine::new().generate("u1", &stressed())
        );
    }

    #[tokio::test]
    async fn missing_provider_matches_rule_engine() {
        let generator = GeneratorWithFallback::rules_only();
        assert_eq!(
            generator.generate("u1", &[]).await,
            RuleEngine::new().generate("u1", &[])
        );
    }

    #[tokio::test]
    async fn decoded_output_is_ai_sourced() {
        let generator = enabled(Reply::Text(
            "1. [BREATHING]: Breathe in for four counts\n2. [BREAK]: Step outside",
        ));
        let out = generator.generate("u1", &stressed()).await;
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|d| d.source == RecommendationSource::Ai));
        assert_eq!(out[1].kind, RecommendationType::Break);
    }

    #[traced_test]
    #[tokio::test]
    async fn provider_error_falls_back_and_logs() {
        let out = enabled(Reply::Fail).generate("u1", &stressed()).await;
        assert_eq!(out, RuleEngine::new().generate("u1", &stressed()));
        assert!(logs_contain("falling back to rules"));
        assert!(logs_contain("quota exceeded"));
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_provider_times_out_to_rules() {
        let out = enabled(Reply::Stall(Duration::from_secs(60)))
            .generate("u1", &stressed())
            .await;
        assert!(out.iter().all(|d| d.source == RecommendationSource::Rule));
        assert_eq!(out, RuleEngine::new().generate("u1", &stressed()));
    }

    #[tokio::test]
    async fn blank_response_falls_back_to_rules() {
        let out = enabled(Reply::Text("   \n ")).generate("u1", &stressed()).await;
        assert_eq!(out, RuleEngine::new().generate("u1", &stressed()));
    }

    #[tokio::test]
    async fn unstructured_response_is_kept_verbatim() {
        let out = enabled(Reply::Text("Take it easy this week."))
            .generate("u1", &stressed())
            .await;
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].kind, RecommendationType::Custom);
        assert_eq!(out[0].message, "Take it easy this week.");
        assert_eq!(out[0].source, RecommendationSource::Ai);
    }
}
