// SPDX-FileCopyrightText: 2026 Tidewell Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Component wiring shared by the subcommands.

use std::sync::Arc;

use tidewell_anthropic::AnthropicProvider;
use tidewell_config::model::TidewellConfig;
use tidewell_core::{ProviderAdapter, StorageAdapter, TidewellError};
use tidewell_engine::GeneratorWithFallback;
use tidewell_pipeline::{Consumer, Orchestrator, Producer, RecommendationCache};
use tidewell_storage::SqliteStorage;
use tracing::{debug, info};

/// Storage, cache and orchestrator built from one configuration.
pub struct App {
    pub config: TidewellConfig,
    pub storage: Arc<SqliteStorage>,
    pub cache: Arc<RecommendationCache>,
    pub orchestrator: Orchestrator,
}

impl App {
    /// Open storage and assemble the pipeline. `force_sync` overrides the
    /// configured async mode for this process.
    pub async fn open(config: TidewellConfig, force_sync: bool) -> Result<Self, TidewellError> {
        let storage = SqliteStorage::new(config.storage.clone()).with_queue_config(&config.queue);
        storage.initialize().await?;
        let storage = Arc::new(storage);

        let generator = build_generator(&config)?;
        let cache = Arc::new(RecommendationCache::new(&config.cache));
        let producer = Producer::new(storage.clone(), &config.queue);

        let mut recommendations = config.recommendations.clone();
        if force_sync {
            recommendations.async_mode = false;
        }
        let orchestrator = Orchestrator::new(
            storage.clone(),
            generator,
            producer,
            cache.clone(),
            &recommendations,
        );

        debug!(
            database = %config.storage.database_path,
            async_mode = orchestrator.is_async(),
            "pipeline assembled"
        );

        Ok(Self {
            config,
            storage,
            cache,
            orchestrator,
        })
    }

    /// A consumer over this app's storage that evicts the shared cache.
    pub fn consumer(&self) -> Consumer {
        Consumer::new(self.storage.clone(), self.storage.clone(), &self.config.queue)
            .with_cache(self.cache.clone())
    }

    pub async fn close(&self) -> Result<(), TidewellError> {
        self.storage.close().await
    }
}

fn build_generator(config: &TidewellConfig) -> Result<GeneratorWithFallback, TidewellError> {
    if !config.generator.enabled {
        info!("external generator disabled, recommendations come from rules");
        return Ok(GeneratorWithFallback::rules_only());
    }
    let provider: Arc<dyn ProviderAdapter> = Arc::new(AnthropicProvider::new(config)?);
    Ok(GeneratorWithFallback::new(Some(provider), &config.generator))
}
