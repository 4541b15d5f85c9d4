// SPDX-FileCopyrightText: 2026 Tidewell Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `tidewell serve` command implementation.
//!
//! Runs the queue consumer until SIGINT or SIGTERM, then closes storage.

use tidewell_config::model::TidewellConfig;
use tidewell_core::TidewellError;
use tidewell_pipeline::install_signal_handler;
use tracing::info;

use crate::app::App;

pub async fn run_serve(config: TidewellConfig) -> Result<(), TidewellError> {
    info!(
        queue = %config.queue.name,
        poll_interval_ms = config.queue.poll_interval_ms,
        max_attempts = config.queue.max_attempts,
        "starting tidewell serve"
    );

    let app = App::open(config, false).await?;
    let consumer = app.consumer();
    let cancel = install_signal_handler();

    consumer.run(cancel).await;

    app.close().await?;
    info!("tidewell serve stopped");
    Ok(())
}
