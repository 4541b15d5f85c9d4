// SPDX-FileCopyrightText: 2026 Tidewell Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests driving the `tidewell` binary and the assembled pipeline.
//!
//! Binary tests run against an explicit `--config` file in a temp directory
//! with a cleared environment, so no user configuration leaks in.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tidewell_core::{RecommendationSource, RecommendationType, StorageAdapter};
use tidewell_test_utils::{MockReply, TestHarness};

struct Workspace {
    dir: tempfile::TempDir,
    config: PathBuf,
}

impl Workspace {
    fn new(extra: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("tidewell.db");
        let config = dir.path().join("tidewell.toml");
        let body = format!(
            "[storage]\ndatabase_path = \"{}\"\n\n[agent]\nlog_level = \"warn\"\n{extra}",
            db.display().to_string().replace('\\', "/")
        );
        std::fs::write(&config, body).unwrap();
        Self { dir, config }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn run(&self, args: &[&str]) -> Output {
        self.run_with_env(args, &[])
    }

    fn run_with_env(&self, args: &[&str], vars: &[(&str, &str)]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_tidewell"))
            .arg("--config")
            .arg(&self.config)
            .args(args)
            .env_clear()
            .envs(vars.iter().copied())
            .current_dir(self.path())
            .output()
            .unwrap()
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

// ---- Binary ----

#[test]
fn record_then_sync_generate_then_list() {
    let ws = Workspace::new("");
    let today = chrono::Utc::now().date_naive();
    let yesterday = today.pred_opt().unwrap();
    for (date, stress) in [(today, "4"), (yesterday, "5")] {
        let date = date.to_string();
        let out = ws.run(&[
            "record", "--user", "u1", "--date", &date, "--mood", "3", "--stress", stress,
            "--productivity", "3",
        ]);
        assert!(out.status.success(), "record failed: {}", stderr(&out));
    }

    let out = ws.run(&["generate", "--user", "u1", "--days", "7", "--sync"]);
    assert!(out.status.success(), "generate failed: {}", stderr(&out));
    let generated = stdout(&out);
    assert!(generated.contains("breathing"));
    assert!(generated.contains("break"));
    assert!(generated.contains("rule"));

    let out = ws.run(&["list", "--user", "u1"]);
    assert!(out.status.success());
    assert_eq!(stdout(&out).lines().count(), 2);
}

#[test]
fn async_generate_queues_without_writing() {
    let ws = Workspace::new("");
    let out = ws.run(&["generate", "--user", "u1"]);
    assert!(out.status.success(), "generate failed: {}", stderr(&out));
    assert!(stdout(&out).contains("queued"));

    let out = ws.run(&["list", "--user", "u1"]);
    assert!(stdout(&out).contains("no recommendations"));
}

#[test]
fn environment_can_switch_generation_to_sync() {
    let ws = Workspace::new("");
    let out = ws.run_with_env(
        &["generate", "--user", "u1"],
        &[("TIDEWELL_RECOMMENDATIONS_ASYNC_MODE", "false")],
    );
    assert!(out.status.success(), "generate failed: {}", stderr(&out));
    assert!(!stdout(&out).contains("queued"));
    assert!(stdout(&out).contains("custom"));
}

#[test]
fn out_of_range_window_exits_nonzero() {
    let ws = Workspace::new("");
    let out = ws.run(&["generate", "--user", "u1", "--days", "45", "--sync"]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("window_days"));
}

#[test]
fn out_of_range_score_is_rejected() {
    let ws = Workspace::new("");
    let out = ws.run(&[
        "record", "--user", "u1", "--mood", "3", "--stress", "9", "--productivity", "3",
    ]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("stress"));
}

#[test]
fn unknown_config_key_exits_with_status_one() {
    let ws = Workspace::new("\n[queue]\nmax_attemps = 2\n");
    let out = ws.run(&["list", "--user", "u1"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("max_attemps"));
}

#[test]
fn doctor_reports_checks() {
    let ws = Workspace::new("");
    let out = ws.run(&["doctor", "--plain"]);
    assert!(out.status.success());
    let report = stdout(&out);
    assert!(report.contains("Configuration"));
    assert!(report.contains("Generator"));
}

// ---- Pipeline ----

#[tokio::test]
async fn harness_async_round_trip_lists_rule_output() {
    let harness = TestHarness::builder()
        .with_async_mode(true)
        .build()
        .await
        .unwrap();
    harness
        .seed_samples("u1", &[(0, 4, 2, 4), (1, 5, 2, 5)])
        .await
        .unwrap();

    assert!(harness.orchestrator.generate("u1", 7).await.unwrap().is_empty());
    assert_eq!(harness.drain_queue().await.unwrap(), 1);

    let listed = harness.orchestrator.list("u1", None).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].kind, RecommendationType::Custom);
    assert!(listed[0].message.starts_with("Great work-life balance"));
}

#[tokio::test]
async fn harness_sync_generation_with_failing_provider_uses_rules() {
    let harness = TestHarness::builder()
        .with_mock_replies(vec![MockReply::fail("service unavailable")])
        .build()
        .await
        .unwrap();
    harness.seed_samples("u1", &[(0, 3, 3, 3)]).await.unwrap();

    let saved = harness.orchestrator.generate("u1", 7).await.unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].kind, RecommendationType::Hydration);
    assert_eq!(saved[0].source, RecommendationSource::Rule);

    let stored = harness.storage.list_recommendations("u1", None).await.unwrap();
    assert_eq!(stored, saved);
}
