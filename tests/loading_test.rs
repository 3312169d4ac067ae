//! Loading-pass behavior: concurrency, shared-namespace injection, fault
//! isolation, and the aggregate deadline.

mod support;

use std::sync::Arc;
use std::time::Duration;

use bytegate::{Agent, AgentConfig, LoadError, UnitName};

use support::{
    SimulatedRuntime, agent_home, delayed_marker_table, marker_table, write_package,
};

/// Provides six marker packages that all hook the same unit.
async fn attach_six_markers(
    home: &tempfile::TempDir,
    runtime: Arc<SimulatedRuntime>,
    config: AgentConfig,
) -> Agent {
    let mut builder = Agent::builder(runtime)
        .base_dir(home.path())
        .config(config);

    for i in 0..6 {
        let file_name = format!("pack{i}.plugin");
        let entry_name = format!("test.Marker{i}");
        write_package(home.path(), &file_name, &entry_name).await;
        builder = builder.provide_package(
            format!("pack{i}"),
            marker_table(
                &entry_name,
                &format!("pack{i}"),
                "com.shared.Target",
                format!("-p{i}").as_bytes(),
            ),
        );
    }

    builder.attach().await.expect("attach")
}

#[tokio::test]
async fn test_concurrent_loads_register_each_handler_once() {
    let home = agent_home().await;
    let runtime = SimulatedRuntime::new();
    runtime.define_unit("com.shared.Target", b"target");

    // A limiter smaller than the package count forces queueing.
    let mut config = AgentConfig::default();
    config.plugins.max_concurrent_loads = 2;

    let agent = attach_six_markers(&home, runtime.clone(), config).await;

    assert_eq!(agent.load_report().loaded.len(), 6);
    assert!(agent.load_report().failed.is_empty());
    assert!(!agent.load_report().timed_out);
    assert_eq!(
        agent
            .dispatcher()
            .chain_len(&UnitName::from("com.shared.Target")),
        6
    );

    let text = String::from_utf8(runtime.load_unit("com.shared.Target")).expect("utf8");
    assert!(text.starts_with("target"));
    for i in 0..6 {
        let marker = format!("-p{i}");
        assert_eq!(text.matches(&marker).count(), 1, "marker {marker} in {text}");
    }
}

#[tokio::test]
async fn test_shared_injection_is_serialized() {
    let home = agent_home().await;
    let runtime = SimulatedRuntime::new();

    let agent = attach_six_markers(&home, runtime.clone(), AgentConfig::default()).await;

    assert_eq!(agent.load_report().loaded.len(), 6);
    assert_eq!(runtime.inject_calls(), 6);
    assert!(!runtime.injection_overlap_detected());

    // Every package published its definitions to the shared namespace.
    for i in 0..6 {
        assert!(
            runtime
                .shared_definition(&format!("test.Marker{i}"))
                .is_some(),
            "definition test.Marker{i} missing from the shared namespace"
        );
    }
}

#[tokio::test]
async fn test_unresolved_entry_does_not_block_other_packages() {
    let home = agent_home().await;
    write_package(home.path(), "good.plugin", "test.GoodEntry").await;
    write_package(home.path(), "broken.plugin", "test.MissingEntry").await;

    let runtime = SimulatedRuntime::new();
    runtime.define_unit("com.good.Unit", b"good");

    let agent = Agent::builder(runtime.clone())
        .base_dir(home.path())
        .config(AgentConfig::default())
        .provide_package(
            "good",
            marker_table("test.GoodEntry", "good", "com.good.Unit", b"-ok"),
        )
        .attach()
        .await
        .expect("attach");

    let report = agent.load_report();
    assert_eq!(report.loaded.len(), 1);
    assert_eq!(report.loaded[0].package, "good");
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, "broken");
    assert!(matches!(
        report.failed[0].1,
        LoadError::EntryUnresolved { .. }
    ));

    // The healthy package's handler is live.
    assert_eq!(runtime.load_unit("com.good.Unit"), b"good-ok".to_vec());
}

#[tokio::test]
async fn test_manifest_without_entry_is_not_an_extension() {
    let home = agent_home().await;
    tokio::fs::write(
        home.path().join("plugins").join("artifacts.plugin"),
        "# companion definitions only\nlibrary =\n",
    )
    .await
    .expect("write manifest");

    let runtime = SimulatedRuntime::new();
    let agent = Agent::builder(runtime.clone())
        .base_dir(home.path())
        .config(AgentConfig::default())
        .attach()
        .await
        .expect("attach");

    let report = agent.load_report();
    assert!(report.loaded.is_empty());
    assert!(report.failed.is_empty());
    assert_eq!(report.not_extensions, vec!["artifacts".to_string()]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_deadline_reports_unfinished_packages_as_pending() {
    let home = agent_home().await;
    write_package(home.path(), "slow.plugin", "test.SlowEntry").await;

    let mut config = AgentConfig::default();
    config.plugins.load_timeout_secs = 0;

    let runtime = SimulatedRuntime::new();
    let agent = Agent::builder(runtime.clone())
        .base_dir(home.path())
        .config(config)
        .provide_package(
            "slow",
            delayed_marker_table(
                "test.SlowEntry",
                "slow",
                "com.slow.Unit",
                b"-late",
                Duration::from_millis(400),
            ),
        )
        .attach()
        .await
        .expect("attach");

    let report = agent.load_report();
    assert!(report.timed_out);
    assert!(report.loaded.is_empty());
    assert_eq!(report.pending, vec!["slow".to_string()]);
}
