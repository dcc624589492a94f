use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use procwatch_core::config::{ConfigLoader, CoreConfig};
use procwatch_domain::icons::{CustomIconMap, IconSource};
use procwatch_domain::notifications::{NotificationError, NotificationId, NotificationRecord, NotificationView};
use procwatch_domain::rules::{ProcessClassifier, RuleList, SharedRuleStore, UnrestrictedClassifier};
use procwatch_domain::{ProcessDetails, SystemClock};
use procwatch_system::{
    ControlEvent, ControlHandle, Interaction, NoIconProvider, Orchestrator, OrchestratorParts, StatusReport,
};
use tempfile::TempDir;
use tokio::task::JoinHandle;

#[derive(Debug, Default)]
struct ViewLog {
    rendered: Vec<NotificationId>,
    removed: Vec<NotificationId>,
}

#[derive(Debug, Clone, Default)]
struct RecordingView(Arc<Mutex<ViewLog>>);

impl NotificationView for RecordingView {
    fn render(&mut self, record: &NotificationRecord) -> Result<(), NotificationError> {
        self.0.lock().rendered.push(record.id);
        Ok(())
    }

    fn remove(&mut self, id: NotificationId) -> Result<(), NotificationError> {
        self.0.lock().removed.push(id);
        Ok(())
    }
}

struct Harness {
    handle: ControlHandle,
    view: RecordingView,
    task: JoinHandle<()>,
    config_path: PathBuf,
    dir: TempDir,
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn start<F>(configure: F, classifier: Option<Arc<dyn ProcessClassifier>>) -> Harness
where
    F: FnOnce(&mut CoreConfig),
{
    init_tracing();
    let dir = TempDir::new().unwrap();
    let mut config = CoreConfig::default();
    config.paths.block_list = dir.path().join("block_list.txt");
    config.paths.allow_list = dir.path().join("allow_list.txt");
    config.paths.custom_icons = dir.path().join("custom_icons.txt");
    config.paths.custom_icons_dir = dir.path().join("icons");
    config.notifications.queue_drain_interval = 50;
    configure(&mut config);

    let rule_store = Arc::new(SharedRuleStore::with_lists(
        RuleList::parse("/usr/bin/blocked\n", 1),
        RuleList::parse("/usr/bin/allowed\n", 1),
    ));
    let view = RecordingView::default();
    let config_path = dir.path().join("config.toml");
    let (orchestrator, handle) = Orchestrator::new(OrchestratorParts {
        config,
        config_path: Some(config_path.clone()),
        view: view.clone(),
        icon_provider: Arc::new(NoIconProvider),
        rule_store,
        classifier,
        clock: Arc::new(SystemClock),
    });
    let task = tokio::spawn(orchestrator.run());
    Harness { handle, view, task, config_path, dir }
}

fn process(pid: u32, path: &str) -> ProcessDetails {
    let name = path.rsplit('/').next().unwrap_or(path).to_string();
    ProcessDetails { pid, name, path: path.to_string(), elevated: false }
}

async fn appear(harness: &Harness, pid: u32, path: &str) {
    harness.handle.send(ControlEvent::ProcessAppeared(process(pid, path))).await.unwrap();
}

async fn wait_for<F>(handle: &ControlHandle, check: F) -> StatusReport
where
    F: Fn(&StatusReport) -> bool,
{
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        let status = handle.status().await.unwrap();
        if check(&status) {
            return status;
        }
        assert!(Instant::now() < deadline, "condition not reached, last status: {status:?}");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

fn paths(status: &StatusReport) -> Vec<String> {
    let mut paths: Vec<String> = status.visible.iter().map(|r| r.process.path.clone()).collect();
    paths.sort();
    paths
}

#[tokio::test]
async fn test_rules_decide_which_processes_are_announced() {
    let harness = start(|_| {}, None);
    appear(&harness, 1, "/usr/bin/blocked").await;
    appear(&harness, 2, "/usr/bin/allowed").await;
    appear(&harness, 3, "/opt/tool/run").await;

    let status = wait_for(&harness.handle, |s| s.visible.len() == 2).await;
    assert_eq!(paths(&status), vec!["/opt/tool/run".to_string(), "/usr/bin/allowed".to_string()]);
    let allowed = status.visible.iter().find(|r| r.process.path == "/usr/bin/allowed").unwrap();
    assert!(allowed.allowed);
    assert!(allowed.icon.as_ref().unwrap().is_fallback());
    assert_eq!(status.stats.admitted, 2);
}

#[tokio::test]
async fn test_unmatched_processes_can_be_hidden() {
    let harness = start(|c| c.monitor.show_unmatched = false, None);
    appear(&harness, 1, "/opt/tool/run").await;
    appear(&harness, 2, "/usr/bin/allowed").await;
    let status = wait_for(&harness.handle, |s| s.visible.len() == 1).await;
    assert_eq!(paths(&status), vec!["/usr/bin/allowed".to_string()]);
}

#[tokio::test]
async fn test_injected_classifier_replaces_rules() {
    let harness = start(|_| {}, Some(Arc::new(UnrestrictedClassifier)));
    appear(&harness, 1, "/usr/bin/blocked").await;
    let status = wait_for(&harness.handle, |s| s.visible.len() == 1).await;
    assert!(!status.visible[0].blocked);
}

#[tokio::test]
async fn test_disabling_blocking_flags_instead_of_hiding_and_persists() {
    let harness = start(|_| {}, None);
    harness.handle.send(ControlEvent::SetBlockingEnabled(false)).await.unwrap();
    appear(&harness, 1, "/usr/bin/blocked").await;

    let status = wait_for(&harness.handle, |s| s.visible.len() == 1).await;
    assert!(status.visible[0].blocked);
    assert!(!status.blocking_enabled);

    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(saved) = ConfigLoader::load_from(&harness.config_path) {
            if !saved.monitor.blocking_enabled {
                break;
            }
        }
        assert!(Instant::now() < deadline, "setting was not persisted");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test]
async fn test_disabled_notifications_drop_everything() {
    let harness = start(|_| {}, None);
    harness.handle.send(ControlEvent::SetNotificationsEnabled(false)).await.unwrap();
    appear(&harness, 1, "/usr/bin/allowed").await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    let status = harness.handle.status().await.unwrap();
    assert!(status.visible.is_empty());
    assert!(!status.notifications_enabled);
    assert_eq!(status.stats.admitted, 0);
}

#[tokio::test]
async fn test_records_fade_out_and_are_removed() {
    let harness = start(
        |c| {
            c.notifications.display_time = 100;
            c.notifications.fade_duration = 50;
        },
        None,
    );
    appear(&harness, 1, "/opt/tool/run").await;
    let status = wait_for(&harness.handle, |s| s.visible.len() == 1).await;
    let id = status.visible[0].id;

    let status = wait_for(&harness.handle, |s| s.visible.is_empty()).await;
    assert_eq!(status.stats.removed, 1);
    assert_eq!(harness.view.0.lock().removed, vec![id]);
}

#[tokio::test]
async fn test_pinned_record_outlives_display_time() {
    let harness = start(
        |c| {
            c.notifications.display_time = 300;
            c.notifications.fade_duration = 50;
        },
        None,
    );
    appear(&harness, 1, "/opt/tool/run").await;
    let status = wait_for(&harness.handle, |s| s.visible.len() == 1).await;
    let id = status.visible[0].id;
    harness.handle.interact(id, Interaction::TogglePin).await.unwrap();

    tokio::time::sleep(Duration::from_millis(700)).await;
    let status = harness.handle.status().await.unwrap();
    assert_eq!(status.visible.len(), 1);
    assert!(status.visible[0].flags.pinned);

    harness.handle.interact(id, Interaction::TogglePin).await.unwrap();
    wait_for(&harness.handle, |s| s.visible.is_empty()).await;
}

#[tokio::test]
async fn test_queue_is_served_after_dismiss() {
    let harness = start(|c| c.notifications.max_notifications = 1, None);
    appear(&harness, 1, "/opt/a").await;
    appear(&harness, 2, "/opt/b").await;
    let status = wait_for(&harness.handle, |s| s.visible.len() == 1 && s.queued == 1).await;
    let first = status.visible[0].clone();

    harness.handle.interact(first.id, Interaction::Dismiss).await.unwrap();
    let status = wait_for(&harness.handle, |s| s.queued == 0 && s.visible.len() == 1).await;
    assert_ne!(status.visible[0].id, first.id);
}

#[tokio::test]
async fn test_toggle_block_updates_rules_and_visible_record() {
    let harness = start(|_| {}, None);
    appear(&harness, 1, "/opt/tool/run").await;
    let status = wait_for(&harness.handle, |s| s.visible.len() == 1).await;
    let id = status.visible[0].id;
    let version_before = status.rule_version;

    harness.handle.interact(id, Interaction::ToggleBlock).await.unwrap();
    let status = wait_for(&harness.handle, |s| s.visible.first().map_or(false, |r| r.blocked)).await;
    assert!(status.rule_version > version_before);

    let block_file = std::fs::read_to_string(harness.dir.path().join("block_list.txt")).unwrap();
    assert!(block_file.lines().any(|line| line == "/opt/tool/run"));
}

#[tokio::test]
async fn test_custom_icon_mapping_is_used() {
    let harness = start(|_| {}, None);
    let icons = harness.dir.path().join("icons");
    std::fs::create_dir_all(&icons).unwrap();
    std::fs::write(icons.join("term.svg"), b"<svg/>").unwrap();
    harness
        .handle
        .send(ControlEvent::IconMappingsReloaded(Arc::new(CustomIconMap::parse("xterm,term\n"))))
        .await
        .unwrap();

    appear(&harness, 1, "/usr/bin/xterm").await;
    let status = wait_for(&harness.handle, |s| s.visible.len() == 1).await;
    let icon = status.visible[0].icon.as_ref().unwrap();
    assert_eq!(icon.source, IconSource::Custom { icon_name: "term".into() });
}

#[tokio::test]
async fn test_expanded_view_toggle_applies_to_visible_records() {
    let harness = start(|_| {}, None);
    appear(&harness, 1, "/opt/tool/run").await;
    wait_for(&harness.handle, |s| s.visible.len() == 1).await;

    harness.handle.send(ControlEvent::SetExpandedView(true)).await.unwrap();
    let status = wait_for(&harness.handle, |s| s.expanded_view).await;
    let record = &status.visible[0];
    assert!(record.expanded);
    assert_eq!(record.geometry.x, 1920 - record.geometry.full_width - 4);
}

#[tokio::test]
async fn test_shutdown_withdraws_everything() {
    let harness = start(|_| {}, None);
    appear(&harness, 1, "/opt/tool/run").await;
    let status = wait_for(&harness.handle, |s| s.visible.len() == 1).await;
    let id = status.visible[0].id;

    harness.handle.shutdown().await.unwrap();
    harness.task.await.unwrap();
    let log = harness.view.0.lock();
    assert!(log.rendered.contains(&id));
    assert_eq!(log.removed, vec![id]);
}
