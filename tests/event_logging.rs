#![allow(clippy::unwrap_used)]

use std::sync::{Arc, Mutex as StdMutex};

use serde_json::Value;
use tracing::subscriber::{self, DefaultGuard};
use tracing_subscriber::{fmt, EnvFilter};

use folio_lib::{
    AppState, Config, CrudController, ProjectRecord, Source, StoreHandle, ThemeCoordinator,
    ViewState,
};

struct BufferWriter(Arc<StdMutex<Vec<u8>>>);

impl std::io::Write for BufferWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn init_buffer_subscriber() -> (Arc<StdMutex<Vec<u8>>>, DefaultGuard) {
    let buffer: Arc<StdMutex<Vec<u8>>> = Arc::new(StdMutex::new(Vec::new()));
    let writer = buffer.clone();
    let subscriber = fmt()
        .with_env_filter(EnvFilter::new("folio=debug"))
        .with_writer(move || BufferWriter(writer.clone()))
        .json()
        .finish();
    let guard = subscriber::set_default(subscriber);
    (buffer, guard)
}

fn events(buffer: &Arc<StdMutex<Vec<u8>>>) -> Vec<Value> {
    let raw = String::from_utf8(buffer.lock().unwrap().clone()).expect("log utf8");
    raw.lines()
        .map(|line| serde_json::from_str(line).expect("json log line"))
        .collect()
}

fn find<'a>(events: &'a [Value], name: &str) -> Option<&'a Value> {
    events
        .iter()
        .find(|event| event["fields"]["event"] == name)
}

#[test]
fn submit_logs_save_and_action() {
    let (buffer, _guard) = init_buffer_subscriber();
    let (mut controller, _) = CrudController::open(StoreHandle::in_memory());
    controller.submit(ProjectRecord::titled("Logged")).unwrap();

    let events = events(&buffer);
    let saved = find(&events, "projects_saved").expect("projects_saved event");
    assert_eq!(saved["level"], "INFO");
    assert_eq!(saved["target"], "folio");
    assert_eq!(saved["fields"]["count"], 1);

    let submitted = find(&events, "project_submitted").expect("project_submitted event");
    assert_eq!(submitted["fields"]["action"], "Created");
    assert_eq!(submitted["fields"]["saved"], true);
}

#[test]
fn quota_failure_is_logged_as_warning() {
    let (buffer, _guard) = init_buffer_subscriber();
    let slots = StoreHandle::in_memory_with_quota(8);
    let (mut controller, _) = CrudController::open(slots);
    let outcome = controller.submit(ProjectRecord::titled("Too large to fit")).unwrap();
    assert!(outcome.notice.is_error());

    let events = events(&buffer);
    let failed = find(&events, "projects_save_failed").expect("projects_save_failed event");
    assert_eq!(failed["level"], "WARN");
    assert!(failed["fields"]["error"].as_str().unwrap().contains("quota"));
    assert!(find(&events, "projects_saved").is_none());
}

#[test]
fn theme_toggle_logs_applied_theme() {
    let (buffer, _guard) = init_buffer_subscriber();
    let mut theme = ThemeCoordinator::new(StoreHandle::in_memory());
    theme.init();
    theme.toggle();

    let events = events(&buffer);
    let applied: Vec<_> = events
        .iter()
        .filter(|event| event["fields"]["event"] == "theme_applied")
        .collect();
    assert_eq!(applied.last().unwrap()["fields"]["theme"], "light");
}

#[test]
fn gallery_page_logs_failed_load() {
    let (buffer, _guard) = init_buffer_subscriber();
    let state = AppState::with_slots(Config::default(), StoreHandle::in_memory(), "unused".into());
    let page = state.gallery_page().unwrap();
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
        .block_on(page.load(Source::Local));

    assert!(matches!(page.gallery().state(), ViewState::Failed(_)));
    let events = events(&buffer);
    let failed = find(&events, "gallery_load_failed").expect("gallery_load_failed event");
    assert_eq!(failed["level"], "WARN");
    assert_eq!(failed["fields"]["source"], "Local");
}
