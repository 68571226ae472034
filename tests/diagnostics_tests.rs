use log::{Level, LevelFilter, Log, Metadata, Record};
use rasp_diag::fs::ensure_dir;
use rasp_diag::utils::DirError;
use std::fs::File;
use std::sync::Mutex;

/// Logger that keeps every record so tests can inspect what was reported
struct CapturingLogger;

static RECORDS: Mutex<Vec<(Level, String, String)>> = Mutex::new(Vec::new());
static LOGGER: CapturingLogger = CapturingLogger;

impl Log for CapturingLogger {
    fn enabled(&self, _metadata: &Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &Record<'_>) {
        RECORDS.lock().unwrap().push((
            record.level(),
            record.target().to_string(),
            record.args().to_string(),
        ));
    }

    fn flush(&self) {}
}

fn install_logger() {
    // Only the first call in this binary succeeds; later ones keep that logger
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(LevelFilter::Debug);
}

/// Warnings on the `rasp` target that mention `needle`
fn warnings_about(needle: &str) -> Vec<String> {
    RECORDS
        .lock()
        .unwrap()
        .iter()
        .filter(|(level, target, message)| {
            *level == Level::Warn && target == "rasp" && message.contains(needle)
        })
        .map(|(_, _, message)| message.clone())
        .collect()
}

#[test]
fn test_blocked_directory_reports_path_and_os_error() {
    install_logger();
    let temp_dir = tempfile::tempdir().unwrap();
    let blocker = temp_dir.path().join("blocker");
    File::create(&blocker).unwrap();

    let result = ensure_dir(blocker.join("logs"), 0o755);
    assert!(result.is_err());

    let prefix = format!("[RASP] 20001 Could not create directory '{}': ", blocker.display());
    let reported = warnings_about(&prefix);
    assert_eq!(reported.len(), 1, "records: {:?}", RECORDS.lock().unwrap());
    assert!(reported[0].starts_with(&prefix));
    assert!(reported[0].contains("os error"));
}

#[cfg(unix)]
#[test]
fn test_creation_failure_reports_path_and_os_error() {
    install_logger();
    let temp_dir = tempfile::tempdir().unwrap();
    // Longer than any filesystem's name limit, so this fails even as root
    let too_long = temp_dir.path().join("n".repeat(300));

    let result = ensure_dir(&too_long, 0o755);
    assert!(matches!(result, Err(DirError::Create { .. })));

    let prefix = format!("[RASP] 20001 Could not create directory '{}': ", too_long.display());
    let reported = warnings_about(&prefix);
    assert_eq!(reported.len(), 1);
    assert!(reported[0].contains("os error"));
}

#[test]
fn test_successful_creation_reports_nothing() {
    install_logger();
    let temp_dir = tempfile::tempdir().unwrap();
    let dir = temp_dir.path().join("clean/run");

    ensure_dir(&dir, 0o755).unwrap();

    assert!(warnings_about(&temp_dir.path().display().to_string()).is_empty());
}
