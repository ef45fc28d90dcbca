use crate::utils::logging::{set_log_file, LogWriter};
use std::fs;
use std::io::Write;

/// Tests that each scenario can get its own log file:
/// - lines written before the switch stay in the first file
/// - lines written after the switch land in the second file only
#[test]
fn test_log_file_can_be_switched() {
    let dir = std::env::temp_dir().join(format!("flowstats-logging-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    let first = dir.join("first.log");
    let second = dir.join("second.log");

    set_log_file(&first).expect("Failed to create first log file");
    writeln!(LogWriter, "first scenario").unwrap();
    LogWriter.flush().unwrap();

    set_log_file(&second).expect("Failed to create second log file");
    writeln!(LogWriter, "second scenario").unwrap();
    LogWriter.flush().unwrap();

    let first_contents = fs::read_to_string(&first).unwrap();
    let second_contents = fs::read_to_string(&second).unwrap();
    assert!(first_contents.contains("first scenario"));
    assert!(!first_contents.contains("second scenario"));
    assert!(second_contents.contains("second scenario"));
    assert!(!second_contents.contains("first scenario"));

    fs::remove_dir_all(&dir).unwrap();
}
