use std::process::Command;
use tempfile::TempDir;

fn gatherer() -> Command {
    Command::new(env!("CARGO_BIN_EXE_info-gatherer"))
}

#[test]
fn test_failed_run_exits_non_zero() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("not-a-directory");
    std::fs::write(&blocker, "").unwrap();

    let config = serde_json::json!({
        "output": {
            "report_path": blocker.join("fpga_documents.json"),
            "snapshot_dir": dir.path(),
        },
        "sources": [],
    });
    let config_path = dir.path().join("config.json");
    std::fs::write(&config_path, config.to_string()).unwrap();

    let output = gatherer()
        .arg("--config")
        .arg(&config_path)
        .arg("--no-notify")
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(!blocker.join("fpga_documents.json").exists());
}

#[test]
fn test_missing_config_file_exits_non_zero() {
    let dir = TempDir::new().unwrap();

    let status = gatherer()
        .arg("--config")
        .arg(dir.path().join("absent.json"))
        .status()
        .unwrap();

    assert!(!status.success());
}
