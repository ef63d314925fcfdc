use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

fn bankxl() -> Command {
    Command::cargo_bin("bankxl").unwrap()
}

/// Config pointing every external tool at a path that does not exist.
fn write_missing_tools_config(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("config.json");
    fs::write(
        &path,
        r#"{
            "tools": {
                "java": "/nonexistent/bin/java",
                "ocrmypdf": "/nonexistent/bin/ocrmypdf",
                "qpdf": "/nonexistent/bin/qpdf"
            }
        }"#,
    )
    .unwrap();
    path
}

#[test]
fn test_inspect_crdb_dar() {
    bankxl()
        .args(["inspect", "2016-08 Dar CRDB TAS.pdf"])
        .assert()
        .success()
        .stdout(predicate::str::contains("CRDB"))
        .stdout(predicate::str::contains("Dar"))
        .stdout(predicate::str::contains("2016"))
        .stdout(predicate::str::contains("whole page, lattice off, stream off"));
}

#[test]
fn test_inspect_nbc_json() {
    bankxl()
        .args(["inspect", "--json", "2022-04 Mbeya NBC Statement.pdf"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"requires_ocr\": true"))
        .stdout(predicate::str::contains("\"repair_dates\": true"))
        .stdout(predicate::str::contains("840.525"));
}

#[test]
fn test_inspect_reports_missing_year() {
    bankxl()
        .args(["inspect", "notes.pdf"])
        .assert()
        .success()
        .stdout(predicate::str::contains("notes.pdf"))
        .stdout(predicate::str::contains("no leading 4-digit year"));
}

#[test]
fn test_batch_skips_unparseable_names() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_missing_tools_config(dir.path());
    let batch = dir.path().join("batch");
    fs::create_dir(&batch).unwrap();
    fs::write(batch.join("notes.pdf"), b"%PDF-1.5").unwrap();

    bankxl()
        .arg("-c")
        .arg(&config)
        .arg("batch")
        .arg(&batch)
        .assert()
        .success()
        .stdout(predicate::str::contains("0 processed, 0 failed, 1 skipped"));

    assert!(batch.join("notes.pdf").exists());
    assert!(!batch.join("failed").exists());
}

#[test]
fn test_batch_tool_failure_moves_to_failed() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_missing_tools_config(dir.path());
    let batch = dir.path().join("batch");
    fs::create_dir(&batch).unwrap();
    fs::write(batch.join("2016-08 Dar CRDB TAS.pdf"), b"%PDF-1.5").unwrap();
    fs::write(batch.join("readme.txt"), b"not a statement").unwrap();
    let summary = dir.path().join("summary.csv");

    bankxl()
        .arg("-c")
        .arg(&config)
        .arg("batch")
        .arg(&batch)
        .arg("--summary")
        .arg(&summary)
        .assert()
        .success()
        .stdout(predicate::str::contains("0 processed, 1 failed, 0 skipped"));

    let failed = batch.join("failed");
    assert!(failed.join("2016-08 Dar CRDB TAS.pdf").exists());
    let output = failed.join("2016-08 Dar CRDB TAS.xlsx");
    assert_eq!(fs::metadata(&output).unwrap().len(), 0);
    assert!(batch.join("readme.txt").exists());

    let report = fs::read_to_string(&summary).unwrap();
    let mut lines = report.lines();
    assert_eq!(
        lines.next(),
        Some("filename,outcome,bank,office,year,ocr_attempted,tables,rows,output_bytes,error")
    );
    let row = lines.next().unwrap();
    assert!(row.starts_with("2016-08 Dar CRDB TAS.pdf,failed,CRDB,Dar,2016,false,0,0,0,"));
}

#[test]
fn test_batch_relocation_failure_exits_non_zero() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_missing_tools_config(dir.path());
    let batch = dir.path().join("batch");
    fs::create_dir(&batch).unwrap();
    // A plain file where the failed directory should go blocks every move.
    fs::write(batch.join("failed"), b"").unwrap();
    let names = ["2016-08 Dar CRDB TAS.pdf", "2019-01 Musoma CRDB.pdf"];
    for name in names {
        fs::write(batch.join(name), b"%PDF-1.5").unwrap();
    }

    bankxl()
        .arg("-c")
        .arg(&config)
        .arg("batch")
        .arg(&batch)
        .assert()
        .failure()
        .stdout(predicate::str::contains("Handled 2 statements"))
        .stdout(predicate::str::contains("0 processed, 0 failed, 2 skipped"))
        .stderr(predicate::str::contains("2 statements could not be written or moved"));

    for name in names {
        assert!(batch.join(name).exists());
        assert!(batch.join(name).with_extension("xlsx").exists());
    }
    assert!(batch.join("failed").is_file());
}

#[test]
fn test_batch_empty_directory() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_missing_tools_config(dir.path());

    bankxl()
        .arg("-c")
        .arg(&config)
        .arg("batch")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No *.pdf files"));
}

#[test]
fn test_batch_rejects_missing_directory() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_missing_tools_config(dir.path());

    bankxl()
        .arg("-c")
        .arg(&config)
        .arg("batch")
        .arg(dir.path().join("missing"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not a directory"));
}

#[test]
fn test_process_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_missing_tools_config(dir.path());

    bankxl()
        .arg("-c")
        .arg(&config)
        .arg("process")
        .arg(dir.path().join("2016-08 Dar CRDB TAS.pdf"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn test_process_json_report() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_missing_tools_config(dir.path());
    let input = dir.path().join("2019-01 Musoma CRDB.pdf");
    fs::write(&input, b"%PDF-1.5").unwrap();

    bankxl()
        .arg("-c")
        .arg(&config)
        .args(["process", "--format", "json"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"outcome\": \"failed\""))
        .stdout(predicate::str::contains("\"office\": \"Musoma\""));

    assert!(dir.path().join("failed/2019-01 Musoma CRDB.xlsx").exists());
}

#[test]
fn test_config_init_get_set() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("conf").join("bankxl.json");

    bankxl()
        .arg("-c")
        .arg(&config)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("not created"));

    bankxl()
        .arg("-c")
        .arg(&config)
        .args(["config", "init"])
        .assert()
        .success();
    assert!(config.exists());

    bankxl()
        .arg("-c")
        .arg(&config)
        .args(["config", "get", "output.min_processed_bytes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("5500"));

    bankxl()
        .arg("-c")
        .arg(&config)
        .args(["config", "set", "output.min_processed_bytes", "6000"])
        .assert()
        .success();

    bankxl()
        .arg("-c")
        .arg(&config)
        .args(["config", "get", "output.min_processed_bytes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("6000"));

    bankxl()
        .arg("-c")
        .arg(&config)
        .args(["config", "set", "output.no_such_key", "1"])
        .assert()
        .failure();
}

#[test]
fn test_config_init_refuses_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.json");
    fs::write(&config, "{}").unwrap();

    bankxl()
        .arg("-c")
        .arg(&config)
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
}
