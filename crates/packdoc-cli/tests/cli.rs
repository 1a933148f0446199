use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const INVOICE_CSV: &str = "PO/NO.,ITEM NO.,DESCRIPTION OF GOODS,QTY,UNIT VALUE (USD)\n\
                           PO001,1015,Widget,10,$5.00\n\
                           PO002,100,Gadget,20,$3.00\n\
                           PO003,2,Gizmo,5,$10.00\n";

fn packdoc(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("packdoc").unwrap();
    cmd.arg("-c").arg(dir.path().join("config.json"));
    cmd
}

fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

fn entries(archive: &Path) -> Vec<(String, String)> {
    let mut zip = zip::ZipArchive::new(fs::File::open(archive).unwrap()).unwrap();
    (0..zip.len())
        .map(|i| {
            let mut file = zip.by_index(i).unwrap();
            let mut text = String::new();
            file.read_to_string(&mut text).unwrap();
            (file.name().to_string(), text)
        })
        .collect()
}

#[test]
fn process_writes_archive() {
    let dir = TempDir::new().unwrap();
    let csv = write(&dir, "invoice.csv", INVOICE_CSV);
    let out = dir.path().join("out");

    packdoc(&dir)
        .arg("process")
        .arg(&csv)
        .args(["--date", "250115", "-w", "12", "-b", "3", "--rmb", "40", "--rate", "7.2"])
        .args(["-t", "1Z999AA12345678901"])
        .arg("-o")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("packing-files-250115.zip"))
        .stdout(predicate::str::contains("total qty 35"));

    let entries = entries(&out.join("packing-files-250115.zip"));
    let names: Vec<_> = entries.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(
        names,
        vec!["packing-list-250115.csv", "packing-list-250115.html", "import_inv-250115.csv"]
    );

    let (_, packing_list) = &entries[0];
    assert!(packing_list.contains("UPS FREIGHT: 12.0 KG * 40 RMB / 7.20 RATE = $66.67"));
    assert!(packing_list.contains("UPS TRACKING#: 1Z999AA12345678901"));

    let (_, import) = &entries[2];
    assert_eq!(
        import,
        "PO#,ITEM#,CASE_QTY,FOB\r\nPO002,100,20,3.00\r\nPO001,1015,10,5.00\r\nPO003,2,5,10.00\r\n"
    );
}

#[test]
fn process_reads_tracking_from_text_label() {
    let dir = TempDir::new().unwrap();
    let csv = write(&dir, "invoice.csv", INVOICE_CSV);
    let label = write(&dir, "label.txt", "Tracking: 1Z999BB98765432109 thanks");

    packdoc(&dir)
        .arg("process")
        .arg(&csv)
        .args(["--date", "250115", "--tracking-image"])
        .arg(&label)
        .arg("-o")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Tracking: 1Z999BB98765432109"));
}

#[test]
fn process_only_selected_artifacts() {
    let dir = TempDir::new().unwrap();
    let csv = write(&dir, "invoice.csv", INVOICE_CSV);

    packdoc(&dir)
        .arg("process")
        .arg(&csv)
        .args(["--date", "250115", "--only", "msdos,csv", "-o"])
        .arg(dir.path())
        .assert()
        .success();

    let names: Vec<_> = entries(&dir.path().join("packing-files-250115.zip"))
        .into_iter()
        .map(|(name, _)| name)
        .collect();
    assert_eq!(names, vec!["packing-list-250115.csv", "import_inv-250115.csv"]);
}

#[test]
fn process_reports_empty_csv() {
    let dir = TempDir::new().unwrap();
    let csv = write(&dir, "empty.csv", "");

    packdoc(&dir)
        .arg("process")
        .arg(&csv)
        .args(["--date", "250115", "-o"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("CSV file is required"));

    assert!(!dir.path().join("packing-files-250115.zip").exists());
}

#[test]
fn process_reports_missing_columns() {
    let dir = TempDir::new().unwrap();
    let csv = write(&dir, "bad.csv", "foo,bar\n1,2\n");

    packdoc(&dir)
        .arg("process")
        .arg(&csv)
        .args(["--date", "250115", "-o"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("CSV file appears to be empty or has invalid format"))
        .stderr(predicate::str::contains("UNIT VALUE (USD)"));
}

#[test]
fn process_rejects_bad_date() {
    let dir = TempDir::new().unwrap();
    let csv = write(&dir, "invoice.csv", INVOICE_CSV);

    packdoc(&dir)
        .arg("process")
        .arg(&csv)
        .args(["--date", "2025-01-15"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid date stamp"));
}

#[test]
fn tracking_from_label() {
    let dir = TempDir::new().unwrap();
    let label = write(&dir, "label.txt", "UPS label\n1z 999aa12345678901\n");

    packdoc(&dir)
        .arg("tracking")
        .arg(&label)
        .assert()
        .success()
        .stdout("1Z999AA12345678901\n");
}

#[test]
fn tracking_manual_wins() {
    let dir = TempDir::new().unwrap();
    let label = write(&dir, "label.txt", "1Z999BB98765432109");

    packdoc(&dir)
        .arg("tracking")
        .arg(&label)
        .args(["--manual", "1Z999AA1"])
        .assert()
        .success()
        .stdout("1Z999AA1\n");
}

#[test]
fn tracking_without_match_fails() {
    let dir = TempDir::new().unwrap();
    let label = write(&dir, "label.txt", "nothing to see");

    packdoc(&dir)
        .arg("tracking")
        .arg(&label)
        .assert()
        .failure()
        .stderr(predicate::str::contains("No tracking number found"));
}

#[test]
fn batch_with_summary() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in");
    fs::create_dir_all(&input).unwrap();
    fs::write(input.join("a.csv"), INVOICE_CSV).unwrap();
    fs::write(input.join("b.csv"), "").unwrap();
    let out = dir.path().join("out");

    packdoc(&dir)
        .arg("batch")
        .arg(format!("{}/*.csv", input.display()))
        .args(["--date", "250115", "--summary", "--continue-on-error", "-j", "2", "-o"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 successful, 1 failed"));

    assert!(out.join("a").join("packing-files-250115.zip").exists());

    let summary = fs::read_to_string(out.join("summary.csv")).unwrap();
    let mut lines = summary.lines();
    assert_eq!(
        lines.next(),
        Some("file,status,records,total_qty,warnings,archive,error")
    );
    assert!(lines.next().unwrap().starts_with("a.csv,success,3,35,0,"));
    assert!(lines.next().unwrap().starts_with("b.csv,error,"));
}

#[test]
fn batch_stops_on_first_error() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("bad.csv"), "foo\n1\n").unwrap();

    packdoc(&dir)
        .arg("batch")
        .arg(format!("{}/*.csv", dir.path().display()))
        .args(["--date", "250115", "-o"])
        .arg(dir.path().join("out"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Processing failed"));
}

#[test]
fn config_init_get_set() {
    let dir = TempDir::new().unwrap();

    packdoc(&dir).args(["config", "init"]).assert().success();
    assert!(dir.path().join("config.json").exists());

    packdoc(&dir)
        .args(["config", "get", "html.page_size"])
        .assert()
        .success()
        .stdout("72\n");

    packdoc(&dir)
        .args(["config", "set", "output.profile", "packing"])
        .assert()
        .success();

    packdoc(&dir)
        .args(["config", "get", "output.profile"])
        .assert()
        .success()
        .stdout("\"packing\"\n");

    packdoc(&dir)
        .args(["config", "set", "html.page_size", "\"many\""])
        .assert()
        .failure();

    packdoc(&dir)
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn config_drives_defaults() {
    let dir = TempDir::new().unwrap();
    packdoc(&dir).args(["config", "init"]).assert().success();
    packdoc(&dir).args(["config", "set", "shipment.exchange_rate", "8"]).assert().success();

    let csv = write(&dir, "invoice.csv", INVOICE_CSV);
    packdoc(&dir)
        .arg("process")
        .arg(&csv)
        .args(["--date", "250115", "-w", "10", "--only", "csv", "-o"])
        .arg(dir.path())
        .assert()
        .success();

    let entries = entries(&dir.path().join("packing-files-250115.zip"));
    assert!(entries[0].1.contains("UPS FREIGHT: 10.0 KG * 40 RMB / 8.00 RATE = $50.00"));
}

#[test]
fn verbose_logs_stay_off_stdout() {
    let dir = TempDir::new().unwrap();

    packdoc(&dir)
        .args(["-vv", "tracking", "--manual", "1Z999AA12345678901"])
        .assert()
        .success()
        .stdout("1Z999AA12345678901\n");
}

#[test]
fn help_lists_subcommands() {
    let dir = TempDir::new().unwrap();

    packdoc(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("process"))
        .stdout(predicate::str::contains("tracking"))
        .stdout(predicate::str::contains("Print the tracking number"));
}
