use assert_cmd::Command;
use predicates::prelude::*;

fn bin() -> Command {
    Command::cargo_bin("mapseq-barcodes").unwrap()
}

fn sorted_lines(path: &std::path::Path) -> Vec<String> {
    let mut lines: Vec<String> = std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect();
    lines.sort();
    lines
}

#[test]
fn test_simulate_then_run() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in");
    let output = dir.path().join("out");
    std::fs::create_dir(&input).unwrap();
    let truth = dir.path().join("truth.txt");

    bin()
        .arg("simulate")
        .arg("-o")
        .arg(input.join("sample.fastq.gz"))
        .arg("--truth")
        .arg(&truth)
        .args(["--molecules", "20", "--reads-per-molecule", "5"])
        .assert()
        .success();

    bin().arg("run").arg(&input).arg("-o").arg(&output).assert().success();

    assert!(output.join("sample_barcodes.txt").exists());
    assert_eq!(sorted_lines(&output.join("true_barcodes.txt")), sorted_lines(&truth));

    let report = std::fs::read_to_string(output.join("read_counts.csv")).unwrap();
    assert!(report.contains("Accepted,100"));
    assert!(report.contains("Total Reads,100"));

    bin()
        .arg("stats")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Number of unique barcodes: 20"))
        .stdout(predicate::str::contains("All barcodes have the correct length and format."));
}

#[test]
fn test_dedup_command() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a_barcodes.txt");
    let b = dir.path().join("b_barcodes.txt");
    let out = dir.path().join("canonical.txt");
    std::fs::write(&a, "AAAA\nAAAA\nAAAT\nTTTT\n").unwrap();
    std::fs::write(&b, "AAAA\nTTTT\nTTTA\n").unwrap();

    bin()
        .arg("dedup")
        .arg(&a)
        .arg(&b)
        .arg("-o")
        .arg(&out)
        .args(["--window-len", "4"])
        .assert()
        .success();

    assert_eq!(std::fs::read_to_string(&out).unwrap(), "AAAA\nTTTT\n");
}

#[test]
fn test_missing_input_dir_fails() {
    let dir = tempfile::tempdir().unwrap();
    bin()
        .arg("run")
        .arg(dir.path().join("does-not-exist"))
        .arg("-o")
        .arg(dir.path().join("out"))
        .assert()
        .failure();
}

#[test]
fn test_negative_distance_rejected_before_work() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out");

    bin()
        .arg("run")
        .arg(dir.path())
        .arg("-o")
        .arg(&output)
        .arg("--max-distance=-1")
        .assert()
        .failure()
        .stderr(predicate::str::contains("must not be negative"));

    assert!(!output.exists());
}

#[test]
fn test_config_file_is_read() {
    let dir = tempfile::tempdir().unwrap();
    let settings = dir.path().join("settings.toml");
    std::fs::write(&settings, "window_len = 0\n").unwrap();

    bin()
        .arg("run")
        .arg(dir.path())
        .arg("-o")
        .arg(dir.path().join("out"))
        .arg("--config")
        .arg(&settings)
        .assert()
        .failure()
        .stderr(predicate::str::contains("window_len must be positive"));
}

#[test]
fn test_dedup_rejects_wrong_length_barcodes() {
    let dir = tempfile::tempdir().unwrap();
    let list = dir.path().join("a_barcodes.txt");
    let out = dir.path().join("canonical.txt");
    std::fs::write(&list, "AAAA\nTTTT\n").unwrap();

    bin()
        .arg("dedup")
        .arg(&list)
        .arg("-o")
        .arg(&out)
        .args(["--window-len", "5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected 5"));

    assert!(!out.exists());
}

#[test]
fn test_run_keeps_readable_files() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in");
    let output = dir.path().join("out");
    std::fs::create_dir(&input).unwrap();

    bin()
        .arg("simulate")
        .arg("-o")
        .arg(input.join("good.fastq"))
        .args(["--molecules", "5", "--reads-per-molecule", "2"])
        .assert()
        .success();
    std::fs::write(input.join("broken.fastq"), "ACGT\nACGT\n").unwrap();

    bin().arg("run").arg(&input).arg("-o").arg(&output).assert().success();

    assert!(output.join("good_barcodes.txt").exists());
    assert!(!output.join("broken_barcodes.txt").exists());
    assert_eq!(sorted_lines(&output.join("true_barcodes.txt")).len(), 5);

    let report = std::fs::read_to_string(output.join("read_counts.csv")).unwrap();
    assert!(report.contains("Accepted,10"));
    assert!(report.contains("Failed Files,1"));
}
