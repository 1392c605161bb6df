use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn cmd() -> Command {
    Command::cargo_bin("pdf-autocrop").unwrap()
}

/// Scratch directory holding a stand-in input file. Dry runs never parse it.
fn workspace() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("book.pdf"), b"%PDF-1.5\n").unwrap();
    dir
}

#[test]
fn help_flag_lists_options() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--crop-header"))
        .stdout(predicate::str::contains("--crop-outlier"))
        .stdout(predicate::str::contains("--margin-inner"))
        .stdout(predicate::str::contains("--dry-run"));
}

#[test]
fn version_flag() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn missing_input_is_usage_error() {
    cmd().assert().code(2);
}

#[test]
fn invalid_number_is_usage_error() {
    cmd()
        .args(["--resolution", "sharp", "book.pdf"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--resolution"));
}

#[test]
fn nonexistent_input_exits_3() {
    let dir = tempfile::tempdir().unwrap();
    cmd()
        .current_dir(dir.path())
        .arg("missing.pdf")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn unparseable_input_exits_4_without_output() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("broken.pdf"), b"this is not a pdf").unwrap();

    cmd()
        .current_dir(dir.path())
        .args(["broken.pdf", "-q"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("broken.pdf"));

    assert!(!dir.path().join("broken-cropped.pdf").exists());
}

#[test]
fn dry_run_prints_plan() {
    let dir = workspace();
    cmd()
        .current_dir(dir.path())
        .args(["book.pdf", "--dry-run", "--crop-header", "-m", "8"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry Run"))
        .stdout(predicate::str::contains("book-cropped.pdf"))
        .stdout(predicate::str::contains("Header Removal: up to 30 pt"))
        .stdout(predicate::str::contains("Footer Removal: DISABLED"))
        .stdout(predicate::str::contains("top 8, bottom 8, left 8, right 8"));

    assert!(!dir.path().join("book-cropped.pdf").exists());
}

#[test]
fn dry_run_accepts_legacy_outlier_flag() {
    let dir = workspace();
    cmd()
        .current_dir(dir.path())
        .args(["-i", "book.pdf", "-co", "-o", "out.pdf", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Output: out.pdf"))
        .stdout(predicate::str::contains("Outlier Clamping: ENABLED"));
}

#[test]
fn config_file_values_used_and_overridden() {
    let dir = workspace();
    std::fs::write(
        dir.path().join("settings.toml"),
        "crop_footer_pt = 20.0\nresolution_dpi = 150.0\n",
    )
    .unwrap();

    cmd()
        .current_dir(dir.path())
        .args(["book.pdf", "-c", "settings.toml", "-r", "300", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Footer Removal: up to 20 pt"))
        .stdout(predicate::str::contains("DPI: 300"));
}

#[test]
fn local_config_file_is_found() {
    let dir = workspace();
    std::fs::write(dir.path().join("autocrop.toml"), "crop_outlier = true\n").unwrap();

    cmd()
        .current_dir(dir.path())
        .args(["book.pdf", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Outlier Clamping: ENABLED"));
}

#[test]
fn dry_run_accepts_legacy_band_flags() {
    let dir = workspace();
    cmd()
        .current_dir(dir.path())
        .args(["-ch", "-cf", "12", "book.pdf", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Header Removal: up to 30 pt"))
        .stdout(predicate::str::contains("Footer Removal: up to 12 pt"));
}

#[test]
fn bare_header_flag_before_input() {
    let dir = workspace();
    cmd()
        .current_dir(dir.path())
        .args(["--crop-header", "book.pdf", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Header Removal: up to 30 pt"));
}
