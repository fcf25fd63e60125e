//! CLI subprocess integration tests.
//!
//! These tests invoke the `tagforge` binary inside a scratch project
//! directory and verify exit codes, stdout content, and JSON output.

use std::path::Path;
use std::process::Command;

fn tagforge_bin(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_tagforge"));
    cmd.current_dir(dir);
    cmd.env_remove("TAGFORGE_LOG");
    cmd
}

fn write(path: &Path, content: &str) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn test_project() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    write(
        &dir.path().join("resources/amiibo.json"),
        r#"[{"head": "04", "tail": "A", "name": "X", "image": "foo.png"}]"#,
    );
    write(
        &dir.path().join("resources/skylanders.json"),
        r#"[{"name": "Spyro", "figureId": 1, "variant": 0}]"#,
    );
    dir
}

#[test]
fn cli_version_exits_zero() {
    let dir = tempfile::tempdir().unwrap();
    let output = tagforge_bin(dir.path()).arg("--version").output().unwrap();
    assert!(output.status.success(), "tagforge --version must exit 0");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("tagforge"), "version output: {stdout}");
}

#[test]
fn cli_help_lists_build() {
    let dir = tempfile::tempdir().unwrap();
    let output = tagforge_bin(dir.path()).arg("--help").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("build"), "help must list 'build': {stdout}");
}

#[test]
fn cli_without_arguments_builds() {
    let project = test_project();
    let output = tagforge_bin(project.path()).output().unwrap();
    assert!(
        output.status.success(),
        "bare tagforge must build. stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(project.path().join("dist/tags.json").is_file());
    assert!(project.path().join("dist/tags.lite.json").is_file());
    assert!(project.path().join("dist/lastupdated.json").is_file());
}

#[test]
fn cli_build_json_reports_digests() {
    let project = test_project();
    let output = tagforge_bin(project.path())
        .args(["build", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["amiibo_records"], 1);
    assert_eq!(report["skylander_records"], 1);
    let full = report["full"]["digest"].as_str().unwrap();
    assert_eq!(full.len(), 64);
    assert_eq!(report["manifest"]["full"], full);
    assert!(project
        .path()
        .join(format!("dist/tags.{full}.json"))
        .is_file());
}

#[test]
fn cli_json_output_is_stable_across_runs() {
    let project = test_project();
    let digests = |out: &std::process::Output| {
        let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
        (v["full"]["digest"].clone(), v["lite"]["digest"].clone())
    };
    let first = tagforge_bin(project.path()).arg("--json").output().unwrap();
    let second = tagforge_bin(project.path()).arg("--json").output().unwrap();
    assert_eq!(digests(&first), digests(&second));
}

#[test]
fn cli_duplicate_record_exits_with_input_error() {
    let project = test_project();
    write(
        &project.path().join("resources/patches/dup.json"),
        r#"[{"head": "04", "tail": "A"}]"#,
    );
    let output = tagforge_bin(project.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("duplicate"), "stderr: {stderr}");
    assert!(stderr.contains("dup.json"), "stderr: {stderr}");
}

#[test]
fn cli_missing_base_exits_with_input_error() {
    let dir = tempfile::tempdir().unwrap();
    let output = tagforge_bin(dir.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("amiibo.json"), "stderr: {stderr}");
}

#[test]
fn cli_invalid_config_exits_with_input_error() {
    let project = test_project();
    write(&project.path().join("tagforge.toml"), "unknown_key = 1\n");
    let output = tagforge_bin(project.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn cli_explicit_config_path_is_used() {
    let project = test_project();
    let config = project.path().join("conf/custom.toml");
    write(
        &config,
        "resources_dir = \"../resources\"\ndist_dir = \"../public\"\n",
    );
    let output = tagforge_bin(project.path())
        .args(["--config", &config.to_string_lossy()])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(project.path().join("public/tags.json").is_file());
}

#[test]
fn cli_strict_assets_flag_fails_on_collision() {
    let project = test_project();
    write(&project.path().join("resources/images/foo.png"), "base");
    write(
        &project.path().join("resources/patches/p/images/foo.png"),
        "patch",
    );

    let lenient = tagforge_bin(project.path()).output().unwrap();
    assert!(lenient.status.success());

    let strict = tagforge_bin(project.path())
        .args(["build", "--strict-assets"])
        .output()
        .unwrap();
    assert_eq!(strict.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&strict.stderr);
    assert!(stderr.contains("foo.png"), "stderr: {stderr}");
}

#[cfg(unix)]
#[test]
fn cli_unreadable_image_tree_exits_with_input_error() {
    let project = test_project();
    let images = project.path().join("resources/images");
    write(&images.join("foo.png"), "base");
    std::os::unix::fs::symlink(&images, images.join("loop")).unwrap();

    let output = tagforge_bin(project.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("cannot read input tree"), "stderr: {stderr}");
}
