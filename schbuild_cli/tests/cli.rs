use assert_cmd::Command;
use predicates::prelude::*;
use schbuild_test_utils::{ScriptedConverter, TestProject, TestProjectBuilder};
use tempfile::TempDir;

/// `schbuild` with an isolated user config directory
fn schbuild(config_home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("schbuild").unwrap();
    cmd.env("XDG_CONFIG_HOME", config_home.path())
        .env_remove("SCHBUILD_BUILD__JOBS")
        .env_remove("SCHBUILD_OUTPUT__FORMAT");
    cmd
}

/// `schbuild` pointed at `project` and driving the scripted converter
#[cfg(unix)]
fn build_cmd(config_home: &TempDir, project: &TestProject, script: &ScriptedConverter) -> Command {
    let mut cmd = schbuild(config_home);
    cmd.arg("--dir")
        .arg(project.path())
        .arg("--converter")
        .arg("sh")
        .arg("--converter-arg")
        .arg(script.script());
    cmd
}

#[cfg(unix)]
fn dir_name(project: &TestProject) -> String {
    project
        .path()
        .file_name()
        .unwrap()
        .to_string_lossy()
        .into_owned()
}

#[test]
fn test_version() {
    let home = TempDir::new().unwrap();
    schbuild(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_completions() {
    let home = TempDir::new().unwrap();
    schbuild(&home)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("schbuild"));
}

#[cfg(unix)]
#[test]
fn test_png_runs_converter_once_per_source() {
    let home = TempDir::new().unwrap();
    let project = TestProjectBuilder::new()
        .with_source("a.sch")
        .with_source("b.sch")
        .build();
    let script = ScriptedConverter::install();

    build_cmd(&home, &project, &script)
        .arg("png")
        .assert()
        .success()
        .stdout(predicate::str::contains("png: 2 built"));

    let name = dir_name(&project);
    assert_eq!(
        script.calls(),
        vec![format!("{name} a.sch a.png"), format!("{name} b.sch b.png")]
    );
    assert_eq!(project.files_with_extension("png"), vec!["a.png", "b.png"]);
}

#[cfg(unix)]
#[test]
fn test_default_command_builds_png_only() {
    let home = TempDir::new().unwrap();
    let project = TestProjectBuilder::new().with_source("amp.sch").build();
    let script = ScriptedConverter::install();

    build_cmd(&home, &project, &script).assert().success();

    assert!(project.exists("amp.png"));
    assert!(!project.exists("amp.pdf"));
    assert!(!project.exists("amp.tex"));
}

#[cfg(unix)]
#[test]
fn test_second_run_converts_nothing() {
    let home = TempDir::new().unwrap();
    let project = TestProjectBuilder::new().with_source("a.sch").build();
    let script = ScriptedConverter::install();

    build_cmd(&home, &project, &script).arg("pdf").assert().success();
    script.clear();

    build_cmd(&home, &project, &script)
        .arg("pdf")
        .assert()
        .success()
        .stdout(predicate::str::contains("0 built, 1 up to date"));
    assert!(script.calls().is_empty());
}

#[cfg(unix)]
#[test]
fn test_failed_conversion_exits_with_build_failed_code() {
    let home = TempDir::new().unwrap();
    let project = TestProjectBuilder::new()
        .with_source("broken.sch")
        .with_source("good.sch")
        .build();
    let script = ScriptedConverter::install();

    build_cmd(&home, &project, &script)
        .arg("png")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("broken.sch (png)"))
        .stderr(predicate::str::contains("cannot parse broken.sch"))
        .stderr(predicate::str::contains("1 of 2 conversion(s) failed"));

    assert!(project.exists("good.png"));
    assert!(!project.exists("broken.png"));
    assert_eq!(script.calls().len(), 2);
}

#[cfg(unix)]
#[test]
fn test_clean_removes_outputs_and_exits_zero() {
    let home = TempDir::new().unwrap();
    let project = TestProjectBuilder::new()
        .with_source("a.sch")
        .with_source("b.sch")
        .build();
    let script = ScriptedConverter::install();

    build_cmd(&home, &project, &script).arg("png").assert().success();
    project.write("a.log", b"latex log");

    build_cmd(&home, &project, &script)
        .arg("clean")
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed 3 file(s)"));

    assert!(project.files_with_extension("png").is_empty());
    assert!(!project.exists("a.log"));
    assert!(project.exists("a.sch"));

    // Nothing left to remove is still a success
    build_cmd(&home, &project, &script)
        .arg("clean")
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed 0 file(s)"));
}

#[test]
fn test_clean_ignores_broken_configuration() {
    let home = TempDir::new().unwrap();
    let project = TestProjectBuilder::new()
        .with_source("a.sch")
        .with_file("a.png", b"png")
        .with_file("b.pdf", b"pdf")
        .with_file("schbuild.toml", b"[build]\njobs = \"many\"\n")
        .build();

    schbuild(&home)
        .arg("--dir")
        .arg(project.path())
        .arg("clean")
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed 2 file(s)"));
    assert!(!project.exists("a.png"));
    assert!(!project.exists("b.pdf"));

    project.write("b.pdf", b"pdf");
    schbuild(&home)
        .env("SCHBUILD_BUILD__JOBS", "lots")
        .arg("--dir")
        .arg(project.path())
        .arg("clean")
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed 1 file(s)"));
    assert!(!project.exists("b.pdf"));
    assert!(project.exists("a.sch"));

    // Building still refuses the broken file
    schbuild(&home)
        .arg("--dir")
        .arg(project.path())
        .arg("png")
        .assert()
        .code(2);
}

#[cfg(unix)]
#[test]
fn test_clean_then_all_rebuilds() {
    let home = TempDir::new().unwrap();
    let project = TestProjectBuilder::new()
        .with_source("a.sch")
        .with_source("b.sch")
        .build();
    let script = ScriptedConverter::install();

    build_cmd(&home, &project, &script).arg("all").assert().success();
    build_cmd(&home, &project, &script).arg("clean").assert().success();
    script.clear();

    build_cmd(&home, &project, &script).arg("all").assert().success();

    assert_eq!(script.calls().len(), 2);
    assert_eq!(project.files_with_extension("png"), vec!["a.png", "b.png"]);
}

#[cfg(unix)]
#[test]
fn test_dry_run_prints_commands_without_running_them() {
    let home = TempDir::new().unwrap();
    let project = TestProjectBuilder::new().with_source("amp.sch").build();
    let script = ScriptedConverter::install();

    build_cmd(&home, &project, &script)
        .args(["--dry-run", "tex"])
        .assert()
        .success()
        .stdout(predicate::str::contains("would run: sh"))
        .stdout(predicate::str::contains("amp.sch amp.tex"));

    assert!(script.calls().is_empty());
    assert!(!project.exists("amp.tex"));
}

#[cfg(unix)]
#[test]
fn test_force_rebuilds_current_outputs() {
    let home = TempDir::new().unwrap();
    let project = TestProjectBuilder::new().with_source("amp.sch").build();
    let script = ScriptedConverter::install();

    build_cmd(&home, &project, &script).arg("png").assert().success();
    script.clear();

    build_cmd(&home, &project, &script)
        .args(["-B", "png"])
        .assert()
        .success();
    assert_eq!(script.calls().len(), 1);
}

#[cfg(unix)]
#[test]
fn test_json_report() {
    let home = TempDir::new().unwrap();
    let project = TestProjectBuilder::new().with_source("amp.sch").build();
    let script = ScriptedConverter::install();

    let output = build_cmd(&home, &project, &script)
        .args(["--format", "json", "pdf"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["dry_run"], false);
    assert_eq!(report["groups"][0]["target"], "pdf");
    assert_eq!(report["groups"][0]["jobs"][0]["status"], "built");
}

#[cfg(unix)]
#[test]
fn test_project_config_selects_default_targets() {
    let home = TempDir::new().unwrap();
    let project = TestProjectBuilder::new()
        .with_source("amp.sch")
        .with_file(
            "schbuild.toml",
            b"[build]\ndefault_targets = [\"pdf\", \"png\"]\n",
        )
        .build();
    let script = ScriptedConverter::install();

    build_cmd(&home, &project, &script).assert().success();

    assert!(project.exists("amp.pdf"));
    assert!(project.exists("amp.png"));
    assert!(!project.exists("amp.tex"));
}

#[cfg(unix)]
#[test]
fn test_recursive_build_runs_in_each_source_directory() {
    let home = TempDir::new().unwrap();
    let project = TestProjectBuilder::new()
        .with_source("top.sch")
        .with_source("filters/lowpass.sch")
        .build();
    let script = ScriptedConverter::install();

    build_cmd(&home, &project, &script)
        .args(["--recursive", "png"])
        .assert()
        .success();

    let calls = script.calls();
    assert!(calls.contains(&"filters lowpass.sch lowpass.png".to_string()));
    assert!(project.exists("filters/lowpass.png"));
}

#[cfg(unix)]
#[test]
fn test_exclude_skips_matching_sources() {
    let home = TempDir::new().unwrap();
    let project = TestProjectBuilder::new()
        .with_source("amp.sch")
        .with_source("draft_amp.sch")
        .build();
    let script = ScriptedConverter::install();

    build_cmd(&home, &project, &script)
        .args(["--exclude", "draft_*", "png"])
        .assert()
        .success();

    assert!(project.exists("amp.png"));
    assert!(!project.exists("draft_amp.png"));
}

#[test]
fn test_empty_directory_succeeds() {
    let home = TempDir::new().unwrap();
    let project = TestProjectBuilder::new().build();

    schbuild(&home)
        .arg("--dir")
        .arg(project.path())
        .arg("png")
        .assert()
        .success()
        .stdout(predicate::str::contains("No sources found"));
}

#[test]
fn test_missing_directory_is_a_file_error() {
    let home = TempDir::new().unwrap();
    let project = TestProjectBuilder::new().build();

    schbuild(&home)
        .arg("--dir")
        .arg(project.file("does-not-exist"))
        .arg("png")
        .assert()
        .code(4)
        .stderr(predicate::str::contains("does-not-exist"));
}

#[test]
fn test_zero_jobs_is_a_usage_error() {
    let home = TempDir::new().unwrap();
    let project = TestProjectBuilder::new().with_source("a.sch").build();

    schbuild(&home)
        .arg("--dir")
        .arg(project.path())
        .args(["--jobs", "0", "png"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("jobs"));
}

#[test]
fn test_missing_converter_fails_the_job() {
    let home = TempDir::new().unwrap();
    let project = TestProjectBuilder::new().with_source("a.sch").build();

    schbuild(&home)
        .arg("--dir")
        .arg(project.path())
        .args(["--converter", "schbuild-no-such-converter", "png"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("a.sch (png)"));
}

#[test]
fn test_config_set_then_get() {
    let home = TempDir::new().unwrap();

    schbuild(&home)
        .args(["config", "set", "build.default_targets", "png,tex"])
        .assert()
        .success();

    schbuild(&home)
        .args(["config", "get", "build.default_targets"])
        .assert()
        .success()
        .stdout("png,tex\n");

    schbuild(&home)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("schbuild"));
}

#[test]
fn test_config_set_rejects_unknown_key() {
    let home = TempDir::new().unwrap();

    schbuild(&home)
        .args(["config", "set", "build.colour", "red"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Unknown configuration key"));
}
