/// Acceptance tests for the luarun CLI
///
/// These run the binary against the fixture scripts in fixtures/scripts/
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures/scripts")
}

/// luarun binary pointed at the fixture scripts, isolated from any config
fn luarun() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_luarun"));
    cmd.env("LUARUN_SCRIPTS_DIR", fixtures_dir())
        .env_remove("LUARUN_CONFIG")
        .env("LUARUN_LOG_LEVEL", "error");
    cmd
}

fn stdout_of(cmd: &mut Command) -> String {
    let output = cmd.output().unwrap();
    assert!(output.status.success(), "command failed: {:?}", output);
    String::from_utf8(output.stdout).unwrap()
}

#[test]
fn test_resolve_inlines_modules_once() {
    let body = stdout_of(luarun().args(["resolve", "sum"]));

    assert_eq!(body.matches("local function to_number").count(), 1);
    assert!(body.contains("local function key_count"));
    assert!(!body.contains("require("));
}

#[test]
fn test_resolve_is_deterministic() {
    let first = stdout_of(luarun().args(["resolve", "sum"]));
    let second = stdout_of(luarun().args(["resolve", "sum"]));
    assert_eq!(first, second);
}

#[test]
fn test_sha_matches_resolved_body() {
    let body = stdout_of(luarun().args(["resolve", "incr"]));
    let sha = stdout_of(luarun().args(["sha", "incr"]));

    assert_eq!(sha.trim(), luarun::script::script_sha(&body));
}

#[test]
fn test_list_shows_valid_scripts() {
    luarun()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("  sum\n"))
        .stdout(predicate::str::contains("  incr\n"))
        .stdout(predicate::str::contains("  util\n"))
        // broken.lua requires a missing module
        .stdout(predicate::str::contains("broken").not());
}

#[test]
fn test_missing_script_fails() {
    luarun()
        .args(["resolve", "missing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot load lua script \"missing\""));
}

#[test]
fn test_invalid_name_fails() {
    luarun()
        .args(["sha", "Foo/../bar"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid lua script"));
}

#[test]
fn test_explain_maps_error_to_source() {
    let sha = stdout_of(luarun().args(["sha", "sum"]));
    let message = format!(
        "ERR Error running script (call to f_{}): @user_script:12: user_script:12: attempt to compare nil with number",
        sha.trim()
    );

    luarun()
        .args(["explain", &message])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "sum:12: attempt to compare nil with number\n",
        ))
        .stdout(predicate::str::contains(
            "    12:     return to_number(redis.call('GET', key), 0)\n",
        ))
        .stdout(predicate::str::contains("    14: \n"));
}

#[test]
fn test_explain_reads_stdin() {
    let sha = stdout_of(luarun().args(["sha", "incr"]));
    let message = format!(
        "ERR Error running script (call to f_{}): @user_script:1: oops\n",
        sha.trim()
    );

    luarun()
        .arg("explain")
        .write_stdin(message)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("incr:1: oops\n    1: "));
}

#[test]
fn test_explain_passes_unknown_errors_through() {
    luarun()
        .args(["explain", "WRONGTYPE Operation against a key"])
        .assert()
        .success()
        .stdout("WRONGTYPE Operation against a key\n");
}

#[test]
fn test_config_file_sets_scripts_dir() {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("redis")).unwrap();
    fs::write(temp.path().join("redis/ping.lua"), "return 'PONG'\n").unwrap();
    let config = temp.path().join("luarun.toml");
    fs::write(&config, "[scripts]\ndir = \"redis\"\n").unwrap();

    Command::new(env!("CARGO_BIN_EXE_luarun"))
        .env_remove("LUARUN_SCRIPTS_DIR")
        .env("LUARUN_LOG_LEVEL", "error")
        .arg("--config")
        .arg(&config)
        .args(["resolve", "ping"])
        .assert()
        .success()
        .stdout("return 'PONG'\n");
}

#[test]
fn test_config_file_sets_log_level() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("ping.lua"), "return 'PONG'\n").unwrap();
    let config = temp.path().join("luarun.toml");
    fs::write(
        &config,
        "[scripts]\ndir = \".\"\n\n[observability]\nlog_level = \"debug\"\n",
    )
    .unwrap();

    let quiet = || {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_luarun"));
        cmd.env_remove("LUARUN_SCRIPTS_DIR")
            .env_remove("LUARUN_LOG_LEVEL")
            .env_remove("RUST_LOG")
            .env("LUARUN_LOG_FORMAT", "compact")
            .arg("--config")
            .arg(&config);
        cmd
    };

    quiet()
        .args(["resolve", "ping"])
        .assert()
        .success()
        .stderr(predicate::str::contains("loaded script"))
        .stderr(predicate::str::contains("operation=\"load\""));

    // The command line still wins over the file
    quiet()
        .args(["--log-level", "warn", "resolve", "ping"])
        .assert()
        .success()
        .stderr(predicate::str::contains("loaded script").not());
}

#[test]
fn test_config_example_is_valid_toml() {
    let example = stdout_of(luarun().args(["config", "example"]));
    let parsed: luarun::config::LuarunConfig = toml::from_str(&example).unwrap();
    assert_eq!(parsed, luarun::config::LuarunConfig::default());
}
