//! Integration tests for CLI argument handling
//!
//! Runs the binary against an unreachable API base so nothing touches the
//! network.

use std::io::Write;
use std::process::Command;

/// Nothing listens on the discard port, so connections are refused at once
const DEAD_API: &str = "http://127.0.0.1:9";

/// Helper to run the CLI with given args and capture output
fn run_cli(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_pitwall"))
        .args(args)
        .env("PITWALL_API_BASE", DEAD_API)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute pitwall")
}

#[test]
fn test_help_flag_exits_successfully() {
    let output = run_cli(&["--help"]);
    assert!(
        output.status.success(),
        "Expected --help to exit successfully"
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("pitwall"), "Help should mention pitwall");
    assert!(stdout.contains("standings"), "Help should list subcommands");
    assert!(stdout.contains("--config"), "Help should mention --config");
}

#[test]
fn test_subcommand_help_lists_session_aliases() {
    let output = run_cli(&["session", "--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("quali"));
}

#[test]
fn test_missing_subcommand_fails() {
    let output = run_cli(&[]);
    assert!(!output.status.success());
}

#[test]
fn test_unknown_championship_is_rejected() {
    let output = run_cli(&["standings", "teams"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("invalid value"),
        "Should explain the bad value: {}",
        stderr
    );
}

#[test]
fn test_invalid_session_prints_error_and_exits() {
    let output = run_cli(&["session", "2024", "6", "fp1"]);
    assert!(!output.status.success(), "Expected invalid session to fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Invalid session"),
        "Should print error message about invalid session: {}",
        stderr
    );
    assert!(
        !stderr.contains("slow or unreachable"),
        "Bad arguments should fail before any request: {}",
        stderr
    );
}

#[test]
fn test_unreachable_api_prints_advisory() {
    let output = run_cli(&["sessions", "2024", "6"]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Live F1 data is currently slow or unreachable"),
        "Should warn about the degraded API: {}",
        stderr
    );
}

#[test]
fn test_health_reports_degraded_api() {
    let output = run_cli(&["health"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("slow or unreachable"));
}

#[test]
fn test_missing_config_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");
    let output = run_cli(&["--config", path.to_str().unwrap(), "health"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to read config file"), "{}", stderr);
}

#[test]
fn test_malformed_config_file_fails() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[api\nbase_url = ").unwrap();
    let output = run_cli(&["--config", file.path().to_str().unwrap(), "health"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid config file"), "{}", stderr);
}

#[cfg(test)]
mod unit_tests {
    //! Unit tests for CLI parsing that don't require running the binary

    use clap::Parser;
    use pitwall::cli::{parse_session_arg, Championship, Cli, Command};
    use pitwall::season::SessionKind;

    #[test]
    fn test_cli_standings_both() {
        let cli = Cli::parse_from(["pitwall", "standings", "both"]);
        assert_eq!(
            cli.command,
            Command::Standings {
                championship: Championship::Both,
                year: None
            }
        );
    }

    #[test]
    fn test_cli_constructor_with_news() {
        let cli = Cli::parse_from(["pitwall", "constructor", "ferrari", "--news"]);
        assert_eq!(
            cli.command,
            Command::Constructor {
                id: "ferrari".to_string(),
                year: None,
                news: true
            }
        );
    }

    #[test]
    fn test_cli_news_limit() {
        let cli = Cli::parse_from(["pitwall", "news", "Ferrari F1", "--limit", "3"]);
        assert_eq!(
            cli.command,
            Command::News {
                query: "Ferrari F1".to_string(),
                limit: Some(3)
            }
        );
    }

    #[test]
    fn test_parse_session_arg_results_alias() {
        assert_eq!(parse_session_arg("results").unwrap(), SessionKind::Race);
        assert!(parse_session_arg("warmup").is_err());
    }
}
