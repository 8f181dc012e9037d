// tests/logging_filter.rs

use bernstein::cli::LogLevel;
use bernstein::logging::build_filter;

fn directives(cli: Option<LogLevel>, env: Option<&str>) -> String {
    build_filter(cli, env).to_string().to_lowercase()
}

#[test]
fn cli_level_wins_over_environment() {
    assert_eq!(directives(Some(LogLevel::Debug), Some("trace")), "debug");
    assert_eq!(directives(Some(LogLevel::Error), None), "error");
}

#[test]
fn environment_accepts_per_target_directives() {
    let filter = directives(None, Some("bernstein::exec=trace"));
    assert!(filter.contains("bernstein::exec=trace"), "{filter}");
}

#[test]
fn missing_or_invalid_environment_falls_back_to_info() {
    assert_eq!(directives(None, None), "info");
    assert_eq!(directives(None, Some("   ")), "info");
    assert_eq!(directives(None, Some("bernstein=loudest")), "info");
}
