// crates/netplane-cli/src/main_tests.rs
// ============================================================================
// Module: CLI Main Helpers Tests
// Description: Unit tests for argument parsing and wiring helpers.
// Purpose: Ensure command parsing and cadence mapping behave as documented.
// Dependencies: netplane-cli main helpers
// ============================================================================

//! ## Overview
//! Validates clap argument parsing for both subcommands, the cadence mapping
//! from service configuration, and the demo agent's capability and report
//! shapes.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use netplane_config::ServiceConfig;

use super::Cli;
use super::Commands;
use super::cadence_from;
use super::demo_capability;
use super::neighbor_report;

// ============================================================================
// SECTION: Parsing Tests
// ============================================================================

#[test]
fn run_command_requires_a_config_path() {
    let parsed = Cli::try_parse_from(["netplane", "run", "--config", "/etc/netplane.toml"])
        .expect("run must parse");
    match parsed.command {
        Commands::Run(command) => {
            assert_eq!(command.config, PathBuf::from("/etc/netplane.toml"));
        }
        Commands::CheckConfig(_) => panic!("expected the run subcommand"),
    }
    assert!(Cli::try_parse_from(["netplane", "run"]).is_err());
}

#[test]
fn check_config_command_parses_its_path() {
    let parsed = Cli::try_parse_from(["netplane", "check-config", "--config", "net.toml"])
        .expect("check-config must parse");
    match parsed.command {
        Commands::CheckConfig(command) => {
            assert_eq!(command.config, PathBuf::from("net.toml"));
        }
        Commands::Run(_) => panic!("expected the check-config subcommand"),
    }
}

#[test]
fn missing_subcommands_are_rejected() {
    assert!(Cli::try_parse_from(["netplane"]).is_err());
}

// ============================================================================
// SECTION: Wiring Tests
// ============================================================================

#[test]
fn cadence_mirrors_the_service_configuration() {
    let service = ServiceConfig {
        call_timeout_ms: 10_000,
        topology_update_period_ms: 2_000,
        reset_period_s: 30,
        spec_period_ms: 500,
    };
    let cadence = cadence_from(&service);
    assert_eq!(cadence.tick_period, Duration::from_secs(2));
    assert_eq!(cadence.reset_period, Duration::from_secs(30));
    assert_eq!(cadence.spec_period, Duration::from_millis(500));
}

#[test]
fn demo_capability_targets_the_topology_tag() {
    let capability = demo_capability("R1-router");
    assert_eq!(capability.name, "topology");
    assert_eq!(capability.endpoint, "/agents/R1-router");
    assert_eq!(capability.role, "admin");
}

#[test]
fn neighbor_reports_carry_target_and_status_columns() {
    let report = neighbor_report("R1-router", "demo-R1-router");
    let columns = report
        .get("columns")
        .and_then(serde_json::Value::as_array)
        .expect("columns must be present");
    assert_eq!(columns.len(), 2);
    assert_eq!(report.get("schema").and_then(serde_json::Value::as_str), Some("demo-R1-router"));
}
