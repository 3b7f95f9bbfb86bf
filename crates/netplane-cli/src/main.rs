// crates/netplane-cli/src/main.rs
// ============================================================================
// Module: Netplane CLI Entry Point
// Description: Command dispatcher for the Netplane control plane.
// Purpose: Run the control plane over the loopback broker and check configs.
// Dependencies: clap, netplane-broker, netplane-bus, netplane-config,
//               netplane-core, netplane-discovery, netplane-routing,
//               netplane-store-memory, netplane-topology, serde_json,
//               thiserror, tokio
// ============================================================================

//! ## Overview
//! The Netplane CLI wires the whole control plane together: it loads and
//! validates configuration, opens a broker session, spawns the storage,
//! data, topology, and routing services on the dispatch bus, and drives the
//! discovery loop until interrupted. The `run` command uses the in-process
//! loopback broker with a demo probe agent so the full pipeline can be
//! observed without an external broker.

// ============================================================================
// SECTION: Modules
// ============================================================================

#[cfg(test)]
mod main_tests;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use clap::Subcommand;
use netplane_broker::BrokerSession;
use netplane_broker::LoopbackBroker;
use netplane_broker::LoopbackTransport;
use netplane_broker::Transport;
use netplane_bus::Bus;
use netplane_bus::StorageClient;
use netplane_config::NetplaneConfig;
use netplane_config::ServiceConfig;
use netplane_core::AgentId;
use netplane_core::Capability;
use netplane_core::Measurement;
use netplane_core::SchemaId;
use netplane_discovery::CapabilityRegistry;
use netplane_discovery::DiscoveryCadence;
use netplane_discovery::DiscoveryDriver;
use netplane_discovery::DiscoveryEvents;
use netplane_discovery::LifecycleError;
use netplane_discovery::spawn_data_service;
use netplane_discovery::spawn_lifecycle;
use netplane_routing::spawn_routing_service;
use netplane_store_memory::spawn_memory_store;
use netplane_topology::spawn_topology_service;
use serde_json::Value;
use serde_json::json;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Capability tag the discovery loop listens for.
const TOPOLOGY_TAG: &str = "topology";

/// Role assigned to the demo account and its advertised capabilities.
const DEMO_ROLE: &str = "admin";

/// Queue depth for the inter-service measurement channels.
const CHANNEL_CAPACITY: usize = 64;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "netplane", version, about = "Netplane control plane")]
struct Cli {
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the control plane over the in-process loopback broker.
    Run(RunCommand),
    /// Load and validate a configuration file, then exit.
    CheckConfig(CheckConfigCommand),
}

/// Arguments for the `run` command.
#[derive(clap::Args, Debug)]
struct RunCommand {
    /// Path to the TOML configuration file.
    #[arg(long, value_name = "FILE")]
    config: PathBuf,
}

/// Arguments for the `check-config` command.
#[derive(clap::Args, Debug)]
struct CheckConfigCommand {
    /// Path to the TOML configuration file.
    #[arg(long, value_name = "FILE")]
    config: PathBuf,
}

// ============================================================================
// SECTION: CLI Errors
// ============================================================================

/// Terminal CLI error carrying a user-facing message.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// User-facing failure description.
    message: String,
}

impl CliError {
    /// Creates an error from a message.
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Run(command) => command_run(command).await,
        Commands::CheckConfig(command) => command_check_config(&command),
    }
}

// ============================================================================
// SECTION: Check-Config Command
// ============================================================================

/// Executes the `check-config` command.
fn command_check_config(command: &CheckConfigCommand) -> CliResult<ExitCode> {
    NetplaneConfig::load(&command.config).map_err(|err| CliError::new(err.to_string()))?;
    write_stdout_line(&format!("configuration {} is valid", command.config.display()))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Run Command
// ============================================================================

/// Executes the `run` command: wires the control plane and blocks until
/// Ctrl-C.
async fn command_run(command: RunCommand) -> CliResult<ExitCode> {
    let config =
        NetplaneConfig::load(&command.config).map_err(|err| CliError::new(err.to_string()))?;
    let cadence = cadence_from(&config.service);

    let transport = Arc::new(LoopbackTransport::new());
    LoopbackBroker::new()
        .with_account(&config.client.username, &config.client.password, DEMO_ROLE)
        .with_capability(demo_capability("R1-router"))
        .spawn(Arc::clone(&transport))
        .await
        .map_err(|err| CliError::new(format!("broker responders failed to bind: {err}")))?;
    spawn_demo_agent(&transport, "R1-router", cadence.spec_period)
        .await
        .map_err(|err| CliError::new(format!("demo agent failed to bind: {err}")))?;

    let session = Arc::new(
        BrokerSession::new(Arc::clone(&transport) as Arc<dyn Transport>)
            .with_call_timeout(config.service.call_timeout()),
    );
    session
        .connect(&config.amqp.host, config.amqp.port)
        .await
        .map_err(|err| CliError::new(format!("broker connection failed: {err}")))?;
    let identity = session
        .authenticate(&config.client.username, &config.client.password)
        .await
        .map_err(|err| CliError::new(format!("authentication failed: {err}")))?;
    write_stdout_line(&format!(
        "authenticated as {} with role {}",
        identity.name, identity.role
    ))?;

    let bus = Bus::new();
    let _store = spawn_memory_store(&bus);
    let storage = StorageClient::new(bus.clone());

    let (results_tx, results_rx) = mpsc::channel::<Measurement>(CHANNEL_CAPACITY);
    let (measurements_tx, measurements_rx) = mpsc::channel::<Measurement>(CHANNEL_CAPACITY);
    let (reset_tx, reset_rx) = mpsc::channel::<()>(1);
    let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>(1);

    let lifecycle = spawn_lifecycle(Arc::clone(&session), results_tx);
    let _data = spawn_data_service(
        &bus,
        Arc::clone(&session),
        lifecycle.clone(),
        storage.clone(),
        results_rx,
        measurements_tx,
    );
    let _topology = spawn_topology_service(&bus, storage.clone(), measurements_rx, reset_rx);
    let _routing = spawn_routing_service(&bus, storage);

    let registry = CapabilityRegistry::new(Arc::clone(&session), TOPOLOGY_TAG);
    let mut driver = DiscoveryDriver::new(registry, lifecycle, reset_tx, cadence)
        .with_events(Arc::new(DiscoveryEventLog));
    let discovery: JoinHandle<()> = tokio::spawn(async move {
        driver.run(shutdown_rx).await;
    });

    write_stdout_line("netplane control plane running; press Ctrl-C to stop")?;
    tokio::signal::ctrl_c()
        .await
        .map_err(|err| CliError::new(format!("signal handler failed: {err}")))?;

    let _ = shutdown_tx.send(()).await;
    discovery.abort();
    session.close().await;
    let _ = transport.close().await;
    write_stdout_line("netplane control plane stopped")?;
    Ok(ExitCode::SUCCESS)
}

/// Maps service configuration onto the discovery cadence.
const fn cadence_from(service: &ServiceConfig) -> DiscoveryCadence {
    DiscoveryCadence {
        tick_period: service.topology_update_period(),
        reset_period: service.reset_period(),
        spec_period: service.spec_period(),
    }
}

// ============================================================================
// SECTION: Demo Agent
// ============================================================================

/// Builds the capability the demo probe agent advertises.
fn demo_capability(agent: &str) -> Capability {
    Capability {
        name: TOPOLOGY_TAG.to_string(),
        agent_id: AgentId::new(agent),
        endpoint: format!("/agents/{agent}"),
        role: DEMO_ROLE.to_string(),
        parameters: vec!["target".to_string()],
    }
}

/// Binds a demo probe agent answering specifications and interrupts.
///
/// A specification (body carrying `when`) is acknowledged with an accepted
/// receipt and starts a streaming task publishing one neighbor report per
/// period to the result topic; an interrupt stops the stream.
async fn spawn_demo_agent(
    transport: &Arc<LoopbackTransport>,
    agent: &str,
    period: Duration,
) -> Result<(), netplane_broker::TransportError> {
    let address = format!("/agents/{agent}/specifications");
    let mut requests = transport.bind(&address).await?;
    let responder = Arc::clone(transport);
    let endpoint = format!("/agents/{agent}");
    let agent = agent.to_string();
    let schema = format!("demo-{agent}");
    tokio::spawn(async move {
        let mut stream: Option<JoinHandle<()>> = None;
        while let Some(request) = requests.recv().await {
            let Some(reply_to) = request.reply_to else {
                continue;
            };
            let receipt = json!({
                "schema": schema,
                "endpoint": endpoint,
                "agent_id": agent,
                "client_role": DEMO_ROLE,
                "errors": Vec::<String>::new(),
            });
            if responder.send(&reply_to, None, receipt).await.is_err() {
                break;
            }
            if let Some(task) = stream.take() {
                task.abort();
            }
            if request.body.get("when").is_some() {
                stream = Some(stream_neighbor_reports(
                    Arc::clone(&responder),
                    format!("{endpoint}/results/{DEMO_ROLE}"),
                    agent.clone(),
                    schema.clone(),
                    period,
                ));
            }
        }
    });
    Ok(())
}

/// Publishes one neighbor report per period until aborted.
fn stream_neighbor_reports(
    transport: Arc<LoopbackTransport>,
    topic: String,
    agent: String,
    schema: String,
    period: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let report = neighbor_report(&agent, &schema);
        let mut ticks = tokio::time::interval(period);
        loop {
            ticks.tick().await;
            if transport.send(&topic, None, report.clone()).await.is_err() {
                return;
            }
        }
    })
}

/// Builds the tabular neighbor report the demo agent streams.
fn neighbor_report(agent: &str, schema: &str) -> Value {
    let measurement = Measurement {
        agent_id: AgentId::new(agent),
        schema: SchemaId::new(schema),
        columns: vec!["target".to_string(), "status".to_string()],
        rows: vec![
            vec!["R2-router".to_string(), "UP".to_string()],
            vec!["S1-switch".to_string(), "UP".to_string()],
        ],
    };
    json!(measurement)
}

// ============================================================================
// SECTION: Discovery Event Log
// ============================================================================

/// Discovery event sink reporting tick failures on stderr.
struct DiscoveryEventLog;

impl DiscoveryEvents for DiscoveryEventLog {
    fn tick_failed(&self, error: &LifecycleError) {
        write_stderr_line(&format!("discovery tick failed: {error}"));
    }
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> CliResult<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
        .map_err(|err| CliError::new(format!("stdout write failed: {err}")))
}

/// Writes a single line to stderr, ignoring write failures.
fn write_stderr_line(message: &str) {
    let mut stderr = std::io::stderr();
    let _ = writeln!(&mut stderr, "{message}");
}

/// Writes the error to stderr and returns the failure exit code.
fn emit_error(message: &str) -> ExitCode {
    write_stderr_line(message);
    ExitCode::FAILURE
}
