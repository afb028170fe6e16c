//! Empirion runtime binary
//!
//! Three run modes, one per subcommand: the boot sequence alone, a single
//! evolution engine, or the full supervisor with its transport.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use empirion_evolution::{EvolutionConfig, EvolutionEngine};
use empirion_gateway::collaborators::{BootSequence, EventLogger};
use empirion_gateway::{EmpirionConfig, Supervisor, SupervisorConfig};

#[derive(Parser)]
#[command(name = "empirion")]
#[command(about = "Self-evolving agent runtime", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the boot sequence and exit
    Boot {
        #[arg(long, help = "Take the node offline and airgapped")]
        airgapped: bool,
    },
    /// Run one evolution engine until Ctrl-C
    Evolve {
        #[arg(long, help = "Step cadence in milliseconds")]
        interval_ms: Option<u64>,
    },
    /// Run the supervisor, agents, and transport until Ctrl-C
    Serve {
        #[arg(long, help = "Transport port")]
        port: Option<u16>,
        #[arg(long, help = "Run without the WebSocket transport")]
        no_transport: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = EmpirionConfig::load()?;
    init_tracing(config.log_json)?;

    match cli.command {
        Commands::Boot { airgapped } => boot(airgapped),
        Commands::Evolve { interval_ms } => evolve(&config, interval_ms).await,
        Commands::Serve { port, no_transport } => serve(config, port, no_transport).await?,
    }

    Ok(())
}

fn init_tracing(json: bool) -> Result<()> {
    let filter =
        tracing_subscriber::EnvFilter::from_default_env().add_directive("empirion=info".parse()?);

    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
    Ok(())
}

fn boot(airgapped: bool) {
    let report = BootSequence::new(Arc::new(EventLogger::new())).run(airgapped);
    for line in &report.panels {
        println!("{}", line);
    }
    println!(
        "diagnostics: {}, airgapped: {}",
        if report.diagnostics_passed { "passed" } else { "failed" },
        report.airgapped
    );
}

async fn evolve(config: &EmpirionConfig, interval_ms: Option<u64>) {
    let mut engine_config: EvolutionConfig = config.engine_config();
    if let Some(ms) = interval_ms {
        engine_config.interval = Duration::from_millis(ms);
    }

    let engine = Arc::new(EvolutionEngine::new(engine_config));
    let cancel = CancellationToken::new();
    let handle = tokio::spawn({
        let engine = engine.clone();
        let cancel = cancel.clone();
        async move { engine.run(cancel).await }
    });

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for Ctrl-C");
    }
    cancel.cancel();
    if let Err(e) = handle.await {
        error!(error = %e, "Evolution loop failed");
    }

    let state = engine.snapshot();
    info!(
        cycles = state.cycles,
        evolution_rate = state.evolution_rate,
        optimization_level = state.optimization_level,
        "Evolution stopped"
    );
}

async fn serve(mut config: EmpirionConfig, port: Option<u16>, no_transport: bool) -> Result<()> {
    if let Some(port) = port {
        config.port = port;
    }
    if no_transport {
        config.transport_enabled = false;
    }

    let supervisor = Supervisor::new(SupervisorConfig::from_config(&config)?);
    supervisor.start().await?;
    info!(
        version = empirion_common::VERSION,
        transport = ?supervisor.local_addr(),
        agents = ?supervisor.pool().names(),
        "Empirion running, press Ctrl-C to stop"
    );

    tokio::select! {
        _ = supervisor.run_forever() => {}
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                error!(error = %e, "Failed to listen for Ctrl-C");
            }
        }
    }

    supervisor.stop().await?;
    Ok(())
}
