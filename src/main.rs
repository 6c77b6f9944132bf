use clap::Parser;
use miette::{IntoDiagnostic, Result};
use paylane::application::controller::{ControllerConfig, PaymentController};
use paylane::domain::ports::{PaymentGatewayBox, PaymentRepositoryBox};
use paylane::infrastructure::gateway::{DEFAULT_SUCCESS_RATE, GatewayConfig, SimulatedGateway};
use paylane::infrastructure::in_memory::InMemoryPaymentRepository;
use paylane::interfaces::csv::command_reader::CommandReader;
use paylane::interfaces::csv::payment_writer::PaymentWriter;
use std::fs::File;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input payment commands CSV file
    input: PathBuf,

    /// Probability that the simulated gateway approves a payment.
    #[arg(long, default_value_t = DEFAULT_SUCCESS_RATE, value_parser = parse_success_rate)]
    success_rate: f64,

    /// Seed for reproducible gateway outcomes.
    #[arg(long)]
    seed: Option<u64>,

    /// Give up on a gateway attempt after this many milliseconds.
    #[arg(long, default_value_t = 5000)]
    gateway_timeout_ms: u64,

    /// Simulated gateway response time in milliseconds.
    #[arg(long, default_value_t = 0)]
    gateway_latency_ms: u64,
}

fn parse_success_rate(value: &str) -> std::result::Result<f64, String> {
    let rate: f64 = value.parse().map_err(|e| format!("{e}"))?;
    if (0.0..=1.0).contains(&rate) {
        Ok(rate)
    } else {
        Err(format!("{rate} is not between 0 and 1"))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .init();

    let repository: PaymentRepositoryBox = Box::new(InMemoryPaymentRepository::new());
    let gateway: PaymentGatewayBox = Box::new(SimulatedGateway::new(GatewayConfig {
        success_rate: cli.success_rate,
        seed: cli.seed,
        latency: Duration::from_millis(cli.gateway_latency_ms),
    }));
    let config = ControllerConfig {
        gateway_timeout: Duration::from_millis(cli.gateway_timeout_ms),
    };
    let controller = PaymentController::with_config(repository, gateway, config);

    // Replay the command script
    let file = File::open(cli.input).into_diagnostic()?;
    let reader = CommandReader::new(file);
    for (line, command) in reader.commands().enumerate() {
        match command {
            Ok(command) => {
                let description = format!("{command:?}");
                if !command.execute(&controller).await {
                    warn!(row = line + 1, "Command not applied: {description}");
                }
            }
            Err(e) => {
                error!(row = line + 1, "Error reading command: {e}");
            }
        }
    }

    let payments = controller.list_payments().await;

    let stdout = io::stdout();
    let mut writer = PaymentWriter::new(stdout.lock());
    writer.write_payments(&payments).into_diagnostic()?;

    Ok(())
}
