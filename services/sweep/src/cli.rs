use crate::demo::{run_demo, DemoArgs};
use crate::server;
use crate::sweep::{run_sweep, SweepArgs};
use clap::{Args, Parser, Subcommand};
use wadp_compliance::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Affiliates Compliance Sweeper",
    about = "Run and serve the affiliates data portal reporting-compliance sweep",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Run one sweep over a portal document directory
    Sweep(SweepArgs),
    /// Run a sweep over a seeded in-memory portal and print everything it would do
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Sweep(args) => run_sweep(args),
        Command::Demo(args) => run_demo(args),
    }
}
