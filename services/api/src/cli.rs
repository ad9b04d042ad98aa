use crate::demo::{run_allocation, run_specialties, AllocateArgs, SpecialtiesArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use upae_alloc::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "UPAE Allocation Engine",
    about = "Rank UPAE specialty offers for a patient and explain the choice",
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
    /// Allocate one patient against the facility directory and print the ranking
    Allocate(AllocateArgs),
    /// List the specialties a patient may request
    Specialties(SpecialtiesArgs),
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
        Command::Allocate(args) => run_allocation(args).await,
        Command::Specialties(args) => run_specialties(args),
    }
}
