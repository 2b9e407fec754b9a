mod cli;
mod commands;
mod config;
mod error;
mod logging;
mod utils;

use crate::cli::{Cli, Commands};
use crate::commands::moments::Moment;
use crate::error::Result;
use clap::Parser;
use tracing::{debug, error, info};

fn main() {
    if let Err(e) = run_app() {
        eprintln!("\n❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn run_app() -> Result<()> {
    let cli = Cli::parse();
    logging::setup_logging(cli.verbose, cli.quiet, cli.log_file.clone())?;

    info!("confstat CLI v{} starting up.", env!("CARGO_PKG_VERSION"));
    debug!("Full CLI arguments parsed: {:?}", &cli);

    let quiet = cli.quiet;
    let result = match cli.command {
        Commands::Mindist(args) => commands::distances::run_mindist(args, quiet),
        Commands::Distribution(args) => commands::distances::run_distribution(args, quiet),
        Commands::Rdf(args) => commands::rdf::run(args, quiet),
        Commands::Aggregation(args) => commands::aggregation::run(args, quiet),
        Commands::Centermass(args) => commands::moments::run(args, Moment::CenterOfMass, quiet),
        Commands::Inertia(args) => commands::moments::run(args, Moment::InertiaTensor, quiet),
        Commands::PrincipalAxes(args) => {
            commands::moments::run(args, Moment::PrincipalAxes, quiet)
        }
        Commands::StructureFactor(args) => commands::structure_factor::run(args, quiet),
        Commands::CellGpb(args) => commands::cell_gpb::run(args),
        Commands::Nbhood(args) => commands::distances::run_nbhood(args, quiet),
        Commands::Distto(args) => commands::distances::run_distto(args, quiet),
        Commands::Kappa(args) => commands::kappa::run(args),
    };

    match &result {
        Ok(()) => info!("Command completed successfully."),
        Err(e) => error!("Command failed: {}", e),
    }
    result
}
