use super::{LoadedSystem, progress_handler, read_frame};
use crate::cli::RdfArgs;
use crate::error::Result;
use crate::utils::format;
use confstat::engine::error::EngineError;
use confstat::engine::history::ConfigurationHistory;
use confstat::engine::progress::ProgressReporter;
use confstat::workflows::analyze::Analyzer;
use tracing::info;

pub fn run(args: RdfArgs, quiet: bool) -> Result<()> {
    print!("{}", rdf(&args, quiet)?);
    Ok(())
}

fn rdf(args: &RdfArgs, quiet: bool) -> Result<String> {
    let system = LoadedSystem::load(&args.system)?;
    let reporter = ProgressReporter::with_callback(progress_handler(quiet).callback());
    let analyzer = Analyzer::new(&system.snapshot, &system.simulation_box, &reporter);
    let binning = system.config.binning(&args.binning);

    let result = if args.frames.is_empty() {
        analyzer.rdf(&args.types1, &args.types2, binning)?
    } else {
        let history = load_history(args)?;
        info!(
            frames = history.len(),
            intermolecular = args.intermolecular,
            "Averaging over stored configurations."
        );
        if args.intermolecular {
            analyzer.rdf_average_intermolecular(
                &history,
                &args.types1,
                &args.types2,
                binning,
                args.n_conf,
            )?
        } else {
            analyzer.rdf_average(&history, &args.types1, &args.types2, binning, args.n_conf)?
        }
    };

    Ok(format::columns(
        &["r", "g(r)"],
        result
            .centers
            .iter()
            .zip(&result.values)
            .map(|(r, g)| vec![*r, *g]),
    ))
}

fn load_history(args: &RdfArgs) -> Result<ConfigurationHistory> {
    let mut history = ConfigurationHistory::new();
    for path in &args.frames {
        let mut frame = read_frame(path)?;
        history.append(&mut frame).map_err(EngineError::from)?;
    }
    Ok(history)
}
