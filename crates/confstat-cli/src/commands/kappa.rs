use crate::cli::KappaArgs;
use crate::error::{CliError, Result};
use confstat::core::models::simulation_box::SimulationBox;
use confstat::engine::tasks::volume::VolumeFluctuations;
use tracing::debug;

pub fn run(args: KappaArgs) -> Result<()> {
    println!("{}", kappa(&args)?);
    Ok(())
}

fn kappa(args: &KappaArgs) -> Result<String> {
    let mut fluctuations = VolumeFluctuations::new();
    for lengths in &args.samples {
        let simulation_box =
            SimulationBox::try_from(*lengths).map_err(|e| CliError::Argument(e.to_string()))?;
        let current = fluctuations.record(&simulation_box);
        debug!(volume = simulation_box.volume(), current, "Recorded volume sample.");
    }
    let value = fluctuations
        .kappa()
        .ok_or_else(|| CliError::Argument("at least one --sample is required".to_string()))?;
    let (sum_v, sum_v2, samples) = fluctuations.read();
    Ok(format!("{value:.6} {sum_v:.6} {sum_v2:.6} {samples}"))
}
