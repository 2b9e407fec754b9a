use super::{LoadedSystem, progress_handler};
use crate::cli::TypeArgs;
use crate::error::Result;
use crate::utils::format;
use confstat::engine::progress::ProgressReporter;
use confstat::workflows::analyze::Analyzer;

/// Which geometric moment of a particle type to report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Moment {
    CenterOfMass,
    InertiaTensor,
    PrincipalAxes,
}

pub fn run(args: TypeArgs, moment: Moment, quiet: bool) -> Result<()> {
    print!("{}", compute(&args, moment, quiet)?);
    Ok(())
}

fn compute(args: &TypeArgs, moment: Moment, quiet: bool) -> Result<String> {
    let system = LoadedSystem::load(&args.system)?;
    let reporter = ProgressReporter::with_callback(progress_handler(quiet).callback());
    let analyzer = Analyzer::new(&system.snapshot, &system.simulation_box, &reporter);

    let out = match moment {
        Moment::CenterOfMass => {
            let center = analyzer.center_of_mass(args.particle_type)?;
            format!("{}\n", format::triple(center.coords.into()))
        }
        Moment::InertiaTensor => {
            let tensor = analyzer.inertia_tensor(args.particle_type)?;
            (0..3)
                .map(|row| {
                    format!(
                        "{}\n",
                        format::triple([tensor[(row, 0)], tensor[(row, 1)], tensor[(row, 2)]])
                    )
                })
                .collect()
        }
        Moment::PrincipalAxes => {
            let axes = analyzer.principal_axes(args.particle_type)?;
            format::columns(
                &["moment", "ax", "ay", "az"],
                axes.iter().map(|axis| {
                    vec![
                        axis.moment,
                        axis.direction.x,
                        axis.direction.y,
                        axis.direction.z,
                    ]
                }),
            )
        }
    };
    Ok(out)
}
