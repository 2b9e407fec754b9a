use super::{LoadedSystem, progress_handler};
use crate::cli::StructureFactorArgs;
use crate::error::Result;
use crate::utils::format;
use confstat::engine::progress::ProgressReporter;
use confstat::workflows::analyze::Analyzer;

pub fn run(args: StructureFactorArgs, quiet: bool) -> Result<()> {
    print!("{}", structure_factor(&args, quiet)?);
    Ok(())
}

fn structure_factor(args: &StructureFactorArgs, quiet: bool) -> Result<String> {
    let system = LoadedSystem::load(&args.system)?;
    let reporter = ProgressReporter::with_callback(progress_handler(quiet).callback());
    let analyzer = Analyzer::new(&system.snapshot, &system.simulation_box, &reporter);

    let shells = analyzer.structure_factor(args.particle_type, args.order)?;
    Ok(format::columns(
        &["q", "S(q)"],
        shells.iter().map(|shell| vec![shell.q, shell.value]),
    ))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::cli::SystemArgs;

    #[test]
    fn single_particle_has_unit_structure_factor() {
        let dir = tempfile::tempdir().unwrap();
        let frame = "id,type,mol_id,mass,x,y,z\n0,0,0,1.0,1.0,2.0,3.0\n";
        let args = StructureFactorArgs {
            system: SystemArgs {
                input: write_frame(dir.path(), "frame.csv", frame),
                box_lengths: Some([10.0, 10.0, 10.0]),
                config: None,
            },
            particle_type: 0,
            order: 1,
        };

        let table = structure_factor(&args, true).unwrap();

        let rows: Vec<&str> = table.lines().skip(1).collect();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].ends_with(" 1.000000"));
    }
}
