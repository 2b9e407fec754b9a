use super::{LoadedSystem, progress_handler, type_filter};
use crate::cli::{DisttoArgs, DistributionArgs, MindistArgs, NbhoodArgs};
use crate::error::Result;
use crate::utils::format;
use confstat::engine::progress::ProgressReporter;
use confstat::workflows::analyze::Analyzer;
use nalgebra::Point3;
use tracing::info;

pub fn run_mindist(args: MindistArgs, quiet: bool) -> Result<()> {
    println!("{}", mindist(&args, quiet)?);
    Ok(())
}

fn mindist(args: &MindistArgs, quiet: bool) -> Result<String> {
    let system = LoadedSystem::load(&args.system)?;
    let reporter = ProgressReporter::with_callback(progress_handler(quiet).callback());
    let analyzer = Analyzer::new(&system.snapshot, &system.simulation_box, &reporter);

    let distance = analyzer.mindist(type_filter(&args.set1), type_filter(&args.set2))?;
    info!(distance, "Minimum distance computed.");
    Ok(format!("{distance:.6}"))
}

pub fn run_distribution(args: DistributionArgs, quiet: bool) -> Result<()> {
    print!("{}", distribution(&args, quiet)?);
    Ok(())
}

fn distribution(args: &DistributionArgs, quiet: bool) -> Result<String> {
    let system = LoadedSystem::load(&args.system)?;
    let reporter = ProgressReporter::with_callback(progress_handler(quiet).callback());
    let analyzer = Analyzer::new(&system.snapshot, &system.simulation_box, &reporter);

    let binning = system.config.binning(&args.binning);
    let result =
        analyzer.distance_distribution(&args.types1, &args.types2, binning, args.cumulative)?;

    let mut out = format!("# below-range {:.6}\n", result.below_range);
    out.push_str(&format::columns(
        &["r", "P(r)"],
        result
            .centers
            .iter()
            .zip(&result.values)
            .map(|(r, p)| vec![*r, *p]),
    ));
    Ok(out)
}

pub fn run_nbhood(args: NbhoodArgs, quiet: bool) -> Result<()> {
    println!("{}", nbhood(&args, quiet)?);
    Ok(())
}

fn nbhood(args: &NbhoodArgs, quiet: bool) -> Result<String> {
    let system = LoadedSystem::load(&args.system)?;
    let reporter = ProgressReporter::with_callback(progress_handler(quiet).callback());
    let analyzer = Analyzer::new(&system.snapshot, &system.simulation_box, &reporter);

    let identities = analyzer.neighborhood(&Point3::from(args.point), args.radius)?;
    let ids: Vec<String> = identities.iter().map(ToString::to_string).collect();
    Ok(ids.join(" "))
}

pub fn run_distto(args: DisttoArgs, quiet: bool) -> Result<()> {
    println!("{}", distto(&args, quiet)?);
    Ok(())
}

fn distto(args: &DisttoArgs, quiet: bool) -> Result<String> {
    let system = LoadedSystem::load(&args.system)?;
    let reporter = ProgressReporter::with_callback(progress_handler(quiet).callback());
    let analyzer = Analyzer::new(&system.snapshot, &system.simulation_box, &reporter);

    let distance = analyzer.distance_to(&Point3::from(args.point), args.exclude)?;
    Ok(format!("{distance:.6}"))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::cli::{BinningArgs, SystemArgs};

    fn system_args(dir: &std::path::Path) -> SystemArgs {
        SystemArgs {
            input: write_frame(dir, "frame.csv", FRAME),
            box_lengths: Some([10.0, 10.0, 10.0]),
            config: None,
        }
    }

    #[test]
    fn mindist_between_type_sets() {
        let dir = tempfile::tempdir().unwrap();
        let args = MindistArgs {
            system: system_args(dir.path()),
            set1: vec![0],
            set2: vec![1],
        };
        assert_eq!(mindist(&args, true).unwrap(), "4.000000");
    }

    #[test]
    fn mindist_of_all_particles() {
        let dir = tempfile::tempdir().unwrap();
        let args = MindistArgs {
            system: system_args(dir.path()),
            set1: vec![],
            set2: vec![],
        };
        assert_eq!(mindist(&args, true).unwrap(), "1.000000");
    }

    #[test]
    fn distribution_table_has_one_row_per_bin() {
        let dir = tempfile::tempdir().unwrap();
        let args = DistributionArgs {
            system: system_args(dir.path()),
            types1: vec![0],
            types2: vec![0],
            binning: BinningArgs {
                r_min: Some(0.0),
                r_max: Some(4.0),
                bins: Some(4),
                log: false,
            },
            cumulative: false,
        };

        let table = distribution(&args, true).unwrap();

        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "# below-range 0.000000");
        assert_eq!(lines[1], "# r P(r)");
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[3], "1.500000 1.000000");
    }

    #[test]
    fn nbhood_lists_identities() {
        let dir = tempfile::tempdir().unwrap();
        let args = NbhoodArgs {
            system: system_args(dir.path()),
            point: [1.5, 1.0, 1.0],
            radius: 1.0,
        };
        assert_eq!(nbhood(&args, true).unwrap(), "0 1");
    }

    #[test]
    fn distto_respects_exclusion() {
        let dir = tempfile::tempdir().unwrap();
        let args = DisttoArgs {
            system: system_args(dir.path()),
            point: [1.0, 1.0, 1.0],
            exclude: Some(0),
        };
        assert_eq!(distto(&args, true).unwrap(), "1.000000");
    }
}
