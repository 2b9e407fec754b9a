use super::{LoadedSystem, progress_handler};
use crate::cli::AggregationArgs;
use crate::error::{CliError, Result};
use confstat::engine::config::AggregationConfigBuilder;
use confstat::engine::error::EngineError;
use confstat::engine::progress::ProgressReporter;
use confstat::engine::tasks::aggregation::AggregationResult;
use confstat::workflows::analyze::Analyzer;

pub fn run(args: AggregationArgs, quiet: bool) -> Result<()> {
    print!("{}", render(&aggregate(&args, quiet)?));
    Ok(())
}

fn aggregate(args: &AggregationArgs, quiet: bool) -> Result<AggregationResult> {
    let system = LoadedSystem::load(&args.system)?;
    let n_molecules = system.snapshot.n_molecules();
    let last_molecule = match args.last_molecule {
        Some(last) => last,
        None => n_molecules.checked_sub(1).ok_or_else(|| {
            CliError::Argument("the frame contains no molecules".to_string())
        })?,
    };
    let config = AggregationConfigBuilder::new()
        .distance_criteria(args.distance)
        .min_contact(args.min_contact)
        .molecule_range(args.first_molecule, last_molecule)
        .build()
        .map_err(EngineError::from)?;

    let reporter = ProgressReporter::with_callback(progress_handler(quiet).callback());
    let analyzer = Analyzer::new(&system.snapshot, &system.simulation_box, &reporter);
    Ok(analyzer.aggregation(&config)?)
}

fn render(result: &AggregationResult) -> String {
    let stats = &result.stats;
    let mut out = format!(
        "# aggregates {} max {} min {} mean {:.6} std {:.6}\n",
        result.count(),
        stats.max,
        stats.min,
        stats.mean,
        stats.std_dev()
    );
    for aggregate in &result.aggregates {
        let members: Vec<String> = aggregate.members.iter().map(ToString::to_string).collect();
        out.push_str(&members.join(" "));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::cli::SystemArgs;

    fn args(dir: &std::path::Path, distance: f64) -> AggregationArgs {
        AggregationArgs {
            system: SystemArgs {
                input: write_frame(dir, "frame.csv", FRAME),
                box_lengths: Some([10.0, 10.0, 10.0]),
                config: None,
            },
            distance,
            min_contact: 1,
            first_molecule: 0,
            last_molecule: None,
        }
    }

    #[test]
    fn distant_molecules_stay_apart() {
        let dir = tempfile::tempdir().unwrap();
        let result = aggregate(&args(dir.path(), 2.0), true).unwrap();

        assert_eq!(result.count(), 2);
        assert!(render(&result).starts_with("# aggregates 2 max 1 min 1"));
    }

    #[test]
    fn large_contact_distance_joins_molecules() {
        let dir = tempfile::tempdir().unwrap();
        let result = aggregate(&args(dir.path(), 4.5), true).unwrap();

        assert_eq!(result.count(), 1);
        let rendered = render(&result);
        let members: Vec<&str> = rendered.lines().nth(1).unwrap().split(' ').collect();
        assert_eq!(members.len(), 2);
    }

    #[test]
    fn out_of_range_molecules_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = args(dir.path(), 2.0);
        args.last_molecule = Some(10);

        assert!(matches!(aggregate(&args, true), Err(CliError::Core(_))));
    }
}
