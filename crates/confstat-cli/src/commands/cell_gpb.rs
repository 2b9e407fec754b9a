use crate::cli::CellGpbArgs;
use crate::config::PartialAnalysisConfig;
use crate::error::Result;
use confstat::workflows::analyze::cell_gpb;

pub fn run(args: CellGpbArgs) -> Result<()> {
    println!("{}", solve(&args)?);
    Ok(())
}

/// Prints `gamma manning_radius branch`, the branch being `1` (real) or `-1` (imaginary).
fn solve(args: &CellGpbArgs) -> Result<String> {
    let file_config = PartialAnalysisConfig::load(args.config.as_deref())?;
    let config = file_config.cell_model(args.accuracy, args.max_iterations);
    let solution = cell_gpb(args.xi, args.rc, args.ro, &config)?;
    Ok(format!(
        "{:.6} {:.6} {}",
        solution.gamma,
        solution.manning_radius,
        solution.branch.code()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;

    fn args(xi: f64) -> CellGpbArgs {
        CellGpbArgs {
            xi,
            rc: 10.0,
            ro: 1.0,
            accuracy: None,
            max_iterations: None,
            config: None,
        }
    }

    #[test]
    fn uncharged_cell_has_closed_form() {
        assert_eq!(solve(&args(0.0)).unwrap(), "1.000000 -1.000000 -1");
    }

    #[test]
    fn strong_coupling_is_on_the_real_branch() {
        let out = solve(&args(2.0)).unwrap();
        assert!(out.ends_with(" 1"));
    }

    #[test]
    fn negative_manning_parameter_fails() {
        assert!(matches!(solve(&args(-0.5)), Err(CliError::Core(_))));
    }
}
