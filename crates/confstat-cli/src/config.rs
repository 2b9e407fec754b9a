use crate::cli::BinningArgs;
use crate::error::{CliError, Result};
use confstat::core::models::simulation_box::SimulationBox;
use confstat::engine::config::{BinningBuilder, CellModelConfig, Spacing};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone, Copy)]
#[serde(deny_unknown_fields)]
struct PartialSystemConfig {
    #[serde(rename = "box")]
    box_lengths: Option<[f64; 3]>,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
enum PartialSpacing {
    Linear,
    Logarithmic,
}

impl From<PartialSpacing> for Spacing {
    fn from(p: PartialSpacing) -> Self {
        match p {
            PartialSpacing::Linear => Spacing::Linear,
            PartialSpacing::Logarithmic => Spacing::Logarithmic,
        }
    }
}

#[derive(Deserialize, Debug, Default, Clone, Copy)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialBinningConfig {
    r_min: Option<f64>,
    r_max: Option<f64>,
    bins: Option<usize>,
    spacing: Option<PartialSpacing>,
}

#[derive(Deserialize, Debug, Default, Clone, Copy)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialCellModelConfig {
    accuracy: Option<f64>,
    max_iterations: Option<usize>,
}

/// Settings read from the optional TOML file. CLI flags take precedence over
/// every value in here, and built-in defaults fill whatever is left.
#[derive(Deserialize, Debug, Default, Clone, Copy)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct PartialAnalysisConfig {
    system: Option<PartialSystemConfig>,
    binning: Option<PartialBinningConfig>,
    cell_model: Option<PartialCellModelConfig>,
}

impl PartialAnalysisConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Reads the file if one is given, otherwise starts from an empty configuration.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::from_file)
    }

    pub fn simulation_box(&self, cli_lengths: Option<[f64; 3]>) -> Result<SimulationBox> {
        let lengths = cli_lengths
            .or(self.system.and_then(|s| s.box_lengths))
            .ok_or_else(|| {
                CliError::Config(
                    "Box lengths are required either as `system.box` in the config file or via --box."
                        .to_string(),
                )
            })?;
        SimulationBox::try_from(lengths).map_err(|e| CliError::Config(e.to_string()))
    }

    pub fn binning(&self, args: &BinningArgs) -> BinningBuilder {
        let file = self.binning.unwrap_or_default();
        let mut builder = BinningBuilder::new();
        if let Some(r_min) = args.r_min.or(file.r_min) {
            builder = builder.r_min(r_min);
        }
        if let Some(r_max) = args.r_max.or(file.r_max) {
            builder = builder.r_max(r_max);
        }
        if let Some(bins) = args.bins.or(file.bins) {
            builder = builder.bins(bins);
        }
        let spacing = if args.log {
            Spacing::Logarithmic
        } else {
            file.spacing.map(Spacing::from).unwrap_or_default()
        };
        builder.spacing(spacing)
    }

    pub fn cell_model(&self, accuracy: Option<f64>, max_iterations: Option<usize>) -> CellModelConfig {
        let file = self.cell_model.unwrap_or_default();
        let mut config = CellModelConfig::default();
        if let Some(accuracy) = accuracy.or(file.accuracy) {
            config = config.with_accuracy(accuracy);
        }
        if let Some(max_iterations) = max_iterations.or(file.max_iterations) {
            config = config.with_max_iterations(max_iterations);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    const TOLERANCE: f64 = 1e-12;

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < TOLERANCE
    }

    fn write_config_file(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("confstat.toml");
        std::fs::write(&path, content).unwrap();
        path
    }

    const FULL_CONFIG: &str = r#"
[system]
box = [10.0, 12.0, 14.0]

[binning]
r-min = 0.5
r-max = 4.0
bins = 7
spacing = "logarithmic"

[cell-model]
accuracy = 1e-8
max-iterations = 500
"#;

    #[test]
    fn file_values_fill_unset_cli_values() {
        let dir = tempfile::tempdir().unwrap();
        let config = PartialAnalysisConfig::from_file(&write_config_file(&dir, FULL_CONFIG)).unwrap();

        let simulation_box = config.simulation_box(None).unwrap();
        assert!(f64_approx_equal(simulation_box.lengths().y, 12.0));

        let binning = config.binning(&BinningArgs::default()).build().unwrap();
        assert!(f64_approx_equal(binning.r_min(), 0.5));
        assert!(f64_approx_equal(binning.r_max(), 4.0));
        assert_eq!(binning.bins(), 7);
        assert_eq!(binning.spacing(), Spacing::Logarithmic);

        let cell_model = config.cell_model(None, None);
        assert!(f64_approx_equal(cell_model.accuracy, 1e-8));
        assert_eq!(cell_model.max_iterations, 500);
    }

    #[test]
    fn cli_values_override_file_values() {
        let dir = tempfile::tempdir().unwrap();
        let config = PartialAnalysisConfig::from_file(&write_config_file(&dir, FULL_CONFIG)).unwrap();

        let simulation_box = config.simulation_box(Some([5.0, 5.0, 5.0])).unwrap();
        assert!(f64_approx_equal(simulation_box.volume(), 125.0));

        let args = BinningArgs {
            bins: Some(3),
            ..BinningArgs::default()
        };
        let binning = config.binning(&args).build().unwrap();
        assert_eq!(binning.bins(), 3);
        assert!(f64_approx_equal(binning.r_max(), 4.0));

        assert_eq!(config.cell_model(None, Some(9)).max_iterations, 9);
    }

    #[test]
    fn defaults_apply_without_a_file() {
        let config = PartialAnalysisConfig::load(None).unwrap();

        let cell_model = config.cell_model(None, None);
        assert_eq!(cell_model, CellModelConfig::default());
        assert_eq!(
            config.binning(&BinningArgs::default()).build().unwrap_err().to_string(),
            "Missing required parameter: r_max"
        );
    }

    #[test]
    fn missing_box_is_a_config_error() {
        let config = PartialAnalysisConfig::default();
        assert!(matches!(config.simulation_box(None), Err(CliError::Config(_))));
        assert!(matches!(
            config.simulation_box(Some([1.0, 0.0, 1.0])),
            Err(CliError::Config(_))
        ));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config_file(&dir, "[binning]\nwidth = 0.1\n");

        let result = PartialAnalysisConfig::from_file(&path);

        assert!(matches!(result, Err(CliError::FileParsing { .. })));
    }
}
