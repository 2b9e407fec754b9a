pub mod aggregation;
pub mod cell_gpb;
pub mod distances;
pub mod kappa;
pub mod moments;
pub mod rdf;
pub mod structure_factor;

use crate::cli::SystemArgs;
use crate::config::PartialAnalysisConfig;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use confstat::core::io::frame::FrameFile;
use confstat::core::io::traits::ParticleFile;
use confstat::core::models::simulation_box::SimulationBox;
use confstat::core::models::snapshot::ParticleSnapshot;
use std::path::Path;
use tracing::info;

/// Everything loaded for one invocation: the live particles, the box and the file configuration.
pub struct LoadedSystem {
    pub snapshot: ParticleSnapshot,
    pub simulation_box: SimulationBox,
    pub config: PartialAnalysisConfig,
}

impl LoadedSystem {
    pub fn load(args: &SystemArgs) -> Result<Self> {
        let config = PartialAnalysisConfig::load(args.config.as_deref())?;
        let simulation_box = config.simulation_box(args.box_lengths)?;
        let snapshot = read_frame(&args.input)?;
        info!(
            particles = snapshot.len(),
            volume = simulation_box.volume(),
            "Loaded system."
        );
        Ok(Self {
            snapshot,
            simulation_box,
            config,
        })
    }
}

pub fn read_frame(path: &Path) -> Result<ParticleSnapshot> {
    info!("Loading particle frame from {:?}", path);
    FrameFile::read_from_path(path).map_err(|e| CliError::FileParsing {
        path: path.to_path_buf(),
        source: e.into(),
    })
}

pub fn progress_handler(quiet: bool) -> CliProgressHandler {
    if quiet {
        CliProgressHandler::hidden()
    } else {
        CliProgressHandler::new()
    }
}

/// Turns an empty type list from the command line into "every type".
pub fn type_filter(types: &[i32]) -> Option<&[i32]> {
    (!types.is_empty()).then_some(types)
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn load_reads_frame_and_box() {
        let dir = tempfile::tempdir().unwrap();
        let args = SystemArgs {
            input: write_frame(dir.path(), "frame.csv", FRAME),
            box_lengths: Some([10.0, 10.0, 10.0]),
            config: None,
        };

        let system = LoadedSystem::load(&args).unwrap();

        assert_eq!(system.snapshot.len(), 4);
        assert_eq!(system.simulation_box.volume(), 1000.0);
    }

    #[test]
    fn load_reports_malformed_frames_with_their_path() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_frame(dir.path(), "bad.csv", "id,type\n0,zero\n");
        let args = SystemArgs {
            input: input.clone(),
            box_lengths: Some([10.0, 10.0, 10.0]),
            config: None,
        };

        let err = LoadedSystem::load(&args).err().unwrap();

        match err {
            CliError::FileParsing { path, .. } => assert_eq!(path, input),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_frame_file_fails() {
        let args = SystemArgs {
            input: PathBuf::from("/nonexistent/frame.csv"),
            box_lengths: Some([10.0, 10.0, 10.0]),
            config: None,
        };
        assert!(LoadedSystem::load(&args).is_err());
    }

    #[test]
    fn empty_type_list_selects_everything() {
        assert_eq!(type_filter(&[]), None);
        assert_eq!(type_filter(&[1, 2]), Some(&[1, 2][..]));
    }
}
