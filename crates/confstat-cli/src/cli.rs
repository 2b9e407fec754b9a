use crate::utils::parser::parse_triple;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "confstat CLI - structural observables of periodic particle configurations: distance statistics, radial distribution functions, aggregation, moments, structure factors and the cell-model solver.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Minimum distance between two sets of particle types.
    Mindist(MindistArgs),
    /// Distribution of nearest-neighbour distances.
    Distribution(DistributionArgs),
    /// Radial distribution function, instantaneous or averaged over frames.
    Rdf(RdfArgs),
    /// Molecular aggregates (clusters of touching molecules).
    Aggregation(AggregationArgs),
    /// Center of mass of one particle type.
    Centermass(TypeArgs),
    /// Moment of inertia tensor of one particle type.
    Inertia(TypeArgs),
    /// Principal moments and axes of inertia of one particle type.
    PrincipalAxes(TypeArgs),
    /// Spherically averaged static structure factor of one particle type.
    StructureFactor(StructureFactorArgs),
    /// Solve the Poisson-Boltzmann cell model for the Manning radius.
    CellGpb(CellGpbArgs),
    /// Identities of the particles within a radius of a point.
    Nbhood(NbhoodArgs),
    /// Minimum distance from a point to the particles.
    Distto(DisttoArgs),
    /// Volume fluctuations <V^2> - <V>^2 over a series of boxes.
    Kappa(KappaArgs),
}

/// The particle frame and the box it lives in.
#[derive(Args, Debug, Clone)]
pub struct SystemArgs {
    /// Path to the particle frame file (CSV with header id,type,mol_id,mass,x,y,z).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Box edge lengths, overriding `system.box` from the config file.
    #[arg(short, long = "box", value_name = "LX,LY,LZ", value_parser = parse_triple)]
    pub box_lengths: Option<[f64; 3]>,

    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Histogram settings; unset values come from the config file, then from the system.
#[derive(Args, Debug, Clone, Default)]
pub struct BinningArgs {
    /// Lower edge of the first bin.
    #[arg(long, value_name = "FLOAT")]
    pub r_min: Option<f64>,

    /// Upper edge of the last bin (default: half the smallest box length).
    #[arg(long, value_name = "FLOAT")]
    pub r_max: Option<f64>,

    /// Number of bins (default: one per 20 particles).
    #[arg(long, value_name = "INT")]
    pub bins: Option<usize>,

    /// Use logarithmically spaced bins.
    #[arg(long)]
    pub log: bool,
}

#[derive(Args, Debug)]
pub struct MindistArgs {
    #[command(flatten)]
    pub system: SystemArgs,

    /// First set of particle types (default: all types).
    #[arg(long, value_delimiter = ',', value_name = "TYPES")]
    pub set1: Vec<i32>,

    /// Second set of particle types (default: all types).
    #[arg(long, value_delimiter = ',', value_name = "TYPES")]
    pub set2: Vec<i32>,
}

#[derive(Args, Debug)]
pub struct DistributionArgs {
    #[command(flatten)]
    pub system: SystemArgs,

    /// Types of the reference particles.
    #[arg(long, required = true, value_delimiter = ',', value_name = "TYPES")]
    pub types1: Vec<i32>,

    /// Types of the neighbours.
    #[arg(long, required = true, value_delimiter = ',', value_name = "TYPES")]
    pub types2: Vec<i32>,

    #[command(flatten)]
    pub binning: BinningArgs,

    /// Report the integrated (cumulative) distribution.
    #[arg(long)]
    pub cumulative: bool,
}

#[derive(Args, Debug)]
pub struct RdfArgs {
    #[command(flatten)]
    pub system: SystemArgs,

    #[arg(long, required = true, value_delimiter = ',', value_name = "TYPES")]
    pub types1: Vec<i32>,

    #[arg(long, required = true, value_delimiter = ',', value_name = "TYPES")]
    pub types2: Vec<i32>,

    #[command(flatten)]
    pub binning: BinningArgs,

    /// Stored configuration to average over; repeat for several frames (oldest first).
    #[arg(long = "frame", value_name = "PATH")]
    pub frames: Vec<PathBuf>,

    /// Average over the newest INT frames only.
    #[arg(long, value_name = "INT", requires = "frames")]
    pub n_conf: Option<usize>,

    /// Skip pairs within the same molecule (needs --frame).
    #[arg(long, requires = "frames")]
    pub intermolecular: bool,
}

#[derive(Args, Debug)]
pub struct AggregationArgs {
    #[command(flatten)]
    pub system: SystemArgs,

    /// Two molecules touch when any of their particles are closer than this.
    #[arg(long, required = true, value_name = "FLOAT")]
    pub distance: f64,

    /// Contacts needed before two molecules are merged.
    #[arg(long, default_value_t = 1, value_name = "INT")]
    pub min_contact: u32,

    /// First molecule id to consider.
    #[arg(long, default_value_t = 0, value_name = "INT")]
    pub first_molecule: usize,

    /// Last molecule id to consider (default: the largest molecule id).
    #[arg(long, value_name = "INT")]
    pub last_molecule: Option<usize>,
}

#[derive(Args, Debug)]
pub struct TypeArgs {
    #[command(flatten)]
    pub system: SystemArgs,

    /// The particle type to analyse.
    #[arg(short = 't', long = "type", required = true, value_name = "TYPE")]
    pub particle_type: i32,
}

#[derive(Args, Debug)]
pub struct StructureFactorArgs {
    #[command(flatten)]
    pub system: SystemArgs,

    #[arg(short = 't', long = "type", required = true, value_name = "TYPE")]
    pub particle_type: i32,

    /// Largest wave-vector index along each axis.
    #[arg(long, required = true, value_name = "INT")]
    pub order: usize,
}

#[derive(Args, Debug)]
pub struct CellGpbArgs {
    /// Reduced Manning parameter.
    #[arg(long, required = true, value_name = "FLOAT")]
    pub xi: f64,

    /// Outer cell radius.
    #[arg(long, required = true, value_name = "FLOAT")]
    pub rc: f64,

    /// Inner (rod) radius.
    #[arg(long, required = true, value_name = "FLOAT")]
    pub ro: f64,

    /// Bisection accuracy, overriding `cell-model.accuracy`.
    #[arg(long, value_name = "FLOAT")]
    pub accuracy: Option<f64>,

    /// Maximum number of bisection steps, overriding `cell-model.max-iterations`.
    #[arg(long, value_name = "INT")]
    pub max_iterations: Option<usize>,

    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct NbhoodArgs {
    #[command(flatten)]
    pub system: SystemArgs,

    /// The query point.
    #[arg(long, required = true, value_name = "X,Y,Z", value_parser = parse_triple)]
    pub point: [f64; 3],

    /// Search radius.
    #[arg(long, required = true, value_name = "FLOAT")]
    pub radius: f64,
}

#[derive(Args, Debug)]
pub struct DisttoArgs {
    #[command(flatten)]
    pub system: SystemArgs,

    /// The query point.
    #[arg(long, required = true, value_name = "X,Y,Z", value_parser = parse_triple)]
    pub point: [f64; 3],

    /// Identity of a particle to leave out.
    #[arg(long, value_name = "ID")]
    pub exclude: Option<usize>,
}

#[derive(Args, Debug)]
pub struct KappaArgs {
    /// Box edge lengths of one sample; repeat for every sample.
    #[arg(long = "sample", required = true, value_name = "LX,LY,LZ", value_parser = parse_triple)]
    pub samples: Vec<[f64; 3]>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_rdf_with_frames() {
        let cli = Cli::try_parse_from([
            "confstat", "-vv", "rdf", "-i", "live.csv", "--box", "10,10,10", "--types1", "0",
            "--types2", "0,1", "--frame", "a.csv", "--frame", "b.csv", "--intermolecular",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        let Commands::Rdf(args) = cli.command else {
            panic!("expected rdf");
        };
        assert_eq!(args.system.box_lengths, Some([10.0, 10.0, 10.0]));
        assert_eq!(args.types2, vec![0, 1]);
        assert_eq!(args.frames.len(), 2);
        assert!(args.intermolecular);
    }

    #[test]
    fn intermolecular_requires_frames() {
        let result = Cli::try_parse_from([
            "confstat", "rdf", "-i", "live.csv", "--types1", "0", "--types2", "0",
            "--intermolecular",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn subcommand_names_match_the_analysis_names() {
        for name in ["centermass", "principal-axes", "structure-factor", "cell-gpb", "nbhood", "distto"] {
            assert!(
                Cli::command().find_subcommand(name).is_some(),
                "missing subcommand {name}"
            );
        }
    }

    #[test]
    fn rejects_malformed_box() {
        let result = Cli::try_parse_from(["confstat", "mindist", "-i", "f.csv", "--box", "10,10"]);
        assert!(result.is_err());
    }
}
