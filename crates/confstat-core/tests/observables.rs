use confstat::core::cell_model::Regime;
use confstat::core::io::frame::FrameFile;
use confstat::core::io::traits::ParticleFile;
use confstat::core::models::particle::Particle;
use confstat::core::models::simulation_box::SimulationBox;
use confstat::core::models::snapshot::ParticleSnapshot;
use confstat::engine::config::{AggregationConfigBuilder, BinningBuilder, CellModelConfig};
use confstat::engine::error::{EngineError, ErrorKind};
use confstat::engine::neighbors::{CellSystem, IndexTopology, PairList};
use confstat::engine::progress::ProgressReporter;
use confstat::workflows::analyze::{Analyzer, cell_gpb};
use nalgebra::Point3;
use tempfile::tempdir;

const TOLERANCE: f64 = 1e-9;

fn f64_approx_equal(a: f64, b: f64) -> bool {
    (a - b).abs() < TOLERANCE
}

/// Six molecules of two particles each: molecules 0-2 touch in a row, 3 and 4
/// touch each other, 5 is isolated.
fn molecules() -> ParticleSnapshot {
    let centers = [
        (2.0, 2.0),
        (3.0, 2.0),
        (4.0, 2.0),
        (2.0, 10.0),
        (3.0, 10.0),
        (15.0, 15.0),
    ];
    centers
        .iter()
        .enumerate()
        .flat_map(|(mol, &(x, y))| {
            [0.0, 0.3].map(|dz| {
                let identity = 2 * mol + (dz > 0.0) as usize;
                Particle::new(identity, 0, Point3::new(x, y, 5.0 + dz)).with_mol_id(mol)
            })
        })
        .collect()
}

#[test]
fn aggregation_groups_touching_molecules() {
    let snapshot = molecules();
    let simulation_box = SimulationBox::cubic(20.0).unwrap();
    let reporter = ProgressReporter::new();
    let analyzer = Analyzer::new(&snapshot, &simulation_box, &reporter);
    let config = AggregationConfigBuilder::new()
        .distance_criteria(1.2)
        .molecule_range(0, 5)
        .build()
        .unwrap();

    let result = analyzer.aggregation(&config).unwrap();

    let sizes: Vec<usize> = result.aggregates.iter().map(|a| a.size()).collect();
    assert_eq!(sizes, vec![3, 2, 1]);
    assert_eq!(result.stats.max, 3);
    assert_eq!(result.stats.min, 1);
    assert!(f64_approx_equal(result.stats.mean, 2.0));
}

#[test]
fn aggregation_with_high_contact_threshold_keeps_singletons() {
    let snapshot = molecules();
    let simulation_box = SimulationBox::cubic(20.0).unwrap();
    let reporter = ProgressReporter::new();
    let analyzer = Analyzer::new(&snapshot, &simulation_box, &reporter);
    let config = AggregationConfigBuilder::new()
        .distance_criteria(1.2)
        .min_contact(100)
        .molecule_range(0, 5)
        .build()
        .unwrap();

    let result = analyzer.aggregation(&config).unwrap();

    assert_eq!(result.count(), 6);
    assert!(f64_approx_equal(result.stats.variance, 0.0));
}

#[test]
fn aggregation_rejects_multi_node_indices() {
    let snapshot = molecules();
    let simulation_box = SimulationBox::cubic(20.0).unwrap();
    let reporter = ProgressReporter::new();
    let analyzer = Analyzer::new(&snapshot, &simulation_box, &reporter);
    let config = AggregationConfigBuilder::new()
        .distance_criteria(1.2)
        .molecule_range(0, 5)
        .build()
        .unwrap();
    let index = PairList::new(
        vec![(0, 2)],
        5.0,
        IndexTopology {
            n_nodes: 4,
            cell_system: CellSystem::DomainDecomposition,
        },
    );

    let err = analyzer.aggregation_with(&index, &config).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Precondition);
}

#[test]
fn nearest_neighbour_distribution_of_collinear_particles() {
    let snapshot: ParticleSnapshot = [0.0, 1.5, 3.0]
        .into_iter()
        .enumerate()
        .map(|(i, x)| Particle::new(i, 0, Point3::new(x, 0.0, 0.0)))
        .collect();
    let simulation_box = SimulationBox::cubic(100.0).unwrap();
    let reporter = ProgressReporter::new();
    let analyzer = Analyzer::new(&snapshot, &simulation_box, &reporter);
    let binning = BinningBuilder::new().r_min(0.0).r_max(5.0).bins(5);

    let distribution = analyzer
        .distance_distribution(&[0], &[0], binning, false)
        .unwrap();

    assert!(f64_approx_equal(distribution.values[1], 1.0));
    assert!(f64_approx_equal(distribution.values.iter().sum::<f64>(), 1.0));
}

#[test]
fn frame_file_feeds_the_analyzer() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("frame.csv");
    let original = molecules();
    FrameFile::write_to_path(&original, &path).unwrap();

    let snapshot = FrameFile::read_from_path(&path).unwrap();
    assert_eq!(snapshot, original);

    let simulation_box = SimulationBox::cubic(20.0).unwrap();
    let reporter = ProgressReporter::new();
    let analyzer = Analyzer::new(&snapshot, &simulation_box, &reporter);
    let mindist = analyzer.mindist(None, None).unwrap();
    assert!((mindist - 0.3).abs() < 1e-12);
}

#[test]
fn principal_axes_of_a_rod_follow_its_direction() {
    let snapshot: ParticleSnapshot = (0..5)
        .map(|i| Particle::new(i, 2, Point3::new(1.0, 1.0, 1.0 + i as f64)))
        .collect();
    let simulation_box = SimulationBox::cubic(20.0).unwrap();
    let reporter = ProgressReporter::new();
    let analyzer = Analyzer::new(&snapshot, &simulation_box, &reporter);

    let center = analyzer.center_of_mass(2).unwrap();
    let axes = analyzer.principal_axes(2).unwrap();

    assert!(f64_approx_equal(center.z, 3.0));
    assert!(f64_approx_equal(axes[0].moment, 10.0));
    assert!(f64_approx_equal(axes[1].moment, 10.0));
    assert!(f64_approx_equal(axes[2].moment, 0.0));
    assert!(f64_approx_equal(axes[2].direction.z.abs(), 1.0));
}

#[test]
fn cell_model_regimes_through_the_public_api() {
    let config = CellModelConfig::default();

    let strong = cell_gpb(2.0, 10.0, 1.0, &config).unwrap();
    assert_eq!(strong.regime, Regime::Strong);
    assert!(strong.manning_radius > 1.0 && strong.manning_radius < 10.0);

    let err: EngineError = cell_gpb(1.0, 1.0, 10.0, &config).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}
