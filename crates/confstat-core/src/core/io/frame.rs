use crate::core::io::traits::ParticleFile;
use crate::core::models::particle::{Particle, ParticleType};
use crate::core::models::snapshot::ParticleSnapshot;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::{self, BufRead, Write};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Inconsistent data on record {record}: {reason}")]
    Inconsistency { record: usize, reason: String },
}

/// One row of a frame file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct FrameRecord {
    id: usize,
    #[serde(rename = "type")]
    particle_type: ParticleType,
    mol_id: usize,
    mass: f64,
    x: f64,
    y: f64,
    z: f64,
}

impl From<&Particle> for FrameRecord {
    fn from(p: &Particle) -> Self {
        Self {
            id: p.identity,
            particle_type: p.particle_type,
            mol_id: p.mol_id,
            mass: p.mass,
            x: p.position.x,
            y: p.position.y,
            z: p.position.z,
        }
    }
}

impl From<FrameRecord> for Particle {
    fn from(r: FrameRecord) -> Self {
        Particle::new(r.id, r.particle_type, Point3::new(r.x, r.y, r.z))
            .with_mol_id(r.mol_id)
            .with_mass(r.mass)
    }
}

/// Comma separated particle table with the header `id,type,mol_id,mass,x,y,z`.
pub struct FrameFile;

impl ParticleFile for FrameFile {
    type Error = FrameError;

    fn read_from(reader: &mut impl BufRead) -> Result<ParticleSnapshot, Self::Error> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .comment(Some(b'#'))
            .from_reader(reader);

        let mut snapshot = ParticleSnapshot::new();
        let mut seen = HashSet::new();
        for (index, result) in csv_reader.deserialize::<FrameRecord>().enumerate() {
            let record = result?;
            let record_number = index + 1;
            if !seen.insert(record.id) {
                return Err(FrameError::Inconsistency {
                    record: record_number,
                    reason: format!("duplicate particle id {}", record.id),
                });
            }
            if !(record.mass.is_finite() && record.mass > 0.0) {
                return Err(FrameError::Inconsistency {
                    record: record_number,
                    reason: format!("mass must be positive (got {})", record.mass),
                });
            }
            if ![record.x, record.y, record.z].iter().all(|c| c.is_finite()) {
                return Err(FrameError::Inconsistency {
                    record: record_number,
                    reason: "coordinates must be finite".to_string(),
                });
            }
            snapshot.push(record.into());
        }
        Ok(snapshot)
    }

    fn write_to(snapshot: &ParticleSnapshot, writer: &mut impl Write) -> Result<(), Self::Error> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        for particle in snapshot.iter() {
            csv_writer.serialize(FrameRecord::from(particle))?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}
