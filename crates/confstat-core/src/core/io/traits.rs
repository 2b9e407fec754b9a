use crate::core::models::snapshot::ParticleSnapshot;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Defines the interface for reading and writing particle frame formats.
///
/// Implementors handle format-specific parsing and serialization; the
/// path-based helpers are provided on top of the reader/writer methods.
pub trait ParticleFile {
    /// The error type for I/O operations.
    type Error: Error + From<io::Error>;

    /// Reads a particle snapshot from a buffered reader.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails or I/O operations encounter issues.
    fn read_from(reader: &mut impl BufRead) -> Result<ParticleSnapshot, Self::Error>;

    /// Writes a particle snapshot to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails or I/O operations encounter issues.
    fn write_to(snapshot: &ParticleSnapshot, writer: &mut impl Write) -> Result<(), Self::Error>;

    /// Reads a particle snapshot from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or parsing fails.
    fn read_from_path<P: AsRef<Path>>(path: P) -> Result<ParticleSnapshot, Self::Error> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader)
    }

    /// Writes a particle snapshot to a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or writing fails.
    fn write_to_path<P: AsRef<Path>>(
        snapshot: &ParticleSnapshot,
        path: P,
    ) -> Result<(), Self::Error> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_to(snapshot, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}
