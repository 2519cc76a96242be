use crate::core::models::system::World;
use std::error::Error;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Defines the interface for serializing a generated topology into a file format.
///
/// Implementors handle format-specific layout; the provided `*_path` methods take care of
/// creating parent directories and buffering.
pub trait TopologyFile {
    /// Format-specific settings such as titles or molecule names.
    type Metadata;

    /// The error type for I/O operations.
    type Error: Error + From<io::Error>;

    /// Writes the registry contents to a writer.
    ///
    /// # Arguments
    ///
    /// * `world` - The populated registry to serialize.
    /// * `metadata` - Format-specific settings.
    /// * `writer` - The writer to output to.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_to(
        world: &World,
        metadata: &Self::Metadata,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error>;

    /// Writes the registry contents to a file path, creating missing parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or writing fails.
    fn write_to_path<P: AsRef<Path>>(
        world: &World,
        metadata: &Self::Metadata,
        path: P,
    ) -> Result<(), Self::Error> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_to(world, metadata, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}
