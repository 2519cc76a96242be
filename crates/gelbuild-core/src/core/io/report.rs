use crate::core::models::ids::AtomId;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

pub const PBC_REPORT_FILE_NAME: &str = "pbc_bonds.txt";

/// Periodic-closure bonds whose minimum image differs from their raw separation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PbcBondReport {
    pub pairs: Vec<(AtomId, AtomId)>,
}

impl PbcBondReport {
    pub fn record(&mut self, a: AtomId, b: AtomId) {
        self.pairs.push((a, b));
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Writes the header line followed by one 1-based `i j` line per pair.
    pub fn write_to(&self, writer: &mut impl Write) -> io::Result<()> {
        writeln!(writer, "Atom ID starts from 1 list of bonds over PBC")?;
        for (a, b) in &self.pairs {
            writeln!(writer, "{} {}", a.serial(), b.serial())?;
        }
        Ok(())
    }

    pub fn write_to_path<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer)?;
        writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_lists_one_based_pairs_after_header() {
        let mut report = PbcBondReport::default();
        report.record(AtomId::new(0), AtomId::new(17));
        report.record(AtomId::new(4), AtomId::new(9));

        let mut buffer = Vec::new();
        report.write_to(&mut buffer).unwrap();
        assert_eq!(
            String::from_utf8(buffer).unwrap(),
            "Atom ID starts from 1 list of bonds over PBC\n1 18\n5 10\n"
        );
    }

    #[test]
    fn empty_report_still_has_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(PBC_REPORT_FILE_NAME);
        PbcBondReport::default().write_to_path(&path).unwrap();
        assert_eq!(
            fs::read_to_string(path).unwrap(),
            "Atom ID starts from 1 list of bonds over PBC\n"
        );
    }
}
