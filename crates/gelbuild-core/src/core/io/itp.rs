use super::traits::TopologyFile;
use crate::core::models::system::World;
use crate::core::models::topology::Bond;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub struct ItpMetadata {
    /// Name written to the `[ moleculetype ]` section.
    pub molecule_name: String,
}

impl Default for ItpMetadata {
    fn default() -> Self {
        Self {
            molecule_name: "HDGEL".to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ItpError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },
}

/// An `[ atoms ]` record.
#[derive(Debug, Clone, PartialEq)]
pub struct ItpAtom {
    pub nr: usize,
    pub bead_type: String,
    pub residue_number: isize,
    pub residue_name: String,
    pub atom_name: String,
    pub charge_group: i32,
    pub charge: f64,
    pub mass: f64,
}

/// A `[ bonds ]` record with its raw parameter columns.
#[derive(Debug, Clone, PartialEq)]
pub struct ItpBond {
    pub from: usize,
    pub to: usize,
    pub funct: u8,
    pub params: Vec<f64>,
}

/// One `[ moleculetype ]` block and the records that follow it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ItpMolecule {
    pub name: String,
    pub atoms: Vec<ItpAtom>,
    pub bonds: Vec<ItpBond>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    MoleculeType,
    Atoms,
    Bonds,
    Other,
}

/// GROMACS include topology.
pub struct ItpFile;

impl ItpFile {
    /// Parses every molecule declared in an `.itp` stream.
    ///
    /// Only `[ moleculetype ]`, `[ atoms ]` and `[ bonds ]` are interpreted; other sections,
    /// `;` comments and preprocessor lines are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`ItpError::Parse`] if a record in an interpreted section has malformed
    /// numeric columns.
    pub fn read_molecules(reader: &mut impl BufRead) -> Result<Vec<ItpMolecule>, ItpError> {
        let mut molecules: Vec<ItpMolecule> = Vec::new();
        let mut section = Section::Other;

        for (line_num, line_res) in reader.lines().enumerate() {
            let raw = line_res?;
            let line = raw.split(';').next().unwrap_or("").trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some(header) = line.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
                section = match header.trim().to_ascii_lowercase().as_str() {
                    "moleculetype" => Section::MoleculeType,
                    "atoms" => Section::Atoms,
                    "bonds" => Section::Bonds,
                    _ => Section::Other,
                };
                continue;
            }

            let fields: Vec<&str> = line.split_whitespace().collect();
            let line = line_num + 1;
            match section {
                Section::MoleculeType => molecules.push(ItpMolecule {
                    name: fields[0].to_string(),
                    ..Default::default()
                }),
                Section::Atoms => {
                    if let Some(molecule) = molecules.last_mut() {
                        molecule.atoms.push(parse_atom(&fields, line)?);
                    }
                }
                Section::Bonds => {
                    if let Some(molecule) = molecules.last_mut() {
                        molecule.bonds.push(parse_bond(&fields, line)?);
                    }
                }
                Section::Other => {}
            }
        }

        Ok(molecules)
    }

    pub fn read_molecules_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<ItpMolecule>, ItpError> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_molecules(&mut reader)
    }
}

fn parse_field<T: std::str::FromStr>(fields: &[&str], index: usize, name: &str, line: usize) -> Result<T, ItpError> {
    let value = fields.get(index).ok_or_else(|| ItpError::Parse {
        line,
        message: format!("missing '{}' column", name),
    })?;
    value.parse().map_err(|_| ItpError::Parse {
        line,
        message: format!("invalid '{}' value '{}'", name, value),
    })
}

fn parse_atom(fields: &[&str], line: usize) -> Result<ItpAtom, ItpError> {
    Ok(ItpAtom {
        nr: parse_field(fields, 0, "nr", line)?,
        bead_type: parse_field(fields, 1, "type", line)?,
        residue_number: parse_field(fields, 2, "resnr", line)?,
        residue_name: parse_field(fields, 3, "residue", line)?,
        atom_name: parse_field(fields, 4, "atom", line)?,
        charge_group: parse_field(fields, 5, "cgnr", line)?,
        charge: if fields.len() > 6 { parse_field(fields, 6, "charge", line)? } else { 0.0 },
        mass: if fields.len() > 7 { parse_field(fields, 7, "mass", line)? } else { 0.0 },
    })
}

fn parse_bond(fields: &[&str], line: usize) -> Result<ItpBond, ItpError> {
    let params = fields
        .iter()
        .enumerate()
        .skip(3)
        .map(|(index, _)| parse_field(fields, index, "parameter", line))
        .collect::<Result<Vec<f64>, _>>()?;
    Ok(ItpBond {
        from: parse_field(fields, 0, "ai", line)?,
        to: parse_field(fields, 1, "aj", line)?,
        funct: parse_field(fields, 2, "funct", line)?,
        params,
    })
}

impl TopologyFile for ItpFile {
    type Metadata = ItpMetadata;
    type Error = ItpError;

    fn write_to(
        world: &World,
        metadata: &Self::Metadata,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error> {
        writeln!(writer, ";Gromacs.itp file")?;
        writeln!(writer, "[ moleculetype ]")?;
        writeln!(writer, "; name  nrexcl")?;
        writeln!(writer, "{}           1", metadata.molecule_name)?;
        writeln!(writer, "#define RUBBER_BANDS\n")?;

        writeln!(writer, "[ atoms ]")?;
        writeln!(writer, ";   nr    type    resnr   residu    atom    cgnr  charge  mass")?;
        for atom in world.atoms() {
            writeln!(
                writer,
                "{:<7}{:<6}{:<6}{:<6}{:<6}{:<6}{:<8.4}{:<8.4}",
                atom.id().serial(),
                atom.bead_type,
                atom.residue_number,
                atom.residue_name,
                atom.name,
                atom.charge_group,
                atom.charge,
                atom.mass,
            )?;
        }

        write!(writer, "\n[ bonds ]\n\n")?;
        let mut bonds: Vec<&Bond> = world.bonds_iter().map(|(_, bond)| bond).collect();
        bonds.sort_by_key(|bond| bond.key());
        for bond in bonds {
            writeln!(
                writer,
                "{}  {}   {}  {:.6} {:.6}",
                bond.atom1_id.serial(),
                bond.atom2_id.serial(),
                bond.params.funct,
                bond.params.length,
                bond.params.force_constant,
            )?;
        }

        writeln!(writer, "#ifdef RUBBER_BANDS")?;
        writeln!(writer, "#ifndef RUBBER_FC")?;
        writeln!(writer, "#define RUBBER_FC 500.000000")?;
        writeln!(writer, "#endif")?;
        for bond in world.network_bonds() {
            let force_constant = bond
                .force_constant
                .map_or_else(|| "RUBBER_FC".to_string(), |fc| format!("{:.6}", fc));
            writeln!(
                writer,
                "{}  {}   {}  {:.6} {}",
                bond.atom1_id.serial(),
                bond.atom2_id.serial(),
                bond.funct,
                bond.length,
                force_constant,
            )?;
        }
        writeln!(writer, "#endif")?;

        write!(writer, "\n[ constraints ]\n\n")?;
        for constraint in world.constraints() {
            writeln!(
                writer,
                "{}  {}  {}  {:.6}",
                constraint.atom1_id.serial(),
                constraint.atom2_id.serial(),
                constraint.funct,
                constraint.length,
            )?;
        }

        write!(writer, "\n[ exclusions ]\n\n")?;
        for exclusion in world.exclusions() {
            writeln!(
                writer,
                "{}  {}",
                exclusion.atom1_id.serial(),
                exclusion.atom2_id.serial()
            )?;
        }

        write!(writer, "\n[ angles ]\n\n")?;
        for angle in world.angles() {
            writeln!(
                writer,
                "{:5}  {:5}  {:5}  {:5}  {:.6}  {:.6}",
                angle.side1.serial(),
                angle.center.serial(),
                angle.side2.serial(),
                angle.params.funct,
                angle.params.theta0,
                angle.params.force_constant,
            )?;
        }

        write!(writer, "\n[ dihedrals ]\n\n")?;
        for dihedral in world.dihedrals() {
            let [a, b, c, d] = dihedral.atoms.map(|id| id.serial());
            write!(writer, "{} {} {} {} {} {:?}", a, b, c, d, dihedral.funct, dihedral.phase)?;
            if let Some(force_constant) = dihedral.force_constant {
                write!(writer, " {:?}", force_constant)?;
            }
            if let Some(multiplicity) = dihedral.multiplicity {
                write!(writer, " {}", multiplicity)?;
            }
            writeln!(writer)?;
        }

        Ok(())
    }
}
