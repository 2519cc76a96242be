use super::definition::{BeadDefinition, BondAnchor, MonomerBond, MonomerDefinition, MonomerEntry};
use crate::core::io::itp::{ItpError, ItpFile, ItpMolecule};
use crate::core::models::topology::BondParams;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MonomerLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error("Topology file error for '{path}': {source}")]
    Itp { path: String, source: ItpError },
    #[error("Molecule '{molecule}' not found in '{path}'")]
    MissingMolecule { path: String, molecule: String },
    #[error("Monomer '{id}' needs either inline beads or an itp-file with a molecule name")]
    MissingSource { id: String },
    #[error("Monomer '{id}' has an invalid bond anchor '{anchor}' (expected 'backbone' or a bead index)")]
    InvalidAnchor { id: String, anchor: String },
    #[error("Invalid monomer definition: {0}")]
    Invalid(String),
}

/// Bond origin as written in configuration: `"backbone"` or a 0-based bead index.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawAnchor {
    Index(usize),
    Named(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct RawBead {
    #[serde(rename = "type")]
    pub bead_type: String,
    pub name: String,
    #[serde(default = "default_mass")]
    pub mass: f64,
    #[serde(default)]
    pub charge: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct RawBond {
    pub from: RawAnchor,
    pub to: usize,
    #[serde(default = "default_funct")]
    pub funct: u8,
    pub length: f64,
    #[serde(default = "default_force_constant")]
    pub force_constant: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct RawBondParams {
    #[serde(default = "default_funct")]
    pub funct: u8,
    #[serde(default = "default_length")]
    pub length: f64,
    #[serde(default = "default_force_constant")]
    pub force_constant: f64,
}

impl From<RawBondParams> for BondParams {
    fn from(raw: RawBondParams) -> Self {
        BondParams {
            funct: raw.funct,
            length: raw.length,
            force_constant: raw.force_constant,
        }
    }
}

/// A monomer as it appears in configuration, either inline or by reference to an `.itp`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct RawMonomer {
    pub id: String,
    #[serde(default = "default_ratio")]
    pub ratio: f64,
    pub residue_name: Option<String>,
    #[serde(default)]
    pub beads: Vec<RawBead>,
    #[serde(default)]
    pub bonds: Vec<RawBond>,
    pub itp_file: Option<PathBuf>,
    pub molecule: Option<String>,
    /// Bond from the backbone to the first bead of a topology-file monomer.
    pub attach_bond: Option<RawBondParams>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawMonomerFile {
    #[serde(default)]
    monomer: Vec<RawMonomer>,
}

fn default_mass() -> f64 {
    72.0
}
fn default_funct() -> u8 {
    1
}
fn default_length() -> f64 {
    BondParams::default().length
}
fn default_force_constant() -> f64 {
    BondParams::default().force_constant
}
fn default_ratio() -> f64 {
    1.0
}

/// Resolves raw monomer declarations into validated [`MonomerEntry`] values.
pub struct MonomerLibrary;

impl MonomerLibrary {
    /// Loads every `[[monomer]]` table of a TOML file.
    ///
    /// Relative `itp-file` paths are resolved against the file's directory.
    ///
    /// # Errors
    ///
    /// Returns [`MonomerLoadError`] if the file cannot be read or parsed, or if any monomer
    /// fails to resolve.
    pub fn load_toml<P: AsRef<Path>>(path: P) -> Result<Vec<MonomerEntry>, MonomerLoadError> {
        let path = path.as_ref();
        let path_str = path.to_string_lossy().to_string();
        let content = std::fs::read_to_string(path).map_err(|e| MonomerLoadError::Io {
            path: path_str.clone(),
            source: e,
        })?;
        let raw: RawMonomerFile = toml::from_str(&content).map_err(|e| MonomerLoadError::Toml {
            path: path_str,
            source: e,
        })?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        Self::resolve_all(&raw.monomer, base_dir)
    }

    pub fn resolve_all(
        raw: &[RawMonomer],
        base_dir: &Path,
    ) -> Result<Vec<MonomerEntry>, MonomerLoadError> {
        raw.iter().map(|monomer| Self::resolve(monomer, base_dir)).collect()
    }

    /// Turns one raw declaration into a validated entry.
    ///
    /// A declaration naming both an `itp-file` and a `molecule` is read from the topology
    /// file; otherwise the inline beads and bonds are used.
    pub fn resolve(raw: &RawMonomer, base_dir: &Path) -> Result<MonomerEntry, MonomerLoadError> {
        let definition = match (&raw.itp_file, &raw.molecule) {
            (Some(itp_file), Some(molecule)) => {
                let path = if itp_file.is_absolute() {
                    itp_file.clone()
                } else {
                    base_dir.join(itp_file)
                };
                Self::from_itp(raw, &path, molecule)?
            }
            _ if !raw.beads.is_empty() => Self::from_inline(raw)?,
            _ => {
                return Err(MonomerLoadError::MissingSource { id: raw.id.clone() });
            }
        };

        definition.validate().map_err(MonomerLoadError::Invalid)?;
        Ok(MonomerEntry {
            definition,
            ratio: raw.ratio,
        })
    }

    fn from_inline(raw: &RawMonomer) -> Result<MonomerDefinition, MonomerLoadError> {
        let beads = raw
            .beads
            .iter()
            .map(|bead| BeadDefinition {
                bead_type: bead.bead_type.clone(),
                name: bead.name.clone(),
                mass: bead.mass,
                charge: bead.charge,
            })
            .collect();

        let bonds = raw
            .bonds
            .iter()
            .map(|bond| {
                let from = match &bond.from {
                    RawAnchor::Index(index) => BondAnchor::Bead(*index),
                    RawAnchor::Named(name) if name.eq_ignore_ascii_case("backbone") => {
                        BondAnchor::Backbone
                    }
                    RawAnchor::Named(name) => {
                        return Err(MonomerLoadError::InvalidAnchor {
                            id: raw.id.clone(),
                            anchor: name.clone(),
                        });
                    }
                };
                Ok(MonomerBond {
                    from,
                    to: bond.to,
                    params: BondParams {
                        funct: bond.funct,
                        length: bond.length,
                        force_constant: bond.force_constant,
                    },
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(MonomerDefinition {
            id: raw.id.clone(),
            residue_name: raw.residue_name.clone().unwrap_or_else(|| raw.id.clone()),
            beads,
            bonds,
        })
    }

    fn from_itp(
        raw: &RawMonomer,
        path: &Path,
        molecule: &str,
    ) -> Result<MonomerDefinition, MonomerLoadError> {
        let path_str = path.to_string_lossy().to_string();
        let molecules = ItpFile::read_molecules_from_path(path).map_err(|e| MonomerLoadError::Itp {
            path: path_str.clone(),
            source: e,
        })?;
        let found = molecules
            .into_iter()
            .find(|m| m.name == molecule)
            .ok_or_else(|| MonomerLoadError::MissingMolecule {
                path: path_str,
                molecule: molecule.to_string(),
            })?;

        let attach = raw.attach_bond.map(BondParams::from).unwrap_or_default();
        Ok(definition_from_itp(&raw.id, raw.residue_name.as_deref(), &found, attach))
    }
}

/// Converts a parsed `.itp` molecule into a monomer attached to the backbone through its
/// first bead.
///
/// Topology indices are 1-based; bonds whose endpoints fall outside the atom list are
/// dropped.
pub fn definition_from_itp(
    id: &str,
    residue_name: Option<&str>,
    molecule: &ItpMolecule,
    attach: BondParams,
) -> MonomerDefinition {
    let beads = molecule
        .atoms
        .iter()
        .map(|atom| BeadDefinition {
            bead_type: atom.bead_type.clone(),
            name: atom.atom_name.clone(),
            mass: atom.mass,
            charge: atom.charge,
        })
        .collect::<Vec<_>>();

    let mut bonds = vec![MonomerBond {
        from: BondAnchor::Backbone,
        to: 0,
        params: attach,
    }];
    let defaults = BondParams::default();
    bonds.extend(
        molecule
            .bonds
            .iter()
            .filter(|bond| {
                (1..=beads.len()).contains(&bond.from) && (1..=beads.len()).contains(&bond.to)
            })
            .map(|bond| MonomerBond {
                from: BondAnchor::Bead(bond.from - 1),
                to: bond.to - 1,
                params: BondParams {
                    funct: bond.funct,
                    length: bond.params.first().copied().unwrap_or(defaults.length),
                    force_constant: bond
                        .params
                        .get(1)
                        .copied()
                        .unwrap_or(defaults.force_constant),
                },
            }),
    );

    let residue_name = residue_name
        .map(str::to_string)
        .or_else(|| molecule.atoms.first().map(|atom| atom.residue_name.clone()))
        .unwrap_or_else(|| molecule.name.clone());

    MonomerDefinition {
        id: id.to_string(),
        residue_name,
        beads,
        bonds,
    }
}
