use crate::core::models::atom::{AtomRole, AtomTemplate};
use crate::core::models::system::DEFAULT_MEAN_SEP;
use crate::core::models::topology::{AngleParams, BondParams};
use crate::core::monomers::definition::MonomerEntry;
use crate::core::monomers::sequence::SequenceStrategy;
use std::collections::BTreeSet;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

fn invalid(name: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidParameter {
        name,
        reason: reason.into(),
    }
}

/// Attribute table and bond parameters for one structural role.
#[derive(Debug, Clone, PartialEq)]
pub struct RoleSpec {
    pub atom: AtomTemplate,
    /// Parameters of the bond that connects a bead of this role to its predecessor.
    pub bond: BondParams,
}

impl RoleSpec {
    pub fn new(atom: AtomTemplate, bond: BondParams) -> Self {
        Self { atom, bond }
    }

    fn with_names(role: AtomRole, residue_name: &str, atom_name: &str) -> Self {
        Self {
            atom: AtomTemplate {
                residue_name: residue_name.to_string(),
                atom_name: atom_name.to_string(),
                role,
                ..AtomTemplate::default()
            },
            bond: BondParams::default(),
        }
    }

    pub fn backbone() -> Self {
        Self::with_names(AtomRole::Backbone, "BCKN", "SEG")
    }

    pub fn crosslinker(atom_name: &str) -> Self {
        Self::with_names(AtomRole::Crosslinker, "LNK", atom_name)
    }

    pub fn side_chain() -> Self {
        Self::with_names(AtomRole::Sidechain, "SIDE", "SC")
    }
}

/// Per-role tables of the four crosslinker bead kinds.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkerRoles {
    /// Ends of the bridge between the two bis points of a cell.
    pub bridge_end: RoleSpec,
    /// Interior beads of the bridge.
    pub bridge_midpoint: RoleSpec,
    /// Lattice-vertex bead that attaches to a backbone chain end.
    pub link_end: RoleSpec,
    /// Lattice-vertex bead that closes the network across cells.
    pub periodic_link: RoleSpec,
}

impl Default for LinkerRoles {
    fn default() -> Self {
        Self {
            bridge_end: RoleSpec::crosslinker("LE"),
            bridge_midpoint: RoleSpec::crosslinker("LM"),
            link_end: RoleSpec::crosslinker("LK"),
            periodic_link: RoleSpec::crosslinker("LP"),
        }
    }
}

/// Parameters assigned by the hydrogel angle classifier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HydrogelAngleParams {
    /// Three backbone beads.
    pub backbone_straight: AngleParams,
    /// Backbone center with exactly one backbone side.
    pub backbone_branch: AngleParams,
    /// Any center that is not a backbone bead.
    pub side_straight: AngleParams,
    /// Everything else, mostly crosslinker regions.
    pub default: AngleParams,
}

impl Default for HydrogelAngleParams {
    fn default() -> Self {
        Self {
            backbone_straight: AngleParams::new(1, 180.0, 5.0),
            backbone_branch: AngleParams::new(1, 90.0, 5.0),
            side_straight: AngleParams::new(1, 180.0, 20.0),
            default: AngleParams::default(),
        }
    }
}

/// Side-chain decoration of hydrogel backbones.
#[derive(Debug, Clone, PartialEq)]
pub struct SideChainConfig {
    pub palette: Vec<MonomerEntry>,
    pub strategy: SequenceStrategy,
    /// Number of random directions tried per backbone bead.
    pub candidates: usize,
    /// Minimum allowed distance to existing beads, in units of `mean_sep`.
    pub overlap_factor: f64,
    /// Radius of the neighborhood scored by the penalty, in units of `mean_sep`.
    pub search_radius_factor: f64,
}

impl SideChainConfig {
    pub fn new(palette: Vec<MonomerEntry>, strategy: SequenceStrategy) -> Self {
        Self {
            palette,
            strategy,
            candidates: 72,
            overlap_factor: 0.8,
            search_radius_factor: 10.0,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.palette.is_empty() {
            return Err(invalid("monomers", "palette is empty"));
        }
        for entry in &self.palette {
            entry
                .definition
                .validate()
                .map_err(|reason| invalid("monomers", reason))?;
            if !(entry.ratio >= 0.0) {
                return Err(invalid(
                    "monomers",
                    format!("ratio of '{}' must be non-negative", entry.definition.id),
                ));
            }
        }
        if self.strategy == SequenceStrategy::Random
            && self.palette.iter().all(|entry| entry.ratio == 0.0)
        {
            return Err(invalid("monomers", "all ratios are zero"));
        }
        if let SequenceStrategy::Block(blocks) = &self.strategy {
            let known: BTreeSet<&str> = self
                .palette
                .iter()
                .map(|entry| entry.definition.id.as_str())
                .collect();
            if !blocks
                .iter()
                .any(|(id, size)| *size > 0 && known.contains(id.as_str()))
            {
                return Err(invalid("blocks", "no block references a known monomer"));
            }
        }
        if self.candidates == 0 {
            return Err(invalid("candidates", "must be at least 1"));
        }
        if !(self.overlap_factor > 0.0) || !(self.search_radius_factor > self.overlap_factor) {
            return Err(invalid(
                "search_radius_factor",
                "must exceed a positive overlap_factor",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HydrogelConfig {
    pub seed: u64,
    pub mean_sep: f64,
    /// Target strand length in beads between two lattice vertices.
    pub segment_length: usize,
    pub cells: [usize; 3],
    pub pbc: bool,
    /// Number of bonds removed by the connectivity-preserving cutter.
    pub cuts: usize,
    pub backbone: RoleSpec,
    pub linkers: LinkerRoles,
    pub angles: HydrogelAngleParams,
    pub side_chains: Option<SideChainConfig>,
    pub build_angles: bool,
}

#[derive(Default)]
pub struct HydrogelConfigBuilder {
    seed: Option<u64>,
    mean_sep: Option<f64>,
    segment_length: Option<usize>,
    cells: Option<[usize; 3]>,
    pbc: Option<bool>,
    cuts: Option<usize>,
    backbone: Option<RoleSpec>,
    linkers: Option<LinkerRoles>,
    angles: Option<HydrogelAngleParams>,
    side_chains: Option<SideChainConfig>,
    build_angles: Option<bool>,
}

impl HydrogelConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
    pub fn mean_sep(mut self, mean_sep: f64) -> Self {
        self.mean_sep = Some(mean_sep);
        self
    }
    pub fn segment_length(mut self, length: usize) -> Self {
        self.segment_length = Some(length);
        self
    }
    pub fn cells(mut self, cells: [usize; 3]) -> Self {
        self.cells = Some(cells);
        self
    }
    pub fn pbc(mut self, pbc: bool) -> Self {
        self.pbc = Some(pbc);
        self
    }
    pub fn cuts(mut self, cuts: usize) -> Self {
        self.cuts = Some(cuts);
        self
    }
    pub fn backbone(mut self, role: RoleSpec) -> Self {
        self.backbone = Some(role);
        self
    }
    pub fn linkers(mut self, linkers: LinkerRoles) -> Self {
        self.linkers = Some(linkers);
        self
    }
    pub fn angles(mut self, angles: HydrogelAngleParams) -> Self {
        self.angles = Some(angles);
        self
    }
    pub fn side_chains(mut self, side_chains: SideChainConfig) -> Self {
        self.side_chains = Some(side_chains);
        self
    }
    pub fn build_angles(mut self, enabled: bool) -> Self {
        self.build_angles = Some(enabled);
        self
    }

    pub fn build(self) -> Result<HydrogelConfig, ConfigError> {
        let mean_sep = self.mean_sep.unwrap_or(DEFAULT_MEAN_SEP);
        if !(mean_sep > 0.0) {
            return Err(invalid("mean_sep", "must be positive"));
        }
        let segment_length = self
            .segment_length
            .ok_or(ConfigError::MissingParameter("segment_length"))?;
        let cells = self.cells.ok_or(ConfigError::MissingParameter("cells"))?;
        if cells.contains(&0) {
            return Err(invalid("cells", "every axis needs at least one cell"));
        }
        let pbc = self.pbc.unwrap_or(true);
        if pbc && (cells.iter().any(|n| n % 2 != 0) || cells[1..].iter().any(|&n| n != cells[0])) {
            return Err(invalid(
                "cells",
                "periodic lattices need the same even cell count on every axis",
            ));
        }
        if let Some(side_chains) = &self.side_chains {
            side_chains.validate()?;
        }

        let mut backbone = self.backbone.unwrap_or_else(RoleSpec::backbone);
        backbone.atom.role = AtomRole::Backbone;

        Ok(HydrogelConfig {
            seed: self.seed.unwrap_or(0),
            mean_sep,
            segment_length,
            cells,
            pbc,
            cuts: self.cuts.unwrap_or(0),
            backbone,
            linkers: self.linkers.unwrap_or_default(),
            angles: self.angles.unwrap_or_default(),
            side_chains: self.side_chains,
            build_angles: self.build_angles.unwrap_or(true),
        })
    }
}

/// Angle parameters applied when any atom type of a triple is listed in `atom_types`.
#[derive(Debug, Clone, PartialEq)]
pub struct AngleRule {
    pub atom_types: BTreeSet<String>,
    pub params: AngleParams,
}

impl AngleRule {
    pub fn new<I, S>(atom_types: I, params: AngleParams) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            atom_types: atom_types.into_iter().map(Into::into).collect(),
            params,
        }
    }

    pub fn matches<'a>(&self, mut types: impl Iterator<Item = &'a str>) -> bool {
        types.any(|t| self.atom_types.contains(t))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PolymerConfig {
    pub seed: u64,
    pub mean_sep: f64,
    /// Number of backbone beads.
    pub monomers: usize,
    /// Number of independent chains; chain `i` is seeded with `seed + i`.
    pub chains: usize,
    pub backbone: RoleSpec,
    /// One side bead per backbone bead when set.
    pub side_bead: Option<RoleSpec>,
    /// Attempts per side bead before accepting an overlapping position.
    pub overlap_check_limit: usize,
    /// Ordered rules; the first match wins.
    pub angle_rules: Vec<AngleRule>,
    pub default_angle: AngleParams,
    pub build_angles: bool,
}

#[derive(Default)]
pub struct PolymerConfigBuilder {
    seed: Option<u64>,
    mean_sep: Option<f64>,
    monomers: Option<usize>,
    chains: Option<usize>,
    backbone: Option<RoleSpec>,
    side_bead: Option<RoleSpec>,
    overlap_check_limit: Option<usize>,
    angle_rules: Vec<AngleRule>,
    default_angle: Option<AngleParams>,
    build_angles: Option<bool>,
}

impl PolymerConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
    pub fn mean_sep(mut self, mean_sep: f64) -> Self {
        self.mean_sep = Some(mean_sep);
        self
    }
    pub fn monomers(mut self, count: usize) -> Self {
        self.monomers = Some(count);
        self
    }
    pub fn chains(mut self, count: usize) -> Self {
        self.chains = Some(count);
        self
    }
    pub fn backbone(mut self, role: RoleSpec) -> Self {
        self.backbone = Some(role);
        self
    }
    pub fn side_bead(mut self, role: RoleSpec) -> Self {
        self.side_bead = Some(role);
        self
    }
    pub fn overlap_check_limit(mut self, limit: usize) -> Self {
        self.overlap_check_limit = Some(limit);
        self
    }
    pub fn angle_rule(mut self, rule: AngleRule) -> Self {
        self.angle_rules.push(rule);
        self
    }
    pub fn default_angle(mut self, params: AngleParams) -> Self {
        self.default_angle = Some(params);
        self
    }
    pub fn build_angles(mut self, enabled: bool) -> Self {
        self.build_angles = Some(enabled);
        self
    }

    pub fn build(self) -> Result<PolymerConfig, ConfigError> {
        let mean_sep = self.mean_sep.unwrap_or(DEFAULT_MEAN_SEP);
        if !(mean_sep > 0.0) {
            return Err(invalid("mean_sep", "must be positive"));
        }
        let monomers = self
            .monomers
            .ok_or(ConfigError::MissingParameter("monomers"))?;
        if monomers == 0 {
            return Err(invalid("monomers", "must be at least 1"));
        }
        let chains = self.chains.unwrap_or(1);
        if chains == 0 {
            return Err(invalid("chains", "must be at least 1"));
        }
        let overlap_check_limit = self.overlap_check_limit.unwrap_or(1000);
        if overlap_check_limit == 0 {
            return Err(invalid("overlap_check_limit", "must be at least 1"));
        }

        let mut backbone = self.backbone.unwrap_or_else(RoleSpec::backbone);
        backbone.atom.role = AtomRole::Backbone;
        let side_bead = self.side_bead.map(|mut role| {
            role.atom.role = AtomRole::Sidechain;
            role
        });

        Ok(PolymerConfig {
            seed: self.seed.unwrap_or(0),
            mean_sep,
            monomers,
            chains,
            backbone,
            side_bead,
            overlap_check_limit,
            angle_rules: self.angle_rules,
            default_angle: self.default_angle.unwrap_or_default(),
            build_angles: self.build_angles.unwrap_or(true),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::monomers::definition::{
        BeadDefinition, BondAnchor, MonomerBond, MonomerDefinition,
    };

    fn monomer(id: &str, ratio: f64) -> MonomerEntry {
        MonomerEntry {
            definition: MonomerDefinition {
                id: id.to_string(),
                residue_name: id.to_string(),
                beads: vec![BeadDefinition {
                    bead_type: "P5".to_string(),
                    name: "S1".to_string(),
                    mass: 72.0,
                    charge: 0.0,
                }],
                bonds: vec![MonomerBond {
                    from: BondAnchor::Backbone,
                    to: 0,
                    params: BondParams::default(),
                }],
            },
            ratio,
        }
    }

    mod hydrogel {
        use super::*;

        #[test]
        fn build_applies_defaults() {
            let config = HydrogelConfigBuilder::new()
                .segment_length(10)
                .cells([2, 2, 2])
                .build()
                .unwrap();
            assert_eq!(config.mean_sep, 0.24);
            assert!(config.pbc);
            assert_eq!(config.cuts, 0);
            assert_eq!(config.backbone.atom.role, AtomRole::Backbone);
            assert_eq!(config.linkers.periodic_link.atom.role, AtomRole::Crosslinker);
            assert_eq!(config.angles.backbone_branch.theta0, 90.0);
            assert!(config.side_chains.is_none());
        }

        #[test]
        fn build_reports_missing_required_parameters() {
            let err = HydrogelConfigBuilder::new().cells([2, 2, 2]).build().unwrap_err();
            assert_eq!(err, ConfigError::MissingParameter("segment_length"));
            let err = HydrogelConfigBuilder::new().segment_length(4).build().unwrap_err();
            assert_eq!(err, ConfigError::MissingParameter("cells"));
        }

        #[test]
        fn build_rejects_invalid_lattice_parameters() {
            let base = || HydrogelConfigBuilder::new().segment_length(4);
            assert!(matches!(
                base().cells([2, 2, 2]).mean_sep(0.0).build(),
                Err(ConfigError::InvalidParameter { name: "mean_sep", .. })
            ));
            assert!(matches!(
                base().cells([2, 0, 2]).build(),
                Err(ConfigError::InvalidParameter { name: "cells", .. })
            ));
            assert!(matches!(
                base().cells([3, 3, 3]).build(),
                Err(ConfigError::InvalidParameter { name: "cells", .. })
            ));
            assert!(matches!(
                base().cells([2, 4, 2]).build(),
                Err(ConfigError::InvalidParameter { name: "cells", .. })
            ));
            assert!(base().cells([3, 1, 2]).pbc(false).build().is_ok());
        }

        #[test]
        fn build_validates_side_chain_palette() {
            let base = || HydrogelConfigBuilder::new().segment_length(4).cells([2, 2, 2]);

            let empty = SideChainConfig::new(Vec::new(), SequenceStrategy::Random);
            assert!(base().side_chains(empty).build().is_err());

            let zero = SideChainConfig::new(vec![monomer("A", 0.0)], SequenceStrategy::Random);
            assert!(base().side_chains(zero).build().is_err());

            let unknown_blocks = SideChainConfig::new(
                vec![monomer("A", 1.0)],
                SequenceStrategy::Block(vec![("B".to_string(), 2)]),
            );
            assert!(base().side_chains(unknown_blocks).build().is_err());

            let good = SideChainConfig::new(
                vec![monomer("A", 1.0), monomer("B", 0.0)],
                SequenceStrategy::Alternating,
            );
            assert!(base().side_chains(good).build().is_ok());
        }
    }

    mod polymer {
        use super::*;

        #[test]
        fn build_requires_monomer_count() {
            assert_eq!(
                PolymerConfigBuilder::new().build().unwrap_err(),
                ConfigError::MissingParameter("monomers")
            );
            assert!(PolymerConfigBuilder::new().monomers(0).build().is_err());
        }

        #[test]
        fn chain_count_defaults_to_one_and_rejects_zero() {
            let config = PolymerConfigBuilder::new().monomers(4).build().unwrap();
            assert_eq!(config.chains, 1);
            assert!(matches!(
                PolymerConfigBuilder::new().monomers(4).chains(0).build(),
                Err(ConfigError::InvalidParameter { .. })
            ));
        }

        #[test]
        fn build_forces_roles_and_keeps_rule_order() {
            let config = PolymerConfigBuilder::new()
                .monomers(10)
                .side_bead(RoleSpec::new(AtomTemplate::default(), BondParams::default()))
                .angle_rule(AngleRule::new(["Nda"], AngleParams::new(2, 120.0, 25.0)))
                .angle_rule(AngleRule::new(["C1", "P5"], AngleParams::new(2, 100.0, 10.0)))
                .build()
                .unwrap();
            assert_eq!(config.side_bead.unwrap().atom.role, AtomRole::Sidechain);
            assert_eq!(config.angle_rules[0].params.theta0, 120.0);
            assert_eq!(config.overlap_check_limit, 1000);
        }

        #[test]
        fn angle_rule_matches_on_any_shared_type() {
            let rule = AngleRule::new(["Nda", "P5"], AngleParams::default());
            assert!(rule.matches(["C1", "P5", "C1"].into_iter()));
            assert!(!rule.matches(["C1", "C1", "C1"].into_iter()));
        }
    }
}
