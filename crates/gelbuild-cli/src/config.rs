use crate::cli::{HydrogelArgs, OutputArgs, PolymerArgs};
use crate::error::{CliError, Result};
use gelbuild::core::io::gro::GroMetadata;
use gelbuild::core::models::topology::{AngleParams, BondParams};
use gelbuild::core::monomers::library::{MonomerLibrary, RawMonomer};
use gelbuild::core::monomers::sequence::SequenceStrategy;
use gelbuild::engine::config::{self as core_config, RoleSpec};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

fn load_toml<T: DeserializeOwned>(path: &Path) -> Result<T> {
    debug!("Loading configuration from file: {:?}", path);
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|e| CliError::FileParsing {
        path: path.to_path_buf(),
        source: e.into(),
    })
}

fn split_assignment(kv_pair: &str) -> Result<(&str, &str)> {
    kv_pair.split_once('=').ok_or_else(|| {
        CliError::Config(format!(
            "Invalid --set format: '{}'. Expected KEY=VALUE.",
            kv_pair
        ))
    })
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| CliError::Config(format!("Invalid value for {}: {}", key, value)))
}

fn unsupported_key(key: &str) -> CliError {
    CliError::Config(format!(
        "Unsupported configuration key for --set: '{}'",
        key
    ))
}

fn config_dir(config_path: &Path) -> &Path {
    config_path.parent().unwrap_or_else(|| Path::new("."))
}

/// Where and under which names the generated files are written.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSettings {
    pub directory: PathBuf,
    /// Base file name shared by the `.gro`, `.itp` and `.xyz` files.
    pub name: String,
    pub title: String,
    /// Name written to the topology's `[ moleculetype ]` section.
    pub molecule: String,
    pub xyz: bool,
    /// Also write a LAMMPS data file.
    pub lammps: bool,
}

impl OutputSettings {
    pub fn path_with_extension(&self, extension: &str) -> PathBuf {
        self.directory.join(format!("{}.{}", self.name, extension))
    }

    /// Settings for the `index`-th of several structures, named `<name>_<index>`.
    pub fn indexed(&self, index: usize) -> Self {
        Self {
            name: format!("{}_{}", self.name, index),
            ..self.clone()
        }
    }
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialOutput {
    directory: Option<PathBuf>,
    name: Option<String>,
    title: Option<String>,
    molecule: Option<String>,
    xyz: Option<bool>,
    lammps: Option<bool>,
}

impl PartialOutput {
    fn set(&mut self, field: &str, key: &str, value: &str) -> Result<()> {
        match field {
            "directory" => self.directory = Some(PathBuf::from(value)),
            "name" => self.name = Some(value.to_string()),
            "title" => self.title = Some(value.to_string()),
            "molecule" => self.molecule = Some(value.to_string()),
            "xyz" => self.xyz = Some(parse_value(key, value)?),
            "lammps" => self.lammps = Some(parse_value(key, value)?),
            _ => return Err(unsupported_key(key)),
        }
        Ok(())
    }

    fn merge(self, args: &OutputArgs, default_name: &str, default_molecule: &str) -> OutputSettings {
        OutputSettings {
            directory: args
                .output_dir
                .clone()
                .or(self.directory)
                .unwrap_or_else(|| PathBuf::from(".")),
            name: args
                .name
                .clone()
                .or(self.name)
                .unwrap_or_else(|| default_name.to_string()),
            title: self.title.unwrap_or_else(|| GroMetadata::default().title),
            molecule: self
                .molecule
                .unwrap_or_else(|| default_molecule.to_string()),
            xyz: args.xyz || self.xyz.unwrap_or(false),
            lammps: args.lammps || self.lammps.unwrap_or(false),
        }
    }
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialBond {
    funct: Option<u8>,
    length: Option<f64>,
    force_constant: Option<f64>,
}

impl PartialBond {
    fn apply(self, base: BondParams) -> BondParams {
        BondParams {
            funct: self.funct.unwrap_or(base.funct),
            length: self.length.unwrap_or(base.length),
            force_constant: self.force_constant.unwrap_or(base.force_constant),
        }
    }
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialAngle {
    funct: Option<u8>,
    theta0: Option<f64>,
    force_constant: Option<f64>,
}

impl PartialAngle {
    fn apply(self, base: AngleParams) -> AngleParams {
        AngleParams {
            funct: self.funct.unwrap_or(base.funct),
            theta0: self.theta0.unwrap_or(base.theta0),
            force_constant: self.force_constant.unwrap_or(base.force_constant),
        }
    }
}

fn angle(partial: Option<PartialAngle>, base: AngleParams) -> AngleParams {
    partial.map_or(base, |p| p.apply(base))
}

/// Attribute overrides for one role; unset fields keep the role's defaults.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialRole {
    #[serde(rename = "type")]
    bead_type: Option<String>,
    residue_number: Option<isize>,
    residue_name: Option<String>,
    atom_name: Option<String>,
    charge_group: Option<i32>,
    mass: Option<f64>,
    charge: Option<f64>,
    bond: Option<PartialBond>,
}

impl PartialRole {
    fn apply(self, base: RoleSpec) -> RoleSpec {
        let mut atom = base.atom;
        if let Some(bead_type) = self.bead_type {
            atom.bead_type = bead_type;
        }
        if let Some(residue_number) = self.residue_number {
            atom.residue_number = residue_number;
        }
        if let Some(residue_name) = self.residue_name {
            atom.residue_name = residue_name;
        }
        if let Some(atom_name) = self.atom_name {
            atom.atom_name = atom_name;
        }
        atom.charge_group = self.charge_group.unwrap_or(atom.charge_group);
        atom.mass = self.mass.unwrap_or(atom.mass);
        atom.charge = self.charge.unwrap_or(atom.charge);
        let bond = self.bond.map_or(base.bond, |b| b.apply(base.bond));
        RoleSpec::new(atom, bond)
    }
}

fn role(partial: Option<PartialRole>, base: RoleSpec) -> RoleSpec {
    match partial {
        Some(p) => p.apply(base),
        None => base,
    }
}

// --- Hydrogel ---

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialNetwork {
    seed: Option<u64>,
    mean_sep: Option<f64>,
    segment_length: Option<usize>,
    cells: Option<[usize; 3]>,
    pbc: Option<bool>,
    cuts: Option<usize>,
    build_angles: Option<bool>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialHydrogelRoles {
    backbone: Option<PartialRole>,
    bridge_end: Option<PartialRole>,
    bridge_midpoint: Option<PartialRole>,
    link_end: Option<PartialRole>,
    periodic_link: Option<PartialRole>,
}

impl PartialHydrogelRoles {
    fn linkers(self) -> core_config::LinkerRoles {
        let defaults = core_config::LinkerRoles::default();
        core_config::LinkerRoles {
            bridge_end: role(self.bridge_end, defaults.bridge_end),
            bridge_midpoint: role(self.bridge_midpoint, defaults.bridge_midpoint),
            link_end: role(self.link_end, defaults.link_end),
            periodic_link: role(self.periodic_link, defaults.periodic_link),
        }
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialHydrogelAngles {
    backbone_straight: Option<PartialAngle>,
    backbone_branch: Option<PartialAngle>,
    side_straight: Option<PartialAngle>,
    default: Option<PartialAngle>,
}

impl PartialHydrogelAngles {
    fn resolve(self) -> core_config::HydrogelAngleParams {
        let defaults = core_config::HydrogelAngleParams::default();
        core_config::HydrogelAngleParams {
            backbone_straight: angle(self.backbone_straight, defaults.backbone_straight),
            backbone_branch: angle(self.backbone_branch, defaults.backbone_branch),
            side_straight: angle(self.side_straight, defaults.side_straight),
            default: angle(self.default, defaults.default),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
struct PartialBlock {
    monomer: String,
    size: usize,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case", tag = "type")]
enum PartialStrategy {
    Random,
    Alternating,
    Block { blocks: Vec<PartialBlock> },
}

impl From<PartialStrategy> for SequenceStrategy {
    fn from(p: PartialStrategy) -> Self {
        match p {
            PartialStrategy::Random => SequenceStrategy::Random,
            PartialStrategy::Alternating => SequenceStrategy::Alternating,
            PartialStrategy::Block { blocks } => SequenceStrategy::Block(
                blocks
                    .into_iter()
                    .map(|block| (block.monomer, block.size))
                    .collect(),
            ),
        }
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialSideChains {
    strategy: Option<PartialStrategy>,
    /// A TOML file of `[[monomer]]` tables, relative to the config file.
    library: Option<PathBuf>,
    #[serde(default)]
    monomer: Vec<RawMonomer>,
    candidates: Option<usize>,
    overlap_factor: Option<f64>,
    search_radius_factor: Option<f64>,
}

impl PartialSideChains {
    fn resolve(self, base_dir: &Path) -> Result<core_config::SideChainConfig> {
        let mut palette = match &self.library {
            Some(path) => MonomerLibrary::load_toml(base_dir.join(path))?,
            None => Vec::new(),
        };
        palette.extend(MonomerLibrary::resolve_all(&self.monomer, base_dir)?);
        debug!(monomers = palette.len(), "Resolved side-chain palette.");

        let strategy = self.strategy.map(Into::into).unwrap_or_default();
        let mut config = core_config::SideChainConfig::new(palette, strategy);
        if let Some(candidates) = self.candidates {
            config.candidates = candidates;
        }
        if let Some(factor) = self.overlap_factor {
            config.overlap_factor = factor;
        }
        if let Some(factor) = self.search_radius_factor {
            config.search_radius_factor = factor;
        }
        Ok(config)
    }
}

/// Hydrogel configuration as written in the TOML file; every field is optional until merged.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct PartialHydrogelConfig {
    output: Option<PartialOutput>,
    network: Option<PartialNetwork>,
    roles: Option<PartialHydrogelRoles>,
    angles: Option<PartialHydrogelAngles>,
    side_chains: Option<PartialSideChains>,
}

impl PartialHydrogelConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        load_toml(path)
    }

    pub fn merge_with_cli(
        mut self,
        args: &HydrogelArgs,
    ) -> Result<(core_config::HydrogelConfig, OutputSettings)> {
        self.apply_set_values(&args.set_values)?;

        let network = self.network.take().unwrap_or_default();
        let mut roles = self.roles.take().unwrap_or_default();
        let backbone = role(roles.backbone.take(), RoleSpec::backbone());

        let cells = match &args.cells {
            Some(values) => <[usize; 3]>::try_from(values.as_slice()).map_err(|_| {
                CliError::Argument(format!(
                    "--cells expects three comma-separated values, got {}",
                    values.len()
                ))
            })?,
            None => network.cells.unwrap_or([2, 2, 2]),
        };

        let mut builder = core_config::HydrogelConfigBuilder::new()
            .seed(args.seed.or(network.seed).unwrap_or(0))
            .cells(cells)
            .pbc(!args.no_pbc && network.pbc.unwrap_or(true))
            .cuts(args.cuts.or(network.cuts).unwrap_or(0))
            .build_angles(!args.no_angles && network.build_angles.unwrap_or(true))
            .backbone(backbone)
            .linkers(roles.linkers())
            .angles(self.angles.take().unwrap_or_default().resolve());
        if let Some(segment_length) = network.segment_length {
            builder = builder.segment_length(segment_length);
        }
        if let Some(mean_sep) = network.mean_sep {
            builder = builder.mean_sep(mean_sep);
        }
        if let Some(side_chains) = self.side_chains.take() {
            builder = builder.side_chains(side_chains.resolve(config_dir(&args.config))?);
        }

        let config = builder.build().map_err(|e| CliError::Config(e.to_string()))?;
        let output = self
            .output
            .unwrap_or_default()
            .merge(&args.output, "hydrogel", "HDGEL");
        Ok((config, output))
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let (key, value) = split_assignment(kv_pair)?;
            match key.split_once('.') {
                Some(("output", field)) => {
                    self.output
                        .get_or_insert_with(Default::default)
                        .set(field, key, value)?;
                }
                Some(("network", field)) => {
                    let network = self.network.get_or_insert_with(Default::default);
                    match field {
                        "seed" => network.seed = Some(parse_value(key, value)?),
                        "mean-sep" => network.mean_sep = Some(parse_value(key, value)?),
                        "segment-length" => {
                            network.segment_length = Some(parse_value(key, value)?)
                        }
                        "pbc" => network.pbc = Some(parse_value(key, value)?),
                        "cuts" => network.cuts = Some(parse_value(key, value)?),
                        "build-angles" => network.build_angles = Some(parse_value(key, value)?),
                        _ => return Err(unsupported_key(key)),
                    }
                }
                Some(("side-chains", field)) => {
                    let side_chains = self.side_chains.get_or_insert_with(Default::default);
                    match field {
                        "candidates" => side_chains.candidates = Some(parse_value(key, value)?),
                        "overlap-factor" => {
                            side_chains.overlap_factor = Some(parse_value(key, value)?)
                        }
                        "search-radius-factor" => {
                            side_chains.search_radius_factor = Some(parse_value(key, value)?)
                        }
                        _ => return Err(unsupported_key(key)),
                    }
                }
                _ => return Err(unsupported_key(key)),
            }
        }
        Ok(())
    }
}

// --- Polymer ---

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialChain {
    seed: Option<u64>,
    mean_sep: Option<f64>,
    monomers: Option<usize>,
    count: Option<usize>,
    overlap_check_limit: Option<usize>,
    side_beads: Option<bool>,
    build_angles: Option<bool>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialPolymerRoles {
    backbone: Option<PartialRole>,
    side_bead: Option<PartialRole>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialAngleRule {
    types: Vec<String>,
    funct: Option<u8>,
    theta0: Option<f64>,
    force_constant: Option<f64>,
}

impl From<PartialAngleRule> for core_config::AngleRule {
    fn from(p: PartialAngleRule) -> Self {
        let params = PartialAngle {
            funct: p.funct,
            theta0: p.theta0,
            force_constant: p.force_constant,
        }
        .apply(AngleParams::default());
        core_config::AngleRule::new(p.types, params)
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialPolymerAngles {
    default: Option<PartialAngle>,
    #[serde(default)]
    rule: Vec<PartialAngleRule>,
}

/// Polymer configuration as written in the TOML file.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct PartialPolymerConfig {
    output: Option<PartialOutput>,
    chain: Option<PartialChain>,
    roles: Option<PartialPolymerRoles>,
    angles: Option<PartialPolymerAngles>,
}

impl PartialPolymerConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        load_toml(path)
    }

    /// Side beads are enabled by `chain.side-beads`, or implicitly by a `[roles.side-bead]`
    /// table when the flag is absent.
    pub fn merge_with_cli(
        mut self,
        args: &PolymerArgs,
    ) -> Result<(core_config::PolymerConfig, OutputSettings)> {
        self.apply_set_values(&args.set_values)?;

        let chain = self.chain.take().unwrap_or_default();
        let roles = self.roles.take().unwrap_or_default();
        let angles = self.angles.take().unwrap_or_default();

        let mut builder = core_config::PolymerConfigBuilder::new()
            .seed(args.seed.or(chain.seed).unwrap_or(0))
            .backbone(role(roles.backbone, RoleSpec::backbone()))
            .default_angle(angle(angles.default, AngleParams::default()))
            .build_angles(!args.no_angles && chain.build_angles.unwrap_or(true));
        if let Some(monomers) = args.monomers.or(chain.monomers) {
            builder = builder.monomers(monomers);
        }
        if let Some(count) = args.count.or(chain.count) {
            builder = builder.chains(count);
        }
        if let Some(mean_sep) = chain.mean_sep {
            builder = builder.mean_sep(mean_sep);
        }
        if let Some(limit) = chain.overlap_check_limit {
            builder = builder.overlap_check_limit(limit);
        }
        if chain.side_beads.unwrap_or(roles.side_bead.is_some()) {
            builder = builder.side_bead(role(roles.side_bead, RoleSpec::side_chain()));
        }
        for rule in angles.rule {
            builder = builder.angle_rule(rule.into());
        }

        let config = builder.build().map_err(|e| CliError::Config(e.to_string()))?;
        let output = self
            .output
            .unwrap_or_default()
            .merge(&args.output, "polymer", "POLYMER");
        Ok((config, output))
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let (key, value) = split_assignment(kv_pair)?;
            match key.split_once('.') {
                Some(("output", field)) => {
                    self.output
                        .get_or_insert_with(Default::default)
                        .set(field, key, value)?;
                }
                Some(("chain", field)) => {
                    let chain = self.chain.get_or_insert_with(Default::default);
                    match field {
                        "seed" => chain.seed = Some(parse_value(key, value)?),
                        "mean-sep" => chain.mean_sep = Some(parse_value(key, value)?),
                        "monomers" => chain.monomers = Some(parse_value(key, value)?),
                        "count" => chain.count = Some(parse_value(key, value)?),
                        "overlap-check-limit" => {
                            chain.overlap_check_limit = Some(parse_value(key, value)?)
                        }
                        "side-beads" => chain.side_beads = Some(parse_value(key, value)?),
                        "build-angles" => chain.build_angles = Some(parse_value(key, value)?),
                        _ => return Err(unsupported_key(key)),
                    }
                }
                _ => return Err(unsupported_key(key)),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use gelbuild::core::models::atom::AtomRole;
    use std::fs;
    use tempfile::{TempDir, tempdir};

    fn write_config_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let file_path = dir.path().join(name);
        fs::write(&file_path, content).unwrap();
        file_path
    }

    fn hydrogel_args(config_path: &Path, extra: &[&str]) -> HydrogelArgs {
        let mut args = vec!["gelbuild", "hydrogel", "-c", config_path.to_str().unwrap()];
        args.extend_from_slice(extra);
        match Cli::parse_from(args).command {
            Commands::Hydrogel(args) => args,
            _ => panic!("Expected 'hydrogel' subcommand"),
        }
    }

    fn polymer_args(config_path: &Path, extra: &[&str]) -> PolymerArgs {
        let mut args = vec!["gelbuild", "polymer", "-c", config_path.to_str().unwrap()];
        args.extend_from_slice(extra);
        match Cli::parse_from(args).command {
            Commands::Polymer(args) => args,
            _ => panic!("Expected 'polymer' subcommand"),
        }
    }

    mod hydrogel {
        use super::*;

        #[test]
        fn file_values_merge_with_defaults() {
            let dir = tempdir().unwrap();
            let path = write_config_file(
                &dir,
                "gel.toml",
                r#"
                [network]
                seed = 11
                segment-length = 8

                [roles.backbone]
                type = "SN0"
                mass = 54.0
                bond = { length = 0.3 }
                "#,
            );

            let (config, output) = PartialHydrogelConfig::from_file(&path)
                .unwrap()
                .merge_with_cli(&hydrogel_args(&path, &[]))
                .unwrap();

            assert_eq!(config.seed, 11);
            assert_eq!(config.segment_length, 8);
            assert_eq!(config.cells, [2, 2, 2]);
            assert!(config.pbc);
            assert_eq!(config.cuts, 0);
            assert_eq!(config.backbone.atom.bead_type, "SN0");
            assert_eq!(config.backbone.atom.mass, 54.0);
            assert_eq!(config.backbone.atom.role, AtomRole::Backbone);
            assert_eq!(config.backbone.bond.length, 0.3);
            assert_eq!(config.backbone.bond.force_constant, 10000.0);
            assert_eq!(config.linkers, core_config::LinkerRoles::default());
            assert!(config.side_chains.is_none());

            assert_eq!(output.name, "hydrogel");
            assert_eq!(output.molecule, "HDGEL");
            assert_eq!(output.path_with_extension("gro"), PathBuf::from("./hydrogel.gro"));
        }

        #[test]
        fn cli_arguments_override_file_values() {
            let dir = tempdir().unwrap();
            let path = write_config_file(
                &dir,
                "gel.toml",
                r#"
                [output]
                name = "from-file"

                [network]
                seed = 1
                segment-length = 6
                cells = [4, 4, 4]
                cuts = 2
                "#,
            );
            let args = hydrogel_args(
                &path,
                &["--seed", "99", "--cells", "2,2,2", "--cuts", "5", "--no-pbc", "-n", "gel"],
            );

            let (config, output) = PartialHydrogelConfig::from_file(&path)
                .unwrap()
                .merge_with_cli(&args)
                .unwrap();

            assert_eq!(config.seed, 99);
            assert_eq!(config.cells, [2, 2, 2]);
            assert_eq!(config.cuts, 5);
            assert!(!config.pbc);
            assert_eq!(output.name, "gel");
        }

        #[test]
        fn set_values_override_file_values() {
            let dir = tempdir().unwrap();
            let path = write_config_file(
                &dir,
                "gel.toml",
                "[network]\nsegment-length = 6\n",
            );
            let args = hydrogel_args(
                &path,
                &[
                    "-S",
                    "network.segment-length=12",
                    "-S",
                    "output.xyz=true",
                    "-S",
                    "network.mean-sep=0.3",
                ],
            );

            let (config, output) = PartialHydrogelConfig::from_file(&path)
                .unwrap()
                .merge_with_cli(&args)
                .unwrap();

            assert_eq!(config.segment_length, 12);
            assert_eq!(config.mean_sep, 0.3);
            assert!(output.xyz);
        }

        #[test]
        fn missing_segment_length_is_a_config_error() {
            let dir = tempdir().unwrap();
            let path = write_config_file(&dir, "gel.toml", "[network]\nseed = 3\n");
            let result = PartialHydrogelConfig::from_file(&path)
                .unwrap()
                .merge_with_cli(&hydrogel_args(&path, &[]));
            let Err(CliError::Config(msg)) = result else {
                panic!("Expected a configuration error");
            };
            assert!(msg.contains("segment_length"));
        }

        #[test]
        fn wrong_cell_count_is_an_argument_error() {
            let dir = tempdir().unwrap();
            let path = write_config_file(&dir, "gel.toml", "[network]\nsegment-length = 6\n");
            let result = PartialHydrogelConfig::from_file(&path)
                .unwrap()
                .merge_with_cli(&hydrogel_args(&path, &["--cells", "2,2"]));
            assert!(matches!(result, Err(CliError::Argument(_))));
        }

        #[test]
        fn unknown_keys_are_rejected() {
            let dir = tempdir().unwrap();
            let path = write_config_file(
                &dir,
                "gel.toml",
                "[network]\nsegment-length = 6\nlattice = \"fcc\"\n",
            );
            assert!(matches!(
                PartialHydrogelConfig::from_file(&path),
                Err(CliError::FileParsing { .. })
            ));

            let path = write_config_file(&dir, "ok.toml", "[network]\nsegment-length = 6\n");
            let result = PartialHydrogelConfig::from_file(&path)
                .unwrap()
                .merge_with_cli(&hydrogel_args(&path, &["-S", "network.lattice=fcc"]));
            assert!(matches!(result, Err(CliError::Config(_))));
        }

        #[test]
        fn side_chains_resolve_inline_and_topology_monomers() {
            let dir = tempdir().unwrap();
            write_config_file(
                &dir,
                "peg.itp",
                "[ moleculetype ]\nPEG 1\n\n[ atoms ]\n1 SN4a 1 PEG S1 1 0.0 72.0\n2 SN4a 1 PEG S2 2 0.0 72.0\n\n[ bonds ]\n1 2 1 0.33 7000\n",
            );
            let path = write_config_file(
                &dir,
                "gel.toml",
                r#"
                [network]
                segment-length = 4

                [side-chains]
                strategy = { type = "block", blocks = [{ monomer = "PEG", size = 2 }, { monomer = "OH", size = 1 }] }
                candidates = 36

                [[side-chains.monomer]]
                id = "PEG"
                itp-file = "peg.itp"
                molecule = "PEG"

                [[side-chains.monomer]]
                id = "OH"
                beads = [{ type = "P5", name = "O1" }]
                bonds = [{ from = "backbone", to = 0, length = 0.28 }]
                "#,
            );

            let (config, _) = PartialHydrogelConfig::from_file(&path)
                .unwrap()
                .merge_with_cli(&hydrogel_args(&path, &[]))
                .unwrap();
            let side_chains = config.side_chains.unwrap();

            assert_eq!(side_chains.candidates, 36);
            assert_eq!(side_chains.palette.len(), 2);
            assert_eq!(side_chains.palette[0].definition.beads.len(), 2);
            assert_eq!(side_chains.palette[1].definition.bonds[0].params.length, 0.28);
            assert_eq!(
                side_chains.strategy,
                SequenceStrategy::Block(vec![("PEG".to_string(), 2), ("OH".to_string(), 1)])
            );
        }
    }

    mod polymer {
        use super::*;

        #[test]
        fn chain_settings_and_angle_rules_are_resolved() {
            let dir = tempdir().unwrap();
            let path = write_config_file(
                &dir,
                "chain.toml",
                r#"
                [chain]
                monomers = 20
                seed = 4

                [roles.side-bead]
                type = "Nda"

                [angles]
                default = { funct = 2, theta0 = 160.0 }

                [[angles.rule]]
                types = ["Nda"]
                funct = 2
                theta0 = 120.0
                force-constant = 25.0
                "#,
            );

            let (config, output) = PartialPolymerConfig::from_file(&path)
                .unwrap()
                .merge_with_cli(&polymer_args(&path, &[]))
                .unwrap();

            assert_eq!(config.monomers, 20);
            assert_eq!(config.seed, 4);
            let side_bead = config.side_bead.unwrap();
            assert_eq!(side_bead.atom.bead_type, "Nda");
            assert_eq!(side_bead.atom.role, AtomRole::Sidechain);
            assert_eq!(config.default_angle, AngleParams::new(2, 160.0, 75.0));
            assert_eq!(config.angle_rules.len(), 1);
            assert_eq!(config.angle_rules[0].params, AngleParams::new(2, 120.0, 25.0));
            assert_eq!(output.name, "polymer");
        }

        #[test]
        fn side_beads_can_be_disabled_explicitly() {
            let dir = tempdir().unwrap();
            let path = write_config_file(
                &dir,
                "chain.toml",
                "[chain]\nmonomers = 5\nside-beads = false\n\n[roles.side-bead]\ntype = \"Nda\"\n",
            );
            let (config, _) = PartialPolymerConfig::from_file(&path)
                .unwrap()
                .merge_with_cli(&polymer_args(&path, &[]))
                .unwrap();
            assert!(config.side_bead.is_none());
        }

        #[test]
        fn cli_monomer_count_wins_and_is_required() {
            let dir = tempdir().unwrap();
            let path = write_config_file(&dir, "chain.toml", "[chain]\nseed = 1\n");

            let result = PartialPolymerConfig::from_file(&path)
                .unwrap()
                .merge_with_cli(&polymer_args(&path, &[]));
            assert!(matches!(result, Err(CliError::Config(_))));

            let (config, _) = PartialPolymerConfig::from_file(&path)
                .unwrap()
                .merge_with_cli(&polymer_args(&path, &["-m", "12", "-S", "chain.side-beads=true"]))
                .unwrap();
            assert_eq!(config.monomers, 12);
            assert_eq!(config.side_bead, Some(RoleSpec::side_chain()));
        }

        #[test]
        fn malformed_set_value_is_rejected() {
            let dir = tempdir().unwrap();
            let path = write_config_file(&dir, "chain.toml", "[chain]\nmonomers = 5\n");
            let result = PartialPolymerConfig::from_file(&path)
                .unwrap()
                .merge_with_cli(&polymer_args(&path, &["-S", "chain.monomers"]));
            assert!(matches!(result, Err(CliError::Config(_))));
        }

        #[test]
        fn chain_count_comes_from_file_or_cli() {
            let dir = tempdir().unwrap();
            let path = write_config_file(
                &dir,
                "chain.toml",
                "[chain]\nmonomers = 5\ncount = 3\n\n[output]\nlammps = true\n",
            );

            let (config, output) = PartialPolymerConfig::from_file(&path)
                .unwrap()
                .merge_with_cli(&polymer_args(&path, &[]))
                .unwrap();
            assert_eq!(config.chains, 3);
            assert!(output.lammps);
            assert_eq!(output.indexed(2).name, "polymer_2");
            assert_eq!(output.indexed(2).directory, output.directory);

            let (config, _) = PartialPolymerConfig::from_file(&path)
                .unwrap()
                .merge_with_cli(&polymer_args(&path, &["--count", "1"]))
                .unwrap();
            assert_eq!(config.chains, 1);

            let result = PartialPolymerConfig::from_file(&path)
                .unwrap()
                .merge_with_cli(&polymer_args(&path, &["-S", "chain.count=0"]));
            assert!(matches!(result, Err(CliError::Config(_))));
        }
    }
}
