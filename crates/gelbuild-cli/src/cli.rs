use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "gelbuild - Generates coarse-grained hydrogel networks and linear polymers as GROMACS coordinate and topology files.",
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
    /// Build a diamond-lattice hydrogel network with optional cuts and side chains.
    Hydrogel(HydrogelArgs),
    /// Build one or more straight polymer chains with optional side beads.
    Polymer(PolymerArgs),
}

/// Output overrides shared by both generators.
#[derive(Args, Debug, Clone, Default)]
pub struct OutputArgs {
    /// Directory the generated files are written to.
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Base name of the generated files (e.g. `gel` gives gel.gro and gel.itp).
    #[arg(short, long, value_name = "NAME")]
    pub name: Option<String>,

    /// Also write a plain .xyz coordinate dump.
    #[arg(long)]
    pub xyz: bool,

    /// Also write a LAMMPS data file.
    #[arg(long)]
    pub lammps: bool,
}

/// Arguments for the `hydrogel` subcommand.
#[derive(Args, Debug)]
pub struct HydrogelArgs {
    /// Path to the hydrogel configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: PathBuf,

    /// Override the random seed.
    #[arg(long, value_name = "INT")]
    pub seed: Option<u64>,

    /// Override the number of unit cells per axis.
    #[arg(long, value_name = "NX,NY,NZ", value_delimiter = ',')]
    pub cells: Option<Vec<usize>>,

    /// Override the number of bonds removed after assembly.
    #[arg(long, value_name = "INT")]
    pub cuts: Option<usize>,

    /// Build an open network without periodic closure.
    #[arg(long)]
    pub no_pbc: bool,

    /// Skip angle generation.
    #[arg(long)]
    pub no_angles: bool,

    #[command(flatten)]
    pub output: OutputArgs,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S network.segment-length=8
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `polymer` subcommand.
#[derive(Args, Debug)]
pub struct PolymerArgs {
    /// Path to the polymer configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: PathBuf,

    /// Override the random seed.
    #[arg(long, value_name = "INT")]
    pub seed: Option<u64>,

    /// Override the number of backbone beads.
    #[arg(short, long, value_name = "INT")]
    pub monomers: Option<usize>,

    /// Override the number of chains; each one is written to its own indexed files.
    #[arg(long, value_name = "INT")]
    pub count: Option<usize>,

    /// Skip angle generation.
    #[arg(long)]
    pub no_angles: bool,

    #[command(flatten)]
    pub output: OutputArgs,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S chain.monomers=50
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hydrogel_arguments_parse() {
        let cli = Cli::parse_from([
            "gelbuild", "-vv", "hydrogel", "-c", "gel.toml", "--seed", "7", "--cells", "2,2,4",
            "--cuts", "3", "-o", "out", "--xyz", "-S", "network.pbc=false",
        ]);
        assert_eq!(cli.verbose, 2);
        let Commands::Hydrogel(args) = cli.command else {
            panic!("Expected 'hydrogel' subcommand");
        };
        assert_eq!(args.config, PathBuf::from("gel.toml"));
        assert_eq!(args.seed, Some(7));
        assert_eq!(args.cells, Some(vec![2, 2, 4]));
        assert_eq!(args.cuts, Some(3));
        assert_eq!(args.output.output_dir, Some(PathBuf::from("out")));
        assert!(args.output.xyz);
        assert_eq!(args.set_values, vec!["network.pbc=false".to_string()]);
    }

    #[test]
    fn polymer_arguments_parse() {
        let cli = Cli::parse_from([
            "gelbuild", "polymer", "--config", "chain.toml", "-m", "40", "--no-angles", "-q",
            "--count", "4", "--lammps",
        ]);
        assert!(cli.quiet);
        let Commands::Polymer(args) = cli.command else {
            panic!("Expected 'polymer' subcommand");
        };
        assert_eq!(args.monomers, Some(40));
        assert_eq!(args.count, Some(4));
        assert!(args.output.lammps);
        assert!(args.no_angles);
        assert!(args.output.name.is_none());
    }

    #[test]
    fn config_path_is_required() {
        assert!(Cli::try_parse_from(["gelbuild", "polymer"]).is_err());
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["gelbuild", "-q", "-v", "polymer", "-c", "x.toml"]).is_err());
    }
}
