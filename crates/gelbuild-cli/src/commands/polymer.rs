use super::write_structure;
use crate::cli::PolymerArgs;
use crate::config::PartialPolymerConfig;
use crate::error::Result;
use crate::utils::progress::{CliProgressHandler, describe_summary};
use gelbuild::engine::progress::ProgressReporter;
use gelbuild::workflows;
use tracing::{info, warn};

/// Builds every configured chain and writes it; several chains get `_1`, `_2`, ... suffixes.
pub fn run(args: PolymerArgs) -> Result<()> {
    let partial_config = PartialPolymerConfig::from_file(&args.config)?;
    info!("Merging configuration from file and CLI arguments...");
    let (config, output) = partial_config.merge_with_cli(&args)?;
    info!(
        monomers = config.monomers,
        chains = config.chains,
        side_beads = config.side_bead.is_some(),
        seed = config.seed,
        "Polymer configuration resolved."
    );

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    for index in 0..config.chains {
        let chain_output = if config.chains > 1 {
            output.indexed(index + 1)
        } else {
            output.clone()
        };
        println!("Building polymer chain {}/{}...", index + 1, config.chains);
        let build = workflows::polymer::run_chain(&config, index, &reporter)?;
        if let Some(report) = build.side_beads.filter(|report| report.overlapping > 0) {
            warn!(
                "{} side beads of chain {} still overlap a neighbor after {} attempts each.",
                report.overlapping,
                index + 1,
                config.overlap_check_limit
            );
        }

        write_structure(&build.world, &chain_output)?;
        println!(
            "✓ {}: {} written to {}",
            chain_output.name,
            describe_summary(&build.summary),
            chain_output.directory.display()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use std::path::Path;

    #[test]
    fn writes_chain_files() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("chain.toml");
        std::fs::write(
            &config_path,
            "[chain]\nmonomers = 10\nseed = 2\n\n[roles.side-bead]\ntype = \"Nda\"\n",
        )
        .unwrap();

        let cli = Cli::parse_from([
            "gelbuild",
            "polymer",
            "-c",
            config_path.to_str().unwrap(),
            "-o",
            dir.path().to_str().unwrap(),
            "-n",
            "chain",
        ]);
        let Commands::Polymer(args) = cli.command else {
            panic!("Expected 'polymer' subcommand");
        };
        run(args).unwrap();

        let gro = std::fs::read_to_string(dir.path().join("chain.gro")).unwrap();
        assert_eq!(gro.lines().count(), 2 + 20 + 1);
        let itp = std::fs::read_to_string(dir.path().join("chain.itp")).unwrap();
        assert!(itp.contains("POLYMER"));
    }

    #[test]
    fn missing_config_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let cli = Cli::parse_from([
            "gelbuild",
            "polymer",
            "-c",
            dir.path().join("absent.toml").to_str().unwrap(),
        ]);
        let Commands::Polymer(args) = cli.command else {
            panic!("Expected 'polymer' subcommand");
        };
        assert!(matches!(run(args), Err(crate::error::CliError::Io(_))));
    }

    fn polymer_cli(config_path: &Path, out: &Path, extra: &[&str]) -> PolymerArgs {
        let mut argv = vec![
            "gelbuild",
            "polymer",
            "-c",
            config_path.to_str().unwrap(),
            "-o",
            out.to_str().unwrap(),
            "-n",
            "chain",
        ];
        argv.extend_from_slice(extra);
        let Commands::Polymer(args) = Cli::parse_from(argv).command else {
            panic!("Expected 'polymer' subcommand");
        };
        args
    }

    #[test]
    fn several_chains_get_indexed_files_and_consecutive_seeds() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("chain.toml");
        std::fs::write(&config_path, "[chain]\nmonomers = 6\nseed = 2\ncount = 2\n").unwrap();

        let batch = dir.path().join("batch");
        run(polymer_cli(&config_path, &batch, &[])).unwrap();
        assert!(!batch.join("chain.gro").exists());
        let first = std::fs::read_to_string(batch.join("chain_1.gro")).unwrap();
        let second = std::fs::read_to_string(batch.join("chain_2.gro")).unwrap();
        assert!(batch.join("chain_2.itp").exists());
        assert_ne!(first, second);

        let single = dir.path().join("single");
        run(polymer_cli(&config_path, &single, &["--seed", "3", "--count", "1"])).unwrap();
        let alone = std::fs::read_to_string(single.join("chain.gro")).unwrap();
        assert_eq!(alone, second);
    }
}
