use super::write_structure;
use crate::cli::HydrogelArgs;
use crate::config::PartialHydrogelConfig;
use crate::error::Result;
use crate::utils::progress::{CliProgressHandler, describe_summary};
use gelbuild::core::io::report::PBC_REPORT_FILE_NAME;
use gelbuild::engine::progress::ProgressReporter;
use gelbuild::workflows;
use tracing::info;

pub fn run(args: HydrogelArgs) -> Result<()> {
    let partial_config = PartialHydrogelConfig::from_file(&args.config)?;
    info!("Merging configuration from file and CLI arguments...");
    let (config, output) = partial_config.merge_with_cli(&args)?;
    info!(
        segment_length = config.segment_length,
        cells = ?config.cells,
        pbc = config.pbc,
        cuts = config.cuts,
        seed = config.seed,
        "Hydrogel configuration resolved."
    );

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!("Building hydrogel network...");
    let build = workflows::hydrogel::run(&config, &reporter)?;

    write_structure(&build.world, &output)?;
    if config.pbc {
        let report_path = output.directory.join(PBC_REPORT_FILE_NAME);
        build.stitch.pbc_bonds.write_to_path(&report_path)?;
        info!(
            "Wrote {} periodic bonds to {}",
            build.stitch.pbc_bonds.len(),
            report_path.display()
        );
    }

    println!(
        "✓ {}: {} written to {}",
        output.name,
        describe_summary(&build.summary),
        output.directory.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;

    #[test]
    fn writes_network_files_and_periodic_report() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("gel.toml");
        std::fs::write(
            &config_path,
            "[network]\nseed = 5\nsegment-length = 4\n\n[output]\nname = \"gel\"\n",
        )
        .unwrap();
        let out_dir = dir.path().join("out");

        let cli = Cli::parse_from([
            "gelbuild",
            "hydrogel",
            "-c",
            config_path.to_str().unwrap(),
            "-o",
            out_dir.to_str().unwrap(),
            "--cuts",
            "2",
        ]);
        let Commands::Hydrogel(args) = cli.command else {
            panic!("Expected 'hydrogel' subcommand");
        };
        run(args).unwrap();

        let gro = std::fs::read_to_string(out_dir.join("gel.gro")).unwrap();
        assert_eq!(gro.lines().nth(1).unwrap().trim(), "112");
        assert!(out_dir.join("gel.itp").exists());
        let report = std::fs::read_to_string(out_dir.join(PBC_REPORT_FILE_NAME)).unwrap();
        assert!(report.starts_with("Atom ID starts from 1"));
        assert!(!out_dir.join("gel.xyz").exists());
    }

    #[test]
    fn open_network_skips_periodic_report() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("gel.toml");
        std::fs::write(
            &config_path,
            "[network]\nsegment-length = 4\ncells = [1, 1, 1]\npbc = false\n",
        )
        .unwrap();

        let cli = Cli::parse_from([
            "gelbuild",
            "hydrogel",
            "-c",
            config_path.to_str().unwrap(),
            "-o",
            dir.path().to_str().unwrap(),
            "--xyz",
            "--lammps",
        ]);
        let Commands::Hydrogel(args) = cli.command else {
            panic!("Expected 'hydrogel' subcommand");
        };
        run(args).unwrap();

        assert!(dir.path().join("hydrogel.gro").exists());
        assert!(dir.path().join("hydrogel.xyz").exists());
        assert!(dir.path().join("hydrogel.data").exists());
        assert!(!dir.path().join(PBC_REPORT_FILE_NAME).exists());
    }
}
