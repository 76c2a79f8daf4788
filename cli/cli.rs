mod cli_args;
mod output;
mod remote;

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use log;
use std::path::PathBuf;
use std::process;

use cli_args::Cli;
use repodigest_core::{AppError, Analysis, AnalysisResult, EngineConfig, analyze};

fn main() {
    let cli_args = Cli::parse();

    setup_logging(cli_args.quiet, cli_args.verbose);
    let quiet = cli_args.quiet;

    log::debug!("CLI args parsed: {:?}", cli_args);

    let exit_code = match run_app(cli_args) {
        Ok(_) => {
            log::info!("Application finished successfully.");
            0
        }
        Err(e) => {
            let exit_code = match e.downcast_ref::<AppError>() {
                Some(AppError::Config { .. }) => 1,
                Some(AppError::TomlParse(_)) => 1,
                Some(AppError::Glob(_)) => 1,
                Some(AppError::InvalidPath { .. }) => 2,
                Some(AppError::Io(_)) => 2,
                Some(AppError::FileRead { .. }) => 2,
                Some(AppError::WalkDir(_)) => 2,
                Some(AppError::Clone(_)) => 3,
                Some(AppError::JsonSerialize(_)) => 6,
                Some(_) => 1,
                None => 1,
            };

            if !quiet || exit_code == 1 {
                eprintln!("{} {:#}", "Error:".red().bold(), e);
            } else {
                log::error!("Application failed: {:#}", e);
            }

            exit_code
        }
    };
    log::debug!("Exiting with code {}", exit_code);
    process::exit(exit_code);
}

fn setup_logging(quiet: bool, verbose: u8) {
    let log_level = if quiet {
        log::LevelFilter::Off
    } else {
        match verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();
    log::trace!("Logger initialized with level: {:?}", log_level);
}

fn run_app(cli: Cli) -> Result<()> {
    let outcome = digest(&cli);

    if cli.result_json {
        let (envelope, failure) = match outcome {
            Ok(analysis) => (AnalysisResult::from_outcome(Ok(analysis)), None),
            Err(e) => (AnalysisResult::failure(&e), Some(e)),
        };
        let json = serde_json::to_string_pretty(&envelope)
            .context("Failed to serialize result envelope")?;
        output::write_output(&json, cli.output.as_deref(), cli.quiet)?;
        if let (Some(metadata), true) = (envelope.metadata.as_ref(), cli.stats) {
            output::print_stats_table(metadata, envelope.truncated);
        }
        return match failure {
            Some(e) => Err(e.into()),
            None => Ok(()),
        };
    }

    let analysis = outcome?;
    output::write_output(&analysis.content, cli.output.as_deref(), cli.quiet)?;
    if cli.stats {
        output::print_stats_table(&analysis.metadata, analysis.truncated);
    }
    Ok(())
}

/// Resolves the root (cloning if asked), loads config, applies flag
/// overrides and runs the analysis. Any clone is removed on return, or by
/// the interrupt handler if the process is stopped first.
fn digest(cli: &Cli) -> repodigest_core::Result<Analysis> {
    let clone = match &cli.remote {
        Some(url) => {
            let cleanup = remote::InterruptCleanup::install()?;
            Some(remote::shallow_clone(url, &cleanup)?)
        }
        None => None,
    };
    let root = match &clone {
        Some(repo) => repo.path().to_path_buf(),
        None => expand_path(cli.path.as_deref().unwrap_or(".")),
    };
    log::info!("Project root: {}", root.display());

    let explicit_config = cli.config.as_deref().map(expand_path);
    let config_path =
        EngineConfig::resolve_config_path(&root, explicit_config.as_deref(), cli.no_config)?;
    let config = match &config_path {
        Some(path) => EngineConfig::load_from_path(path)?,
        None => EngineConfig::default(),
    };
    let config = apply_cli_overrides(config, cli);

    analyze(&root, &config)
}

fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).as_ref())
}

fn apply_cli_overrides(mut config: EngineConfig, cli: &Cli) -> EngineConfig {
    log::trace!("Applying CLI overrides to config...");
    if let Some(format) = cli.format {
        config.render.format = format;
    }
    if cli.compress {
        config.render.compress = true;
    }
    if cli.line_numbers {
        config.render.line_numbers = true;
    }
    if let Some(chunk_lines) = cli.chunk_lines {
        config.render.chunk_lines = chunk_lines;
    }
    if let Some(max_file_bytes) = cli.max_file_bytes {
        config.render.max_file_bytes = max_file_bytes;
    }
    if let Some(max_output_bytes) = cli.max_output_bytes {
        config.render.max_output_bytes = usize::try_from(max_output_bytes).unwrap_or(usize::MAX);
    }
    if !cli.ext.is_empty() {
        config.render.extensions = cli.ext.iter().cloned().collect();
    }
    config.exclude.extend(cli.exclude.iter().cloned());
    if cli.no_gitignore {
        config.use_gitignore = false;
    }
    log::trace!("Config after CLI overrides: {:?}", config);
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use repodigest_core::OutputFormat;

    #[test]
    fn flags_override_loaded_config() {
        let cli = Cli::try_parse_from([
            "repodigest",
            "--compress",
            "-f",
            "json",
            "--chunk-lines",
            "0",
            "--ext",
            ".PY",
            "--exclude",
            "dist",
            "--no-gitignore",
            "--max-output-bytes",
            "1KB",
        ])
        .unwrap();
        let mut base = EngineConfig::default();
        base.exclude.push("build".to_string());

        let config = apply_cli_overrides(base, &cli);
        assert!(config.render.compress);
        assert_eq!(config.render.format, OutputFormat::Json);
        assert_eq!(config.render.chunk_lines, 0);
        assert_eq!(config.render.max_output_bytes, 1000);
        assert_eq!(config.exclude, vec!["build", "dist"]);
        assert!(!config.use_gitignore);

        let validated = config.validated().unwrap();
        assert!(validated.render.extensions.contains("py"));
    }

    #[test]
    fn digest_reads_local_directory() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::write(temp.path().join("lib.rs"), "pub fn x() {}\n").unwrap();
        let path = temp.path().to_string_lossy().into_owned();
        let cli = Cli::try_parse_from(["repodigest", path.as_str(), "--compress"]).unwrap();

        let analysis = digest(&cli).unwrap();
        assert_eq!(analysis.metadata.file_count, 1);
        assert!(analysis.content.contains("# FILE LIST"));
    }

    #[test]
    fn missing_explicit_config_is_a_config_error() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().to_string_lossy().into_owned();
        let cli =
            Cli::try_parse_from(["repodigest", path.as_str(), "--config", "/no/such.toml"]).unwrap();
        let err = digest(&cli).unwrap_err();
        assert_eq!(err.code(), "INVALID_CONFIG");
    }
}
