use anyhow::Result;
use aspect_weave::ajc::Ajc;
use aspect_weave::artifact::{self, Artifact};
use aspect_weave::cli::{Cli, Commands, OutputFormat};
use aspect_weave::config::{WeaveConfig, resolve_ajc_path};
use aspect_weave::output::{DirOutputProvider, OutputProvider};
use aspect_weave::transform::{WeaveReport, WeaveTransform};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command.clone() {
        Commands::Clean => {
            init_tracing(false);
            let outputs = DirOutputProvider::new(resolve_output(&cli));
            outputs.clean()?;
        }
        Commands::PrintConfig => {
            init_tracing(false);
            let config = resolve_config(&cli)?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        Commands::Weave {
            inputs,
            references,
            scan,
            scan_references,
            format,
            verbose,
        } => {
            let mut config = resolve_config(&cli)?;
            if verbose {
                config.verbose = true;
            }
            init_tracing(config.verbose);

            let primary = collect_artifacts(&inputs, &scan)?;
            let referenced = collect_artifacts(&references, &scan_references)?;

            let ajc = Ajc::new(resolve_ajc_path(cli.ajc.clone())?);
            let outputs = DirOutputProvider::new(resolve_output(&cli));
            let transform = WeaveTransform::new(config, &ajc, &outputs);
            let report = transform.run(&primary, &referenced)?;
            write_report(&report, format)?;
        }
    }

    Ok(())
}

fn resolve_config(cli: &Cli) -> Result<WeaveConfig> {
    if let Some(path) = cli.config.clone() {
        return WeaveConfig::load(&path);
    }

    let default_path = Path::new("aspect-weave.json");
    if default_path.exists() {
        return WeaveConfig::load(default_path);
    }
    Ok(WeaveConfig::default())
}

fn resolve_output(cli: &Cli) -> PathBuf {
    cli.output
        .clone()
        .unwrap_or_else(|| PathBuf::from("build/aspect-weave"))
}

// Logs go to stderr so the report on stdout stays machine-readable.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("trace")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn collect_artifacts(explicit: &[PathBuf], scan_roots: &[PathBuf]) -> Result<Vec<Artifact>> {
    let mut artifacts = Vec::new();
    for path in explicit {
        artifacts.push(Artifact::from_path(path)?);
    }
    for root in scan_roots {
        for jar in artifact::scan_archives(root)? {
            artifacts.push(Artifact::from_path(&jar)?);
        }
    }
    Ok(artifacts)
}

fn write_report(report: &WeaveReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
        OutputFormat::Text => {
            println!("woven_artifacts: {}", report.woven_artifacts);
            println!("excluded_artifacts: {}", report.excluded_artifacts);
            println!("referenced_artifacts: {}", report.referenced_artifacts);
            println!("woven_classes: {}", report.woven_classes);
            println!("errors: {}", report.diagnostics.errors);
            println!("warnings: {}", report.diagnostics.warnings);
            println!("duration_ms: {}", report.duration_ms);
            println!("output_dir: {}", report.output_dir);
            if report.skipped {
                println!("skipped: true");
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_output_prefers_explicit_flag() {
        let cli = Cli::parse_from([
            "aspect-weave",
            "--output",
            "/tmp/woven",
            "clean",
        ]);
        assert_eq!(resolve_output(&cli), PathBuf::from("/tmp/woven"));

        let cli = Cli::parse_from(["aspect-weave", "clean"]);
        assert_eq!(resolve_output(&cli), PathBuf::from("build/aspect-weave"));
    }

    #[test]
    fn collect_artifacts_fails_on_missing_input() {
        let missing = PathBuf::from("/definitely/not/here.jar");
        assert!(collect_artifacts(&[missing], &[]).is_err());
    }
}
