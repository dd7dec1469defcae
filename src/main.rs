//! cert-inspector - X.509 certificate and chain inspection
//!
//! This tool provides functionality for:
//! - Validating a certificate against its private key
//! - Retrieving and checking certificates from live TLS endpoints
//! - Detecting and repairing misordered certificate chains

use anyhow::{bail, Context, Result};
use cert_inspector::cli::{ChainArgs, Cli, Commands, PairArgs, UrlArgs};
use cert_inspector::config::Settings;
use cert_inspector::models::OverallStatus;
use cert_inspector::report::{JsonRenderer, ReportDocument, ReportRenderer, TextRenderer};
use cert_inspector::Inspector;
use clap::Parser;
use console::style;
use std::io::Write;
use std::path::Path;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Pin ring as the rustls provider before any TLS client is built
    let _ = rustls::crypto::ring::default_provider().install_default();

    let cli = Cli::parse();

    if cli.no_color {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }

    let default_level = if cli.verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(OverallStatus::Error) => std::process::exit(2),
        Ok(_) => {}
        Err(e) => {
            eprintln!("{} {:#}", style("Error:").red().bold(), e);
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> Result<OverallStatus> {
    let settings = match &cli.config {
        Some(path) => Settings::load_from_file(path)?,
        None => Settings::load_default()?,
    };
    let inspector = Inspector::new(settings)?;

    let renderer: Box<dyn ReportRenderer> = if cli.json {
        Box::new(JsonRenderer)
    } else {
        Box::new(TextRenderer)
    };

    let (document, extra) = match cli.command {
        Commands::Pair(args) => run_pair(&inspector, args).await?,
        Commands::Url(args) => run_url(&inspector, args).await?,
        Commands::Chain(args) => run_chain(&inspector, args)?,
    };

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&renderer.render(&document)?)?;
    if !cli.json {
        if let Some(extra) = extra {
            writeln!(stdout, "\n{}", extra)?;
        }
    }

    Ok(document.overall_status)
}

async fn run_pair(inspector: &Inspector, args: PairArgs) -> Result<(ReportDocument, Option<String>)> {
    let cert = read_input(inspector, &args.cert)?;
    let key = read_input(inspector, &args.key)?;

    let report = inspector
        .validate_cert_and_key(
            &cert,
            &key,
            args.password.as_deref(),
            args.domain.as_deref(),
            !args.no_chain,
        )
        .await?;

    Ok((ReportDocument::from_cert_key(&report), None))
}

async fn run_url(inspector: &Inspector, args: UrlArgs) -> Result<(ReportDocument, Option<String>)> {
    let report = inspector
        .validate_from_url(&args.url, args.port, !args.no_hostname_check)
        .await?;

    Ok((ReportDocument::from_url(&report, args.port), None))
}

fn run_chain(inspector: &Inspector, args: ChainArgs) -> Result<(ReportDocument, Option<String>)> {
    let data = read_input(inspector, &args.file)?;
    let report = inspector.validate_chain_file(&data, args.include_root)?;

    let extra = match (&report.fixed_chain_pem, &args.fixed_out) {
        (Some(fixed), Some(path)) => {
            std::fs::write(path, fixed)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            Some(format!(
                "{} Reordered chain written to {}",
                style("⚠").yellow(),
                path.display()
            ))
        }
        (Some(_), None) => Some(format!(
            "{} Chain order needs fixing. Re-run with --fixed-out FILE to save the corrected chain.",
            style("⚠").yellow()
        )),
        (None, _) => None,
    };

    Ok((ReportDocument::from_chain(&report), extra))
}

/// Read a caller-supplied file after checking its extension and size
fn read_input(inspector: &Inspector, path: &Path) -> Result<Vec<u8>> {
    let limits = &inspector.settings().limits;

    if !limits.is_allowed_extension(path) {
        bail!(
            "Unsupported file type: {} (allowed: {})",
            path.display(),
            limits.allowed_extensions.join(", ")
        );
    }

    let size = std::fs::metadata(path)
        .with_context(|| format!("Failed to read {}", path.display()))?
        .len();
    if size > limits.max_input_bytes as u64 {
        bail!(
            "File size exceeds maximum allowed ({} bytes): {}",
            limits.max_input_bytes,
            path.display()
        );
    }

    std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
}
