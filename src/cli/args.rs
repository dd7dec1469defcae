//! CLI argument definitions using clap

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "cert-inspector")]
#[command(version)]
#[command(about = "Inspect X.509 certificates, key pairs and certificate chains", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Print the report as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Settings file (defaults to config/default.toml when present)
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a certificate against its private key
    Pair(PairArgs),

    /// Retrieve and validate the certificate served by a TLS endpoint
    Url(UrlArgs),

    /// Analyse the order and completeness of a PEM chain file
    Chain(ChainArgs),
}

#[derive(Args, Debug)]
pub struct PairArgs {
    /// Certificate file (PEM or DER)
    #[arg(long, value_name = "FILE")]
    pub cert: PathBuf,

    /// Private key file (PEM or DER)
    #[arg(long, value_name = "FILE")]
    pub key: PathBuf,

    /// Password for an encrypted private key
    #[arg(long)]
    pub password: Option<String>,

    /// Domain the certificate should cover
    #[arg(long)]
    pub domain: Option<String>,

    /// Skip building the chain through AIA
    #[arg(long)]
    pub no_chain: bool,
}

#[derive(Args, Debug)]
pub struct UrlArgs {
    /// URL or hostname to connect to
    #[arg(required = true)]
    pub url: String,

    /// Port to connect to
    #[arg(long, default_value = "443")]
    pub port: u16,

    /// Skip matching the hostname against the certificate
    #[arg(long)]
    pub no_hostname_check: bool,
}

#[derive(Args, Debug)]
pub struct ChainArgs {
    /// PEM file containing the chain
    #[arg(required = true)]
    pub file: PathBuf,

    /// Keep self-signed roots in the reordered chain
    #[arg(long)]
    pub include_root: bool,

    /// Write the reordered chain here when the order is wrong
    #[arg(long, value_name = "FILE")]
    pub fixed_out: Option<PathBuf>,
}
