//! permctl CLI
//!
//! Generates and checks bootstrap trees for permissioned test clusters.

use anyhow::Result;
use clap::{Parser, Subcommand};
use permctl::{
    verify_cluster_with, BootstrapConfig, ClusterGenerator, GenerateOptions, DEFAULT_HOME_DIR,
    DEFAULT_OUTPUT_DIR, PERMCTL_HOME_ENV,
};
use permnet_types::ClusterSpec;
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

/// permnet cluster bootstrap tool
#[derive(Parser)]
#[command(name = "permctl")]
#[command(author = "permnet contributors")]
#[command(version)]
#[command(about = "Bootstrap and PKI provisioning for permnet clusters", long_about = None)]
#[command(propagate_version = true)]
#[command(arg_required_else_help = true)]
struct Cli {
    /// Directory for config and default output
    #[arg(long, global = true, default_value_os_t = default_home_dir())]
    home: PathBuf,

    /// Path to configuration file (default: <home>/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// The logging level (trace|debug|info|warn|error)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// The logging format (json|plain)
    #[arg(long, global = true, default_value = "plain")]
    log_format: String,

    /// Disable colored logs
    #[arg(long, global = true, default_value = "false")]
    log_no_color: bool,

    /// Print out full error chain on errors
    #[arg(long, global = true, default_value = "false")]
    trace: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate keys, certificates, genesis and network files for a cluster
    Init {
        /// Number of nodes
        #[arg(short = 'n', long)]
        count: usize,

        /// Comma-separated node IPv4 addresses, one per node (default: 127.0.0.1 for all)
        #[arg(long, value_delimiter = ',')]
        ips: Vec<String>,

        /// Output directory (default: <home>/cluster)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Base port; the k-th node on a host listens on base + k (overrides config)
        #[arg(long)]
        base_port: Option<u16>,

        /// Replace an existing output directory
        #[arg(long, default_value = "false")]
        overwrite: bool,
    },

    /// Check a generated cluster for consistency
    Verify {
        /// Cluster directory (default: <home>/cluster)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Utilities for managing configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the effective configuration
    Show,

    /// Write the default configuration file
    Init {
        /// Overwrite an existing configuration file
        #[arg(long, default_value = "false")]
        overwrite: bool,
    },
}

/// Returns the default home directory for permctl.
///
/// Resolution order:
/// 1. `PERMCTL_HOME` environment variable (if set)
/// 2. `~/.permctl` (default)
fn default_home_dir() -> PathBuf {
    if let Ok(home) = std::env::var(PERMCTL_HOME_ENV) {
        return PathBuf::from(home);
    }

    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_HOME_DIR)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(&cli.log_level, &cli.log_format, cli.log_no_color);

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| BootstrapConfig::config_path(&cli.home));

    let result = match cli.command {
        Commands::Init {
            count,
            ips,
            output,
            base_port,
            overwrite,
        } => cmd_init(
            &cli.home,
            &config_path,
            count,
            &ips,
            output,
            base_port,
            overwrite,
        ),

        Commands::Verify { output } => cmd_verify(&cli.home, &config_path, output),

        Commands::Config { command } => cmd_config(&config_path, command),
    };

    if let Err(e) = &result {
        if cli.trace {
            eprintln!("Error: {:?}", e);
        } else {
            eprintln!("Error: {}", e);
        }
        std::process::exit(1);
    }

    Ok(())
}

fn init_tracing(log_level: &str, log_format: &str, no_color: bool) {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    // Logs go to stderr; stdout carries command output
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_ansi(!no_color)
        .with_writer(std::io::stderr);

    match log_format {
        "json" => subscriber.json().init(),
        _ => subscriber.init(),
    }
}

// =============================================================================
// Command Implementations
// =============================================================================

fn load_config(path: &Path) -> Result<BootstrapConfig> {
    Ok(BootstrapConfig::load(path)?)
}

fn cmd_init(
    home: &Path,
    config_path: &Path,
    count: usize,
    ips: &[String],
    output: Option<PathBuf>,
    base_port: Option<u16>,
    overwrite: bool,
) -> Result<()> {
    // Reject bad input before touching the config or the filesystem
    let spec = ClusterSpec::new(count, ips).map_err(permctl::BootstrapError::from)?;

    let mut config = load_config(config_path)?;
    if let Some(port) = base_port {
        config.base_port = port;
    }
    let output = output.unwrap_or_else(|| home.join(DEFAULT_OUTPUT_DIR));

    println!("Generating cluster configuration for {} nodes...", count);
    println!();

    let options = GenerateOptions::new(&output).with_overwrite(overwrite);
    let summary = ClusterGenerator::new(config).generate(&spec, &options)?;

    for node in &summary.nodes {
        println!(
            "  Created {} ({}, {}:{})",
            node.dir.display(),
            node.organization,
            node.ip,
            node.port
        );
        println!("    Address: {}", node.address);
        println!("    Peer ID: {}", node.peer_id);
    }

    println!();
    println!(
        "Cluster configuration created in: {}",
        summary.output_root.display()
    );
    println!();
    println!("Keep ca.priv and agency.priv at the cluster root; they are not part of any node directory.");
    println!();
    println!("To check the generated files:");
    println!("  permctl verify --output {}", summary.output_root.display());

    Ok(())
}

fn cmd_verify(home: &Path, config_path: &Path, output: Option<PathBuf>) -> Result<()> {
    let config = load_config(config_path)?;
    let root = output.unwrap_or_else(|| home.join(DEFAULT_OUTPUT_DIR));

    let report = verify_cluster_with(&root, &config)?;
    info!("Cluster at {} verified", report.root.display());

    println!("Verified {} nodes in {}", report.nodes.len(), report.root.display());
    println!();
    for node in &report.nodes {
        println!("  Node {}: {}", node.id, node.addr);
        println!("    Address: {}", node.address);
    }

    Ok(())
}

fn cmd_config(config_path: &Path, command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Show => {
            let config = load_config(config_path)?;
            print!("{}", config.to_toml()?);
        }

        ConfigCommands::Init { overwrite } => {
            if config_path.exists() && !overwrite {
                anyhow::bail!(
                    "Configuration already exists at {}. Use --overwrite to replace.",
                    config_path.display()
                );
            }
            BootstrapConfig::default().save(config_path)?;
            println!("Configuration written to {}", config_path.display());
        }
    }

    Ok(())
}
