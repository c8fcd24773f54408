//! bucketvol command-line tool
//!
//! Runs single volume operations against a configured bucket.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use bytes::Bytes;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use bucketvol::{DriverRegistry, VolumeConfig, VolumeDriver};

/// Browse and modify an object-store volume as a directory tree.
#[derive(Parser, Debug)]
#[command(name = "bucketvol")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the volume configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Show file or folder attributes
    Stat {
        path: String,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// List a folder
    Ls {
        #[arg(default_value = "/")]
        path: String,
    },

    /// Create a folder
    Mkdir { parent: String, name: String },

    /// Create an empty file
    Touch { parent: String, name: String },

    /// Upload a local file into a folder
    Put {
        /// Local file to upload
        file: PathBuf,
        /// Target folder
        #[arg(default_value = "/")]
        dir: String,
        /// Name to store the file under (defaults to the local file name)
        #[arg(long)]
        name: Option<String>,
    },

    /// Print file content to stdout
    Cat { path: String },

    /// Copy a file
    Cp {
        source: String,
        target_dir: String,
        name: String,
    },

    /// Move a file
    Mv {
        source: String,
        target_dir: String,
        name: String,
    },

    /// Delete a file
    Rm { path: String },

    /// Delete a folder marker
    Rmdir { path: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Using config file: {:?}", path);
            VolumeConfig::load(path)?
        }
        None => VolumeConfig::default(),
    };
    config.apply_env_overrides();

    let driver = DriverRegistry::with_defaults()
        .create(config)
        .context("Failed to open volume")?;

    run(driver.as_ref(), cli.command).await
}

async fn run(driver: &dyn VolumeDriver, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Stat { path, json } => {
            let Some(stat) = driver.stat(&path).await? else {
                anyhow::bail!("{}: not found", path);
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&stat)?);
            } else {
                println!("path:     {}", path);
                println!("mime:     {}", stat.mime);
                println!("size:     {}", stat.size);
                println!("modified: {}", stat.modified.to_rfc3339());
            }
        }
        Commands::Ls { path } => {
            for entry in driver.list(&path).await? {
                println!("{}", entry);
            }
        }
        Commands::Mkdir { parent, name } => {
            println!("{}", driver.create_directory(&parent, &name).await?);
        }
        Commands::Touch { parent, name } => {
            println!("{}", driver.create_file(&parent, &name).await?);
        }
        Commands::Put { file, dir, name } => {
            let name = match name {
                Some(name) => name,
                None => file
                    .file_name()
                    .and_then(|n| n.to_str())
                    .map(str::to_string)
                    .context("Cannot derive a file name, pass --name")?,
            };
            let content = tokio::fs::read(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            println!("{}", driver.save(Bytes::from(content), &dir, &name).await?);
        }
        Commands::Cat { path } => {
            let content = driver.read_content(&path).await?;
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&content)?;
            stdout.flush()?;
        }
        Commands::Cp {
            source,
            target_dir,
            name,
        } => {
            println!("{}", driver.copy(&source, &target_dir, &name).await?);
        }
        Commands::Mv {
            source,
            target_dir,
            name,
        } => {
            println!("{}", driver.move_to(&source, &target_dir, &name).await?);
        }
        Commands::Rm { path } => driver.delete_file(&path).await?,
        Commands::Rmdir { path } => driver.delete_directory(&path).await?,
    }
    Ok(())
}
