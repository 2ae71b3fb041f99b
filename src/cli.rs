use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "docscan", version, about = "Scan folders of text, markdown and PDF documents")]
pub struct Cli {
    /// Configuration file (defaults to the platform config directory)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP API
    Serve(ServeArgs),
    /// Scan one folder and print every document found
    Scan(ScanArgs),
    /// Scan several folders and write a JSON report
    Batch(BatchArgs),
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Address to listen on (overrides `server.host`)
    #[arg(long)]
    pub host: Option<String>,
    /// Port to listen on (overrides `server.port`)
    #[arg(long)]
    pub port: Option<u16>,
}

#[derive(Debug, Args)]
pub struct ScanArgs {
    pub folder: PathBuf,
    /// Skip files larger than this many MiB (1-1000)
    #[arg(long)]
    pub max_file_size_mb: Option<u32>,
    /// Print the finished task record as JSON
    #[arg(long)]
    pub json: bool,
    /// Give up waiting after this many seconds
    #[arg(long, default_value_t = 3600)]
    pub timeout: u64,
}

#[derive(Debug, Args)]
pub struct BatchArgs {
    #[arg(required = true)]
    pub folders: Vec<PathBuf>,
    /// Where to write the report
    #[arg(short, long, default_value = "scan_report.json")]
    pub output: PathBuf,
    /// Skip files larger than this many MiB (1-1000)
    #[arg(long)]
    pub max_file_size_mb: Option<u32>,
    /// Give up waiting for each folder after this many seconds
    #[arg(long, default_value_t = 3600)]
    pub timeout: u64,
}
