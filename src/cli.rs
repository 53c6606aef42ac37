use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "aspect-weave")]
#[command(about = "Weave AspectJ aspects into compiled Android artifacts before later bytecode steps")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[arg(long, value_name = "FILE")]
    pub ajc: Option<PathBuf>,

    #[arg(long, value_name = "DIR")]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    Weave {
        /// Primary input: a classes directory or jar, subject to weaving
        #[arg(long = "input", value_name = "PATH")]
        inputs: Vec<PathBuf>,

        /// Referenced-only input: resolution context, never woven
        #[arg(long = "reference", value_name = "PATH")]
        references: Vec<PathBuf>,

        /// Directory to scan for jars to add as primary inputs
        #[arg(long = "scan", value_name = "DIR")]
        scan: Vec<PathBuf>,

        /// Directory to scan for jars to add as referenced-only inputs
        #[arg(long = "scan-reference", value_name = "DIR")]
        scan_references: Vec<PathBuf>,

        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,

        #[arg(short = 'v', long)]
        verbose: bool,
    },
    Clean,
    PrintConfig,
}

#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Text,
}
