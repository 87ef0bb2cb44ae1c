use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "regterms",
    version,
    about = "Regulatory schedule classification and term/definition extraction"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Route(RouteArgs),
    Extract(ExtractArgs),
    Batch(BatchArgs),
}

#[derive(Args, Debug, Clone)]
pub struct RouteArgs {
    pub filenames: Vec<String>,

    #[arg(long)]
    pub source_dir: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ExtractArgs {
    #[arg(long)]
    pub input: PathBuf,

    /// Filename used for classification; defaults to the input's file name.
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long, default_value = ".cache/regterms/output")]
    pub output_dir: PathBuf,

    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub llm_context: bool,

    #[arg(long, default_value = "SuperStream Glossary")]
    pub context_title: String,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct BatchArgs {
    #[arg(long)]
    pub source_dir: PathBuf,

    #[arg(long, default_value = ".cache/regterms/output")]
    pub output_dir: PathBuf,

    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub manifest_path: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub llm_context: bool,

    #[arg(long, default_value = "SuperStream Glossary")]
    pub context_title: String,
}
