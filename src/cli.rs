use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "dxcclist",
    version,
    about = "Convert the ARRL DXCC entity list into structured JSON"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Extract(ExtractArgs),
    Validate(ValidateArgs),
    Status(StatusArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ExtractArgs {
    /// Plain-text DXCC list to read.
    #[arg(long)]
    pub input: PathBuf,

    /// Destination for the JSON result; `-` writes to stdout.
    #[arg(long)]
    pub output: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = FilterMode::All)]
    pub filter: FilterMode,

    /// JSON object mapping zone letters to range strings.
    #[arg(long)]
    pub zone_legend: Option<PathBuf>,

    #[arg(long)]
    pub db_path: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub strict: bool,
}

/// Which entities are kept in the result.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum FilterMode {
    #[default]
    All,
    Current,
    Deleted,
}

impl FilterMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Current => "current",
            Self::Deleted => "deleted",
        }
    }

    pub fn keeps(self, is_current: bool) -> bool {
        match self {
            Self::All => true,
            Self::Current => is_current,
            Self::Deleted => !is_current,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ValidateArgs {
    #[arg(long)]
    pub input: PathBuf,

    #[arg(long, default_value_t = 10)]
    pub sample_size: usize,
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    #[arg(long)]
    pub db_path: PathBuf,
}
