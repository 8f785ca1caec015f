use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "layout-align")]
#[command(
    author,
    version,
    about = "Reorder struct fields by access tier and size using debug info"
)]
#[command(
    long_about = "layout-align reads the llvm-dwarfdump rendering of a binary's debug info, \
finds the structs, classes and unions declared under a project root, and orders each type's \
fields public first, then protected, then private, smallest first within each group.\n\n\
Example:\n  layout-align plan ~/src/game ./build/game\n  layout-align apply ~/src/game ./build/game"
)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the proposed field order for every type without touching sources
    Plan {
        #[command(flatten)]
        input: InputArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        output: OutputFormat,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },

    /// Rewrite field declarations in place with the reorder tool
    Apply {
        #[command(flatten)]
        input: InputArgs,

        /// Keep the generated dump at this path instead of a temporary file
        #[arg(long, value_name = "PATH", conflicts_with = "dump")]
        keep_dump: Option<PathBuf>,

        /// Output format for the summary
        #[arg(short, long, value_enum, default_value = "table")]
        output: OutputFormat,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },
}

#[derive(Args, Clone)]
pub struct InputArgs {
    /// Project source root; only types declared under it are reordered
    #[arg(value_name = "ROOT")]
    pub root: PathBuf,

    /// Binary with debug info to analyze
    #[arg(value_name = "BINARY", required_unless_present = "dump")]
    pub binary: Option<PathBuf>,

    /// Read an existing llvm-dwarfdump output instead of generating one
    #[arg(long, value_name = "FILE")]
    pub dump: Option<PathBuf>,

    /// Path to config file; it must exist when given [default: .layout-align.yaml]
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}
