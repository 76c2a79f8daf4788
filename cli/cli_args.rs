use clap::Parser;
use repodigest_core::OutputFormat;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Digest a repository into a single LLM-ready report.",
    long_about = "repodigest walks a local directory (or a shallow clone of a remote repository), \nclassifies every file by language and role, and emits an overview, language breakdown, \ndirectory tree and either full file contents or a compressed file list.",
    help_template = "{about-section}\nUsage: {usage}\n\n{all-args}{after-help}",
    after_help = "EXAMPLES:\n  repodigest .\n  repodigest ~/src/app --compress --stats\n  repodigest --remote https://github.com/owner/repo -f json -o digest.json\n  repodigest . --ext py,toml --chunk-lines 400 --line-numbers"
)]
pub struct Cli {
    #[arg(
        value_name = "PATH",
        help = "Directory to analyze (default: current dir).",
        conflicts_with = "remote"
    )]
    pub path: Option<String>,

    #[arg(
        long,
        value_name = "URL",
        help = "Shallow-clone this repository into a temporary directory and analyze it.",
        help_heading = "Source"
    )]
    pub remote: Option<String>,

    #[arg(
        long,
        value_name = "FILE",
        help = "Path of the TOML config file (default: <root>/.repodigest.toml).",
        conflicts_with = "no_config",
        help_heading = "Source"
    )]
    pub config: Option<String>,

    #[arg(
        long,
        help = "Do not load any TOML config file.",
        help_heading = "Source"
    )]
    pub no_config: bool,

    #[arg(
        short = 'f',
        long,
        value_name = "FORMAT",
        value_parser = parse_format,
        help = "Output format: markdown (md) or json.",
        help_heading = "Output Formatting"
    )]
    pub format: Option<OutputFormat>,

    #[arg(
        long,
        help = "Structure only: list files instead of printing their contents.",
        help_heading = "Output Formatting"
    )]
    pub compress: bool,

    #[arg(
        long,
        help = "Prefix content lines with line numbers.",
        help_heading = "Output Formatting"
    )]
    pub line_numbers: bool,

    #[arg(
        long,
        value_name = "N",
        help = "Lines per fenced block (0 disables chunking).",
        help_heading = "Output Formatting"
    )]
    pub chunk_lines: Option<usize>,

    #[arg(
        long,
        value_name = "SIZE",
        value_parser = parse_size,
        help = "Omit contents of files larger than this (e.g. 300KB, 1MiB).",
        help_heading = "Limits"
    )]
    pub max_file_bytes: Option<u64>,

    #[arg(
        long,
        value_name = "SIZE",
        value_parser = parse_size,
        help = "Truncate the whole output at this size (0 = unlimited).",
        help_heading = "Limits"
    )]
    pub max_output_bytes: Option<u64>,

    #[arg(
        long,
        value_name = "EXTS",
        value_delimiter = ',',
        help = "Only include contents of files with these extensions (e.g. py,rs).",
        help_heading = "Filters"
    )]
    pub ext: Vec<String>,

    #[arg(
        long,
        value_name = "GLOB",
        help = "Extra ignore pattern, gitignore syntax (repeatable).",
        help_heading = "Filters"
    )]
    pub exclude: Vec<String>,

    #[arg(
        long,
        help = "Do not read the root .gitignore.",
        help_heading = "Filters"
    )]
    pub no_gitignore: bool,

    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Write the output to FILE instead of stdout.",
        help_heading = "Output"
    )]
    pub output: Option<PathBuf>,

    #[arg(
        long,
        help = "Print a language summary table to stderr.",
        help_heading = "Output"
    )]
    pub stats: bool,

    #[arg(
        long,
        help = "Emit the success/error envelope as JSON instead of bare content.",
        help_heading = "Output"
    )]
    pub result_json: bool,

    #[arg(short, long, action = clap::ArgAction::Count, help = "Increase message verbosity (-v, -vv).")]
    pub verbose: u8,

    #[arg(short, long, help = "Silence informational messages and warnings.")]
    pub quiet: bool,
}

fn parse_format(value: &str) -> Result<OutputFormat, String> {
    value.parse::<OutputFormat>().map_err(|e| e.to_string())
}

/// Plain byte counts or human units (`300KB`, `2MiB`).
fn parse_size(value: &str) -> Result<u64, String> {
    byte_unit::Byte::parse_str(value, true)
        .map(|byte| byte.as_u64())
        .map_err(|e| format!("invalid size '{}': {}", value, e))
}
