use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint, builder::BoolishValueParser};

/// Command-line arguments for the blockdown binary.
#[derive(Debug, Parser)]
#[command(
    name = "blockdown",
    version,
    about = "Render block-structured pages to Markdown"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "BLOCKDOWN_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: Overrides,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Fetch one page with its block tree and render it.
    Page(PageArgs),
    /// Render every page of a database into a directory.
    Database(DatabaseArgs),
    /// Render a page from a local JSON dump.
    File(FileArgs),
}

#[derive(Debug, Args, Clone)]
pub struct PageArgs {
    /// Page id, dashed or not, or a full page URL.
    #[arg(value_name = "ID")]
    pub id: String,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Args, Clone)]
pub struct DatabaseArgs {
    /// Database id, dashed or not, or a full database URL.
    #[arg(value_name = "ID")]
    pub id: String,

    /// Directory receiving one Markdown file per page.
    #[arg(long = "out-dir", value_name = "DIR", value_hint = ValueHint::DirPath)]
    pub out_dir: PathBuf,
}

#[derive(Debug, Args, Clone)]
pub struct FileArgs {
    /// JSON page dump to render.
    #[arg(value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub path: PathBuf,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Args, Default, Clone)]
pub struct OutputArgs {
    /// Write the document to a file instead of stdout.
    #[arg(long, short = 'o', value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct Overrides {
    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        global = true,
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Integration token used for API requests.
    #[arg(
        long,
        env = "NOTION_TOKEN",
        value_name = "TOKEN",
        global = true,
        hide_env_values = true
    )]
    pub token: Option<String>,

    /// Override the API base URL.
    #[arg(long = "api-base-url", value_name = "URL", global = true)]
    pub api_base_url: Option<String>,

    /// Override the number of sibling blocks rendered concurrently.
    #[arg(long, value_name = "COUNT", global = true)]
    pub concurrency: Option<u64>,

    /// Toggle TOML front matter in rendered documents.
    #[arg(
        long = "front-matter",
        value_name = "BOOL",
        global = true,
        value_parser = BoolishValueParser::new()
    )]
    pub front_matter: Option<bool>,
}
