use clap::{Parser, Subcommand};
use hotshot::results::SortKey;

#[derive(Parser, Debug)]
#[command(name = "hotshot")]
#[command(about = "Find recently published videos that are growing fast", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search uploads from the last week for a keyword
    Keyword(KeywordArgs),
    /// Sweep trending lists of every region for one category
    Category(CategoryArgs),
    /// List the supported regions
    Regions,
    /// List the supported categories
    Categories,
}

#[derive(clap::Args, Debug)]
pub struct KeywordArgs {
    pub keyword: String,

    /// Region code (e.g. KR); omit for a worldwide search
    #[arg(long, default_value = "")]
    pub region: String,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(clap::Args, Debug)]
pub struct CategoryArgs {
    /// Category label (e.g. Music) or numeric id (e.g. 10)
    pub category: String,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(clap::Args, Debug)]
pub struct OutputArgs {
    #[arg(long, value_enum, default_value_t = SortKey::Score)]
    pub sort: SortKey,

    /// Show only the first N rows
    #[arg(long)]
    pub limit: Option<usize>,

    /// Also write the results to the export directory
    #[arg(long)]
    pub export: bool,
}
