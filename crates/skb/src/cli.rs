//! Clap CLI definitions for the `skb` command.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// skb -- knowledge base for AI-pair work.
///
/// Items, tags and relations stored in a SQLite index with a Markdown
/// mirror as the durable source of truth.
#[derive(Parser, Debug)]
#[command(
    name = "skb",
    about = "Markdown-mirrored knowledge base",
    version
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Global flags available to all subcommands.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Data root (default: $SHIROKUMA_DATA_DIR or the nearest .shirokuma/).
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Output format.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Enable verbose/debug output.
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output (errors only).
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

/// All available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new item.
    #[command(alias = "new")]
    Create(CreateArgs),

    /// Show one item in full.
    #[command(alias = "show")]
    Get(GetArgs),

    /// List items of a type.
    List(ListArgs),

    /// Update item fields.
    Update(UpdateArgs),

    /// Delete an item.
    Delete(DeleteArgs),

    /// Move an item to another type within the same base type.
    MoveType(MoveTypeArgs),

    /// Search items.
    Search(SearchArgs),

    /// Manage tags.
    Tags(TagsArgs),

    /// Manage item types.
    Types(TypesArgs),

    /// Counts per type, status and tag.
    Stats,

    /// Read or update the current-state document.
    State(StateArgs),

    /// Serve the MCP tool surface over stdio (JSON-RPC).
    Serve,

    /// Export all items into a timestamped directory.
    Export(ExportArgs),

    /// Import items from a Markdown tree or JSONL dump.
    Import(ImportArgs),

    /// Rebuild the index from the Markdown tree.
    Rebuild(RebuildArgs),

    /// Print the resolved configuration.
    Config,

    /// Generate shell completions.
    Completion(CompletionArgs),
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Item type (issues, plans, docs, knowledge, sessions, dailies, ...).
    #[arg(short = 't', long = "type")]
    pub type_name: String,

    /// Item title.
    pub title: String,

    #[arg(short, long)]
    pub description: Option<String>,

    /// Markdown body (required for documents-base types and dailies).
    #[arg(short, long)]
    pub content: Option<String>,

    /// Status name (default: Open).
    #[arg(short, long)]
    pub status: Option<String>,

    /// Priority (CRITICAL, HIGH, MEDIUM, LOW, MINIMAL).
    #[arg(short, long)]
    pub priority: Option<String>,

    /// Tags (repeatable).
    #[arg(long = "tag")]
    pub tags: Vec<String>,

    /// Related items as type-id tokens (repeatable).
    #[arg(long = "related")]
    pub related: Vec<String>,

    #[arg(long)]
    pub start_date: Option<String>,

    #[arg(long)]
    pub end_date: Option<String>,

    #[arg(long)]
    pub category: Option<String>,

    #[arg(long)]
    pub version: Option<String>,

    /// Daily date (dailies only, default today).
    #[arg(long)]
    pub date: Option<String>,

    /// Session timestamp (sessions only, default now).
    #[arg(long)]
    pub datetime: Option<String>,
}

#[derive(Args, Debug)]
pub struct GetArgs {
    /// Item type.
    #[arg(short = 't', long = "type")]
    pub type_name: String,

    /// Item id (integer, or date/timestamp key for dailies/sessions).
    pub id: String,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Item type.
    #[arg(short = 't', long = "type")]
    pub type_name: String,

    /// Restrict to these status names (repeatable).
    #[arg(long = "status")]
    pub statuses: Vec<String>,

    /// Include items in closable statuses.
    #[arg(long)]
    pub include_closed: bool,

    #[arg(long)]
    pub start_date: Option<String>,

    #[arg(long)]
    pub end_date: Option<String>,

    /// Require every listed tag (repeatable).
    #[arg(long = "tag")]
    pub tags: Vec<String>,

    #[arg(long)]
    pub limit: Option<u32>,

    #[arg(long, default_value_t = 0)]
    pub offset: u32,
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Item type.
    #[arg(short = 't', long = "type")]
    pub type_name: String,

    /// Item id.
    pub id: String,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(short, long)]
    pub description: Option<String>,

    #[arg(short, long)]
    pub content: Option<String>,

    #[arg(short, long)]
    pub status: Option<String>,

    #[arg(short, long)]
    pub priority: Option<String>,

    /// Replace the tag set (repeatable; pass none to clear with --clear-tags).
    #[arg(long = "tag")]
    pub tags: Vec<String>,

    /// Clear all tags.
    #[arg(long)]
    pub clear_tags: bool,

    /// Replace the related set (repeatable).
    #[arg(long = "related")]
    pub related: Vec<String>,

    /// Clear all related references.
    #[arg(long)]
    pub clear_related: bool,

    #[arg(long)]
    pub start_date: Option<String>,

    #[arg(long)]
    pub end_date: Option<String>,

    #[arg(long)]
    pub category: Option<String>,

    #[arg(long)]
    pub version: Option<String>,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Item type.
    #[arg(short = 't', long = "type")]
    pub type_name: String,

    /// Item id.
    pub id: String,
}

#[derive(Args, Debug)]
pub struct MoveTypeArgs {
    /// Current type.
    pub from_type: String,

    /// Item id under the current type.
    pub from_id: String,

    /// Target type (same base type).
    pub to_type: String,
}

#[derive(Args, Debug)]
pub struct SearchArgs {
    #[command(subcommand)]
    pub command: SearchCommands,
}

#[derive(Subcommand, Debug)]
pub enum SearchCommands {
    /// Full-text search (all tokens must match).
    Items(SearchItemsArgs),

    /// Prefix suggestions over titles and tags.
    Suggest(SearchSuggestArgs),

    /// Exact tag lookup grouped by base type.
    Tag(SearchTagArgs),
}

#[derive(Args, Debug)]
pub struct SearchItemsArgs {
    pub query: String,

    /// Restrict to these types (repeatable).
    #[arg(long = "type")]
    pub types: Vec<String>,

    #[arg(long)]
    pub limit: Option<u32>,

    #[arg(long)]
    pub offset: Option<u32>,
}

#[derive(Args, Debug)]
pub struct SearchSuggestArgs {
    pub query: String,

    #[arg(long = "type")]
    pub types: Vec<String>,

    #[arg(long)]
    pub limit: Option<u32>,
}

#[derive(Args, Debug)]
pub struct SearchTagArgs {
    pub tag: String,

    #[arg(long = "type")]
    pub types: Vec<String>,
}

#[derive(Args, Debug)]
pub struct TagsArgs {
    #[command(subcommand)]
    pub command: TagsCommands,
}

#[derive(Subcommand, Debug)]
pub enum TagsCommands {
    /// List all tags.
    List,

    /// Register a tag.
    Create { name: String },

    /// Delete a tag everywhere.
    Delete { name: String },

    /// List tags matching a substring.
    Search { pattern: String },
}

#[derive(Args, Debug)]
pub struct TypesArgs {
    #[command(subcommand)]
    pub command: TypesCommands,
}

#[derive(Subcommand, Debug)]
pub enum TypesCommands {
    /// List registered types.
    List {
        /// Include field definitions per type.
        #[arg(long)]
        definitions: bool,
    },

    /// Register a new type.
    Create {
        name: String,

        /// Base type rail (default: documents).
        #[arg(long, default_value = "documents")]
        base_type: String,

        #[arg(long)]
        description: Option<String>,
    },

    /// Update a type's description.
    Update { name: String, description: String },

    /// Delete an empty type.
    Delete { name: String },
}

#[derive(Args, Debug)]
pub struct StateArgs {
    #[command(subcommand)]
    pub command: StateCommands,
}

#[derive(Subcommand, Debug)]
pub enum StateCommands {
    /// Print the current state.
    Show,

    /// Overwrite the current state.
    Update {
        /// Markdown content (use - to read stdin).
        content: String,

        #[arg(long = "tag")]
        tags: Vec<String>,

        /// Related items as type-id tokens (validated; repeatable).
        #[arg(long = "related")]
        related: Vec<String>,

        #[arg(long)]
        updated_by: Option<String>,
    },
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Export root (default: the configured export_dir).
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Also copy the current-state history.
    #[arg(long)]
    pub include_state: bool,
}

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Source: a Markdown tree or a .jsonl dump.
    pub source: PathBuf,

    /// Keep ids from the dump, raising sequences past them.
    #[arg(long)]
    pub preserve_ids: bool,

    /// Truncate the index (and stale projections) first.
    #[arg(long)]
    pub clear: bool,
}

#[derive(Args, Debug)]
pub struct RebuildArgs {
    /// Only write projection files missing on disk (index wins).
    #[arg(long)]
    pub reproject: bool,
}

#[derive(Args, Debug)]
pub struct CompletionArgs {
    /// Shell to generate completions for.
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
