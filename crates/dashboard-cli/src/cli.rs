use clap::{Args, Parser, Subcommand, ValueEnum};
use dashboard_domain::{ColumnKey, KeywordCategory, KeywordSort, NoteCategory};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dashboard")]
#[command(about = "Personal productivity dashboard: task board, notes and listing tools", long_about = None)]
#[command(
    version,
    long_version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("DASHBOARD_BUILD_COMMIT"), ")")
)]
pub struct Cli {
    /// Directory holding the per-user documents
    #[arg(long, global = true, env = "DASHBOARD_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Signed-in user id
    #[arg(long, global = true, env = "DASHBOARD_USER")]
    pub user: Option<String>,

    /// Config file to use instead of the platform default
    #[arg(long, global = true, env = "DASHBOARD_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Task board operations
    Board(BoardCommand),
    /// Note operations
    Note(NoteCommand),
    /// Keyword research operations
    Keyword(KeywordCommand),
    /// Render image-generation prompts
    Prompt(PromptCommand),
    /// Generate app store descriptions
    Describe(DescribeArgs),
    /// App store catalogue operations
    Apps(AppsCommand),
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// Board commands
#[derive(Args)]
pub struct BoardCommand {
    #[command(subcommand)]
    pub action: BoardAction,
}

#[derive(Subcommand)]
pub enum BoardAction {
    /// Show all three columns
    Show,
    /// Add a task to the todo column
    Add {
        #[arg(long)]
        content: String,
        /// Days until the deadline (1-30)
        #[arg(long, default_value_t = 1)]
        days: u32,
    },
    /// Move a task between columns
    Move {
        #[arg(long)]
        id: String,
        #[arg(long)]
        from: ColumnKey,
        #[arg(long)]
        to: ColumnKey,
    },
    /// Move a task one column forward
    Advance {
        #[arg(long)]
        id: String,
    },
    /// Flip a task between done and todo
    Toggle {
        #[arg(long)]
        id: String,
    },
    /// Delete a task
    Delete {
        #[arg(long)]
        id: String,
        /// Column holding the task; looked up when omitted
        #[arg(long)]
        column: Option<ColumnKey>,
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
    /// Stream board changes and countdown ticks until interrupted
    Watch,
}

// Note commands
#[derive(Args)]
pub struct NoteCommand {
    #[command(subcommand)]
    pub action: NoteAction,
}

#[derive(Subcommand)]
pub enum NoteAction {
    /// Add a note
    Add {
        #[arg(long)]
        content: String,
        #[arg(long, default_value_t = NoteCategory::Catatan)]
        category: NoteCategory,
    },
    /// List notes, newest first
    List {
        #[arg(long)]
        category: Option<NoteCategory>,
    },
    /// Replace a note's content
    Edit {
        #[arg(long)]
        id: String,
        #[arg(long)]
        content: String,
    },
    /// Delete a note
    Delete {
        #[arg(long)]
        id: String,
        #[arg(long, short)]
        yes: bool,
    },
}

// Keyword commands
#[derive(Args)]
pub struct KeywordCommand {
    #[command(subcommand)]
    pub action: KeywordAction,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum SortArg {
    Date,
    Alphabetical,
}

impl From<SortArg> for KeywordSort {
    fn from(sort: SortArg) -> Self {
        match sort {
            SortArg::Date => KeywordSort::Date,
            SortArg::Alphabetical => KeywordSort::Alphabetical,
        }
    }
}

#[derive(Subcommand)]
pub enum KeywordAction {
    /// Add a keyword
    Add {
        #[arg(long)]
        text: String,
        #[arg(long, default_value_t = KeywordCategory::Other)]
        category: KeywordCategory,
    },
    /// List keywords
    List {
        #[arg(long, value_enum, default_value_t = SortArg::Date)]
        sort: SortArg,
        #[arg(long)]
        category: Option<KeywordCategory>,
    },
    /// Delete a keyword
    Delete {
        #[arg(long)]
        id: String,
        #[arg(long, short)]
        yes: bool,
    },
    /// Google Trends link for a phrase
    Trends { text: String },
}

// Prompt commands
#[derive(Args)]
pub struct PromptCommand {
    #[command(subcommand)]
    pub action: PromptAction,
}

#[derive(Subcommand)]
pub enum PromptAction {
    /// Background image prompt
    Background {
        #[arg(long, default_value = "")]
        theme: String,
        #[arg(long, default_value = "")]
        lighting: String,
        #[arg(long, default_value = "")]
        details: String,
    },
    /// App icon prompt
    Icon {
        #[arg(long, default_value = "")]
        emotion: String,
        #[arg(long, default_value = "")]
        background: String,
        #[arg(long, default_value = "")]
        color_theme: String,
        #[arg(long, default_value = "")]
        details: String,
    },
}

#[derive(Args)]
pub struct DescribeArgs {
    #[arg(long)]
    pub app_name: String,
    #[arg(long)]
    pub details: String,
    /// Also write the plain-text export to this file
    #[arg(long)]
    pub output: Option<PathBuf>,
}

// App search commands
#[derive(Args)]
pub struct AppsCommand {
    #[command(subcommand)]
    pub action: AppsAction,
}

#[derive(Subcommand)]
pub enum AppsAction {
    /// Search the catalogue; no query browses popular apps
    Search { query: Option<String> },
}
