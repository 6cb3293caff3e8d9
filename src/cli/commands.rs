use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "shelf", about = concat!("shelf v", env!("CARGO_PKG_VERSION"), " - tag libraries as folders"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Run against a different workspace directory
    #[arg(short = 'C', long = "dir", global = true)]
    pub dir: Option<String>,

    /// More log output on stderr (repeat for more)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a .shelf/ workspace in the current directory
    Init(InitArgs),
    /// Show the folder tree with item counts and selection state
    Tree(TreeArgs),
    /// List a folder's subfolders and the items tagged directly on it
    Ls(PathArgs),
    /// Count unique items under a folder
    Count(PathArgs),
    /// Page through the items of a folder's tag
    Browse(BrowseArgs),
    /// Open a folder in the tree view
    Expand(PathArgs),
    /// Close a folder in the tree view
    Collapse(PathArgs),
    /// Select or deselect one item under a tag
    Select(SelectArgs),
    /// Select or deselect every item of a folder
    SelectFolder(PathArgs),
    /// Show the current selection
    Selection,
    /// Clear the current selection
    Clear,
    /// Remove selected items from the tags they were selected under
    Remove,
    /// Add selected items to another tag
    Share(ShareArgs),
    /// Delete a folder and every tag below it
    RmFolder(PathArgs),
    /// Chat session memory
    Context(ContextCmd),
}

#[derive(Args)]
pub struct InitArgs {
    /// Workspace name (default: inferred from directory name)
    #[arg(long)]
    pub name: Option<String>,
    /// Reinitialize even if .shelf/ already exists
    #[arg(long)]
    pub force: bool,
}

/// Which library to work in
#[derive(Args, Clone)]
pub struct LibArgs {
    /// Library type: document, prompt, profile, chat_context
    #[arg(short = 't', long = "type")]
    pub lib_type: Option<String>,
}

#[derive(Args)]
pub struct TreeArgs {
    #[command(flatten)]
    pub lib: LibArgs,
    /// Open every folder containing an item that matches this regex
    #[arg(long)]
    pub search: Option<String>,
    /// Show every folder regardless of expand state
    #[arg(long)]
    pub all: bool,
}

#[derive(Args)]
pub struct PathArgs {
    /// Folder path, e.g. HR/Payroll
    pub path: String,
    #[command(flatten)]
    pub lib: LibArgs,
}

#[derive(Args)]
pub struct BrowseArgs {
    /// Folder path, e.g. HR/Payroll
    pub path: String,
    #[command(flatten)]
    pub lib: LibArgs,
    /// Items per page (default: browse.page_size)
    #[arg(long)]
    pub limit: Option<usize>,
    /// Number of pages to load
    #[arg(long, default_value_t = 1)]
    pub pages: usize,
    /// Load every page
    #[arg(long)]
    pub all: bool,
    /// Query the whole subtree instead of the folder's own tag
    #[arg(long)]
    pub subtree: bool,
}

#[derive(Args)]
pub struct SelectArgs {
    /// Item id
    pub item: String,
    /// Tag id the item is selected under
    #[arg(long)]
    pub tag: String,
}

#[derive(Args)]
pub struct ShareArgs {
    /// Target tag id
    pub tag: String,
}

#[derive(Args)]
pub struct ContextCmd {
    #[command(subcommand)]
    pub action: ContextAction,
}

#[derive(Subcommand)]
pub enum ContextAction {
    /// Show what a session remembers
    Show {
        /// Session id
        session: String,
    },
    /// Update what a session remembers
    Set(ContextSetArgs),
}

#[derive(Args)]
pub struct ContextSetArgs {
    /// Session id
    pub session: String,
    /// Library tag ids (replaces the stored list)
    #[arg(long = "library", num_args = 1.., value_delimiter = ',')]
    pub libraries: Option<Vec<String>>,
    /// Prompt ids (replaces the stored list)
    #[arg(long = "prompt", num_args = 1.., value_delimiter = ',')]
    pub prompts: Option<Vec<String>>,
    /// Template ids (replaces the stored list)
    #[arg(long = "template", num_args = 1.., value_delimiter = ',')]
    pub templates: Option<Vec<String>>,
    /// Search policy: semantic, hybrid, text
    #[arg(long)]
    pub policy: Option<String>,
}
