use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "lovestory")]
#[command(about = "A personal scrapbook for photos, videos and memories", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Use the remote backend regardless of the configured default
    #[arg(short, long, global = true)]
    pub remote: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add photos or videos to the gallery
    #[command(alias = "a")]
    Add {
        /// Files to upload
        #[arg(required = true, num_args = 1..)]
        paths: Vec<std::path::PathBuf>,

        /// Tags applied to every file in the batch (comma separated)
        #[arg(short, long, value_delimiter = ',')]
        tags: Vec<String>,
    },

    /// List the gallery, newest first
    #[command(alias = "ls")]
    List {
        /// Only favorites
        #[arg(short, long)]
        favorites: bool,
    },

    /// Show one item with its comment thread
    #[command(alias = "s")]
    Show {
        /// Position in the list (e.g. 1)
        index: String,
    },

    /// Toggle favorite on one or more items
    #[command(alias = "fav")]
    Favorite {
        /// Positions in the list (e.g. 1 3 5)
        #[arg(required = true, num_args = 1..)]
        indexes: Vec<String>,
    },

    /// Change an item's display name or date
    #[command(alias = "e")]
    Edit {
        /// Position in the list (e.g. 1)
        index: String,

        /// New display name
        #[arg(long)]
        filename: Option<String>,

        /// New date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
    },

    /// Delete one or more items (metadata and payload together)
    #[command(alias = "rm")]
    Delete {
        /// Positions in the list (e.g. 1 3 5)
        #[arg(required = true, num_args = 1..)]
        indexes: Vec<String>,
    },

    /// Comment on an item
    Comment {
        /// Position in the list (e.g. 1)
        index: String,

        /// Comment text
        text: String,

        /// Author name (defaults to the configured author, then "Guest")
        #[arg(long)]
        author: Option<String>,
    },

    /// Reply to a comment on an item
    Reply {
        /// Position in the list (e.g. 1)
        index: String,

        /// Comment number within the item (1 = oldest)
        comment: usize,

        /// Reply text
        text: String,

        /// Reply author name
        #[arg(long)]
        name: Option<String>,
    },

    /// React to a comment with an emoji (every click counts)
    React {
        /// Position in the list (e.g. 1)
        index: String,

        /// Comment number within the item (1 = oldest)
        comment: usize,

        /// Emoji, e.g. ❤️
        emoji: String,
    },

    /// Remove a comment from an item
    #[command(name = "delete-comment")]
    DeleteComment {
        /// Position in the list (e.g. 1)
        index: String,

        /// Comment number within the item (1 = oldest)
        comment: usize,
    },

    /// The guestbook
    #[command(subcommand, alias = "gb")]
    Guestbook(GuestbookCommands),

    /// Show or change settings
    #[command(subcommand)]
    Settings(SettingsCommands),

    /// Export the whole gallery as a ZIP backup
    Export {
        /// Directory to write the archive into (defaults to the current one)
        #[arg(short, long)]
        out: Option<std::path::PathBuf>,
    },

    /// Create demo content if the gallery is empty
    Seed,

    /// Initialize the store and print where data lives
    Init,
}

#[derive(Subcommand, Debug)]
pub enum GuestbookCommands {
    /// Leave a message
    #[command(alias = "a")]
    Add {
        /// Message text
        text: String,

        /// Your name (defaults to the configured author, then "Guest")
        #[arg(long)]
        name: Option<String>,
    },

    /// List messages, newest first
    #[command(alias = "ls")]
    List,

    /// Reply to a message
    Reply {
        /// Position in the list (e.g. 1)
        index: String,

        /// Reply text
        text: String,

        /// Your name
        #[arg(long)]
        name: Option<String>,
    },

    /// React to a message (one active emoji per person)
    React {
        /// Position in the list (e.g. 1)
        index: String,

        /// Emoji, e.g. 👍
        emoji: String,
    },

    /// Delete a message
    #[command(alias = "rm")]
    Delete {
        /// Position in the list (e.g. 1)
        index: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum SettingsCommands {
    /// Print the current settings
    Show,

    /// Change settings (only the given fields; the record is saved whole)
    Set {
        /// Theme: light or dark
        #[arg(long)]
        theme: Option<String>,

        /// Soft cap on files per upload batch
        #[arg(long)]
        upload_limit: Option<u32>,

        /// Optional gallery password (a placeholder, not a security boundary)
        #[arg(long)]
        password: Option<String>,

        /// The day you count from (YYYY-MM-DD)
        #[arg(long)]
        start_date: Option<String>,
    },
}
