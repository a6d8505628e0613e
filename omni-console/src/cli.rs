use clap::{Args, Parser, Subcommand};
use omni_feed::{Channel, FeedFilter, StatusFilter};

/// Omni Console - operator view of the live conversation feed
#[derive(Parser, Debug)]
#[command(name = "omni-console")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the hydrated conversation list
    List {
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Hydrate, then stream live updates until Ctrl-C
    Watch {
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Show the stored history of one conversation
    Transcript { user_id: String },
    /// Send a reply through the conversation's channel (admin only)
    Send { user_id: String, text: String },
    /// Mark a conversation as managed by an operator
    Manage { conversation_id: String },
    /// Per-channel counts of active and managed conversations
    Stats,
}

#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// whatsapp, instagram, facebook or tiktok
    #[arg(long)]
    pub channel: Option<Channel>,

    /// all, managed or pending
    #[arg(long, default_value = "all")]
    pub status: StatusFilter,

    /// Case-insensitive match on display name or last message
    #[arg(long, default_value = "")]
    pub search: String,
}

impl From<&FilterArgs> for FeedFilter {
    fn from(args: &FilterArgs) -> Self {
        FeedFilter {
            query: args.search.clone(),
            channel: args.channel,
            status: args.status,
        }
    }
}
