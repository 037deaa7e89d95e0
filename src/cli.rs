use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "lernbot")]
#[command(author, version, about = "Telegram course bot with placement test and AI feedback", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Run the bot with long polling (default)
    Run,

    /// Report missing configuration and exit
    Check,

    /// Check connectivity to Telegram, Airtable and Mistral AI
    Health,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
