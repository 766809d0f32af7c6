use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Fetch a page and print its preview as json
    Meta {
        /// Page url
        url: url::Url,
    },

    /// Load an image through the cache
    Image {
        /// Image url
        url: url::Url,
    },

    /// Inspect or clean the image cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum CacheAction {
    /// Print how much the disk cache holds
    Size,

    /// Remove everything from memory and disk
    Clear,

    /// Remove only expired entries
    ClearExpired,
}
