//! Command-line configuration.
//!
//! Everything the application can be tuned with comes in through [`Args`].
//! There is no config file; defaults point at the public JSONPlaceholder API.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use log::LevelFilter;

use crate::source::{HttpPageSource, HttpSettings, MemoryPageSource, PageSource};

pub const DEFAULT_BASE_URL: &str = "https://jsonplaceholder.typicode.com";

#[derive(Debug, Parser)]
#[command(name = "livescroll-feed")]
#[command(about = "Infinitely scrolling post feed for the terminal")]
#[command(version)]
pub struct Args {
    /// Root of the posts API (`{base}/posts?_limit=N&_page=P`)
    #[arg(default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Posts per page
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..=100))]
    pub page_size: u32,

    /// Connect and request timeout, in seconds
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_secs: u64,

    /// Serve N generated posts from memory instead of the network
    #[arg(long, value_name = "N")]
    pub demo: Option<u64>,

    /// Where to write the log (the terminal belongs to the UI)
    #[arg(long, default_value = "livescroll.log")]
    pub log_file: PathBuf,

    /// Log verbosity: off, error, warn, info, debug, trace
    #[arg(long, default_value_t = LevelFilter::Info)]
    pub log_level: LevelFilter,
}

impl Args {
    pub fn http_settings(&self) -> HttpSettings {
        let timeout = Duration::from_secs(self.timeout_secs);
        HttpSettings {
            page_size: self.page_size,
            connect_timeout: timeout,
            request_timeout: timeout,
        }
    }

    /// Build the page source selected on the command line.
    pub fn page_source(&self) -> Result<Arc<dyn PageSource>> {
        if let Some(count) = self.demo {
            return Ok(Arc::new(MemoryPageSource::generated(
                count,
                self.page_size as usize,
            )));
        }
        let source = HttpPageSource::new(&self.base_url, self.http_settings())
            .with_context(|| format!("cannot build HTTP client for {}", self.base_url))?;
        Ok(Arc::new(source))
    }
}
