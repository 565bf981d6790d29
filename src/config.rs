// src/config.rs
use crate::constants::{
    MAX_REQUEST_RETRIES, MIN_REQUEST_INTERVAL, NOTION_API_BASE_URL, REQUEST_TIMEOUT,
};
use crate::error::AppError;
use crate::error_recovery::RetryPolicy;
use crate::types::{ApiKey, PageId, ValidatedUrl};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable holding the integration token.
pub const API_KEY_ENV: &str = "NOTION_API_KEY";

/// Parsed command-line input.
#[derive(Parser, Debug)]
#[command(name = "notionmd", author, version, about, long_about = None)]
pub struct CommandLineInput {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    /// Notion API base URL
    #[arg(long, global = true, env = "NOTION_BASE_URL", default_value = NOTION_API_BASE_URL)]
    pub base_url: String,

    /// Minimum spacing between API requests, in milliseconds
    #[arg(long, global = true, default_value_t = MIN_REQUEST_INTERVAL.as_millis() as u64)]
    pub min_interval_ms: u64,

    /// Retries for rate-limited or failing requests
    #[arg(long, global = true, default_value_t = MAX_REQUEST_RETRIES)]
    pub max_retries: u32,

    /// Per-request timeout in seconds
    #[arg(long, global = true, default_value_t = REQUEST_TIMEOUT.as_secs())]
    pub timeout_secs: u64,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Parse markdown into block-tree JSON (offline)
    Convert {
        /// Markdown file (stdin when omitted)
        input: Option<PathBuf>,
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Render block-tree JSON as markdown (offline)
    Render {
        /// Block-tree JSON file (stdin when omitted)
        input: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Export a page's content as markdown
    Export {
        /// Page URL or ID
        page: String,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Write markdown into a page
    Import {
        /// Page URL or ID
        page: String,
        /// Markdown file (stdin when omitted)
        input: Option<PathBuf>,
        /// Delete the page's existing content first
        #[arg(long, default_value_t = false)]
        replace: bool,
    },
}

impl Command {
    /// The page this command targets, if it talks to the API.
    pub fn page(&self) -> Option<&str> {
        match self {
            Command::Export { page, .. } | Command::Import { page, .. } => Some(page),
            Command::Convert { .. } | Command::Render { .. } => None,
        }
    }
}

/// Validated settings for the HTTP client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_key: ApiKey,
    pub base_url: String,
    pub timeout: Duration,
    pub min_request_interval: Duration,
    pub retry: RetryPolicy,
}

impl ClientConfig {
    pub fn new(api_key: ApiKey) -> Self {
        Self {
            api_key,
            base_url: NOTION_API_BASE_URL.to_string(),
            timeout: REQUEST_TIMEOUT,
            min_request_interval: MIN_REQUEST_INTERVAL,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_min_request_interval(mut self, interval: Duration) -> Self {
        self.min_request_interval = interval;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Resolves client settings from CLI flags and the environment.
    pub fn resolve(cli: &CommandLineInput) -> Result<Self, AppError> {
        let api_key_str = std::env::var(API_KEY_ENV).map_err(|_| {
            AppError::MissingConfiguration(format!("{} environment variable not set", API_KEY_ENV))
        })?;
        Self::from_parts(ApiKey::new(api_key_str)?, cli)
    }

    fn from_parts(api_key: ApiKey, cli: &CommandLineInput) -> Result<Self, AppError> {
        let base_url = ValidatedUrl::parse(&cli.base_url)?;
        Ok(Self::new(api_key)
            .with_base_url(base_url.as_str())
            .with_min_request_interval(Duration::from_millis(cli.min_interval_ms))
            .with_retry(RetryPolicy {
                max_retries: cli.max_retries,
                ..RetryPolicy::default()
            })
            .with_timeout(Duration::from_secs(cli.timeout_secs)))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Parses a page argument given as a URL or a bare ID.
pub fn resolve_page_id(input: &str) -> Result<PageId, AppError> {
    Ok(PageId::parse(input.trim())?)
}
