use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use shelfnote_core::{
    Config, ExtractedRecord, FsHost, NoteCreator, NoteHost, Result as CoreResult, SourceKind, classify, find_url_near,
};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

mod echo;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Create book and blog notes from web pages
#[derive(Parser, Debug)]
#[command(name = "shelfnote")]
#[command(author = "Shelfnote Contributors")]
#[command(version)]
#[command(about = "Create book and blog notes from web pages", long_about = None)]
struct Cli {
    /// Configuration file (default: <config dir>/shelfnote/config.json)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Vault directory notes and templates live in
    #[arg(long, global = true, value_name = "DIR")]
    vault: Option<PathBuf>,

    /// Anthropic API key used for article summaries
    #[arg(long, global = true, env = "ANTHROPIC_API_KEY", hide_env_values = true, value_name = "KEY")]
    api_key: Option<String>,

    /// Model used for article summaries
    #[arg(long, global = true, value_name = "MODEL")]
    model: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch a page and write a note for it into the vault
    Create {
        /// Page URL
        #[arg(value_name = "URL", required_unless_present = "from", conflicts_with = "from")]
        url: Option<String>,

        /// Take the URL from this text file instead, near --cursor
        #[arg(long, value_name = "FILE")]
        from: Option<PathBuf>,

        /// Byte offset in --from to look for a URL around
        #[arg(long, default_value = "0", value_name = "OFFSET")]
        cursor: usize,

        /// Use this saved HTML instead of fetching the page
        #[arg(long, value_name = "FILE")]
        html: Option<PathBuf>,
    },

    /// Extract metadata from a page without writing a note
    Extract {
        /// Page URL
        #[arg(value_name = "URL")]
        url: String,

        /// Use this saved HTML instead of fetching the page
        #[arg(long, value_name = "FILE")]
        html: Option<PathBuf>,

        /// Print the record as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show whether a URL is treated as a book listing or an article
    Classify {
        #[arg(value_name = "URL")]
        url: String,
    },

    /// List Markdown files in the vault
    Templates,

    /// List folders in the vault
    Folders,
}

/// Vault access for the CLI: files through [`FsHost`], notices on stderr.
struct CliHost {
    inner: FsHost,
}

impl NoteHost for CliHost {
    async fn read_file(&self, path: &Path) -> CoreResult<String> {
        self.inner.read_file(path).await
    }

    async fn list_files(&self) -> CoreResult<Vec<PathBuf>> {
        self.inner.list_files().await
    }

    async fn list_folders(&self) -> CoreResult<Vec<PathBuf>> {
        self.inner.list_folders().await
    }

    async fn write_new_file(&self, path: &Path, contents: &str) -> CoreResult<PathBuf> {
        self.inner.write_new_file(path, contents).await
    }

    fn notify(&self, message: &str) {
        echo::print_info(message);
    }

    fn notify_failure(&self, message: &str) {
        echo::print_error(message);
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).with_target(false).init();
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::debug!(path = %path.display(), "config.load");
            Config::load(path).with_context(|| format!("Failed to load config: {}", path.display()))?
        }
        None => {
            tracing::debug!(path = ?Config::default_path(), "config.load_default");
            Config::load_default().context("Failed to load default config")?
        }
    };

    if let Some(vault) = &cli.vault {
        config.vault = vault.clone();
    }
    if let Some(key) = &cli.api_key {
        config.api_key = key.clone();
    }
    if let Some(model) = &cli.model {
        config.model = model.clone();
    }

    tracing::debug!(
        vault = %config.vault.display(),
        model = %config.model,
        vault_flag = cli.vault.is_some(),
        api_key_flag = cli.api_key.is_some(),
        model_flag = cli.model.is_some(),
        "config.overlaid"
    );
    Ok(config)
}

fn read_html(path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read HTML file: {}", path.display()))
}

fn warn_if_unsummarized(config: &Config, url: &str) {
    if classify(url) == SourceKind::Article && config.summarize_articles && config.api_key.trim().is_empty() {
        echo::print_warning("No API key configured; the article summary will be a placeholder");
    }
}

async fn run_create(
    config: Config, url: Option<String>, from: Option<PathBuf>, cursor: usize, html: Option<PathBuf>,
) -> anyhow::Result<ExitCode> {
    let url = match (url, from) {
        (Some(url), _) => url,
        (None, Some(path)) => {
            let text = fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?;
            match find_url_near(&text, cursor) {
                Some(url) => url.to_string(),
                None => bail!("No URL found near offset {} in {}", cursor, path.display()),
            }
        }
        (None, None) => bail!("A URL or --from file is required"),
    };

    warn_if_unsummarized(&config, &url);

    let host = CliHost { inner: FsHost::new(config.vault.clone()) };
    let creator = NoteCreator::new(config, host).context("Failed to set up HTTP clients")?;

    let cancel = CancellationToken::new();
    let watcher = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            watcher.cancel();
        }
    });

    let outcome = match html {
        Some(path) => creator.create_from_html(&url, &read_html(&path)?, &cancel).await,
        None => creator.create(&url, &cancel).await,
    };

    match outcome {
        Ok(note) => {
            echo::print_success(&format!("{} ready", note.record.title().bright_white()));
            Ok(ExitCode::SUCCESS)
        }
        // Already reported through CliHost::notify_failure.
        Err(_) => Ok(ExitCode::FAILURE),
    }
}

async fn run_extract(
    config: Config, url: &str, html: Option<PathBuf>, json: bool, verbose: bool,
) -> anyhow::Result<()> {
    warn_if_unsummarized(&config, url);

    let host = CliHost { inner: FsHost::new(config.vault.clone()) };
    let creator = NoteCreator::new(config, host).context("Failed to set up HTTP clients")?;

    let record: ExtractedRecord = match html {
        Some(path) => {
            if verbose {
                echo::print_step(1, 2, &format!("Reading {}", path.display()));
            }
            let html = read_html(&path)?;
            if verbose {
                echo::print_step(2, 2, "Extracting fields");
            }
            creator.extract_html(url, &html).await?
        }
        None => {
            if verbose {
                echo::print_step(1, 2, &format!("Fetching {}", url.bright_white().underline()));
            }
            creator.extract(url).await.context("Failed to fetch page")?
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        echo::print_record(&record);
    }
    Ok(())
}

async fn list_vault(config: &Config, folders: bool) -> anyhow::Result<()> {
    let host = FsHost::new(config.vault.clone());
    let entries = if folders {
        host.list_folders().await
    } else {
        host.list_files().await.map(|files| {
            files.into_iter().filter(|p| p.extension().is_some_and(|ext| ext == "md")).collect::<Vec<_>>()
        })
    }
    .with_context(|| format!("Failed to read vault: {}", config.vault.display()))?;

    for entry in entries {
        println!("{}", entry.display());
    }
    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = load_config(&cli)?;

    match cli.command {
        Command::Create { url, from, cursor, html } => run_create(config, url, from, cursor, html).await,
        Command::Extract { url, html, json } => {
            run_extract(config, &url, html, json, cli.verbose).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Classify { url } => {
            let kind = match classify(&url) {
                SourceKind::Commerce => "commerce",
                SourceKind::Article => "article",
            };
            println!("{}", kind);
            Ok(ExitCode::SUCCESS)
        }
        Command::Templates => list_vault(&config, false).await.map(|_| ExitCode::SUCCESS),
        Command::Folders => list_vault(&config, true).await.map(|_| ExitCode::SUCCESS),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose {
        echo::print_banner();
        echo::print_info("Debug logging enabled");
    }

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            echo::print_error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}
