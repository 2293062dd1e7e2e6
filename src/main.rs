use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

use foxweb::app::{App, AppEvent};
use foxweb::config::Config;
use foxweb::preferences::PreferenceManager;
use foxweb::storage::{LocalStore, StoreError};
use foxweb::suggestion::{SuggestionLog, SuggestionStatus};
use foxweb::ui;

/// Get the config directory path (~/.config/foxweb/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    let config_dir = PathBuf::from(home).join(".config").join("foxweb");
    Ok(config_dir)
}

/// Send tracing output to `foxweb.log` so it never lands on the TUI.
fn init_logging(config_dir: &Path) -> Result<()> {
    let log_path = config_dir.join("foxweb.log");
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file '{}'", log_path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::sync::Mutex::new(log_file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[derive(Parser, Debug)]
#[command(name = "foxweb", about = "Terminal download directory")]
struct Args {
    /// Catalog JSON file (overrides `catalog_path` in config.toml)
    #[arg(long, value_name = "FILE")]
    catalog: Option<PathBuf>,

    /// Start on the tab named by this URL (e.g. "#juegos" or "/juegos")
    #[arg(long, value_name = "URL")]
    route: Option<String>,

    /// Clear all persisted state (favorites, notifications, suggestions, theme)
    #[arg(long)]
    reset_state: bool,

    /// List submitted suggestions and exit
    #[arg(long)]
    suggestions: bool,

    /// Mark a suggestion as approved and exit
    #[arg(long, value_name = "ID", conflicts_with = "reject")]
    approve: Option<i64>,

    /// Mark a suggestion as rejected and exit
    #[arg(long, value_name = "ID")]
    reject: Option<i64>,
}

/// Handle `--suggestions`, `--approve` and `--reject`.
///
/// Returns `true` when a moderation flag was given and the TUI should not start.
async fn moderate(args: &Args, store: &LocalStore) -> Result<bool> {
    let review = match (args.approve, args.reject) {
        (Some(id), _) => Some((id, SuggestionStatus::Approved)),
        (None, Some(id)) => Some((id, SuggestionStatus::Rejected)),
        (None, None) => None,
    };
    if !args.suggestions && review.is_none() {
        return Ok(false);
    }

    let mut log = SuggestionLog::load(store)
        .await
        .context("Failed to load suggestions")?;

    if let Some((id, status)) = review {
        if !log.set_status(id, status, Utc::now()) {
            anyhow::bail!("No suggestion with id {}", id);
        }
        log.save(store).await.context("Failed to save suggestions")?;
        println!("Suggestion {} marked {}.", id, status);
    }

    if args.suggestions {
        if log.is_empty() {
            println!("No suggestions submitted.");
        }
        for s in log.entries() {
            println!(
                "{:>14}  [{}]  {} ({})  {}  submitted {}",
                s.id,
                s.status,
                s.name,
                s.category.name(),
                s.link,
                s.submitted_at.format("%Y-%m-%d %H:%M")
            );
        }
    }
    Ok(true)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Set up config directory
    let config_dir = get_config_dir()?;
    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir).context("Failed to create config directory")?;
        println!("Created config directory: {}", config_dir.display());
    }

    // User-only access to the config directory
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Err(e) = std::fs::set_permissions(&config_dir, std::fs::Permissions::from_mode(0o700))
        {
            eprintln!(
                "Warning: failed to set permissions on {}: {}",
                config_dir.display(),
                e
            );
        }
    }

    init_logging(&config_dir)?;

    let config = Config::load(&config_dir.join("config.toml")).context("Failed to load config")?;
    let catalog_path = args
        .catalog
        .clone()
        .unwrap_or_else(|| config.catalog_path_in(&config_dir));

    // Open the local store
    let db_path = config_dir.join("foxweb.db");
    let db_path_str = db_path
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("Invalid UTF-8 in store path"))?;
    let store = match LocalStore::open(db_path_str).await {
        Ok(store) => store,
        Err(StoreError::InstanceLocked) => {
            eprintln!(
                "Error: Another instance of foxweb appears to be running. Please close it and try again."
            );
            std::process::exit(1);
        }
        Err(e) => {
            return Err(anyhow::anyhow!("Failed to open local store: {}", e));
        }
    };

    if args.reset_state {
        let removed = store.clear().await.context("Failed to reset state")?;
        tracing::info!(removed, "Persisted state cleared");
        println!("State reset ({} keys removed).", removed);
    }

    if moderate(&args, &store).await? {
        return Ok(());
    }

    let prefs = match PreferenceManager::load(&config, &store).await {
        Ok(prefs) => prefs,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load preferences, using config defaults");
            PreferenceManager::from_config(&config)
        }
    };

    // Create app state
    let mut app = App::new(store, prefs, catalog_path);
    for warning in app.keybindings.apply_overrides(&config.keybindings) {
        tracing::warn!("{}", warning);
    }
    app.load_session(args.route.as_deref(), Utc::now()).await;

    // Create event channel for background tasks
    let (event_tx, event_rx) = mpsc::channel::<AppEvent>(32);

    // Run the TUI
    ui::run(&mut app, event_tx, event_rx).await?;

    println!("Goodbye!");
    Ok(())
}
