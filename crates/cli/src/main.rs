use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use db::{MoodRepository, SessionRepository};
use server::config::{ServerConfig, StorageKind, API_KEY_ENV};
use server::state::{open_store, AppState};
use server::create_router;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_DATA_DIR: &str = ".moodchat";

#[derive(Parser)]
#[command(name = "moodchat")]
#[command(about = "Persona chat backed by a hosted language model", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Directory holding moodchat.toml and the stored chats
    #[arg(long, global = true, default_value = DEFAULT_DATA_DIR)]
    data_dir: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default config and prepare storage
    Init {
        #[arg(long, default_value = "sqlite")]
        storage: StorageKind,
    },
    /// Run the HTTP server
    Serve {
        #[arg(short, long)]
        port: Option<u16>,

        /// Text-generation endpoint
        #[arg(long)]
        api_url: Option<String>,

        #[arg(long)]
        storage: Option<StorageKind>,
    },
    /// Show stored sessions and moods
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Init { storage }) => init(&cli.data_dir, storage).await,
        Some(Commands::Serve {
            port,
            api_url,
            storage,
        }) => serve(&cli.data_dir, port, api_url, storage).await,
        Some(Commands::Status) => status(&cli.data_dir).await,
        None => serve(&cli.data_dir, None, None, None).await,
    }
}

async fn load_config(data_dir: &Path) -> Result<ServerConfig> {
    ServerConfig::load(data_dir)
        .await
        .with_context(|| format!("Failed to read config in {}", data_dir.display()))
}

async fn init(data_dir: &Path, storage: StorageKind) -> Result<()> {
    let config_path = ServerConfig::config_path(data_dir);
    if config_path.exists() {
        println!("Already initialized at {}", config_path.display());
        return Ok(());
    }

    let config = ServerConfig {
        data_dir: data_dir.to_path_buf(),
        storage,
        ..ServerConfig::default()
    };
    let config_path = config.save().await.context("Failed to write config")?;

    tokio::fs::create_dir_all(&config.uploads_dir)
        .await
        .with_context(|| format!("Failed to create {}", config.uploads_dir.display()))?;
    open_store(&config)
        .await
        .context("Failed to prepare storage")?;

    println!();
    println!("Initialized MoodChat in {}", data_dir.display());
    println!();
    println!("Created:");
    println!("  {}", config_path.display());
    match storage {
        StorageKind::Sqlite => println!("  {}", config.database_path().display()),
        StorageKind::Json => println!("  {}/ (on first write)", config.json_store_dir().display()),
        StorageKind::Memory => println!("  (memory storage, nothing persisted)"),
    }
    println!("  {}/", config.uploads_dir.display());
    println!();
    println!("Next steps:");
    println!("  1. export {}=<your token>", API_KEY_ENV);
    println!("  2. Run 'moodchat serve'");

    Ok(())
}

async fn serve(
    data_dir: &Path,
    port: Option<u16>,
    api_url: Option<String>,
    storage: Option<StorageKind>,
) -> Result<()> {
    init_tracing();

    let mut config = load_config(data_dir).await?.with_env();
    if let Some(port) = port {
        config.port = port;
    }
    if let Some(api_url) = api_url {
        config.api_url = api_url;
    }
    if let Some(storage) = storage {
        config.storage = storage;
    }

    tracing::info!(
        data_dir = %config.data_dir.display(),
        storage = %config.storage,
        api_url = %config.api_url,
        dev_mode = config.dev_mode,
        "Starting server"
    );

    let port = config.port;
    let state = AppState::from_config(config)
        .await
        .context("Failed to open storage")?;
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;

    println!();
    println!("MoodChat");
    println!("════════════════════════════════════════");
    println!();
    println!("  API Server:  http://localhost:{}", port);
    println!("  Swagger UI:  http://localhost:{}/swagger-ui", port);
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}

async fn status(data_dir: &Path) -> Result<()> {
    let config_path = ServerConfig::config_path(data_dir);
    if !config_path.exists() {
        println!("Not a MoodChat data directory: {}", data_dir.display());
        println!("Run 'moodchat init' to initialize.");
        return Ok(());
    }

    let config = load_config(data_dir).await?;
    if config.storage == StorageKind::Memory {
        println!("Storage: memory (nothing persisted)");
        return Ok(());
    }

    let store = open_store(&config)
        .await
        .context("Failed to open storage")?;
    let sessions = SessionRepository::load(store.clone()).await.list_sessions().await;
    let moods = MoodRepository::load(store).await.list().await;

    println!();
    println!("Data:    {}", config.data_dir.display());
    println!("Storage: {}", config.storage);
    println!("Model:   {}", config.api_url);
    println!();

    if sessions.is_empty() {
        println!("No chat sessions yet.");
    } else {
        println!("Sessions ({}):", sessions.len());
        for session in &sessions {
            let pinned = session.pinned().count();
            println!(
                "  {} [{}] {} messages, {} pinned",
                session.title,
                session.mood.id,
                session.messages.len(),
                pinned
            );
        }
    }

    let custom: Vec<_> = moods.iter().filter(|m| m.is_custom()).collect();
    println!();
    println!("Moods: {} built-in, {} custom", moods.len() - custom.len(), custom.len());
    for mood in custom {
        println!("  {} ({})", mood.name, mood.id);
    }
    println!();

    Ok(())
}

const DEFAULT_LOG_FILTER: &str =
    "moodchat=info,server=info,orchestrator=info,inference=info,db=info,tower_http=info";

fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .init();
}
