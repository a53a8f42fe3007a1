use anyhow::Context;
use clap::{Parser, Subcommand};
use libris_db::{Collection, DocumentStore, Filter};
use libris_kernel::settings::Settings;

#[derive(Debug, Parser)]
#[command(name = "libris", version, about = "Library catalog and lending service")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server
    Serve,
    /// Load configuration and the store, then report what was found
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load().context("failed to load libris settings")?;
    libris_telemetry::init(&settings.telemetry);

    match cli.command {
        Command::Serve => libris_app::run(settings).await,
        Command::Check => check(&settings).await,
    }
}

async fn check(settings: &Settings) -> anyhow::Result<()> {
    let store = libris_app::open_store(&settings.database).await?;
    let books = store.find_all(Collection::Books, &Filter::all()).await?;
    let users = store.find_all(Collection::Users, &Filter::all()).await?;

    let snapshot = settings
        .database
        .snapshot_path
        .as_ref()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "none (memory only)".to_string());

    println!("environment: {:?}", settings.environment);
    println!("snapshot:    {snapshot}");
    println!("books:       {}", books.len());
    println!("users:       {}", users.len());
    println!(
        "assistant:   {}",
        if settings.assistant.is_configured() {
            settings.assistant.model.as_str()
        } else {
            "not configured"
        }
    );
    Ok(())
}
