//! Card Catalog - MTG card browsing service
//!
//! `import` loads cards from a CSV export into SQLite; `serve` exposes
//! the browse/search API and the web client.

use card_catalog::{open_database, run_import, web};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// MTG card catalog - imports cards from CSV and serves a browse/search API
#[derive(Parser, Debug)]
#[command(name = "card_catalog")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the SQLite database file
    #[arg(short, long, default_value_t = default_db_path())]
    database: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import cards from a CSV file
    Import {
        /// Path to the CSV file
        file: PathBuf,

        /// Limit the number of rows to import
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Serve the HTTP API and web client
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value_t = 8080)]
        port: u16,
    },
}

/// Returns the default database path: ~/.local/share/card_catalog/catalog.db
fn default_db_path() -> String {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("card_catalog")
        .join("catalog.db")
        .to_string_lossy()
        .to_string()
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let db_path = PathBuf::from(&args.database);

    log::info!("Starting card_catalog...");
    log::info!("Database path: {}", db_path.display());

    let mut conn = match open_database(&db_path) {
        Ok(conn) => conn,
        Err(e) => {
            log::error!("Failed to open database: {}", e);
            std::process::exit(1);
        }
    };

    match args.command {
        Command::Import { file, limit } => match run_import(&mut conn, &file, limit) {
            Ok(summary) => {
                println!(
                    "Processed {} cards in {:.2} seconds (Imported: {}, Skipped: {}, Artists created: {})",
                    summary.processed,
                    summary.elapsed.as_secs_f64(),
                    summary.imported,
                    summary.skipped,
                    summary.artists_created
                );
            }
            Err(e) => {
                log::error!("Import failed: {}", e);
                std::process::exit(1);
            }
        },
        Command::Serve { port } => {
            let db = Arc::new(Mutex::new(conn));
            if let Err(e) = web::serve(db, port).await {
                log::error!("Web server error: {}", e);
                std::process::exit(1);
            }
        }
    }
}
