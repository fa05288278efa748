use api_shared::{CodeDetailRes, SearchRes};
use clap::{Parser, Subcommand};
use hms_core::{
    config::database_path_from_env_value,
    constants::{DEFAULT_OUTLINE_FILENAME, DEFAULT_VERIFY_CHAPTER},
    verify, CodeStore, CoreConfig, ImportService, SearchService, SqliteCodeStore,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "hms")]
#[command(about = "HMS ICD-10 classification CLI")]
struct Cli {
    /// SQLite database file (defaults to HMS_DATABASE_PATH, then hms.db)
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a tab-indented ICD-10 outline
    Import {
        /// Outline file
        #[arg(default_value = DEFAULT_OUTLINE_FILENAME)]
        path: PathBuf,
    },
    /// Search leaf codes by code or description
    Search {
        query: String,
        /// Print the API JSON envelope instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show a code and its direct children
    Show {
        code: String,
        #[arg(long)]
        json: bool,
    },
    /// Print the node count and inspect one chapter
    Verify {
        #[arg(long, default_value = DEFAULT_VERIFY_CHAPTER)]
        chapter: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("hms_core=info".parse()?))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let database = cli.database.unwrap_or_else(|| {
        database_path_from_env_value(std::env::var("HMS_DATABASE_PATH").ok())
    });
    let cfg = CoreConfig::new(database)?;

    let Some(command) = cli.command else {
        println!("Use 'hms --help' for commands");
        return Ok(());
    };

    let store: Arc<dyn CodeStore> = Arc::new(SqliteCodeStore::open(cfg.database_path())?);

    match command {
        Commands::Import { path } => {
            let summary = ImportService::new(store).import_path(&path)?;
            println!("Imported {}: {}", path.display(), summary);
        }
        Commands::Search { query, json } => {
            let nodes = SearchService::with_config(store, &cfg).search(&query)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&SearchRes::ok(nodes))?);
            } else if nodes.is_empty() {
                println!("No matching codes.");
            } else {
                for node in nodes {
                    println!("{:<10} {}", node.code, node.description);
                }
            }
        }
        Commands::Show { code, json } => {
            match SearchService::with_config(store, &cfg).lookup(&code)? {
                Some(detail) if json => {
                    println!("{}", serde_json::to_string_pretty(&CodeDetailRes::ok(detail))?)
                }
                Some(detail) => {
                    println!("{} {}", detail.node.code, detail.node.description);
                    if detail.children.is_empty() {
                        println!("  (leaf)");
                    }
                    for child in detail.children {
                        println!("  {:<10} {}", child.code, child.description);
                    }
                }
                None => eprintln!("Code not found: {}", code),
            }
        }
        Commands::Verify { chapter } => {
            println!("{}", verify(store.as_ref(), &chapter)?);
        }
    }

    Ok(())
}
