use std::path::PathBuf;

use article_search::Result;
use article_search::commands::{
    check_indexes, delete_collection, import_articles, list_articles, list_collections,
    search_collection, serve,
};
use article_search::config::{run_interactive_config, show_config};
use article_search::database::sqlite::PublishedFilter;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "article-search")]
#[command(about = "Nearest-neighbor search over imported article collections")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configure search and database settings
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
    /// Import articles from a JSON array or JSON-lines file
    Import {
        /// Collection to import into, created if missing
        collection: String,
        /// Path to the article file
        file: PathBuf,
    },
    /// List collections with their article counts
    Collections,
    /// List the articles of a collection
    Articles {
        collection: String,
        /// Only articles published in this year
        #[arg(long, conflicts_with_all = ["start_year", "end_year"])]
        year: Option<i32>,
        /// Only articles published in or after this year
        #[arg(long)]
        start_year: Option<i32>,
        /// Only articles published in or before this year
        #[arg(long)]
        end_year: Option<i32>,
    },
    /// Find the articles closest to a free-text query
    Search {
        collection: String,
        query: String,
        /// Number of results, defaults to the configured neighbor count
        #[arg(long, short = 'n')]
        limit: Option<usize>,
    },
    /// Build every collection's index once and report which are searchable
    Warm,
    /// Warm all indexes, then answer JSON-lines search requests on stdin
    Serve,
    /// Delete a collection and its articles
    Delete { collection: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Config { show } => {
            if show {
                show_config()?;
            } else {
                run_interactive_config()?;
            }
        }
        Commands::Import { collection, file } => {
            import_articles(&collection, &file).await?;
        }
        Commands::Collections => {
            list_collections().await?;
        }
        Commands::Articles {
            collection,
            year,
            start_year,
            end_year,
        } => {
            let filter = year.map_or_else(
                || PublishedFilter::between(start_year, end_year),
                PublishedFilter::year,
            );
            list_articles(collection, filter).await?;
        }
        Commands::Search {
            collection,
            query,
            limit,
        } => {
            search_collection(&collection, &query, limit).await?;
        }
        Commands::Warm => {
            check_indexes().await?;
        }
        Commands::Serve => {
            serve().await?;
        }
        Commands::Delete { collection } => {
            delete_collection(collection).await?;
        }
    }

    Ok(())
}
