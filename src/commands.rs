use anyhow::{Context, Result, bail};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::BufReader;
use tracing::{info, warn};

use crate::config::Config;
use crate::database::sqlite::{Database, NewArticle, PublishedFilter};
use crate::search::{QueryEngine, RebuildReport, SearchError};
use crate::server::SearchServer;

async fn open_database() -> Result<(Config, Database)> {
    let config = Config::load().context("Failed to load configuration")?;
    let database = Database::from_config(&config)
        .await
        .context("Failed to initialize database")?;
    Ok((config, database))
}

/// Parse an import file holding either a JSON array of articles or one JSON
/// article per line
#[inline]
pub fn parse_articles(contents: &str) -> Result<Vec<NewArticle>> {
    let trimmed = contents.trim_start();
    if trimmed.starts_with('[') {
        return serde_json::from_str(trimmed).context("Invalid JSON article array");
    }

    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(number, line)| {
            serde_json::from_str::<NewArticle>(line)
                .with_context(|| format!("Invalid article on line {}", number + 1))
        })
        .collect()
}

/// Import the articles in `file` into `collection`, creating it if needed.
/// Returns the number of imported articles.
#[inline]
pub async fn import_file(database: &Database, collection: &str, file: &Path) -> Result<usize> {
    let contents = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let articles = parse_articles(&contents)?;

    database
        .create_collection(collection)
        .await
        .with_context(|| format!("Failed to create collection {}", collection))?;

    let inserted = database
        .insert_articles(collection, articles)
        .await
        .with_context(|| format!("Failed to import articles into {}", collection))?;

    info!(
        "Imported {} articles into collection {}",
        inserted.len(),
        collection
    );
    Ok(inserted.len())
}

#[inline]
pub async fn import_articles(collection: &str, file: &Path) -> Result<()> {
    let (_, database) = open_database().await?;
    let count = import_file(&database, collection, file).await?;

    let total = database.count_articles(collection).await?;
    println!(
        "Imported {} articles into '{}' ({} total)",
        count, collection, total
    );
    Ok(())
}

#[inline]
pub async fn list_collections() -> Result<()> {
    let (_, database) = open_database().await?;
    let collections = database
        .list_collections()
        .await
        .context("Failed to list collections")?;

    if collections.is_empty() {
        println!("No collections have been imported yet.");
        println!("Use 'article-search import <collection> <file>' to add one.");
        return Ok(());
    }

    println!("Collections ({} total):", collections.len());
    for collection in &collections {
        println!("  {} ({} articles)", collection.name, collection.article_count);
    }

    Ok(())
}

#[inline]
pub async fn list_articles(collection: String, filter: PublishedFilter) -> Result<()> {
    let (_, database) = open_database().await?;
    if !database.collection_exists(&collection).await? {
        bail!(SearchError::CollectionNotFound(collection));
    }

    let articles = if filter.is_empty() {
        database.list_articles(&collection).await?
    } else {
        database.list_articles_published(&collection, filter).await?
    };

    if articles.is_empty() {
        println!("No articles in '{}' match.", collection);
        return Ok(());
    }

    for article in &articles {
        println!("{}  {}", article.published, article.title);
        if !article.pdf_link.is_empty() {
            println!("    {}", article.pdf_link);
        }
    }
    println!();
    println!("{} articles", articles.len());

    Ok(())
}

#[inline]
pub async fn search_collection(collection: &str, query: &str, limit: Option<usize>) -> Result<()> {
    let (config, database) = open_database().await?;
    let engine = QueryEngine::new(Arc::new(database), &config.search);
    let limit = limit.unwrap_or_else(|| engine.neighbors());

    let hits = engine.search_scored(collection, query, limit).await?;

    println!("Results for '{}' in '{}':", query, collection);
    println!();
    for (rank, hit) in hits.iter().enumerate() {
        println!(
            "{:>2}. {} (distance {:.4})",
            rank + 1,
            hit.article.title,
            hit.distance
        );
        if !hit.article.published.is_empty() {
            println!("    Published: {}", hit.article.published);
        }
        if !hit.article.pdf_link.is_empty() {
            println!("    {}", hit.article.pdf_link);
        }
    }

    Ok(())
}

async fn warm_with_spinner(engine: &QueryEngine) -> Result<RebuildReport> {
    let bar = if console::user_attended_stderr() {
        ProgressBar::new_spinner().with_style(
            ProgressStyle::with_template("{spinner} {msg} [{elapsed}]")
                .expect("style template is valid"),
        )
    } else {
        ProgressBar::hidden()
    };
    bar.set_message("Building collection indexes");
    bar.enable_steady_tick(Duration::from_millis(100));

    let report = engine.warm_up().await;
    bar.finish_and_clear();

    Ok(report?)
}

/// Build every collection's index once and report which collections are
/// searchable. The indexes are not kept; `serve` keeps them in memory.
#[inline]
pub async fn check_indexes() -> Result<()> {
    let (config, database) = open_database().await?;
    let engine = QueryEngine::new(Arc::new(database), &config.search);

    let report = warm_with_spinner(&engine).await?;
    print_report(&report);
    Ok(())
}

/// Warm every collection's index, then answer JSON-lines requests from
/// stdin on stdout until end of input
#[inline]
pub async fn serve() -> Result<()> {
    let (config, database) = open_database().await?;
    let engine = Arc::new(QueryEngine::new(Arc::new(database), &config.search));

    let report = warm_with_spinner(&engine).await?;
    for (collection, e) in &report.failed {
        eprintln!("✗ {}: {}", collection, e);
    }
    eprintln!(
        "{} collections ready, {} failed. Reading requests from stdin.",
        report.ready.len(),
        report.failed.len()
    );

    let server = SearchServer::new(engine);
    server
        .run(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
        .await?;
    Ok(())
}

fn print_report(report: &RebuildReport) {
    for (collection, documents) in &report.ready {
        println!("✓ {} ({} documents indexed)", collection, documents);
    }
    for (collection, e) in &report.failed {
        println!("✗ {}: {}", collection, e);
    }

    println!();
    println!(
        "{} ready, {} failed",
        report.ready.len(),
        report.failed.len()
    );
}

#[inline]
pub async fn delete_collection(collection: String) -> Result<()> {
    let (_, database) = open_database().await?;

    let removed = database
        .delete_collection(&collection)
        .await
        .with_context(|| format!("Failed to delete collection {}", collection))?;

    if removed {
        println!("Deleted collection '{}'", collection);
    } else {
        warn!("Delete requested for unknown collection {}", collection);
        bail!(SearchError::CollectionNotFound(collection));
    }

    Ok(())
}
