use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use tracing::{debug, info};

use crate::config::Config;


pub mod models;
pub mod queries;

pub use models::{
    Article, Collection, CollectionSummary, NewArticle, PublishedFilter, PublishedRange,
};
pub use queries::{ArticleQueries, CollectionQueries};

pub type DbPool = Pool<Sqlite>;

const DEFAULT_MAX_CONNECTIONS: u32 = 10;

#[derive(Debug, Clone)]
pub struct Database {
    pool: DbPool,
}

impl Database {
    #[inline]
    pub async fn new<P: AsRef<Path>>(database_path: P) -> Result<Self> {
        Self::with_max_connections(database_path, DEFAULT_MAX_CONNECTIONS).await
    }

    #[inline]
    pub async fn with_max_connections<P: AsRef<Path>>(
        database_path: P,
        max_connections: u32,
    ) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(database_path)
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .context("Failed to create database connection pool")?;

        let database = Self { pool };
        database.run_migrations().await?;

        Ok(database)
    }

    /// Open the database configured for this installation, creating its
    /// directory when needed
    #[inline]
    pub async fn from_config(config: &Config) -> Result<Self> {
        let base_dir = config.get_base_dir();
        std::fs::create_dir_all(base_dir).with_context(|| {
            format!("Failed to create config directory: {}", base_dir.display())
        })?;

        Self::with_max_connections(config.database_path(), config.database.max_connections)
            .await
    }

    #[inline]
    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    #[inline]
    pub async fn run_migrations(&self) -> Result<()> {
        info!("Running database migrations");

        sqlx::migrate!("src/database/sqlite/migrations")
            .run(&self.pool)
            .await
            .context("Failed to run schema migration")?;

        debug!("Database migrations completed successfully");
        Ok(())
    }

    // Collection operations
    #[inline]
    pub async fn create_collection(&self, name: &str) -> Result<Collection> {
        CollectionQueries::create(&self.pool, name).await
    }

    #[inline]
    pub async fn list_collection_names(&self) -> Result<Vec<String>> {
        CollectionQueries::list_names(&self.pool).await
    }

    #[inline]
    pub async fn list_collections(&self) -> Result<Vec<CollectionSummary>> {
        CollectionQueries::list_with_counts(&self.pool).await
    }

    #[inline]
    pub async fn collection_exists(&self, name: &str) -> Result<bool> {
        CollectionQueries::exists(&self.pool, name).await
    }

    #[inline]
    pub async fn delete_collection(&self, name: &str) -> Result<bool> {
        CollectionQueries::delete(&self.pool, name).await
    }

    // Article operations
    #[inline]
    pub async fn insert_articles(
        &self,
        collection: &str,
        articles: Vec<NewArticle>,
    ) -> Result<Vec<Article>> {
        ArticleQueries::insert_batch(&self.pool, collection, articles).await
    }

    #[inline]
    pub async fn list_articles(&self, collection: &str) -> Result<Vec<Article>> {
        ArticleQueries::list_by_collection(&self.pool, collection).await
    }

    #[inline]
    pub async fn list_articles_published(
        &self,
        collection: &str,
        filter: PublishedFilter,
    ) -> Result<Vec<Article>> {
        let range = filter.range()?;
        ArticleQueries::list_published(&self.pool, collection, &range).await
    }

    #[inline]
    pub async fn count_articles(&self, collection: &str) -> Result<i64> {
        ArticleQueries::count(&self.pool, collection).await
    }
}
