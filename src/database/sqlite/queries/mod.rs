#[cfg(test)]
mod tests;

use super::models::*;
use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

const ARTICLE_COLUMNS: &str = "id, collection, title, summary, published, pdf_link";

pub struct CollectionQueries;

impl CollectionQueries {
    /// Create a collection, or return the existing one with the same name
    #[inline]
    pub async fn create(pool: &SqlitePool, name: &str) -> Result<Collection> {
        let now = Utc::now().naive_utc();
        let inserted =
            sqlx::query("INSERT OR IGNORE INTO collections (name, created_date) VALUES (?, ?)")
                .bind(name)
                .bind(now)
                .execute(pool)
                .await
                .context("Failed to create collection")?
                .rows_affected();

        if inserted > 0 {
            debug!("Created collection {}", name);
        }

        Self::get(pool, name)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Failed to retrieve created collection"))
    }

    #[inline]
    pub async fn get(pool: &SqlitePool, name: &str) -> Result<Option<Collection>> {
        let result = sqlx::query_as::<_, Collection>(
            "SELECT name, created_date FROM collections WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(pool)
        .await
        .context("Failed to get collection by name")?;

        Ok(result)
    }

    #[inline]
    pub async fn list_names(pool: &SqlitePool) -> Result<Vec<String>> {
        let names = sqlx::query_scalar::<_, String>("SELECT name FROM collections ORDER BY name")
            .fetch_all(pool)
            .await
            .context("Failed to list collection names")?;

        Ok(names)
    }

    #[inline]
    pub async fn list_with_counts(pool: &SqlitePool) -> Result<Vec<CollectionSummary>> {
        let summaries = sqlx::query_as::<_, CollectionSummary>(
            r#"
            SELECT c.name AS name,
                   COUNT(a.position) AS article_count
            FROM collections c
            LEFT JOIN articles a ON a.collection = c.name
            GROUP BY c.name
            ORDER BY c.name
            "#,
        )
        .fetch_all(pool)
        .await
        .context("Failed to list collections with counts")?;

        Ok(summaries)
    }

    #[inline]
    pub async fn exists(pool: &SqlitePool, name: &str) -> Result<bool> {
        Ok(Self::get(pool, name).await?.is_some())
    }

    #[inline]
    pub async fn delete(pool: &SqlitePool, name: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM collections WHERE name = ?")
            .bind(name)
            .execute(pool)
            .await
            .context("Failed to delete collection")?;

        Ok(result.rows_affected() > 0)
    }
}

pub struct ArticleQueries;

impl ArticleQueries {
    /// Insert a batch of articles in a single transaction.
    ///
    /// Articles without an id get a fresh UUID. Insertion order becomes the
    /// collection's iteration order.
    #[inline]
    pub async fn insert_batch(
        pool: &SqlitePool,
        collection: &str,
        articles: Vec<NewArticle>,
    ) -> Result<Vec<Article>> {
        let mut tx = pool
            .begin()
            .await
            .context("Failed to begin article import")?;
        let mut inserted = Vec::with_capacity(articles.len());

        for new_article in articles {
            let id = new_article
                .id
                .unwrap_or_else(|| Uuid::new_v4().to_string());

            sqlx::query(
                "INSERT INTO articles (id, collection, title, summary, published, pdf_link) VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(&id)
            .bind(collection)
            .bind(&new_article.title)
            .bind(&new_article.summary)
            .bind(&new_article.published)
            .bind(&new_article.pdf_link)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to insert article {}", id))?;

            inserted.push(Article {
                id,
                collection: collection.to_string(),
                title: new_article.title,
                summary: new_article.summary,
                published: new_article.published,
                pdf_link: new_article.pdf_link,
            });
        }

        tx.commit()
            .await
            .context("Failed to commit article import")?;

        debug!(
            "Inserted {} articles into collection {}",
            inserted.len(),
            collection
        );
        Ok(inserted)
    }

    #[inline]
    pub async fn list_by_collection(pool: &SqlitePool, collection: &str) -> Result<Vec<Article>> {
        let query = format!(
            "SELECT {} FROM articles WHERE collection = ? ORDER BY position ASC",
            ARTICLE_COLUMNS
        );
        let articles = sqlx::query_as::<_, Article>(&query)
            .bind(collection)
            .fetch_all(pool)
            .await
            .context("Failed to list articles for collection")?;

        Ok(articles)
    }

    #[inline]
    pub async fn list_published(
        pool: &SqlitePool,
        collection: &str,
        range: &PublishedRange,
    ) -> Result<Vec<Article>> {
        let mut conditions = vec!["collection = ?"];
        let mut bounds = Vec::new();

        if let Some(from) = &range.from {
            conditions.push("published >= ?");
            bounds.push(from.as_str());
        }

        if let Some(to) = &range.to {
            conditions.push("published <= ?");
            bounds.push(to.as_str());
        }

        let query_str = format!(
            "SELECT {} FROM articles WHERE {} ORDER BY position ASC",
            ARTICLE_COLUMNS,
            conditions.join(" AND ")
        );

        let mut query = sqlx::query_as::<_, Article>(&query_str).bind(collection);
        for bound in bounds {
            query = query.bind(bound);
        }

        let articles = query
            .fetch_all(pool)
            .await
            .context("Failed to list articles by publication date")?;

        Ok(articles)
    }

    #[inline]
    pub async fn count(pool: &SqlitePool, collection: &str) -> Result<i64> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM articles WHERE collection = ?")
                .bind(collection)
                .fetch_one(pool)
                .await
                .context("Failed to count articles")?;

        Ok(count)
    }
}
