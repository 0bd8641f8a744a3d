#[cfg(test)]
mod tests;

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Format used for `published` bounds, matching ISO-8601 without offset
const PUBLISHED_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Collection {
    pub name: String,
    pub created_date: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct CollectionSummary {
    pub name: String,
    pub article_count: i64,
}

/// A stored article. This is the document type the search index is built over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Article {
    pub id: String,
    pub collection: String,
    pub title: String,
    pub summary: String,
    pub published: String,
    pub pdf_link: String,
}

/// An article as accepted by imports. Missing text fields default to empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct NewArticle {
    pub id: Option<String>,
    pub title: String,
    pub summary: String,
    pub published: String,
    pub pdf_link: String,
}

/// Publication-year restriction for article listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PublishedFilter {
    pub year: Option<i32>,
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
}

/// Inclusive `published` bounds derived from a [`PublishedFilter`]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PublishedRange {
    pub from: Option<String>,
    pub to: Option<String>,
}

impl Article {
    /// Title and summary joined by a single space
    #[inline]
    pub fn text(&self) -> String {
        format!("{} {}", self.title, self.summary)
    }
}

impl PublishedFilter {
    #[inline]
    pub fn year(year: i32) -> Self {
        Self {
            year: Some(year),
            ..Self::default()
        }
    }

    #[inline]
    pub fn between(start_year: Option<i32>, end_year: Option<i32>) -> Self {
        Self {
            year: None,
            start_year,
            end_year,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.year.is_none() && self.start_year.is_none() && self.end_year.is_none()
    }

    /// Resolve the filter into string bounds.
    ///
    /// `year` wins over `start_year`/`end_year`. An `end_year` on its own
    /// only bounds the upper end.
    #[inline]
    pub fn range(&self) -> Result<PublishedRange> {
        if let Some(year) = self.year {
            return Ok(PublishedRange {
                from: Some(year_start(year)?),
                to: Some(year_end(year)?),
            });
        }

        let from = self.start_year.map(year_start).transpose()?;
        let to = self.end_year.map(year_end).transpose()?;

        Ok(PublishedRange { from, to })
    }
}

fn year_start(year: i32) -> Result<String> {
    NaiveDate::from_ymd_opt(year, 1, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| dt.format(PUBLISHED_FORMAT).to_string())
        .with_context(|| format!("Invalid publication year: {}", year))
}

fn year_end(year: i32) -> Result<String> {
    NaiveDate::from_ymd_opt(year, 12, 31)
        .and_then(|date| date.and_hms_opt(23, 59, 59))
        .map(|dt| dt.format(PUBLISHED_FORMAT).to_string())
        .with_context(|| format!("Invalid publication year: {}", year))
}
