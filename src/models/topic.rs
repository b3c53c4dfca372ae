// src/models/topic.rs

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use sqlx::FromRow;

/// Lowercase, hyphen-separated URL slug (e.g. "javascript", "web-security").
pub static SLUG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("slug pattern is valid"));

pub fn is_valid_slug(slug: &str) -> bool {
    slug.len() <= 100 && SLUG_REGEX.is_match(slug)
}

/// Represents the 'topics' table in the database.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Topic {
    pub id: i64,
    pub name: String,

    /// Unique and immutable once created.
    pub slug: String,

    pub description: Option<String>,
    pub icon: Option<String>,
    pub difficulty: String,
    pub is_active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Topic header returned when a quiz starts.
#[derive(Debug, Clone, Serialize)]
pub struct TopicSummary {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub icon: Option<String>,
}

impl From<&Topic> for TopicSummary {
    fn from(topic: &Topic) -> Self {
        Self {
            id: topic.id,
            name: topic.name.clone(),
            slug: topic.slug.clone(),
            description: topic.description.clone(),
            icon: topic.icon.clone(),
        }
    }
}

/// Catalogue entry: an active topic with the size of its question pool.
#[derive(Debug, Serialize, FromRow)]
pub struct TopicListing {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub difficulty: String,
    pub question_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_pattern() {
        assert!(is_valid_slug("javascript"));
        assert!(is_valid_slug("web-security-101"));
        assert!(!is_valid_slug("JavaScript"));
        assert!(!is_valid_slug("-leading"));
        assert!(!is_valid_slug("double--hyphen"));
        assert!(!is_valid_slug("with space"));
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug(&"a".repeat(101)));
    }
}
