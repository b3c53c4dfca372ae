// src/repositories/topics.rs

use sqlx::PgPool;

use crate::models::topic::{Topic, TopicListing};

pub async fn find_active_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Topic>, sqlx::Error> {
    sqlx::query_as::<_, Topic>(
        r#"
        SELECT id, name, slug, description, icon, difficulty, is_active, created_at
        FROM topics
        WHERE slug = $1 AND is_active = TRUE
        "#,
    )
    .bind(slug)
    .fetch_optional(pool)
    .await
}

pub async fn list_active(pool: &PgPool) -> Result<Vec<TopicListing>, sqlx::Error> {
    sqlx::query_as::<_, TopicListing>(
        r#"
        SELECT
            t.id, t.name, t.slug, t.description, t.icon, t.difficulty,
            COUNT(q.id) AS question_count
        FROM topics t
        LEFT JOIN questions q ON q.topic_id = t.id
        WHERE t.is_active = TRUE
        GROUP BY t.id
        ORDER BY t.name
        "#,
    )
    .fetch_all(pool)
    .await
}

pub async fn find_listing_by_slug(
    pool: &PgPool,
    slug: &str,
) -> Result<Option<TopicListing>, sqlx::Error> {
    sqlx::query_as::<_, TopicListing>(
        r#"
        SELECT
            t.id, t.name, t.slug, t.description, t.icon, t.difficulty,
            COUNT(q.id) AS question_count
        FROM topics t
        LEFT JOIN questions q ON q.topic_id = t.id
        WHERE t.slug = $1 AND t.is_active = TRUE
        GROUP BY t.id
        "#,
    )
    .bind(slug)
    .fetch_optional(pool)
    .await
}
