//! Repository for the `blog_posts` table.

use portal_core::types::DbId;
use sqlx::PgPool;

use crate::models::blog_post::{BlogPost, UpdateBlogPost};

const COLUMNS: &str = "id, title, slug, excerpt, content, author_id, is_published, \
                       published_at, created_at, updated_at";

/// Validated fields for a new post.
pub struct NewBlogPost<'a> {
    pub title: &'a str,
    pub slug: &'a str,
    pub content: &'a str,
    pub excerpt: Option<&'a str>,
    pub author_id: DbId,
    pub is_published: bool,
}

pub struct BlogPostRepo;

impl BlogPostRepo {
    /// Insert a post. Duplicate slugs violate `uq_blog_posts_slug`.
    pub async fn create(pool: &PgPool, input: &NewBlogPost<'_>) -> Result<BlogPost, sqlx::Error> {
        let query = format!(
            "INSERT INTO blog_posts (title, slug, content, excerpt, author_id, is_published, published_at)
             VALUES ($1, $2, $3, $4, $5, $6, CASE WHEN $6 THEN NOW() END)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, BlogPost>(&query)
            .bind(input.title)
            .bind(input.slug)
            .bind(input.content)
            .bind(input.excerpt)
            .bind(input.author_id)
            .bind(input.is_published)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<BlogPost>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM blog_posts WHERE id = $1");
        sqlx::query_as::<_, BlogPost>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<BlogPost>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM blog_posts WHERE slug = $1");
        sqlx::query_as::<_, BlogPost>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    /// Posts newest first. Drafts are included only when `include_drafts` is set.
    pub async fn list(
        pool: &PgPool,
        include_drafts: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<BlogPost>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM blog_posts
             WHERE ($1 OR is_published = true)
             ORDER BY COALESCE(published_at, created_at) DESC, id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, BlogPost>(&query)
            .bind(include_drafts)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Apply an update; `slug` is the re-derived slug when the title changed.
    /// Publishing for the first time stamps `published_at`.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateBlogPost,
        slug: Option<&str>,
    ) -> Result<Option<BlogPost>, sqlx::Error> {
        let query = format!(
            "UPDATE blog_posts SET
                title = COALESCE($2, title),
                slug = COALESCE($3, slug),
                content = COALESCE($4, content),
                excerpt = COALESCE($5, excerpt),
                is_published = COALESCE($6, is_published),
                published_at = CASE
                    WHEN $6 = true AND published_at IS NULL THEN NOW()
                    ELSE published_at
                END
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, BlogPost>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(slug)
            .bind(&input.content)
            .bind(&input.excerpt)
            .bind(input.is_published)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM blog_posts WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
