//! Handlers for the blog.
//!
//! Reading published posts is public. Writing needs [`Action::ManageBlog`].
//! Slugs are derived from the title and must be unique.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use portal_core::error::CoreError;
use portal_core::pagination::{clamp_limit, clamp_offset};
use portal_core::policy::Action;
use portal_core::slug::slugify;
use portal_core::types::DbId;
use portal_core::workflow::validate_required;
use portal_db::models::blog_post::{BlogListParams, BlogPost, CreateBlogPost, UpdateBlogPost};
use portal_db::repositories::blog_post_repo::NewBlogPost;
use portal_db::repositories::BlogPostRepo;

use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::auth::AuthUser;
use crate::query::{DEFAULT_LIMIT, MAX_LIMIT};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/blog
///
/// Published posts. Blog managers may add `include_drafts=true`.
pub async fn list(
    State(state): State<AppState>,
    user: Option<AuthUser>,
    Query(params): Query<BlogListParams>,
) -> AppResult<Json<DataResponse<Vec<BlogPost>>>> {
    let include_drafts = params.include_drafts && can_manage(user.as_ref());
    let data = BlogPostRepo::list(
        &state.pool,
        include_drafts,
        clamp_limit(params.limit, DEFAULT_LIMIT, MAX_LIMIT),
        clamp_offset(params.offset),
    )
    .await?;
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/blog/{slug}
///
/// Drafts are visible to blog managers only.
pub async fn get_by_slug(
    State(state): State<AppState>,
    user: Option<AuthUser>,
    Path(slug): Path<String>,
) -> AppResult<Json<BlogPost>> {
    let post = BlogPostRepo::find_by_slug(&state.pool, &slug)
        .await?
        .filter(|p| p.is_published || can_manage(user.as_ref()))
        .ok_or_else(|| AppError::NotFound(format!("Blog post '{slug}' not found")))?;
    Ok(Json(post))
}

/// POST /api/v1/blog
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(input): AppJson<CreateBlogPost>,
) -> AppResult<(StatusCode, Json<BlogPost>)> {
    user.authorize(Action::ManageBlog)?;

    let title = validate_required("title", input.title.as_deref())?;
    let content = validate_required("content", input.content.as_deref())?;
    let slug = title_slug(title)?;

    let post = BlogPostRepo::create(
        &state.pool,
        &NewBlogPost {
            title,
            slug: &slug,
            content,
            excerpt: input.excerpt.as_deref(),
            author_id: user.user_id,
            is_published: input.is_published.unwrap_or(false),
        },
    )
    .await?;

    tracing::info!(post_id = post.id, slug = %post.slug, "Blog post created");
    Ok((StatusCode::CREATED, Json(post)))
}

/// PATCH /api/v1/blog/posts/{id}
///
/// Changing the title re-derives the slug.
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<UpdateBlogPost>,
) -> AppResult<Json<BlogPost>> {
    user.authorize(Action::ManageBlog)?;

    let slug = match input.title.as_deref() {
        Some(title) => Some(title_slug(validate_required("title", Some(title))?)?),
        None => None,
    };
    if input.content.is_some() {
        validate_required("content", input.content.as_deref())?;
    }

    let post = BlogPostRepo::update(&state.pool, id, &input, slug.as_deref())
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "BlogPost",
            id,
        }))?;
    Ok(Json(post))
}

/// DELETE /api/v1/blog/posts/{id}
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    user.authorize(Action::ManageBlog)?;
    if BlogPostRepo::delete(&state.pool, id).await? {
        tracing::info!(post_id = id, "Blog post deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "BlogPost",
            id,
        }))
    }
}

fn can_manage(user: Option<&AuthUser>) -> bool {
    user.is_some_and(|u| u.can(Action::ManageBlog))
}

fn title_slug(title: &str) -> AppResult<String> {
    let slug = slugify(title);
    if slug.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "title must contain at least one letter or digit".into(),
        )));
    }
    Ok(slug)
}
