//! Forum Structure Handlers
//!
//! Public reads of the zone/forum/subforum tree plus the admin node CRUD.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use super::parse_id;
use crate::application::dto::request::{CreateForumNodeRequest, UpdateForumNodeRequest};
use crate::application::dto::response::{ForumNodeResponse, StructureNodeResponse};
use crate::application::services::forum_service::{CreateNodeParams, UpdateNodeParams};
use crate::application::services::{ForumError, ForumService, ForumServiceImpl};
use crate::domain::NodeKind;
use crate::infrastructure::cache::{keys, Cache, RedisCache};
use crate::infrastructure::repositories::PgForumNodeRepository;
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

const STRUCTURE_CACHE_TTL_SECS: u64 = 60;

fn forum_service(state: &AppState) -> ForumServiceImpl<PgForumNodeRepository> {
    let forum_repo = Arc::new(PgForumNodeRepository::new(state.db.clone()));
    ForumServiceImpl::new(forum_repo, state.snowflake.clone())
}

fn structure_cache(state: &AppState) -> RedisCache {
    RedisCache::with_prefix(state.redis.clone(), "degentalk:")
}

/// Drop the cached structure tree after a node mutation. Reads fall
/// back to the database, so cache failures only cost a warning.
async fn invalidate_structure_cache(state: &AppState) {
    if let Err(e) = structure_cache(state).delete(keys::FORUM_STRUCTURE).await {
        tracing::warn!("Failed to invalidate structure cache: {}", e);
    }
}

fn map_forum_error(e: ForumError) -> AppError {
    match e {
        ForumError::NotFound => AppError::NotFound("Forum node not found".into()),
        ForumError::SlugTaken => AppError::Conflict("Slug already taken".into()),
        ForumError::InvalidParent(msg) => AppError::BadRequest(msg),
        ForumError::Internal(msg) => AppError::Internal(msg),
    }
}

/// Get the nested forum structure tree
pub async fn get_structure(
    State(state): State<AppState>,
) -> Result<Json<Vec<StructureNodeResponse>>, AppError> {
    let cache = structure_cache(&state);
    match cache
        .get::<Vec<StructureNodeResponse>>(keys::FORUM_STRUCTURE)
        .await
    {
        Ok(Some(tree)) => return Ok(Json(tree)),
        Ok(None) => {}
        Err(e) => tracing::warn!("Structure cache read failed: {}", e),
    }

    let tree = forum_service(&state)
        .structure()
        .await
        .map_err(map_forum_error)?;

    let response: Vec<StructureNodeResponse> = tree.into_iter().map(Into::into).collect();

    if let Err(e) = cache
        .set_ex(keys::FORUM_STRUCTURE, &response, STRUCTURE_CACHE_TTL_SECS)
        .await
    {
        tracing::warn!("Structure cache write failed: {}", e);
    }

    Ok(Json(response))
}

/// Get a single forum node by id
pub async fn get_node(
    State(state): State<AppState>,
    Path(node_id): Path<String>,
) -> Result<Json<ForumNodeResponse>, AppError> {
    let node_id = parse_id(&node_id, "forum node")?;

    let node = forum_service(&state)
        .get_node(node_id)
        .await
        .map_err(map_forum_error)?;

    Ok(Json(node.into()))
}

/// Get a single forum node by slug
pub async fn get_node_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ForumNodeResponse>, AppError> {
    let node = forum_service(&state)
        .get_node_by_slug(&slug)
        .await
        .map_err(map_forum_error)?;

    Ok(Json(node.into()))
}

/// Create a forum node (admin)
pub async fn create_node(
    State(state): State<AppState>,
    Json(body): Json<CreateForumNodeRequest>,
) -> Result<(StatusCode, Json<ForumNodeResponse>), AppError> {
    body.validate().map_err(validation_error)?;

    let parent_id = body
        .parent_id
        .as_deref()
        .map(|raw| parse_id(raw, "parent node"))
        .transpose()?;

    let params = CreateNodeParams {
        parent_id,
        kind: NodeKind::from_str(&body.kind),
        name: body.name,
        slug: body.slug,
        description: body.description,
        position: body.position.unwrap_or(0),
        xp_multiplier: body.xp_multiplier.unwrap_or(1.0),
    };

    let node = forum_service(&state)
        .create_node(params)
        .await
        .map_err(map_forum_error)?;

    invalidate_structure_cache(&state).await;

    Ok((StatusCode::CREATED, Json(node.into())))
}

/// Update a forum node (admin)
pub async fn update_node(
    State(state): State<AppState>,
    Path(node_id): Path<String>,
    Json(body): Json<UpdateForumNodeRequest>,
) -> Result<Json<ForumNodeResponse>, AppError> {
    body.validate().map_err(validation_error)?;
    let node_id = parse_id(&node_id, "forum node")?;

    let params = UpdateNodeParams {
        name: body.name,
        description: body.description,
        position: body.position,
        xp_multiplier: body.xp_multiplier,
        is_locked: body.is_locked,
    };

    let node = forum_service(&state)
        .update_node(node_id, params)
        .await
        .map_err(map_forum_error)?;

    invalidate_structure_cache(&state).await;

    Ok(Json(node.into()))
}

/// Delete a childless forum node (admin)
pub async fn delete_node(
    State(state): State<AppState>,
    Path(node_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let node_id = parse_id(&node_id, "forum node")?;

    forum_service(&state)
        .delete_node(node_id)
        .await
        .map_err(map_forum_error)?;

    invalidate_structure_cache(&state).await;

    Ok(StatusCode::NO_CONTENT)
}
