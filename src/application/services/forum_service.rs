//! Forum Service
//!
//! Reads and administers the zone/forum/subforum hierarchy and serves the
//! nested structure tree.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::services::{build_structure, StructureNode};
use crate::domain::{ForumNode, ForumNodeRepository, NodeKind};
use crate::shared::snowflake::SnowflakeGenerator;

/// Forum service errors
#[derive(Debug, thiserror::Error)]
pub enum ForumError {
    #[error("Forum node not found")]
    NotFound,

    #[error("Slug already taken")]
    SlugTaken,

    #[error("Invalid parent: {0}")]
    InvalidParent(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Parameters for creating a node, already parsed and validated.
#[derive(Debug)]
pub struct CreateNodeParams {
    pub parent_id: Option<i64>,
    pub kind: NodeKind,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub position: i32,
    pub xp_multiplier: f64,
}

/// Parameters for updating a node. None fields are left unchanged.
#[derive(Debug, Default)]
pub struct UpdateNodeParams {
    pub name: Option<String>,
    pub description: Option<String>,
    pub position: Option<i32>,
    pub xp_multiplier: Option<f64>,
    pub is_locked: Option<bool>,
}

/// Forum service trait for dependency injection
#[async_trait]
pub trait ForumService: Send + Sync {
    /// The nested structure tree, ordered and with counts aggregated.
    async fn structure(&self) -> Result<Vec<StructureNode>, ForumError>;

    /// Look up a single node.
    async fn get_node(&self, id: i64) -> Result<ForumNode, ForumError>;

    /// Look up a node by slug.
    async fn get_node_by_slug(&self, slug: &str) -> Result<ForumNode, ForumError>;

    /// Create a node (admin).
    async fn create_node(&self, params: CreateNodeParams) -> Result<ForumNode, ForumError>;

    /// Update a node (admin).
    async fn update_node(&self, id: i64, params: UpdateNodeParams)
        -> Result<ForumNode, ForumError>;

    /// Delete a childless node (admin).
    async fn delete_node(&self, id: i64) -> Result<(), ForumError>;
}

/// ForumService implementation
pub struct ForumServiceImpl<F>
where
    F: ForumNodeRepository,
{
    forum_repo: Arc<F>,
    id_generator: Arc<SnowflakeGenerator>,
}

impl<F> ForumServiceImpl<F>
where
    F: ForumNodeRepository,
{
    pub fn new(forum_repo: Arc<F>, id_generator: Arc<SnowflakeGenerator>) -> Self {
        Self {
            forum_repo,
            id_generator,
        }
    }

    /// Zones have no parent; forums and subforums must have one of the
    /// right kind.
    async fn check_parent(
        &self,
        kind: NodeKind,
        parent_id: Option<i64>,
    ) -> Result<(), ForumError> {
        match (kind, parent_id) {
            (NodeKind::Zone, None) => Ok(()),
            (NodeKind::Zone, Some(_)) => {
                Err(ForumError::InvalidParent("Zones cannot have a parent".into()))
            }
            (_, None) => Err(ForumError::InvalidParent(format!(
                "A {} requires a parent",
                kind
            ))),
            (child_kind, Some(pid)) => {
                let parent = self
                    .forum_repo
                    .find_by_id(pid)
                    .await
                    .map_err(|e| ForumError::Internal(e.to_string()))?
                    .ok_or(ForumError::NotFound)?;

                let ok = matches!(
                    (parent.kind, child_kind),
                    (NodeKind::Zone, NodeKind::Forum) | (NodeKind::Forum, NodeKind::Subforum)
                );
                if ok {
                    Ok(())
                } else {
                    Err(ForumError::InvalidParent(format!(
                        "A {} cannot be placed under a {}",
                        child_kind, parent.kind
                    )))
                }
            }
        }
    }
}

#[async_trait]
impl<F> ForumService for ForumServiceImpl<F>
where
    F: ForumNodeRepository + 'static,
{
    async fn structure(&self) -> Result<Vec<StructureNode>, ForumError> {
        let nodes = self
            .forum_repo
            .find_all()
            .await
            .map_err(|e| ForumError::Internal(e.to_string()))?;

        Ok(build_structure(nodes))
    }

    async fn get_node(&self, id: i64) -> Result<ForumNode, ForumError> {
        self.forum_repo
            .find_by_id(id)
            .await
            .map_err(|e| ForumError::Internal(e.to_string()))?
            .ok_or(ForumError::NotFound)
    }

    async fn get_node_by_slug(&self, slug: &str) -> Result<ForumNode, ForumError> {
        self.forum_repo
            .find_by_slug(slug)
            .await
            .map_err(|e| ForumError::Internal(e.to_string()))?
            .ok_or(ForumError::NotFound)
    }

    async fn create_node(&self, params: CreateNodeParams) -> Result<ForumNode, ForumError> {
        if self
            .forum_repo
            .slug_exists(&params.slug)
            .await
            .map_err(|e| ForumError::Internal(e.to_string()))?
        {
            return Err(ForumError::SlugTaken);
        }

        self.check_parent(params.kind, params.parent_id).await?;

        let now = Utc::now();
        let node = ForumNode {
            id: self.id_generator.generate(),
            parent_id: params.parent_id,
            kind: params.kind,
            name: params.name,
            slug: params.slug,
            description: params.description,
            position: params.position,
            xp_multiplier: params.xp_multiplier,
            is_locked: false,
            thread_count: 0,
            post_count: 0,
            created_at: now,
            updated_at: now,
        };

        self.forum_repo
            .create(&node)
            .await
            .map_err(|e| ForumError::Internal(e.to_string()))
    }

    async fn update_node(
        &self,
        id: i64,
        params: UpdateNodeParams,
    ) -> Result<ForumNode, ForumError> {
        let mut node = self.get_node(id).await?;

        if let Some(name) = params.name {
            node.name = name;
        }
        if let Some(description) = params.description {
            node.description = Some(description);
        }
        if let Some(position) = params.position {
            node.position = position;
        }
        if let Some(xp_multiplier) = params.xp_multiplier {
            node.xp_multiplier = xp_multiplier;
        }
        if let Some(is_locked) = params.is_locked {
            node.is_locked = is_locked;
        }

        self.forum_repo
            .update(&node)
            .await
            .map_err(|e| ForumError::Internal(e.to_string()))
    }

    async fn delete_node(&self, id: i64) -> Result<(), ForumError> {
        self.forum_repo.delete(id).await.map_err(|e| match e {
            crate::shared::error::AppError::NotFound(_) => ForumError::NotFound,
            crate::shared::error::AppError::Conflict(msg) => ForumError::InvalidParent(msg),
            e => ForumError::Internal(e.to_string()),
        })
    }
}
