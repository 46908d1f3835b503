//! Forum Structure Builder
//!
//! Turns the flat `forum_nodes` rows into the nested zone/forum/subforum
//! tree the structure endpoint serves. Orphaned nodes (parent missing from
//! the input set) are skipped with a warning rather than failing the whole
//! response. Thread and post counts are aggregated upward so a zone reports
//! the totals of everything beneath it.

use std::collections::HashMap;

use serde::Serialize;

use crate::domain::entities::{ForumNode, NodeKind};

/// A forum node with its children resolved.
#[derive(Debug, Clone, Serialize)]
pub struct StructureNode {
    pub id: i64,
    pub kind: NodeKind,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub position: i32,
    pub xp_multiplier: f64,
    /// Own threads plus all descendants'
    pub thread_count: i64,
    /// Own posts plus all descendants'
    pub post_count: i64,
    pub children: Vec<StructureNode>,
}

impl StructureNode {
    fn from_node(node: &ForumNode) -> Self {
        Self {
            id: node.id,
            kind: node.kind,
            name: node.name.clone(),
            slug: node.slug.clone(),
            description: node.description.clone(),
            position: node.position,
            xp_multiplier: node.xp_multiplier,
            thread_count: node.thread_count,
            post_count: node.post_count,
            children: Vec::new(),
        }
    }
}

/// Build the nested structure tree from flat rows.
///
/// Ordering is by `position` then name at every level. Roots are nodes with
/// no parent; a node whose parent id is set but absent from the input is an
/// orphan and is dropped.
pub fn build_structure(nodes: Vec<ForumNode>) -> Vec<StructureNode> {
    let ids: std::collections::HashSet<i64> = nodes.iter().map(|n| n.id).collect();

    let mut children_of: HashMap<i64, Vec<&ForumNode>> = HashMap::new();
    let mut roots: Vec<&ForumNode> = Vec::new();

    for node in &nodes {
        match node.parent_id {
            None => roots.push(node),
            Some(parent_id) if ids.contains(&parent_id) => {
                children_of.entry(parent_id).or_default().push(node);
            }
            Some(parent_id) => {
                tracing::warn!(
                    node_id = node.id,
                    slug = %node.slug,
                    parent_id,
                    "skipping orphaned forum node, parent not found"
                );
            }
        }
    }

    sort_level(&mut roots);
    roots
        .into_iter()
        .map(|root| build_subtree(root, &children_of))
        .collect()
}

fn build_subtree(node: &ForumNode, children_of: &HashMap<i64, Vec<&ForumNode>>) -> StructureNode {
    let mut built = StructureNode::from_node(node);

    if let Some(children) = children_of.get(&node.id) {
        let mut children = children.clone();
        sort_level(&mut children);
        for child in children {
            let child_node = build_subtree(child, children_of);
            built.thread_count += child_node.thread_count;
            built.post_count += child_node.post_count;
            built.children.push(child_node);
        }
    }

    built
}

fn sort_level(nodes: &mut [&ForumNode]) {
    nodes.sort_by(|a, b| {
        a.position
            .cmp(&b.position)
            .then_with(|| a.name.cmp(&b.name))
    });
}
