//! Nested item tree exchanged with the builder UI.
//!
//! The same shape is used in both directions: the read path fills every
//! field, while submitted trees may omit anything but the nesting.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

use menu_shared::constants::{DEFAULT_MAX_DEPTH, DEFAULT_MAX_ITEMS};

use super::menu_item::{ItemFields, ItemId, MenuItem};
use crate::error::DomainError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ItemId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_external: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub css_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub children: Vec<ItemNode>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<ItemNode>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Vec<ItemNode>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Size bounds for a submitted tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeLimits {
    pub max_items: usize,
    pub max_depth: usize,
}

impl Default for TreeLimits {
    fn default() -> Self {
        Self {
            max_items: DEFAULT_MAX_ITEMS,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ItemNode {
    /// Parse a submitted tree from a raw request body.
    pub fn parse_tree(body: &[u8]) -> Result<Vec<ItemNode>, DomainError> {
        Ok(serde_json::from_slice(body)?)
    }

    pub fn from_item(item: &MenuItem, children: Vec<ItemNode>) -> Self {
        Self {
            id: Some(item.id),
            title: Some(item.title.clone()),
            url: Some(item.url.clone()),
            order: Some(item.order),
            is_external: Some(item.is_external),
            css_class: Some(item.css_class.clone()),
            icon: Some(item.icon.clone()),
            children,
        }
    }

    /// Identifier of an existing item. Zero and negative ids count as absent.
    pub fn item_id(&self) -> Option<ItemId> {
        self.id.filter(|id| *id > 0)
    }

    /// Fields for a freshly created item at `order`.
    pub fn fields_for_create(&self, order: i32) -> ItemFields {
        let defaults = ItemFields::default();
        ItemFields {
            title: self.title.clone().unwrap_or(defaults.title),
            url: self.url.clone().unwrap_or(defaults.url),
            order,
            is_external: self.is_external.unwrap_or(defaults.is_external),
            css_class: self.css_class.clone().unwrap_or(defaults.css_class),
            icon: self.icon.clone().unwrap_or(defaults.icon),
        }
    }

    /// Fields for overwriting `existing`. Title and url fall back to the
    /// stored values; the flags and styling reset to their defaults.
    pub fn fields_for_update(&self, existing: &MenuItem, order: i32) -> ItemFields {
        ItemFields {
            title: self.title.clone().unwrap_or_else(|| existing.title.clone()),
            url: self.url.clone().unwrap_or_else(|| existing.url.clone()),
            ..self.fields_for_create(order)
        }
    }
}

/// Collect every item id referenced in `nodes`.
///
/// Also checks the tree before anything is written: ids must be unique
/// (a repeated id is the only way a nested payload can describe a cycle),
/// the tree must fit `limits`, and node fields must pass validation.
pub fn collect_item_ids(
    nodes: &[ItemNode],
    limits: &TreeLimits,
) -> Result<HashSet<ItemId>, DomainError> {
    let mut ids = HashSet::new();
    let mut count = 0usize;
    let mut stack: Vec<(&ItemNode, usize)> = nodes.iter().map(|n| (n, 1)).collect();

    while let Some((node, depth)) = stack.pop() {
        count += 1;
        if count > limits.max_items {
            return Err(DomainError::TreeTooLarge { max: limits.max_items });
        }
        if depth > limits.max_depth {
            return Err(DomainError::TreeTooDeep { max: limits.max_depth });
        }
        if let Some(id) = node.item_id() {
            if !ids.insert(id) {
                return Err(DomainError::DuplicateItemId(id));
            }
        }
        node.fields_for_create(0).validate()?;
        stack.extend(node.children.iter().map(|child| (child, depth + 1)));
    }

    Ok(ids)
}

/// Assemble stored items into nested nodes, siblings sorted by
/// `(order, title, id)`. With `active_only`, inactive items are dropped
/// together with their descendants.
pub fn build_tree(items: Vec<MenuItem>, active_only: bool) -> Vec<ItemNode> {
    let mut by_parent: HashMap<Option<ItemId>, Vec<MenuItem>> = HashMap::new();
    for item in items {
        if active_only && !item.is_active {
            continue;
        }
        by_parent.entry(item.parent_id).or_default().push(item);
    }
    for siblings in by_parent.values_mut() {
        siblings.sort_by(|a, b| {
            a.order
                .cmp(&b.order)
                .then_with(|| a.title.cmp(&b.title))
                .then_with(|| a.id.cmp(&b.id))
        });
    }
    attach_children(None, &mut by_parent)
}

fn attach_children(
    parent_id: Option<ItemId>,
    by_parent: &mut HashMap<Option<ItemId>, Vec<MenuItem>>,
) -> Vec<ItemNode> {
    // Removing the sibling list before descending guarantees termination.
    let siblings = by_parent.remove(&parent_id).unwrap_or_default();
    siblings
        .iter()
        .map(|item| {
            let children = attach_children(Some(item.id), by_parent);
            ItemNode::from_item(item, children)
        })
        .collect()
}

/// `root` followed by all of its descendants among `items`.
pub fn collect_subtree(items: &[MenuItem], root: ItemId) -> Vec<ItemId> {
    let mut children: HashMap<ItemId, Vec<ItemId>> = HashMap::new();
    for item in items {
        if let Some(parent_id) = item.parent_id {
            children.entry(parent_id).or_default().push(item.id);
        }
    }

    let mut seen = HashSet::new();
    let mut subtree = Vec::new();
    let mut pending = vec![root];
    while let Some(id) = pending.pop() {
        if !seen.insert(id) {
            continue;
        }
        subtree.push(id);
        if let Some(kids) = children.get(&id) {
            pending.extend(kids.iter().copied());
        }
    }
    subtree
}
