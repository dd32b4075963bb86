// ============================================================================
// Menu Core - Menu Structure Service
// File: crates/menu-core/src/services/menu_structure_service.rs
// ============================================================================
//! Reads a menu as a nested tree and reconciles submitted trees against storage.

use std::collections::HashSet;
use std::slice;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::finish;
use crate::domain::{build_tree, collect_item_ids, ItemId, ItemNode, MenuId, NewMenuItem, TreeLimits};
use crate::error::DomainError;
use crate::repositories::{MenuStore, MenuTransaction};

/// Counts of rows touched by one reconciliation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileOutcome {
    pub created: u64,
    pub updated: u64,
    pub deleted: u64,
}

/// Result of pruning: rows deleted and the stored ids that remain.
struct Pruned {
    deleted: u64,
    survivors: HashSet<ItemId>,
}

/// One sibling list of the depth-first walk.
struct Frame<'a> {
    parent_id: Option<ItemId>,
    siblings: slice::Iter<'a, ItemNode>,
    next_order: i32,
}

pub struct MenuStructureService<S: ?Sized> {
    store: Arc<S>,
    limits: TreeLimits,
}

impl<S: MenuStore + ?Sized> MenuStructureService<S> {
    pub fn new(store: Arc<S>, limits: TreeLimits) -> Self {
        Self { store, limits }
    }

    /// Items of a menu as a nested tree, roots first, siblings by order.
    pub async fn list_items(
        &self,
        menu_id: MenuId,
        active_only: bool,
    ) -> Result<Vec<ItemNode>, DomainError> {
        self.store
            .find_menu(menu_id)
            .await?
            .ok_or(DomainError::MenuNotFound(menu_id))?;

        let items = self.store.list_items(menu_id).await?;
        debug!("Loaded {} items for menu {}", items.len(), menu_id);
        Ok(build_tree(items, active_only))
    }

    /// Make the stored items of `menu_id` match `tree`.
    ///
    /// Items whose id is absent from the tree are deleted, then the tree is
    /// walked depth-first: nodes with a known id update that item, all other
    /// nodes create a new one. Order is the position within each sibling list.
    /// Everything runs in one transaction; on error nothing is persisted.
    pub async fn reconcile(
        &self,
        menu_id: MenuId,
        tree: &[ItemNode],
    ) -> Result<ReconcileOutcome, DomainError> {
        let keep_ids = collect_item_ids(tree, &self.limits)?;

        let mut tx = self.store.begin(menu_id).await?;
        let result = apply_tree(tx.as_mut(), tree, &keep_ids).await;
        if let Err(e) = &result {
            warn!("Reconciliation of menu {} failed, rolling back: {}", menu_id, e);
        }
        let outcome = finish(tx, result).await?;

        info!(
            "Menu {} reconciled: {} created, {} updated, {} deleted",
            menu_id, outcome.created, outcome.updated, outcome.deleted
        );
        Ok(outcome)
    }
}

async fn apply_tree(
    tx: &mut dyn MenuTransaction,
    tree: &[ItemNode],
    keep_ids: &HashSet<ItemId>,
) -> Result<ReconcileOutcome, DomainError> {
    let Pruned { deleted, survivors } = prune(tx, keep_ids).await?;
    let mut outcome = ReconcileOutcome {
        deleted,
        ..Default::default()
    };

    let mut stack = vec![Frame {
        parent_id: None,
        siblings: tree.iter(),
        next_order: 0,
    }];

    loop {
        let Some(frame) = stack.last_mut() else { break };
        let Some(node) = frame.siblings.next() else {
            stack.pop();
            continue;
        };
        let parent_id = frame.parent_id;
        let order = frame.next_order;
        frame.next_order += 1;

        let item_id = upsert(tx, node, &survivors, parent_id, order, &mut outcome).await?;

        if !node.children.is_empty() {
            stack.push(Frame {
                parent_id: Some(item_id),
                siblings: node.children.iter(),
                next_order: 0,
            });
        }
    }

    Ok(outcome)
}

/// Delete stored items that the tree no longer references.
///
/// Kept items hanging below a stale parent are detached first so that only
/// the stale rows go; the walk then moves them to their submitted position.
async fn prune(
    tx: &mut dyn MenuTransaction,
    keep_ids: &HashSet<ItemId>,
) -> Result<Pruned, DomainError> {
    let existing = tx.list_items().await?;
    let (survivors, stale): (HashSet<ItemId>, HashSet<ItemId>) = existing
        .iter()
        .map(|item| item.id)
        .partition(|id| keep_ids.contains(id));
    if stale.is_empty() {
        return Ok(Pruned { deleted: 0, survivors });
    }

    for item in &existing {
        let orphaned = !stale.contains(&item.id)
            && item.parent_id.is_some_and(|parent_id| stale.contains(&parent_id));
        if orphaned {
            debug!("Detaching item {} from pruned parent {:?}", item.id, item.parent_id);
            let mut detached = item.clone();
            detached.parent_id = None;
            tx.update_item(&detached).await?;
        }
    }

    let stale_ids: Vec<ItemId> = stale.into_iter().collect();
    let deleted = tx.delete_items(&stale_ids).await?;
    Ok(Pruned { deleted, survivors })
}

/// Update the stored item a node names, or create a new one.
///
/// Only ids that were stored before the walk count as known; an id that
/// happens to match a row created earlier in the same walk is a new item.
async fn upsert(
    tx: &mut dyn MenuTransaction,
    node: &ItemNode,
    survivors: &HashSet<ItemId>,
    parent_id: Option<ItemId>,
    order: i32,
    outcome: &mut ReconcileOutcome,
) -> Result<ItemId, DomainError> {
    if let Some(id) = node.item_id() {
        let known = if survivors.contains(&id) {
            tx.find_item(id).await?
        } else {
            None
        };
        match known {
            Some(mut existing) => {
                let fields = node.fields_for_update(&existing, order);
                existing.apply(parent_id, fields);
                let updated = tx.update_item(&existing).await?;
                outcome.updated += 1;
                return Ok(updated.id);
            }
            None => debug!("Item {} not in menu {}, creating a new item", id, tx.menu_id()),
        }
    }

    let menu_id = tx.menu_id();
    let created = tx
        .insert_item(&NewMenuItem {
            menu_id,
            parent_id,
            fields: node.fields_for_create(order),
        })
        .await?;
    outcome.created += 1;
    Ok(created.id)
}
