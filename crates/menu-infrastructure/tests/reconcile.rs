//! Menu services against the in-memory store.

use std::sync::Arc;

use serde_json::{json, Value};

use menu_core::domain::{CreateMenu, CreateMenuItem, ItemNode, MenuId, TreeLimits};
use menu_core::error::{DomainError, ErrorKind};
use menu_core::repositories::{MenuStore, MenuTransaction};
use menu_core::services::{ItemService, MenuService, MenuStructureService, ReconcileOutcome};
use menu_infrastructure::MemoryMenuStore;

struct Fixture {
    store: Arc<MemoryMenuStore>,
    menus: MenuService<MemoryMenuStore>,
    items: ItemService<MemoryMenuStore>,
    structure: MenuStructureService<MemoryMenuStore>,
}

impl Fixture {
    fn new() -> Self {
        let store = Arc::new(MemoryMenuStore::new());
        Self {
            menus: MenuService::new(store.clone()),
            items: ItemService::new(store.clone()),
            structure: MenuStructureService::new(store.clone(), TreeLimits::default()),
            store,
        }
    }

    async fn menu(&self, name: &str) -> MenuId {
        self.menus
            .create_menu(CreateMenu {
                name: name.to_string(),
                ..Default::default()
            })
            .await
            .unwrap()
            .id
    }

    async fn item(&self, menu_id: MenuId, title: &str, order: i32, parent_id: Option<i64>) -> i64 {
        self.items
            .create_item(
                menu_id,
                CreateMenuItem {
                    title: Some(title.to_string()),
                    url: Some(format!("/{}", title.to_lowercase())),
                    order: Some(order),
                    parent_id,
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .id
    }

    async fn save(&self, menu_id: MenuId, tree: Value) -> Result<ReconcileOutcome, DomainError> {
        let nodes = ItemNode::parse_tree(&serde_json::to_vec(&tree).unwrap())?;
        self.structure.reconcile(menu_id, &nodes).await
    }

    async fn tree(&self, menu_id: MenuId) -> Vec<ItemNode> {
        self.structure.list_items(menu_id, false).await.unwrap()
    }
}

fn titles(nodes: &[ItemNode]) -> Vec<&str> {
    nodes.iter().filter_map(|n| n.title.as_deref()).collect()
}

#[tokio::test]
async fn test_save_scenario() {
    let fx = Fixture::new();
    let menu_id = fx.menu("Main").await;
    let home = fx.item(menu_id, "Home", 0, None).await;
    let about = fx.item(menu_id, "About", 1, None).await;

    let outcome = fx
        .save(
            menu_id,
            json!([
                {"id": about, "title": "About", "url": "/about"},
                {"title": "Contact", "url": "/contact"}
            ]),
        )
        .await
        .unwrap();

    assert_eq!(
        outcome,
        ReconcileOutcome {
            created: 1,
            updated: 1,
            deleted: 1
        }
    );

    let tree = fx.tree(menu_id).await;
    assert_eq!(titles(&tree), vec!["About", "Contact"]);
    assert_eq!(tree[0].id, Some(about));
    assert_eq!(tree[0].order, Some(0));
    assert_eq!(tree[1].order, Some(1));
    assert_eq!(tree[1].url.as_deref(), Some("/contact"));
    assert!(fx.store.list_items(menu_id).await.unwrap().iter().all(|i| i.id != home));
}

#[tokio::test]
async fn test_saving_the_read_tree_is_idempotent() {
    let fx = Fixture::new();
    let menu_id = fx.menu("Main").await;
    fx.save(
        menu_id,
        json!([
            {"title": "Products", "url": "/products", "children": [
                {"title": "Shoes", "url": "/shoes", "icon": "fa fa-shoe"},
                {"title": "Hats", "url": "/hats", "is_external": true}
            ]},
            {"title": "Blog", "url": "https://blog.example.com", "css_class": "ext"}
        ]),
    )
    .await
    .unwrap();

    let before = fx.tree(menu_id).await;
    let outcome = fx
        .save(menu_id, serde_json::to_value(&before).unwrap())
        .await
        .unwrap();
    let after = fx.tree(menu_id).await;

    assert_eq!(before, after);
    assert_eq!(outcome.created, 0);
    assert_eq!(outcome.deleted, 0);
    assert_eq!(outcome.updated, 4);
}

#[tokio::test]
async fn test_order_is_local_to_each_sibling_list() {
    let fx = Fixture::new();
    let menu_id = fx.menu("Main").await;

    fx.save(
        menu_id,
        json!([
            {"title": "A", "children": [{"title": "C"}, {"title": "D"}]},
            {"title": "B", "children": [{"title": "E"}]}
        ]),
    )
    .await
    .unwrap();

    let tree = fx.tree(menu_id).await;
    assert_eq!(titles(&tree), vec!["A", "B"]);
    assert_eq!(tree[1].order, Some(1));
    assert_eq!(tree[0].children[0].order, Some(0));
    assert_eq!(tree[0].children[1].order, Some(1));
    assert_eq!(tree[1].children[0].order, Some(0));
    assert_eq!(titles(&tree[1].children), vec!["E"]);
}

#[tokio::test]
async fn test_empty_submission_prunes_everything() {
    let fx = Fixture::new();
    let menu_id = fx.menu("Main").await;
    let home = fx.item(menu_id, "Home", 0, None).await;
    fx.item(menu_id, "News", 0, Some(home)).await;

    let outcome = fx.save(menu_id, json!([])).await.unwrap();

    assert_eq!(outcome.deleted, 2);
    assert!(fx.tree(menu_id).await.is_empty());
}

#[tokio::test]
async fn test_new_nodes_get_defaults() {
    let fx = Fixture::new();
    let menu_id = fx.menu("Main").await;

    fx.save(menu_id, json!([{"id": null, "children": null}, {"id": 0}]))
        .await
        .unwrap();

    let tree = fx.tree(menu_id).await;
    assert_eq!(tree.len(), 2);
    assert_eq!(tree[0].title.as_deref(), Some("New Item"));
    assert_eq!(tree[0].url.as_deref(), Some("#"));
    assert_eq!(tree[0].is_external, Some(false));
    assert_eq!(tree[0].css_class.as_deref(), Some(""));
}

#[tokio::test]
async fn test_unknown_id_creates_a_new_item() {
    let fx = Fixture::new();
    let menu_id = fx.menu("Main").await;
    let other_menu = fx.menu("Footer").await;
    let foreign = fx.item(other_menu, "Legal", 0, None).await;

    let outcome = fx
        .save(
            menu_id,
            json!([{"id": 999, "title": "Ghost"}, {"id": foreign, "title": "Borrowed"}]),
        )
        .await
        .unwrap();

    assert_eq!(outcome.created, 2);
    let tree = fx.tree(menu_id).await;
    assert!(tree.iter().all(|n| n.id != Some(999) && n.id != Some(foreign)));

    // The item of the other menu is untouched.
    let footer = fx.tree(other_menu).await;
    assert_eq!(titles(&footer), vec!["Legal"]);
}

#[tokio::test]
async fn test_id_of_an_item_created_in_the_same_save_is_new() {
    let fx = Fixture::new();
    let menu_id = fx.menu("Main").await;

    // The store hands out id 1 to the first node created below.
    let outcome = fx
        .save(menu_id, json!([{"title": "X"}, {"id": 1, "title": "Y"}]))
        .await
        .unwrap();

    assert_eq!(outcome, ReconcileOutcome { created: 2, updated: 0, deleted: 0 });
    assert_eq!(titles(&fx.tree(menu_id).await), vec!["X", "Y"]);
}

#[tokio::test]
async fn test_child_id_equal_to_its_fresh_parent_is_new() {
    let fx = Fixture::new();
    let menu_id = fx.menu("Main").await;

    let outcome = fx
        .save(menu_id, json!([{"title": "X", "children": [{"id": 1, "title": "Y"}]}]))
        .await
        .unwrap();

    assert_eq!(outcome.created, 2);
    let tree = fx.tree(menu_id).await;
    assert_eq!(titles(&tree), vec!["X"]);
    assert_eq!(titles(&tree[0].children), vec!["Y"]);
    assert_ne!(tree[0].children[0].id, tree[0].id);
}

#[tokio::test]
async fn test_update_keeps_stored_title_when_omitted() {
    let fx = Fixture::new();
    let menu_id = fx.menu("Main").await;
    let home = fx.item(menu_id, "Home", 0, None).await;

    fx.save(menu_id, json!([{"id": home}])).await.unwrap();

    let tree = fx.tree(menu_id).await;
    assert_eq!(tree[0].title.as_deref(), Some("Home"));
    assert_eq!(tree[0].url.as_deref(), Some("/home"));
}

#[tokio::test]
async fn test_kept_child_of_pruned_parent_moves_to_submitted_position() {
    let fx = Fixture::new();
    let menu_id = fx.menu("Main").await;
    let home = fx.item(menu_id, "Home", 0, None).await;
    let news = fx.item(menu_id, "News", 0, Some(home)).await;
    let about = fx.item(menu_id, "About", 1, None).await;

    let outcome = fx
        .save(
            menu_id,
            json!([{"id": about, "children": [{"id": news}]}]),
        )
        .await
        .unwrap();

    assert_eq!(outcome.deleted, 1);
    let tree = fx.tree(menu_id).await;
    assert_eq!(titles(&tree), vec!["About"]);
    assert_eq!(tree[0].children[0].id, Some(news));
}

#[tokio::test]
async fn test_failed_save_leaves_menu_unchanged() {
    let fx = Fixture::new();
    let menu_id = fx.menu("Main").await;
    let home = fx.item(menu_id, "Home", 0, None).await;
    fx.item(menu_id, "About", 1, None).await;
    let before = fx.tree(menu_id).await;

    // Delete succeeds, the first upsert succeeds, the second one fails.
    fx.store.fail_after_writes(2);
    let err = fx
        .save(
            menu_id,
            json!([{"id": home, "title": "Start"}, {"title": "Contact"}]),
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Persistence);
    assert_eq!(fx.tree(menu_id).await, before);
}

#[tokio::test]
async fn test_repeated_id_is_rejected_without_writes() {
    let fx = Fixture::new();
    let menu_id = fx.menu("Main").await;
    let home = fx.item(menu_id, "Home", 0, None).await;
    let before = fx.tree(menu_id).await;

    let err = fx
        .save(menu_id, json!([{"id": home, "children": [{"id": home}]}]))
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::DuplicateItemId(id) if id == home));
    assert_eq!(fx.tree(menu_id).await, before);
}

#[tokio::test]
async fn test_save_to_unknown_menu() {
    let fx = Fixture::new();
    let err = fx.save(42, json!([])).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_delete_item_cascades() {
    let fx = Fixture::new();
    let menu_id = fx.menu("Main").await;
    let home = fx.item(menu_id, "Home", 0, None).await;
    let news = fx.item(menu_id, "News", 0, Some(home)).await;
    fx.item(menu_id, "Archive", 0, Some(news)).await;
    fx.item(menu_id, "About", 1, None).await;

    let deleted = fx.items.delete_item(home).await.unwrap();

    assert_eq!(deleted.len(), 3);
    assert_eq!(deleted[0], home);
    assert_eq!(titles(&fx.tree(menu_id).await), vec!["About"]);

    let err = fx.items.delete_item(home).await.unwrap_err();
    assert!(matches!(err, DomainError::ItemNotFound(_)));
}

#[tokio::test]
async fn test_create_item_with_parent_from_another_menu() {
    let fx = Fixture::new();
    let main = fx.menu("Main").await;
    let footer = fx.menu("Footer").await;
    let legal = fx.item(footer, "Legal", 0, None).await;

    let err = fx
        .items
        .create_item(
            main,
            CreateMenuItem {
                parent_id: Some(legal),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(fx.tree(main).await.is_empty());
}

#[tokio::test]
async fn test_active_only_hides_inactive_subtrees() {
    let fx = Fixture::new();
    let menu_id = fx.menu("Main").await;
    let home = fx.item(menu_id, "Home", 0, None).await;
    fx.item(menu_id, "News", 0, Some(home)).await;

    let mut hidden = fx.store.find_item(home).await.unwrap().unwrap();
    hidden.is_active = false;
    let mut tx = fx.store.begin(menu_id).await.unwrap();
    tx.update_item(&hidden).await.unwrap();
    tx.commit().await.unwrap();

    let visible = fx.structure.list_items(menu_id, true).await.unwrap();
    assert!(visible.is_empty());
    assert_eq!(fx.tree(menu_id).await.len(), 1);
}

#[tokio::test]
async fn test_delete_menu_removes_items() {
    let fx = Fixture::new();
    let menu_id = fx.menu("Main").await;
    let home = fx.item(menu_id, "Home", 0, None).await;
    fx.item(menu_id, "News", 0, Some(home)).await;

    let deleted = fx.menus.delete_menu(menu_id).await.unwrap();

    assert_eq!(deleted, 2);
    assert!(fx.menus.get_menu(menu_id).await.is_err());
    assert!(fx.store.find_item(home).await.unwrap().is_none());
}
