//! PostgreSQL repository tests.
//!
//! Ignored by default. Run with a scratch database:
//! `DRIVE_TEST_DATABASE_URL=postgres://... cargo test -p drive-database -- --ignored`

use chrono::Utc;
use uuid::Uuid;

use drive_core::config::database::DatabaseConfig;
use drive_core::types::{PageRequest, SortField, SortKey};
use drive_database::migration::run_migrations;
use drive_database::{
    DatabasePool, FileRepository, FolderRepository, NodeFilter, ParentFilter, PgFileRepository,
    PgFolderRepository,
};
use drive_entity::{CreateFile, CreateFolder, LifecycleState, UpdateFolder};

async fn connect() -> DatabasePool {
    let url = std::env::var("DRIVE_TEST_DATABASE_URL")
        .expect("DRIVE_TEST_DATABASE_URL must point at a scratch database");
    let config = DatabaseConfig {
        url,
        max_connections: 4,
        min_connections: 1,
        ..DatabaseConfig::default()
    };
    let db = DatabasePool::connect(&config).await.unwrap();
    run_migrations(db.pool()).await.unwrap();
    db
}

fn owner() -> String {
    format!("pg-test-{}", Uuid::new_v4())
}

fn folder(name: &str, parent_id: Option<Uuid>, owner_id: &str) -> CreateFolder {
    CreateFolder {
        name: name.to_string(),
        parent_id,
        owner_id: owner_id.to_string(),
    }
}

fn file(name: &str, parent_id: Option<Uuid>, owner_id: &str) -> CreateFile {
    CreateFile {
        name: name.to_string(),
        parent_id,
        owner_id: owner_id.to_string(),
        blob_ref: Uuid::new_v4(),
        mime_type: "text/plain".to_string(),
        byte_size: 3,
        public_url: None,
    }
}

#[tokio::test]
#[ignore = "requires DRIVE_TEST_DATABASE_URL"]
async fn test_folder_rows_are_owner_scoped() {
    let db = connect().await;
    let folders = PgFolderRepository::new(db.pool().clone());
    let me = owner();

    let root = folders.create(&folder("Root", None, &me)).await.unwrap();
    let child = folders
        .create(&folder("Child", Some(root.id), &me))
        .await
        .unwrap();

    assert!(folders.find_by_id(root.id, "someone-else").await.unwrap().is_none());
    assert_eq!(folders.child_ids(root.id, &me).await.unwrap(), vec![child.id]);

    let mut ancestors = folders.ancestor_ids(child.id, &me).await.unwrap();
    ancestors.sort();
    let mut expected = vec![root.id, child.id];
    expected.sort();
    assert_eq!(ancestors, expected);

    let moved = folders
        .update(
            child.id,
            &me,
            &UpdateFolder {
                name: Some("Moved".into()),
                parent_id: Some(None),
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(moved.name, "Moved");
    assert!(moved.parent_id.is_none());
}

#[tokio::test]
#[ignore = "requires DRIVE_TEST_DATABASE_URL"]
async fn test_ensure_state_is_conditional_and_delete_needs_trash() {
    let db = connect().await;
    let folders = PgFolderRepository::new(db.pool().clone());
    let files = PgFileRepository::new(db.pool().clone());
    let me = owner();
    let now = Utc::now();

    let dir = folders.create(&folder("Dir", None, &me)).await.unwrap();
    let a = files.create(&file("a.txt", Some(dir.id), &me)).await.unwrap();
    files.create(&file("b.txt", Some(dir.id), &me)).await.unwrap();

    assert!(!files.delete_trashed(a.id, &me).await.unwrap());

    let changed = files
        .ensure_state_in_folder(dir.id, &me, LifecycleState::Trashed, now)
        .await
        .unwrap();
    assert_eq!(changed, 2);
    let again = files
        .ensure_state_in_folder(dir.id, &me, LifecycleState::Trashed, Utc::now())
        .await
        .unwrap();
    assert_eq!(again, 0);

    let trashed = files.find_by_id(a.id, &me).await.unwrap().unwrap();
    assert_eq!(trashed.lifecycle_state, LifecycleState::Trashed);
    assert!(trashed.trashed_at.is_some());

    assert!(folders.ensure_state(dir.id, &me, LifecycleState::Trashed, now).await.unwrap());
    assert!(!folders.ensure_state(dir.id, &me, LifecycleState::Trashed, now).await.unwrap());

    assert!(files.delete_trashed(a.id, &me).await.unwrap());
    assert!(files.find_by_id(a.id, &me).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires DRIVE_TEST_DATABASE_URL"]
async fn test_list_filters_sorts_and_pages() {
    let db = connect().await;
    let files = PgFileRepository::new(db.pool().clone());
    let me = owner();

    for name in ["Plan.txt", "plan-b.txt", "budget.xlsx"] {
        files.create(&file(name, None, &me)).await.unwrap();
    }

    let filter = NodeFilter::for_owner(&me)
        .in_parent(ParentFilter::Root)
        .with_state(LifecycleState::Active)
        .name_contains("PLAN");
    let page = files
        .list(&filter, SortField::asc(SortKey::Name), Some(PageRequest::new(1, 1)))
        .await
        .unwrap();
    assert_eq!(page.total_items, 2);
    assert_eq!(page.items.len(), 1);
    assert!(page.has_next);

    let blob = page.items[0].blob_ref;
    let found = files.find_by_blob_unscoped(blob).await.unwrap().unwrap();
    assert_eq!(found.owner_id, me);
}
