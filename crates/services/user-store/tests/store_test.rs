//! User/group store integration tests against an in-memory SQLite database.

use uuid::Uuid;

use common::{DatabaseConfig, ErrorKind};
use domain::{CreateGroup, CreateUser, GroupPatch, Password, UserPatch};
use user_store_lib::infra::Database;
use user_store_lib::repository::{UserGroupRepository, UserGroupStore};
use user_store_lib::{migrate, MigrateAction, DROP_COMPLETED, SETUP_COMPLETED};

// An in-memory SQLite database lives as long as its single connection.
async fn setup_store() -> UserGroupStore {
    let config = DatabaseConfig {
        max_connections: 1,
        min_connections: 1,
        ..DatabaseConfig::with_url("sqlite::memory:")
    };

    let db = Database::connect(&config)
        .await
        .expect("Failed to init DB");
    UserGroupStore::new(db.get_connection())
}

fn new_user(username: &str) -> CreateUser {
    CreateUser::new(
        username,
        format!("{} Fullname", username),
        format!("{}@example.com", username),
        "p",
    )
}

// =============================================================================
// Groups
// =============================================================================

#[tokio::test]
async fn test_save_then_get_group() {
    let store = setup_store().await;

    let created = store
        .save_group(CreateGroup::new("admins", Some("Administrators".to_string())))
        .await
        .unwrap();

    let found = store.get_group(created.id).await.unwrap();
    assert_eq!(found.group.name, "admins");
    assert_eq!(found.group.description.as_deref(), Some("Administrators"));
    assert!(found.users.is_empty());
}

#[tokio::test]
async fn test_save_empty_group_is_validation_error() {
    let store = setup_store().await;

    let err = store.save_group(CreateGroup::default()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[tokio::test]
async fn test_get_group_errors() {
    let store = setup_store().await;

    let err = store.get_group(Uuid::nil()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let err = store.get_group(Uuid::new_v4()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_get_groups_loads_users() {
    let store = setup_store().await;

    let err = store.get_groups().await.unwrap_err();
    assert!(err.is_not_found());

    let ops = store.save_group(CreateGroup::new("ops", None)).await.unwrap();
    store.save_group(CreateGroup::new("dev", None)).await.unwrap();
    store
        .save_user(new_user("alice").with_group(ops.id))
        .await
        .unwrap();
    store
        .save_user(new_user("bob").with_group(ops.id))
        .await
        .unwrap();

    let groups = store.get_groups().await.unwrap();
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].group.name, "dev");
    assert!(groups[0].users.is_empty());
    assert_eq!(groups[1].group.name, "ops");

    let members: Vec<&str> = groups[1].users.iter().map(|u| u.username.as_str()).collect();
    assert_eq!(members, vec!["alice", "bob"]);
}

#[tokio::test]
async fn test_update_group_applies_whitelist() {
    let store = setup_store().await;
    let group = store
        .save_group(CreateGroup::new("ops", Some("on call".to_string())))
        .await
        .unwrap();

    let updated = store
        .update_group(group.id, GroupPatch::default().name("operations"))
        .await
        .unwrap();

    assert_eq!(updated.id, group.id);
    assert_eq!(updated.name, "operations");
    assert_eq!(updated.description.as_deref(), Some("on call"));
    assert_eq!(updated.created_at, group.created_at);

    let cleared = store
        .update_group(group.id, GroupPatch::default().description(None))
        .await
        .unwrap();
    assert_eq!(cleared.name, "operations");
    assert_eq!(cleared.description, None);
}

#[tokio::test]
async fn test_update_group_lookup_errors_come_first() {
    let store = setup_store().await;

    let err = store
        .update_group(Uuid::new_v4(), GroupPatch::default())
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    let err = store
        .update_group(Uuid::nil(), GroupPatch::default().name("x"))
        .await
        .unwrap_err();
    assert!(err.is_validation());

    let group = store.save_group(CreateGroup::new("ops", None)).await.unwrap();
    let err = store
        .update_group(group.id, GroupPatch::default())
        .await
        .unwrap_err();
    assert!(err.is_validation());
}

#[tokio::test]
async fn test_update_group_rejects_blank_name() {
    let store = setup_store().await;
    let group = store.save_group(CreateGroup::new("ops", None)).await.unwrap();

    let err = store
        .update_group(group.id, GroupPatch::default().name(""))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.to_string(), "name is empty");

    let details = store.get_group(group.id).await.unwrap();
    assert_eq!(details.group.name, "ops");
}

#[tokio::test]
async fn test_delete_group_returns_snapshot_and_releases_users() {
    let store = setup_store().await;
    let group = store.save_group(CreateGroup::new("ops", None)).await.unwrap();
    store
        .save_user(new_user("alice").with_group(group.id))
        .await
        .unwrap();

    let before = store.get_group(group.id).await.unwrap();
    let snapshot = store.delete_group(group.id).await.unwrap();
    assert_eq!(snapshot, before);
    assert_eq!(snapshot.users.len(), 1);
    assert_eq!(snapshot.users[0].group_id, Some(group.id));

    let err = store.get_group(group.id).await.unwrap_err();
    assert!(err.is_not_found());

    let alice = store.get_user("alice").await.unwrap();
    assert_eq!(alice.user.group_id, None);
    assert!(alice.group.is_none());
}

#[tokio::test]
async fn test_delete_unknown_group_is_not_found() {
    let store = setup_store().await;

    let err = store.delete_group(Uuid::new_v4()).await.unwrap_err();
    assert!(err.is_not_found());
}

// =============================================================================
// Users
// =============================================================================

#[tokio::test]
async fn test_save_user_hashes_password() {
    let store = setup_store().await;

    let user = store
        .save_user(CreateUser::new("jdoe", "John Doe", "jdoe@example.com", "secret"))
        .await
        .unwrap();

    assert_ne!(user.password_hash, "secret");
    assert!(user.password_hash.starts_with("$argon2"));
    assert!(user.is_active);
    assert_eq!(user.created_at, user.updated_at);
}

#[tokio::test]
async fn test_save_user_validation() {
    let store = setup_store().await;

    let err = store.save_user(new_user("")).await.unwrap_err();
    assert!(err.is_validation());

    let mut no_password = new_user("jdoe");
    no_password.password.clear();
    let err = store.save_user(no_password).await.unwrap_err();
    assert!(err.is_validation());
}

#[tokio::test]
async fn test_save_user_with_unknown_group_is_store_error() {
    let store = setup_store().await;

    let err = store
        .save_user(new_user("jdoe").with_group(Uuid::new_v4()))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Store);
}

#[tokio::test]
async fn test_save_duplicate_username_is_store_error() {
    let store = setup_store().await;
    store.save_user(new_user("jdoe")).await.unwrap();

    let err = store.save_user(new_user("jdoe")).await.unwrap_err();
    assert!(err.is_store());
}

#[tokio::test]
async fn test_get_user() {
    let store = setup_store().await;
    let group = store.save_group(CreateGroup::new("ops", None)).await.unwrap();
    let created = store
        .save_user(new_user("jdoe").with_group(group.id).with_avatar("jdoe.png"))
        .await
        .unwrap();

    let found = store.get_user("jdoe").await.unwrap();
    assert_eq!(found.user, created);
    assert_eq!(found.group, Some(group));

    let err = store.get_user("").await.unwrap_err();
    assert!(err.is_validation());

    let err = store.get_user("nobody").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_list_users() {
    let store = setup_store().await;

    assert!(store.get_users().await.unwrap_err().is_not_found());

    let group = store.save_group(CreateGroup::new("ops", None)).await.unwrap();
    store.save_user(new_user("carol")).await.unwrap();
    store
        .save_user(new_user("alice").with_group(group.id))
        .await
        .unwrap();

    let users = store.get_users().await.unwrap();
    let names: Vec<&str> = users.iter().map(|u| u.user.username.as_str()).collect();
    assert_eq!(names, vec!["alice", "carol"]);
    assert_eq!(users[0].group.as_ref().map(|g| g.id), Some(group.id));
    assert!(users[1].group.is_none());

    let members = store.get_users_by_group(group.id).await.unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].user.username, "alice");

    let err = store.get_users_by_group(Uuid::new_v4()).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_update_user_changes_only_given_fields() {
    let store = setup_store().await;
    let group = store.save_group(CreateGroup::new("ops", None)).await.unwrap();
    let before = store
        .save_user(new_user("jdoe").with_group(group.id).with_avatar("jdoe.png"))
        .await
        .unwrap();

    let after = store
        .update_user("jdoe", UserPatch::default().fullname("X"))
        .await
        .unwrap();

    assert_eq!(after.fullname, "X");
    assert_eq!(after.id, before.id);
    assert_eq!(after.username, before.username);
    assert_eq!(after.email, before.email);
    assert_eq!(after.password_hash, before.password_hash);
    assert_eq!(after.avatar, before.avatar);
    assert_eq!(after.is_active, before.is_active);
    assert_eq!(after.group_id, before.group_id);
    assert_eq!(after.created_at, before.created_at);
}

#[tokio::test]
async fn test_update_user_clears_nullable_fields() {
    let store = setup_store().await;
    let group = store.save_group(CreateGroup::new("ops", None)).await.unwrap();
    store
        .save_user(new_user("jdoe").with_group(group.id).with_avatar("jdoe.png"))
        .await
        .unwrap();

    let updated = store
        .update_user(
            "jdoe",
            UserPatch::default().avatar(None).group_id(None).is_active(false),
        )
        .await
        .unwrap();

    assert_eq!(updated.avatar, None);
    assert_eq!(updated.group_id, None);
    assert!(!updated.is_active);
}

#[tokio::test]
async fn test_update_user_errors() {
    let store = setup_store().await;

    let err = store
        .update_user("nobody", UserPatch::default())
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    let err = store
        .update_user("", UserPatch::default().fullname("X"))
        .await
        .unwrap_err();
    assert!(err.is_validation());

    store.save_user(new_user("jdoe")).await.unwrap();
    let err = store
        .update_user("jdoe", UserPatch::default())
        .await
        .unwrap_err();
    assert!(err.is_validation());

    let err = store
        .update_user("jdoe", UserPatch::default().group_id(Some(Uuid::new_v4())))
        .await
        .unwrap_err();
    assert!(err.is_store());
}

#[tokio::test]
async fn test_update_user_applies_create_rules() {
    let store = setup_store().await;
    store.save_user(new_user("jdoe")).await.unwrap();

    let err = store
        .save_user(CreateUser::new("jane", "Jane", "not-an-email", "p"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "email is invalid");

    let err = store
        .update_user("jdoe", UserPatch::default().email("not-an-email"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.to_string(), "email is invalid");

    let err = store
        .update_user("jdoe", UserPatch::default().username(""))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.to_string(), "username is empty");

    let user = store.get_user("jdoe").await.unwrap().user;
    assert_eq!(user.email, "jdoe@example.com");
}

#[tokio::test]
async fn test_update_user_renames() {
    let store = setup_store().await;
    store.save_user(new_user("jdoe")).await.unwrap();

    store
        .update_user("jdoe", UserPatch::default().username("john"))
        .await
        .unwrap();

    assert!(store.get_user("jdoe").await.unwrap_err().is_not_found());
    assert_eq!(store.get_user("john").await.unwrap().user.username, "john");
}

#[tokio::test]
async fn test_update_user_password_is_stored_as_given() {
    let store = setup_store().await;
    store.save_user(new_user("jdoe")).await.unwrap();

    let password = Password::new("new-secret").unwrap();
    let digest = password.as_str().to_string();
    let updated = store
        .update_user("jdoe", UserPatch::default().password(password))
        .await
        .unwrap();

    assert_eq!(updated.password_hash, digest);
    assert!(store.authenticate("jdoe", "new-secret").await.unwrap());
    assert!(!store.authenticate("jdoe", "p").await.unwrap());
}

#[tokio::test]
async fn test_delete_user_returns_snapshot() {
    let store = setup_store().await;
    let group = store.save_group(CreateGroup::new("ops", None)).await.unwrap();
    store
        .save_user(new_user("jdoe").with_group(group.id))
        .await
        .unwrap();

    let before = store.get_user("jdoe").await.unwrap();
    let snapshot = store.delete_user("jdoe").await.unwrap();
    assert_eq!(snapshot, before);

    let err = store.get_user("jdoe").await.unwrap_err();
    assert!(err.is_not_found());

    let err = store.delete_user("jdoe").await.unwrap_err();
    assert!(err.is_not_found());

    // The group is untouched
    assert!(store.get_group(group.id).await.unwrap().users.is_empty());
}

// =============================================================================
// Authentication
// =============================================================================

#[tokio::test]
async fn test_authenticate() {
    let store = setup_store().await;
    store.save_user(new_user("jdoe")).await.unwrap();

    assert!(store.authenticate("jdoe", "p").await.unwrap());
    assert!(!store.authenticate("jdoe", "wrong").await.unwrap());
    assert!(!store.authenticate("nobody", "p").await.unwrap());
    assert!(!store.authenticate("", "").await.unwrap());
    assert!(!store.authenticate("jdoe", "").await.unwrap());
    assert!(!store.authenticate("", "p").await.unwrap());
}

#[tokio::test]
async fn test_authenticate_surfaces_store_failures() {
    let store = setup_store().await;
    store.save_user(new_user("jdoe")).await.unwrap();
    store.drop_schema().await.unwrap();

    let err = store.authenticate("jdoe", "p").await.unwrap_err();
    assert!(err.is_store());

    // Empty input never reaches the store
    assert!(!store.authenticate("", "").await.unwrap());
}

// =============================================================================
// Schema bootstrap
// =============================================================================

#[tokio::test]
async fn test_setup_recreates_empty_schema() {
    let store = setup_store().await;
    store.save_group(CreateGroup::new("ops", None)).await.unwrap();
    store.save_user(new_user("jdoe")).await.unwrap();

    let status = store.setup().await.unwrap();
    assert_eq!(status, SETUP_COMPLETED);

    assert!(store.get_groups().await.unwrap_err().is_not_found());
    assert!(store.get_users().await.unwrap_err().is_not_found());

    store.save_user(new_user("jdoe")).await.unwrap();
    assert!(store.authenticate("jdoe", "p").await.unwrap());
}

#[tokio::test]
async fn test_drop_schema_removes_tables() {
    let store = setup_store().await;

    let status = store.drop_schema().await.unwrap();
    assert_eq!(status, DROP_COMPLETED);

    let err = store.get_users().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Store);

    assert_eq!(store.setup().await.unwrap(), SETUP_COMPLETED);
    assert!(store.get_users().await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_migrate_status_down_and_fresh() {
    let config = DatabaseConfig {
        max_connections: 1,
        min_connections: 1,
        ..DatabaseConfig::with_url("sqlite::memory:")
    };
    let db = Database::connect_without_migrations(&config).await.unwrap();

    assert!(migrate(&db, MigrateAction::Up).await.unwrap().is_empty());
    let status = migrate(&db, MigrateAction::Status).await.unwrap();
    assert_eq!(
        status,
        vec![
            "[x] m20240101_000001_create_groups_table",
            "[x] m20240101_000002_create_users_table",
        ]
    );

    migrate(&db, MigrateAction::Down).await.unwrap();
    let status = migrate(&db, MigrateAction::Status).await.unwrap();
    assert_eq!(
        status,
        vec![
            "[x] m20240101_000001_create_groups_table",
            "[ ] m20240101_000002_create_users_table",
        ]
    );

    migrate(&db, MigrateAction::Fresh).await.unwrap();
    let status = migrate(&db, MigrateAction::Status).await.unwrap();
    assert!(status.iter().all(|line| line.starts_with("[x]")));

    let store = UserGroupStore::new(db.get_connection());
    store.save_user(new_user("jdoe")).await.unwrap();
}
