//! User and group data access.
//!
//! Every operation validates its input, runs the mapped query and returns a
//! [`StoreResult`]. `update_*` and `delete_*` go through the matching `get_*`
//! first, so lookup errors surface unchanged.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, LoaderTrait,
    ModelTrait, QueryFilter, QueryOrder, Set, TransactionTrait, Value,
};
use sea_orm_migration::MigratorTrait;
use uuid::Uuid;

use common::{OptionExt, StoreError, StoreResult};
use domain::{
    validate_input, CreateGroup, CreateUser, Group, GroupDetails, GroupPatch, Password, User,
    UserDetails, UserPatch, ENTITY_GROUP, ENTITY_USER, MSG_GROUP_ID_EMPTY, MSG_GROUP_PATCH_EMPTY,
    MSG_USERNAME_EMPTY, MSG_USER_PATCH_EMPTY,
};

use super::entities::group::{self, Entity as GroupEntity};
use super::entities::user::{self, Entity as UserEntity};
use crate::infra::Migrator;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Status returned by a successful [`UserGroupRepository::setup`].
pub const SETUP_COMPLETED: &str = "Setup Database Completed";

/// Status returned by a successful [`UserGroupRepository::drop_schema`].
pub const DROP_COMPLETED: &str = "Drop Database Completed";

/// User and group repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserGroupRepository: Send + Sync {
    /// Insert a group
    async fn save_group(&self, group: CreateGroup) -> StoreResult<Group>;

    /// Find a group by ID with its users
    async fn get_group(&self, id: Uuid) -> StoreResult<GroupDetails>;

    /// List every group with its users
    async fn get_groups(&self) -> StoreResult<Vec<GroupDetails>>;

    /// Update the group's `name` and `description`
    async fn update_group(&self, id: Uuid, patch: GroupPatch) -> StoreResult<Group>;

    /// Delete a group, returning its state before removal.
    /// Member users are kept and lose their group.
    async fn delete_group(&self, id: Uuid) -> StoreResult<GroupDetails>;

    /// Hash the password and insert a user
    async fn save_user(&self, user: CreateUser) -> StoreResult<User>;

    /// Find a user by username with its group
    async fn get_user(&self, username: &str) -> StoreResult<UserDetails>;

    /// List every user with its group
    async fn get_users(&self) -> StoreResult<Vec<UserDetails>>;

    /// List the users of one group
    async fn get_users_by_group(&self, group_id: Uuid) -> StoreResult<Vec<UserDetails>>;

    /// Update whitelisted user fields. A supplied password is stored as is.
    async fn update_user(&self, username: &str, patch: UserPatch) -> StoreResult<User>;

    /// Delete a user, returning its state before removal
    async fn delete_user(&self, username: &str) -> StoreResult<UserDetails>;

    /// Check credentials.
    ///
    /// Empty input, unknown users and wrong passwords yield `Ok(false)`.
    /// Only backend failures are returned as errors.
    async fn authenticate(&self, username: &str, password: &str) -> StoreResult<bool>;

    /// Drop and recreate the whole schema
    async fn setup(&self) -> StoreResult<String>;

    /// Drop the whole schema
    async fn drop_schema(&self) -> StoreResult<String>;
}

/// SeaORM implementation of [`UserGroupRepository`].
pub struct UserGroupStore {
    db: DatabaseConnection,
}

impl UserGroupStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn users_with_group(
        &self,
        group_id: Option<Uuid>,
    ) -> StoreResult<Vec<UserDetails>> {
        let mut query = UserEntity::find();
        if let Some(group_id) = group_id {
            query = query.filter(user::Column::GroupId.eq(group_id));
        }

        let rows = query
            .order_by_asc(user::Column::Username)
            .find_also_related(GroupEntity)
            .all(&self.db)
            .await?;

        Ok(rows.into_iter().map(user_details).collect())
    }
}

fn user_details((user, group): (user::Model, Option<group::Model>)) -> UserDetails {
    UserDetails {
        user: User::from(user),
        group: group.map(Group::from),
    }
}

fn group_details(group: group::Model, users: Vec<user::Model>) -> GroupDetails {
    GroupDetails {
        group: Group::from(group),
        users: users.into_iter().map(User::from).collect(),
    }
}

/// Copy the group whitelist onto an active model.
fn apply_group_patch(active: &mut group::ActiveModel, patch: GroupPatch, now: DateTime<Utc>) {
    if let Some(name) = patch.name {
        active.name = Set(name);
    }
    if let Some(description) = patch.description {
        active.description = Set(description);
    }
    active.updated_at = Set(now);
}

/// Copy the user whitelist onto an active model.
fn apply_user_patch(active: &mut user::ActiveModel, patch: UserPatch, now: DateTime<Utc>) {
    if let Some(fullname) = patch.fullname {
        active.fullname = Set(fullname);
    }
    if let Some(username) = patch.username {
        active.username = Set(username);
    }
    if let Some(email) = patch.email {
        active.email = Set(email);
    }
    if let Some(password) = patch.password {
        active.password_hash = Set(password.into_string());
    }
    if let Some(avatar) = patch.avatar {
        active.avatar = Set(avatar);
    }
    if let Some(is_active) = patch.is_active {
        active.is_active = Set(is_active);
    }
    if let Some(group_id) = patch.group_id {
        active.group_id = Set(group_id);
    }
    active.updated_at = Set(patch.updated_at.unwrap_or(now));
}

#[async_trait]
impl UserGroupRepository for UserGroupStore {
    async fn save_group(&self, group: CreateGroup) -> StoreResult<Group> {
        validate_input(&group)?;

        let now = Utc::now();
        let active_model = group::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(group.name),
            description: Set(group.description),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model.insert(&self.db).await?;
        tracing::info!(group_id = %model.id, name = %model.name, "Group created");

        Ok(Group::from(model))
    }

    async fn get_group(&self, id: Uuid) -> StoreResult<GroupDetails> {
        if id.is_nil() {
            return Err(StoreError::validation(MSG_GROUP_ID_EMPTY));
        }

        let group = GroupEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_not_found(ENTITY_GROUP)?;

        let users = group
            .find_related(UserEntity)
            .order_by_asc(user::Column::Username)
            .all(&self.db)
            .await?;

        tracing::debug!(group_id = %id, users = users.len(), "Group loaded");
        Ok(group_details(group, users))
    }

    async fn get_groups(&self) -> StoreResult<Vec<GroupDetails>> {
        let groups = GroupEntity::find()
            .order_by_asc(group::Column::Name)
            .all(&self.db)
            .await?;

        if groups.is_empty() {
            return Err(StoreError::not_found(ENTITY_GROUP));
        }

        let users = groups
            .load_many(
                UserEntity::find().order_by_asc(user::Column::Username),
                &self.db,
            )
            .await?;

        Ok(groups
            .into_iter()
            .zip(users)
            .map(|(group, users)| group_details(group, users))
            .collect())
    }

    async fn update_group(&self, id: Uuid, patch: GroupPatch) -> StoreResult<Group> {
        let current = self.get_group(id).await?;

        if patch.is_empty() {
            return Err(StoreError::validation(MSG_GROUP_PATCH_EMPTY));
        }
        validate_input(&patch)?;

        let mut active = group::Model::from(current.group).into_active_model();
        apply_group_patch(&mut active, patch, Utc::now());

        let model = active.update(&self.db).await?;
        tracing::info!(group_id = %id, "Group updated");

        Ok(Group::from(model))
    }

    async fn delete_group(&self, id: Uuid) -> StoreResult<GroupDetails> {
        let snapshot = self.get_group(id).await?;

        let txn = self.db.begin().await?;

        UserEntity::update_many()
            .col_expr(user::Column::GroupId, Expr::value(Value::Uuid(None)))
            .filter(user::Column::GroupId.eq(id))
            .exec(&txn)
            .await?;

        GroupEntity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;

        tracing::info!(
            group_id = %id,
            released_users = snapshot.users.len(),
            "Group deleted"
        );
        Ok(snapshot)
    }

    async fn save_user(&self, user: CreateUser) -> StoreResult<User> {
        validate_input(&user)?;

        let password = Password::new(&user.password)?;

        let now = Utc::now();
        let active_model = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            username: Set(user.username),
            fullname: Set(user.fullname),
            email: Set(user.email),
            password_hash: Set(password.into_string()),
            avatar: Set(user.avatar),
            is_active: Set(user.is_active),
            group_id: Set(user.group_id),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model.insert(&self.db).await?;
        tracing::info!(user_id = %model.id, username = %model.username, "User created");

        Ok(User::from(model))
    }

    async fn get_user(&self, username: &str) -> StoreResult<UserDetails> {
        if username.is_empty() {
            return Err(StoreError::validation(MSG_USERNAME_EMPTY));
        }

        let row = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .find_also_related(GroupEntity)
            .one(&self.db)
            .await?
            .ok_or_not_found(ENTITY_USER)?;

        tracing::debug!(username, "User loaded");
        Ok(user_details(row))
    }

    async fn get_users(&self) -> StoreResult<Vec<UserDetails>> {
        let users = self.users_with_group(None).await?;

        if users.is_empty() {
            return Err(StoreError::not_found(ENTITY_USER));
        }

        Ok(users)
    }

    async fn get_users_by_group(&self, group_id: Uuid) -> StoreResult<Vec<UserDetails>> {
        let users = self.users_with_group(Some(group_id)).await?;

        if users.is_empty() {
            return Err(StoreError::not_found(ENTITY_USER));
        }

        Ok(users)
    }

    async fn update_user(&self, username: &str, patch: UserPatch) -> StoreResult<User> {
        let current = self.get_user(username).await?;

        if patch.is_empty() {
            return Err(StoreError::validation(MSG_USER_PATCH_EMPTY));
        }
        validate_input(&patch)?;

        let mut active = user::Model::from(current.user).into_active_model();
        apply_user_patch(&mut active, patch, Utc::now());

        let model = active.update(&self.db).await?;
        tracing::info!(user_id = %model.id, username = %model.username, "User updated");

        Ok(User::from(model))
    }

    async fn delete_user(&self, username: &str) -> StoreResult<UserDetails> {
        let snapshot = self.get_user(username).await?;

        UserEntity::delete_by_id(snapshot.user.id)
            .exec(&self.db)
            .await?;

        tracing::info!(user_id = %snapshot.user.id, username, "User deleted");
        Ok(snapshot)
    }

    async fn authenticate(&self, username: &str, password: &str) -> StoreResult<bool> {
        if username.is_empty() || password.is_empty() {
            tracing::warn!("Authentication rejected: username or password is empty");
            return Ok(false);
        }

        match self.get_user(username).await {
            Ok(details) => {
                let verified = details.user.verify_password(password);
                if !verified {
                    tracing::warn!(username, "Authentication failed: password mismatch");
                }
                Ok(verified)
            }
            Err(e) if e.is_store() => Err(e),
            Err(_) => {
                tracing::warn!(username, "Authentication failed: unknown user");
                Ok(false)
            }
        }
    }

    async fn setup(&self) -> StoreResult<String> {
        tracing::warn!("Recreating database schema");
        Migrator::refresh(&self.db).await?;
        tracing::info!("{}", SETUP_COMPLETED);
        Ok(SETUP_COMPLETED.to_string())
    }

    async fn drop_schema(&self) -> StoreResult<String> {
        tracing::warn!("Dropping database schema");
        Migrator::reset(&self.db).await?;
        tracing::info!("{}", DROP_COMPLETED);
        Ok(DROP_COMPLETED.to_string())
    }
}
