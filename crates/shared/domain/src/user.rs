//! User domain entity and related types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::constants::DEFAULT_IS_ACTIVE;
use crate::group::Group;
use crate::password::Password;
use crate::patch::double_option;

/// User domain entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub fullname: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub avatar: Option<String>,
    pub is_active: bool,
    pub group_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Stored digest as a password value object.
    pub fn password(&self) -> Password {
        Password::from_hash(self.password_hash.clone())
    }

    /// Check a plain text password against the stored digest.
    pub fn verify_password(&self, plain_text: &str) -> bool {
        self.password().verify(plain_text)
    }
}

/// User with its group eagerly loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserDetails {
    #[serde(flatten)]
    pub user: User,
    pub group: Option<Group>,
}

/// User creation data transfer object
#[derive(Clone, Deserialize, Validate)]
pub struct CreateUser {
    /// Unique login name
    #[validate(length(min = 1, message = "username is empty"))]
    pub username: String,
    /// Display name
    #[serde(default)]
    pub fullname: String,
    /// Contact address
    #[validate(email(message = "email is invalid"))]
    pub email: String,
    /// Plain text password, hashed before insert
    #[validate(length(min = 1, message = "password is empty"))]
    pub password: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default = "default_is_active")]
    pub is_active: bool,
    #[serde(default)]
    pub group_id: Option<Uuid>,
}

fn default_is_active() -> bool {
    DEFAULT_IS_ACTIVE
}

impl std::fmt::Debug for CreateUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateUser")
            .field("username", &self.username)
            .field("fullname", &self.fullname)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("avatar", &self.avatar)
            .field("is_active", &self.is_active)
            .field("group_id", &self.group_id)
            .finish()
    }
}

impl CreateUser {
    pub fn new(
        username: impl Into<String>,
        fullname: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            fullname: fullname.into(),
            email: email.into(),
            password: password.into(),
            avatar: None,
            is_active: DEFAULT_IS_ACTIVE,
            group_id: None,
        }
    }

    pub fn with_group(mut self, group_id: Uuid) -> Self {
        self.group_id = Some(group_id);
        self
    }

    pub fn with_avatar(mut self, avatar: impl Into<String>) -> Self {
        self.avatar = Some(avatar.into());
        self
    }
}

/// Whitelisted user update.
///
/// Only these fields can change. Nullable columns use `Option<Option<T>>`
/// where `Some(None)` clears the value. `password` must already be hashed.
/// `username` and `email` follow the same rules as [`CreateUser`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Validate)]
pub struct UserPatch {
    #[serde(default)]
    pub fullname: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, message = "username is empty"))]
    pub username: Option<String>,
    #[serde(default)]
    #[validate(email(message = "email is invalid"))]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<Password>,
    #[serde(default, deserialize_with = "double_option")]
    pub avatar: Option<Option<String>>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    pub group_id: Option<Option<Uuid>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl UserPatch {
    pub fn fullname(mut self, fullname: impl Into<String>) -> Self {
        self.fullname = Some(fullname.into());
        self
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn password(mut self, password: Password) -> Self {
        self.password = Some(password);
        self
    }

    pub fn avatar(mut self, avatar: Option<String>) -> Self {
        self.avatar = Some(avatar);
        self
    }

    pub fn is_active(mut self, is_active: bool) -> Self {
        self.is_active = Some(is_active);
        self
    }

    pub fn group_id(mut self, group_id: Option<Uuid>) -> Self {
        self.group_id = Some(group_id);
        self
    }

    pub fn updated_at(mut self, updated_at: DateTime<Utc>) -> Self {
        self.updated_at = Some(updated_at);
        self
    }

    /// True when every field is omitted.
    pub fn is_empty(&self) -> bool {
        self.fullname.is_none()
            && self.username.is_none()
            && self.email.is_none()
            && self.password.is_none()
            && self.avatar.is_none()
            && self.is_active.is_none()
            && self.group_id.is_none()
            && self.updated_at.is_none()
    }
}
