//! Group domain entity and related types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::patch::double_option;
use crate::user::User;

/// Group domain entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Group with its member users eagerly loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupDetails {
    #[serde(flatten)]
    pub group: Group,
    pub users: Vec<User>,
}

/// Group creation data transfer object
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateGroup {
    /// Group name
    #[validate(length(min = 1, message = "group data is empty"))]
    pub name: String,
    /// Free-form description
    #[serde(default)]
    pub description: Option<String>,
}

impl CreateGroup {
    pub fn new(name: impl Into<String>, description: Option<String>) -> Self {
        Self {
            name: name.into(),
            description,
        }
    }
}

/// Whitelisted group update: only `name` and `description` can change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Validate)]
pub struct GroupPatch {
    #[serde(default)]
    #[validate(length(min = 1, message = "name is empty"))]
    pub name: Option<String>,
    /// `Some(None)` clears the description
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
}

impl GroupPatch {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: Option<String>) -> Self {
        self.description = Some(description);
        self
    }

    /// True when every field is omitted.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }
}
