//! Domain-level constants.

// =============================================================================
// Entity names (used in not-found errors)
// =============================================================================

/// Entity name for users
pub const ENTITY_USER: &str = "User";

/// Entity name for groups
pub const ENTITY_GROUP: &str = "Group";

// =============================================================================
// Defaults
// =============================================================================

/// Accounts are active unless created otherwise
pub const DEFAULT_IS_ACTIVE: bool = true;

// =============================================================================
// Validation messages
// =============================================================================

pub const MSG_GROUP_EMPTY: &str = "group data is empty";
pub const MSG_GROUP_ID_EMPTY: &str = "id is empty";
pub const MSG_GROUP_PATCH_EMPTY: &str = "data is empty";
pub const MSG_GROUP_NAME_EMPTY: &str = "name is empty";
pub const MSG_USERNAME_EMPTY: &str = "username is empty";
pub const MSG_USER_PATCH_EMPTY: &str = "new data is empty";
pub const MSG_PASSWORD_EMPTY: &str = "password is empty";
pub const MSG_EMAIL_INVALID: &str = "email is invalid";
