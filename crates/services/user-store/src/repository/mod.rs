//! Repository layer for data access.

pub mod entities;
mod user_group_store;

pub use user_group_store::{UserGroupRepository, UserGroupStore, DROP_COMPLETED, SETUP_COMPLETED};

#[cfg(any(test, feature = "test-utils"))]
pub use user_group_store::MockUserGroupRepository;
