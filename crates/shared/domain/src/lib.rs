//! Domain layer - Core entities and value objects for users and groups.
//!
//! This crate contains pure domain logic with no infrastructure dependencies.
//! The store crate maps these types to and from its SeaORM entities.

pub mod constants;
pub mod error;
pub mod group;
pub mod password;
pub mod patch;
pub mod user;

pub use constants::*;
pub use error::{DomainError, DomainResult};
pub use group::{CreateGroup, Group, GroupDetails, GroupPatch};
pub use password::Password;
pub use user::{CreateUser, User, UserDetails, UserPatch};

use validator::Validate;

/// Run `validator` rules on an input and keep the first failure message.
pub fn validate_input<T: Validate>(input: &T) -> DomainResult<()> {
    input.validate().map_err(|e| {
        let message = e
            .field_errors()
            .values()
            .next()
            .and_then(|errors| errors.first())
            .and_then(|error| error.message.as_ref())
            .map(|msg| msg.to_string())
            .unwrap_or_else(|| "Validation failed".to_string());
        DomainError::validation(message)
    })
}
