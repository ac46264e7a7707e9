//! Strongly-typed identifier value objects.
//!
//! Every identifier in this domain is an opaque, non-empty string supplied by
//! an external collaborator (the auth layer for users, the content catalog for
//! games, scenarios and badges).

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

/// Maximum accepted identifier length.
pub const MAX_ID_LENGTH: usize = 128;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $field:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning error if empty or too long.
            pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
                let id = id.into();
                let trimmed = id.trim();
                if trimmed.is_empty() {
                    return Err(ValidationError::empty_field($field));
                }
                if trimmed.len() > MAX_ID_LENGTH {
                    return Err(ValidationError::out_of_range(
                        $field,
                        1,
                        MAX_ID_LENGTH as i64,
                        trimmed.len() as i64,
                    ));
                }
                Ok(Self(trimmed.to_string()))
            }

            /// Returns the inner string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

string_id!(
    /// User identifier (issued by the authentication collaborator).
    UserId,
    "user_id"
);

string_id!(
    /// Identifier of a mini-game in the content catalog.
    GameId,
    "game_id"
);

string_id!(
    /// Identifier of a narrative scenario in the content catalog.
    ScenarioId,
    "scenario_id"
);

string_id!(
    /// Identifier of an unlockable achievement.
    BadgeId,
    "badge_id"
);

impl BadgeId {
    /// Creates a badge from a compile-time constant name.
    ///
    /// Reserved for the built-in badge catalog, whose names are known valid.
    pub(crate) fn well_known(name: &'static str) -> Self {
        Self(name.to_string())
    }
}
