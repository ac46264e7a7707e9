//! Caller context carried into every command and query handler.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{DomainError, UserId};

/// Who is asking, plus the correlation id that ties their log lines together.
///
/// `user_id` comes from the authentication collaborator and is never taken
/// from a request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandMetadata {
    pub user_id: UserId,

    #[serde(skip_serializing_if = "Option::is_none")]
    correlation_id: Option<String>,
}

impl CommandMetadata {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            correlation_id: None,
        }
    }

    pub fn with_correlation_id(self, id: impl Into<String>) -> Self {
        Self {
            correlation_id: Some(id.into()),
            ..self
        }
    }

    /// The caller-supplied correlation id, or a fresh v4 UUID.
    pub fn correlation_id(&self) -> String {
        match &self.correlation_id {
            Some(id) => id.clone(),
            None => Uuid::new_v4().to_string(),
        }
    }

    /// Fails with `Unauthorized` unless `target` is the caller.
    pub fn authorize(&self, target: &UserId) -> Result<(), DomainError> {
        if self.user_id != *target {
            return Err(DomainError::unauthorized(
                "Caller may only access its own progress",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
impl CommandMetadata {
    pub fn test_fixture(user_id: &str) -> Self {
        Self::new(UserId::new(user_id).unwrap()).with_correlation_id("test-correlation-id")
    }
}
