//! Physics error types

use std::fmt;

/// Error type for world operations
#[derive(Debug, Clone, PartialEq)]
pub enum PhysicsError {
    /// A process or collide callback reported a failure
    Callback(String),
    /// A world configuration value is out of range
    InvalidConfig(String),
    /// A body key did not resolve to a live body
    MissingBody,
}

impl fmt::Display for PhysicsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhysicsError::Callback(msg) => write!(f, "Collision callback failed: {}", msg),
            PhysicsError::InvalidConfig(msg) => write!(f, "Invalid physics config: {}", msg),
            PhysicsError::MissingBody => write!(f, "Body not found"),
        }
    }
}

impl std::error::Error for PhysicsError {}

impl From<String> for PhysicsError {
    fn from(msg: String) -> Self {
        PhysicsError::Callback(msg)
    }
}

impl From<&str> for PhysicsError {
    fn from(msg: &str) -> Self {
        PhysicsError::Callback(msg.to_string())
    }
}
