//! User accounts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{require_text, UserId, Validate};
use crate::error::{CatalogError, Result};

/// A registered user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub username: String,
    /// Opaque; never written to responses
    #[serde(skip_serializing, default)]
    pub password: String,
    pub email: String,
    pub is_creator: bool,
    pub created_at: DateTime<Utc>,
}

/// Registration data
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub email: String,
    #[serde(default)]
    pub is_creator: bool,
}

impl Validate for NewUser {
    fn validate(&self) -> Result<()> {
        require_text("username", &self.username)?;
        require_text("password", &self.password)?;
        require_text("email", &self.email)?;

        match self.email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
            _ => Err(CatalogError::invalid("email", "must be an address like name@host")),
        }
    }
}
