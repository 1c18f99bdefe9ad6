//! Domain DTOs for the users API.
//!
//! # Design
//! These types mirror the mock-server's schema but are defined independently.
//! The remote fixture returns extra fields (address, company, ...) that the
//! screen never shows; serde drops them on decode. Integration tests catch any
//! schema drift between the two crates.

use serde::{Deserialize, Serialize};

/// Identifier assigned by the remote service on creation.
pub type UserId = u64;

/// A single user record returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    #[serde(default)]
    pub username: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

/// Request payload for creating a user: every field except the id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    #[serde(default)]
    pub username: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

/// Request payload for updating a user. Only the fields present in the JSON
/// are applied; omitted fields remain unchanged on the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

/// Editable form state. Every field is a plain string so an input box can
/// bind to it directly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFields {
    pub name: String,
    pub username: String,
    pub email: String,
    pub phone: String,
    pub website: String,
}

impl UserFields {
    /// Copy a stored user into form state; missing optional fields become "".
    pub fn from_user(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            phone: user.phone.clone().unwrap_or_default(),
            website: user.website.clone().unwrap_or_default(),
        }
    }

    /// Create payload. Empty optional fields are left out of the body.
    pub fn to_new_user(&self) -> NewUser {
        NewUser {
            name: self.name.clone(),
            username: self.username.clone(),
            email: self.email.clone(),
            phone: non_empty(&self.phone),
            website: non_empty(&self.website),
        }
    }

    /// Update payload. Every field is sent so a cleared input clears the
    /// stored value too.
    pub fn to_changes(&self) -> UserChanges {
        UserChanges {
            name: Some(self.name.clone()),
            username: Some(self.username.clone()),
            email: Some(self.email.clone()),
            phone: Some(self.phone.clone()),
            website: Some(self.website.clone()),
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
