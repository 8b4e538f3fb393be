//! Media access model - ownership/visibility data for gallery items.
//!
//! The CRUD layer owns the media records themselves; it hands this triple to
//! the access policy when deciding whether a request may see or change an
//! item.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Visibility codes for media items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Private,
    Public,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Private => "private",
            Visibility::Public => "public",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "public" => Visibility::Public,
            _ => Visibility::Private,
        }
    }
}

/// Ownership and sharing data for a single media item.
#[derive(Debug, Clone)]
pub struct MediaAccess {
    pub owner_id: Uuid,
    pub visibility: Visibility,
    pub shared_with: Vec<Uuid>,
}

impl MediaAccess {
    pub fn new(owner_id: Uuid, visibility: Visibility) -> Self {
        Self {
            owner_id,
            visibility,
            shared_with: Vec::new(),
        }
    }

    pub fn with_shares(owner_id: Uuid, visibility: Visibility, shared_with: Vec<Uuid>) -> Self {
        Self {
            owner_id,
            visibility,
            shared_with,
        }
    }

    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }

    pub fn is_shared_with(&self, user_id: Uuid) -> bool {
        self.shared_with.contains(&user_id)
    }
}
