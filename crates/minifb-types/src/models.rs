use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque account reference handed over by the identity layer.
/// Owns at most one [`Profile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub Uuid);

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub account_id: AccountId,
    pub first_name: String,
    pub last_name: String,
    pub city: String,
    pub email: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.first_name, self.last_name)
    }
}

/// A media record uploaded by a profile. The payload itself lives with the
/// upload service; only its reference is kept here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub file_ref: String,
    pub caption: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusMessage {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub message: String,
    pub created_at: DateTime<Utc>,
    /// Attached images in attachment order.
    pub images: Vec<Image>,
}

/// An undirected edge between two profiles.
/// `profile1 < profile2` always holds, whichever side asked first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Friendship {
    pub profile1: Uuid,
    pub profile2: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Friendship {
    /// The other end of the edge, or `None` if `profile` is not on it.
    pub fn other(&self, profile: Uuid) -> Option<Uuid> {
        if self.profile1 == profile {
            Some(self.profile2)
        } else if self.profile2 == profile {
            Some(self.profile1)
        } else {
            None
        }
    }
}
