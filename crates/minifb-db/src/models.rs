//! Database row types — these map directly to SQLite rows.
//! Distinct from minifb-types models to keep the DB layer independent;
//! the `into_*` conversions are where stored text is parsed back.

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

use minifb_types::models::{AccountId, Friendship, Image, Profile, StatusMessage};

pub struct ProfileRow {
    pub id: String,
    pub account_id: String,
    pub first_name: String,
    pub last_name: String,
    pub city: String,
    pub email: String,
    pub image_url: Option<String>,
    pub created_at: String,
}

pub struct StatusRow {
    pub id: String,
    pub profile_id: String,
    pub message: String,
    pub created_at: String,
}

pub struct ImageRow {
    pub id: String,
    pub profile_id: String,
    pub file_ref: String,
    pub caption: Option<String>,
    pub created_at: String,
}

/// An image as attached to one status message.
pub struct StatusImageRow {
    pub status_id: String,
    pub position: i64,
    pub image: ImageRow,
}

pub struct FriendshipRow {
    pub profile1: String,
    pub profile2: String,
    pub created_at: String,
}

/// RFC 3339, microseconds, `Z` suffix. Fixed width, so text order is time order.
pub fn encode_time(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_time(s: &str) -> Result<DateTime<Utc>> {
    let t = DateTime::parse_from_rfc3339(s).with_context(|| format!("Corrupt timestamp '{}'", s))?;
    Ok(t.with_timezone(&Utc))
}

fn decode_id(s: &str) -> Result<Uuid> {
    s.parse().with_context(|| format!("Corrupt id '{}'", s))
}

impl ProfileRow {
    pub fn into_profile(self) -> Result<Profile> {
        Ok(Profile {
            id: decode_id(&self.id)?,
            account_id: AccountId(decode_id(&self.account_id)?),
            first_name: self.first_name,
            last_name: self.last_name,
            city: self.city,
            email: self.email,
            image_url: self.image_url,
            created_at: decode_time(&self.created_at)?,
        })
    }
}

impl ImageRow {
    pub fn into_image(self) -> Result<Image> {
        Ok(Image {
            id: decode_id(&self.id)?,
            profile_id: decode_id(&self.profile_id)?,
            file_ref: self.file_ref,
            caption: self.caption,
            created_at: decode_time(&self.created_at)?,
        })
    }
}

impl StatusRow {
    /// Images are resolved separately and handed in already ordered.
    pub fn into_status(self, images: Vec<Image>) -> Result<StatusMessage> {
        Ok(StatusMessage {
            id: decode_id(&self.id)?,
            profile_id: decode_id(&self.profile_id)?,
            message: self.message,
            created_at: decode_time(&self.created_at)?,
            images,
        })
    }
}

impl FriendshipRow {
    pub fn into_friendship(self) -> Result<Friendship> {
        Ok(Friendship {
            profile1: decode_id(&self.profile1)?,
            profile2: decode_id(&self.profile2)?,
            created_at: decode_time(&self.created_at)?,
        })
    }
}
