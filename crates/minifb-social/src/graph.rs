use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use minifb_db::Database;
use minifb_db::models::{FriendshipRow, encode_time};
use minifb_types::models::{Friendship, Profile};

use crate::error::{Result, SocialError};

/// Canonical key of an undirected edge: the smaller id always comes first.
///
/// Hyphenated lowercase UUID text sorts the same way as the UUID bytes, so
/// this order matches the `profile1 < profile2` check in storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FriendPair {
    low: Uuid,
    high: Uuid,
}

impl FriendPair {
    pub fn new(a: Uuid, b: Uuid) -> Result<Self> {
        if a == b {
            return Err(SocialError::InvalidRelationship);
        }
        let (low, high) = if a < b { (a, b) } else { (b, a) };
        Ok(Self { low, high })
    }

    pub fn low(&self) -> Uuid {
        self.low
    }

    pub fn high(&self) -> Uuid {
        self.high
    }

    fn to_row(self, created_at: DateTime<Utc>) -> FriendshipRow {
        FriendshipRow {
            profile1: self.low.to_string(),
            profile2: self.high.to_string(),
            created_at: encode_time(created_at),
        }
    }
}

/// Every profile sharing an edge with `profile`, ordered by name.
/// Never contains `profile` itself and holds each friend once.
pub fn connections_of(db: &Database, profile: &Profile) -> Result<Vec<Profile>> {
    let friends = db
        .get_friend_profiles(&profile.id.to_string())?
        .into_iter()
        .map(|row| row.into_profile().map_err(SocialError::from))
        .filter(|p| !matches!(p, Ok(p) if p.id == profile.id))
        .collect::<Result<Vec<_>>>()?;

    debug!(profile = %profile.id, friends = friends.len(), "Resolved connections");
    Ok(friends)
}

/// Befriend `a` and `b`. The relationship is immediate and symmetric; there
/// is no request or acceptance step.
pub fn add_edge(db: &Database, a: &Profile, b: &Profile) -> Result<Friendship> {
    let pair = FriendPair::new(a.id, b.id)?;

    for id in [pair.low, pair.high] {
        if db.get_profile_by_id(&id.to_string())?.is_none() {
            return Err(SocialError::ProfileNotFound);
        }
    }

    let row = pair.to_row(Utc::now());
    if !db.insert_friendship(&row)? {
        return Err(SocialError::DuplicateRelationship);
    }

    info!(profile = %a.id, friend = %b.id, "{} added {} as a friend", a, b);
    row.into_friendship().map_err(SocialError::from)
}

/// Everyone `profile` is not yet connected to. Unranked and unbounded:
/// one pass over all profiles per call.
pub fn suggestions_for(db: &Database, profile: &Profile) -> Result<Vec<Profile>> {
    let connected: HashSet<Uuid> = connections_of(db, profile)?.into_iter().map(|p| p.id).collect();

    let suggestions = crate::profiles::list_profiles(db)?
        .into_iter()
        .filter(|p| p.id != profile.id && !connected.contains(&p.id))
        .collect();

    Ok(suggestions)
}
