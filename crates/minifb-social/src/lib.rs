//! Social-graph core: profiles, status messages, the friendship graph and
//! the news feed built from it.
//!
//! Every operation takes the [`Database`](minifb_db::Database) and the
//! already-resolved caller explicitly. Nothing here reads request state.

pub mod error;
pub mod feed;
pub mod graph;
pub mod posting;
pub mod profiles;

pub use error::{Result, SocialError};
pub use feed::{news_feed, status_messages_of};
pub use graph::{FriendPair, add_edge, connections_of, suggestions_for};
pub use posting::{
    Attachment, FailedAttachment, StatusPost, delete_status, get_status, post_status, update_status,
};
pub use profiles::{
    NewProfile, ProfileUpdate, create_profile, get_profile, list_profiles, profile_for_account,
    update_profile,
};

#[cfg(test)]
pub(crate) mod testutil {
    use minifb_db::Database;
    use minifb_types::models::{AccountId, Profile};
    use uuid::Uuid;

    use crate::profiles::{NewProfile, create_profile};

    pub fn db() -> Database {
        Database::open_in_memory().unwrap()
    }

    pub fn profile(db: &Database, first_name: &str, last_name: &str) -> Profile {
        let account = AccountId(Uuid::new_v4());
        create_profile(
            db,
            account,
            NewProfile {
                username: format!("{}-{}", first_name.to_lowercase(), account),
                first_name: first_name.into(),
                last_name: last_name.into(),
                city: "Boston".into(),
                email: format!("{}@example.com", first_name.to_lowercase()),
                image_url: None,
            },
        )
        .unwrap()
    }
}
