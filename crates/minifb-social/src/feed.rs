use std::collections::HashMap;

use tracing::debug;

use minifb_db::Database;
use minifb_db::models::StatusRow;
use minifb_types::models::{Image, Profile, StatusMessage};

use crate::error::{Result, SocialError};
use crate::graph::connections_of;

/// Friends' status messages, most recent first. The caller's own posts are
/// not part of it. Recomputed on every call; nothing is cached.
pub fn news_feed(db: &Database, profile: &Profile) -> Result<Vec<StatusMessage>> {
    let friend_ids: Vec<String> = connections_of(db, profile)?
        .into_iter()
        .filter(|p| p.id != profile.id)
        .map(|p| p.id.to_string())
        .collect();

    if friend_ids.is_empty() {
        return Ok(vec![]);
    }

    let rows = db.get_statuses_by_profiles(&friend_ids)?;
    let feed = with_images(db, rows)?;

    debug!(profile = %profile.id, friends = friend_ids.len(), items = feed.len(), "Built news feed");
    Ok(feed)
}

/// One profile's own status messages, most recent first.
pub fn status_messages_of(db: &Database, profile: &Profile) -> Result<Vec<StatusMessage>> {
    let rows = db.get_statuses_by_profiles(&[profile.id.to_string()])?;
    with_images(db, rows)
}

/// Resolve attached images for a page of status rows in one query,
/// keeping the rows' order.
pub(crate) fn with_images(db: &Database, rows: Vec<StatusRow>) -> Result<Vec<StatusMessage>> {
    let status_ids: Vec<String> = rows.iter().map(|r| r.id.clone()).collect();

    let mut images: HashMap<String, Vec<Image>> = HashMap::new();
    for attached in db.get_images_for_statuses(&status_ids)? {
        images
            .entry(attached.status_id)
            .or_default()
            .push(attached.image.into_image()?);
    }

    rows.into_iter()
        .map(|row| {
            let attached = images.remove(&row.id).unwrap_or_default();
            row.into_status(attached).map_err(SocialError::from)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::add_edge;
    use crate::posting::{Attachment, post_status_at};
    use crate::testutil;
    use chrono::{Duration, Utc};

    #[test]
    fn feed_is_newest_first_across_friends() {
        let db = testutil::db();
        let a = testutil::profile(&db, "Ann", "Lee");
        let b = testutil::profile(&db, "Ben", "Kim");
        let c = testutil::profile(&db, "Cal", "Ng");
        add_edge(&db, &a, &b).unwrap();
        add_edge(&db, &c, &a).unwrap();

        let t1 = Utc::now();
        let t2 = t1 + Duration::minutes(5);
        let from_b = post_status_at(&db, &b, "morning", vec![], t1).unwrap().status;
        let from_c = post_status_at(&db, &c, "afternoon", vec![], t2).unwrap().status;

        let feed = news_feed(&db, &a).unwrap();
        let ids: Vec<_> = feed.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![from_c.id, from_b.id]);
        assert!(feed.windows(2).all(|w| w[0].created_at > w[1].created_at));
    }

    #[test]
    fn own_posts_and_strangers_stay_out() {
        let db = testutil::db();
        let a = testutil::profile(&db, "Ann", "Lee");
        let b = testutil::profile(&db, "Ben", "Kim");
        let stranger = testutil::profile(&db, "Sam", "Roe");
        add_edge(&db, &a, &b).unwrap();

        let now = Utc::now();
        post_status_at(&db, &a, "mine", vec![], now).unwrap();
        post_status_at(&db, &stranger, "not a friend", vec![], now).unwrap();
        let friend_post = post_status_at(&db, &b, "hi", vec![], now).unwrap().status;

        let feed = news_feed(&db, &a).unwrap();
        assert_eq!(feed, vec![friend_post]);
    }

    #[test]
    fn no_connections_means_empty_feed() {
        let db = testutil::db();
        let loner = testutil::profile(&db, "Lou", "Ner");
        post_status_at(&db, &loner, "anyone?", vec![], Utc::now()).unwrap();

        assert!(news_feed(&db, &loner).unwrap().is_empty());
    }

    #[test]
    fn feed_items_carry_their_images() {
        let db = testutil::db();
        let a = testutil::profile(&db, "Ann", "Lee");
        let b = testutil::profile(&db, "Ben", "Kim");
        add_edge(&db, &a, &b).unwrap();

        let attachments = vec![
            Attachment { file_ref: "uploads/1.png".into(), caption: None },
            Attachment { file_ref: "uploads/2.png".into(), caption: Some("two".into()) },
        ];
        post_status_at(&db, &b, "pics", attachments, Utc::now()).unwrap();

        let feed = news_feed(&db, &a).unwrap();
        let refs: Vec<&str> = feed[0].images.iter().map(|i| i.file_ref.as_str()).collect();
        assert_eq!(refs, vec!["uploads/1.png", "uploads/2.png"]);
    }

    #[test]
    fn own_timeline_is_newest_first() {
        let db = testutil::db();
        let a = testutil::profile(&db, "Ann", "Lee");
        let t = Utc::now();
        let old = post_status_at(&db, &a, "old", vec![], t).unwrap().status;
        let new = post_status_at(&db, &a, "new", vec![], t + Duration::seconds(1)).unwrap().status;

        let ids: Vec<_> = status_messages_of(&db, &a).unwrap().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![new.id, old.id]);
    }
}
