use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use minifb_db::Database;
use minifb_db::models::{ImageRow, StatusRow, encode_time};
use minifb_types::models::{Profile, StatusMessage};

use crate::error::{Result, SocialError};
use crate::feed::with_images;

/// An uploaded file as handed over by the upload service: an opaque
/// reference plus an optional caption.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub file_ref: String,
    pub caption: Option<String>,
}

/// An attachment that could not be recorded. `index` is its position in the
/// request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedAttachment {
    pub index: usize,
    pub error: String,
}

#[derive(Debug, Clone)]
pub struct StatusPost {
    pub status: StatusMessage,
    pub failed_attachments: Vec<FailedAttachment>,
}

/// Publish a status message for `profile`.
///
/// The text is committed before any attachment is touched and stays
/// committed whatever happens to them. Each attachment then gets its own
/// Image and StatusImage row, written together, in input order; one that
/// fails leaves neither row behind, is logged and listed in
/// [`StatusPost::failed_attachments`], and the rest still go in.
pub fn post_status(
    db: &Database,
    profile: &Profile,
    body: &str,
    attachments: Vec<Attachment>,
) -> Result<StatusPost> {
    post_status_at(db, profile, body, attachments, Utc::now())
}

pub(crate) fn post_status_at(
    db: &Database,
    profile: &Profile,
    body: &str,
    attachments: Vec<Attachment>,
    now: DateTime<Utc>,
) -> Result<StatusPost> {
    let body = body.trim();
    if body.is_empty() {
        return Err(SocialError::EmptyStatus);
    }

    let status_id = Uuid::new_v4().to_string();
    let profile_id = profile.id.to_string();
    let created_at = encode_time(now);

    db.insert_status(&StatusRow {
        id: status_id.clone(),
        profile_id: profile_id.clone(),
        message: body.to_string(),
        created_at: created_at.clone(),
    })?;

    let mut failed_attachments = Vec::new();
    for (index, attachment) in attachments.into_iter().enumerate() {
        if let Err(e) = attach(db, &status_id, &profile_id, &created_at, index, attachment) {
            warn!(status = %status_id, index, "Attachment not recorded: {:#}", e);
            failed_attachments.push(FailedAttachment { index, error: e.to_string() });
        }
    }

    let status = load_status(db, &status_id)?;
    info!(
        profile = %profile.id,
        status = %status.id,
        images = status.images.len(),
        failed = failed_attachments.len(),
        "Posted status message"
    );

    Ok(StatusPost { status, failed_attachments })
}

fn attach(
    db: &Database,
    status_id: &str,
    profile_id: &str,
    created_at: &str,
    index: usize,
    attachment: Attachment,
) -> anyhow::Result<()> {
    let file_ref = attachment.file_ref.trim();
    if file_ref.is_empty() {
        anyhow::bail!("empty file reference");
    }

    let image = ImageRow {
        id: Uuid::new_v4().to_string(),
        profile_id: profile_id.to_string(),
        file_ref: file_ref.to_string(),
        caption: attachment.caption.filter(|c| !c.trim().is_empty()),
        created_at: created_at.to_string(),
    };
    db.insert_attached_image(status_id, &image, i64::try_from(index)?)
}

pub fn get_status(db: &Database, id: Uuid) -> Result<StatusMessage> {
    load_status(db, &id.to_string())
}

/// Replace the body of one of `owner`'s status messages. Timestamp and
/// images are left as they were.
pub fn update_status(db: &Database, owner: &Profile, id: Uuid, body: &str) -> Result<StatusMessage> {
    let body = body.trim();
    if body.is_empty() {
        return Err(SocialError::EmptyStatus);
    }

    let status_id = id.to_string();
    check_owner(db, owner, &status_id)?;

    if !db.update_status_message(&status_id, body)? {
        return Err(SocialError::StatusNotFound);
    }

    info!(profile = %owner.id, status = %id, "Updated status message");
    load_status(db, &status_id)
}

/// Delete one of `owner`'s status messages along with its image links.
pub fn delete_status(db: &Database, owner: &Profile, id: Uuid) -> Result<()> {
    let status_id = id.to_string();
    check_owner(db, owner, &status_id)?;

    if !db.delete_status(&status_id)? {
        return Err(SocialError::StatusNotFound);
    }

    info!(profile = %owner.id, status = %id, "Deleted status message");
    Ok(())
}

fn check_owner(db: &Database, owner: &Profile, status_id: &str) -> Result<()> {
    let row = db.get_status(status_id)?.ok_or(SocialError::StatusNotFound)?;
    if row.profile_id != owner.id.to_string() {
        return Err(SocialError::NotOwner);
    }
    Ok(())
}

fn load_status(db: &Database, status_id: &str) -> Result<StatusMessage> {
    let row = db.get_status(status_id)?.ok_or(SocialError::StatusNotFound)?;
    with_images(db, vec![row])?
        .pop()
        .ok_or(SocialError::StatusNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil;
    use std::collections::HashSet;

    fn attachment(file_ref: &str) -> Attachment {
        Attachment { file_ref: file_ref.into(), caption: None }
    }

    #[test]
    fn post_with_two_images() {
        let db = testutil::db();
        let p = testutil::profile(&db, "Pat", "Doe");

        let post = post_status(&db, &p, "hello", vec![attachment("img1"), attachment("img2")]).unwrap();
        assert!(post.failed_attachments.is_empty());
        assert_eq!(post.status.message, "hello");
        assert_eq!(post.status.profile_id, p.id);

        let refs: HashSet<&str> = post.status.images.iter().map(|i| i.file_ref.as_str()).collect();
        assert_eq!(refs, HashSet::from(["img1", "img2"]));

        let image_ids: HashSet<Uuid> = post.status.images.iter().map(|i| i.id).collect();
        assert_eq!(image_ids.len(), 2);
        assert!(post.status.images.iter().all(|i| i.profile_id == p.id));

        assert_eq!(get_status(&db, post.status.id).unwrap(), post.status);
    }

    #[test]
    fn bad_attachment_keeps_text_and_the_rest() {
        let db = testutil::db();
        let p = testutil::profile(&db, "Pat", "Doe");

        let post = post_status(
            &db,
            &p,
            "partial",
            vec![attachment("a.png"), attachment("   "), attachment("c.png")],
        )
        .unwrap();

        assert_eq!(post.failed_attachments.len(), 1);
        assert_eq!(post.failed_attachments[0].index, 1);
        let refs: Vec<&str> = post.status.images.iter().map(|i| i.file_ref.as_str()).collect();
        assert_eq!(refs, vec!["a.png", "c.png"]);
    }

    #[test]
    fn failed_link_leaves_no_orphan_image() {
        let db = testutil::db();
        let p = testutil::profile(&db, "Pat", "Doe");
        let gone = Uuid::new_v4().to_string();

        let err = attach(&db, &gone, &p.id.to_string(), &encode_time(Utc::now()), 0, attachment("a.png"));
        assert!(err.is_err());
        assert_eq!(db.count_images_by_profile(&p.id.to_string()).unwrap(), 0);

        post_status(&db, &p, "kept", vec![attachment("b.png"), attachment(" ")]).unwrap();
        assert_eq!(db.count_images_by_profile(&p.id.to_string()).unwrap(), 1);
    }

    #[test]
    fn empty_body_is_rejected() {
        let db = testutil::db();
        let p = testutil::profile(&db, "Pat", "Doe");
        assert!(matches!(post_status(&db, &p, "  \n", vec![]), Err(SocialError::EmptyStatus)));
        assert!(crate::feed::status_messages_of(&db, &p).unwrap().is_empty());
    }

    #[test]
    fn only_owner_may_edit_or_delete() {
        let db = testutil::db();
        let owner = testutil::profile(&db, "Pat", "Doe");
        let other = testutil::profile(&db, "Max", "Roe");
        let status = post_status(&db, &owner, "original", vec![]).unwrap().status;

        assert!(matches!(update_status(&db, &other, status.id, "hijack"), Err(SocialError::NotOwner)));
        assert!(matches!(delete_status(&db, &other, status.id), Err(SocialError::NotOwner)));

        let edited = update_status(&db, &owner, status.id, "edited").unwrap();
        assert_eq!(edited.message, "edited");
        assert_eq!(edited.created_at, status.created_at);
    }

    #[test]
    fn delete_is_terminal_and_drops_image_links() {
        let db = testutil::db();
        let owner = testutil::profile(&db, "Pat", "Doe");
        let status = post_status(&db, &owner, "bye", vec![attachment("x.png")]).unwrap().status;

        delete_status(&db, &owner, status.id).unwrap();

        assert!(matches!(get_status(&db, status.id), Err(SocialError::StatusNotFound)));
        assert!(db.get_images_for_statuses(&[status.id.to_string()]).unwrap().is_empty());
        assert!(matches!(delete_status(&db, &owner, status.id), Err(SocialError::StatusNotFound)));
    }
}
