use chrono::Utc;
use tracing::info;
use url::Url;
use uuid::Uuid;

use minifb_db::Database;
use minifb_db::models::{ProfileRow, encode_time};
use minifb_types::models::{AccountId, Profile};

use crate::error::{Result, SocialError};

/// Longest accepted username, matching common account systems.
const MAX_USERNAME_LEN: usize = 150;

/// Signup data for a new profile.
#[derive(Debug, Clone)]
pub struct NewProfile {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub city: String,
    pub email: String,
    pub image_url: Option<String>,
}

/// Fields the owner may change after signup. `None` keeps the current value;
/// an empty `image_url` clears the avatar.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub city: Option<String>,
    pub email: Option<String>,
    pub image_url: Option<String>,
}

pub fn create_profile(db: &Database, account: AccountId, new: NewProfile) -> Result<Profile> {
    let username = new.username.trim();
    if username.is_empty() || username.len() > MAX_USERNAME_LEN {
        return Err(SocialError::InvalidProfile(format!(
            "username must be 1-{} characters",
            MAX_USERNAME_LEN
        )));
    }
    validate_email(&new.email)?;
    let image_url = checked_image_url(new.image_url)?;

    if !db.ensure_account(&account.to_string(), username)? {
        return Err(SocialError::InvalidProfile("username already taken".into()));
    }

    let row = ProfileRow {
        id: Uuid::new_v4().to_string(),
        account_id: account.to_string(),
        first_name: new.first_name.trim().to_string(),
        last_name: new.last_name.trim().to_string(),
        city: new.city.trim().to_string(),
        email: new.email.trim().to_string(),
        image_url,
        created_at: encode_time(Utc::now()),
    };

    if !db.insert_profile(&row)? {
        return Err(SocialError::ProfileExists);
    }

    let profile = row.into_profile()?;
    info!(profile = %profile.id, account = %account, "Created profile for {}", profile);
    Ok(profile)
}

/// Resolve the caller's account to its one profile.
pub fn profile_for_account(db: &Database, account: AccountId) -> Result<Profile> {
    db.get_profile_by_account(&account.to_string())?
        .ok_or(SocialError::ProfileNotFound)?
        .into_profile()
        .map_err(SocialError::from)
}

pub fn get_profile(db: &Database, id: Uuid) -> Result<Profile> {
    db.get_profile_by_id(&id.to_string())?
        .ok_or(SocialError::ProfileNotFound)?
        .into_profile()
        .map_err(SocialError::from)
}

/// Every profile, ordered by last then first name.
pub fn list_profiles(db: &Database) -> Result<Vec<Profile>> {
    db.list_profiles()?
        .into_iter()
        .map(|row| row.into_profile().map_err(SocialError::from))
        .collect()
}

pub fn update_profile(db: &Database, owner: &Profile, update: ProfileUpdate) -> Result<Profile> {
    let city = update.city.map(|c| c.trim().to_string()).unwrap_or_else(|| owner.city.clone());
    let email = match update.email {
        Some(email) => {
            validate_email(&email)?;
            email.trim().to_string()
        }
        None => owner.email.clone(),
    };
    let image_url = match update.image_url {
        Some(url) => checked_image_url(Some(url))?,
        None => owner.image_url.clone(),
    };

    if !db.update_profile_contact(&owner.id.to_string(), &city, &email, image_url.as_deref())? {
        return Err(SocialError::ProfileNotFound);
    }

    info!(profile = %owner.id, "Updated profile");
    get_profile(db, owner.id)
}

/// `local@domain.tld`, no whitespace. Deliverability is not our concern.
pub fn validate_email(email: &str) -> Result<()> {
    let email = email.trim();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(SocialError::InvalidProfile(format!("invalid email address '{}'", email)))
    }
}

/// Absolute `http` or `https` URL with a host.
pub fn validate_url(value: &str) -> Result<()> {
    let value = value.trim();
    let invalid = || SocialError::InvalidProfile(format!("invalid image URL '{}'", value));

    let url = Url::parse(value).map_err(|_| invalid())?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none_or(str::is_empty) {
        return Err(invalid());
    }
    Ok(())
}

/// Blank means no avatar; anything else must be a valid URL.
fn checked_image_url(value: Option<String>) -> Result<Option<String>> {
    match value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
        Some(url) => {
            validate_url(&url)?;
            Ok(Some(url))
        }
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil;

    fn signup(username: &str, email: &str) -> NewProfile {
        NewProfile {
            username: username.into(),
            first_name: "Ayanna".into(),
            last_name: "Rouse".into(),
            city: "Boston".into(),
            email: email.into(),
            image_url: Some("  ".into()),
        }
    }

    #[test]
    fn create_and_resolve_by_account() {
        let db = testutil::db();
        let account = AccountId(Uuid::new_v4());

        let created = create_profile(&db, account, signup("ayanna", "yanni@bu.edu")).unwrap();
        assert_eq!(created.image_url, None);
        assert_eq!(created.to_string(), "Ayanna Rouse");

        let resolved = profile_for_account(&db, account).unwrap();
        assert_eq!(resolved, created);
        assert_eq!(get_profile(&db, created.id).unwrap(), created);
    }

    #[test]
    fn second_profile_for_account_is_rejected() {
        let db = testutil::db();
        let account = AccountId(Uuid::new_v4());
        create_profile(&db, account, signup("ayanna", "yanni@bu.edu")).unwrap();

        let err = create_profile(&db, account, signup("ayanna", "other@bu.edu")).unwrap_err();
        assert!(matches!(err, SocialError::ProfileExists));
    }

    #[test]
    fn taken_username_is_rejected() {
        let db = testutil::db();
        create_profile(&db, AccountId(Uuid::new_v4()), signup("ayanna", "yanni@bu.edu")).unwrap();

        let err = create_profile(&db, AccountId(Uuid::new_v4()), signup("ayanna", "x@bu.edu")).unwrap_err();
        assert!(matches!(err, SocialError::InvalidProfile(_)));
    }

    #[test]
    fn unknown_account_has_no_profile() {
        let db = testutil::db();
        let err = profile_for_account(&db, AccountId(Uuid::new_v4())).unwrap_err();
        assert!(matches!(err, SocialError::ProfileNotFound));
        assert!(matches!(get_profile(&db, Uuid::new_v4()), Err(SocialError::ProfileNotFound)));
    }

    #[test]
    fn update_touches_only_contact_fields() {
        let db = testutil::db();
        let owner = testutil::profile(&db, "Grace", "Hopper");

        let updated = update_profile(
            &db,
            &owner,
            ProfileUpdate {
                city: Some("Arlington".into()),
                email: None,
                image_url: Some("https://example.com/g.png".into()),
            },
        )
        .unwrap();

        assert_eq!(updated.city, "Arlington");
        assert_eq!(updated.email, owner.email);
        assert_eq!(updated.first_name, "Grace");
        assert_eq!(updated.image_url.as_deref(), Some("https://example.com/g.png"));

        let cleared = update_profile(
            &db,
            &updated,
            ProfileUpdate { image_url: Some(String::new()), ..Default::default() },
        )
        .unwrap();
        assert_eq!(cleared.image_url, None);
    }

    #[test]
    fn update_revalidates_email() {
        let db = testutil::db();
        let owner = testutil::profile(&db, "Grace", "Hopper");
        let err = update_profile(
            &db,
            &owner,
            ProfileUpdate { email: Some("not-an-email".into()), ..Default::default() },
        )
        .unwrap_err();
        assert!(matches!(err, SocialError::InvalidProfile(_)));
    }

    #[test]
    fn email_shapes() {
        assert!(validate_email("a@b.co").is_ok());
        assert!(validate_email(" yanni620@bu.edu ").is_ok());
        for bad in ["", "plain", "@bu.edu", "a@bu", "a@.edu", "a@bu.", "a b@bu.edu", "a@b@c.d"] {
            assert!(validate_email(bad).is_err(), "{} should be rejected", bad);
        }
    }

    #[test]
    fn url_shapes() {
        assert!(validate_url("https://example.com/a.png").is_ok());
        assert!(validate_url(" http://cdn.example.com:8080/u/1 ").is_ok());
        for bad in ["", "not a url", "example.com/a.png", "ftp://example.com/a", "javascript:alert(1)", "https://"] {
            assert!(validate_url(bad).is_err(), "{} should be rejected", bad);
        }
    }

    #[test]
    fn bad_image_url_is_rejected() {
        let db = testutil::db();
        let mut new = signup("ayanna", "yanni@bu.edu");
        new.image_url = Some("javascript:alert(1)".into());
        let err = create_profile(&db, AccountId(Uuid::new_v4()), new).unwrap_err();
        assert!(matches!(err, SocialError::InvalidProfile(_)));

        let owner = testutil::profile(&db, "Grace", "Hopper");
        let err = update_profile(
            &db,
            &owner,
            ProfileUpdate { image_url: Some("not a url".into()), ..Default::default() },
        )
        .unwrap_err();
        assert!(matches!(err, SocialError::InvalidProfile(_)));
        assert_eq!(get_profile(&db, owner.id).unwrap(), owner);
    }

    #[test]
    fn listing_is_ordered_by_name() {
        let db = testutil::db();
        testutil::profile(&db, "Zed", "Young");
        testutil::profile(&db, "Amy", "Young");
        testutil::profile(&db, "Bob", "Adams");

        let names: Vec<String> = list_profiles(&db).unwrap().iter().map(ToString::to_string).collect();
        assert_eq!(names, vec!["Bob Adams", "Amy Young", "Zed Young"]);
    }
}
