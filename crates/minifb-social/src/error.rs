use thiserror::Error;

/// Everything a core operation can fail with. Storage errors are passed
/// through untouched; the core never retries.
#[derive(Debug, Error)]
pub enum SocialError {
    #[error("profile not found")]
    ProfileNotFound,

    #[error("a profile cannot befriend itself")]
    InvalidRelationship,

    #[error("these profiles are already friends")]
    DuplicateRelationship,

    #[error("account already has a profile")]
    ProfileExists,

    #[error("invalid profile: {0}")]
    InvalidProfile(String),

    #[error("status message cannot be empty")]
    EmptyStatus,

    #[error("status message not found")]
    StatusNotFound,

    #[error("status message belongs to another profile")]
    NotOwner,

    #[error("storage failure: {0}")]
    Storage(#[from] anyhow::Error),
}

pub type Result<T, E = SocialError> = std::result::Result<T, E>;
