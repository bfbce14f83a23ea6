// Photo storage: fetch member photos and accept uploads.

pub mod content_hash;
pub mod library;

use std::path::PathBuf;

use thiserror::Error;

pub use library::PhotoLibrary;

/// Errors raised when storing an uploaded photo.
#[derive(Debug, Error)]
pub enum MediaError {
    /// A photo with identical content already exists for this member.
    #[error("photo already exists")]
    Duplicate,
    /// A group or member name that cannot be used as a directory name.
    #[error("invalid name: {0}")]
    InvalidName(String),
    #[error("storage error: {0}")]
    Io(#[from] std::io::Error),
}

/// Capability the game needs from the photo store.
pub trait MediaStore: Send + Sync {
    /// Every stored photo of `member` (possibly none).
    fn fetch_images(&self, member: &str) -> Vec<Vec<u8>>;

    /// Whether at least one photo of `member` exists.
    fn has_images(&self, member: &str) -> bool;

    /// Store a new photo, rejecting exact duplicates for that member.
    fn store_image(
        &self,
        group_key: &str,
        member: &str,
        data: &[u8],
        extension: &str,
    ) -> Result<PathBuf, MediaError>;

    /// Group directories that accept uploads, sorted.
    fn upload_groups(&self) -> Vec<String>;

    /// Image shown with the main menu, if any.
    fn cover_image(&self) -> Option<Vec<u8>>;
}

/// Index key for a member: lowercase with dashes, underscores and whitespace removed.
pub fn normalize_member_key(name: &str) -> String {
    name.chars()
        .filter(|c| !(c.is_whitespace() || *c == '-' || *c == '_'))
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_member_key() {
        assert_eq!(normalize_member_key("Bang Chan"), "bangchan");
        assert_eq!(normalize_member_key("Jeong-yeon"), "jeongyeon");
        assert_eq!(normalize_member_key("lee_know"), "leeknow");
        assert_eq!(normalize_member_key("ROSE"), "rose");
    }

    #[test]
    fn test_duplicate_error_display() {
        assert_eq!(MediaError::Duplicate.to_string(), "photo already exists");
    }
}
