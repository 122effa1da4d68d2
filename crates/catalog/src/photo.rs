//! Uploaded product photo and its size constraint.

use crate::fields::ValidationError;

/// Largest accepted photo, in bytes. Anything strictly larger is rejected.
pub const MAX_PHOTO_BYTES: u64 = 1_000_000;

/// A photo file received with a product form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoUpload {
    /// Declared MIME type of the part, if the client sent one.
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

impl PhotoUpload {
    pub fn new(data: Vec<u8>, content_type: Option<String>) -> Self {
        Self {
            content_type,
            data,
        }
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

/// Whether a product mutation must carry a photo.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum PhotoPolicy {
    /// A missing photo is accepted; only oversized photos fail.
    #[default]
    Optional,
    /// A missing photo fails with the same message as an oversized one.
    Required,
}

#[derive(Debug, Clone, Copy)]
pub struct PhotoConstraintChecker {
    policy: PhotoPolicy,
    max_bytes: u64,
}

impl Default for PhotoConstraintChecker {
    fn default() -> Self {
        Self::new(PhotoPolicy::default())
    }
}

impl PhotoConstraintChecker {
    pub fn new(policy: PhotoPolicy) -> Self {
        Self {
            policy,
            max_bytes: MAX_PHOTO_BYTES,
        }
    }

    pub fn policy(&self) -> PhotoPolicy {
        self.policy
    }

    pub fn check(&self, photo: Option<&PhotoUpload>) -> Result<(), ValidationError> {
        match photo {
            None if self.policy == PhotoPolicy::Required => Err(ValidationError::Photo),
            None => Ok(()),
            Some(p) if p.size() > self.max_bytes => Err(ValidationError::Photo),
            Some(_) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photo_of(size: usize) -> PhotoUpload {
        PhotoUpload::new(vec![0u8; size], Some("image/jpeg".to_string()))
    }

    #[test]
    fn absent_photo_passes_when_optional() {
        assert_eq!(PhotoConstraintChecker::default().check(None), Ok(()));
    }

    #[test]
    fn photo_at_ceiling_passes() {
        let checker = PhotoConstraintChecker::default();
        assert_eq!(checker.check(Some(&photo_of(1_000_000))), Ok(()));
        assert_eq!(checker.check(Some(&photo_of(1024))), Ok(()));
    }

    #[test]
    fn photo_over_ceiling_fails() {
        let err = PhotoConstraintChecker::default()
            .check(Some(&photo_of(1_000_001)))
            .unwrap_err();
        assert_eq!(err.to_string(), "photo is Required and should be less then 1mb");
    }

    #[test]
    fn missing_required_photo_uses_oversize_message() {
        let checker = PhotoConstraintChecker::new(PhotoPolicy::Required);
        let missing = checker.check(None).unwrap_err();
        let oversized = checker.check(Some(&photo_of(1_000_002))).unwrap_err();
        assert_eq!(missing, oversized);
        assert_eq!(checker.check(Some(&photo_of(10))), Ok(()));
    }

    #[test]
    fn empty_file_counts_as_present() {
        let checker = PhotoConstraintChecker::new(PhotoPolicy::Required);
        assert_eq!(checker.check(Some(&photo_of(0))), Ok(()));
    }
}
