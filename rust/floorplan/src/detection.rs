// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Detection collaborator contract
//!
//! The vision model call lives outside this crate. Implementations of
//! [`Detector`] turn an image payload into a [`DetectionResult`] or one of the
//! failure codes below.

use crate::mock::mock_detection;
use crate::types::DetectionResult;
use thiserror::Error;

/// Image handed to the detector, as loaded by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    pub name: String,
    /// Natural pixel width
    pub width: u32,
    /// Natural pixel height
    pub height: u32,
    /// Encoded image bytes
    pub bytes: Vec<u8>,
}

impl SourceImage {
    pub fn new(name: impl Into<String>, width: u32, height: u32, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            bytes,
        }
    }
}

/// Detector failures; `Display` yields the wire code
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DetectionError {
    #[error("NO_API_KEY")]
    NoApiKey,

    #[error("API_ERROR_{status}")]
    Api { status: u16 },

    #[error("TRANSPORT_ERROR: {0}")]
    Transport(String),
}

impl DetectionError {
    /// Rate limit or forbidden key; collaborators absorb these with the
    /// canned dataset
    pub fn is_quota_or_auth(&self) -> bool {
        matches!(self, DetectionError::Api { status: 429 | 403 })
    }

    /// Message shown to the user. Only a missing key is told apart.
    pub fn user_message(&self) -> String {
        match self {
            DetectionError::NoApiKey => {
                "No API key configured. Add an API key to enable floor plan detection.".to_string()
            }
            other => format!("Detection failed ({}). Please try again.", other),
        }
    }
}

/// External floor plan detector
pub trait Detector {
    fn detect(&self, image: &SourceImage) -> Result<DetectionResult, DetectionError>;
}

/// Always answers with the canned dataset, flagged as mock
#[derive(Debug, Clone, Copy, Default)]
pub struct MockDetector;

impl Detector for MockDetector {
    fn detect(&self, _image: &SourceImage) -> Result<DetectionResult, DetectionError> {
        Ok(DetectionResult {
            used_mock: true,
            ..mock_detection()
        })
    }
}

/// Wraps a detector so quota and auth failures (429/403) turn into the
/// canned dataset instead of an error
#[derive(Debug, Clone)]
pub struct QuotaFallback<D> {
    inner: D,
}

impl<D: Detector> QuotaFallback<D> {
    pub fn new(inner: D) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> D {
        self.inner
    }
}

impl<D: Detector> Detector for QuotaFallback<D> {
    fn detect(&self, image: &SourceImage) -> Result<DetectionResult, DetectionError> {
        match self.inner.detect(image) {
            Err(err) if err.is_quota_or_auth() => {
                tracing::warn!(error = %err, image = %image.name, "Detector quota/auth failure, using sample dataset");
                MockDetector.detect(image)
            }
            other => other,
        }
    }
}

impl<D: Detector + ?Sized> Detector for &D {
    fn detect(&self, image: &SourceImage) -> Result<DetectionResult, DetectionError> {
        (**self).detect(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Failing(DetectionError);

    impl Detector for Failing {
        fn detect(&self, _image: &SourceImage) -> Result<DetectionResult, DetectionError> {
            Err(self.0.clone())
        }
    }

    fn image() -> SourceImage {
        SourceImage::new("plan.png", 800, 600, Vec::new())
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(DetectionError::NoApiKey.to_string(), "NO_API_KEY");
        assert_eq!(DetectionError::Api { status: 500 }.to_string(), "API_ERROR_500");
    }

    #[test]
    fn test_user_messages() {
        assert!(DetectionError::NoApiKey.user_message().contains("API key"));
        let generic = DetectionError::Api { status: 502 }.user_message();
        assert!(generic.contains("API_ERROR_502"));
        assert!(!generic.contains("API key"));
    }

    #[test]
    fn test_quota_and_auth_fall_back_to_mock() {
        for status in [429, 403] {
            let detector = QuotaFallback::new(Failing(DetectionError::Api { status }));
            let result = detector.detect(&image()).unwrap();
            assert!(result.used_mock);
            assert_eq!(result.rooms, mock_detection().rooms);
        }
    }

    #[test]
    fn test_other_errors_propagate() {
        for err in [
            DetectionError::NoApiKey,
            DetectionError::Api { status: 500 },
            DetectionError::Transport("timeout".into()),
        ] {
            let detector = QuotaFallback::new(Failing(err.clone()));
            assert_eq!(detector.detect(&image()), Err(err));
        }
    }

    #[test]
    fn test_mock_detector_flags_result() {
        let result = MockDetector.detect(&image()).unwrap();
        assert!(result.used_mock);
        assert!(!result.is_empty());
    }
}
