use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Class of media attached to an owning record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaClass {
    Thumbnail,
    Video,
}

impl MediaClass {
    /// Multipart field that carries this class of media.
    pub fn field_name(&self) -> &'static str {
        match self {
            MediaClass::Thumbnail => "thumbnail",
            MediaClass::Video => "video",
        }
    }
}

impl Display for MediaClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.field_name())
    }
}

/// Declared media type of an upload, reduced to its `type/subtype` essence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaType(mime::Mime);

impl MediaType {
    pub fn from_mime(mime: &mime::Mime) -> Self {
        MediaType(mime.clone())
    }

    /// `type/subtype` without parameters, lowercased.
    pub fn essence(&self) -> String {
        self.0.essence_str().to_lowercase()
    }

    /// File extension for stored objects, taken from the subtype.
    ///
    /// Structured-syntax suffixes are dropped (`svg+xml` -> `svg`) and anything
    /// outside `[a-z0-9]` is removed so the extension is always URL and path safe.
    pub fn extension(&self) -> String {
        let subtype = self.0.subtype().as_str().to_lowercase();
        let base = subtype.split('+').next().unwrap_or_default();
        let cleaned: String = base.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
        if cleaned.is_empty() {
            "bin".to_string()
        } else {
            cleaned
        }
    }

    /// Case-insensitive match of the essence against an allowlist.
    pub fn is_allowed(&self, allowed: &[String]) -> bool {
        let essence = self.essence();
        allowed.iter().any(|a| a.trim().eq_ignore_ascii_case(&essence))
    }
}

impl FromStr for MediaType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(AppError::BadRequest("Malformed request header".to_string()));
        }
        let mime = s
            .trim()
            .parse::<mime::Mime>()
            .map_err(|_| AppError::BadRequest("Malformed request header".to_string()))?;
        Ok(MediaType(mime))
    }
}

impl Display for MediaType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.essence())
    }
}

/// Progress of one upload through the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStage {
    Received,
    Validated,
    Staged,
    Persisted,
    Committed,
}

impl Display for UploadStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let s = match self {
            UploadStage::Received => "received",
            UploadStage::Validated => "validated",
            UploadStage::Staged => "staged",
            UploadStage::Persisted => "persisted",
            UploadStage::Committed => "committed",
        };
        f.write_str(s)
    }
}
