use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::media::MediaClass;

/// Owning record for uploaded media.
///
/// The upload pipeline only ever touches `thumbnail_url` / `video_url`; everything
/// else is owned by whoever created the record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Video {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    pub video_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Video {
    pub fn new(user_id: Uuid, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            title: title.into(),
            description: None,
            thumbnail_url: None,
            video_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }

    /// Current reference for a media class, if one was committed.
    pub fn reference(&self, class: MediaClass) -> Option<&str> {
        match class {
            MediaClass::Thumbnail => self.thumbnail_url.as_deref(),
            MediaClass::Video => self.video_url.as_deref(),
        }
    }

    /// Overwrite the reference for a media class. The previous value is dropped.
    pub fn set_reference(&mut self, class: MediaClass, reference: String) {
        match class {
            MediaClass::Thumbnail => self.thumbnail_url = Some(reference),
            MediaClass::Video => self.video_url = Some(reference),
        }
        self.updated_at = Utc::now();
    }
}
