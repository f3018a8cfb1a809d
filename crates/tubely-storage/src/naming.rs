//! Content namer.
//!
//! Names are 32 bytes from the thread-local CSPRNG, URL-safe base64 without
//! padding, followed by an extension derived from the validated media type.
//! Uniqueness is probabilistic; no lookup is done before use.

use std::fmt::{Display, Formatter, Result as FmtResult};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;
use tubely_core::MediaType;

/// Bytes of entropy behind every generated name.
pub const NAME_ENTROPY_BYTES: usize = 32;

/// Opaque, collision-resistant object name, e.g. `q3J..Xw.png`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentName(String);

impl ContentName {
    pub fn generate(media_type: &MediaType) -> Self {
        let mut bytes = [0u8; NAME_ENTROPY_BYTES];
        rand::rng().fill_bytes(&mut bytes);
        let stem = URL_SAFE_NO_PAD.encode(bytes);
        ContentName(format!("{}.{}", stem, media_type.extension()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ContentName {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ContentName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
