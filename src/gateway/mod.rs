//! Remote service gateways
//!
//! Each gateway issues one remote call and returns a fully materialized
//! local result; there is no retry logic and no streaming past the gateway
//! boundary.

mod chat;
mod speech;

pub use chat::ChatGateway;
pub use speech::SpeechGateway;

use crate::{Error, Result};

/// A complete encoded audio clip, fully buffered in memory
///
/// Produced by a gateway call and consumed once, either as a chat attachment
/// or by voice playback. Construction rejects empty buffers, so no consumer
/// ever sees a partial or empty clip.
#[derive(Debug, Clone)]
pub struct AudioPayload {
    bytes: Vec<u8>,
}

impl AudioPayload {
    /// Wrap a fully buffered audio clip
    ///
    /// # Errors
    ///
    /// Returns `Error::Upstream` if the buffer is empty.
    pub fn new(bytes: Vec<u8>) -> Result<Self> {
        if bytes.is_empty() {
            return Err(Error::Upstream(
                "speech service returned an empty audio stream".to_string(),
            ));
        }
        Ok(Self { bytes })
    }

    /// Borrow the encoded audio bytes
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume the payload, yielding the encoded audio bytes
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Size of the encoded clip in bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the clip is empty (never true for a constructed payload)
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_rejects_empty_buffer() {
        match AudioPayload::new(Vec::new()) {
            Err(Error::Upstream(msg)) => assert!(msg.contains("empty")),
            other => panic!("expected Upstream error, got {other:?}"),
        }
    }

    #[test]
    fn payload_preserves_bytes() {
        let payload = AudioPayload::new(vec![0xff, 0xfb, 0x90]).unwrap();
        assert_eq!(payload.len(), 3);
        assert!(!payload.is_empty());
        assert_eq!(payload.as_bytes(), &[0xff, 0xfb, 0x90]);
        assert_eq!(payload.into_bytes(), vec![0xff, 0xfb, 0x90]);
    }
}
