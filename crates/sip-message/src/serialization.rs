//! Encoded-message cache for the transport layer.
//!
//! A transport encodes a message once and keeps the bytes for
//! retransmission. This is deliberately a separate trait: general callers
//! use [`SipMessage::encode`] and never see the cache.

use bytes::{Bytes, BytesMut};
use tracing::trace;

use crate::error::Result;
use crate::message::SipMessage;

/// Privileged access to a message's cached encoding
pub trait EncodedCache {
    /// Encodes the message and caches the result, replacing any earlier one.
    fn encode_to_cache(&mut self) -> Result<Bytes>;

    /// The cached encoding, if [`encode_to_cache`](Self::encode_to_cache)
    /// was called. It is not refreshed when the message changes.
    fn encoded(&self) -> Option<&Bytes>;

    fn clear_encoded(&mut self);
}

impl EncodedCache for SipMessage {
    fn encode_to_cache(&mut self) -> Result<Bytes> {
        let mut out = BytesMut::new();
        self.encode(&mut out)?;
        let encoded = out.freeze();
        trace!(len = encoded.len(), "cached encoded message");
        self.encoded = Some(encoded.clone());
        Ok(encoded)
    }

    fn encoded(&self) -> Option<&Bytes> {
        self.encoded.as_ref()
    }

    fn clear_encoded(&mut self) {
        self.encoded = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Method;

    #[test]
    fn test_cache_lifecycle() {
        let mut msg = SipMessage::request(Method::Options, "sip:carol@chicago.com".parse().unwrap());
        assert!(msg.encoded().is_none());

        let bytes = msg.encode_to_cache().unwrap();
        assert_eq!(msg.encoded(), Some(&bytes));
        assert!(msg.clone().encoded().is_none());

        msg.clear_encoded();
        assert!(msg.encoded().is_none());
        assert!(SipMessage::new().encode_to_cache().is_err());
    }
}
