//! # Transaction identity
//!
//! RFC 3261 transactions are identified by the branch parameter of the top
//! Via when it carries the `z9hG4bK` magic cookie. Messages from RFC 2543
//! elements have no such branch; for those an identifier is derived from
//! the fields that stay constant across a transaction:
//!
//! - the CSeq number and method, with `ACK` counted as `INVITE` so an ACK
//!   matches the INVITE transaction it acknowledges
//! - the Call-ID
//! - the From tag, if any
//!
//! The To tag is left out since it is only added by the first response.

use std::cell::OnceCell;

use md5::{Digest, Md5};
use tracing::trace;

use crate::error::{Error, Result};
use crate::header::h;
use crate::message::SipMessage;
use crate::types::{Method, BRANCH_MAGIC_COOKIE};

impl SipMessage {
    /// The transaction identifier.
    ///
    /// An RFC 3261 branch on the top Via always wins. Without one, the
    /// legacy identifier is used: the one set with
    /// [`set_rfc2543_transaction_id`](Self::set_rfc2543_transaction_id), or
    /// the hash, computed once and cached.
    pub fn transaction_id(&self) -> Result<&str> {
        match self.header(h::Vias) {
            Ok(vias) => {
                let branch = vias
                    .front()
                    .and_then(|via| via.params.raw_value("branch"))
                    .filter(|branch| branch.starts_with(BRANCH_MAGIC_COOKIE));
                if let Some(branch) = branch {
                    return Ok(branch);
                }
            }
            Err(Error::HeaderNotPresent { .. }) => {}
            Err(error) => return Err(error),
        }
        self.rfc2543_transaction_id()
    }

    /// The legacy identifier, computed on first call and cached.
    pub fn rfc2543_transaction_id(&self) -> Result<&str> {
        if self.rfc2543_tid.get().is_none() {
            let tid = self.compute_2543_transaction_hash()?;
            let _ = self.rfc2543_tid.set(tid);
        }
        self.rfc2543_tid
            .get()
            .map(String::as_str)
            .ok_or_else(|| Error::missing_identity_fields("transaction id"))
    }

    /// Overrides the legacy identifier. Has no effect on
    /// [`transaction_id`](Self::transaction_id) while the top Via carries an
    /// RFC 3261 branch.
    pub fn set_rfc2543_transaction_id(&mut self, tid: impl Into<String>) {
        self.rfc2543_tid = OnceCell::from(tid.into());
    }

    /// Computes the RFC 2543 transaction hash as lowercase hex.
    ///
    /// Depends only on CSeq, Call-ID and the From tag, so the result is the
    /// same however often it is called and whatever other headers change.
    /// Fails with [`Error::MissingIdentityFields`] if CSeq or Call-ID is
    /// absent.
    pub fn compute_2543_transaction_hash(&self) -> Result<String> {
        let cseq = optional(self.header(h::CSeq))?;
        let call_id = optional(self.header(h::CallId))?;
        let (cseq, call_id) = match (cseq, call_id) {
            (Some(cseq), Some(call_id)) => (cseq, call_id),
            (None, Some(_)) => return Err(Error::missing_identity_fields("CSeq")),
            (Some(_), None) => return Err(Error::missing_identity_fields("Call-ID")),
            (None, None) => return Err(Error::missing_identity_fields("CSeq and Call-ID")),
        };
        let from_tag = optional(self.header(h::From))?.and_then(|from| from.tag());

        let method = match &cseq.method {
            Method::Ack => &Method::Invite,
            method => method,
        };

        let mut hasher = Md5::new();
        hasher.update(cseq.sequence.to_string().as_bytes());
        hasher.update(b" ");
        hasher.update(method.as_str().as_bytes());
        hasher.update(b"\n");
        hasher.update(call_id.value.as_bytes());
        hasher.update(b"\n");
        hasher.update(from_tag.as_deref().unwrap_or("").as_bytes());
        let digest = hasher.finalize();

        let tid: String = digest.iter().map(|b| format!("{b:02x}")).collect();
        trace!(%tid, "computed RFC 2543 transaction id");
        Ok(tid)
    }
}

// Absent headers become `None`; parse errors still fail.
fn optional<T>(result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(Error::HeaderNotPresent { .. }) => Ok(None),
        Err(error) => Err(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn legacy_request(method: &str, extra: &[(&str, &str)]) -> SipMessage {
        let mut msg = SipMessage::request(Method::Invite, "sip:bob@biloxi.com".parse().unwrap());
        msg.add_raw_header("Via", "SIP/2.0/UDP pc33.atlanta.com;branch=1").unwrap();
        msg.add_raw_header("From", "<sip:alice@atlanta.com>;tag=1928301774").unwrap();
        msg.add_raw_header("Call-ID", "a84b4c76e66710").unwrap();
        msg.add_raw_header("CSeq", &format!("314159 {method}")).unwrap();
        for (name, value) in extra {
            msg.add_raw_header(name, value).unwrap();
        }
        msg
    }

    #[test]
    fn test_branch_is_transaction_id() {
        let mut msg = SipMessage::request(Method::Options, "sip:carol@chicago.com".parse().unwrap());
        msg.add_raw_header("Via", "SIP/2.0/UDP pc33.atlanta.com;branch=z9hG4bKhjhs8ass877").unwrap();
        msg.add_raw_header("Via", "SIP/2.0/UDP proxy.atlanta.com;branch=z9hG4bKother").unwrap();
        assert_eq!(msg.transaction_id().unwrap(), "z9hG4bKhjhs8ass877");
    }

    #[test]
    fn test_legacy_hash_is_hex_md5() {
        let msg = legacy_request("INVITE", &[]);
        let tid = msg.compute_2543_transaction_hash().unwrap();
        assert_eq!(tid.len(), 32);
        assert!(tid.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_eq!(msg.transaction_id().unwrap(), tid);
        assert_eq!(msg.rfc2543_transaction_id().unwrap(), tid);
    }

    #[test]
    fn test_ack_matches_invite() {
        let invite = legacy_request("INVITE", &[]);
        let ack = legacy_request("ACK", &[("To", "<sip:bob@biloxi.com>;tag=a6c85cf")]);
        let bye = legacy_request("BYE", &[]);
        assert_eq!(
            invite.compute_2543_transaction_hash().unwrap(),
            ack.compute_2543_transaction_hash().unwrap()
        );
        assert_ne!(
            invite.compute_2543_transaction_hash().unwrap(),
            bye.compute_2543_transaction_hash().unwrap()
        );
    }

    #[test]
    fn test_missing_fields() {
        let mut msg = SipMessage::request(Method::Invite, "sip:bob@biloxi.com".parse().unwrap());
        match msg.compute_2543_transaction_hash() {
            Err(Error::MissingIdentityFields { missing, .. }) => assert_eq!(missing, "CSeq and Call-ID"),
            other => panic!("unexpected {other:?}"),
        }
        msg.add_raw_header("CSeq", "1 INVITE").unwrap();
        match msg.transaction_id() {
            Err(Error::MissingIdentityFields { missing, .. }) => assert_eq!(missing, "Call-ID"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_explicit_id_replaces_legacy_hash() {
        let mut msg = legacy_request("INVITE", &[]);
        msg.set_rfc2543_transaction_id("tid-1");
        assert_eq!(msg.transaction_id().unwrap(), "tid-1");
        assert_eq!(msg.rfc2543_transaction_id().unwrap(), "tid-1");
    }

    #[test]
    fn test_branch_wins_over_legacy_id() {
        let mut msg = SipMessage::request(Method::Invite, "sip:bob@biloxi.com".parse().unwrap());
        msg.add_raw_header("Via", "SIP/2.0/UDP pc33.atlanta.com;branch=z9hG4bK776asdhds").unwrap();
        msg.add_raw_header("Call-ID", "a84b4c76e66710").unwrap();
        msg.add_raw_header("CSeq", "314159 INVITE").unwrap();

        let legacy = msg.rfc2543_transaction_id().unwrap().to_string();
        assert_ne!(legacy, "z9hG4bK776asdhds");
        assert_eq!(msg.transaction_id().unwrap(), "z9hG4bK776asdhds");

        msg.set_rfc2543_transaction_id("tid-1");
        assert_eq!(msg.transaction_id().unwrap(), "z9hG4bK776asdhds");
    }

    #[test]
    fn test_branch_added_after_legacy_id_cached() {
        let mut msg = legacy_request("INVITE", &[]);
        let legacy = msg.transaction_id().unwrap().to_string();
        assert_eq!(legacy.len(), 32);

        msg.header_mut(h::Vias)
            .unwrap()
            .front_mut()
            .unwrap()
            .set_branch("z9hG4bKnew");
        assert_eq!(msg.transaction_id().unwrap(), "z9hG4bKnew");
        assert_eq!(msg.rfc2543_transaction_id().unwrap(), legacy);
    }
}
