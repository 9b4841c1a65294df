mod common;

use proptest::prelude::*;
use rvoip_sip_message::prelude::*;

use common::{parse, INVITE};

fn legacy_invite(cseq_method: &str) -> SipMessage {
    let mut msg = SipMessage::request(Method::Invite, "sip:bob@biloxi.com".parse().unwrap());
    msg.add_raw_header("Via", "SIP/2.0/UDP pc33.atlanta.com").unwrap();
    msg.add_raw_header("From", "Alice <sip:alice@atlanta.com>;tag=88sja8x").unwrap();
    msg.add_raw_header("Call-ID", "987asjd97y7atg").unwrap();
    msg.add_raw_header("CSeq", &format!("986759 {cseq_method}")).unwrap();
    msg
}

#[test]
fn test_rfc3261_branch() {
    let msg = parse(INVITE);
    assert_eq!(msg.transaction_id().unwrap(), "z9hG4bK776asdhds");
}

#[test]
fn test_branch_outranks_legacy_id() {
    let mut msg = parse(INVITE);
    let legacy = msg.rfc2543_transaction_id().unwrap().to_string();
    assert_eq!(legacy, msg.compute_2543_transaction_hash().unwrap());
    assert_eq!(msg.transaction_id().unwrap(), "z9hG4bK776asdhds");

    msg.set_rfc2543_transaction_id("local-override");
    assert_eq!(msg.transaction_id().unwrap(), "z9hG4bK776asdhds");
    assert_eq!(msg.rfc2543_transaction_id().unwrap(), "local-override");
}

#[test]
fn test_branch_set_after_legacy_id() {
    let mut msg = legacy_invite("INVITE");
    let legacy = msg.transaction_id().unwrap().to_string();

    msg.header_mut(h::Vias).unwrap().front_mut().unwrap().set_branch("z9hG4bKnew");
    assert_eq!(msg.transaction_id().unwrap(), "z9hG4bKnew");
    assert!(msg.to_string().contains("\r\nVia: SIP/2.0/UDP pc33.atlanta.com;branch=z9hG4bKnew\r\n"));

    msg.header_mut(h::Vias).unwrap().front_mut().unwrap().set_branch("1");
    assert_eq!(msg.transaction_id().unwrap(), legacy);
}

#[test]
fn test_legacy_id_is_cached() {
    let msg = legacy_invite("INVITE");
    let first = msg.transaction_id().unwrap();
    let second = msg.transaction_id().unwrap();
    assert!(std::ptr::eq(first, second));
    assert_eq!(first, msg.compute_2543_transaction_hash().unwrap());
}

#[test]
fn test_ack_shares_invite_transaction() {
    let invite = legacy_invite("INVITE");
    let mut ack = legacy_invite("ACK");
    ack.add_raw_header("To", "Bob <sip:bob@biloxi.com>;tag=314159").unwrap();
    assert_eq!(invite.transaction_id().unwrap(), ack.transaction_id().unwrap());
}

#[test]
fn test_missing_identity_fields() {
    let mut msg = SipMessage::request(Method::Invite, "sip:bob@biloxi.com".parse().unwrap());
    msg.add_raw_header("Call-ID", "987asjd97y7atg").unwrap();
    assert!(matches!(
        msg.compute_2543_transaction_hash(),
        Err(Error::MissingIdentityFields { ref missing, .. }) if missing == "CSeq"
    ));
}

proptest! {
    #[test]
    fn prop_legacy_hash_ignores_unrelated_headers(
        subject in "[a-zA-Z0-9 ,]{0,40}",
        extension in "[a-zA-Z0-9=;]{1,20}",
        hops in 0u32..256,
    ) {
        let plain = legacy_invite("INVITE");
        let mut decorated = legacy_invite("INVITE");
        decorated.add_raw_header("Subject", &subject).unwrap();
        decorated.add_raw_header("X-Extension", &extension).unwrap();
        decorated.header_mut(h::MaxForwards).unwrap().value = hops;

        let expected = plain.compute_2543_transaction_hash().unwrap();
        prop_assert_eq!(&decorated.compute_2543_transaction_hash().unwrap(), &expected);
        prop_assert_eq!(&decorated.compute_2543_transaction_hash().unwrap(), &expected);
    }

    #[test]
    fn prop_legacy_hash_tracks_identity_fields(sequence in 1u32..1_000_000) {
        let base = legacy_invite("INVITE");
        let mut other = legacy_invite("INVITE");
        other.header_mut(h::CSeq).unwrap().sequence = sequence;
        let same = sequence == 986759;
        prop_assert_eq!(
            base.compute_2543_transaction_hash().unwrap() == other.compute_2543_transaction_hash().unwrap(),
            same
        );
    }
}
