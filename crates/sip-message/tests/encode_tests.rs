mod common;

use bytes::{Bytes, BytesMut};
use proptest::prelude::*;
use rvoip_sip_message::prelude::*;

use common::{parse, INVITE, REGISTER};

#[test]
fn test_untouched_messages_round_trip() {
    for wire in [REGISTER, INVITE] {
        let msg = parse(wire);
        // typed reads do not invalidate the received bytes
        msg.header(h::CSeq).unwrap();
        msg.header(h::Vias).unwrap();
        msg.header(h::To).unwrap();
        msg.contents().unwrap();
        assert_eq!(msg.to_bytes().unwrap(), Bytes::from_static(wire));
        assert_eq!(msg.to_string().as_bytes(), wire);
    }
}

#[test]
fn test_compact_and_folded_forms_survive() {
    let wire: &'static [u8] = b"OPTIONS sip:carol@chicago.com SIP/2.0\r\n\
        v: SIP/2.0/UDP pc33.atlanta.com;branch=z9hG4bKhjhs8ass877\r\n\
        i: a84b4c76e66710\r\n\
        Subject: lunch\r\n \tat noon\r\n\
        l: 0\r\n\
        \r\n";
    let msg = parse(wire);
    assert_eq!(msg.header(h::Subject).unwrap().value, "lunch at noon");
    assert_eq!(msg.header(h::CallId).unwrap().value, "a84b4c76e66710");
    assert_eq!(msg.to_bytes().unwrap(), Bytes::from_static(wire));
}

#[test]
fn test_modified_header_is_re_rendered() {
    let mut msg = parse(REGISTER);
    msg.header_mut(h::CSeq).unwrap().sequence = 2;
    msg.unknown_header_mut("X-Trace").unwrap().push_back(StringCategory::new("third"));

    let text = msg.to_string();
    assert!(text.contains("\r\nCSeq: 2 REGISTER\r\n"));
    assert!(text.contains("\r\nX-Trace: first\r\nX-Trace: second\r\nX-Trace: third\r\n"));
    // untouched neighbours are still raw
    assert!(text.contains("\r\nFrom: Bob <sip:bob@biloxi.com>;tag=abc\r\n"));

    let reparsed = SipMessage::make(Bytes::from(text), true).unwrap();
    assert_eq!(reparsed.header(h::CSeq).unwrap().sequence, 2);
    assert_eq!(reparsed.unknown_header("X-Trace").unwrap().len(), 3);
}

#[test]
fn test_response_built_from_request_headers() {
    let request = parse(REGISTER);
    let mut response = SipMessage::response(200, "OK");
    for kind in [HeaderKind::Via, HeaderKind::From, HeaderKind::To, HeaderKind::CallId, HeaderKind::CSeq] {
        let raw = request.raw_header(kind).unwrap();
        response.set_raw_header(kind, &raw).unwrap();
    }
    response.header_mut(h::To).unwrap().set_tag("37GkEhwl6");
    drop(request);

    let text = response.to_string();
    assert!(text.starts_with("SIP/2.0 200 OK\r\nVia: SIP/2.0/UDP bobspc.biloxi.com:5060;branch=z9hG4bKnashds7\r\n"));
    assert!(text.contains("\r\nTo: \"Bob\" <sip:bob@biloxi.com>;tag=37GkEhwl6\r\n"), "{text}");
    assert!(text.ends_with("Content-Length: 0\r\n\r\n"));
    assert_eq!(response.transaction_id().unwrap(), "z9hG4bKnashds7");
}

#[test]
fn test_encoded_cache() {
    let mut msg = parse(INVITE);
    assert!(msg.encoded().is_none());
    let bytes = msg.encode_to_cache().unwrap();
    assert_eq!(msg.encoded(), Some(&bytes));
    assert_eq!(bytes, Bytes::from_static(INVITE));
}

#[test]
fn test_embedded_encoding() {
    let mut msg = SipMessage::request(Method::Invite, "sip:bob@biloxi.com".parse().unwrap());
    msg.add_raw_header("Subject", "hi there").unwrap();
    msg.add_raw_header("Priority", "urgent").unwrap();
    msg.set_contents(Contents::Text(PlainContents::new("x&y")));

    let mut out = BytesMut::new();
    msg.encode_embedded(&mut out).unwrap();
    assert_eq!(
        &out[..],
        &b"?Subject=hi%20there&Priority=urgent&Content-Type=text/plain&body=x%26y"[..]
    );
}

proptest! {
    #[test]
    fn prop_unknown_header_values_pass_through(value in "[!-~]([ -~]{0,60}[!-~])?") {
        let wire = format!(
            "OPTIONS sip:carol@chicago.com SIP/2.0\r\nX-Custom: {value}\r\nCSeq: 1 OPTIONS\r\nContent-Length: 0\r\n\r\n"
        );
        let msg = SipMessage::make(Bytes::from(wire.clone()), true).unwrap();
        prop_assert_eq!(msg.header(h::CSeq).unwrap().sequence, 1);
        let raw = msg.raw_unknown_header("X-Custom").unwrap();
        prop_assert_eq!(raw.values().next().unwrap(), value.as_bytes());
        prop_assert_eq!(msg.to_bytes().unwrap(), Bytes::from(wire));
    }
}
