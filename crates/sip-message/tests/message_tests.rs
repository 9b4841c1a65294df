mod common;

use bytes::Bytes;
use rvoip_sip_message::prelude::*;

use common::{parse, INVITE, REGISTER};

#[test]
fn test_register_scenario() {
    let msg = parse(REGISTER);

    assert!(msg.is_request().unwrap());
    assert!(!msg.is_response().unwrap());
    assert_eq!(msg.header(h::CallId).unwrap(), &"xyz@host");
    assert_eq!(msg.header(h::From).unwrap().tag().as_deref(), Some("abc"));
    assert_eq!(msg.header(h::CSeq).unwrap().method, Method::Register);
    assert_eq!(msg.header(h::Contacts).unwrap().len(), 1);
    assert_eq!(msg.transaction_id().unwrap(), "z9hG4bKnashds7");
    assert!(msg.contents().unwrap().is_none());
}

#[test]
fn test_unknown_headers_keep_relative_order() {
    let msg = parse(REGISTER);

    let unknown = msg.raw_unknown_headers();
    assert_eq!(unknown.len(), 1);
    assert_eq!(unknown[0].name(), "X-Trace");

    let raw = msg.raw_unknown_header("x-trace").unwrap();
    let values: Vec<&[u8]> = raw.values().collect();
    assert_eq!(values, vec![&b"first"[..], &b"second"[..]]);

    let orders: Vec<u64> = unknown[0].values().values().iter().map(|v| v.order()).collect();
    assert!(orders[0] < orders[1]);
}

#[test]
fn test_absence_semantics() {
    let mut msg = parse(REGISTER);

    for kind in [HeaderKind::Route, HeaderKind::RecordRoute, HeaderKind::Subject] {
        assert!(!msg.exists(kind));
    }
    assert!(matches!(msg.header(h::Routes), Err(Error::HeaderNotPresent { .. })));
    assert!(matches!(msg.header(h::Subject), Err(Error::HeaderNotPresent { .. })));

    assert!(msg.header_mut(h::Routes).unwrap().is_empty());
    assert!(msg.exists(h::Routes));
    assert!(msg.header(h::Routes).unwrap().is_empty());
}

#[test]
fn test_deep_copy_independence() {
    let mut original = parse(REGISTER);
    let mut copy = original.clone();

    copy.header_mut(h::CSeq).unwrap().sequence = 2;
    copy.header_mut(h::From).unwrap().set_tag("def");
    assert_eq!(original.header(h::CSeq).unwrap().sequence, 1);
    assert_eq!(original.header(h::From).unwrap().tag().as_deref(), Some("abc"));

    original.header_mut(h::Contacts).unwrap().clear();
    assert_eq!(copy.header(h::Contacts).unwrap().len(), 1);

    drop(original);
    assert_eq!(copy.header(h::CallId).unwrap(), &"xyz@host");
    assert!(copy.to_bytes().unwrap().starts_with(b"REGISTER sip:registrar.biloxi.com SIP/2.0\r\n"));
}

#[test]
fn test_copy_owns_its_buffers() {
    let original = parse(REGISTER);
    let copy = original.clone();
    let id = original.raw_header(h::CallId).unwrap().list().values()[0].span().buffer();
    assert_ne!(
        original.arena().buffer(id).unwrap().as_ptr(),
        copy.arena().buffer(id).unwrap().as_ptr()
    );
}

#[test]
fn test_sdp_contents() {
    let msg = parse(INVITE);

    let contents = msg.contents().unwrap().unwrap();
    let sdp = contents.as_sdp().unwrap();
    assert_eq!(sdp.origin(), Some("alice 2890844526 2890844526 IN IP4 pc33.atlanta.com"));
    assert_eq!(sdp.media().count(), 1);

    // cached: the same instance comes back
    let again = msg.contents().unwrap().unwrap();
    assert!(std::ptr::eq(contents, again));
}

#[test]
fn test_release_contents_is_exclusive() {
    let mut msg = parse(INVITE);

    let released = msg.release_contents().unwrap();
    assert!(matches!(released, Contents::Sdp(_)));
    assert!(msg.contents().unwrap().is_none());
    assert!(matches!(msg.release_contents(), Err(Error::ContentsUnavailable { .. })));

    let encoded = msg.to_bytes().unwrap();
    let text = std::str::from_utf8(&encoded).unwrap();
    assert!(text.contains("\r\nContent-Length: 0\r\n"));
    assert!(!text.contains("Content-Type"));
    assert!(text.ends_with("\r\n\r\n"));

    msg.set_contents_from(&released);
    assert!(msg.contents().unwrap().unwrap().as_sdp().is_some());
}

#[test]
fn test_locally_built_message() {
    let mut msg = SipMessage::request(Method::Message, "sip:bob@biloxi.com".parse().unwrap());
    msg.header_mut(h::Vias)
        .unwrap()
        .push_back(Via::new("TCP", "pc33.atlanta.com", Some(5060)));
    msg.header_mut(h::Vias).unwrap()[0].set_branch("z9hG4bK74bf9");
    msg.header_mut(h::CallId).unwrap().value = "3848276298220188511@atlanta.com".to_string();
    msg.header_mut(h::CSeq).unwrap().sequence = 1;
    msg.header_mut(h::CSeq).unwrap().method = Method::Message;
    msg.set_contents(Contents::Text(PlainContents::new("Watson, come here.")));

    let encoded = msg.to_bytes().unwrap();
    let parsed = SipMessage::make(encoded, true).unwrap();
    assert_eq!(parsed.transaction_id().unwrap(), "z9hG4bK74bf9");
    assert_eq!(parsed.header(h::ContentLength).unwrap().value, 18);
    match parsed.contents().unwrap() {
        Some(Contents::Text(text)) => assert_eq!(text.text, "Watson, come here."),
        other => panic!("unexpected contents {other:?}"),
    }
}

#[test]
fn test_body_replaced_with_raw_bytes() {
    let mut msg = parse(INVITE);
    msg.set_body(Bytes::from_static(b"v=0\r\ns=replaced\r\n")).unwrap();
    let sdp = msg.contents().unwrap().unwrap().as_sdp().unwrap();
    assert_eq!(sdp.session_name(), Some("replaced"));
}

#[test]
fn test_message_is_send() {
    fn assert_send<T: Send>() {}
    assert_send::<SipMessage>();

    let msg = parse(REGISTER);
    let handle = std::thread::spawn(move || msg.header(h::CSeq).map(|cseq| cseq.sequence).ok());
    assert_eq!(handle.join().unwrap(), Some(1));
}
