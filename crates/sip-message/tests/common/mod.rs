// Shared fixtures for the sip-message integration tests
#![allow(dead_code)]

use rvoip_sip_message::SipMessage;

/// Minimal REGISTER from RFC 3665 with an X-Trace header at positions 2 and 5
pub const REGISTER: &[u8] = b"REGISTER sip:registrar.biloxi.com SIP/2.0\r\n\
    Via: SIP/2.0/UDP bobspc.biloxi.com:5060;branch=z9hG4bKnashds7\r\n\
    X-Trace: first\r\n\
    From: Bob <sip:bob@biloxi.com>;tag=abc\r\n\
    To: Bob <sip:bob@biloxi.com>\r\n\
    X-Trace: second\r\n\
    Call-ID: xyz@host\r\n\
    CSeq: 1 REGISTER\r\n\
    Contact: <sip:bob@192.0.2.4>\r\n\
    Content-Length: 0\r\n\
    \r\n";

/// INVITE with an SDP offer
pub const INVITE: &[u8] = b"INVITE sip:bob@biloxi.com SIP/2.0\r\n\
    Via: SIP/2.0/UDP pc33.atlanta.com;branch=z9hG4bK776asdhds\r\n\
    Max-Forwards: 70\r\n\
    To: Bob <sip:bob@biloxi.com>\r\n\
    From: Alice <sip:alice@atlanta.com>;tag=1928301774\r\n\
    Call-ID: a84b4c76e66710@pc33.atlanta.com\r\n\
    CSeq: 314159 INVITE\r\n\
    Contact: <sip:alice@pc33.atlanta.com>\r\n\
    Content-Type: application/sdp\r\n\
    Content-Length: 119\r\n\
    \r\n\
    v=0\r\n\
    o=alice 2890844526 2890844526 IN IP4 pc33.atlanta.com\r\n\
    s=-\r\n\
    c=IN IP4 192.0.2.101\r\n\
    t=0 0\r\n\
    m=audio 49172 RTP/AVP 0\r\n";

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("rvoip_sip_message=trace")
        .with_test_writer()
        .try_init();
}

pub fn parse(bytes: &'static [u8]) -> SipMessage {
    init_tracing();
    SipMessage::make(bytes, true).unwrap_or_else(|e| panic!("failed to parse test message: {e}"))
}
