use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Transport protocol of an endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransportType {
    Udp,
    Tcp,
    Tls,
    Sctp,
    Ws,
    Wss,
}

impl TransportType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportType::Udp => "UDP",
            TransportType::Tcp => "TCP",
            TransportType::Tls => "TLS",
            TransportType::Sctp => "SCTP",
            TransportType::Ws => "WS",
            TransportType::Wss => "WSS",
        }
    }

    /// Whether the transport is encrypted
    pub fn is_secure(&self) -> bool {
        matches!(self, TransportType::Tls | TransportType::Wss)
    }
}

impl fmt::Display for TransportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransportType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "UDP" => Ok(TransportType::Udp),
            "TCP" => Ok(TransportType::Tcp),
            "TLS" => Ok(TransportType::Tls),
            "SCTP" => Ok(TransportType::Sctp),
            "WS" => Ok(TransportType::Ws),
            "WSS" => Ok(TransportType::Wss),
            _ => Err(Error::invalid_format(format!("unknown transport '{s}'"))),
        }
    }
}

/// An endpoint descriptor: address, port and transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tuple {
    pub address: SocketAddr,
    pub transport: TransportType,
}

impl Tuple {
    pub fn new(address: SocketAddr, transport: TransportType) -> Self {
        Tuple { address, transport }
    }
}

impl fmt::Display for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[ {} {} ]", self.transport, self.address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_from_str() {
        assert_eq!("udp".parse::<TransportType>().unwrap(), TransportType::Udp);
        assert_eq!("WSS".parse::<TransportType>().unwrap(), TransportType::Wss);
        assert!("carrier-pigeon".parse::<TransportType>().is_err());
        assert!(TransportType::Tls.is_secure());
    }

    #[test]
    fn test_tuple_equality() {
        let a = Tuple::new("192.0.2.1:5060".parse().unwrap(), TransportType::Udp);
        let b = Tuple::new("192.0.2.1:5060".parse().unwrap(), TransportType::Tcp);
        assert_ne!(a, b);
        assert_eq!(a.to_string(), "[ UDP 192.0.2.1:5060 ]");
    }
}
