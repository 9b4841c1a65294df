use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// SIP protocol version, as defined in RFC 3261.
///
/// The current version is "SIP/2.0".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Version {
    /// Major version (currently 2)
    pub major: u8,
    /// Minor version (currently 0)
    pub minor: u8,
}

impl Version {
    /// Create a new SIP version with the given major and minor versions.
    pub fn new(major: u8, minor: u8) -> Self {
        Version { major, minor }
    }

    /// Creates a SIP version with the standard version (2.0)
    pub fn sip_2_0() -> Self {
        Version { major: 2, minor: 0 }
    }
}

impl Default for Version {
    fn default() -> Self {
        Version::sip_2_0()
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SIP/{}.{}", self.major, self.minor)
    }
}

impl FromStr for Version {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::malformed_start_line(format!("invalid SIP version '{s}'"));
        let numbers = s
            .get(..4)
            .filter(|prefix| prefix.eq_ignore_ascii_case("SIP/"))
            .and_then(|_| s.get(4..))
            .ok_or_else(invalid)?;
        let (major, minor) = numbers.split_once('.').ok_or_else(invalid)?;
        Ok(Version {
            major: major.parse().map_err(|_| invalid())?,
            minor: minor.parse().map_err(|_| invalid())?,
        })
    }
}
