//! Instrument identifiers

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Identifier of a tradable instrument
///
/// Instruments partition orders into independent books. Valid identifiers
/// are the integers 1 through 1024 inclusive; construction is the only way
/// to obtain one, so a held `InstrumentId` is always in range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct InstrumentId(u16);

impl InstrumentId {
    /// Lowest valid identifier
    pub const MIN: u16 = 1;

    /// Highest valid identifier
    pub const MAX: u16 = 1024;

    /// Create a validated instrument identifier
    pub fn new(raw: u16) -> Result<Self> {
        if (Self::MIN..=Self::MAX).contains(&raw) {
            Ok(Self(raw))
        } else {
            Err(Error::Validation(format!(
                "instrument {} outside valid range {}..={}",
                raw,
                Self::MIN,
                Self::MAX
            )))
        }
    }

    /// Raw numeric identifier
    pub fn raw(self) -> u16 {
        self.0
    }
}

impl TryFrom<u16> for InstrumentId {
    type Error = Error;

    fn try_from(raw: u16) -> Result<Self> {
        Self::new(raw)
    }
}

impl From<InstrumentId> for u16 {
    fn from(id: InstrumentId) -> Self {
        id.0
    }
}

impl fmt::Display for InstrumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
