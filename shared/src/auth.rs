//! Appliance authentication key

use std::fmt;

use crate::appliance::AUTH_KEY_LEN;

/// Secret written to the appliance before any command is accepted.
///
/// The key is opaque to the bridge: it is parsed once at startup and only
/// ever handed to the link as raw bytes. `Debug` output is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthKey([u8; AUTH_KEY_LEN]);

/// Errors when parsing a hex encoded key
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthKeyError {
    #[error("authentication key is not valid hex")]
    InvalidHex,

    #[error("authentication key must be {AUTH_KEY_LEN} bytes, got {0}")]
    InvalidLength(usize),
}

impl AuthKey {
    /// Wrap raw key bytes
    pub fn new(bytes: [u8; AUTH_KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Parse a hex string (either case)
    pub fn from_hex(hex: &str) -> Result<Self, AuthKeyError> {
        let bytes = data_encoding::HEXLOWER_PERMISSIVE
            .decode(hex.trim().as_bytes())
            .map_err(|_| AuthKeyError::InvalidHex)?;
        let len = bytes.len();
        let bytes: [u8; AUTH_KEY_LEN] = bytes
            .try_into()
            .map_err(|_| AuthKeyError::InvalidLength(len))?;
        Ok(Self(bytes))
    }

    /// Raw bytes as written to the authentication characteristic
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Default for AuthKey {
    fn default() -> Self {
        // The factory key is a compile-time constant of the right length.
        Self::from_hex(crate::appliance::DEFAULT_AUTH_KEY_HEX).unwrap_or(Self([0; AUTH_KEY_LEN]))
    }
}

impl fmt::Debug for AuthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthKey(<redacted>)")
    }
}
