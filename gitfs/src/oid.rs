//! Identifiers of objects in the backing store.

use std::{fmt, str::FromStr};

pub mod error {
    use thiserror::Error;

    /// The reason a byte sequence is not a valid identifier.
    #[derive(Debug, Error, PartialEq, Eq)]
    pub enum Parse {
        #[error("invalid identifier length {actual}, expected {expected}")]
        Length { actual: usize, expected: usize },
        #[error("identifier contains a non-hexadecimal byte")]
        Hex,
    }
}

/// The digest format of the backing store.
///
/// Every object is addressed by a fixed-length content digest. Carrying the
/// format on each [`Oid`] keeps the digest length in one place, so a store
/// with a longer digest can be supported without touching call sites.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Format {
    /// 160-bit digest, rendered as 40 hexadecimal characters.
    Sha1,
}

/// The format used when none is stated, matching `git`'s default object
/// format.
pub const FORMAT: Format = Format::Sha1;

impl Format {
    /// Length of an identifier in hexadecimal characters.
    pub const fn hex_len(&self) -> usize {
        match self {
            Self::Sha1 => 40,
        }
    }
}

// Widest `hex_len` over all supported formats.
const MAX_HEX: usize = 40;

/// An opaque content digest identifying one object.
///
/// Identifiers are compared for equality and displayed as hexadecimal text;
/// they are never interpreted numerically.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Oid {
    format: Format,
    hex: [u8; MAX_HEX],
}

impl Oid {
    /// Parse an identifier from its hexadecimal rendering.
    ///
    /// The input must be exactly [`Format::hex_len`] hexadecimal bytes.
    pub fn from_hex(format: Format, hex: &[u8]) -> Result<Self, error::Parse> {
        let expected = format.hex_len();
        if hex.len() != expected {
            return Err(error::Parse::Length {
                actual: hex.len(),
                expected,
            });
        }
        if !hex.iter().all(u8::is_ascii_hexdigit) {
            return Err(error::Parse::Hex);
        }
        let mut buf = [0u8; MAX_HEX];
        buf[..expected].copy_from_slice(hex);
        Ok(Self { format, hex: buf })
    }

    /// The digest format of this identifier.
    pub fn format(&self) -> Format {
        self.format
    }

    /// The hexadecimal rendering, as bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.hex[..self.format.hex_len()]
    }
}

impl AsRef<[u8]> for Oid {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        // `from_hex` admits ASCII hex digits only.
        for b in self.as_bytes() {
            write!(f, "{}", *b as char)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Oid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Oid({})", self)
    }
}

impl FromStr for Oid {
    type Err = error::Parse;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(FORMAT, s.as_bytes())
    }
}

impl TryFrom<&str> for Oid {
    type Error = error::Parse;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl TryFrom<&[u8]> for Oid {
    type Error = error::Parse;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Self::from_hex(FORMAT, bytes)
    }
}
