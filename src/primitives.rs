use std::fmt;

// --- Accounts ---------------------------------------------------------------

/// A 20-byte account identifier. `Address::ZERO` is the null account.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, serde::Serialize, serde::Deserialize)]
#[serde(transparent)] // To serialize as the inner type directly
pub struct Address(#[serde(with = "serde_bytes")] pub [u8; 20]);

impl Address {
    pub const ZERO: Address = Address([0u8; 20]);

    /// An address with every byte set to `byte`. Handy for fixtures.
    pub const fn repeat_byte(byte: u8) -> Self {
        Address([byte; 20])
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("0x")?;
        for b in &self.0 {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

// --- Roles ------------------------------------------------------------------

/// Opaque 32-byte role key chosen by the caller.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct RoleId(#[serde(with = "serde_bytes")] pub [u8; 32]);

impl RoleId {
    /// Derives the role key from a human label as `keccak256(label)`.
    pub fn from_label(label: &str) -> Self {
        RoleId(crate::crypto::keccak256(label.as_bytes()))
    }
}

impl fmt::Display for RoleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("0x")?;
        for b in &self.0 {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

// --- Capability tokens ------------------------------------------------------

/// Identifier of a capability token (a "hat") issued by the registry.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct HatId(pub u64);

impl HatId {
    /// Reserved "no token" value.
    pub const NONE: HatId = HatId(0);

    pub fn is_none(&self) -> bool {
        *self == Self::NONE
    }
}

impl fmt::Display for HatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_display_is_prefixed_hex() {
        let addr = Address::repeat_byte(0xab);
        let s = addr.to_string();
        assert!(s.starts_with("0x"));
        assert_eq!(s.len(), 2 + 40);
        assert!(s[2..].chars().all(|c| c == 'a' || c == 'b'));
        assert_eq!(Address::ZERO.to_string(), format!("0x{}", "0".repeat(40)));
    }

    #[test]
    fn zero_checks() {
        assert!(Address::ZERO.is_zero());
        assert!(!Address::repeat_byte(1).is_zero());
        assert!(HatId::NONE.is_none());
        assert!(!HatId(7).is_none());
    }

    #[test]
    fn role_id_from_label_is_deterministic() {
        assert_eq!(RoleId::from_label("OPERATOR"), RoleId::from_label("OPERATOR"));
        assert_ne!(RoleId::from_label("OPERATOR"), RoleId::from_label("operator"));
    }

    #[test]
    fn identifiers_serialize_transparently() {
        let json = serde_json::to_string(&HatId(3)).unwrap();
        assert_eq!(json, "3");
        let back: HatId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, HatId(3));
    }
}
