//! Priced resource offerings.

use serde::{Deserialize, Serialize};

use crate::{Amount, Curve};

/// Advisory permission flags attached to an offering.
///
/// Published in the discovery document; nothing in the payment flow
/// enforces them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Permissions {
    /// Holders may resell access.
    pub resale: bool,
    /// Holders may publish derived works.
    pub derivatives: bool,
}

/// A resource offered for sale at a path.
///
/// Immutable for the lifetime of a process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathOffering {
    /// Resource identifier (e.g. `/$doc`).
    pub path: String,
    /// Price at zero supply, in minor units.
    pub base_price: Amount,
    /// Pricing curve.
    pub curve: Curve,
    /// Advertised supply cap. Not enforced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_supply: Option<u64>,
    /// Payout identity of the issuer.
    pub issuer_address: String,
    /// Expected hex SHA-256 of the content bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,
    /// Advisory permission flags.
    #[serde(default)]
    pub permissions: Permissions,
}

impl PathOffering {
    /// Create an offering with no integrity hash, supply cap or permissions.
    pub fn new(
        path: impl Into<String>,
        base_price: Amount,
        curve: Curve,
        issuer_address: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            base_price,
            curve,
            max_supply: None,
            issuer_address: issuer_address.into(),
            content_hash: None,
            permissions: Permissions::default(),
        }
    }

    /// Set the expected content hash.
    pub fn with_content_hash(mut self, hash: impl Into<String>) -> Self {
        self.content_hash = Some(hash.into());
        self
    }

    /// Set the advertised supply cap.
    pub fn with_max_supply(mut self, max_supply: u64) -> Self {
        self.max_supply = Some(max_supply);
        self
    }

    /// Set the permission flags.
    pub fn with_permissions(mut self, permissions: Permissions) -> Self {
        self.permissions = permissions;
        self
    }
}
