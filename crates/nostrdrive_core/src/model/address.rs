//! Owner address with optional relay hints.

use crate::model::coordinate::{Coordinate, CoordinateError};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Public key of an owner plus the relays it is known to publish to.
///
/// Unlike [`Coordinate`], an address carries no kind or identifier. It is the
/// owner input for create operations and a carrier of relay hints for plain
/// record-id lookups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    owner: String,
    #[serde(default)]
    relay_hints: Vec<String>,
}

impl Address {
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            relay_hints: Vec::new(),
        }
    }

    /// Creates an address with relay hints in caller order.
    pub fn with_relays(owner: impl Into<String>, relay_hints: Vec<String>) -> Self {
        Self {
            owner: owner.into(),
            relay_hints,
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn relay_hints(&self) -> &[String] {
        &self.relay_hints
    }

    /// First relay hint, if any.
    pub fn primary_relay(&self) -> Option<&str> {
        self.relay_hints.first().map(String::as_str)
    }

    /// Builds the coordinate of an object of `kind` owned by this address.
    pub fn coordinate(
        &self,
        kind: u32,
        identifier: impl Into<String>,
    ) -> Result<Coordinate, CoordinateError> {
        Coordinate::new(kind, self.owner.as_str(), identifier)
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.owner)
    }
}
