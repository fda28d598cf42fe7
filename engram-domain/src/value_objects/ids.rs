// /////////////////////////////////////////////////////////////////////////////
// Engram
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Entity Identifiers
//!
//! Time-sortable 128-bit identifiers for the three entity kinds that need
//! one: memories, secrets, and authorized devices. Each is a newtype over
//! `Uuid` (v7, so natural insertion order matches creation order) to prevent
//! mixing up ids from different tables at compile time.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use uuid::Uuid;

macro_rules! uuid_v7_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(Uuid);

        impl $name {
            /// Generates a new, time-ordered identifier.
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Wraps an existing UUID (e.g. one read back from storage).
            pub fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            pub fn as_uuid(&self) -> Uuid {
                self.0
            }

            pub fn parse(s: &str) -> Result<Self, uuid::Error> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

uuid_v7_id!(MemoryId);
uuid_v7_id!(SecretId);
uuid_v7_id!(DeviceId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_ids_are_time_sortable() {
        let a = MemoryId::new();
        let b = MemoryId::new();
        assert!(a < b || a == b); // v7 ids generated in sequence never decrease
    }

    #[test]
    fn round_trips_through_string() {
        let id = SecretId::new();
        let parsed = SecretId::parse(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }
}
