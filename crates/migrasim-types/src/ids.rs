//! Type-safe arena-index identifier wrappers.
//!
//! Every entity in the simulation is identified by its position in the
//! owning [`World`](../../migrasim-world/struct.World.html)'s backing
//! `Vec`, not by a generated surrogate key. An arena index doubles as
//! the entity's insertion order, which is exactly the "stable ordering"
//! the deterministic per-person RNG sub-stream derivation needs, so the
//! id type and the ordering key are the same value with no auxiliary
//! bookkeeping.

use serde::{Deserialize, Serialize};

/// Generates a newtype wrapper around a `u32` arena index.
macro_rules! define_index_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(u32);

        impl $name {
            /// Wrap a raw `Vec` index. Panics in debug builds only via the
            /// `TryFrom` conversion below when the index does not fit in
            /// `u32`; callers that already hold a `usize` index should use
            /// [`TryFrom`] rather than constructing this directly.
            #[must_use]
            pub const fn from_index(idx: u32) -> Self {
                Self(idx)
            }

            /// Return the index as a `usize` suitable for `Vec` indexing.
            #[must_use]
            pub const fn index(self) -> usize {
                self.0 as usize
            }

            /// Return the raw `u32` value.
            #[must_use]
            pub const fn raw(self) -> u32 {
                self.0
            }
        }

        impl TryFrom<usize> for $name {
            type Error = core::num::TryFromIntError;

            fn try_from(idx: usize) -> Result<Self, Self::Error> {
                u32::try_from(idx).map(Self)
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_index_id! {
    /// Identifies a person by its index in `World`'s person arena.
    PersonId
}

define_index_id! {
    /// Identifies a city by its index in `World`'s city arena.
    CityId
}

define_index_id! {
    /// Identifies a factor definition by its index in `World`'s factor
    /// definition arena. Doubles as the "insertion-ordered" ranking
    /// required by the data model.
    FactorId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_distinct_types() {
        let person = PersonId::from_index(0);
        let city = CityId::from_index(0);
        // Same underlying value, different types -- the compiler
        // enforces that a PersonId can never be passed where a CityId
        // is expected, even though both wrap a 0.
        assert_eq!(person.index(), city.index());
    }

    #[test]
    fn index_roundtrips() {
        let id = PersonId::from_index(42);
        assert_eq!(id.index(), 42);
        assert_eq!(id.raw(), 42);
    }

    #[test]
    fn try_from_usize_succeeds_in_range() {
        let id = PersonId::try_from(7_usize);
        assert_eq!(id.map(PersonId::index), Ok(7));
    }

    #[test]
    fn ordering_matches_index_order() {
        let a = CityId::from_index(1);
        let b = CityId::from_index(2);
        assert!(a < b);
    }

    #[test]
    fn id_roundtrip_serde() {
        let original = FactorId::from_index(3);
        let json = serde_json::to_string(&original).expect("serialize");
        let restored: FactorId = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(original, restored);
    }

    #[test]
    fn display_shows_raw_index() {
        let id = CityId::from_index(5);
        assert_eq!(id.to_string(), "5");
    }
}
