//! Backend identifiers.
//!
//! Stores, categories and catalog items are all addressed by numeric IDs.
//! Item IDs are shared across stores and cities, which is what makes the
//! cross-city match possible; category IDs are not, so categories are
//! compared by slug instead.

/// Defines a numeric ID newtype.
///
/// The wrapper serializes as the bare number the backend sends and derives
/// ordering and hashing so IDs can key maps and sets.
///
/// # Example
///
/// ```rust
/// use crosscity_core::{ItemId, StoreId};
///
/// let store = StoreId::new(1453);
/// let item: ItemId = serde_json::from_str("60715").unwrap();
/// assert_eq!(item.as_i64(), 60715);
///
/// // Distinct types, so this won't compile:
/// // let _: ItemId = store;
/// # let _ = store;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Create a new ID from an i64 value.
            #[must_use]
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Get the underlying i64 value.
            #[must_use]
            pub const fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id!(StoreId);
define_id!(CategoryId);
define_id!(ItemId);
