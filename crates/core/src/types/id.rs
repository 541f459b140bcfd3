//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different entity types.
//!
//! The pizza service is inconsistent about id encoding: the production
//! backend sends JSON numbers while some fixtures send numeric strings
//! (`"3"`). Every id accepts both and always serializes as a number.

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `i64` with:
/// - `Serialize` as a JSON number, `Deserialize` from a number or a numeric string
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_i64()`
/// - `From<i64>`, `Into<i64>`, and `FromStr` implementations
///
/// # Example
///
/// ```rust
/// # use jwt_pizza_core::define_id;
/// define_id!(UserId);
/// define_id!(OrderId);
///
/// let user_id = UserId::new(1);
/// let order_id = OrderId::new(1);
///
/// // These are different types, so this won't compile:
/// // let _: UserId = order_id;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, ::serde::Serialize)]
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

        impl ::core::str::FromStr for $name {
            type Err = ::core::num::ParseIntError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                s.trim().parse::<i64>().map(Self)
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

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> ::core::result::Result<Self, D::Error>
            where
                D: ::serde::Deserializer<'de>,
            {
                #[derive(::serde::Deserialize)]
                #[serde(untagged)]
                enum Raw {
                    Number(i64),
                    Text(String),
                }

                match <Raw as ::serde::Deserialize>::deserialize(deserializer)? {
                    Raw::Number(id) => Ok(Self(id)),
                    Raw::Text(text) => text.trim().parse::<i64>().map(Self).map_err(|_| {
                        <D::Error as ::serde::de::Error>::custom(format!(
                            "invalid {}: {text:?}",
                            stringify!($name)
                        ))
                    }),
                }
            }
        }
    };
}

// Define standard entity IDs
define_id!(UserId);
define_id!(MenuItemId);
define_id!(FranchiseId);
define_id!(StoreId);
define_id!(OrderId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_number() {
        let id: UserId = serde_json::from_str("7").unwrap();
        assert_eq!(id, UserId::new(7));
    }

    #[test]
    fn test_deserialize_numeric_string() {
        let id: FranchiseId = serde_json::from_str("\"2\"").unwrap();
        assert_eq!(id.as_i64(), 2);
    }

    #[test]
    fn test_deserialize_rejects_garbage() {
        let err = serde_json::from_str::<StoreId>("\"lehi\"").unwrap_err();
        assert!(err.to_string().contains("invalid StoreId"));
    }

    #[test]
    fn test_serializes_as_number() {
        assert_eq!(serde_json::to_string(&OrderId::new(23)).unwrap(), "23");
    }

    #[test]
    fn test_from_str_and_display() {
        let id: MenuItemId = " 4 ".parse().unwrap();
        assert_eq!(id.to_string(), "4");
    }
}
