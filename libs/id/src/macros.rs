//! Macros for defining fixed-width numeric code types.

/// Macro to define a zero-padded, fixed-width numeric code.
///
/// This generates a newtype wrapper around an unsigned integer with:
/// - `WIDTH` and `MAX` constants
/// - `new()` to build from a number (rejects values wider than `WIDTH`)
/// - `parse()` to parse from an exactly-`WIDTH`-digit string
/// - `Display` (zero-padded) and `FromStr` implementations
/// - `Serialize` and `Deserialize` implementations using the string form
/// - `Ord`, `Hash`, and other standard traits
///
/// Ordering is numeric, which for a fixed width is the same as string
/// ordering.
///
/// # Example
///
/// ```ignore
/// define_code!(AreaCode, u32, 5, InvalidAreaCode, area_code);
///
/// let code = AreaCode::parse("01001")?;
/// assert_eq!(code.to_string(), "01001");
/// assert_eq!(code.value(), 1001);
/// ```
#[macro_export]
macro_rules! define_code {
    ($name:ident, $repr:ty, $width:literal, $err:ident, $field:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name($repr);

        impl $name {
            /// Number of digits in the canonical string form.
            pub const WIDTH: usize = $width;

            /// Largest value that fits in `WIDTH` digits.
            pub const MAX: $repr = (10 as $repr).pow($width) - 1;

            /// Creates a code from its numeric value.
            ///
            /// Returns `None` if the value needs more than `WIDTH` digits.
            #[must_use]
            pub const fn new(value: $repr) -> Option<Self> {
                if value > Self::MAX {
                    None
                } else {
                    Some(Self(value))
                }
            }

            /// Returns the numeric value.
            #[must_use]
            pub const fn value(&self) -> $repr {
                self.0
            }

            /// Parses a code from a string of exactly `WIDTH` ASCII digits.
            pub fn parse(s: &str) -> Result<Self, $crate::IdError> {
                if !$crate::is_numeric_string(s, Some(Self::WIDTH)) {
                    return Err($crate::IdError::$err {
                        $field: s.to_string(),
                    });
                }

                s.parse::<$repr>()
                    .map(Self)
                    .map_err(|_| $crate::IdError::$err {
                        $field: s.to_string(),
                    })
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{:0width$}", self.0, width = $width)
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(&self.to_string())
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                Self::parse(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}
