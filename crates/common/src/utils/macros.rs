//! Macros for reducing boilerplate code

/// Implements `Display`, `FromStr` and an `as_str` accessor for label enums
///
/// Labels render exactly as given and parse case-insensitively.
///
/// # Example
///
/// ```rust
/// use dimetrics_common::impl_label_conversions;
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// pub enum Unit {
///     Seconds,
///     Bytes,
/// }
///
/// impl_label_conversions!(Unit {
///     Seconds => "seconds",
///     Bytes => "bytes",
/// });
///
/// assert_eq!(Unit::Bytes.to_string(), "bytes");
/// assert_eq!("SECONDS".parse::<Unit>(), Ok(Unit::Seconds));
/// ```
#[macro_export]
macro_rules! impl_label_conversions {
    ($enum_name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        impl $enum_name {
            /// Stable lowercase label for logging and snapshots
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_lowercase().as_str() {
                    $($label => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}
