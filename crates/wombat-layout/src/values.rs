//! Auto and percentage value types for pre-resolved style inputs.
//!
//! [§ 6 Computed Values](https://www.w3.org/TR/css-cascade-4/#computed)
//!
//! The cascade collaborator resolves lengths to pixels before they reach the
//! flex algorithm; the only value forms that survive into layout are `auto`
//! (whose meaning depends on the property) and percentages of a containing
//! block size that may itself still be unresolved.

use serde::{Deserialize, Serialize};

use crate::geometry::LayoutCoord;

/// [§ 4.4 Automatic values](https://www.w3.org/TR/CSS2/cascade.html#value-def-auto)
///
/// "Some properties can take the keyword 'auto' as a value. This keyword
/// allows the user agent to compute the value based on other properties."
///
/// A value that is either `auto` or a resolved pixel length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AutoOr {
    /// The value is 'auto' and must be resolved during layout.
    Auto,
    /// The value is a resolved length in pixels.
    Px(LayoutCoord),
}

impl Default for AutoOr {
    fn default() -> Self {
        Self::Auto
    }
}

impl AutoOr {
    /// Check if the value is 'auto'.
    #[must_use]
    pub const fn is_auto(&self) -> bool {
        matches!(self, Self::Auto)
    }

    /// Get the pixel value, or a default if 'auto'.
    #[must_use]
    pub const fn px_or(&self, default: LayoutCoord) -> LayoutCoord {
        match self {
            Self::Px(v) => *v,
            Self::Auto => default,
        }
    }
}

/// A size that may be `auto`, a resolved length, or a percentage.
///
/// [§ 7.1 'flex-basis'](https://www.w3.org/TR/css-flexbox-1/#flex-basis-property)
///
/// Percentages resolve against a containing block size that may still be
/// indefinite when the flex base size is computed; an unresolvable
/// percentage behaves as `auto`
/// ([§ 9.2 step 3](https://www.w3.org/TR/css-flexbox-1/#algo-main-item)).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SizeValue {
    /// The size depends on other properties or on content.
    Auto,
    /// A resolved length in pixels.
    Px(LayoutCoord),
    /// A fraction of the containing block size (1.0 = 100%).
    Percent(f32),
}

impl Default for SizeValue {
    fn default() -> Self {
        Self::Auto
    }
}

impl SizeValue {
    /// Check if the value is 'auto'.
    #[must_use]
    pub const fn is_auto(&self) -> bool {
        matches!(self, Self::Auto)
    }

    /// Check if the value is a percentage.
    #[must_use]
    pub const fn is_percent(&self) -> bool {
        matches!(self, Self::Percent(_))
    }

    /// Resolve to pixels against a containing block size.
    ///
    /// Returns `None` for `auto`, and for percentages whose containing block
    /// size is itself indefinite.
    #[must_use]
    pub fn resolve(&self, containing_block: Option<LayoutCoord>) -> Option<LayoutCoord> {
        match *self {
            Self::Auto => None,
            Self::Px(px) => Some(px),
            Self::Percent(fraction) => {
                containing_block.map(|base| (fraction * base as f32) as LayoutCoord)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_resolves_against_definite_base() {
        assert_eq!(SizeValue::Percent(0.5).resolve(Some(200)), Some(100));
    }

    #[test]
    fn percent_unresolvable_against_auto_base() {
        assert_eq!(SizeValue::Percent(0.5).resolve(None), None);
    }

    #[test]
    fn auto_never_resolves() {
        assert_eq!(SizeValue::Auto.resolve(Some(200)), None);
    }
}
