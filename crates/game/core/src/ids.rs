//! Identifier newtypes and the logical clock.
//!
//! The engine references items, creatures, templates, and skills by opaque
//! numeric identifiers only. Owners of the underlying data (the item store,
//! the template catalog) are external collaborators.

use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        pub struct $name(pub u32);

        impl $name {
            pub const fn new(value: u32) -> Self {
                Self(value)
            }

            pub const fn get(self) -> u32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($label, "#{}"), self.0)
            }
        }

        impl From<u32> for $name {
            fn from(value: u32) -> Self {
                Self(value)
            }
        }
    };
}

define_id!(
    /// Identifier of an item owned by the external item store.
    ItemId,
    "item"
);

define_id!(
    /// Identifier of a creature owned by the [`crate::CreatureRegistry`].
    CreatureId,
    "creature"
);

define_id!(
    /// Identifier of static species data (base roll ranges, growth rates).
    TemplateId,
    "template"
);

define_id!(
    /// Identifier of a learnable skill. Skill content lives outside the engine.
    SkillId,
    "skill"
);

/// Logical timestamp used to order relations.
///
/// The relation index owns a monotonically increasing clock; wall-clock time
/// never enters the engine so replays stay deterministic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Self = Self(0);

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the following tick, saturating at `u64::MAX`.
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_display_with_label() {
        assert_eq!(ItemId(7).to_string(), "item#7");
        assert_eq!(CreatureId(3).to_string(), "creature#3");
    }

    #[test]
    fn tick_next_saturates() {
        assert_eq!(Tick(1).next(), Tick(2));
        assert_eq!(Tick(u64::MAX).next(), Tick(u64::MAX));
    }
}
