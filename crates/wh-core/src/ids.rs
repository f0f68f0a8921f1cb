//! Strongly typed, zero-cost identifier wrappers.
//!
//! All IDs are `Copy + Ord + Hash` so they can be used as map keys and sorted
//! collection elements without ceremony.  The inner integer is `pub` so
//! layout builders and CSV loaders can construct them directly.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid ID" — the inner type's `MAX`.
            pub const INVALID: $name = $name(<$inner>::MAX);

            /// Cast to `usize` for direct use as a `Vec` index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl Default for $name {
            /// Returns the `INVALID` sentinel so uninitialized IDs are visibly invalid.
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$name> for usize {
            #[inline(always)]
            fn from(id: $name) -> usize {
                id.0 as usize
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                <$inner>::try_from(n).map($name)
            }
        }
    };
}

typed_id! {
    /// Index of a cell in the layout's cell table.
    pub struct CellId(u32);
}

typed_id! {
    /// Identifier of a mail-input queue attached to a cell.
    pub struct InputId(u32);
}

typed_id! {
    /// Identifier of a mail output (drop chute) attached to a cell.
    pub struct OutputId(u32);
}

typed_id! {
    /// Identifier of a charging resource attached to a cell.
    pub struct ChargeId(u32);
}

typed_id! {
    /// Index of a logical process (robot) registered with the scheduler.
    pub struct ProcessId(u32);
}

typed_id! {
    /// Monotonic identifier of a scheduler completion event.
    pub struct EventId(u64);
}

typed_id! {
    /// Monotonic identifier of a resource claim.  Never reused within a run.
    pub struct ClaimId(u64);
}

typed_id! {
    /// Index of a capacity-limited scheduler resource.
    pub struct ResourceId(u32);
}

typed_id! {
    /// Index of a scheduler mail store.
    pub struct StoreId(u32);
}

typed_id! {
    /// Identifier of a single piece of mail.
    pub struct MailId(u64);
}
