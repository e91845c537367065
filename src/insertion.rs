// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

/// Outcome of inserting into a table
///
/// `R` is a reference to the stored value, `V` the value that was passed in.
#[derive(Debug, Eq, PartialEq)]
pub enum Insertion<R, V> {
    /// The value was stored
    Inserted(R),

    /// A value with the same key is already stored; the table was not changed
    Exists(R),

    /// The table holds its maximum number of keys; the value is handed back
    Full(V),
}

impl<R, V> Insertion<R, V> {
    /// Returns `true` if the value was stored.
    #[must_use]
    pub fn is_inserted(&self) -> bool {
        matches!(self, Self::Inserted(_))
    }

    /// Returns `true` if the table was full.
    #[must_use]
    pub fn is_full(&self) -> bool {
        matches!(self, Self::Full(_))
    }

    /// Returns the stored value the key maps to, if any.
    #[must_use]
    pub fn stored(self) -> Option<R> {
        match self {
            Self::Inserted(r) | Self::Exists(r) => Some(r),
            Self::Full(_) => None,
        }
    }

    /// Splits into the stored value (`None` if full) and whether it was inserted.
    #[must_use]
    pub fn into_parts(self) -> (Option<R>, bool) {
        let inserted = self.is_inserted();
        (self.stored(), inserted)
    }
}
