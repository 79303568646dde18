//! Strongly typed identifiers and the string interner that produces them.
//!
//! The simulator names every link, agent, and vehicle with an opaque string.
//! Each string is interned once, on first sight, into a dense `u32` id so
//! that registries can be plain `Vec`s indexed by `id.index()`.
//!
//! All IDs are `Copy + Ord + Hash` so they can be used as map keys and sorted
//! collection elements without ceremony.

use std::fmt;

#[cfg(feature = "fx-hash")]
type NameMap<I> = rustc_hash::FxHashMap<String, I>;
#[cfg(not(feature = "fx-hash"))]
type NameMap<I> = std::collections::HashMap<String, I>;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid ID".
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
    /// Index of a traveling agent in the agent registry.
    pub struct AgentId(u32);
}

typed_id! {
    /// Index of a vehicle in the vehicle registry.
    pub struct VehicleId(u32);
}

typed_id! {
    /// Index of a network node.
    pub struct NodeId(u32);
}

typed_id! {
    /// Index of a directed network link.
    pub struct LinkId(u32);
}

typed_id! {
    /// Index of a temperature profile (one per centroid).
    pub struct ProfileId(u32);
}

// ── Interner ──────────────────────────────────────────────────────────────────

/// Bidirectional map between external string names and dense typed ids.
///
/// Ids are handed out sequentially from 0 in first-seen order, which keeps
/// every run over the same input deterministic.
#[derive(Clone, Debug)]
pub struct Interner<I> {
    index: NameMap<I>,
    names: Vec<String>,
}

impl<I> Interner<I>
where
    I: Copy + TryFrom<usize>,
    usize: From<I>,
{
    pub fn new() -> Self {
        Self { index: NameMap::default(), names: Vec::new() }
    }

    /// Look up an existing name without creating it.
    #[inline]
    pub fn get(&self, name: &str) -> Option<I> {
        self.index.get(name).copied()
    }

    /// Return the id for `name`, allocating the next id if it is new.
    ///
    /// The second element is `true` when the name was seen for the first
    /// time, so callers can run their own factory exactly once per key.
    ///
    /// # Panics
    /// Panics if the id space of `I` is exhausted (more than `u32::MAX`
    /// distinct names).
    pub fn intern(&mut self, name: &str) -> (I, bool) {
        if let Some(&id) = self.index.get(name) {
            return (id, false);
        }
        let Ok(id) = I::try_from(self.names.len()) else {
            panic!("interner id space exhausted at {} names", self.names.len());
        };
        self.index.insert(name.to_owned(), id);
        self.names.push(name.to_owned());
        (id, true)
    }

    /// The external name of `id`.
    #[inline]
    pub fn name(&self, id: I) -> &str {
        &self.names[usize::from(id)]
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<I> Default for Interner<I>
where
    I: Copy + TryFrom<usize>,
    usize: From<I>,
{
    fn default() -> Self {
        Self::new()
    }
}

// ── Sequence ──────────────────────────────────────────────────────────────────

/// Monotonic id generator for exported records (e.g. `leg_id`).
///
/// Owned by whichever registry assigns the ids and passed by `&mut` where
/// needed; there is no process-wide counter.
#[derive(Clone, Debug, Default)]
pub struct Sequence {
    next: u64,
}

impl Sequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the next id and advance.
    #[inline]
    pub fn next_id(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// Number of ids handed out so far.
    #[inline]
    pub fn issued(&self) -> u64 {
        self.next
    }
}
