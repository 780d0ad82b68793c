//! Pool keys — the closed set of (variant, category) pairs that identify
//! which reusable entity group satisfies a spawn request.

use std::fmt;

use crate::beatmap::{NoteEvent, NoteType};

/// Visual shape of a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Variant {
    /// Omnidirectional note, drawn as a dot.
    Round,
    /// Note with a required cut direction, drawn with an arrow.
    Directional,
}

/// Colour group of a note, or a mine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Red,
    Blue,
    Mine,
}

/// Colour attribute assigned to a spawned entity. Mines have none.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Colour {
    Red,
    Blue,
}

impl Variant {
    fn name(self) -> &'static str {
        match self {
            Variant::Round => "dot",
            Variant::Directional => "arrow",
        }
    }
}

impl Category {
    pub fn colour(self) -> Option<Colour> {
        match self {
            Category::Red => Some(Colour::Red),
            Category::Blue => Some(Colour::Blue),
            Category::Mine => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Category::Red => "red",
            Category::Blue => "blue",
            Category::Mine => "mine",
        }
    }
}

/// Identifies one entity pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PoolKey {
    pub variant: Variant,
    pub category: Category,
}

impl PoolKey {
    /// Number of distinct pools.
    pub const COUNT: usize = 6;

    /// Every key, in [`PoolKey::index`] order.
    pub const ALL: [PoolKey; Self::COUNT] = [
        PoolKey::new(Variant::Round, Category::Red),
        PoolKey::new(Variant::Round, Category::Blue),
        PoolKey::new(Variant::Round, Category::Mine),
        PoolKey::new(Variant::Directional, Category::Red),
        PoolKey::new(Variant::Directional, Category::Blue),
        PoolKey::new(Variant::Directional, Category::Mine),
    ];

    pub const fn new(variant: Variant, category: Category) -> Self {
        Self { variant, category }
    }

    /// Select the pool for a note: cut direction picks the variant, note
    /// type picks the category.
    pub fn for_note(note: &NoteEvent) -> Self {
        let variant = if note.cut_direction.is_omnidirectional() {
            Variant::Round
        } else {
            Variant::Directional
        };
        let category = match note.note_type {
            NoteType::A => Category::Red,
            NoteType::B => Category::Blue,
            NoteType::Mine => Category::Mine,
        };
        Self::new(variant, category)
    }

    /// Dense index in `0..PoolKey::COUNT`, for table-backed pool storage.
    pub fn index(self) -> usize {
        let variant = match self.variant {
            Variant::Round => 0,
            Variant::Directional => 1,
        };
        let category = match self.category {
            Category::Red => 0,
            Category::Blue => 1,
            Category::Mine => 2,
        };
        variant * 3 + category
    }

    /// Stable pool name, e.g. `beat-dot-red` or `beat-mine-arrow`.
    pub fn name(self) -> String {
        match self.category {
            Category::Mine => format!("beat-mine-{}", self.variant.name()),
            category => format!("beat-{}-{}", self.variant.name(), category.name()),
        }
    }

    /// Inverse of [`PoolKey::name`].
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.name() == name)
    }
}

impl fmt::Display for PoolKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::beatmap::{CutDirection, Lane, Layer};

    fn note(cut: CutDirection, note_type: NoteType) -> NoteEvent {
        NoteEvent::new(
            1.0,
            Lane::new(0).unwrap(),
            Layer::new(0).unwrap(),
            cut,
            note_type,
        )
    }

    #[test]
    fn omnidirectional_red_is_round_red() {
        let key = PoolKey::for_note(&note(CutDirection::Any, NoteType::A));
        assert_eq!(key, PoolKey::new(Variant::Round, Category::Red));
        assert_eq!(key.name(), "beat-dot-red");
    }

    #[test]
    fn directional_blue() {
        let key = PoolKey::for_note(&note(CutDirection::Left, NoteType::B));
        assert_eq!(key, PoolKey::new(Variant::Directional, Category::Blue));
        assert_eq!(key.to_string(), "beat-arrow-blue");
    }

    #[test]
    fn mine_has_no_colour_and_keeps_variant() {
        let round = PoolKey::for_note(&note(CutDirection::Any, NoteType::Mine));
        let arrow = PoolKey::for_note(&note(CutDirection::Up, NoteType::Mine));
        assert_eq!(round.variant, Variant::Round);
        assert_eq!(arrow.variant, Variant::Directional);
        assert_eq!(round.category.colour(), None);
        assert_eq!(arrow.name(), "beat-mine-arrow");
    }

    #[test]
    fn index_matches_all_order() {
        for (i, key) in PoolKey::ALL.iter().enumerate() {
            assert_eq!(key.index(), i);
        }
    }

    #[test]
    fn names_are_unique_and_parse_back() {
        for key in PoolKey::ALL {
            assert_eq!(PoolKey::from_name(&key.name()), Some(key));
        }
        assert_eq!(PoolKey::from_name("beat-wall"), None);
    }
}
