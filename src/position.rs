use core::fmt;

/// The address of an item: a section index plus an offset inside that section.
///
/// Positions are ordered section-major: `(0, 9) < (1, 0)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub section: usize,
    pub offset: usize,
}

impl Position {
    pub const fn new(section: usize, offset: usize) -> Self {
        Self { section, offset }
    }
}

impl From<(usize, usize)> for Position {
    fn from((section, offset): (usize, usize)) -> Self {
        Self::new(section, offset)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.section, self.offset)
    }
}

/// Sorts positions deepest-first: highest section first, then highest offset.
///
/// Removing items in this order never invalidates a position that is still waiting to be
/// processed, since a removal only shifts offsets that come after it.
pub fn sort_descending(positions: &mut [Position]) {
    positions.sort_by(|a, b| b.cmp(a));
}

/// Sorts positions in storage order.
pub fn sort_ascending(positions: &mut [Position]) {
    positions.sort();
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;
    use alloc::vec;
    use alloc::vec::Vec;

    fn p(section: usize, offset: usize) -> Position {
        Position::new(section, offset)
    }

    #[test]
    fn descending_within_one_section() {
        let mut v = vec![p(0, 0), p(0, 5), p(0, 3)];
        sort_descending(&mut v);
        assert_eq!(v, vec![p(0, 5), p(0, 3), p(0, 0)]);
    }

    #[test]
    fn descending_section_key_dominates() {
        let mut v = vec![p(0, 0), p(0, 3), p(2, 3), p(2, 2), p(1, 1)];
        sort_descending(&mut v);
        assert_eq!(v, vec![p(2, 3), p(2, 2), p(1, 1), p(0, 3), p(0, 0)]);
    }

    #[test]
    fn empty_input_stays_empty() {
        let mut v: Vec<Position> = Vec::new();
        sort_descending(&mut v);
        assert!(v.is_empty());
    }

    #[test]
    fn duplicates_end_up_adjacent() {
        let mut v = vec![p(1, 2), p(0, 1), p(1, 2)];
        sort_descending(&mut v);
        assert_eq!(v, vec![p(1, 2), p(1, 2), p(0, 1)]);
        sort_ascending(&mut v);
        assert_eq!(v, vec![p(0, 1), p(1, 2), p(1, 2)]);
    }

    #[test]
    fn tuples_convert_and_display_section_first() {
        let at = Position::from((2, 7));
        assert_eq!(at, p(2, 7));
        assert_eq!(format!("{at}"), "(2, 7)");
        assert!(p(0, 9) < p(1, 0));
    }
}
