use slotmap::new_key_type;
use std::fmt;

/// Dense handle of an atom in a [`World`](super::system::World).
///
/// Atom ids are assigned in creation order starting at zero and are never reused, so the
/// index doubles as the 0-based serial number written to output files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct AtomId(usize);

impl AtomId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }

    /// The 1-based serial used by coordinate and topology files.
    pub fn serial(self) -> usize {
        self.0 + 1
    }
}

impl fmt::Display for AtomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Index of an angle in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AngleId(pub(crate) usize);

new_key_type! {
    pub struct BondId;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serial_is_one_based() {
        assert_eq!(AtomId::new(0).serial(), 1);
        assert_eq!(AtomId::new(41).serial(), 42);
    }

    #[test]
    fn atom_ids_order_by_index() {
        assert!(AtomId::new(3) < AtomId::new(7));
        assert_eq!(AtomId::new(5).index(), 5);
        assert_eq!(format!("{}", AtomId::new(9)), "9");
    }
}
