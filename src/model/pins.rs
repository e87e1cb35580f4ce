use super::tag::TagId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Identity-bearing tags pinned on a fresh profile: PatientName, PatientID,
/// PatientBirthDate, PatientSex, AccessionNumber.
pub const DEFAULT_PINS: [TagId; 5] = [
    TagId::new(0x0010, 0x0010),
    TagId::new(0x0010, 0x0020),
    TagId::new(0x0010, 0x0030),
    TagId::new(0x0010, 0x0040),
    TagId::new(0x0008, 0x0050),
];

/// The set of tag identifiers the user has pinned for priority display and
/// cross-folder statistics. Persisted as a JSON array of identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PinSet(BTreeSet<TagId>);

impl Default for PinSet {
    fn default() -> Self {
        Self(DEFAULT_PINS.into_iter().collect())
    }
}

impl PinSet {
    pub fn empty() -> Self {
        Self(BTreeSet::new())
    }

    /// Flips membership of `id`: present becomes absent, absent becomes
    /// present. Returns whether the tag is pinned afterwards.
    pub fn toggle(&mut self, id: TagId) -> bool {
        if self.0.remove(&id) {
            false
        } else {
            self.0.insert(id);
            true
        }
    }

    pub fn contains(&self, id: TagId) -> bool {
        self.0.contains(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = TagId> + '_ {
        self.0.iter().copied()
    }

    pub fn ids(&self) -> Vec<TagId> {
        self.0.iter().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn double_toggle_restores_membership() {
        let mut pins = PinSet::default();
        let before = pins.clone();
        let id = TagId::new(0x0008, 0x0060);

        assert!(pins.toggle(id));
        assert!(pins.contains(id));
        assert!(!pins.toggle(id));
        assert_eq!(pins, before);

        // Same property starting from a pinned tag.
        let pinned = DEFAULT_PINS[0];
        assert!(!pins.toggle(pinned));
        assert!(pins.toggle(pinned));
        assert_eq!(pins, before);
    }

    #[test]
    fn toggle_never_duplicates() {
        let mut pins = PinSet::empty();
        let id = TagId::new(0x0010, 0x0010);
        pins.toggle(id);
        pins.toggle(id);
        pins.toggle(id);
        assert_eq!(pins.len(), 1);
    }

    #[test]
    fn default_pins_identity_tags() {
        let pins = PinSet::default();
        assert_eq!(pins.len(), 5);
        assert!(pins.contains(TagId::new(0x0010, 0x0010)));
        assert!(pins.contains(TagId::new(0x0008, 0x0050)));
    }

    #[test]
    fn serializes_as_identifier_array() {
        let mut pins = PinSet::empty();
        pins.toggle(TagId::new(0x0010, 0x0020));

        let json = serde_json::to_string(&pins).unwrap();
        assert_eq!(json, r#"[{"group":16,"element":32}]"#);

        let back: PinSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pins);
    }
}
