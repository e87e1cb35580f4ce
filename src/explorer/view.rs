use crate::model::{PinSet, TagRow};
use std::cmp::Reverse;

/// Derives the ordered view over a record's tags: rows passing the filter,
/// pinned rows first, then ascending `(group, element)`. Never mutates the
/// input; returns a fresh sequence.
pub fn derive_view(rows: &[TagRow], pins: &PinSet, filter: &str) -> Vec<TagRow> {
    let needle = filter.trim().to_lowercase();

    let mut view: Vec<TagRow> = rows
        .iter()
        .filter(|row| row_matches(row, &needle))
        .cloned()
        .collect();

    // Stable sort: equal-key rows keep their input order.
    view.sort_by_key(|row| (Reverse(pins.contains(row.id)), row.id.group, row.id.element));
    view
}

/// A row passes when any of name, value, hex group text or hex element text
/// contains the lowercased needle. The empty needle passes everything.
fn row_matches(row: &TagRow, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }

    row.name.to_lowercase().contains(needle)
        || row.value.to_lowercase().contains(needle)
        || row.id.group_hex().contains(needle)
        || row.id.element_hex().contains(needle)
}
