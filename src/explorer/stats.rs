use crate::model::{TagId, TagStat};
use std::collections::HashMap;

pub const TOP_VALUES: usize = 10;

/// One ranked histogram entry, ready for presentation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueShare {
    pub value: String,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankedTagStat {
    pub id: TagId,
    pub name: String,
    pub total: usize,
    pub shares: Vec<ValueShare>,
}

/// Ranks a value histogram by count descending (value ascending on ties for
/// a deterministic order), keeping the top `top` entries. Percentages are
/// rounded to one decimal; an all-zero histogram reports 0.0 throughout.
pub fn rank_values(counts: &HashMap<String, usize>, top: usize) -> Vec<ValueShare> {
    let total: usize = counts.values().sum();

    let mut entries: Vec<(&String, usize)> =
        counts.iter().map(|(value, count)| (value, *count)).collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    entries
        .into_iter()
        .take(top)
        .map(|(value, count)| ValueShare {
            value: value.clone(),
            count,
            percentage: percentage_of(count, total),
        })
        .collect()
}

pub fn summarize(stats: Vec<TagStat>) -> Vec<RankedTagStat> {
    stats
        .into_iter()
        .map(|stat| RankedTagStat {
            id: stat.id,
            name: stat.name,
            total: stat.value_counts.values().sum(),
            shares: rank_values(&stat.value_counts, TOP_VALUES),
        })
        .collect()
}

fn percentage_of(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        (count as f64 / total as f64 * 1000.0).round() / 10.0
    }
}
