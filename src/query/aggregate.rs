use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;

/// One bar of a chart: a category label and the mean of some column over its rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryMean {
    pub label: String,
    pub value: f64,
    /// Number of rows the mean was taken over.
    pub count: usize,
}

/// Running sums per group, kept in the order groups were first seen.
#[derive(Debug, Default)]
pub(crate) struct GroupMeans {
    index: HashMap<String, usize>,
    groups: Vec<(String, f64, usize)>,
}

impl GroupMeans {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, key: &str, value: f64) {
        let slot = match self.index.get(key) {
            Some(&i) => i,
            None => {
                self.groups.push((key.to_string(), 0.0, 0));
                self.index.insert(key.to_string(), self.groups.len() - 1);
                self.groups.len() - 1
            }
        };
        let group = &mut self.groups[slot];
        group.1 += value;
        group.2 += 1;
    }

    /// Finish into per-group means. Groups only exist once a value was added,
    /// so no mean here is taken over zero rows.
    pub fn into_means(self) -> Vec<CategoryMean> {
        self.groups
            .into_iter()
            .map(|(label, sum, count)| CategoryMean {
                label,
                value: sum / count as f64,
                count,
            })
            .collect()
    }
}

/// Mean of a sequence, `None` when it is empty.
pub(crate) fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Descending by value, then ascending by label so equal values have a fixed order.
pub(crate) fn sort_desc_by_value(means: &mut [CategoryMean]) {
    means.sort_by(|a, b| {
        b.value
            .partial_cmp(&a.value)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.label.cmp(&b.label))
    });
}
