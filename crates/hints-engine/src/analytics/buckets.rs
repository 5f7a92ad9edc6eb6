//! Fixed engagement histograms.

use serde::{Deserialize, Serialize};

/// Upper bounds (inclusive) and labels for like-count bins; the last bin is open.
const LIKE_BINS: [(u64, &str); 3] = [(100, "0-100"), (1_000, "101-1k"), (10_000, "1k-10k")];
const LIKE_OVERFLOW: &str = "10k+";

const COMMENT_BINS: [(u64, &str); 3] = [(10, "0-10"), (100, "11-100"), (1_000, "101-1k")];
const COMMENT_OVERFLOW: &str = "1k+";

/// One histogram bin, serialized as `{ "range": "0-100", "count": 3 }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    pub range: String,
    pub count: usize,
}

pub(crate) fn like_buckets(values: impl Iterator<Item = u64>) -> Vec<Bucket> {
    histogram(values, &LIKE_BINS, LIKE_OVERFLOW)
}

pub(crate) fn comment_buckets(values: impl Iterator<Item = u64>) -> Vec<Bucket> {
    histogram(values, &COMMENT_BINS, COMMENT_OVERFLOW)
}

fn histogram(values: impl Iterator<Item = u64>, bins: &[(u64, &str)], overflow: &str) -> Vec<Bucket> {
    let mut counts = vec![0usize; bins.len() + 1];
    for value in values {
        let idx = bins
            .iter()
            .position(|&(upper, _)| value <= upper)
            .unwrap_or(bins.len());
        counts[idx] += 1;
    }

    bins.iter()
        .map(|&(_, label)| label)
        .chain(std::iter::once(overflow))
        .zip(counts)
        .map(|(label, count)| Bucket {
            range: label.to_string(),
            count,
        })
        .collect()
}
