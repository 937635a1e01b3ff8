use ordered_float::OrderedFloat;
use std::cmp::Reverse;

/// A candidate row with its score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredIndex {
    pub index: usize,
    pub score: f32,
}

/// Highest `k` scores, descending. Equal scores keep ascending index order.
pub fn top_k<I>(scores: I, k: usize) -> Vec<ScoredIndex>
where
    I: IntoIterator<Item = (usize, f32)>,
{
    if k == 0 {
        return Vec::new();
    }

    let mut candidates: Vec<ScoredIndex> = scores
        .into_iter()
        .map(|(index, score)| ScoredIndex { index, score })
        .collect();

    let key = |s: &ScoredIndex| (Reverse(OrderedFloat(s.score)), s.index);

    if candidates.len() > k {
        candidates.select_nth_unstable_by_key(k - 1, key);
        candidates.truncate(k);
    }
    candidates.sort_unstable_by_key(key);
    candidates
}

/// Round to `decimals` places, exact halves to even
#[inline]
pub fn round_score(score: f32, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    let scaled = f64::from(score) * factor;
    let rounded = if scaled.fract().abs() == 0.5 {
        2.0 * (scaled / 2.0).round()
    } else {
        scaled.round()
    };
    rounded / factor
}
