//! Deterministic candidate ranking and selection.

use super::Candidate;

/// Order candidates by size, largest first. Equal sizes keep their listing order.
pub fn rank_candidates(mut candidates: Vec<Candidate>) -> Vec<Candidate> {
    candidates.sort_by(|a, b| b.size.cmp(&a.size));
    candidates
}

/// Pick a candidate from a list ranked by [`rank_candidates`].
///
/// The largest candidate wins unless it is untrusted, in which case the first
/// trusted candidate no more than `tolerance` bytes smaller replaces it.
pub fn select_candidate(ranked: &[Candidate], tolerance: u64) -> Option<&Candidate> {
    let (largest, rest) = ranked.split_first()?;
    if largest.trusted {
        return Some(largest);
    }

    let replacement = rest
        .iter()
        .find(|c| c.trusted && largest.size.saturating_sub(c.size) <= tolerance);
    Some(replacement.unwrap_or(largest))
}
