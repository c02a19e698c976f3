//! Cohort selection
//!
//! A cohort is the set of perspectives one corroboration attempt runs on.
//! The pool is interleaved across RIRs before being chunked so the first
//! cohort always spans as many registries as its size allows; later cohorts
//! are used for retries.

use super::entities::{Perspective, Rir};
use std::collections::BTreeMap;

/// Split `pool` into cohorts of exactly `size` perspectives
///
/// Every cohort is ordered by perspective code. The last cohort is topped
/// up from the front of the interleaved order when the pool does not divide
/// evenly. Returns an empty list when `size` is zero or larger than the pool.
///
/// # Example
///
/// ```
/// use mpic_domain::perspective::{build_cohorts, Perspective, Rir};
///
/// let pool = vec![
///     Perspective::new("us-east-1", Rir::Arin),
///     Perspective::new("us-west-2", Rir::Arin),
///     Perspective::new("eu-west-1", Rir::Ripe),
///     Perspective::new("ap-south-1", Rir::Apnic),
/// ];
/// let cohorts = build_cohorts(&pool, 3);
/// assert_eq!(cohorts.len(), 2);
/// assert_eq!(cohorts[0].len(), 3);
/// ```
pub fn build_cohorts(pool: &[Perspective], size: usize) -> Vec<Vec<Perspective>> {
    if size == 0 || size > pool.len() {
        return Vec::new();
    }

    let ordering = interleave_by_rir(pool);
    let mut cohorts: Vec<Vec<Perspective>> = ordering
        .chunks(size)
        .map(|chunk| chunk.to_vec())
        .collect();

    if let Some(last) = cohorts.last_mut()
        && last.len() < size
    {
        for candidate in &ordering {
            if last.len() == size {
                break;
            }
            if !last.iter().any(|p| p.code == candidate.code) {
                last.push(candidate.clone());
            }
        }
    }

    for cohort in &mut cohorts {
        cohort.sort_by(|a, b| a.code.cmp(&b.code));
    }
    cohorts
}

/// Round-robin across RIR groups, each group ordered by code
fn interleave_by_rir(pool: &[Perspective]) -> Vec<Perspective> {
    let mut groups: BTreeMap<Rir, Vec<&Perspective>> = BTreeMap::new();
    for perspective in pool {
        groups.entry(perspective.rir).or_default().push(perspective);
    }
    for group in groups.values_mut() {
        group.sort_by(|a, b| a.code.cmp(&b.code));
        group.dedup_by(|a, b| a.code == b.code);
    }

    let longest = groups.values().map(Vec::len).max().unwrap_or(0);
    let mut ordering = Vec::with_capacity(pool.len());
    for round in 0..longest {
        for group in groups.values() {
            if let Some(perspective) = group.get(round) {
                ordering.push((*perspective).clone());
            }
        }
    }
    ordering
}

/// Number of distinct RIRs in a set of perspectives
pub fn rir_count(perspectives: &[Perspective]) -> usize {
    let mut rirs: Vec<Rir> = perspectives.iter().map(|p| p.rir).collect();
    rirs.sort();
    rirs.dedup();
    rirs.len()
}
