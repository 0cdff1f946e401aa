//! Coalescing groups that were split more than necessary.

use crate::data::PointSet;
use crate::oracle::SeparationOracle;

use super::split::{apart, Polarity};

/// Greedily merge groups that stay separable from every opposite group.
///
/// Positive groups are merged first, each into the earliest accepted group
/// that still separates from all negative groups. Negative groups are then
/// merged the same way against the simplified positive groups. Group order is
/// preserved; the result does not depend on anything but the inputs.
pub fn simplify_groups<O>(oracle: &O, pos: &[PointSet], neg: &[PointSet]) -> (Vec<PointSet>, Vec<PointSet>)
where
    O: SeparationOracle + ?Sized,
{
    let merged_pos = merge_pass(oracle, Polarity::Positive, pos, neg);
    let merged_neg = merge_pass(oracle, Polarity::Negative, neg, &merged_pos);
    (merged_pos, merged_neg)
}

fn merge_pass<O>(oracle: &O, polarity: Polarity, groups: &[PointSet], opposite: &[PointSet]) -> Vec<PointSet>
where
    O: SeparationOracle + ?Sized,
{
    let mut accepted: Vec<PointSet> = Vec::with_capacity(groups.len());
    for group in groups {
        let target = accepted.iter().position(|m| {
            let candidate = m.union(group);
            opposite.iter().all(|o| apart(oracle, polarity, &candidate, o))
        });
        match target {
            Some(i) => accepted[i] = accepted[i].union(group),
            None => accepted.push(group.clone()),
        }
    }
    accepted
}
