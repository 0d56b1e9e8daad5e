//! Points and ranks inside one scoring group.

use std::ops::Range;

use rust_decimal::Decimal;

use super::comparator::PerformanceKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub points: Decimal,
    pub rank: i32,
}

/// Maximal runs of equal neighbours in an already sorted slice.
pub fn tie_blocks<K: PartialEq>(sorted: &[K]) -> Vec<Range<usize>> {
    let mut blocks = Vec::new();
    let mut start = 0;

    for i in 1..=sorted.len() {
        if i == sorted.len() || sorted[i] != sorted[start] {
            if start < i {
                blocks.push(start..i);
            }
            start = i;
        }
    }

    blocks
}

/// Places one scoring group of an event. The result is index-aligned with `keys`.
///
/// Positions run from 1 (best) to N, position `p` is worth `N - p + 1` points,
/// and a tie block shares the average of the positions it covers along with
/// the best rank among them. No-score entries sit outside every block with
/// zero points and rank N.
pub fn place_group(keys: &[PerformanceKey]) -> Vec<Placement> {
    let n = keys.len();
    let mut by_performance: Vec<usize> = (0..n).collect();
    by_performance.sort_by(|&a, &b| keys[a].cmp(&keys[b]).then(a.cmp(&b)));

    let scored = by_performance
        .iter()
        .take_while(|&&i| keys[i].is_scored())
        .count();
    let sorted_keys: Vec<PerformanceKey> = by_performance[..scored].iter().map(|&i| keys[i]).collect();

    let mut placements = vec![
        Placement {
            points: Decimal::ZERO,
            rank: n as i32,
        };
        n
    ];

    for block in tie_blocks(&sorted_keys) {
        let covered: i64 = (block.start + 1..=block.end)
            .map(|position| (n - position + 1) as i64)
            .sum();
        let placement = Placement {
            points: (Decimal::from(covered) / Decimal::from(block.len() as i64)).normalize(),
            rank: (block.start + 1) as i32,
        };

        for &index in &by_performance[block] {
            placements[index] = placement;
        }
    }

    placements
}

/// Overall positional ranks from point totals, highest total first. Ties share
/// the best rank of their block. Index-aligned with `totals`.
pub fn rank_totals(totals: &[Decimal]) -> Vec<i32> {
    let mut by_total: Vec<usize> = (0..totals.len()).collect();
    by_total.sort_by(|&a, &b| totals[b].cmp(&totals[a]).then(a.cmp(&b)));

    let sorted: Vec<Decimal> = by_total.iter().map(|&i| totals[i]).collect();
    let mut ranks = vec![0; totals.len()];

    for block in tie_blocks(&sorted) {
        let rank = (block.start + 1) as i32;
        for &index in &by_total[block] {
            ranks[index] = rank;
        }
    }

    ranks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EventKind;
    use crate::services::comparator::performance_key;

    fn keys(kind: EventKind, values: &[&str]) -> Vec<PerformanceKey> {
        values.iter().map(|v| performance_key(kind, v)).collect()
    }

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_tie_blocks() {
        assert_eq!(tie_blocks::<i32>(&[]), Vec::<Range<usize>>::new());
        assert_eq!(tie_blocks(&[1, 1, 2, 3, 3, 3]), vec![0..2, 2..3, 3..6]);
        assert_eq!(tie_blocks(&[7]), vec![0..1]);
    }

    #[test]
    fn test_reps_group_with_tie_and_zero() {
        let placements = place_group(&keys(EventKind::Reps, &["10", "10", "8", "6", "0"]));

        let points: Vec<Decimal> = placements.iter().map(|p| p.points).collect();
        let ranks: Vec<i32> = placements.iter().map(|p| p.rank).collect();

        assert_eq!(points, vec![dec("4.5"), dec("4.5"), dec("3"), dec("2"), dec("0")]);
        assert_eq!(ranks, vec![1, 1, 3, 4, 5]);
    }

    #[test]
    fn test_placement_is_input_order_independent() {
        let placements = place_group(&keys(EventKind::Reps, &["6", "0", "10", "8", "10"]));
        assert_eq!(placements[0], Placement { points: dec("2"), rank: 4 });
        assert_eq!(placements[1], Placement { points: dec("0"), rank: 5 });
        assert_eq!(placements[2], Placement { points: dec("4.5"), rank: 1 });
        assert_eq!(placements[4], placements[2]);
    }

    #[test]
    fn test_time_group_implements_first() {
        let placements = place_group(&keys(EventKind::Time, &["1+00:01:20", "2+00:01:30"]));
        assert_eq!(placements[1], Placement { points: dec("2"), rank: 1 });
        assert_eq!(placements[0], Placement { points: dec("1"), rank: 2 });
    }

    #[test]
    fn test_no_scores_never_tie_with_each_other() {
        let placements = place_group(&keys(EventKind::Distance, &["", "0", "abc", "15"]));
        assert_eq!(placements[3], Placement { points: dec("4"), rank: 1 });
        for placement in &placements[..3] {
            assert_eq!(*placement, Placement { points: Decimal::ZERO, rank: 4 });
        }
    }

    #[test]
    fn test_rank_sum_invariant_holds_for_every_tie_shape() {
        let shapes: &[&[&str]] = &[
            &["5"],
            &["5", "5"],
            &["9", "8", "7", "6"],
            &["3", "3", "3", "1", "1"],
            &["4", "4", "4", "4", "4", "4", "4"],
            &["10", "9", "9", "9", "2", "2", "1"],
        ];

        for values in shapes {
            let n = values.len() as i64;
            let group = keys(EventKind::Max, values);
            let placements = place_group(&group);

            let total: Decimal = placements.iter().map(|p| p.points).sum();
            assert_eq!(total, Decimal::from(n * (n + 1) / 2), "shape {:?}", values);

            for (i, a) in group.iter().enumerate() {
                for (j, b) in group.iter().enumerate() {
                    if a == b {
                        assert_eq!(placements[i], placements[j], "shape {:?}", values);
                    }
                }
            }
        }
    }

    #[test]
    fn test_placing_twice_is_stable() {
        let group = keys(EventKind::Height, &["2.1", "2.3", "2.1", "", "1.9"]);
        assert_eq!(place_group(&group), place_group(&group));
    }

    #[test]
    fn test_totals_across_two_events_keep_half_points() {
        // Event one: a and b tie for first in a group of three.
        let first = place_group(&keys(EventKind::Reps, &["12", "12", "9"]));
        // Event two: b wins outright, a and c tie behind.
        let second = place_group(&keys(EventKind::Time, &["1+00:00:50", "2+00:01:10", "1+00:00:50"]));

        let totals: Vec<Decimal> = (0..3).map(|i| first[i].points + second[i].points).collect();
        assert_eq!(totals, vec![dec("4"), dec("5.5"), dec("2.5")]);
        assert_eq!(rank_totals(&totals), vec![2, 1, 3]);
    }

    #[test]
    fn test_rank_totals_ties_share_best_rank() {
        let totals = vec![dec("7.5"), dec("9"), dec("7.5"), dec("3"), dec("0")];
        assert_eq!(rank_totals(&totals), vec![2, 1, 2, 4, 5]);
    }
}
