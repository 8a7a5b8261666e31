use crate::packer;
use crate::types::{Bar, Item, Piece, Solution, SolveError, Stats};

/// Safety brake for the greedy loop; pathological demand otherwise keeps
/// opening bars forever.
pub const DEFAULT_MAX_BARS: usize = 5000;

const MAX_COMBO_PIECES: u32 = 50;

pub struct Solver {
    bar_length: u32,
    kerf: u32,
    items: Vec<Item>,
    max_bars: usize,
}

impl Solver {
    pub fn new(bar_length: u32, kerf: u32, items: Vec<Item>) -> Self {
        Self {
            bar_length,
            kerf,
            items,
            max_bars: DEFAULT_MAX_BARS,
        }
    }

    /// Override the committed-bar limit (mainly for tuning and tests).
    pub fn with_max_bars(mut self, max_bars: usize) -> Self {
        self.max_bars = max_bars;
        self
    }

    pub fn solve(&self) -> Solution {
        if self.items.is_empty() {
            return Solution::error(SolveError::EmptyDemand, Vec::new());
        }
        if self.items.iter().any(|it| it.length == 0) {
            return Solution::error(SolveError::InvalidLength, Vec::new());
        }

        let mut inventory: Vec<Piece> = self
            .items
            .iter()
            .map(|it| Piece {
                length: it.length,
                count: it.count,
            })
            .collect();
        // Longest first; this order is also the traversal order for every
        // search below, which makes the whole solve deterministic.
        inventory.sort_by(|a, b| b.length.cmp(&a.length));

        let shortest = inventory.iter().map(|p| p.length).min().unwrap_or(1);
        let max_depth = (self.bar_length / shortest).clamp(1, MAX_COMBO_PIECES) as usize;

        let mut bars: Vec<Bar> = Vec::new();

        while inventory.iter().any(|p| p.count > 0) {
            let best = packer::best_combo(self.bar_length, &mut inventory, self.kerf, max_depth);

            if best.combo.is_empty() {
                return Solution::error(SolveError::InfeasibleRemainder, bars);
            }

            // Commit the winning combo: one permanent decrement per length
            for &length in &best.combo {
                if let Some(piece) = inventory
                    .iter_mut()
                    .find(|p| p.length == length && p.count > 0)
                {
                    piece.count -= 1;
                }
            }

            bars.push(Bar {
                combo: best.combo,
                waste: best.waste,
                cost: best.cost,
            });

            if bars.len() > self.max_bars {
                return Solution::error(SolveError::BarCountExceeded(self.max_bars), bars);
            }
        }

        let stats = compute_stats(self.bar_length, self.kerf, &self.items, &bars);
        Solution::ok(bars, stats)
    }
}

pub fn compute_stats(bar_length: u32, kerf: u32, items: &[Item], bars: &[Bar]) -> Stats {
    let real_bars = bars.len();
    let total_length: u64 = items
        .iter()
        .map(|it| it.length as u64 * it.count as u64)
        .sum();
    let ideal_bars = total_length.div_ceil(bar_length as u64);
    let efficiency = if real_bars > 0 {
        ideal_bars as f64 / real_bars as f64
    } else {
        0.0
    };
    let total_waste: u64 = bars.iter().map(|b| b.waste as u64).sum();

    Stats {
        real_bars,
        ideal_bars,
        efficiency,
        total_length,
        total_waste,
        kerf,
        bar_length,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solve(bar_length: u32, kerf: u32, items: &[(u32, u32)]) -> Solution {
        let items: Vec<Item> = items.iter().map(|&(l, c)| Item::new(l, c)).collect();
        Solver::new(bar_length, kerf, items).solve()
    }

    /// Validates a successful solution:
    /// 1. Every bar's waste matches its combo and the kerf charge
    /// 2. Committed piece counts match the requested counts exactly
    /// 3. Stats are consistent with the bars
    fn assert_solution_valid(sol: &Solution, bar_length: u32, kerf: u32, items: &[(u32, u32)]) {
        assert!(sol.is_ok(), "expected ok, got {:?}", sol.error);
        let stats = sol.stats.expect("ok solution carries stats");

        for (bi, bar) in sol.bars.iter().enumerate() {
            let pieces_len: u32 = bar.combo.iter().sum();
            let cuts = (bar.combo.len() as u32).saturating_sub(1);
            assert_eq!(
                bar.waste,
                bar_length - pieces_len - kerf * cuts,
                "bar {bi} waste does not match its combo"
            );
        }

        for &(length, _) in items {
            let requested: u32 = items
                .iter()
                .filter(|&&(l, _)| l == length)
                .map(|&(_, c)| c)
                .sum();
            let cut = sol
                .bars
                .iter()
                .flat_map(|b| &b.combo)
                .filter(|&&l| l == length)
                .count() as u32;
            assert_eq!(cut, requested, "length {length}: cut {cut}, requested {requested}");
        }

        assert_eq!(stats.real_bars, sol.bars.len());
        assert_eq!(stats.total_waste, sol.total_waste());
        assert!(
            stats.ideal_bars <= stats.real_bars as u64,
            "ideal {} exceeds real {}",
            stats.ideal_bars,
            stats.real_bars
        );
        if stats.real_bars > 0 {
            assert!(stats.efficiency > 0.0 && stats.efficiency <= 1.0);
        } else {
            assert_eq!(stats.efficiency, 0.0);
        }
    }

    #[test]
    fn test_exact_fit_two_pieces() {
        let sol = solve(100, 0, &[(50, 2)]);
        assert_solution_valid(&sol, 100, 0, &[(50, 2)]);
        assert_eq!(sol.bar_count(), 1);
        assert_eq!(sol.bars[0].combo, vec![50, 50]);
        assert_eq!(sol.bars[0].waste, 0);

        let stats = sol.stats.unwrap();
        assert_eq!(stats.real_bars, 1);
        assert_eq!(stats.ideal_bars, 1);
        assert_eq!(stats.efficiency, 1.0);
        assert_eq!(stats.total_waste, 0);
    }

    #[test]
    fn test_one_piece_per_bar() {
        let sol = solve(10, 0, &[(7, 3)]);
        assert_solution_valid(&sol, 10, 0, &[(7, 3)]);
        assert_eq!(sol.bar_count(), 3);
        for bar in &sol.bars {
            assert_eq!(bar.combo, vec![7]);
            assert_eq!(bar.waste, 3);
        }

        let stats = sol.stats.unwrap();
        assert_eq!(stats.ideal_bars, 3);
        assert_eq!(stats.efficiency, 1.0);
        assert_eq!(stats.total_waste, 9);
    }

    #[test]
    fn test_piece_longer_than_bar() {
        let sol = solve(5, 0, &[(10, 1)]);
        assert_eq!(sol.error, Some(SolveError::InfeasibleRemainder));
        assert!(sol.bars.is_empty());
        assert!(sol.stats.is_none());
    }

    #[test]
    fn test_empty_items() {
        let sol = solve(100, 0, &[]);
        assert_eq!(sol.error, Some(SolveError::EmptyDemand));
        assert!(sol.bars.is_empty());
    }

    #[test]
    fn test_zero_length_rejected() {
        let sol = solve(100, 0, &[(0, 3), (50, 1)]);
        assert_eq!(sol.error, Some(SolveError::InvalidLength));
        assert!(sol.bars.is_empty());
    }

    #[test]
    fn test_infeasible_after_progress_keeps_partial_bars() {
        // The 60 gets a bar, then only the oversized 120 remains
        let sol = solve(100, 0, &[(60, 1), (120, 1)]);
        assert_eq!(sol.error, Some(SolveError::InfeasibleRemainder));
        assert_eq!(sol.bar_count(), 1);
        assert_eq!(sol.bars[0].combo, vec![60]);
    }

    #[test]
    fn test_kerf_reduces_capacity() {
        // Without kerf both pieces share one bar
        let sol = solve(100, 0, &[(50, 2)]);
        assert_eq!(sol.bar_count(), 1);

        // With kerf of 5: 50 + 5 + 50 = 105 > 100, needs 2 bars
        let sol = solve(100, 5, &[(50, 2)]);
        assert_solution_valid(&sol, 100, 5, &[(50, 2)]);
        assert_eq!(sol.bar_count(), 2);
    }

    #[test]
    fn test_bar_limit_exceeded() {
        let items = vec![Item::new(50, 10)];
        let sol = Solver::new(100, 0, items).with_max_bars(2).solve();
        assert_eq!(sol.error, Some(SolveError::BarCountExceeded(2)));
        // Bars committed before the brake are preserved
        assert_eq!(sol.bar_count(), 3);
        assert!(sol.stats.is_none());
    }

    #[test]
    fn test_nothing_to_cut_yields_no_bars() {
        let sol = solve(100, 0, &[(50, 0)]);
        assert!(sol.is_ok());
        assert!(sol.bars.is_empty());
        assert_eq!(sol.stats.unwrap().efficiency, 0.0);
    }

    #[test]
    fn test_deterministic() {
        let items = &[(2400, 8), (1200, 14), (900, 11), (800, 5), (450, 9)];
        let first = solve(6000, 3, items);
        let second = solve(6000, 3, items);
        assert_eq!(first, second);
    }

    /// 47 pieces, 5 different lengths, standard 6 m bar, 3 mm kerf.
    #[test]
    fn test_complex_mixed_demand() {
        let items = &[(2400, 8), (1200, 14), (900, 11), (800, 5), (450, 9)];
        let sol = solve(6000, 3, items);
        assert_solution_valid(&sol, 6000, 3, items);
    }

    /// Short bar relative to the demand, so many bars and a tight depth cap.
    #[test]
    fn test_complex_small_bar_many_pieces() {
        let items = &[(450, 12), (300, 17), (250, 9), (120, 21)];
        let sol = solve(1000, 2, items);
        assert_solution_valid(&sol, 1000, 2, items);
        assert!(sol.bar_count() >= 13);
    }

    /// All demand in a single length that divides the bar exactly.
    #[test]
    fn test_complex_exact_multiples() {
        let items = &[(500, 24)];
        let sol = solve(2000, 0, items);
        assert_solution_valid(&sol, 2000, 0, items);
        assert_eq!(sol.bar_count(), 6);
        assert_eq!(sol.stats.unwrap().total_waste, 0);
        for bar in &sol.bars {
            assert_eq!(bar.combo, vec![500, 500, 500, 500]);
        }
    }

    #[test]
    fn test_stats_ideal_bars_rounds_up() {
        let stats = compute_stats(1000, 0, &[Item::new(700, 3)], &[]);
        assert_eq!(stats.total_length, 2100);
        assert_eq!(stats.ideal_bars, 3);
    }
}
