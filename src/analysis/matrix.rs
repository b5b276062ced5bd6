use super::heroes::HEROES_PER_SIDE;
use super::tally::{tally, PlayerFilter, TallyCell, TallyMatrix};

/// Size of the rendered view: heroes plus one averages row/column.
pub const VIEW_SIZE: usize = HEROES_PER_SIDE + 1;

/// Attacker ("top") and defender ("bottom") win percentages for one position.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PercentPair {
    pub top: f64,
    pub bottom: f64,
}

/// Running mean that skips undefined values.
#[derive(Debug, Default)]
struct MeanAccumulator {
    top_sum: f64,
    top_count: u32,
    bottom_sum: f64,
    bottom_count: u32,
}

impl MeanAccumulator {
    fn add(&mut self, cell: &TallyCell) {
        if let Some(p) = cell.attacker_percent() {
            self.top_sum += p;
            self.top_count += 1;
        }
        if let Some(p) = cell.defender_percent() {
            self.bottom_sum += p;
            self.bottom_count += 1;
        }
    }

    fn finish(&self) -> PercentPair {
        PercentPair {
            top: mean(self.top_sum, self.top_count),
            bottom: mean(self.bottom_sum, self.bottom_count),
        }
    }
}

fn mean(sum: f64, count: u32) -> f64 {
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Win-rate view derived from a [`TallyMatrix`].
///
/// Positions `(1..=11, 1..=11)` are per-pair rates; `(r, 12)` is the mean
/// of row `r`, `(12, c)` the mean of column `c` and `(12, 12)` the mean
/// over every pair. Means only include pairs with a non-zero denominator.
#[derive(Debug, Clone, PartialEq)]
pub struct PercentageMatrix {
    cells: [[PercentPair; HEROES_PER_SIDE]; HEROES_PER_SIDE],
    row_means: [PercentPair; HEROES_PER_SIDE],
    column_means: [PercentPair; HEROES_PER_SIDE],
    grand_mean: PercentPair,
}

impl PercentageMatrix {
    pub fn from_tally(tally: &TallyMatrix) -> Self {
        let mut cells = [[PercentPair::default(); HEROES_PER_SIDE]; HEROES_PER_SIDE];
        let mut rows: [MeanAccumulator; HEROES_PER_SIDE] = Default::default();
        let mut columns: [MeanAccumulator; HEROES_PER_SIDE] = Default::default();
        let mut grand = MeanAccumulator::default();

        for (r, row) in tally.rows().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                cells[r][c] = PercentPair {
                    top: cell.attacker_percent().unwrap_or(0.0),
                    bottom: cell.defender_percent().unwrap_or(0.0),
                };
                rows[r].add(cell);
                columns[c].add(cell);
                grand.add(cell);
            }
        }

        PercentageMatrix {
            cells,
            row_means: rows.map(|acc| acc.finish()),
            column_means: columns.map(|acc| acc.finish()),
            grand_mean: grand.finish(),
        }
    }

    /// 1-based access to the 12x12 view; `None` outside `1..=12`.
    pub fn get(&self, row: usize, col: usize) -> Option<PercentPair> {
        if !(1..=VIEW_SIZE).contains(&row) || !(1..=VIEW_SIZE).contains(&col) {
            return None;
        }

        let pair = match (row == VIEW_SIZE, col == VIEW_SIZE) {
            (true, true) => self.grand_mean,
            (true, false) => self.column_means[col - 1],
            (false, true) => self.row_means[row - 1],
            (false, false) => self.cells[row - 1][col - 1],
        };
        Some(pair)
    }

    pub fn grand_mean(&self) -> PercentPair {
        self.grand_mean
    }
}

/// Parses, tallies and summarises a batch of report lines. Never fails;
/// with no usable records every value is 0.
pub fn compute_matrix<S: AsRef<str>>(lines: &[S], tracked: &PlayerFilter) -> PercentageMatrix {
    PercentageMatrix::from_tally(&tally(lines, tracked))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_no_records_all_zero() {
        let matrix = compute_matrix(&["garbage", "a|b|c"], &PlayerFilter::default());
        for r in 1..=VIEW_SIZE {
            for c in 1..=VIEW_SIZE {
                assert_eq!(matrix.get(r, c), Some(PercentPair::default()));
            }
        }
    }

    #[test]
    fn test_single_attacker_win() {
        let matrix = compute_matrix(&["m|Alice|Bob|gs|sb|x|y"], &PlayerFilter::default());
        assert_eq!(matrix.get(1, 1), Some(PercentPair { top: 100.0, bottom: 0.0 }));
        // Row, column and grand means only see the one defined pair
        assert_eq!(matrix.get(1, 12), Some(PercentPair { top: 100.0, bottom: 0.0 }));
        assert_eq!(matrix.get(12, 1), Some(PercentPair { top: 100.0, bottom: 0.0 }));
        assert_eq!(matrix.get(12, 12), Some(PercentPair { top: 100.0, bottom: 0.0 }));
        assert_eq!(matrix.get(2, 12), Some(PercentPair::default()));
    }

    #[test]
    fn test_means_skip_empty_pairs() {
        let lines = [
            // gs vs sb: 1 attacker win, 1 loss -> 50% / 50%
            "m|A|B|gs|sb|x|y",
            "m|A|B|sb|gs|x|y",
            // gs vs hg: attacker win -> 100% / 0%
            "m|A|B|gs|hg|x|y",
            // sf vs sb: attacker loss -> 0% / 100%
            "m|A|B|sb|sf|x|y",
        ];
        let matrix = compute_matrix(&lines, &PlayerFilter::default());

        assert_eq!(matrix.get(1, 1), Some(PercentPair { top: 50.0, bottom: 50.0 }));
        assert_eq!(matrix.get(1, 2), Some(PercentPair { top: 100.0, bottom: 0.0 }));
        assert_eq!(matrix.get(2, 1), Some(PercentPair { top: 0.0, bottom: 100.0 }));

        // Row gs: (50 + 100) / 2, (50 + 0) / 2
        assert_eq!(matrix.get(1, 12), Some(PercentPair { top: 75.0, bottom: 25.0 }));
        // Column sb: (50 + 0) / 2, (50 + 100) / 2
        assert_eq!(matrix.get(12, 1), Some(PercentPair { top: 25.0, bottom: 75.0 }));

        let grand = matrix.grand_mean();
        assert!(close(grand.top, 50.0));
        assert!(close(grand.bottom, 50.0));
    }

    #[test]
    fn test_top_and_bottom_means_count_independently() {
        // Alice is player B in the first record, so (gs, sb) only gains an
        // attacker game; the second record defines only the defender side of (sf, hg).
        let filter = PlayerFilter::new(["Alice"]);
        let lines = ["m|Bob|Alice|gs|sb|x|y", "m|Alice|Bob|hg|sf|x|y"];
        let matrix = compute_matrix(&lines, &filter);

        assert_eq!(matrix.get(1, 1), Some(PercentPair { top: 0.0, bottom: 0.0 }));
        assert_eq!(matrix.get(2, 2), Some(PercentPair { top: 0.0, bottom: 100.0 }));
        assert_eq!(matrix.get(12, 12), Some(PercentPair { top: 0.0, bottom: 100.0 }));
    }

    #[test]
    fn test_grand_mean_matches_defined_cells() {
        let lines = [
            "m|A|B|gs|sb|x|y",
            "m|A|B|gs|sb|x|y",
            "m|A|B|sb|gs|x|y",
            "m|A|B|nt|cc|x|y",
            "m|A|B|ro|im|x|y",
        ];
        let tally_matrix = tally(&lines, &PlayerFilter::default());
        let matrix = PercentageMatrix::from_tally(&tally_matrix);

        let defined: Vec<f64> = tally_matrix
            .rows()
            .flatten()
            .filter_map(|c| c.attacker_percent())
            .collect();
        let expected = defined.iter().sum::<f64>() / defined.len() as f64;
        assert!(close(matrix.get(12, 12).unwrap().top, expected));

        let defined: Vec<f64> = tally_matrix
            .rows()
            .flatten()
            .filter_map(|c| c.defender_percent())
            .collect();
        let expected = defined.iter().sum::<f64>() / defined.len() as f64;
        assert!(close(matrix.get(12, 12).unwrap().bottom, expected));
    }

    #[test]
    fn test_get_out_of_range() {
        let matrix = compute_matrix::<&str>(&[], &PlayerFilter::default());
        assert_eq!(matrix.get(0, 1), None);
        assert_eq!(matrix.get(1, 13), None);
        assert!(matrix.get(12, 12).is_some());
    }
}
