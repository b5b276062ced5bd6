use std::collections::HashSet;

use tracing::debug;

use super::heroes::HEROES_PER_SIDE;
use super::record::MatchRecord;

/// Wins and games for one attacker/defender pairing, from both perspectives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TallyCell {
    pub attacker_wins: u32,
    pub attacker_games: u32,
    pub defender_wins: u32,
    pub defender_games: u32,
}

impl TallyCell {
    /// Attacker win percentage, or `None` when no attacker games were counted.
    pub fn attacker_percent(&self) -> Option<f64> {
        percent(self.attacker_wins, self.attacker_games)
    }

    pub fn defender_percent(&self) -> Option<f64> {
        percent(self.defender_wins, self.defender_games)
    }
}

fn percent(wins: u32, games: u32) -> Option<f64> {
    if games == 0 {
        None
    } else {
        Some(wins as f64 / games as f64 * 100.0)
    }
}

/// Set of tracked player names. Empty means every record counts.
#[derive(Debug, Clone, Default)]
pub struct PlayerFilter {
    names: HashSet<String>,
}

impl PlayerFilter {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        PlayerFilter {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }
}

/// 11x11 grid indexed `[attacker][defender]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TallyMatrix {
    cells: [[TallyCell; HEROES_PER_SIDE]; HEROES_PER_SIDE],
    records: u32,
}

impl Default for TallyMatrix {
    fn default() -> Self {
        TallyMatrix {
            cells: [[TallyCell::default(); HEROES_PER_SIDE]; HEROES_PER_SIDE],
            records: 0,
        }
    }
}

impl TallyMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cell(&self, attacker: usize, defender: usize) -> &TallyCell {
        &self.cells[attacker][defender]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[TallyCell; HEROES_PER_SIDE]> {
        self.cells.iter()
    }

    /// Number of records that passed the filter and were counted.
    pub fn total_games(&self) -> u32 {
        self.records
    }

    /// Folds one record into the matrix. Returns false if the player
    /// filter rejected it.
    pub fn add_record(&mut self, record: &MatchRecord<'_>, filter: &PlayerFilter) -> bool {
        let cell = &mut self.cells[record.attacker.index][record.defender.index];

        if filter.is_empty() {
            if record.attacker_won {
                cell.attacker_wins += 1;
            } else {
                cell.defender_wins += 1;
            }
            cell.attacker_games += 1;
            cell.defender_games += 1;
            self.records += 1;
            return true;
        }

        // Player A is checked first; a win is only claimed for the tracked side.
        if filter.contains(record.player_a) {
            if record.attacker_won {
                cell.attacker_wins += 1;
                cell.attacker_games += 1;
            } else {
                cell.defender_wins += 1;
                cell.defender_games += 1;
            }
            self.records += 1;
            true
        } else if filter.contains(record.player_b) {
            if record.attacker_won {
                cell.attacker_games += 1;
            } else {
                cell.defender_games += 1;
            }
            self.records += 1;
            true
        } else {
            false
        }
    }
}

/// Builds a fresh tally from raw report lines. Malformed lines are dropped.
pub fn tally<S: AsRef<str>>(lines: &[S], filter: &PlayerFilter) -> TallyMatrix {
    let mut matrix = TallyMatrix::new();
    let mut malformed = 0usize;
    let mut filtered_out = 0usize;

    for line in lines {
        match MatchRecord::parse(line.as_ref()) {
            Some(record) => {
                if !matrix.add_record(&record, filter) {
                    filtered_out += 1;
                }
            }
            None => malformed += 1,
        }
    }

    debug!(
        lines = lines.len(),
        malformed,
        filtered_out,
        tracked_players = filter.len(),
        "tally complete"
    );

    matrix
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn cell(aw: u32, ag: u32, dw: u32, dg: u32) -> TallyCell {
        TallyCell {
            attacker_wins: aw,
            attacker_games: ag,
            defender_wins: dw,
            defender_games: dg,
        }
    }

    #[test]
    fn test_empty_input() {
        let lines: Vec<String> = vec![];
        let matrix = tally(&lines, &PlayerFilter::default());
        assert_eq!(matrix, TallyMatrix::new());
        assert_eq!(matrix.total_games(), 0);
    }

    #[test]
    fn test_unfiltered_attacker_win() {
        let matrix = tally(&["m|Alice|Bob|gs|sb|x|y"], &PlayerFilter::default());
        assert_eq!(*matrix.cell(0, 0), cell(1, 1, 0, 1));
        assert_eq!(matrix.total_games(), 1);
    }

    #[test]
    fn test_unfiltered_attacker_loss_lands_in_transposed_position() {
        // hero_1 = hg (defender 1), hero_2 = wk (attacker 2)
        let matrix = tally(&["m|Alice|Bob|hg|wk|x|y"], &PlayerFilter::default());
        assert_eq!(*matrix.cell(2, 1), cell(0, 1, 1, 1));
        assert_eq!(*matrix.cell(1, 2), TallyCell::default());
    }

    #[test]
    fn test_filtered_player_a_claims_win() {
        let filter = PlayerFilter::new(["Alice"]);
        let matrix = tally(&["m|Alice|Bob|gs|sb|x|y"], &filter);
        assert_eq!(*matrix.cell(0, 0), cell(1, 1, 0, 0));

        let matrix = tally(&["m|Alice|Bob|sb|gs|x|y"], &filter);
        assert_eq!(*matrix.cell(0, 0), cell(0, 0, 1, 1));
    }

    #[test]
    fn test_filtered_player_b_only_counts_games() {
        let filter = PlayerFilter::new(["Bob"]);
        let matrix = tally(&["m|Alice|Bob|gs|sb|x|y"], &filter);
        assert_eq!(*matrix.cell(0, 0), cell(0, 1, 0, 0));

        let matrix = tally(&["m|Alice|Bob|sb|gs|x|y"], &filter);
        assert_eq!(*matrix.cell(0, 0), cell(0, 0, 0, 1));
    }

    #[test]
    fn test_filtered_both_tracked_uses_player_a() {
        let filter = PlayerFilter::new(["Alice", "Bob"]);
        let matrix = tally(&["m|Alice|Bob|gs|sb|x|y"], &filter);
        assert_eq!(*matrix.cell(0, 0), cell(1, 1, 0, 0));
    }

    #[test]
    fn test_filtered_untracked_record_ignored() {
        let filter = PlayerFilter::new(["Carol"]);
        // Name in an unused field does not count either
        let matrix = tally(&["Carol|Alice|Bob|gs|sb|Carol|y"], &filter);
        assert_eq!(matrix, TallyMatrix::new());
    }

    #[test]
    fn test_malformed_lines_contribute_nothing() {
        let lines = [
            "m|Alice|Bob|gs|sb|x",
            "m|Alice|Bob|qq|sb|x|y",
            "m|Alice|Bob|gs|cc|x|y",
            "",
        ];
        let matrix = tally(&lines, &PlayerFilter::default());
        assert_eq!(matrix, TallyMatrix::new());
    }

    #[test]
    fn test_wins_never_exceed_games() {
        let lines = [
            "m|Alice|Bob|gs|sb|x|y",
            "m|Bob|Alice|sb|gs|x|y",
            "m|Carol|Alice|cc|nt|x|y",
            "m|Alice|Carol|nt|cc|x|y",
            "m|Dan|Eve|ro|zm|x|y",
        ];
        for filter in [
            PlayerFilter::default(),
            PlayerFilter::new(["Alice"]),
            PlayerFilter::new(["Carol", "Eve"]),
        ] {
            let matrix = tally(&lines, &filter);
            for c in matrix.rows().flatten() {
                assert!(c.attacker_wins <= c.attacker_games);
                assert!(c.defender_wins <= c.defender_games);
            }
        }
    }

    #[test]
    fn test_cell_percentages() {
        let c = cell(1, 4, 0, 0);
        assert_eq!(c.attacker_percent(), Some(25.0));
        assert_eq!(c.defender_percent(), None);
    }
}
