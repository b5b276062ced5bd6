use super::heroes::Hero;

const FIELD_COUNT: usize = 7;

/// One played game, parsed from a `|`-separated report line.
///
/// Field layout: `meta|player_a|player_b|hero_1|hero_2|_|_`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRecord<'a> {
    pub player_a: &'a str,
    pub player_b: &'a str,
    pub attacker: Hero,
    pub defender: Hero,
    /// True when the first hero field holds an attacker-side hero.
    pub attacker_won: bool,
}

impl<'a> MatchRecord<'a> {
    /// Returns `None` for anything that can't be placed in the matrix:
    /// wrong field count, unknown hero code, or both heroes on one side.
    pub fn parse(line: &'a str) -> Option<Self> {
        let fields: Vec<&str> = line.split('|').collect();
        if fields.len() != FIELD_COUNT {
            return None;
        }

        let first = Hero::from_code(fields[3])?;
        let second = Hero::from_code(fields[4])?;
        if first.side == second.side {
            return None;
        }

        let attacker_won = first.is_attacker();
        let (attacker, defender) = if attacker_won {
            (first, second)
        } else {
            (second, first)
        };

        Some(MatchRecord {
            player_a: fields[1],
            player_b: fields[2],
            attacker,
            defender,
            attacker_won,
        })
    }
}
