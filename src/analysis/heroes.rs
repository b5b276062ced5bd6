/// Number of heroes on each side of the board.
pub const HEROES_PER_SIDE: usize = 11;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Attacker,
    Defender,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hero {
    pub code: &'static str,
    pub side: Side,
    pub index: usize,
}

// Position in each array is the hero's index on its side.
pub const ATTACKER_CODES: [&str; HEROES_PER_SIDE] =
    ["gs", "sf", "wk", "cz", "sp", "ct", "bc", "gk", "nc", "ro", "cc"];
pub const DEFENDER_CODES: [&str; HEROES_PER_SIDE] =
    ["sb", "hg", "sm", "if", "rb", "eb", "bf", "pb", "im", "zm", "nt"];

impl Hero {
    /// Looks up a hero by its two-letter code. Codes are matched exactly.
    pub fn from_code(code: &str) -> Option<Hero> {
        if let Some(index) = ATTACKER_CODES.iter().position(|c| *c == code) {
            return Some(Hero {
                code: ATTACKER_CODES[index],
                side: Side::Attacker,
                index,
            });
        }

        DEFENDER_CODES
            .iter()
            .position(|c| *c == code)
            .map(|index| Hero {
                code: DEFENDER_CODES[index],
                side: Side::Defender,
                index,
            })
    }

    pub fn is_attacker(&self) -> bool {
        self.side == Side::Attacker
    }
}

/// Upper-cased labels for one side, in index order.
pub fn side_labels(side: Side) -> Vec<String> {
    let codes = match side {
        Side::Attacker => &ATTACKER_CODES,
        Side::Defender => &DEFENDER_CODES,
    };
    codes.iter().map(|c| c.to_uppercase()).collect()
}
