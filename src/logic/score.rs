//! Set-by-set score strings such as "6:2, 6:4".

use thiserror::Error;

#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum ScoreError {
    #[error("Score is empty")]
    Empty,
    #[error("Set \"{0}\" is not in the form games:games")]
    MalformedSet(String),
}

/// Games of one set, from slot 1's side.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SetScore {
    pub own: u32,
    pub opponent: u32,
}

/// Sets won by each side of a match.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SetTally {
    pub side_1: u32,
    pub side_2: u32,
}

impl SetTally {
    /// The same tally seen from slot 2.
    pub fn flipped(self) -> Self {
        Self {
            side_1: self.side_2,
            side_2: self.side_1,
        }
    }
}

/// Split on `,` then `:`. Whitespace around numbers is ignored.
pub fn parse_score(score: &str) -> Result<Vec<SetScore>, ScoreError> {
    if score.trim().is_empty() {
        return Err(ScoreError::Empty);
    }
    score
        .split(',')
        .map(|set| {
            let malformed = || ScoreError::MalformedSet(set.trim().to_string());
            let (own, opponent) = set.split_once(':').ok_or_else(malformed)?;
            Ok(SetScore {
                own: own.trim().parse().map_err(|_| malformed())?,
                opponent: opponent.trim().parse().map_err(|_| malformed())?,
            })
        })
        .collect()
}

/// Count sets won per side. A level set counts for neither.
pub fn set_tally(score: &str) -> Result<SetTally, ScoreError> {
    let sets = parse_score(score)?;
    Ok(sets.iter().fold(SetTally::default(), |mut tally, set| {
        if set.own > set.opponent {
            tally.side_1 += 1;
        } else if set.opponent > set.own {
            tally.side_2 += 1;
        }
        tally
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sets_with_spaces() {
        let sets = parse_score("6:2, 4 : 6,7:5").unwrap();
        assert_eq!(sets.len(), 3);
        assert_eq!(sets[1], SetScore { own: 4, opponent: 6 });
    }

    #[test]
    fn tally_counts_sets_not_games() {
        let tally = set_tally("6:0, 5:7, 6:4").unwrap();
        assert_eq!(tally, SetTally { side_1: 2, side_2: 1 });
        assert_eq!(tally.flipped(), SetTally { side_1: 1, side_2: 2 });
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_score("  "), Err(ScoreError::Empty));
        assert!(matches!(parse_score("6-2"), Err(ScoreError::MalformedSet(_))));
        assert!(matches!(parse_score("6:x"), Err(ScoreError::MalformedSet(_))));
    }
}
