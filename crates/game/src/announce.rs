use core::fmt::{self, Display};
use model::Standing;

/// Everything a session ever says to its channel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Announcement {
    /// A new round has started.
    Question { text: String, points: u32 },
    Hint(String),
    /// Someone voted to skip, but the ballot is not yet full.
    SkipVote { user: String, remaining: usize },
    /// The round was abandoned by vote.
    Skipped { answer: String },
    Correct { user: String, answer: String, score: u64 },
    Standings(Vec<Standing>),
    /// The question source could not supply the next round.
    NoQuestion,
}

fn plural(count: u64) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

impl Display for Announcement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Question { text, points } => {
                write!(f, "**Question** ({points} point{}): {text}", plural((*points).into()))
            }
            Self::Hint(hint) => write!(f, "Hint: `{hint}`"),
            Self::SkipVote { user, remaining } => {
                let remaining = *remaining as u64;
                write!(f, "**{user}** wants to skip. {remaining} more vote{} needed.", plural(remaining))
            }
            Self::Skipped { answer } => write!(f, "Question skipped! The answer was ||{answer}||."),
            Self::Correct { user, answer, score } => write!(
                f,
                "**{user}** got it! The answer was **{answer}**. {user} now has {score} point{}.",
                plural(*score)
            ),
            Self::Standings(standings) if standings.is_empty() => f.write_str("Nobody has scored yet."),
            Self::Standings(standings) => {
                f.write_str("**Scores**")?;
                for (Standing { user, score }, rank) in standings.iter().zip(1..) {
                    write!(f, "\n{rank}. {user}: {score}")?;
                }
                Ok(())
            }
            Self::NoQuestion => f.write_str("No question is available right now. Use `/start` to try again."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Announcement, Standing};

    #[test]
    fn renders_standings_in_rank_order() {
        let standings = Vec::from([
            Standing { user: String::from("alice"), score: 3 },
            Standing { user: String::from("bob"), score: 1 },
        ]);
        assert_eq!(Announcement::Standings(standings).to_string(), "**Scores**\n1. alice: 3\n2. bob: 1");
        assert_eq!(Announcement::Standings(Vec::new()).to_string(), "Nobody has scored yet.");
    }

    #[test]
    fn pluralizes_counts() {
        let vote = Announcement::SkipVote { user: String::from("alice"), remaining: 1 };
        assert_eq!(vote.to_string(), "**alice** wants to skip. 1 more vote needed.");
        let question = Announcement::Question { text: String::from("2 + 2?"), points: 2 };
        assert_eq!(question.to_string(), "**Question** (2 points): 2 + 2?");
    }
}
