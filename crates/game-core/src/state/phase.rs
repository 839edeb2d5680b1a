use std::fmt;

/// Closed set of game phases.
///
/// The cycle is Waiting -> Night -> Day -> Voting -> Night -> ... -> Ended.
/// `Ended` is terminal. The `Display` forms are part of the wire contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    Waiting,
    Night,
    Day,
    Voting,
    Ended,
}

impl Phase {
    /// Stable wire string for this phase.
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Waiting => "waiting",
            Phase::Night => "night",
            Phase::Day => "day",
            Phase::Voting => "voting",
            Phase::Ended => "ended",
        }
    }

    /// The next phase in the cycle.
    ///
    /// Waiting advances into the first Night at game start; Ended stays
    /// Ended. Timers are never armed for Waiting or Ended, so those arms
    /// only matter for completeness.
    pub fn next(self) -> Phase {
        match self {
            Phase::Waiting => Phase::Night,
            Phase::Night => Phase::Day,
            Phase::Day => Phase::Voting,
            Phase::Voting => Phase::Night,
            Phase::Ended => Phase::Ended,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal outcome of a game. `None` until win conditions are evaluated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Winner {
    None,
    Mafia,
    Village,
}

impl Winner {
    pub fn as_str(self) -> &'static str {
        match self {
            Winner::None => "none",
            Winner::Mafia => "mafia",
            Winner::Village => "village",
        }
    }
}

impl fmt::Display for Winner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
