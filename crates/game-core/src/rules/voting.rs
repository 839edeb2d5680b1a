use std::collections::HashMap;

/// Counts votes per target. The sum of counts equals the number of voters.
pub fn tally_votes(votes: &HashMap<String, String>) -> HashMap<String, usize> {
    let mut tally = HashMap::new();
    for target in votes.values() {
        *tally.entry(target.clone()).or_insert(0) += 1;
    }
    tally
}

/// The player with strictly the most votes, if there is exactly one.
///
/// A tie at the top, or no votes at all, eliminates no one.
pub fn vote_winner(votes: &HashMap<String, String>) -> Option<String> {
    let tally = tally_votes(votes);
    let top = tally.values().copied().max()?;
    let mut leaders = tally
        .into_iter()
        .filter(|(_, count)| *count == top)
        .map(|(target, _)| target);

    let winner = leaders.next()?;
    if leaders.next().is_some() {
        return None; // tie
    }
    Some(winner)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn votes(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(voter, target)| (voter.to_string(), target.to_string()))
            .collect()
    }

    #[test]
    fn tally_counts_every_vote() {
        let votes = votes(&[("a", "x"), ("b", "x"), ("c", "y")]);
        let tally = tally_votes(&votes);
        assert_eq!(tally.get("x"), Some(&2));
        assert_eq!(tally.get("y"), Some(&1));
        assert_eq!(tally.values().sum::<usize>(), votes.len());
    }

    #[test]
    fn unique_maximum_wins() {
        let votes = votes(&[("a", "x"), ("b", "x"), ("c", "y")]);
        assert_eq!(vote_winner(&votes), Some("x".into()));
    }

    #[test]
    fn tie_eliminates_no_one() {
        let votes = votes(&[("a", "x"), ("b", "x"), ("c", "y"), ("d", "y")]);
        assert_eq!(vote_winner(&votes), None);
    }

    #[test]
    fn no_votes_eliminates_no_one() {
        assert_eq!(vote_winner(&HashMap::new()), None);
    }

    #[test]
    fn single_vote_wins() {
        let votes = votes(&[("a", "x")]);
        assert_eq!(vote_winner(&votes), Some("x".into()));
    }
}
