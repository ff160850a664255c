use crate::types::*;
use serde::Serialize;
use std::collections::HashMap;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ScoreEntry {
    pub name: GuesserName,
    pub score: u32,
}

/// Guesses of the current round plus the all-time score tally.
///
/// A (identifier, number) slot is written once per round by whoever tried it
/// first, right or wrong, and is only cleared by [`VoteLedger::reset`].
#[derive(Debug, Clone, Default)]
pub struct VoteLedger {
    votes: HashMap<(MysteryId, usize), GuesserName>,
    /// (guesser, identifier) -> earliest time the guesser may try that bot again
    timeouts: HashMap<(GuesserName, MysteryId), Instant>,
    scores: HashMap<GuesserName, u32>,
    cooldown: Option<Duration>,
}

impl VoteLedger {
    /// `cooldown` of `None` disables per-guesser rate limiting
    pub fn new(cooldown: Option<Duration>) -> Self {
        Self {
            cooldown,
            ..Self::default()
        }
    }

    pub fn record_guess(
        &mut self,
        round: &Round,
        guesser: &str,
        identifier: &str,
        number: usize,
        now: Instant,
    ) -> GuessOutcome {
        let identifier = identifier.to_uppercase();
        self.scores.entry(guesser.to_string()).or_insert(0);

        if !round.is_open() {
            return GuessOutcome::RoundClosed;
        }

        let Some(mystery) = round.mystery(&identifier) else {
            return GuessOutcome::UnknownIdentifier;
        };

        if self.is_guessed(mystery) {
            return GuessOutcome::AlreadyGuessed;
        }

        let timeout_key = (guesser.to_string(), identifier.clone());
        if let Some(until) = self.timeouts.get(&timeout_key) {
            if *until > now {
                return GuessOutcome::RateLimited {
                    remaining: *until - now,
                };
            }
        }

        let vote_key = (identifier, number);
        if self.votes.contains_key(&vote_key) {
            return GuessOutcome::DuplicateVote;
        }
        self.votes.insert(vote_key, guesser.to_string());

        if number == mystery.number {
            *self.scores.entry(guesser.to_string()).or_insert(0) += 1;
            GuessOutcome::Correct {
                mystery: mystery.clone(),
            }
        } else {
            if let Some(cooldown) = self.cooldown {
                self.timeouts.insert(timeout_key, now + cooldown);
            }
            GuessOutcome::Incorrect
        }
    }

    fn is_guessed(&self, mystery: &MysteryBot) -> bool {
        self.votes
            .contains_key(&(mystery.identifier.clone(), mystery.number))
    }

    /// Who found the correct number for this mystery bot, if anyone
    pub fn guessed_by(&self, mystery: &MysteryBot) -> Option<&str> {
        self.votes
            .get(&(mystery.identifier.clone(), mystery.number))
            .map(String::as_str)
    }

    /// True iff every mystery bot of the round has been guessed
    pub fn all_guessed(&self, round: &Round) -> bool {
        round.mysteries.iter().all(|m| self.is_guessed(m))
    }

    /// `None` if nobody tried this number for the bot, else whether it was right
    pub fn vote_status(&self, mystery: &MysteryBot, number: usize) -> Option<bool> {
        self.votes
            .contains_key(&(mystery.identifier.clone(), number))
            .then_some(mystery.number == number)
    }

    /// Forget the round's votes and timeouts; scores persist
    pub fn reset(&mut self) {
        self.votes.clear();
        self.timeouts.clear();
    }

    pub fn score(&self, guesser: &str) -> Option<u32> {
        self.scores.get(guesser).copied()
    }

    /// All guessers by descending score, ties ordered by name
    pub fn scoreboard(&self) -> Vec<ScoreEntry> {
        let mut entries: Vec<ScoreEntry> = self
            .scores
            .iter()
            .map(|(name, score)| ScoreEntry {
                name: name.clone(),
                score: *score,
            })
            .collect();
        entries.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.name.cmp(&b.name)));
        entries
    }

    pub fn vote_count(&self) -> usize {
        self.votes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COOLDOWN: Duration = Duration::from_secs(20);

    /// Open round with A -> 3 (blue) and B -> 7 (orange)
    fn open_round() -> Round {
        Round {
            phase: RoundPhase::Open,
            mysteries: vec![
                MysteryBot {
                    identifier: "A".to_string(),
                    number: 3,
                    actual_name: "Wildfire".to_string(),
                    team: Team::Blue,
                },
                MysteryBot {
                    identifier: "B".to_string(),
                    number: 7,
                    actual_name: "BotimusPrime".to_string(),
                    team: Team::Orange,
                },
            ],
            ..Round::initial()
        }
    }

    #[test]
    fn test_correct_guess_scores_and_occupies_slot() {
        let round = open_round();
        let mut ledger = VoteLedger::new(Some(COOLDOWN));
        let now = Instant::now();

        let outcome = ledger.record_guess(&round, "alice", "A", 3, now);
        assert_eq!(
            outcome,
            GuessOutcome::Correct {
                mystery: round.mysteries[0].clone()
            }
        );
        assert_eq!(ledger.score("alice"), Some(1));
        assert_eq!(ledger.guessed_by(&round.mysteries[0]), Some("alice"));

        // Same pair again: bot is already guessed
        assert_eq!(
            ledger.record_guess(&round, "bob", "A", 3, now),
            GuessOutcome::AlreadyGuessed
        );
        // Different number for a guessed bot
        assert_eq!(
            ledger.record_guess(&round, "bob", "a", 5, now),
            GuessOutcome::AlreadyGuessed
        );
    }

    #[test]
    fn test_slots_are_independent_per_identifier() {
        let round = open_round();
        let mut ledger = VoteLedger::new(Some(COOLDOWN));
        let now = Instant::now();

        ledger.record_guess(&round, "alice", "A", 3, now);
        // (B, 3) is a different slot from (A, 3)
        assert_eq!(
            ledger.record_guess(&round, "alice", "B", 3, now),
            GuessOutcome::Incorrect
        );
    }

    #[test]
    fn test_wrong_guess_rate_limits_guesser() {
        let round = open_round();
        let mut ledger = VoteLedger::new(Some(COOLDOWN));
        let now = Instant::now();

        assert_eq!(
            ledger.record_guess(&round, "alice", "B", 1, now),
            GuessOutcome::Incorrect
        );
        assert_eq!(ledger.score("alice"), Some(0));

        // Any number for B is rate limited within the window
        match ledger.record_guess(&round, "alice", "B", 2, now + Duration::from_secs(5)) {
            GuessOutcome::RateLimited { remaining } => {
                assert_eq!(remaining, Duration::from_secs(15))
            }
            other => panic!("Expected RateLimited, got {:?}", other),
        }

        // Other bots are not affected
        assert_eq!(
            ledger.record_guess(&round, "alice", "A", 1, now),
            GuessOutcome::Incorrect
        );

        // Passes the check once the window elapsed
        assert_eq!(
            ledger.record_guess(&round, "alice", "B", 2, now + COOLDOWN),
            GuessOutcome::Incorrect
        );
    }

    #[test]
    fn test_wrong_slot_is_permanent_for_everyone() {
        let round = open_round();
        let mut ledger = VoteLedger::new(Some(COOLDOWN));
        let now = Instant::now();

        ledger.record_guess(&round, "alice", "B", 1, now);
        assert_eq!(
            ledger.record_guess(&round, "bob", "B", 1, now),
            GuessOutcome::DuplicateVote
        );
        // The first guesser hits the cooldown first, then the occupied slot
        assert!(matches!(
            ledger.record_guess(&round, "alice", "B", 1, now),
            GuessOutcome::RateLimited { .. }
        ));
        assert_eq!(
            ledger.record_guess(&round, "alice", "B", 1, now + COOLDOWN),
            GuessOutcome::DuplicateVote
        );
    }

    #[test]
    fn test_no_cooldown_configuration() {
        let round = open_round();
        let mut ledger = VoteLedger::new(None);
        let now = Instant::now();

        ledger.record_guess(&round, "alice", "B", 1, now);
        assert_eq!(
            ledger.record_guess(&round, "alice", "B", 2, now),
            GuessOutcome::Incorrect
        );
    }

    #[test]
    fn test_precondition_order() {
        let mut round = open_round();
        let mut ledger = VoteLedger::new(Some(COOLDOWN));
        let now = Instant::now();

        assert_eq!(
            ledger.record_guess(&round, "alice", "Z", 1, now),
            GuessOutcome::UnknownIdentifier
        );

        round.phase = RoundPhase::Closed;
        // Closed round wins over unknown identifier
        assert_eq!(
            ledger.record_guess(&round, "alice", "Z", 1, now),
            GuessOutcome::RoundClosed
        );
        assert_eq!(
            ledger.record_guess(&round, "alice", "A", 3, now),
            GuessOutcome::RoundClosed
        );
        assert_eq!(ledger.vote_count(), 0);
        // Rejected guessers still appear on the scoreboard
        assert_eq!(ledger.score("alice"), Some(0));
    }

    #[test]
    fn test_all_guessed_and_vote_status() {
        let round = open_round();
        let mut ledger = VoteLedger::new(Some(COOLDOWN));
        let now = Instant::now();

        assert!(!ledger.all_guessed(&round));
        ledger.record_guess(&round, "alice", "A", 3, now);
        ledger.record_guess(&round, "bob", "B", 1, now);
        assert!(!ledger.all_guessed(&round));

        assert_eq!(ledger.vote_status(&round.mysteries[0], 3), Some(true));
        assert_eq!(ledger.vote_status(&round.mysteries[1], 1), Some(false));
        assert_eq!(ledger.vote_status(&round.mysteries[1], 7), None);

        ledger.record_guess(&round, "carol", "B", 7, now);
        assert!(ledger.all_guessed(&round));
    }

    #[test]
    fn test_reset_keeps_scores() {
        let round = open_round();
        let mut ledger = VoteLedger::new(Some(COOLDOWN));
        let now = Instant::now();

        ledger.record_guess(&round, "alice", "A", 3, now);
        ledger.record_guess(&round, "alice", "B", 1, now);
        ledger.reset();

        assert_eq!(ledger.vote_count(), 0);
        assert_eq!(ledger.score("alice"), Some(1));
        // Timeout cleared along with the votes
        assert_eq!(
            ledger.record_guess(&round, "alice", "B", 7, now),
            GuessOutcome::Correct {
                mystery: round.mysteries[1].clone()
            }
        );
        assert_eq!(ledger.score("alice"), Some(2));
    }

    #[test]
    fn test_scoreboard_sorted_descending() {
        let round = open_round();
        let mut ledger = VoteLedger::new(None);
        let now = Instant::now();

        ledger.record_guess(&round, "zed", "A", 1, now);
        ledger.record_guess(&round, "bob", "A", 3, now);
        ledger.record_guess(&round, "amy", "B", 7, now);

        let board = ledger.scoreboard();
        let scores: Vec<u32> = board.iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![1, 1, 0]);
        assert_eq!(board[0].name, "amy");
        assert_eq!(board[1].name, "bob");
        assert_eq!(board[2].name, "zed");
    }
}
