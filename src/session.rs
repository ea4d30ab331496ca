use serde::Serialize;

use crate::accuracy::{self, AccuracyPolicy, Tally};
use crate::error::ConfigurationError;

#[derive(Clone, Debug, Copy, PartialEq, Eq, Serialize)]
pub enum Outcome {
    Correct,
    Incorrect,
}

/// One typed character and whether it matched at the time it was typed
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Keystroke {
    pub char: char,
    pub outcome: Outcome,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Active,
    Complete,
}

/// What a single call to [`TypingSession::handle_keystroke`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    /// Not a single character, or the session had already finished.
    Ignored,
    Advanced { outcome: Outcome },
    WordCompleted { outcome: Outcome, next_word: usize },
    SessionCompleted { outcome: Outcome },
}

impl Transition {
    pub fn outcome(&self) -> Option<Outcome> {
        match *self {
            Transition::Ignored => None,
            Transition::Advanced { outcome }
            | Transition::WordCompleted { outcome, .. }
            | Transition::SessionCompleted { outcome } => Some(outcome),
        }
    }
}

/// Point-in-time view of a session handed to the presentation layer
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Snapshot {
    pub words: Vec<String>,
    pub current_word_index: usize,
    pub current_letter_index: usize,
    pub typed_characters: Vec<Keystroke>,
    pub accuracy_percent: f64,
    pub is_complete: bool,
    pub total_keystrokes: usize,
    pub correct_keystrokes: usize,
}

/// A run over a fixed word list, fed one keystroke at a time.
#[derive(Debug, Clone)]
pub struct TypingSession {
    words: Vec<String>,
    letters: Vec<Vec<char>>,
    policy: AccuracyPolicy,
    word_index: usize,
    letter_index: usize,
    log: Vec<Keystroke>,
    accuracy: f64,
    tally: Tally,
    complete: bool,
}

impl TypingSession {
    pub fn new<I, S>(words: I, policy: AccuracyPolicy) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let words: Vec<String> = words.into_iter().map(Into::into).collect();
        if words.is_empty() {
            return Err(ConfigurationError::EmptyWordList);
        }
        if let Some(index) = words.iter().position(|w| w.is_empty()) {
            return Err(ConfigurationError::EmptyWord { index });
        }

        let letters = words.iter().map(|w| w.chars().collect()).collect();
        tracing::debug!(words = words.len(), %policy, "session created");

        Ok(Self {
            words,
            letters,
            policy,
            word_index: 0,
            letter_index: 0,
            log: Vec::new(),
            accuracy: 100.0,
            tally: Tally::default(),
            complete: false,
        })
    }

    pub fn from_words<I, S>(words: I) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(words, AccuracyPolicy::default())
    }

    /// Start over on the same word list.
    pub fn reset(&mut self) {
        self.word_index = 0;
        self.letter_index = 0;
        self.log.clear();
        self.accuracy = 100.0;
        self.tally = Tally::default();
        self.complete = false;
        tracing::debug!("session reset");
    }

    pub fn handle_keystroke(&mut self, input: &str) -> Transition {
        if self.complete {
            tracing::trace!(input, "session complete, keystroke dropped");
            return Transition::Ignored;
        }

        let mut chars = input.chars();
        let c = match (chars.next(), chars.next()) {
            (Some(c), None) => c,
            _ => {
                tracing::trace!(input, "not a character key, dropped");
                return Transition::Ignored;
            }
        };

        let expected = self.expected_char();
        let outcome = if c == expected {
            Outcome::Correct
        } else {
            Outcome::Incorrect
        };

        // Accuracy reads the log as it was before this keystroke landed,
        // even when the keystroke finishes the word and clears it.
        let pre_log = self.log.clone();
        self.log.push(Keystroke { char: c, outcome });
        self.tally.record(outcome);

        let word_len = self.letters[self.word_index].len();
        let transition = if self.letter_index + 1 == word_len {
            if self.word_index + 1 < self.letters.len() {
                self.word_index += 1;
                self.letter_index = 0;
                self.log.clear();
                Transition::WordCompleted {
                    outcome,
                    next_word: self.word_index,
                }
            } else {
                self.complete = true;
                Transition::SessionCompleted { outcome }
            }
        } else {
            self.letter_index += 1;
            Transition::Advanced { outcome }
        };

        self.accuracy = accuracy::apply(self.policy, &pre_log, outcome, &self.tally);

        tracing::trace!(
            input = %c,
            %expected,
            ?outcome,
            word = self.word_index,
            letter = self.letter_index,
            accuracy = self.accuracy,
            "keystroke"
        );
        if let Transition::SessionCompleted { .. } = transition {
            tracing::info!(
                accuracy = self.accuracy,
                correct = self.tally.correct,
                total = self.tally.total,
                "session complete"
            );
        }

        transition
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            words: self.words.clone(),
            current_word_index: self.word_index,
            current_letter_index: self.letter_index,
            typed_characters: self.log.clone(),
            accuracy_percent: self.accuracy,
            is_complete: self.complete,
            total_keystrokes: self.tally.total,
            correct_keystrokes: self.tally.correct,
        }
    }

    pub fn state(&self) -> SessionState {
        if self.complete {
            SessionState::Complete
        } else {
            SessionState::Active
        }
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn current_word(&self) -> &str {
        &self.words[self.word_index]
    }

    pub fn expected_char(&self) -> char {
        self.letters[self.word_index][self.letter_index]
    }

    pub fn accuracy(&self) -> f64 {
        self.accuracy
    }

    pub fn policy(&self) -> AccuracyPolicy {
        self.policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn session(words: &[&str]) -> TypingSession {
        TypingSession::from_words(words.iter().copied()).unwrap()
    }

    fn type_all(s: &mut TypingSession, keys: &[&str]) {
        for k in keys {
            s.handle_keystroke(k);
        }
    }

    #[test]
    fn test_new_initial_state() {
        let s = session(&["hello", "world"]);
        let snap = s.snapshot();

        assert_eq!(snap.words, vec!["hello", "world"]);
        assert_eq!(snap.current_word_index, 0);
        assert_eq!(snap.current_letter_index, 0);
        assert!(snap.typed_characters.is_empty());
        assert_eq!(snap.accuracy_percent, 100.0);
        assert!(!snap.is_complete);
        assert_eq!(s.state(), SessionState::Active);
        assert_eq!(s.expected_char(), 'h');
        assert_eq!(s.policy(), AccuracyPolicy::PerWord);
    }

    #[test]
    fn test_new_rejects_empty_list() {
        let err = TypingSession::from_words(Vec::<String>::new()).unwrap_err();
        assert_eq!(err, ConfigurationError::EmptyWordList);
    }

    #[test]
    fn test_new_rejects_empty_word() {
        let err = TypingSession::from_words(["ok", "", "no"]).unwrap_err();
        assert_eq!(err, ConfigurationError::EmptyWord { index: 1 });
    }

    #[test]
    fn test_single_word_all_correct() {
        let mut s = session(&["hi"]);

        assert_matches!(
            s.handle_keystroke("h"),
            Transition::Advanced {
                outcome: Outcome::Correct
            }
        );
        assert_eq!(s.snapshot().current_letter_index, 1);
        assert_eq!(s.accuracy(), 100.0);

        assert_matches!(
            s.handle_keystroke("i"),
            Transition::SessionCompleted {
                outcome: Outcome::Correct
            }
        );
        assert!(s.is_complete());
        assert_eq!(s.state(), SessionState::Complete);
        assert_eq!(s.accuracy(), 100.0);
    }

    #[test]
    fn test_wrong_then_right_halves_accuracy() {
        let mut s = session(&["hi"]);

        s.handle_keystroke("x");
        let snap = s.snapshot();
        assert_eq!(snap.current_letter_index, 1);
        assert_eq!(snap.accuracy_percent, 0.0);
        assert_eq!(snap.typed_characters[0].outcome, Outcome::Incorrect);

        s.handle_keystroke("i");
        assert!(s.is_complete());
        assert_eq!(s.accuracy(), 50.0);
    }

    #[test]
    fn test_word_transition_clears_log() {
        let mut s = session(&["ab", "cd"]);

        s.handle_keystroke("a");
        assert_matches!(
            s.handle_keystroke("b"),
            Transition::WordCompleted { next_word: 1, .. }
        );
        let snap = s.snapshot();
        assert_eq!(snap.current_word_index, 1);
        assert_eq!(snap.current_letter_index, 0);
        assert!(snap.typed_characters.is_empty());

        s.handle_keystroke("c");
        assert_eq!(s.accuracy(), 100.0);
        assert_eq!(s.snapshot().typed_characters.len(), 1);
    }

    #[test]
    fn test_word_completing_keystroke_uses_old_log() {
        let mut s = session(&["ab", "cd"]);

        s.handle_keystroke("x");
        s.handle_keystroke("b");
        // x wrong, b right: computed before the clear
        assert_eq!(s.accuracy(), 50.0);
        assert!(s.snapshot().typed_characters.is_empty());
    }

    #[test]
    fn test_errors_in_previous_word_do_not_carry_over() {
        let mut s = session(&["ab", "cd"]);
        type_all(&mut s, &["x", "y"]);
        assert_eq!(s.accuracy(), 0.0);

        s.handle_keystroke("c");
        assert_eq!(s.accuracy(), 100.0);
    }

    #[test]
    fn test_multi_char_input_ignored() {
        let mut s = session(&["hi"]);
        let before = s.snapshot();

        assert_eq!(s.handle_keystroke("Shift"), Transition::Ignored);
        assert_eq!(s.handle_keystroke("Enter"), Transition::Ignored);
        assert_eq!(s.handle_keystroke(""), Transition::Ignored);

        assert_eq!(s.snapshot(), before);
    }

    #[test]
    fn test_single_multibyte_char_is_one_keystroke() {
        let mut s = session(&["héllo"]);
        s.handle_keystroke("h");
        assert_eq!(s.expected_char(), 'é');
        assert_matches!(
            s.handle_keystroke("é"),
            Transition::Advanced {
                outcome: Outcome::Correct
            }
        );
        assert_eq!(s.snapshot().current_letter_index, 2);
    }

    #[test]
    fn test_space_is_a_character() {
        let mut s = session(&["a b"]);
        s.handle_keystroke("a");
        assert_matches!(
            s.handle_keystroke(" "),
            Transition::Advanced {
                outcome: Outcome::Correct
            }
        );
    }

    #[test]
    fn test_input_after_completion_is_noop() {
        let mut s = session(&["hi"]);
        type_all(&mut s, &["h", "x"]);
        assert!(s.is_complete());
        let before = s.snapshot();

        assert_eq!(s.handle_keystroke("i"), Transition::Ignored);
        assert_eq!(s.handle_keystroke("z"), Transition::Ignored);

        assert_eq!(s.snapshot(), before);
    }

    #[test]
    fn test_single_letter_word_completes_immediately() {
        let mut s = session(&["a"]);
        assert_matches!(s.handle_keystroke("b"), Transition::SessionCompleted { .. });
        let snap = s.snapshot();
        assert!(snap.is_complete);
        assert_eq!(snap.current_word_index, 0);
        assert_eq!(snap.current_letter_index, 0);
        assert_eq!(snap.accuracy_percent, 0.0);
    }

    #[test]
    fn test_final_word_cursor_stays_on_last_letter() {
        let mut s = session(&["ab", "cd"]);
        type_all(&mut s, &["a", "b", "c", "d"]);
        let snap = s.snapshot();
        assert!(snap.is_complete);
        assert_eq!(snap.current_word_index, 1);
        assert_eq!(snap.current_letter_index, 1);
        assert_eq!(snap.typed_characters.len(), 2);
    }

    #[test]
    fn test_snapshot_is_idempotent() {
        let mut s = session(&["hello", "world"]);
        type_all(&mut s, &["h", "x", "l"]);
        assert_eq!(s.snapshot(), s.snapshot());
    }

    #[test]
    fn test_invariants_hold_across_full_run() {
        let words = ["hello", "world", "typing", "test", "practice"];
        let mut s = session(&words);
        let keys: Vec<String> = "hellx wxrld typing tost practicq!!"
            .chars()
            .filter(|c| *c != ' ')
            .map(|c| c.to_string())
            .collect();

        let mut prev = s.snapshot();
        for key in &keys {
            s.handle_keystroke(key);
            let snap = s.snapshot();

            assert!(snap.current_word_index < words.len());
            assert!(snap.current_letter_index <= words[snap.current_word_index].len());
            assert!((0.0..=100.0).contains(&snap.accuracy_percent));
            assert!(snap.current_word_index >= prev.current_word_index);
            if snap.current_word_index == prev.current_word_index && !prev.is_complete {
                assert!(snap.current_letter_index >= prev.current_letter_index);
            }
            if snap.current_word_index > prev.current_word_index {
                assert_eq!(snap.current_letter_index, 0);
            }
            prev = snap;
        }
        assert!(s.is_complete());
    }

    #[test]
    fn test_log_flags_are_never_revised() {
        let mut s = session(&["abc"]);
        type_all(&mut s, &["a", "x"]);
        let first = s.snapshot().typed_characters;
        s.handle_keystroke("c");
        let second = s.snapshot().typed_characters;
        assert_eq!(&second[..2], &first[..]);
    }

    #[test]
    fn test_cumulative_policy_spans_words() {
        let mut s = TypingSession::new(["ab", "cd"], AccuracyPolicy::Cumulative).unwrap();
        type_all(&mut s, &["x", "b"]);
        assert_eq!(s.accuracy(), 50.0);

        s.handle_keystroke("c");
        let snap = s.snapshot();
        assert!((snap.accuracy_percent - 200.0 / 3.0).abs() < 1e-9);
        assert_eq!(snap.correct_keystrokes, 2);
        assert_eq!(snap.total_keystrokes, 3);
    }

    #[test]
    fn test_reset_returns_to_initial_state() {
        let mut s = session(&["hi"]);
        type_all(&mut s, &["x", "i"]);
        assert!(s.is_complete());

        s.reset();
        let snap = s.snapshot();
        assert!(!snap.is_complete);
        assert_eq!(snap.current_word_index, 0);
        assert_eq!(snap.current_letter_index, 0);
        assert_eq!(snap.accuracy_percent, 100.0);
        assert_eq!(snap.total_keystrokes, 0);
        assert_eq!(s.current_word(), "hi");
    }

    #[test]
    fn test_transition_outcome() {
        assert_eq!(Transition::Ignored.outcome(), None);
        assert_eq!(
            Transition::WordCompleted {
                outcome: Outcome::Incorrect,
                next_word: 1
            }
            .outcome(),
            Some(Outcome::Incorrect)
        );
    }
}
