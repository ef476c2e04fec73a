use crate::models::Code;

/// Result of scoring a guess against the secret
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreResult {
    /// Correct digit in the correct position
    pub exact: u8,
    /// Correct digit in the wrong position, multiset-limited
    pub partial: u8,
}

impl ScoreResult {
    /// A guess wins when every position matches.
    pub fn is_win(self) -> bool {
        usize::from(self.exact) == Code::LEN
    }
}

pub struct Scorer;

impl Scorer {
    /// Compare a guess with the secret and count exact and partial matches.
    ///
    /// Scoring rules (Mastermind):
    /// - `exact`: positions where guess and secret hold the same digit
    /// - `partial`: digits present on both sides but not already counted as
    ///   exact, limited per digit value by the smaller multiplicity so
    ///   duplicates never overcount
    ///
    /// Pure and total over well-formed codes; invariants `exact + partial <= 4`
    /// and `exact == 4` iff guess == secret hold for all inputs.
    pub fn score(secret: &Code, guess: &Code) -> ScoreResult {
        let mut exact = 0u8;
        // Residual digit counts for the positions that did not match exactly,
        // one bucket per digit value.
        let mut secret_left = [0u8; Code::DIGIT_MAX as usize + 1];
        let mut guess_left = [0u8; Code::DIGIT_MAX as usize + 1];

        for (s, g) in secret.digits().into_iter().zip(guess.digits()) {
            if s == g {
                exact += 1;
            } else {
                secret_left[s as usize] += 1;
                guess_left[g as usize] += 1;
            }
        }

        let partial = secret_left
            .iter()
            .zip(guess_left)
            .map(|(&s, g)| s.min(g))
            .sum();

        ScoreResult { exact, partial }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(s: &str) -> Code {
        s.parse().expect("valid test code")
    }

    /// All 8^4 codes, as digit arrays in base-8 order.
    fn all_codes() -> impl Iterator<Item = Code> {
        (0u16..4096).map(|n| {
            let digits = [
                ((n >> 9) & 0x7) as u8,
                ((n >> 6) & 0x7) as u8,
                ((n >> 3) & 0x7) as u8,
                (n & 0x7) as u8,
            ];
            Code::from_digits(digits).expect("base-8 digits in range")
        })
    }

    #[test]
    fn test_identical_codes_score_four_exact() {
        let result = Scorer::score(&code("1234"), &code("1234"));
        assert_eq!(result, ScoreResult { exact: 4, partial: 0 });
        assert!(result.is_win());
    }

    #[test]
    fn test_reversed_code_scores_four_partial() {
        let result = Scorer::score(&code("1234"), &code("4321"));
        assert_eq!(result, ScoreResult { exact: 0, partial: 4 });
    }

    #[test]
    fn test_disjoint_codes_score_nothing() {
        let result = Scorer::score(&code("0123"), &code("4567"));
        assert_eq!(result, ScoreResult { exact: 0, partial: 0 });
    }

    #[test]
    fn test_duplicate_digits_do_not_overcount() {
        // Residual bags after the exact match at position 0:
        // secret {0,1,1} vs guess {1,0,0} -> min overlap 0:1 + 1:1 = 2
        let result = Scorer::score(&code("0011"), &code("0100"));
        assert_eq!(result, ScoreResult { exact: 1, partial: 2 });
    }

    #[test]
    fn test_repeated_guess_digit_limited_by_secret_multiplicity() {
        // Only one 0 in the secret; the three residual 0s in the guess
        // cannot score more than the secret holds
        let result = Scorer::score(&code("0123"), &code("0000"));
        assert_eq!(result, ScoreResult { exact: 1, partial: 0 });
    }

    #[test]
    fn test_repeated_secret_digit_limited_by_guess_multiplicity() {
        let result = Scorer::score(&code("0000"), &code("0123"));
        assert_eq!(result, ScoreResult { exact: 1, partial: 0 });
    }

    #[test]
    fn test_bounds_hold_across_all_secrets() {
        // Every secret against a spread of fixed guesses
        let guesses = ["0000", "0123", "7654", "7777", "0011", "3507", "2222", "1234"];
        for secret in all_codes() {
            for g in guesses {
                let guess = code(g);
                let result = Scorer::score(&secret, &guess);
                assert!(result.exact <= 4);
                assert!(result.partial <= 4);
                assert!(result.exact + result.partial <= 4);
                assert_eq!(result.exact == 4, secret == guess);
            }
        }
    }

    #[test]
    fn test_partial_count_is_symmetric() {
        let guesses = ["0011", "0123", "7070", "5555", "1234"];
        for secret in all_codes() {
            for g in guesses {
                let guess = code(g);
                let forward = Scorer::score(&secret, &guess);
                let backward = Scorer::score(&guess, &secret);
                assert_eq!(forward.exact, backward.exact);
                assert_eq!(forward.partial, backward.partial);
            }
        }
    }
}
