#![forbid(unsafe_code)]

//! Repetition and gibberish detection.
//!
//! [`AnomalyDetector`] flags values such as `adadad`, `kukuku`, `11111111`
//! or `qwrrtxzk` that a single regular expression cannot describe
//! parametrically. The checks are heuristic: short real words can be
//! flagged, which is accepted in exchange for blocking junk test data.
//!
//! # Decision Rule
//!
//! Applied in order, first match wins:
//!
//! 1. **Digit run**: an all-digit value is anomalous iff its leading run of
//!    identical digits is at least `digit_run_threshold` long. All-digit
//!    values never reach the later steps, so `9876543210` passes here.
//! 2. **Leading block repeat**: for block lengths `1..=min(5, len/2)`, cut
//!    the value into consecutive blocks from offset 0 and count blocks equal
//!    to the first one (a truncated final block counts when it is a prefix
//!    of the first block). Comparison is case-sensitive.
//! 3. **Interior repeat**: for block lengths `2..=4` and every start offset,
//!    count consecutive case-insensitive repeats of the block at that offset.
//! 4. **Consonant ratio**: long values whose letters are mostly consonants.
//!
//! Every threshold lives in [`AnomalyConfig`].

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// AnomalyConfig
// ---------------------------------------------------------------------------

/// Thresholds for the anomaly heuristics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnomalyConfig {
    /// Minimum leading run of identical digits in an all-digit value.
    pub digit_run_threshold: usize,
    /// Largest block length tried by the leading-block check.
    pub leading_block_max_len: usize,
    /// Blocks up to this length are "short" (also caps the interior check).
    pub short_block_max_len: usize,
    /// Matches needed for a short leading block.
    pub short_block_min_count: usize,
    /// Block length with its own, stricter match count.
    pub long_block_len: usize,
    /// Matches needed for a block of `long_block_len`.
    pub long_block_min_count: usize,
    /// Smallest block length scanned by the interior check.
    pub interior_block_min_len: usize,
    /// Largest block length scanned by the interior check.
    pub interior_block_max_len: usize,
    /// Consecutive equal blocks needed by the interior check.
    pub interior_min_repeats: usize,
    /// Minimum value length before the consonant ratio applies.
    pub gibberish_min_len: usize,
    /// Consonant share of letters above which a value is gibberish.
    pub consonant_ratio: f64,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            digit_run_threshold: 8,
            leading_block_max_len: 5,
            short_block_max_len: 3,
            short_block_min_count: 3,
            long_block_len: 4,
            long_block_min_count: 4,
            interior_block_min_len: 2,
            interior_block_max_len: 4,
            interior_min_repeats: 3,
            gibberish_min_len: 8,
            consonant_ratio: 0.75,
        }
    }
}

impl AnomalyConfig {
    /// Set the digit-run threshold.
    #[must_use]
    pub fn with_digit_run_threshold(mut self, threshold: usize) -> Self {
        self.digit_run_threshold = threshold;
        self
    }

    /// Set the consonant ratio.
    #[must_use]
    pub fn with_consonant_ratio(mut self, ratio: f64) -> Self {
        self.consonant_ratio = ratio;
        self
    }

    /// Set the minimum length for the consonant ratio check.
    #[must_use]
    pub fn with_gibberish_min_len(mut self, len: usize) -> Self {
        self.gibberish_min_len = len;
        self
    }
}

// ---------------------------------------------------------------------------
// AnomalyReason
// ---------------------------------------------------------------------------

/// Which heuristic flagged a value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum AnomalyReason {
    /// Leading run of identical digits.
    DigitRun { run: usize },
    /// The first block repeats across the value.
    LeadingBlockRepeat { block_len: usize, count: usize },
    /// A block repeats back-to-back somewhere in the value.
    InteriorRepeat {
        block_len: usize,
        start: usize,
        repeats: usize,
    },
    /// Too few vowels among the letters.
    ConsonantHeavy { consonants: usize, vowels: usize },
}

impl AnomalyReason {
    /// Short name for logging.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::DigitRun { .. } => "digit_run",
            Self::LeadingBlockRepeat { .. } => "leading_block_repeat",
            Self::InteriorRepeat { .. } => "interior_repeat",
            Self::ConsonantHeavy { .. } => "consonant_heavy",
        }
    }
}

// ---------------------------------------------------------------------------
// AnomalyDetector
// ---------------------------------------------------------------------------

/// Pure repetition/gibberish detector.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AnomalyDetector {
    config: AnomalyConfig,
}

impl AnomalyDetector {
    /// Create a detector with the given thresholds.
    #[must_use]
    pub const fn new(config: AnomalyConfig) -> Self {
        Self { config }
    }

    /// The thresholds in use.
    #[must_use]
    pub const fn config(&self) -> &AnomalyConfig {
        &self.config
    }

    /// `true` if `value` looks repetitive or like gibberish.
    #[must_use]
    pub fn is_anomalous(&self, value: &str) -> bool {
        self.explain(value).is_some()
    }

    /// The first heuristic that flags `value`, if any.
    #[must_use]
    pub fn explain(&self, value: &str) -> Option<AnomalyReason> {
        let chars: Vec<char> = value.chars().collect();
        if chars.is_empty() {
            return None;
        }

        if chars.iter().all(char::is_ascii_digit) {
            return self.digit_run(&chars);
        }

        self.leading_block_repeat(&chars)
            .or_else(|| self.interior_repeat(&chars))
            .or_else(|| self.consonant_heavy(&chars))
    }

    fn digit_run(&self, chars: &[char]) -> Option<AnomalyReason> {
        let first = chars[0];
        let run = chars.iter().take_while(|&&c| c == first).count();
        (run >= self.config.digit_run_threshold).then_some(AnomalyReason::DigitRun { run })
    }

    fn leading_block_repeat(&self, chars: &[char]) -> Option<AnomalyReason> {
        let cfg = &self.config;
        let max_len = cfg.leading_block_max_len.min(chars.len() / 2);

        for block_len in 1..=max_len {
            let pattern = &chars[..block_len];
            // Full blocks must equal the pattern; the truncated tail only
            // needs to be a prefix of it.
            let count = chars
                .chunks(block_len)
                .filter(|block| pattern.starts_with(block))
                .count();

            let short_hit = block_len <= cfg.short_block_max_len && count >= cfg.short_block_min_count;
            let long_hit = block_len == cfg.long_block_len && count >= cfg.long_block_min_count;
            if short_hit || long_hit {
                return Some(AnomalyReason::LeadingBlockRepeat { block_len, count });
            }
        }
        None
    }

    fn interior_repeat(&self, chars: &[char]) -> Option<AnomalyReason> {
        let cfg = &self.config;
        let folded: Vec<char> = chars.iter().map(|&c| fold_case(c)).collect();
        let len = folded.len();

        for block_len in cfg.interior_block_min_len.max(1)..=cfg.interior_block_max_len {
            // Longer blocks are scanned but never flagged.
            if block_len > cfg.short_block_max_len {
                continue;
            }
            let mut start = 0;
            while start + 2 * block_len <= len {
                let pattern = &folded[start..start + block_len];
                let repeats = 1 + folded[start + block_len..]
                    .chunks_exact(block_len)
                    .take_while(|block| *block == pattern)
                    .count();
                if repeats >= cfg.interior_min_repeats {
                    return Some(AnomalyReason::InteriorRepeat {
                        block_len,
                        start,
                        repeats,
                    });
                }
                start += 1;
            }
        }
        None
    }

    fn consonant_heavy(&self, chars: &[char]) -> Option<AnomalyReason> {
        let (consonants, vowels) = letter_counts(chars);
        let letters = consonants + vowels;
        if letters == 0 || chars.len() < self.config.gibberish_min_len {
            return None;
        }

        let ratio = consonants as f64 / letters as f64;
        (ratio > self.config.consonant_ratio)
            .then_some(AnomalyReason::ConsonantHeavy { consonants, vowels })
    }
}

/// Check `value` with the default thresholds.
#[must_use]
pub fn is_anomalous(value: &str) -> bool {
    AnomalyDetector::default().is_anomalous(value)
}

fn fold_case(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

/// ASCII consonant and vowel counts, case-insensitive.
fn letter_counts(chars: &[char]) -> (usize, usize) {
    chars
        .iter()
        .filter(|c| c.is_ascii_alphabetic())
        .fold((0, 0), |(consonants, vowels), c| {
            match c.to_ascii_lowercase() {
                'a' | 'e' | 'i' | 'o' | 'u' => (consonants, vowels + 1),
                _ => (consonants + 1, vowels),
            }
        })
}
