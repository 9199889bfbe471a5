//! Banner relevance score in [0, 1], rounded to two decimals.

const WEIGHT_SHARE: f64 = 0.7;
const MAX_WEIGHT: f64 = 5.0;
const WORD_COUNT_SHARE: f64 = 0.15;
const WORD_COUNT_CAP: u32 = 100;
const STREAK_SHARE: f64 = 0.15;
const STREAK_MIDPOINT: f64 = 5.0;
const STREAK_STEEPNESS: f64 = 0.5;
const DISMISS_SUPPRESS_DAYS: f64 = 3.0;
const DISMISS_RECOVERY_DAYS: f64 = 7.0;
const DISMISS_RECOVERY_RATE: f64 = 0.8;

/// Recovery factor for `ramp` in [0, 1], scaled so it reaches exactly 1 at
/// the end of the window.
fn recovery_factor(ramp: f64) -> f64 {
    (1.0 - (-DISMISS_RECOVERY_RATE * ramp).exp()) / (1.0 - (-DISMISS_RECOVERY_RATE).exp())
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BannerScoreInputs {
    /// Base weight, 1–5.
    pub base_weight: u8,
    pub journal_word_count: Option<u32>,
    pub habit_streak: Option<u32>,
    pub days_since_dismiss: Option<f64>,
}

pub fn calculate_banner_score(inputs: &BannerScoreInputs) -> f64 {
    let mut score = (inputs.base_weight as f64 / MAX_WEIGHT * WEIGHT_SHARE).min(WEIGHT_SHARE);

    if let Some(count) = inputs.journal_word_count {
        let normalized = count.min(WORD_COUNT_CAP) as f64 / WORD_COUNT_CAP as f64;
        score += WORD_COUNT_SHARE * (1.0 + 9.0 * normalized).log10();
    }

    if let Some(streak) = inputs.habit_streak {
        let exponent = -STREAK_STEEPNESS * (streak as f64 - STREAK_MIDPOINT);
        score += STREAK_SHARE / (1.0 + exponent.exp());
    }

    if let Some(days) = inputs.days_since_dismiss {
        if days < DISMISS_SUPPRESS_DAYS {
            return 0.0;
        }
        if days < DISMISS_RECOVERY_DAYS {
            let ramp = (days - DISMISS_SUPPRESS_DAYS) / (DISMISS_RECOVERY_DAYS - DISMISS_SUPPRESS_DAYS);
            score *= recovery_factor(ramp);
        }
    }

    round2(score.clamp(0.0, 1.0))
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
