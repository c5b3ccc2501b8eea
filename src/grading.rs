//! Percentile grading of run times
//!
//! A run time is placed on a normal distribution fitted to the completion
//! times of earlier victorious runs: faster than the mean scores above 50.

use std::f64::consts::SQRT_2;

/// Standard deviation used when the history is too sparse or too tight
pub const FALLBACK_STD_DEV: f64 = 15.0;
/// Below this the fitted deviation is replaced by the fallback
pub const MIN_STD_DEV: f64 = 1.0;
/// At or below this the distribution is degenerate and the ratio formula applies
pub const DEGENERATE_STD_DEV: f64 = 0.1;
/// Reference time for the ratio formula when there is no usable mean
pub const FALLBACK_MEAN: f64 = 60.0;

/// Outcome of grading a run
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Grade {
    /// No completed runs to compare against
    Unavailable,
    /// 0-100, higher is better
    Percentile(f64),
}

impl Grade {
    pub fn value(self) -> Option<f64> {
        match self {
            Grade::Unavailable => None,
            Grade::Percentile(p) => Some(p),
        }
    }

    pub fn tier(self) -> Option<Tier> {
        self.value().map(Tier::from_grade)
    }
}

/// Mean and population standard deviation of completion times
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeStats {
    pub mean: f64,
    pub std_dev: f64,
}

impl TimeStats {
    /// Fit the qualifying (positive) samples; `None` when there are none
    pub fn from_times(times: &[f64]) -> Option<Self> {
        let samples: Vec<f64> = times
            .iter()
            .copied()
            .filter(|t| t.is_finite() && *t > 0.0)
            .collect();
        if samples.is_empty() {
            return None;
        }

        let n = samples.len() as f64;
        let mean = samples.iter().sum::<f64>() / n;

        let std_dev = if samples.len() < 2 {
            FALLBACK_STD_DEV
        } else {
            let variance = samples.iter().map(|t| (t - mean).powi(2)).sum::<f64>() / n;
            let std_dev = variance.sqrt();
            if std_dev < MIN_STD_DEV {
                FALLBACK_STD_DEV
            } else {
                std_dev
            }
        };

        Some(Self { mean, std_dev })
    }
}

/// Grade `elapsed` seconds against historical completion times
pub fn grade(elapsed: f64, history: &[f64]) -> Grade {
    match TimeStats::from_times(history) {
        Some(stats) => Grade::Percentile(grade_with_stats(elapsed, stats)),
        None => Grade::Unavailable,
    }
}

/// Grade against explicit statistics
pub fn grade_with_stats(elapsed: f64, stats: TimeStats) -> f64 {
    if elapsed <= 0.0 {
        return 100.0;
    }

    if stats.std_dev <= DEGENERATE_STD_DEV {
        let base = if stats.mean > 0.0 {
            stats.mean
        } else {
            FALLBACK_MEAN
        };
        return (base / elapsed * 100.0).clamp(0.0, 100.0);
    }

    let z = (stats.mean - elapsed) / stats.std_dev;
    (normal_cdf(z) * 100.0).clamp(0.0, 100.0)
}

/// Standard normal cumulative distribution
pub fn normal_cdf(z: f64) -> f64 {
    0.5 * (1.0 + libm::erf(z / SQRT_2))
}

/// Outcome tiers, best first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Tier {
    SeoulNational,
    Yonsei,
    Korea,
    ChungAng,
    HankukForeignStudies,
    HanRiverBridge,
}

impl Tier {
    pub const ALL: [Tier; 6] = [
        Tier::SeoulNational,
        Tier::Yonsei,
        Tier::Korea,
        Tier::ChungAng,
        Tier::HankukForeignStudies,
        Tier::HanRiverBridge,
    ];

    pub fn from_grade(grade: f64) -> Self {
        Self::ALL
            .into_iter()
            .find(|tier| tier.threshold().is_some_and(|min| grade >= min))
            .unwrap_or(Tier::HanRiverBridge)
    }

    /// Lowest grade that earns this tier; the last tier has none
    pub fn threshold(self) -> Option<f64> {
        match self {
            Tier::SeoulNational => Some(90.0),
            Tier::Yonsei => Some(80.0),
            Tier::Korea => Some(70.0),
            Tier::ChungAng => Some(60.0),
            Tier::HankukForeignStudies => Some(50.0),
            Tier::HanRiverBridge => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tier::SeoulNational => "Seoul National University",
            Tier::Yonsei => "Yonsei University",
            Tier::Korea => "Korea University",
            Tier::ChungAng => "Chung-Ang University",
            Tier::HankukForeignStudies => "Hankuk University of Foreign Studies",
            Tier::HanRiverBridge => "Han River Railway Bridge",
        }
    }
}

/// Line shown on the result screen
pub fn result_message(victory: bool, tier: Option<Tier>) -> String {
    match (victory, tier) {
        (true, Some(tier)) => format!("Congratulations! You were accepted to {}!", tier.label()),
        (true, None) => "Congratulations! You made it!".to_string(),
        (false, _) => "So close. Try again!".to_string(),
    }
}
