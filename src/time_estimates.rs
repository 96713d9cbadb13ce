//! Time estimates - turns a guess count into crack times and a 0-4 score.

use std::fmt;

use serde::{Serialize, Serializer};

/// Discrete strength bucket, 0 (weakest) to 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Score {
    /// Risky: falls to a throttled online attack.
    TooGuessable = 0,
    /// Modest protection from throttled online attacks.
    VeryGuessable = 1,
    /// Modest protection from unthrottled online attacks.
    SomewhatGuessable = 2,
    /// Modest protection from offline attacks on a slow salted hash.
    SafelyUnguessable = 3,
    /// Strong protection from offline attacks on a slow salted hash.
    VeryUnguessable = 4,
}

impl Score {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl From<Score> for u8 {
    fn from(score: Score) -> Self {
        score.as_u8()
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::TooGuessable => "too guessable",
            Self::VeryGuessable => "very guessable",
            Self::SomewhatGuessable => "somewhat guessable",
            Self::SafelyUnguessable => "safely unguessable",
            Self::VeryUnguessable => "very unguessable",
        };
        f.write_str(label)
    }
}

impl Serialize for Score {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.as_u8())
    }
}

/// Seconds to crack under each attack scenario.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CrackTimesSeconds {
    pub online_throttling_100_per_hour: f64,
    pub online_no_throttling_10_per_second: f64,
    pub offline_slow_hashing_1e4_per_second: f64,
    pub offline_fast_hashing_1e10_per_second: f64,
}

/// [`CrackTimesSeconds`] rendered for people ("3 hours", "centuries").
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrackTimesDisplay {
    pub online_throttling_100_per_hour: String,
    pub online_no_throttling_10_per_second: String,
    pub offline_slow_hashing_1e4_per_second: String,
    pub offline_fast_hashing_1e10_per_second: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttackTimes {
    pub crack_times_seconds: CrackTimesSeconds,
    pub crack_times_display: CrackTimesDisplay,
    pub score: Score,
}

/// Projects `guesses` onto the four attack scenarios and the score scale.
pub fn estimate_attack_times(guesses: f64) -> AttackTimes {
    let crack_times_seconds = CrackTimesSeconds {
        online_throttling_100_per_hour: guesses / (100.0 / 3600.0),
        online_no_throttling_10_per_second: guesses / 10.0,
        offline_slow_hashing_1e4_per_second: guesses / 1e4,
        offline_fast_hashing_1e10_per_second: guesses / 1e10,
    };
    let crack_times_display = CrackTimesDisplay {
        online_throttling_100_per_hour: display_time(crack_times_seconds.online_throttling_100_per_hour),
        online_no_throttling_10_per_second: display_time(
            crack_times_seconds.online_no_throttling_10_per_second,
        ),
        offline_slow_hashing_1e4_per_second: display_time(
            crack_times_seconds.offline_slow_hashing_1e4_per_second,
        ),
        offline_fast_hashing_1e10_per_second: display_time(
            crack_times_seconds.offline_fast_hashing_1e10_per_second,
        ),
    };

    AttackTimes {
        crack_times_seconds,
        crack_times_display,
        score: guesses_to_score(guesses),
    }
}

pub fn guesses_to_score(guesses: f64) -> Score {
    const DELTA: f64 = 5.0;
    if guesses < 1e3 + DELTA {
        Score::TooGuessable
    } else if guesses < 1e6 + DELTA {
        Score::VeryGuessable
    } else if guesses < 1e8 + DELTA {
        Score::SomewhatGuessable
    } else if guesses < 1e10 + DELTA {
        Score::SafelyUnguessable
    } else {
        Score::VeryUnguessable
    }
}

/// Renders a duration in the largest unit that fits, rounded ("1 minute", "4 days").
///
/// A month is 31 days and a year 12 months.
pub fn display_time(seconds: f64) -> String {
    const MINUTE: f64 = 60.0;
    const HOUR: f64 = MINUTE * 60.0;
    const DAY: f64 = HOUR * 24.0;
    const MONTH: f64 = DAY * 31.0;
    const YEAR: f64 = MONTH * 12.0;
    const CENTURY: f64 = YEAR * 100.0;

    let (count, unit) = if seconds < 1.0 {
        return "less than a second".to_string();
    } else if seconds < MINUTE {
        (seconds.round(), "second")
    } else if seconds < HOUR {
        ((seconds / MINUTE).round(), "minute")
    } else if seconds < DAY {
        ((seconds / HOUR).round(), "hour")
    } else if seconds < MONTH {
        ((seconds / DAY).round(), "day")
    } else if seconds < YEAR {
        ((seconds / MONTH).round(), "month")
    } else if seconds < CENTURY {
        ((seconds / YEAR).round(), "year")
    } else {
        return "centuries".to_string();
    };

    if count == 1.0 {
        format!("{count} {unit}")
    } else {
        format!("{count} {unit}s")
    }
}
