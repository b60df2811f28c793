//! Remaining-time labels for tasks with a deadline.
//!
//! Computed at render time from the deadline and the current clock; nothing
//! here is stored.

use dashboard_core::CountdownLocale;

const MILLIS_PER_DAY: i64 = 86_400_000;
const MILLIS_PER_HOUR: i64 = 3_600_000;
const MILLIS_PER_MINUTE: i64 = 60_000;
const MILLIS_PER_SECOND: i64 = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemainingTime {
    Overdue,
    Left {
        days: i64,
        hours: i64,
        minutes: i64,
        seconds: i64,
    },
}

impl RemainingTime {
    pub fn between(deadline_ms: i64, now_ms: i64) -> Self {
        let remaining = deadline_ms.saturating_sub(now_ms);
        if remaining <= 0 {
            return Self::Overdue;
        }
        Self::Left {
            days: remaining / MILLIS_PER_DAY,
            hours: (remaining % MILLIS_PER_DAY) / MILLIS_PER_HOUR,
            minutes: (remaining % MILLIS_PER_HOUR) / MILLIS_PER_MINUTE,
            seconds: (remaining % MILLIS_PER_MINUTE) / MILLIS_PER_SECOND,
        }
    }

    pub fn is_overdue(&self) -> bool {
        matches!(self, Self::Overdue)
    }

    /// Render from the most significant non-zero unit down to seconds.
    pub fn label(&self, locale: CountdownLocale) -> String {
        let words = Words::for_locale(locale);
        let (days, hours, minutes, seconds) = match *self {
            Self::Overdue => return words.overdue.to_string(),
            Self::Left {
                days,
                hours,
                minutes,
                seconds,
            } => (days, hours, minutes, seconds),
        };

        let units = [
            (days, words.days),
            (hours, words.hours),
            (minutes, words.minutes),
            (seconds, words.seconds),
        ];
        let first = units
            .iter()
            .position(|(value, _)| *value > 0)
            .unwrap_or(units.len() - 1);

        let mut parts: Vec<String> = units[first..]
            .iter()
            .map(|(value, unit)| format!("{} {}", value, unit))
            .collect();
        parts.push(words.suffix.to_string());
        parts.join(" ")
    }
}

struct Words {
    days: &'static str,
    hours: &'static str,
    minutes: &'static str,
    seconds: &'static str,
    suffix: &'static str,
    overdue: &'static str,
}

impl Words {
    fn for_locale(locale: CountdownLocale) -> Self {
        match locale {
            CountdownLocale::English => Self {
                days: "days",
                hours: "hours",
                minutes: "minutes",
                seconds: "seconds",
                suffix: "left",
                overdue: "overdue",
            },
            CountdownLocale::Indonesian => Self {
                days: "hari",
                hours: "jam",
                minutes: "menit",
                seconds: "detik",
                suffix: "tersisa",
                overdue: "PEMALAS! 😴",
            },
        }
    }
}

/// Label for `deadline_ms` as seen at `now_ms`.
pub fn remaining_time_label(deadline_ms: i64, now_ms: i64, locale: CountdownLocale) -> String {
    RemainingTime::between(deadline_ms, now_ms).label(locale)
}
