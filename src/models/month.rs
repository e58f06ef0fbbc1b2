use chrono::{Months, NaiveDate};
use std::sync::LazyLock;

/// First month of the contribution cycle (year, month).
pub const CYCLE_START: (i32, u32) = (2025, 12);
pub const CYCLE_LENGTH: u32 = 12;

static LABELS: LazyLock<Vec<String>> = LazyLock::new(|| {
    let start = NaiveDate::from_ymd_opt(CYCLE_START.0, CYCLE_START.1, 1).unwrap_or_default();
    (0..CYCLE_LENGTH)
        .filter_map(|i| start.checked_add_months(Months::new(i)))
        .map(|d| d.format("%b-%y").to_string())
        .collect()
});

/// One period of the cycle. Only constructible from the fixed cycle, so the
/// index is always in range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month(usize);

impl Month {
    /// Labels in cycle order, e.g. `Dec-25` .. `Nov-26`.
    pub fn labels() -> &'static [String] {
        &LABELS
    }

    pub fn all() -> impl Iterator<Item = Month> {
        (0..LABELS.len()).map(Month)
    }

    pub fn first() -> Month {
        Month(0)
    }

    pub fn count() -> usize {
        LABELS.len()
    }

    pub fn from_index(index: usize) -> Option<Month> {
        (index < LABELS.len()).then_some(Month(index))
    }

    /// Case-insensitive label lookup (`dec-25` matches `Dec-25`).
    pub fn parse(label: &str) -> Option<Month> {
        let label = label.trim();
        LABELS
            .iter()
            .position(|l| l.eq_ignore_ascii_case(label))
            .map(Month)
    }

    pub fn index(&self) -> usize {
        self.0
    }

    pub fn label(&self) -> &'static str {
        LABELS.get(self.0).map(String::as_str).unwrap_or("")
    }

    /// Next month, wrapping to the start of the cycle.
    pub fn next(&self) -> Month {
        Month((self.0 + 1) % LABELS.len().max(1))
    }

    /// Previous month, wrapping to the end of the cycle.
    pub fn prev(&self) -> Month {
        if self.0 == 0 {
            Month(LABELS.len().saturating_sub(1))
        } else {
            Month(self.0 - 1)
        }
    }
}

impl std::fmt::Display for Month {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
