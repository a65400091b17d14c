//! Issue numbering
//!
//! Expands a `from..to` issue range of one year into concrete
//! `(year, number)` pairs. A range whose end is smaller than its start wraps
//! into the following year, using the historical count of issues published
//! per year.

use std::fmt;

/// One numbered issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Issue {
    pub year: i32,
    pub number: u32,
}

impl Issue {
    pub fn new(year: i32, number: u32) -> Self {
        Self { year, number }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.number, self.year)
    }
}

/// Largest issue number accepted in a range bound
pub const MAX_ISSUE_NUMBER: u32 = 999;

/// Issue range that cannot be expanded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueRangeError {
    /// Range wraps, but the year's issue count is unknown
    UnknownAnnualCount { year: i32 },
    /// Bound above `MAX_ISSUE_NUMBER`
    NumberOutOfRange { number: u32 },
    /// Range wraps, but starts after the year's last issue
    StartPastAnnualCount { from: u32, count: u32 },
    /// Rolled-over year does not fit in `i32`
    YearOutOfRange { year: i32 },
}

/// Number of regular issues published in `year`, if known
pub fn annual_issue_count(year: i32) -> Option<u32> {
    match year {
        1953 => Some(25),
        1954 | 1965 => Some(27),
        1955..=1964 => Some(26),
        1971 | 1972 | 1974..=1978 => Some(12),
        1973 => Some(11),
        1979 => Some(13),
        y if y >= 1980 => Some(16),
        _ => None,
    }
}

/// Parse an issue cell such as `"12"`, `"12/13"` or `"12 (uusintapainos)"`
///
/// Only the part before any `(` and then before any `/` counts.
pub fn parse_issue_number(value: &str) -> Option<u32> {
    let value = value.split('(').next().unwrap_or(value);
    let value = value.split('/').next().unwrap_or(value);
    value.trim().parse().ok()
}

/// Expand an issue range within `year`
///
/// A bound of 0 inherits the other bound; both 0 yields nothing. Issue
/// numbers past the year's count roll into the following years. In a year
/// without a known count, straight ranges are emitted as is and wrapping
/// ranges are rejected.
pub fn issues_between(from: u32, to: u32, year: i32) -> Result<Vec<Issue>, IssueRangeError> {
    let (from, to) = match (from, to) {
        (0, 0) => return Ok(Vec::new()),
        (0, to) => (to, to),
        (from, 0) => (from, from),
        bounds => bounds,
    };
    if let Some(number) = [from, to].into_iter().find(|&n| n > MAX_ISSUE_NUMBER) {
        return Err(IssueRangeError::NumberOutOfRange { number });
    }

    let count = annual_issue_count(year);
    let up_to = if to < from {
        match count {
            Some(count) if from > count => return Err(IssueRangeError::StartPastAnnualCount { from, count }),
            Some(count) => count + to,
            None => return Err(IssueRangeError::UnknownAnnualCount { year }),
        }
    } else {
        to
    };

    (from..=up_to)
        .map(|i| match count {
            Some(count) if i > count => {
                let offset = ((i - 1) / count) as i32;
                let rolled = year
                    .checked_add(offset)
                    .ok_or(IssueRangeError::YearOutOfRange { year })?;
                Ok(Issue::new(rolled, (i - 1) % count + 1))
            }
            _ => Ok(Issue::new(year, i)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(issues: &[Issue]) -> Vec<(i32, u32)> {
        issues.iter().map(|i| (i.year, i.number)).collect()
    }

    #[test]
    fn test_range_wraps_into_next_year() {
        let issues = issues_between(11, 2, 1978).unwrap();
        assert_eq!(pairs(&issues), vec![(1978, 11), (1978, 12), (1979, 1), (1979, 2)]);
    }

    #[test]
    fn test_straight_range() {
        let issues = issues_between(3, 5, 1980).unwrap();
        assert_eq!(pairs(&issues), vec![(1980, 3), (1980, 4), (1980, 5)]);
    }

    #[test]
    fn test_zero_bound_inherits_other() {
        assert_eq!(pairs(&issues_between(0, 7, 1985).unwrap()), vec![(1985, 7)]);
        assert_eq!(pairs(&issues_between(7, 0, 1985).unwrap()), vec![(1985, 7)]);
        assert!(issues_between(0, 0, 1985).unwrap().is_empty());
    }

    #[test]
    fn test_wrap_ending_on_last_issue_of_next_year() {
        // 1973 has 11 issues
        let issues = issues_between(11, 11, 1973).unwrap();
        assert_eq!(pairs(&issues), vec![(1973, 11)]);

        let issues = issues_between(10, 1, 1973).unwrap();
        assert_eq!(pairs(&issues), vec![(1973, 10), (1973, 11), (1974, 1)]);
    }

    #[test]
    fn test_straight_range_past_annual_count_rolls_over() {
        let issues = issues_between(12, 14, 1977).unwrap();
        assert_eq!(pairs(&issues), vec![(1977, 12), (1978, 1), (1978, 2)]);
    }

    #[test]
    fn test_unknown_year() {
        assert_eq!(annual_issue_count(1969), None);
        assert_eq!(pairs(&issues_between(1, 3, 1969).unwrap()), vec![(1969, 1), (1969, 2), (1969, 3)]);
        assert_eq!(
            issues_between(5, 2, 1969),
            Err(IssueRangeError::UnknownAnnualCount { year: 1969 })
        );
    }

    #[test]
    fn test_oversized_bounds_are_rejected() {
        assert_eq!(
            issues_between(u32::MAX, u32::MAX - 5, 1980),
            Err(IssueRangeError::NumberOutOfRange { number: u32::MAX })
        );
        assert_eq!(
            issues_between(1, 4_000_000_000, 1980),
            Err(IssueRangeError::NumberOutOfRange { number: 4_000_000_000 })
        );
        assert_eq!(issues_between(1, MAX_ISSUE_NUMBER, 1980).unwrap().len(), 999);
    }

    #[test]
    fn test_rollover_past_last_year_is_rejected() {
        assert_eq!(
            issues_between(16, 17, i32::MAX),
            Err(IssueRangeError::YearOutOfRange { year: i32::MAX })
        );
        assert_eq!(pairs(&issues_between(16, 16, i32::MAX).unwrap()), vec![(i32::MAX, 16)]);
    }

    #[test]
    fn test_wrap_starting_past_annual_count_is_rejected() {
        // 1978 has 12 issues
        assert_eq!(
            issues_between(20, 2, 1978),
            Err(IssueRangeError::StartPastAnnualCount { from: 20, count: 12 })
        );
    }

    #[test]
    fn test_annual_counts() {
        assert_eq!(annual_issue_count(1953), Some(25));
        assert_eq!(annual_issue_count(1954), Some(27));
        assert_eq!(annual_issue_count(1960), Some(26));
        assert_eq!(annual_issue_count(1965), Some(27));
        assert_eq!(annual_issue_count(1973), Some(11));
        assert_eq!(annual_issue_count(1975), Some(12));
        assert_eq!(annual_issue_count(1979), Some(13));
        assert_eq!(annual_issue_count(2024), Some(16));
        assert_eq!(annual_issue_count(1952), None);
        assert_eq!(annual_issue_count(1970), None);
    }

    #[test]
    fn test_parse_issue_number() {
        assert_eq!(parse_issue_number("12"), Some(12));
        assert_eq!(parse_issue_number(" 4 "), Some(4));
        assert_eq!(parse_issue_number("12/13"), Some(12));
        assert_eq!(parse_issue_number("3 (uusinta)"), Some(3));
        assert_eq!(parse_issue_number("x"), None);
        assert_eq!(parse_issue_number(""), None);
    }
}
