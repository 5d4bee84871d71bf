use chrono::{Datelike, NaiveDate};

/// Opaque session credential, forwarded as a bearer token
#[derive(Clone, Debug, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(transparent)]
pub struct AuthToken(pub String);

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub nickname: String,

    /// Day the author started smoking
    #[serde(default)]
    pub started_at: Option<NaiveDate>,
}

impl Author {
    pub fn new(nickname: impl Into<String>) -> Author {
        Author {
            nickname: nickname.into(),
            started_at: None,
        }
    }

    /// Whole calendar months between `started_at` and `today`
    pub fn tenure_months(&self, today: NaiveDate) -> Option<i64> {
        let start = self.started_at?;
        Some(
            (today.year() as i64 - start.year() as i64) * 12
                + (today.month0() as i64 - start.month0() as i64),
        )
    }

    pub fn tenure_label(&self, today: NaiveDate) -> String {
        match self.tenure_months(today) {
            None => String::from("Not set"),
            Some(m) if m < 0 => String::from("Invalid date"),
            Some(m) => format!("smoking for {m} months"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn tenure_unset() {
        assert_eq!(Author::new("kim").tenure_label(day(2024, 5, 1)), "Not set");
    }

    #[test]
    fn tenure_counts_calendar_months() {
        let a = Author {
            nickname: String::from("kim"),
            started_at: Some(day(2022, 11, 30)),
        };
        assert_eq!(a.tenure_months(day(2023, 2, 1)), Some(3));
        assert_eq!(a.tenure_label(day(2022, 11, 30)), "smoking for 0 months");
        assert_eq!(a.tenure_label(day(2024, 11, 1)), "smoking for 24 months");
    }

    #[test]
    fn tenure_in_the_future() {
        let a = Author {
            nickname: String::from("kim"),
            started_at: Some(day(2030, 1, 1)),
        };
        assert_eq!(a.tenure_label(day(2029, 12, 31)), "Invalid date");
    }
}
