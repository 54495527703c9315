use chrono::{DateTime, NaiveDate};

/// Trading date of a unix timestamp, shifted by the exchange's UTC offset.
pub fn date_from_unix_timestamp(ts: i64, gmt_offset_secs: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp(ts.checked_add(gmt_offset_secs)?, 0).map(|dt| dt.date_naive())
}

pub fn date_to_str(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_from_unix_timestamp() {
        // 2024-03-01 13:30:00 UTC, B3 opening in Sao Paulo (UTC-3)
        let ts = 1709299800;
        assert_eq!(
            date_from_unix_timestamp(ts, -10800),
            NaiveDate::from_ymd_opt(2024, 3, 1)
        );

        // 2024-03-01 02:00:00 UTC is still the previous day at UTC-5
        assert_eq!(
            date_from_unix_timestamp(1709258400, -18000),
            NaiveDate::from_ymd_opt(2024, 2, 29)
        );
    }

    #[test]
    fn test_date_from_extreme_timestamp() {
        assert_eq!(date_from_unix_timestamp(i64::MAX, 3600), None);
        assert_eq!(date_from_unix_timestamp(i64::MIN, -3600), None);
        assert_eq!(date_from_unix_timestamp(i64::MAX - 3600, 0), None);
    }

    #[test]
    fn test_date_to_str() {
        assert_eq!(
            date_to_str(&NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()),
            "2024-03-01"
        );
    }
}
