//! 按行程日期窗口过滤预报条目
//!
//! 行程日期是不带时区的日历日期，预报时间戳是 UTC 秒。两端日期都折算为
//! UTC 零点：窗口为 [出发日 00:00, 返程日次日 00:00)，从而让返程日全天
//! 被包含在内。超出预报视界的请求自然得到空结果，调用方应把空结果理解为
//! "预报尚不可用"而不是失败。

use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};

use crate::weather::forecast::ForecastEntry;

/// 日历日期对应的 UTC 零点时间戳
pub fn utc_midnight_timestamp(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

/// 过滤出时间戳落在行程日期范围内的条目，保持原有顺序
pub fn filter_entries(entries: &[ForecastEntry], date_leaving: NaiveDate, date_returning: NaiveDate) -> Vec<ForecastEntry> {
    let start = utc_midnight_timestamp(date_leaving);
    let end_exclusive = utc_midnight_timestamp(date_returning + Days::new(1));

    entries
        .iter()
        .filter(|entry| start <= entry.dt && entry.dt < end_exclusive)
        .cloned()
        .collect()
}

/// 出发日期是否已超出预报服务的可预测范围
pub fn beyond_forecast_horizon(date_leaving: NaiveDate, now: DateTime<Utc>, horizon_days: u64) -> bool {
    utc_midnight_timestamp(date_leaving) > (now + chrono::Duration::days(horizon_days as i64)).timestamp()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::weather::forecast::{ForecastCondition, ForecastMain};

    fn entry(dt: i64) -> ForecastEntry {
        ForecastEntry {
            dt,
            main: ForecastMain {
                temp: 20.0,
                feels_like: 19.0,
            },
            weather: vec![ForecastCondition {
                main: "Clear".to_string(),
            }],
            pop: None,
        }
    }

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_filter_window_boundaries() {
        let leaving = date(2024, 6, 1);
        let returning = date(2024, 6, 3);
        let start = utc_midnight_timestamp(leaving);
        let end_day_start = utc_midnight_timestamp(returning);
        let after_end = utc_midnight_timestamp(date(2024, 6, 4));

        let entries = vec![
            entry(start - 1),       // 出发日前一秒，排除
            entry(start),           // 出发日零点，包含
            entry(end_day_start),   // 返程日零点，包含
            entry(after_end - 1),   // 返程日最后一秒，包含
            entry(after_end),       // 返程日次日零点，排除
        ];

        let filtered = filter_entries(&entries, leaving, returning);
        let timestamps: Vec<i64> = filtered.iter().map(|e| e.dt).collect();
        assert_eq!(timestamps, vec![start, end_day_start, after_end - 1]);
    }

    #[test]
    fn test_filter_preserves_order() {
        let leaving = date(2024, 6, 1);
        let returning = date(2024, 6, 2);
        let base = utc_midnight_timestamp(leaving);
        let entries = vec![entry(base + 300), entry(base + 100), entry(base + 200)];

        let filtered = filter_entries(&entries, leaving, returning);
        let timestamps: Vec<i64> = filtered.iter().map(|e| e.dt).collect();
        assert_eq!(timestamps, vec![base + 300, base + 100, base + 200]);
    }

    #[test]
    fn test_filter_idempotent() {
        let leaving = date(2024, 6, 1);
        let returning = date(2024, 6, 3);
        let base = utc_midnight_timestamp(leaving);
        let entries: Vec<ForecastEntry> = (0..20).map(|i| entry(base + i * 10800)).collect();

        let once = filter_entries(&entries, leaving, returning);
        let twice = filter_entries(&once, leaving, returning);
        let once_ts: Vec<i64> = once.iter().map(|e| e.dt).collect();
        let twice_ts: Vec<i64> = twice.iter().map(|e| e.dt).collect();
        assert_eq!(once_ts, twice_ts);
    }

    #[test]
    fn test_filter_out_of_range_is_empty() {
        // 行程远在预报数据之外时得到空结果而不是错误
        let entries = vec![entry(utc_midnight_timestamp(date(2024, 6, 1)))];
        let filtered = filter_entries(&entries, date(2024, 7, 1), date(2024, 7, 3));
        assert!(filtered.is_empty());
    }

    #[test]
    fn test_single_day_trip() {
        let day = date(2024, 6, 1);
        let start = utc_midnight_timestamp(day);
        let entries = vec![entry(start), entry(start + 86399), entry(start + 86400)];
        let filtered = filter_entries(&entries, day, day);
        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn test_beyond_forecast_horizon() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        assert!(!beyond_forecast_horizon(date(2024, 6, 3), now, 5));
        assert!(beyond_forecast_horizon(date(2024, 6, 10), now, 5));
    }
}
