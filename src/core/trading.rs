//! A-share trading calendar.
//!
//! Trading days are Monday to Friday; public holidays are not modelled.
//! All times are exchange-local (UTC+8).

use chrono::{Datelike, Days, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc, Weekday};

const MARKET_UTC_OFFSET_HOURS: i64 = 8;

/// Furthest a caller may look back, in calendar days.
pub const MAX_DAYS_BACK: u32 = 366;
/// Upper bound on the number of dates searched per request.
pub const MAX_DAYS_SEARCH: u32 = 30;

/// Current exchange-local time.
pub fn market_now() -> NaiveDateTime {
    Utc::now().naive_utc() + Duration::hours(MARKET_UTC_OFFSET_HOURS)
}

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}

pub fn is_trading_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Nearest trading day strictly before `from`.
pub fn last_trading_day(from: NaiveDate) -> NaiveDate {
    let mut date = from - Duration::days(1);
    while !is_trading_day(date) {
        date -= Duration::days(1);
    }
    date
}

/// 調倉日期：08:30 前取前一個交易日；之後取當天，當天非交易日則往前找
///
/// `days_back` is capped at [`MAX_DAYS_BACK`].
pub fn target_date(now: NaiveDateTime, days_back: u32) -> NaiveDate {
    let today = now.date();
    let base = today
        .checked_sub_days(Days::new(u64::from(days_back.min(MAX_DAYS_BACK))))
        .unwrap_or(today);

    if now.time() < hm(8, 30) || !is_trading_day(base) {
        last_trading_day(base)
    } else {
        base
    }
}

/// `YYYYMMDD`, the format of the upstream `tzrq` field.
pub fn format_compact(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// The compact dates for `days_back..days_back + max_days_search`, duplicates removed.
///
/// `max_days_search` is capped at [`MAX_DAYS_SEARCH`].
pub fn target_dates(now: NaiveDateTime, days_back: u32, max_days_search: u32) -> Vec<String> {
    let mut dates: Vec<String> = Vec::new();
    for offset in 0..max_days_search.min(MAX_DAYS_SEARCH) {
        let date = format_compact(target_date(now, days_back.saturating_add(offset)));
        if !dates.contains(&date) {
            dates.push(date);
        }
    }
    dates
}

/// Continuous auction sessions: 09:15–11:30 and 13:00–15:00, inclusive.
pub fn is_trading_time(now: NaiveDateTime) -> bool {
    if !is_trading_day(now.date()) {
        return false;
    }
    let time = now.time();
    let morning = hm(9, 15) <= time && time <= hm(11, 30);
    let afternoon = hm(13, 0) <= time && time <= hm(15, 0);
    morning || afternoon
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_weekends_are_not_trading_days() {
        // 2024-01-13 是週六
        assert!(!is_trading_day(day(2024, 1, 13)));
        assert!(!is_trading_day(day(2024, 1, 14)));
        assert!(is_trading_day(day(2024, 1, 15)));
    }

    #[test]
    fn test_last_trading_day_skips_weekend() {
        assert_eq!(last_trading_day(day(2024, 1, 15)), day(2024, 1, 12));
        assert_eq!(last_trading_day(day(2024, 1, 16)), day(2024, 1, 15));
        assert_eq!(last_trading_day(day(2024, 1, 14)), day(2024, 1, 12));
    }

    #[test]
    fn test_target_date_cutoff() {
        // 週二 08:29 → 週一
        assert_eq!(target_date(at(2024, 1, 16, 8, 29), 0), day(2024, 1, 15));
        // 週二 08:30 → 週二
        assert_eq!(target_date(at(2024, 1, 16, 8, 30), 0), day(2024, 1, 16));
        // 週六下午 → 週五
        assert_eq!(target_date(at(2024, 1, 13, 15, 0), 0), day(2024, 1, 12));
        // 週一清晨 → 上週五
        assert_eq!(target_date(at(2024, 1, 15, 7, 0), 0), day(2024, 1, 12));
    }

    #[test]
    fn test_target_date_days_back() {
        assert_eq!(target_date(at(2024, 1, 17, 10, 0), 1), day(2024, 1, 16));
        assert_eq!(target_date(at(2024, 1, 16, 10, 0), 1), day(2024, 1, 15));
        assert_eq!(target_date(at(2024, 1, 16, 10, 0), 2), day(2024, 1, 12));
    }

    #[test]
    fn test_target_dates_are_deduplicated() {
        // 週日：往回 0、1、2 天都落在週五
        let dates = target_dates(at(2024, 1, 14, 12, 0), 0, 4);
        assert_eq!(dates, vec!["20240112".to_string(), "20240111".to_string()]);
    }

    #[test]
    fn test_huge_windows_are_capped() {
        let now = at(2024, 1, 17, 10, 0);
        assert_eq!(target_date(now, u32::MAX), target_date(now, MAX_DAYS_BACK));

        let dates = target_dates(now, u32::MAX, u32::MAX);
        assert!(!dates.is_empty());
        assert!(dates.len() <= MAX_DAYS_SEARCH as usize);
    }

    #[test]
    fn test_trading_time_windows() {
        assert!(is_trading_time(at(2024, 1, 15, 9, 15)));
        assert!(is_trading_time(at(2024, 1, 15, 11, 30)));
        assert!(!is_trading_time(at(2024, 1, 15, 12, 0)));
        assert!(is_trading_time(at(2024, 1, 15, 13, 0)));
        assert!(is_trading_time(at(2024, 1, 15, 15, 0)));
        assert!(!is_trading_time(at(2024, 1, 15, 15, 1)));
        assert!(!is_trading_time(at(2024, 1, 13, 10, 0)));
    }
}
