use crate::models::{
    CalendarCell, CalendarResponse, DayPoint, DayState, DayStatus, MonthlySummary, Profile,
    StatsResponse, date_key, parse_date_key,
};
use chrono::{Datelike, Duration, Local, NaiveDate};

const WEEK_DAYS: i64 = 7;
const CHART_DAYS: i64 = 14;
const CALENDAR_CELLS: i64 = 42;

pub fn day_status(profile: &Profile, key: &str) -> DayStatus {
    let total = profile.habits.len();
    if total == 0 {
        return DayStatus {
            label: "No habits".to_string(),
            percent: 0.0,
            color_hint: "#777",
            state: DayState::NoHabits,
        };
    }

    let done = profile
        .habits
        .iter()
        .filter(|habit| profile.is_done(key, habit))
        .count();
    let percent = done as f64 / total as f64;

    if done == total {
        DayStatus {
            label: "Complete".to_string(),
            percent,
            color_hint: "#2f4a3a",
            state: DayState::Done,
        }
    } else if done > 0 {
        DayStatus {
            label: format!("Partial ({done}/{total})"),
            percent,
            color_hint: "#a17417",
            state: DayState::Partial,
        }
    } else {
        DayStatus {
            label: "Not complete".to_string(),
            percent,
            color_hint: "#8d4c4c",
            state: DayState::None,
        }
    }
}

fn is_complete(profile: &Profile, date: NaiveDate) -> bool {
    day_status(profile, &date_key(date)).state == DayState::Done
}

pub fn current_streak(profile: &Profile) -> u32 {
    current_streak_at(Local::now().date_naive(), profile)
}

/// Fully complete days walking back from `today`, inclusive.
pub fn current_streak_at(today: NaiveDate, profile: &Profile) -> u32 {
    let mut count = 0;
    let mut date = Some(today);
    while let Some(day) = date.filter(|day| is_complete(profile, *day)) {
        count += 1;
        date = day.pred_opt();
    }
    count
}

/// Longest run of complete, one-day-apart dates among the recorded days.
///
/// Only dates present in `completions` are visited, so an untouched day
/// between two complete ones shows up as a gap of two days.
pub fn longest_streak(profile: &Profile) -> u32 {
    let mut longest = 0;
    let mut current = 0;
    let mut prev: Option<NaiveDate> = None;

    let complete_days = profile
        .completions
        .keys()
        .filter_map(|key| parse_date_key(key))
        .filter(|date| is_complete(profile, *date));

    for date in complete_days {
        current = match prev {
            Some(prev) if (date - prev).num_days() == 1 => current + 1,
            _ => 1,
        };
        prev = Some(date);
        longest = longest.max(current);
    }

    longest
}

fn day_points(today: NaiveDate, profile: &Profile, days: i64) -> Vec<DayPoint> {
    (0..days)
        .rev()
        .map(|offset| {
            let key = date_key(today - Duration::days(offset));
            let status = day_status(profile, &key);
            DayPoint {
                date: key,
                percent: status.percent,
                state: status.state,
            }
        })
        .collect()
}

/// The last seven days, oldest first.
pub fn weekly_at(today: NaiveDate, profile: &Profile) -> Vec<DayPoint> {
    day_points(today, profile, WEEK_DAYS)
}

/// The last fourteen days, oldest first.
pub fn progress_chart_at(today: NaiveDate, profile: &Profile) -> Vec<DayPoint> {
    day_points(today, profile, CHART_DAYS)
}

/// Parses `YYYY-MM`.
pub fn parse_month(value: &str) -> Option<(i32, u32)> {
    let (year, month) = value.split_once('-')?;
    if year.len() != 4 || month.len() != 2 {
        return None;
    }
    let year = year.parse().ok()?;
    let month = month.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, 1).map(|_| (year, month))
}

fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((first, next))
}

fn month_label(year: i32, month: u32) -> String {
    format!("{year:04}-{month:02}")
}

pub fn monthly_summary_at(
    today: NaiveDate,
    profile: &Profile,
    year: i32,
    month: u32,
) -> Option<MonthlySummary> {
    let (first, next) = month_bounds(year, month)?;

    let mut days_completed = 0;
    let mut partial_days = 0;
    let mut no_progress_days = 0;
    for date in first.iter_days().take_while(|date| *date < next) {
        match day_status(profile, &date_key(date)).state {
            DayState::Done => days_completed += 1,
            DayState::Partial => partial_days += 1,
            DayState::None | DayState::NoHabits => no_progress_days += 1,
        }
    }

    Some(MonthlySummary {
        month: month_label(year, month),
        days_completed,
        partial_days,
        no_progress_days,
        current_streak: current_streak_at(today, profile),
        longest_streak: longest_streak(profile),
    })
}

/// Six Sunday-first weeks covering the month. Cells outside it are muted.
pub fn calendar_month(profile: &Profile, year: i32, month: u32) -> Option<CalendarResponse> {
    let (first, _) = month_bounds(year, month)?;
    let start = first - Duration::days(i64::from(first.weekday().num_days_from_sunday()));

    let cells = (0..CALENDAR_CELLS)
        .map(|offset| {
            let date = start + Duration::days(offset);
            let key = date_key(date);
            CalendarCell {
                day: date.day(),
                muted: date.month() != month,
                state: day_status(profile, &key).state,
                ticks: profile
                    .habits
                    .iter()
                    .map(|habit| profile.is_done(&key, habit))
                    .collect(),
                date: key,
            }
        })
        .collect();

    Some(CalendarResponse {
        month: month_label(year, month),
        cells,
    })
}

pub fn build_stats(profile: &Profile, month: Option<(i32, u32)>) -> Option<StatsResponse> {
    let today = Local::now().date_naive();
    let (year, month) = month.unwrap_or((today.year(), today.month()));
    build_stats_at(today, profile, year, month)
}

/// `None` when `year`/`month` is not a calendar month.
pub fn build_stats_at(
    today: NaiveDate,
    profile: &Profile,
    year: i32,
    month: u32,
) -> Option<StatsResponse> {
    Some(StatsResponse {
        weekly: weekly_at(today, profile),
        chart: progress_chart_at(today, profile),
        monthly: monthly_summary_at(today, profile, year, month)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn profile(habits: &[&str]) -> Profile {
        Profile {
            habits: habits.iter().map(|habit| habit.to_string()).collect(),
            completions: Default::default(),
        }
    }

    fn complete(profile: &mut Profile, day: NaiveDate) {
        let habits = profile.habits.clone();
        let record = profile.ensure_day(&date_key(day));
        for habit in habits {
            record.insert(habit, true);
        }
    }

    #[test]
    fn status_buckets_by_completed_share() {
        let mut p = profile(&["Run", "Swim"]);
        let key = "2024-01-01";
        assert_eq!(day_status(&p, key).state, DayState::None);
        assert_eq!(day_status(&p, key).label, "Not complete");

        p.ensure_day(key).insert("Run".into(), true);
        let partial = day_status(&p, key);
        assert_eq!(partial.state, DayState::Partial);
        assert_eq!(partial.label, "Partial (1/2)");
        assert_eq!(partial.percent, 0.5);

        p.ensure_day(key).insert("Swim".into(), true);
        let done = day_status(&p, key);
        assert_eq!(done.state, DayState::Done);
        assert_eq!(done.percent, 1.0);
    }

    #[test]
    fn no_habits_is_its_own_state_whatever_was_recorded() {
        let mut p = profile(&[]);
        p.ensure_day("2024-01-01").insert("Run".into(), true);
        let status = day_status(&p, "2024-01-01");
        assert_eq!(status.state, DayState::NoHabits);
        assert_eq!(status.percent, 0.0);
    }

    #[test]
    fn flags_for_removed_habits_do_not_count() {
        let mut p = profile(&["Run"]);
        let record = p.ensure_day("2024-01-01");
        record.insert("Ghost".into(), true);
        record.insert("Run".into(), false);
        let status = day_status(&p, "2024-01-01");
        assert!((0.0..=1.0).contains(&status.percent));
        assert_eq!(status.state, DayState::None);
    }

    #[test]
    fn current_streak_is_zero_when_today_is_incomplete() {
        let today = date(2024, 3, 10);
        let mut p = profile(&["Run"]);
        complete(&mut p, today - Duration::days(1));
        complete(&mut p, today - Duration::days(2));
        assert_eq!(current_streak_at(today, &p), 0);
    }

    #[test]
    fn current_streak_counts_consecutive_days_ending_today() {
        let today = date(2024, 3, 1);
        let mut p = profile(&["Run"]);
        for offset in 0..5 {
            complete(&mut p, today - Duration::days(offset));
        }
        complete(&mut p, today - Duration::days(7));
        assert_eq!(current_streak_at(today, &p), 5);
    }

    #[test]
    fn current_streak_with_no_habits_is_zero() {
        assert_eq!(current_streak_at(date(2024, 1, 1), &profile(&[])), 0);
    }

    #[test]
    fn longest_streak_breaks_on_calendar_gaps() {
        let mut p = profile(&["Run"]);
        for day in [1, 2, 3, 5] {
            complete(&mut p, date(2024, 1, day));
        }
        assert_eq!(longest_streak(&p), 3);
    }

    #[test]
    fn longest_streak_breaks_on_recorded_incomplete_day() {
        let mut p = profile(&["Run", "Swim"]);
        complete(&mut p, date(2024, 1, 1));
        p.ensure_day("2024-01-02").insert("Run".into(), true);
        complete(&mut p, date(2024, 1, 3));
        complete(&mut p, date(2024, 1, 4));
        assert_eq!(longest_streak(&p), 2);
    }

    #[test]
    fn longest_streak_spans_month_boundaries() {
        let mut p = profile(&["Run"]);
        for day in [date(2024, 1, 31), date(2024, 2, 1), date(2024, 2, 2)] {
            complete(&mut p, day);
        }
        assert_eq!(longest_streak(&p), 3);
        assert_eq!(longest_streak(&profile(&["Run"])), 0);
    }

    #[test]
    fn weekly_and_chart_end_today_oldest_first() {
        let today = date(2026, 1, 5);
        let mut p = profile(&["Run"]);
        complete(&mut p, today);

        let weekly = weekly_at(today, &p);
        assert_eq!(weekly.len(), 7);
        assert_eq!(weekly[0].date, "2025-12-30");
        assert_eq!(weekly[6].date, "2026-01-05");
        assert_eq!(weekly[6].state, DayState::Done);

        let chart = progress_chart_at(today, &p);
        assert_eq!(chart.len(), 14);
        assert_eq!(chart[13].percent, 1.0);
        assert_eq!(chart[0].percent, 0.0);
    }

    #[test]
    fn monthly_summary_counts_every_day_of_the_month() {
        let mut p = profile(&["Run", "Swim"]);
        complete(&mut p, date(2024, 2, 1));
        complete(&mut p, date(2024, 2, 2));
        p.ensure_day("2024-02-10").insert("Run".into(), true);

        let summary = monthly_summary_at(date(2024, 2, 2), &p, 2024, 2).unwrap();
        assert_eq!(summary.month, "2024-02");
        assert_eq!(summary.days_completed, 2);
        assert_eq!(summary.partial_days, 1);
        assert_eq!(summary.no_progress_days, 26);
        assert_eq!(summary.current_streak, 2);
        assert_eq!(summary.longest_streak, 2);
    }

    #[test]
    fn calendar_is_six_sunday_first_weeks() {
        let mut p = profile(&["Run", "Swim"]);
        p.ensure_day("2024-05-01").insert("Swim".into(), true);

        let calendar = calendar_month(&p, 2024, 5).unwrap();
        assert_eq!(calendar.cells.len(), 42);
        // 2024-05-01 is a Wednesday
        assert_eq!(calendar.cells[0].date, "2024-04-28");
        assert!(calendar.cells[0].muted);
        let first = &calendar.cells[3];
        assert_eq!(first.date, "2024-05-01");
        assert_eq!(first.day, 1);
        assert!(!first.muted);
        assert_eq!(first.ticks, vec![false, true]);
        assert_eq!(first.state, DayState::Partial);
        assert!(calendar.cells[41].muted);
    }

    #[test]
    fn month_parsing_is_strict() {
        assert_eq!(parse_month("2024-05"), Some((2024, 5)));
        assert_eq!(parse_month("2024-13"), None);
        assert_eq!(parse_month("2024-5"), None);
        assert_eq!(parse_month("May"), None);
        assert!(calendar_month(&profile(&[]), 2024, 0).is_none());
    }

    #[test]
    fn stats_series_lengths() {
        let stats = build_stats_at(date(2026, 1, 5), &profile(&["Run"]), 2026, 1).unwrap();
        assert_eq!(stats.weekly.len(), 7);
        assert_eq!(stats.chart.len(), 14);
        assert_eq!(stats.monthly.no_progress_days, 31);
        assert!(build_stats_at(date(2026, 1, 5), &profile(&["Run"]), 2026, 13).is_none());
    }
}
