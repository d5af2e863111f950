#![allow(dead_code)]
//! Shared fixtures for the integration tests.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Weekday};

use togethercal_test::component::store::{CalendarEvent, EventDetails};

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid fixture date")
}

pub fn time(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).expect("valid fixture time")
}

pub fn datetime(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    date(year, month, day).and_time(time(hour, minute))
}

pub fn holiday(title: &str, start: NaiveDate, end: NaiveDate) -> CalendarEvent {
    CalendarEvent::new(
        title,
        None,
        EventDetails::Holiday {
            source_url: None,
            uid: None,
            start_date: start,
            end_date: end,
        },
    )
}

pub fn special_day(title: &str, month: u32, day: u32) -> CalendarEvent {
    CalendarEvent::new(title, None, EventDetails::SpecialDay { month, day })
}

pub fn weekly(
    title: &str,
    start: NaiveDate,
    end: NaiveDate,
    weekday: Weekday,
    start_time: NaiveTime,
    end_time: NaiveTime,
    include_holidays: bool,
) -> CalendarEvent {
    CalendarEvent::new(
        title,
        None,
        EventDetails::WeeklyActivity {
            start_date: start,
            end_date: end,
            weekday,
            start_time,
            end_time,
            include_holidays,
        },
    )
}

pub fn one_time(title: &str, start: NaiveDateTime, end: Option<NaiveDateTime>) -> CalendarEvent {
    CalendarEvent::new(title, None, EventDetails::OneTimeEvent { start, end })
}
