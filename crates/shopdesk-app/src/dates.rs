// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use time::Date;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

const ISO_DATE: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

pub fn iso_date(date: Date) -> String {
    date.format(ISO_DATE).unwrap_or_else(|_| date.to_string())
}

pub fn parse_iso_date(input: &str) -> Option<Date> {
    Date::parse(input.trim(), ISO_DATE).ok()
}

#[cfg(test)]
mod tests {
    use super::{iso_date, parse_iso_date};
    use time::{Date, Month};

    #[test]
    fn iso_date_pads_fields() {
        let date = Date::from_calendar_date(2025, Month::March, 7).expect("valid date");
        assert_eq!(iso_date(date), "2025-03-07");
        assert_eq!(parse_iso_date(&iso_date(date)), Some(date));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(parse_iso_date("2025-02-30").is_none());
        assert!(parse_iso_date("07/03/2025").is_none());
        assert!(parse_iso_date(" 2025-03-07 ").is_some());
    }
}
