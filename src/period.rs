//! Period presets for filtering and comparing expense aggregates.
//!
//! A period resolves to an inclusive date range for "today" plus the
//! equivalent previous range, so the dashboard can compare the current
//! totals against the prior period.

use serde::Deserialize;
use time::{Date, Duration, Month};

/// A named date range used to filter aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Period {
    Day,
    Week,
    Month,
    Year,
    All,
}

/// An inclusive date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodRange {
    pub start: Date,
    pub end: Date,
}

/// The current and previous date ranges for a period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodDates {
    pub current: PeriodRange,
    pub previous: PeriodRange,
}

impl Period {
    pub fn default_preset() -> Self {
        Self::Month
    }

    pub fn as_query_value(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
            Self::All => "all",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Day => "Today",
            Self::Week => "This Week",
            Self::Month => "This Month",
            Self::Year => "This Year",
            Self::All => "Last 30 Days",
        }
    }

    pub fn previous_label(self) -> &'static str {
        match self {
            Self::Day => "Yesterday",
            Self::Week => "Previous Week",
            Self::Month => "Previous Month",
            Self::Year => "Previous Year",
            Self::All => "Previous 30 Days",
        }
    }

    /// Resolve the period into its current and previous inclusive date
    /// ranges, anchored at `today`.
    ///
    /// Weeks run Monday to Sunday. The month and year ranges end at `today`
    /// while their previous ranges cover the whole prior month or year.
    pub fn date_ranges(self, today: Date) -> PeriodDates {
        match self {
            Self::Day => {
                let yesterday = today - Duration::days(1);

                PeriodDates {
                    current: PeriodRange {
                        start: today,
                        end: today,
                    },
                    previous: PeriodRange {
                        start: yesterday,
                        end: yesterday,
                    },
                }
            }
            Self::Week => {
                let days_from_monday = today.weekday().number_days_from_monday() as i64;
                let start_of_week = today - Duration::days(days_from_monday);

                PeriodDates {
                    current: PeriodRange {
                        start: start_of_week,
                        end: start_of_week + Duration::days(6),
                    },
                    previous: PeriodRange {
                        start: start_of_week - Duration::days(7),
                        end: start_of_week - Duration::days(1),
                    },
                }
            }
            Self::Month => {
                let start_of_month = today.replace_day(1).unwrap();
                let end_of_previous_month = start_of_month - Duration::days(1);

                PeriodDates {
                    current: PeriodRange {
                        start: start_of_month,
                        end: today,
                    },
                    previous: PeriodRange {
                        start: end_of_previous_month.replace_day(1).unwrap(),
                        end: end_of_previous_month,
                    },
                }
            }
            Self::Year => {
                let start_of_year = Date::from_calendar_date(today.year(), Month::January, 1)
                    .expect("January 1 is a valid date in every year");
                let previous_year = today.year() - 1;

                PeriodDates {
                    current: PeriodRange {
                        start: start_of_year,
                        end: today,
                    },
                    previous: PeriodRange {
                        start: Date::from_calendar_date(previous_year, Month::January, 1)
                            .expect("January 1 is a valid date in every year"),
                        end: Date::from_calendar_date(previous_year, Month::December, 31)
                            .expect("December 31 is a valid date in every year"),
                    },
                }
            }
            Self::All => PeriodDates {
                current: PeriodRange {
                    start: today - Duration::days(30),
                    end: today,
                },
                previous: PeriodRange {
                    start: today - Duration::days(60),
                    end: today - Duration::days(31),
                },
            },
        }
    }
}

#[cfg(test)]
mod period_tests {
    use time::macros::date;

    use super::{Period, PeriodDates, PeriodRange};

    #[test]
    fn day_ranges_cover_today_and_yesterday() {
        let dates = Period::Day.date_ranges(date!(2024 - 03 - 15));

        assert_eq!(
            dates,
            PeriodDates {
                current: PeriodRange {
                    start: date!(2024 - 03 - 15),
                    end: date!(2024 - 03 - 15),
                },
                previous: PeriodRange {
                    start: date!(2024 - 03 - 14),
                    end: date!(2024 - 03 - 14),
                },
            }
        );
    }

    #[test]
    fn week_starts_on_monday() {
        // 2024-03-15 is a Friday.
        let dates = Period::Week.date_ranges(date!(2024 - 03 - 15));

        assert_eq!(dates.current.start, date!(2024 - 03 - 11));
        assert_eq!(dates.current.end, date!(2024 - 03 - 17));
        assert_eq!(dates.previous.start, date!(2024 - 03 - 04));
        assert_eq!(dates.previous.end, date!(2024 - 03 - 10));
    }

    #[test]
    fn week_on_a_monday_starts_today() {
        let dates = Period::Week.date_ranges(date!(2024 - 03 - 11));

        assert_eq!(dates.current.start, date!(2024 - 03 - 11));
    }

    #[test]
    fn month_compares_to_whole_previous_month() {
        let dates = Period::Month.date_ranges(date!(2024 - 03 - 15));

        assert_eq!(dates.current.start, date!(2024 - 03 - 01));
        assert_eq!(dates.current.end, date!(2024 - 03 - 15));
        assert_eq!(dates.previous.start, date!(2024 - 02 - 01));
        assert_eq!(dates.previous.end, date!(2024 - 02 - 29));
    }

    #[test]
    fn month_in_january_compares_to_december() {
        let dates = Period::Month.date_ranges(date!(2024 - 01 - 10));

        assert_eq!(dates.previous.start, date!(2023 - 12 - 01));
        assert_eq!(dates.previous.end, date!(2023 - 12 - 31));
    }

    #[test]
    fn year_compares_to_whole_previous_year() {
        let dates = Period::Year.date_ranges(date!(2024 - 03 - 15));

        assert_eq!(dates.current.start, date!(2024 - 01 - 01));
        assert_eq!(dates.current.end, date!(2024 - 03 - 15));
        assert_eq!(dates.previous.start, date!(2023 - 01 - 01));
        assert_eq!(dates.previous.end, date!(2023 - 12 - 31));
    }

    #[test]
    fn all_ranges_do_not_overlap() {
        let dates = Period::All.date_ranges(date!(2024 - 03 - 15));

        assert_eq!(dates.current.start, date!(2024 - 02 - 14));
        assert_eq!(dates.current.end, date!(2024 - 03 - 15));
        assert_eq!(dates.previous.end, date!(2024 - 02 - 13));
        assert_eq!(dates.previous.start, date!(2024 - 01 - 15));
    }

    #[test]
    fn deserializes_from_kebab_case() {
        #[derive(serde::Deserialize)]
        struct Query {
            period: Period,
        }

        let query: Query = serde_html_form::from_str("period=month").unwrap();

        assert_eq!(query.period, Period::Month);
    }
}
