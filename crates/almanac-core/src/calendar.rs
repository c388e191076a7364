use crate::error::{
  Endpoint,
  ScheduleWarning
};
use crate::window::{
  DateWindow,
  MonthDay
};

/// Checks windows against the day counts of
/// one explicit reference year. The year is
/// always supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarValidator {
  reference_year: i32
}

impl CalendarValidator {
  pub const fn new(
    reference_year: i32
  ) -> Self {
    Self { reference_year }
  }

  pub fn reference_year(&self) -> i32 {
    self.reference_year
  }

  #[must_use]
  pub fn validate(
    &self,
    window: &DateWindow
  ) -> Vec<ScheduleWarning> {
    let mut warnings = Vec::new();
    self.check_endpoint(
      Endpoint::Start,
      window.start,
      &mut warnings
    );
    self.check_endpoint(
      Endpoint::End,
      window.end,
      &mut warnings
    );
    warnings
  }

  fn check_endpoint(
    &self,
    endpoint: Endpoint,
    date: MonthDay,
    warnings: &mut Vec<ScheduleWarning>
  ) {
    if !date.is_structurally_valid() {
      warnings.push(
        ScheduleWarning::InvalidWindow {
          endpoint,
          month: date.month,
          day: date.day
        }
      );
      return;
    }

    let max_day = days_in_month(
      self.reference_year,
      date.month
    )
    .unwrap_or(31);

    if date.day > max_day {
      warnings.push(
        ScheduleWarning::CalendarInconsistency {
          endpoint,
          month: date.month,
          day: date.day,
          max_day
        }
      );
    }

    if date.month == 2
      && date.day == 29
      && !is_leap_year(self.reference_year)
    {
      warnings.push(
        ScheduleWarning::LeapDay {
          endpoint,
          year: self.reference_year
        }
      );
    }
  }
}

#[must_use]
pub fn is_leap_year(year: i32) -> bool {
  (year % 4 == 0 && year % 100 != 0)
    || year % 400 == 0
}

#[must_use]
pub fn days_in_month(
  year: i32,
  month: u8
) -> Option<u8> {
  match month {
    | 1 | 3 | 5 | 7 | 8 | 10 | 12 => {
      Some(31)
    }
    | 4 | 6 | 9 | 11 => Some(30),
    | 2 if is_leap_year(year) => {
      Some(29)
    }
    | 2 => Some(28),
    | _ => None
  }
}
