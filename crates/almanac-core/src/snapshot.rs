use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use tracing::{debug, info};

use crate::calendar::CalendarValidator;
use crate::category::SeasonalCategory;
use crate::error::ScheduleWarning;
use crate::resolver::{Activation, Resolution, resolve};
use crate::window::{DateWindow, MonthDay};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryStatus {
    pub id: u64,
    pub name: String,
    pub seasonal: bool,
    pub priority: u8,
    pub active: bool,
    pub activation: Activation,
    pub status: &'static str,
    pub window: Option<DateWindow>,
    pub label: String,
    pub spans_new_year: bool,
    pub warnings: Vec<ScheduleWarning>,
}

/// Activation of a whole catalog at one point in time. Built once, read many
/// times; two builds from the same input are identical.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleSnapshot {
    as_of: MonthDay,
    reference_year: i32,
    entries: Vec<CategoryStatus>,
    active_count: usize,
    active_seasonal_count: usize,
}

impl ScheduleSnapshot {
    #[tracing::instrument(skip_all, fields(today = %today, reference_year = reference_year, count = categories.len()))]
    pub fn build(today: MonthDay, reference_year: i32, categories: &[SeasonalCategory]) -> Self {
        let validator = CalendarValidator::new(reference_year);

        let entries: Vec<CategoryStatus> = resolve(today, categories)
            .into_iter()
            .map(|resolution| status_for(resolution, &validator))
            .collect();

        let active_count = entries.iter().filter(|e| e.active).count();
        let active_seasonal_count = entries
            .iter()
            .filter(|e| e.activation == Activation::InSeason)
            .count();
        let warning_count: usize = entries.iter().map(|e| e.warnings.len()).sum();

        info!(
            active = active_count,
            seasonal = active_seasonal_count,
            warnings = warning_count,
            "built schedule snapshot"
        );

        Self {
            as_of: today,
            reference_year,
            entries,
            active_count,
            active_seasonal_count,
        }
    }

    /// Uses the date's own year as the calendar reference.
    pub fn build_for_date(date: NaiveDate, categories: &[SeasonalCategory]) -> Self {
        let today = MonthDay::new(date.month() as u8, date.day() as u8);
        Self::build(today, date.year(), categories)
    }

    pub fn as_of(&self) -> MonthDay {
        self.as_of
    }

    pub fn reference_year(&self) -> i32 {
        self.reference_year
    }

    pub fn entries(&self) -> &[CategoryStatus] {
        &self.entries
    }

    pub fn entry(&self, id: u64) -> Option<&CategoryStatus> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn is_active(&self, id: u64) -> bool {
        self.entry(id).is_some_and(|e| e.active)
    }

    /// Position of the category in display order.
    pub fn position(&self, id: u64) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id)
    }

    pub fn active_ids(&self) -> Vec<u64> {
        self.entries
            .iter()
            .filter(|e| e.active)
            .map(|e| e.id)
            .collect()
    }

    pub fn active_count(&self) -> usize {
        self.active_count
    }

    pub fn active_seasonal_count(&self) -> usize {
        self.active_seasonal_count
    }

    pub fn total(&self) -> usize {
        self.entries.len()
    }

    pub fn warning_count(&self) -> usize {
        self.entries.iter().map(|e| e.warnings.len()).sum()
    }

    pub fn summary(&self) -> String {
        format!(
            "{} of {} categories active ({} seasonal)",
            self.active_count,
            self.total(),
            self.active_seasonal_count
        )
    }
}

fn status_for(resolution: Resolution<'_>, validator: &CalendarValidator) -> CategoryStatus {
    let category = resolution.category;
    let mut warnings = resolution.warnings;

    if category.is_seasonal
        && let Some(window) = category.window
    {
        for warning in validator.validate(&window) {
            if !warnings.contains(&warning) {
                warnings.push(warning);
            }
        }
    }
    if let Some(warning) = category.priority_warning() {
        warnings.push(warning);
    }

    let window = if category.is_seasonal {
        category.window
    } else {
        None
    };
    let label = match (category.is_seasonal, window) {
        (false, _) => "Always".to_string(),
        (true, Some(window)) => window.format(),
        (true, None) => "No date range".to_string(),
    };

    if !warnings.is_empty() {
        debug!(
            category_id = category.id,
            warnings = warnings.len(),
            "category has diagnostics"
        );
    }

    CategoryStatus {
        id: category.id,
        name: category.name.clone(),
        seasonal: category.is_seasonal,
        priority: category.effective_priority(),
        active: resolution.activation.is_active(),
        activation: resolution.activation,
        status: resolution.activation.label(),
        window,
        label,
        spans_new_year: window.is_some_and(|w| w.spans_year_boundary()),
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::ScheduleSnapshot;
    use crate::category::SeasonalCategory;
    use crate::error::ScheduleWarning;
    use crate::resolver::Activation;
    use crate::window::{DateWindow, MonthDay};

    fn catalog() -> Vec<SeasonalCategory> {
        vec![
            SeasonalCategory::seasonal(
                1,
                "Christmas",
                Some(DateWindow::from_pairs((12, 1), (1, 5))),
                Some(95),
            ),
            SeasonalCategory::always_on(2, "Everyday"),
        ]
    }

    #[test]
    fn christmas_scenario() {
        let snapshot = ScheduleSnapshot::build(MonthDay::new(12, 25), 2025, &catalog());
        assert_eq!(snapshot.active_count(), 2);
        assert_eq!(snapshot.active_seasonal_count(), 1);
        assert!(snapshot.is_active(1));
        assert!(snapshot.is_active(2));
        assert_eq!(snapshot.active_ids(), vec![1, 2]);

        let christmas = snapshot.entry(1).expect("entry 1");
        assert_eq!(christmas.label, "Dec 1 - Jan 5");
        assert!(christmas.spans_new_year);
        assert_eq!(christmas.status, "Active");

        let everyday = snapshot.entry(2).expect("entry 2");
        assert_eq!(everyday.label, "Always");
        assert!(!everyday.spans_new_year);
        assert_eq!(snapshot.summary(), "2 of 2 categories active (1 seasonal)");
    }

    #[test]
    fn leap_day_depends_on_reference_year() {
        let categories = vec![SeasonalCategory::seasonal(
            9,
            "Leap",
            Some(DateWindow::from_pairs((2, 29), (3, 1))),
            None,
        )];
        let common = ScheduleSnapshot::build(MonthDay::new(3, 1), 2023, &categories);
        let entry = common.entry(9).expect("entry");
        assert!(entry.active);
        assert!(
            entry
                .warnings
                .iter()
                .any(|w| matches!(w, ScheduleWarning::LeapDay { year: 2023, .. }))
        );

        let leap = ScheduleSnapshot::build(MonthDay::new(3, 1), 2024, &categories);
        assert!(leap.entry(9).expect("entry").warnings.is_empty());
    }

    #[test]
    fn disabled_seasonal_still_reports_calendar_problems() {
        let mut category = SeasonalCategory::seasonal(
            4,
            "April",
            Some(DateWindow::from_pairs((4, 31), (5, 5))),
            Some(3),
        );
        category.is_active = false;
        let snapshot = ScheduleSnapshot::build(MonthDay::new(5, 1), 2025, &[category]);
        let entry = snapshot.entry(4).expect("entry");
        assert_eq!(entry.activation, Activation::Disabled);
        assert_eq!(entry.status, "Disabled");
        assert_eq!(entry.warnings.len(), 1);
    }

    #[test]
    fn structural_warnings_are_not_duplicated() {
        let category = SeasonalCategory::seasonal(
            5,
            "Bad",
            Some(DateWindow::from_pairs((13, 1), (1, 10))),
            Some(500),
        );
        let snapshot = ScheduleSnapshot::build(MonthDay::new(1, 1), 2025, &[category]);
        let entry = snapshot.entry(5).expect("entry");
        assert!(!entry.active);
        assert_eq!(entry.priority, 100);
        assert_eq!(
            entry.warnings,
            vec![
                ScheduleWarning::InvalidWindow {
                    endpoint: crate::error::Endpoint::Start,
                    month: 13,
                    day: 1,
                },
                ScheduleWarning::PriorityOutOfRange { value: 500 },
            ]
        );
    }

    #[test]
    fn build_for_date_uses_date_year() {
        let date = NaiveDate::from_ymd_opt(2024, 12, 31).expect("date");
        let snapshot = ScheduleSnapshot::build_for_date(date, &catalog());
        assert_eq!(snapshot.as_of(), MonthDay::new(12, 31));
        assert_eq!(snapshot.reference_year(), 2024);
        assert_eq!(snapshot.active_count(), 2);
    }

    #[test]
    fn repeated_builds_serialize_identically() {
        let categories = catalog();
        let first = serde_json::to_string(&ScheduleSnapshot::build(
            MonthDay::new(1, 3),
            2026,
            &categories,
        ))
        .expect("serialize");
        let second = serde_json::to_string(&ScheduleSnapshot::build(
            MonthDay::new(1, 3),
            2026,
            &categories,
        ))
        .expect("serialize");
        assert_eq!(first, second);
        assert!(first.contains(r#""as_of":"01-03""#));
    }
}
