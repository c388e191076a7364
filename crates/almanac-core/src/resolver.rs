use std::cmp::Ordering;

use serde::Serialize;
use tracing::{debug, warn};

use crate::category::SeasonalCategory;
use crate::error::{Endpoint, ScheduleWarning};
use crate::window::{DateWindow, MonthDay};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    AlwaysOn,
    InSeason,
    OutOfSeason,
    Disabled,
    /// Seasonal, but the window is missing or cannot be evaluated.
    Unresolvable,
}

impl Activation {
    pub fn is_active(self) -> bool {
        matches!(self, Activation::AlwaysOn | Activation::InSeason)
    }

    pub fn label(self) -> &'static str {
        match self {
            Activation::AlwaysOn | Activation::InSeason => "Active",
            Activation::OutOfSeason => "Out of season",
            Activation::Disabled => "Disabled",
            Activation::Unresolvable => "Inactive",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Resolution<'a> {
    pub category: &'a SeasonalCategory,
    pub activation: Activation,
    pub warnings: Vec<ScheduleWarning>,
}

impl Resolution<'_> {
    pub fn id(&self) -> u64 {
        self.category.id
    }

    pub fn is_active(&self) -> bool {
        self.activation.is_active()
    }

    fn rank(&self) -> u8 {
        match self.activation {
            Activation::InSeason => 0,
            Activation::AlwaysOn => 1,
            _ => 2,
        }
    }
}

/// Decides which categories are in effect on `today` and returns them in
/// display order: active seasonal by priority, then the remaining active
/// categories by priority, then everything inactive by name.
#[tracing::instrument(skip_all, fields(today = %today, count = categories.len()))]
pub fn resolve(today: MonthDay, categories: &[SeasonalCategory]) -> Vec<Resolution<'_>> {
    let mut resolved: Vec<Resolution<'_>> = categories
        .iter()
        .map(|category| resolve_one(today, category))
        .collect();

    resolved.sort_by(compare_for_display);

    debug!(
        active = resolved.iter().filter(|r| r.is_active()).count(),
        "resolved category activation"
    );
    resolved
}

fn resolve_one(today: MonthDay, category: &SeasonalCategory) -> Resolution<'_> {
    let mut warnings = Vec::new();

    // Data problems are reported whether or not the category is enabled.
    if category.is_seasonal {
        match category.window {
            None => warnings.push(ScheduleWarning::MissingWindow),
            Some(window) => warnings.extend(structural_warnings(&window)),
        }
    } else if category.window.is_some() {
        warnings.push(ScheduleWarning::UnexpectedWindow);
    }

    let activation = if !category.is_active {
        Activation::Disabled
    } else if !category.is_seasonal {
        Activation::AlwaysOn
    } else if warnings.iter().any(ScheduleWarning::blocks_activation) {
        Activation::Unresolvable
    } else if category.window.is_some_and(|window| window.contains(today)) {
        Activation::InSeason
    } else {
        Activation::OutOfSeason
    };

    if activation == Activation::Unresolvable {
        warn!(
            category_id = category.id,
            name = %category.name,
            "seasonal category has no usable date range"
        );
    }
    debug!(
        category_id = category.id,
        activation = ?activation,
        "resolved category"
    );

    Resolution {
        category,
        activation,
        warnings,
    }
}

fn structural_warnings(window: &DateWindow) -> Vec<ScheduleWarning> {
    [(Endpoint::Start, window.start), (Endpoint::End, window.end)]
        .into_iter()
        .filter(|(_, date)| !date.is_structurally_valid())
        .map(|(endpoint, date)| ScheduleWarning::InvalidWindow {
            endpoint,
            month: date.month,
            day: date.day,
        })
        .collect()
}

fn compare_for_display(a: &Resolution<'_>, b: &Resolution<'_>) -> Ordering {
    let rank = a.rank().cmp(&b.rank());
    if rank != Ordering::Equal {
        return rank;
    }

    let priority = if a.is_active() {
        a.category
            .effective_priority()
            .cmp(&b.category.effective_priority())
    } else {
        Ordering::Equal
    };

    priority
        .then_with(|| a.category.name.cmp(&b.category.name))
        .then_with(|| a.category.id.cmp(&b.category.id))
}

#[cfg(test)]
mod tests {
    use super::{Activation, resolve};
    use crate::category::SeasonalCategory;
    use crate::error::ScheduleWarning;
    use crate::window::{DateWindow, MonthDay};

    fn seasonal(id: u64, name: &str, window: (u8, u8, u8, u8), priority: i64) -> SeasonalCategory {
        SeasonalCategory::seasonal(
            id,
            name,
            Some(DateWindow::from_pairs((window.0, window.1), (window.2, window.3))),
            Some(priority),
        )
    }

    #[test]
    fn disabled_always_loses() {
        let mut category = seasonal(1, "Year round", (1, 1, 12, 31), 1);
        category.is_active = false;
        for month in 1..=12 {
            let resolved = resolve(MonthDay::new(month, 10), std::slice::from_ref(&category));
            assert_eq!(resolved[0].activation, Activation::Disabled);
            assert!(!resolved[0].is_active());
        }
    }

    #[test]
    fn non_seasonal_is_always_on() {
        let category = SeasonalCategory::always_on(2, "General");
        for month in 1..=12 {
            for day in [1, 15, 31] {
                let resolved = resolve(MonthDay::new(month, day), std::slice::from_ref(&category));
                assert_eq!(resolved[0].activation, Activation::AlwaysOn);
                assert!(resolved[0].warnings.is_empty());
            }
        }
    }

    #[test]
    fn missing_window_is_inactive_with_warning() {
        let category = SeasonalCategory::seasonal(3, "Broken", None, Some(5));
        let resolved = resolve(MonthDay::new(6, 1), std::slice::from_ref(&category));
        assert_eq!(resolved[0].activation, Activation::Unresolvable);
        assert_eq!(resolved[0].warnings, vec![ScheduleWarning::MissingWindow]);
    }

    #[test]
    fn impossible_window_is_inactive_with_warning() {
        let category = seasonal(4, "Nonsense", (14, 1, 2, 40), 5);
        let resolved = resolve(MonthDay::new(2, 10), std::slice::from_ref(&category));
        assert_eq!(resolved[0].activation, Activation::Unresolvable);
        assert_eq!(resolved[0].warnings.len(), 2);
    }

    #[test]
    fn disabled_seasonal_without_window_still_warns() {
        let mut category = SeasonalCategory::seasonal(6, "Retired season", None, Some(5));
        category.is_active = false;
        let resolved = resolve(MonthDay::new(6, 1), std::slice::from_ref(&category));
        assert_eq!(resolved[0].activation, Activation::Disabled);
        assert_eq!(resolved[0].warnings, vec![ScheduleWarning::MissingWindow]);
    }

    #[test]
    fn stray_window_on_plain_category_is_ignored() {
        let mut category = SeasonalCategory::always_on(5, "Plain");
        category.window = Some(DateWindow::from_pairs((7, 1), (7, 2)));
        let resolved = resolve(MonthDay::new(1, 1), std::slice::from_ref(&category));
        assert_eq!(resolved[0].activation, Activation::AlwaysOn);
        assert_eq!(resolved[0].warnings, vec![ScheduleWarning::UnexpectedWindow]);
    }

    #[test]
    fn orders_by_priority_then_name() {
        let categories = vec![
            SeasonalCategory::always_on(10, "Alpha"),
            seasonal(11, "Late", (12, 1, 1, 31), 90),
            seasonal(12, "Early", (12, 1, 1, 31), 10),
            seasonal(13, "Summer", (6, 1, 8, 31), 1),
            seasonal(14, "Bravo", (12, 20, 12, 31), 10),
        ];
        let resolved = resolve(MonthDay::new(12, 24), &categories);
        let ids: Vec<u64> = resolved.iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec![14, 12, 11, 10, 13]);
        assert_eq!(resolved[4].activation, Activation::OutOfSeason);
    }
}
