use serde::{Deserialize, Serialize};

use crate::calendar::CalendarValidator;
use crate::error::{DateError, EditError, ScheduleWarning};
use crate::window::{DateWindow, MonthDay};

pub const MIN_PRIORITY: i64 = 1;
pub const MAX_PRIORITY: i64 = 100;
pub const DEFAULT_PRIORITY: u8 = 100;

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeasonalCategory {
    pub id: u64,

    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default, rename = "seasonal")]
    pub is_seasonal: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window: Option<DateWindow>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,

    #[serde(default = "default_active", rename = "active")]
    pub is_active: bool,
}

impl SeasonalCategory {
    pub fn always_on(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            is_seasonal: false,
            window: None,
            priority: None,
            is_active: true,
        }
    }

    pub fn seasonal(
        id: u64,
        name: impl Into<String>,
        window: Option<DateWindow>,
        priority: Option<i64>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            is_seasonal: true,
            window,
            priority,
            is_active: true,
        }
    }

    pub fn is_always_active(&self) -> bool {
        !self.is_seasonal && self.is_active
    }

    /// Stored priority when it is within 1-100, otherwise the default of 100.
    pub fn effective_priority(&self) -> u8 {
        match self.priority {
            Some(value) if (MIN_PRIORITY..=MAX_PRIORITY).contains(&value) => {
                u8::try_from(value).unwrap_or(DEFAULT_PRIORITY)
            }
            _ => DEFAULT_PRIORITY,
        }
    }

    pub fn priority_warning(&self) -> Option<ScheduleWarning> {
        self.priority
            .filter(|value| !(MIN_PRIORITY..=MAX_PRIORITY).contains(value))
            .map(|value| ScheduleWarning::PriorityOutOfRange { value })
    }
}

/// What a date range would look like if the edit were saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WindowPreview {
    pub window: DateWindow,
    pub label: String,
    pub spans_new_year: bool,
    pub in_season: bool,
    pub warnings: Vec<ScheduleWarning>,
}

/// A category as it would be stored after an edit, with the preview of its
/// new range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryEdit {
    pub category: SeasonalCategory,
    pub preview: WindowPreview,
}

/// Caller-owned state for editing one category's date range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    category_id: u64,
    start: String,
    end: String,
}

impl EditSession {
    pub fn begin(category: &SeasonalCategory) -> Self {
        let (start, end) = category
            .window
            .map(|w| (w.start.to_string(), w.end.to_string()))
            .unwrap_or_default();
        Self {
            category_id: category.id,
            start,
            end,
        }
    }

    pub fn new(category_id: u64, start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            category_id,
            start: start.into(),
            end: end.into(),
        }
    }

    pub fn category_id(&self) -> u64 {
        self.category_id
    }

    pub fn start_text(&self) -> &str {
        &self.start
    }

    pub fn end_text(&self) -> &str {
        &self.end
    }

    pub fn set_start(&mut self, text: impl Into<String>) {
        self.start = text.into();
    }

    pub fn set_end(&mut self, text: impl Into<String>) {
        self.end = text.into();
    }

    pub fn window(&self) -> Result<DateWindow, DateError> {
        DateWindow::parse(&self.start, &self.end)
    }

    pub fn preview(&self, today: MonthDay, reference_year: i32) -> Result<WindowPreview, DateError> {
        let window = self.window()?;
        Ok(WindowPreview {
            window,
            label: window.format(),
            spans_new_year: window.spans_year_boundary(),
            in_season: window.contains(today),
            warnings: CalendarValidator::new(reference_year).validate(&window),
        })
    }

    /// Returns an updated copy; the caller decides whether to store it.
    pub fn commit(&self, category: &SeasonalCategory) -> Result<SeasonalCategory, EditError> {
        if category.id != self.category_id {
            return Err(EditError::WrongCategory {
                session: self.category_id,
                category: category.id,
            });
        }
        let window = self.window()?;
        Ok(SeasonalCategory {
            is_seasonal: true,
            window: Some(window),
            ..category.clone()
        })
    }

    pub fn apply(
        &self,
        category: &SeasonalCategory,
        today: MonthDay,
        reference_year: i32,
    ) -> Result<CategoryEdit, EditError> {
        let category = self.commit(category)?;
        let preview = self.preview(today, reference_year)?;
        Ok(CategoryEdit { category, preview })
    }
}
