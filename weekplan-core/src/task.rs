//! Task model: one recurring work item to be spread over the week.

use serde::{Deserialize, Serialize};

use crate::task_type::AmountRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PreferenceTag {
    /// Placed in the first pass, before every other task.
    Focus,
    WeekStart,
    WeekMiddle,
    WeekEnd,
    /// Explicit day list. Not resolved by the placement engine.
    WeekDays,
}

impl PreferenceTag {
    pub const ALL: [PreferenceTag; 5] = [
        PreferenceTag::Focus,
        PreferenceTag::WeekStart,
        PreferenceTag::WeekMiddle,
        PreferenceTag::WeekEnd,
        PreferenceTag::WeekDays,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PreferenceTag::Focus => "FOCUS",
            PreferenceTag::WeekStart => "WEEK_START",
            PreferenceTag::WeekMiddle => "WEEK_MIDDLE",
            PreferenceTag::WeekEnd => "WEEK_END",
            PreferenceTag::WeekDays => "WEEK_DAYS",
        }
    }

    pub fn parse(token: &str) -> Option<Self> {
        let token = token.trim();
        Self::ALL.into_iter().find(|t| t.as_str().eq_ignore_ascii_case(token))
    }
}

/// Day-of-week bias used when choosing slots. `Focus` is orthogonal and
/// never shows up here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayPreference {
    WeekStart,
    WeekMiddle,
    WeekEnd,
    WeekDays,
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub task_type: String,
    pub id: String,
    pub description: String,

    /// Weight for random selection among tasks of the same type.
    pub pick_up_priority: f64,

    /// How many days per week the task wants.
    pub days: AmountRange,

    /// Raw preference tokens, e.g. `["FOCUS", "WEEK_START"]`.
    pub prefs: Vec<String>,

    pub remarks: String,

    /// `google:<query>` or `ai:<prompt>`.
    pub prompt: Option<String>,
    pub prompt_result: Option<String>,
}

impl Task {
    pub fn new(
        task_type: impl Into<String>,
        id: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            task_type: task_type.into(),
            id: id.into(),
            description: description.into(),
            pick_up_priority: 1.0,
            days: AmountRange::exactly(1),
            prefs: Vec::new(),
            remarks: String::new(),
            prompt: None,
            prompt_result: None,
        }
    }

    pub fn with_priority(mut self, priority: f64) -> Self {
        self.pick_up_priority = priority;
        self
    }

    pub fn with_days(mut self, from: u32, to: u32) -> Self {
        self.days = AmountRange::new(from, to);
        self
    }

    pub fn with_preference(mut self, tag: PreferenceTag) -> Self {
        self.prefs.push(tag.as_str().to_string());
        self
    }

    pub fn with_remarks(mut self, remarks: impl Into<String>) -> Self {
        self.remarks = remarks.into();
        self
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    pub fn has_preference(&self, tag: PreferenceTag) -> bool {
        self.prefs
            .iter()
            .any(|p| PreferenceTag::parse(p) == Some(tag))
    }

    pub fn is_focus(&self) -> bool {
        self.has_preference(PreferenceTag::Focus)
    }

    /// Effective day preference. Start wins over middle, middle over end.
    pub fn day_preference(&self) -> DayPreference {
        if self.has_preference(PreferenceTag::WeekStart) {
            DayPreference::WeekStart
        } else if self.has_preference(PreferenceTag::WeekMiddle) {
            DayPreference::WeekMiddle
        } else if self.has_preference(PreferenceTag::WeekEnd) {
            DayPreference::WeekEnd
        } else if self.has_preference(PreferenceTag::WeekDays) {
            DayPreference::WeekDays
        } else {
            DayPreference::None
        }
    }
}
