use crate::date::DayKey;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: String,
    pub name: String,
    pub calories: f64,
}

/// Which list of a day an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    #[serde(rename = "meals")]
    Meal,
    #[serde(rename = "workouts")]
    Workout,
}

impl EntryKind {
    pub fn path_segment(self) -> &'static str {
        match self {
            EntryKind::Meal => "meals",
            EntryKind::Workout => "workouts",
        }
    }

    pub fn csv_label(self) -> &'static str {
        match self {
            EntryKind::Meal => "meal",
            EntryKind::Workout => "workout",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DayRecord {
    #[serde(default)]
    pub meals: Vec<Entry>,
    #[serde(default)]
    pub workouts: Vec<Entry>,
}

impl DayRecord {
    pub fn list(&self, kind: EntryKind) -> &[Entry] {
        match kind {
            EntryKind::Meal => &self.meals,
            EntryKind::Workout => &self.workouts,
        }
    }

    pub fn list_mut(&mut self, kind: EntryKind) -> &mut Vec<Entry> {
        match kind {
            EntryKind::Meal => &mut self.meals,
            EntryKind::Workout => &mut self.workouts,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.meals.is_empty() && self.workouts.is_empty()
    }

    pub fn totals(&self) -> Totals {
        let intake = sum_calories(&self.meals);
        let burn = sum_calories(&self.workouts);
        Totals {
            intake: round_calories(intake),
            burn: round_calories(burn),
            net: round_calories(intake - burn),
        }
    }
}

pub fn sum_calories(entries: &[Entry]) -> f64 {
    entries
        .iter()
        .map(|entry| if entry.calories.is_finite() { entry.calories } else { 0.0 })
        .sum()
}

/// Nearest whole calorie, halves rounded up (so -2.5 becomes -2).
pub fn round_calories(value: f64) -> i64 {
    if !value.is_finite() {
        return 0;
    }
    let floor = value.floor();
    let rounded = if value - floor >= 0.5 { floor + 1.0 } else { floor };
    rounded as i64
}

/// Display totals, already rounded to whole calories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Totals {
    pub intake: i64,
    pub burn: i64,
    pub net: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySummary {
    pub date: DayKey,
    pub meals: Vec<Entry>,
    pub workouts: Vec<Entry>,
    pub totals: Totals,
    pub meal_count: usize,
    pub workout_count: usize,
}

/// Calories as submitted: a JSON number from the API or raw text from a form.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CaloriesInput {
    Number(f64),
    Text(String),
}

impl CaloriesInput {
    pub fn value(&self) -> Option<f64> {
        match self {
            CaloriesInput::Number(value) => Some(*value),
            CaloriesInput::Text(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    return None;
                }
                trimmed.parse::<f64>().ok()
            }
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct EntryInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub calories: Option<CaloriesInput>,
}

#[derive(Debug, Deserialize)]
pub struct DateQuery {
    pub date: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AddEntryResponse {
    pub entry: Option<Entry>,
    pub day: DaySummary,
}
