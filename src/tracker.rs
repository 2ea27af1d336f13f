use crate::csv::{build_csv, CsvExport};
use crate::date::DayKey;
use crate::errors::AppError;
use crate::ids::IdGenerator;
use crate::models::{DayRecord, DaySummary, Entry, EntryKind};
use crate::storage::DayStore;
use tracing::info;

/// Largest calorie amount a single entry may carry; keeps day sums finite.
pub const MAX_ENTRY_CALORIES: f64 = 1_000_000.0;

/// Aggregates and mutates day records. Every call reads the store afresh; nothing is cached.
pub struct Tracker {
    store: Box<dyn DayStore>,
    ids: Box<dyn IdGenerator>,
}

impl Tracker {
    pub fn new(store: impl DayStore + 'static, ids: impl IdGenerator + 'static) -> Self {
        Self {
            store: Box::new(store),
            ids: Box::new(ids),
        }
    }

    pub async fn day(&self, date: DayKey) -> DaySummary {
        let record = self.store.load(date).await;
        summarize(date, record)
    }

    /// Returns `None` without touching the store when the name is blank or
    /// calories are missing, negative, not finite or above [`MAX_ENTRY_CALORIES`].
    pub async fn add_entry(
        &mut self,
        date: DayKey,
        kind: EntryKind,
        name: &str,
        calories: Option<f64>,
    ) -> Result<Option<Entry>, AppError> {
        let name = name.trim();
        let Some(calories) =
            calories.filter(|value| (0.0..=MAX_ENTRY_CALORIES).contains(value))
        else {
            return Ok(None);
        };
        if name.is_empty() {
            return Ok(None);
        }

        let entry = Entry {
            id: self.ids.next_id(),
            name: name.to_string(),
            calories,
        };

        let mut record = self.store.load(date).await;
        record.list_mut(kind).push(entry.clone());
        self.store.save(date, &record).await?;

        info!(%date, kind = kind.path_segment(), id = %entry.id, "entry added");
        Ok(Some(entry))
    }

    pub async fn delete_entry(
        &mut self,
        date: DayKey,
        kind: EntryKind,
        id: &str,
    ) -> Result<bool, AppError> {
        let mut record = self.store.load(date).await;
        let list = record.list_mut(kind);
        let before = list.len();
        list.retain(|entry| entry.id != id);
        let removed = list.len() != before;

        self.store.save(date, &record).await?;

        if removed {
            info!(%date, kind = kind.path_segment(), id, "entry deleted");
        }
        Ok(removed)
    }

    pub async fn clear_day(&mut self, date: DayKey) -> Result<(), AppError> {
        self.store.clear(date).await?;
        info!(%date, "day cleared");
        Ok(())
    }

    pub async fn export_csv(&self, date: DayKey) -> CsvExport {
        let record = self.store.load(date).await;
        build_csv(date, &record)
    }
}

fn summarize(date: DayKey, record: DayRecord) -> DaySummary {
    let totals = record.totals();
    DaySummary {
        date,
        meal_count: record.meals.len(),
        workout_count: record.workouts.len(),
        meals: record.meals,
        workouts: record.workouts,
        totals,
    }
}
