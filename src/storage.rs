use crate::date::DayKey;
use crate::errors::AppError;
use crate::models::{DayRecord, Entry};
use async_trait::async_trait;
use serde_json::Value;
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};
use tokio::fs;
use tracing::{error, warn};

const KEY_PREFIX: &str = "calorie_counter:";

/// Persistent day records. Loads never fail: absent or corrupt text reads as an empty day.
#[async_trait]
pub trait DayStore: Send + Sync {
    async fn load(&self, date: DayKey) -> DayRecord;
    async fn save(&mut self, date: DayKey, record: &DayRecord) -> Result<(), AppError>;
    async fn clear(&mut self, date: DayKey) -> Result<(), AppError>;
}

pub fn storage_key(date: DayKey) -> String {
    format!("{KEY_PREFIX}{date}")
}

pub fn encode_day(record: &DayRecord) -> Result<String, AppError> {
    Ok(serde_json::to_string(record)?)
}

/// Lenient decode: unparsable text or non-array lists read as empty. Array
/// elements are always kept, with missing fields filled in, so re-saving a day
/// never loses what was stored.
pub fn decode_day(raw: &str) -> DayRecord {
    let parsed: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(err) => {
            warn!("discarding unreadable day record: {err}");
            return DayRecord::default();
        }
    };

    DayRecord {
        meals: decode_list(parsed.get("meals")),
        workouts: decode_list(parsed.get("workouts")),
    }
}

fn decode_list(value: Option<&Value>) -> Vec<Entry> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(index, item)| decode_entry(index, item))
            .collect(),
        _ => Vec::new(),
    }
}

fn decode_entry(index: usize, item: &Value) -> Entry {
    let id = text_field(item.get("id"))
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| format!("legacy-{index}"));

    Entry {
        id,
        name: text_field(item.get("name")).unwrap_or_default(),
        calories: coerce_calories(item.get("calories")),
    }
}

fn text_field(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

/// Anything that is not a finite number counts as zero calories.
fn coerce_calories(value: Option<&Value>) -> f64 {
    let calories = match value {
        Some(Value::Number(number)) => number.as_f64().unwrap_or(0.0),
        Some(Value::String(text)) => text.trim().parse::<f64>().unwrap_or(0.0),
        Some(Value::Bool(true)) => 1.0,
        _ => 0.0,
    };
    if calories.is_finite() { calories } else { 0.0 }
}

/// Key/value text map written to a single JSON file after every mutation.
pub struct JsonFileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl JsonFileStore {
    pub async fn open(path: PathBuf) -> Self {
        let entries = load_entries(&path).await;
        Self { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self) -> Result<(), AppError> {
        let payload = serde_json::to_vec_pretty(&self.entries)?;
        fs::write(&self.path, payload).await?;
        Ok(())
    }
}

async fn load_entries(path: &Path) -> BTreeMap<String, String> {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(entries) => entries,
            Err(err) => {
                error!("failed to parse data file: {err}");
                BTreeMap::new()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
        Err(err) => {
            error!("failed to read data file: {err}");
            BTreeMap::new()
        }
    }
}

#[async_trait]
impl DayStore for JsonFileStore {
    async fn load(&self, date: DayKey) -> DayRecord {
        self.entries
            .get(&storage_key(date))
            .map(|raw| decode_day(raw))
            .unwrap_or_default()
    }

    async fn save(&mut self, date: DayKey, record: &DayRecord) -> Result<(), AppError> {
        let key = storage_key(date);
        let previous = self.entries.insert(key.clone(), encode_day(record)?);
        if let Err(err) = self.persist().await {
            match previous {
                Some(raw) => self.entries.insert(key, raw),
                None => self.entries.remove(&key),
            };
            return Err(err);
        }
        Ok(())
    }

    async fn clear(&mut self, date: DayKey) -> Result<(), AppError> {
        let key = storage_key(date);
        let Some(previous) = self.entries.remove(&key) else {
            return Ok(());
        };
        if let Err(err) = self.persist().await {
            self.entries.insert(key, previous);
            return Err(err);
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores raw text under a key, bypassing encoding.
    pub fn insert_raw(&mut self, key: impl Into<String>, raw: impl Into<String>) {
        self.entries.insert(key.into(), raw.into());
    }

    pub fn contains(&self, date: DayKey) -> bool {
        self.entries.contains_key(&storage_key(date))
    }
}

#[async_trait]
impl DayStore for MemoryStore {
    async fn load(&self, date: DayKey) -> DayRecord {
        self.entries
            .get(&storage_key(date))
            .map(|raw| decode_day(raw))
            .unwrap_or_default()
    }

    async fn save(&mut self, date: DayKey, record: &DayRecord) -> Result<(), AppError> {
        self.entries.insert(storage_key(date), encode_day(record)?);
        Ok(())
    }

    async fn clear(&mut self, date: DayKey) -> Result<(), AppError> {
        self.entries.remove(&storage_key(date));
        Ok(())
    }
}
