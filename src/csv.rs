use crate::date::DayKey;
use crate::models::{round_calories, sum_calories, DayRecord, EntryKind};

pub const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    pub file_name: String,
    pub body: String,
}

pub fn export_file_name(date: DayKey) -> String {
    format!("calorie-log_{date}.csv")
}

/// Quotes a field containing a comma, quote or newline, doubling inner quotes.
pub fn escape_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn row(fields: [&str; 4]) -> String {
    fields.map(escape_field).join(",")
}

/// Header, one row per meal, one per workout, then intake/burn/net totals.
pub fn build_csv(date: DayKey, record: &DayRecord) -> CsvExport {
    let date_text = date.to_string();
    let mut rows = vec![row(["date", "type", "name", "calories"])];

    for kind in [EntryKind::Meal, EntryKind::Workout] {
        for entry in record.list(kind) {
            let calories = round_calories(entry.calories).to_string();
            rows.push(row([
                date_text.as_str(),
                kind.csv_label(),
                entry.name.as_str(),
                calories.as_str(),
            ]));
        }
    }

    let intake = sum_calories(&record.meals);
    let burn = sum_calories(&record.workouts);
    for (name, value) in [("intake", intake), ("burn", burn), ("net", intake - burn)] {
        let value = round_calories(value).to_string();
        rows.push(row([date_text.as_str(), "total", name, value.as_str()]));
    }

    CsvExport {
        file_name: export_file_name(date),
        body: rows.join("\n"),
    }
}
