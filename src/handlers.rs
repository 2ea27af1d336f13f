use crate::csv::CSV_CONTENT_TYPE;
use crate::date::DayKey;
use crate::errors::AppError;
use crate::models::{AddEntryResponse, DateQuery, DaySummary, EntryInput, EntryKind};
use crate::state::AppState;
use crate::ui::render_index;
use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{Html, IntoResponse, Redirect},
    Form, Json,
};

pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<DateQuery>,
) -> Result<Html<String>, AppError> {
    let date = match query.date.as_deref() {
        Some(raw) if !raw.is_empty() => {
            DayKey::parse(raw).ok_or_else(|| AppError::invalid_date(raw))?
        }
        _ => DayKey::today(),
    };

    let tracker = state.tracker.lock().await;
    let summary = tracker.day(date).await;
    Ok(Html(render_index(&summary)))
}

pub async fn add_entry_form(
    State(state): State<AppState>,
    Path((date, kind)): Path<(DayKey, EntryKind)>,
    Form(input): Form<EntryInput>,
) -> Result<Redirect, AppError> {
    apply_add(&state, date, kind, input).await?;
    Ok(day_redirect(date))
}

pub async fn delete_entry_form(
    State(state): State<AppState>,
    Path((date, kind, id)): Path<(DayKey, EntryKind, String)>,
) -> Result<Redirect, AppError> {
    state.tracker.lock().await.delete_entry(date, kind, &id).await?;
    Ok(day_redirect(date))
}

pub async fn clear_day_form(
    State(state): State<AppState>,
    Path(date): Path<DayKey>,
) -> Result<Redirect, AppError> {
    state.tracker.lock().await.clear_day(date).await?;
    Ok(day_redirect(date))
}

pub async fn export_csv(
    State(state): State<AppState>,
    Path(date): Path<DayKey>,
) -> impl IntoResponse {
    let export = state.tracker.lock().await.export_csv(date).await;
    (
        [
            (header::CONTENT_TYPE, CSV_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", export.file_name),
            ),
        ],
        export.body,
    )
}

pub async fn get_day(
    State(state): State<AppState>,
    Path(date): Path<DayKey>,
) -> Json<DaySummary> {
    let tracker = state.tracker.lock().await;
    Json(tracker.day(date).await)
}

pub async fn add_entry(
    State(state): State<AppState>,
    Path((date, kind)): Path<(DayKey, EntryKind)>,
    Json(input): Json<EntryInput>,
) -> Result<Json<AddEntryResponse>, AppError> {
    let response = apply_add(&state, date, kind, input).await?;
    Ok(Json(response))
}

pub async fn delete_entry(
    State(state): State<AppState>,
    Path((date, kind, id)): Path<(DayKey, EntryKind, String)>,
) -> Result<Json<DaySummary>, AppError> {
    let mut tracker = state.tracker.lock().await;
    tracker.delete_entry(date, kind, &id).await?;
    Ok(Json(tracker.day(date).await))
}

pub async fn clear_day(
    State(state): State<AppState>,
    Path(date): Path<DayKey>,
) -> Result<Json<DaySummary>, AppError> {
    let mut tracker = state.tracker.lock().await;
    tracker.clear_day(date).await?;
    Ok(Json(tracker.day(date).await))
}

// Rejected input is not an error: the day comes back unchanged with no entry.
async fn apply_add(
    state: &AppState,
    date: DayKey,
    kind: EntryKind,
    input: EntryInput,
) -> Result<AddEntryResponse, AppError> {
    let calories = input.calories.and_then(|calories| calories.value());
    let mut tracker = state.tracker.lock().await;
    let entry = tracker.add_entry(date, kind, &input.name, calories).await?;
    let day = tracker.day(date).await;
    Ok(AddEntryResponse { entry, day })
}

fn day_redirect(date: DayKey) -> Redirect {
    Redirect::to(&format!("/?date={date}"))
}
