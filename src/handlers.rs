use crate::errors::{AppError, HabitError};
use crate::models::{
    AddHabitRequest, AddHabitResponse, CalendarResponse, ConfirmRequest, HabitEntry,
    ImportRequest, MonthQuery, OutcomeResponse, Profile, StateDocument, StatsResponse,
    ToggleRequest, TodayResponse, date_key,
};
use crate::ops::{Outcome, Prompt};
use crate::state::AppState;
use crate::stats::{
    build_stats, calendar_month, current_streak_at, day_status, longest_streak, parse_month,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
};
use chrono::{Datelike, Local, NaiveDate};
use tracing::info;

const EXPORT_FILENAME: &str = "tiny-triumphs-backup.json";

pub async fn get_state(State(state): State<AppState>) -> Json<StateDocument> {
    let store = state.store.lock().await;
    Json(store.document().clone())
}

pub async fn get_today(State(state): State<AppState>) -> Json<TodayResponse> {
    let store = state.store.lock().await;
    Json(today_response(store.current_profile(), today()))
}

pub async fn get_stats(
    State(state): State<AppState>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<StatsResponse>, AppError> {
    let month = requested_month(query)?;
    let store = state.store.lock().await;
    build_stats(store.current_profile(), month)
        .map(Json)
        .ok_or_else(|| AppError::bad_request("month must be YYYY-MM"))
}

pub async fn get_calendar(
    State(state): State<AppState>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<CalendarResponse>, AppError> {
    let today = today();
    let (year, month) = requested_month(query)?.unwrap_or((today.year(), today.month()));
    let store = state.store.lock().await;
    calendar_month(store.current_profile(), year, month)
        .map(Json)
        .ok_or_else(|| AppError::bad_request("month must be YYYY-MM"))
}

pub async fn add_habit(
    State(state): State<AppState>,
    Json(payload): Json<AddHabitRequest>,
) -> Result<Json<AddHabitResponse>, AppError> {
    let response = state
        .with_store(move |store| {
            let added = match store.add_habit(&payload.name) {
                Ok(()) => true,
                Err(HabitError::DuplicateHabit(_)) => false,
                Err(err) => return Err(err.into()),
            };
            Ok(AddHabitResponse {
                added,
                habits: store.current_profile().habits.clone(),
            })
        })
        .await?;
    Ok(Json(response))
}

pub async fn remove_habit(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<TodayResponse>, AppError> {
    let today = today();
    let response = state
        .with_store(move |store| {
            store.remove_habit_at(today, &name)?;
            Ok(today_response(store.current_profile(), today))
        })
        .await?;
    Ok(Json(response))
}

pub async fn toggle(
    State(state): State<AppState>,
    Json(payload): Json<ToggleRequest>,
) -> Result<Json<TodayResponse>, AppError> {
    let today = today();
    let response = state
        .with_store(move |store| {
            store.toggle_completion_at(today, payload.date.trim(), &payload.habit, payload.value)?;
            Ok(today_response(store.current_profile(), today))
        })
        .await?;
    Ok(Json(response))
}

pub async fn reset_today(State(state): State<AppState>) -> Result<Json<TodayResponse>, AppError> {
    let today = today();
    let response = state
        .with_store(move |store| {
            store.reset_today_at(today)?;
            Ok(today_response(store.current_profile(), today))
        })
        .await?;
    Ok(Json(response))
}

pub async fn clear_all(
    State(state): State<AppState>,
    Json(payload): Json<ConfirmRequest>,
) -> Result<Json<OutcomeResponse>, AppError> {
    let confirmed = payload.confirm;
    let outcome = state
        .with_store(move |store| Ok(store.clear_all(&mut |_: Prompt| confirmed)?))
        .await?;
    Ok(Json(OutcomeResponse { outcome }))
}

pub async fn export(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let store = state.store.lock().await;
    let body = store.export()?;
    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{EXPORT_FILENAME}\""),
            ),
        ],
        body,
    ))
}

pub async fn import(
    State(state): State<AppState>,
    Json(payload): Json<ImportRequest>,
) -> Result<Json<OutcomeResponse>, AppError> {
    let confirmed = payload.confirm;
    let outcome = state
        .with_store(move |store| {
            Ok(store.import_value(&payload.document, &mut |_: Prompt| confirmed)?)
        })
        .await?;
    if outcome == Outcome::Applied {
        info!("imported backup");
    }
    Ok(Json(OutcomeResponse { outcome }))
}

pub async fn recover(
    State(state): State<AppState>,
    Json(payload): Json<ConfirmRequest>,
) -> Result<Json<OutcomeResponse>, AppError> {
    let confirmed = payload.confirm;
    let outcome = state
        .with_store(move |store| Ok(store.recover(&mut |_: Prompt| confirmed)?))
        .await?;
    info!(?outcome, "manual recovery");
    Ok(Json(OutcomeResponse { outcome }))
}

fn requested_month(query: MonthQuery) -> Result<Option<(i32, u32)>, AppError> {
    match query.month {
        None => Ok(None),
        Some(month) => parse_month(month.trim())
            .map(Some)
            .ok_or_else(|| AppError::bad_request("month must be YYYY-MM")),
    }
}

fn today_response(profile: &Profile, today: NaiveDate) -> TodayResponse {
    let date = date_key(today);
    TodayResponse {
        habits: profile
            .habits
            .iter()
            .map(|habit| HabitEntry {
                name: habit.clone(),
                done: profile.is_done(&date, habit),
            })
            .collect(),
        status: day_status(profile, &date),
        current_streak: current_streak_at(today, profile),
        longest_streak: longest_streak(profile),
        date,
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
