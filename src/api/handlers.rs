//! HTTP request handlers for the Attendance Engine API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::{Duration, Instant};

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::{EmployeeId, RawAttendanceId, RawAttendanceUpdate, WorkDayId};

use super::request::{
    AttendanceLogRequest, CreateWorkDayRequest, DailyWindowQuery, PayrollReportQuery,
};
use super::response::{ApiError, ApiErrorResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/attendance-logs", post(record_punch_handler))
        .route("/employees/:id/daily-window", get(daily_window_handler))
        .route("/workdays", post(create_work_day_handler))
        .route("/workdays/:id/generate", post(generate_work_day_handler))
        .route(
            "/workdays/:id/raw-attendances",
            get(work_day_attendance_handler),
        )
        .route("/raw-attendances/:id", patch(update_raw_attendance_handler))
        .route("/reports/payroll", get(payroll_report_handler))
        .with_state(state)
}

/// Handler for POST /attendance-logs.
///
/// Decodes and classifies one device record.
async fn record_punch_handler(
    State(state): State<AppState>,
    payload: Result<Json<AttendanceLogRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing attendance log");

    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return json_rejection(correlation_id, rejection).into_response(),
    };

    let started = Instant::now();
    match state
        .engine()
        .decode_and_classify(&request.serial_number, &request.hex_data)
        .await
    {
        Ok(punch) => {
            info!(
                correlation_id = %correlation_id,
                badge_id = punch.badge_id,
                duration_us = started.elapsed().as_micros(),
                "Attendance log recorded"
            );
            json_response(StatusCode::CREATED, &punch)
        }
        Err(err) => failure(correlation_id, err.into()),
    }
}

/// Handler for GET /employees/:id/daily-window?date=.
async fn daily_window_handler(
    State(state): State<AppState>,
    employee_id: Result<Path<EmployeeId>, PathRejection>,
    query: Result<Query<DailyWindowQuery>, QueryRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();

    let (Path(employee_id), Query(query)) = match (employee_id, query) {
        (Ok(path), Ok(query)) => (path, query),
        (Err(rejection), _) => return bad_request(correlation_id, rejection.body_text()),
        (_, Err(rejection)) => return bad_request(correlation_id, rejection.body_text()),
    };

    match state
        .engine()
        .reconstruct_daily_window(employee_id, query.date)
        .await
    {
        Ok(Some(window)) => json_response(StatusCode::OK, &window),
        Ok(None) => failure(
            correlation_id,
            ApiErrorResponse {
                status: StatusCode::NOT_FOUND,
                error: ApiError::not_found(format!(
                    "No attendance window for employee {} on {}",
                    employee_id, query.date
                )),
            },
        ),
        Err(err) => failure(correlation_id, err.into()),
    }
}

/// Handler for POST /workdays.
///
/// Creates a past work day and generates its raw attendance.
async fn create_work_day_handler(
    State(state): State<AppState>,
    payload: Result<Json<CreateWorkDayRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing work day creation");

    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return json_rejection(correlation_id, rejection).into_response(),
    };

    let started = Instant::now();
    match state
        .engine()
        .create_work_day(request.date, request.day_type)
        .await
    {
        Ok(generated) => {
            info!(
                correlation_id = %correlation_id,
                work_day_id = generated.work_day.id,
                records = generated.records.len(),
                duration_us = started.elapsed().as_micros(),
                "Work day created"
            );
            json_response(StatusCode::CREATED, &generated)
        }
        Err(err) => failure(correlation_id, err.into()),
    }
}

/// Handler for POST /workdays/:id/generate.
async fn generate_work_day_handler(
    State(state): State<AppState>,
    work_day_id: Result<Path<WorkDayId>, PathRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();

    let Path(work_day_id) = match work_day_id {
        Ok(path) => path,
        Err(rejection) => return bad_request(correlation_id, rejection.body_text()),
    };

    match state.engine().generate_workday_attendance(work_day_id).await {
        Ok(records) => {
            info!(
                correlation_id = %correlation_id,
                work_day_id = work_day_id,
                records = records.len(),
                "Work day regenerated"
            );
            json_response(StatusCode::OK, &records)
        }
        Err(err) => failure(correlation_id, err.into()),
    }
}

/// Handler for GET /workdays/:id/raw-attendances.
async fn work_day_attendance_handler(
    State(state): State<AppState>,
    work_day_id: Result<Path<WorkDayId>, PathRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();

    let Path(work_day_id) = match work_day_id {
        Ok(path) => path,
        Err(rejection) => return bad_request(correlation_id, rejection.body_text()),
    };

    match state.engine().raw_attendance_for_work_day(work_day_id).await {
        Ok(records) => json_response(StatusCode::OK, &records),
        Err(err) => failure(correlation_id, err.into()),
    }
}

/// Handler for PATCH /raw-attendances/:id.
async fn update_raw_attendance_handler(
    State(state): State<AppState>,
    id: Result<Path<RawAttendanceId>, PathRejection>,
    payload: Result<Json<RawAttendanceUpdate>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();

    let Path(id) = match id {
        Ok(path) => path,
        Err(rejection) => return bad_request(correlation_id, rejection.body_text()),
    };
    let update = match payload {
        Ok(Json(update)) => update,
        Err(rejection) => return json_rejection(correlation_id, rejection).into_response(),
    };

    match state.engine().update_raw_attendance(id, update).await {
        Ok(record) => {
            info!(
                correlation_id = %correlation_id,
                raw_attendance_id = id,
                "Raw attendance updated"
            );
            json_response(StatusCode::OK, &record)
        }
        Err(err) => failure(correlation_id, err.into()),
    }
}

/// Handler for GET /reports/payroll.
async fn payroll_report_handler(
    State(state): State<AppState>,
    query: Result<Query<PayrollReportQuery>, QueryRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing payroll report");

    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => return bad_request(correlation_id, rejection.body_text()),
    };

    let started = Instant::now();
    match state
        .engine()
        .generate_payroll_report(
            query.company_id,
            query.start_date,
            query.end_date,
            query.timeout_ms.map(Duration::from_millis),
        )
        .await
    {
        Ok(report) => {
            info!(
                correlation_id = %correlation_id,
                company_id = report.company_id,
                rows = report.rows.len(),
                duration_us = started.elapsed().as_micros(),
                "Payroll report completed successfully"
            );
            json_response(StatusCode::OK, &report)
        }
        Err(err) => failure(correlation_id, err.into()),
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

fn failure(correlation_id: Uuid, error: ApiErrorResponse) -> Response {
    warn!(
        correlation_id = %correlation_id,
        status = error.status.as_u16(),
        code = %error.error.code,
        error = %error.error.message,
        "Request failed"
    );
    error.into_response()
}

fn bad_request(correlation_id: Uuid, message: String) -> Response {
    failure(
        correlation_id,
        ApiErrorResponse::bad_request(ApiError::validation_error(message)),
    )
}

/// Maps a JSON body rejection to an error response.
fn json_rejection(correlation_id: Uuid, rejection: JsonRejection) -> ApiErrorResponse {
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    ApiErrorResponse::bad_request(error)
}
