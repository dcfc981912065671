// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::http::StatusCode;
use axum::response::IntoResponse;
use maintenance_tracker::error::AppError;
use maintenance_tracker::services::{AssignmentError, AssignmentFailure};

#[test]
fn test_rejected_batch_maps_to_unprocessable() {
    let err: AppError = AssignmentError::Rejected {
        failures: vec![AssignmentFailure::UnknownActivity { activity_id: 7 }],
    }
    .into();

    match &err {
        AppError::Unprocessable { details, .. } => {
            let details = details.as_ref().unwrap();
            assert_eq!(details[0]["reason"], "unknown_activity");
            assert_eq!(details[0]["activity_id"], 7);
        }
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(
        err.into_response().status(),
        StatusCode::UNPROCESSABLE_ENTITY
    );
}

#[test]
fn test_batch_size_errors_are_bad_requests() {
    let err: AppError = AssignmentError::Empty.into();
    assert!(matches!(err, AppError::BadRequest(_)));

    let err: AppError = AssignmentError::TooLarge { len: 500, max: 400 }.into();
    assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
}

#[test]
fn test_database_errors_hide_details() {
    let response = AppError::Database("connection refused".to_string()).into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[test]
fn test_not_found_status() {
    let response = AppError::NotFound("Bike b9 not found".to_string()).into_response();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
