//! HTTP request handlers
//!
//! Handlers are thin: unpack and validate query parameters, call the
//! repository, wrap the result. Query-string extraction failures (unknown
//! parameter names, malformed values) are client errors, not 500s.

pub mod activities;
pub mod gps;
pub mod health;
pub mod locations;
pub mod reference;
pub mod spatial;

use axum::extract::rejection::QueryRejection;
use axum::extract::Query;
use axum::http::StatusCode;
use std::str::FromStr;

use tracklog_db::{DbError, SortDir};

use crate::error::{ApiError, ApiResult};

/// Unpack a query extraction, mapping rejections to 400
pub(crate) fn unpack<P>(result: Result<Query<P>, QueryRejection>) -> ApiResult<P> {
    match result {
        Ok(Query(params)) => Ok(params),
        Err(rejection) => Err(ApiError::with_code(
            StatusCode::BAD_REQUEST,
            rejection.body_text(),
            "INVALID_FILTER",
        )),
    }
}

/// Parse an optional sort key name against its closed enum
pub(crate) fn parse_sort<T>(raw: Option<&str>) -> ApiResult<T>
where
    T: FromStr<Err = DbError> + Default,
{
    match raw {
        Some(name) => name.parse::<T>().map_err(ApiError::from),
        None => Ok(T::default()),
    }
}

/// Parse an optional sort direction
pub(crate) fn parse_order(raw: Option<&str>) -> ApiResult<SortDir> {
    match raw {
        None => Ok(SortDir::default()),
        Some("asc") => Ok(SortDir::Asc),
        Some("desc") => Ok(SortDir::Desc),
        Some(other) => Err(ApiError::with_code(
            StatusCode::BAD_REQUEST,
            format!("unknown sort order: {other}"),
            "INVALID_FILTER",
        )),
    }
}
