use crate::application::{book::BookApplicationError, loan::LoanApplicationError};
use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use validator::ValidationErrors;

use super::types::ErrorResponse;

/// API層のエラー型
///
/// - 入力検証・ビジネスルール違反は400で`{errors: [...]}`
/// - 見つからない場合は本文なしの404
/// - それ以外（呼び出し側の誤り、ストア障害）は本文なしの500
#[derive(Debug)]
pub enum ApiError {
    Validation(Vec<String>),
    BusinessRule(String),
    NotFound,
    Internal(String),
}

impl From<BookApplicationError> for ApiError {
    fn from(err: BookApplicationError) -> Self {
        match err {
            BookApplicationError::IsbnAlreadyRegistered | BookApplicationError::BookHasLoans => {
                ApiError::BusinessRule(err.to_string())
            }
            BookApplicationError::MissingBookId => ApiError::Internal(err.to_string()),
            BookApplicationError::RepositoryError(ref e) => {
                ApiError::Internal(format!("{}: {}", err, e))
            }
        }
    }
}

impl From<LoanApplicationError> for ApiError {
    fn from(err: LoanApplicationError) -> Self {
        match err {
            LoanApplicationError::BookNotFoundForIsbn | LoanApplicationError::BookAlreadyBorrowed => {
                ApiError::BusinessRule(err.to_string())
            }
            LoanApplicationError::LoanNotFound => ApiError::NotFound,
            LoanApplicationError::RepositoryError(ref e)
            | LoanApplicationError::BookRepositoryError(ref e) => {
                ApiError::Internal(format!("{}: {}", err, e))
            }
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{} is invalid", field))
                })
            })
            .collect();
        messages.sort();

        ApiError::Validation(messages)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(vec![rejection.body_text()])
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(errors) => {
                (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(errors))).into_response()
            }
            ApiError::BusinessRule(message) => {
                (StatusCode::BAD_REQUEST, Json(ErrorResponse::single(message))).into_response()
            }
            ApiError::NotFound => StatusCode::NOT_FOUND.into_response(),
            ApiError::Internal(message) => {
                // 詳細はログのみ
                tracing::error!("Internal error: {}", message);
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}
