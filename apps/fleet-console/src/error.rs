// [[FLEET]]/apps/fleet-console/src/error.rs
// Purpose: HTTP error type. Maps domain errors onto status codes with localized messages.
// Architecture: API Layer
// Dependencies: Axum, thiserror

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::agents::AgentError;
use crate::chat::ChatError;
use crate::editor::EditorError;
use crate::locale::{I18n, LocaleError};
use crate::memory::QueryError;
use crate::models::TransitionError;
use crate::repository::RepositoryError;
use crate::runtime::ChatSendError;
use crate::runtime_config::RuntimeConfigError;
use crate::shell::{LoginError, ShellError};
use crate::tasks::TaskError;
use crate::transfer::TransferError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Cancelled(String),
    #[error("{0}")]
    Timeout(String),
    #[error("{0}")]
    Unavailable(String),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Cancelled(_) => StatusCode::REQUEST_TIMEOUT,
            ApiError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Same status as `self`, different text.
    fn with_message(self, message: String) -> Self {
        match self {
            ApiError::BadRequest(_) => ApiError::BadRequest(message),
            ApiError::Validation(_) => ApiError::Validation(message),
            ApiError::NotFound(_) => ApiError::NotFound(message),
            ApiError::Conflict(_) => ApiError::Conflict(message),
            ApiError::Cancelled(_) => ApiError::Cancelled(message),
            ApiError::Timeout(_) => ApiError::Timeout(message),
            ApiError::Unavailable(_) => ApiError::Unavailable(message),
            ApiError::Internal(_) => ApiError::Internal(message),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed ({}): {}", status, self);
        } else {
            tracing::debug!("Request rejected ({}): {}", status, self);
        }
        (status, Json(json!({ "success": false, "error": self.to_string() }))).into_response()
    }
}

/// Conversion into an [`ApiError`] with the message in the active locale.
pub trait Localize {
    fn localize(self, i18n: &I18n) -> ApiError;
}

impl Localize for EditorError {
    fn localize(self, _i18n: &I18n) -> ApiError {
        // the editor already carries the localized message
        ApiError::Validation(self.to_string())
    }
}

impl Localize for RepositoryError {
    fn localize(self, i18n: &I18n) -> ApiError {
        match self {
            RepositoryError::Timeout(_) => ApiError::Timeout(i18n.t("common.timeout")),
            RepositoryError::Cancelled => ApiError::Cancelled(i18n.t("common.cancelled")),
            e @ RepositoryError::Unavailable(_) => ApiError::Unavailable(e.to_string()),
        }
    }
}

impl Localize for TransferError {
    fn localize(self, i18n: &I18n) -> ApiError {
        match self {
            TransferError::ImportFailed(reason) => {
                tracing::warn!("Template import rejected: {}", reason);
                ApiError::BadRequest(i18n.t("taskEditor.errors.failedImport"))
            }
            TransferError::ExportFailed(e) => {
                tracing::error!("Template export failed: {}", e);
                ApiError::Internal(i18n.t("taskEditor.errors.exportFailed"))
            }
        }
    }
}

impl Localize for TaskError {
    fn localize(self, i18n: &I18n) -> ApiError {
        match self {
            TaskError::NameRequired => ApiError::Validation(i18n.t("taskEditor.errors.nameRequired")),
            TaskError::InvalidJson(e) => e.localize(i18n),
            e @ TaskError::NotFound(_) => ApiError::NotFound(e.to_string()),
            e @ TaskError::InvalidParameter(_) => ApiError::BadRequest(e.to_string()),
            TaskError::Transfer(e) => e.localize(i18n),
        }
    }
}

impl Localize for TransitionError {
    fn localize(self, _i18n: &I18n) -> ApiError {
        match self {
            e @ TransitionError::TaskNotFound(_) => ApiError::NotFound(e.to_string()),
            e => ApiError::Conflict(e.to_string()),
        }
    }
}

impl Localize for AgentError {
    fn localize(self, i18n: &I18n) -> ApiError {
        match self {
            AgentError::LoadFailed(e) => e
                .localize(i18n)
                .with_message(i18n.t("agentDeployment.errors.failedToLoad")),
            AgentError::NameRequired => ApiError::Validation(i18n.t("agentDeployment.errors.nameRequired")),
            AgentError::InvalidJson(_) => ApiError::Validation(i18n.t("agentDeployment.form.jsonError")),
            e @ AgentError::NotFound(_) => ApiError::NotFound(e.to_string()),
            e @ AgentError::DuplicateTask(_) => ApiError::Conflict(e.to_string()),
            e @ (AgentError::UnknownTask(_) | AgentError::UnknownHost(_)) => ApiError::BadRequest(e.to_string()),
            AgentError::Transition(e) => e.localize(i18n),
        }
    }
}

impl Localize for RuntimeConfigError {
    fn localize(self, i18n: &I18n) -> ApiError {
        match self {
            RuntimeConfigError::HostnameRequired => {
                ApiError::Validation(i18n.t("agentRuntime.errors.hostnameRequired"))
            }
            RuntimeConfigError::DuplicateHostname(hostname) => ApiError::Conflict(
                i18n.t_with("agentRuntime.errors.duplicateHostname", &[("hostname", &hostname)]),
            ),
            RuntimeConfigError::SourceIdRequired => {
                ApiError::Validation(i18n.t("agentRuntime.errors.sourceIdRequired"))
            }
            RuntimeConfigError::DuplicateSourceId(id) => ApiError::Conflict(
                i18n.t_with("agentRuntime.errors.duplicateSourceId", &[("id", &id)]),
            ),
            e @ (RuntimeConfigError::EngineNotFound(_)
            | RuntimeConfigError::SourceNotFound(_)
            | RuntimeConfigError::ModelNotFound(_)) => ApiError::NotFound(e.to_string()),
            RuntimeConfigError::InvalidJson(e) => e.localize(i18n),
        }
    }
}

impl Localize for QueryError {
    fn localize(self, i18n: &I18n) -> ApiError {
        match self {
            e @ QueryError::EmptyQuery => ApiError::BadRequest(e.to_string()),
            QueryError::Failed(e) => e.localize(i18n).with_message(i18n.t("queryMemory.queryError")),
        }
    }
}

impl Localize for ChatError {
    fn localize(self, _i18n: &I18n) -> ApiError {
        match self {
            e @ ChatError::UnknownAgent(_) => ApiError::NotFound(e.to_string()),
            e => ApiError::BadRequest(e.to_string()),
        }
    }
}

impl Localize for ChatSendError {
    fn localize(self, i18n: &I18n) -> ApiError {
        match self {
            ChatSendError::Agents(e) => e.localize(i18n),
            ChatSendError::Chat(e) => e.localize(i18n),
        }
    }
}

impl Localize for LoginError {
    fn localize(self, i18n: &I18n) -> ApiError {
        match self {
            LoginError::EmptyFields => ApiError::Validation(i18n.t("login.errorEmptyFields")),
            LoginError::InvalidEmail => ApiError::Validation(i18n.t("login.errorInvalidEmail")),
            LoginError::Failed(e) => e.localize(i18n).with_message(i18n.t("login.errorLoginFailed")),
        }
    }
}

impl Localize for ShellError {
    fn localize(self, _i18n: &I18n) -> ApiError {
        ApiError::NotFound(self.to_string())
    }
}

impl Localize for LocaleError {
    fn localize(self, _i18n: &I18n) -> ApiError {
        match self {
            e @ LocaleError::Unsupported(_) => ApiError::BadRequest(e.to_string()),
            e => ApiError::Internal(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::{Locale, MemoryPreferenceStore};
    use std::sync::Arc;
    use std::time::Duration;

    fn i18n() -> I18n {
        I18n::restore(Arc::new(MemoryPreferenceStore::new()))
    }

    #[test]
    fn test_status_mapping() {
        let i18n = i18n();
        assert_eq!(TaskError::NameRequired.localize(&i18n).status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            RuntimeConfigError::DuplicateHostname("engine-01".into()).localize(&i18n),
            ApiError::Conflict("An engine with hostname engine-01 already exists".to_string())
        );
        assert_eq!(
            RepositoryError::Timeout(Duration::from_secs(5)).localize(&i18n).status(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(RepositoryError::Cancelled.localize(&i18n).status(), StatusCode::REQUEST_TIMEOUT);
        assert_eq!(
            AgentError::Transition(TransitionError::TaskInError("task-7".into())).localize(&i18n).status(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_wrapped_repository_errors_keep_status() {
        let i18n = i18n();
        let err = AgentError::LoadFailed(RepositoryError::Unavailable("down".into())).localize(&i18n);
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.to_string(), i18n.t("agentDeployment.errors.failedToLoad"));
    }

    #[test]
    fn test_messages_follow_locale() {
        let i18n = i18n();
        i18n.set_locale(Locale::Fr).unwrap();
        assert_eq!(
            TaskError::NameRequired.localize(&i18n).to_string(),
            "Le nom du modèle est requis"
        );
    }
}
