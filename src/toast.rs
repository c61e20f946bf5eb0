use std::fmt;

use tracing::{error, info, warn};

use crate::client::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastStatus {
    Success,
    Warning,
    Error,
}

impl fmt::Display for ToastStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ToastStatus::Success => "success",
            ToastStatus::Warning => "warning",
            ToastStatus::Error => "error",
        })
    }
}

/// Short user-facing notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub title: String,
    pub description: String,
    pub status: ToastStatus,
}

impl Toast {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        status: ToastStatus,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            status,
        }
    }

    pub fn success(description: impl Into<String>) -> Self {
        Self::new("Success!", description, ToastStatus::Success)
    }

    pub fn warning(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(title, description, ToastStatus::Warning)
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(title, description, ToastStatus::Error)
    }

    /// Error toast for a failed call, described by [`ApiError::detail`].
    pub fn from_api_error(err: &ApiError) -> Self {
        Self::error("Error", err.detail())
    }

    pub fn is_error(&self) -> bool {
        self.status == ToastStatus::Error
    }

    /// Log the toast at a level matching its status.
    pub fn log(&self) {
        match self.status {
            ToastStatus::Success => info!(title = %self.title, "{}", self.description),
            ToastStatus::Warning => warn!(title = %self.title, "{}", self.description),
            ToastStatus::Error => error!(title = %self.title, "{}", self.description),
        }
    }
}

impl fmt::Display for Toast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} {}", self.status, self.title, self.description)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn api_error_becomes_error_toast_with_detail() {
        let err = ApiError::Status {
            status: 400,
            url: "http://x/api/v1/login/access-token".into(),
            description: Some("Bad Request".into()),
            body: json!({ "detail": "Incorrect email or password" }),
        };
        let toast = Toast::from_api_error(&err);
        assert!(toast.is_error());
        assert_eq!(toast.title, "Error");
        assert_eq!(toast.description, "Incorrect email or password");
    }

    #[test]
    fn display_shows_status_title_and_description() {
        let toast = Toast::success("Item created successfully.");
        assert_eq!(toast.to_string(), "[success] Success! Item created successfully.");
    }
}
