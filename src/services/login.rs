use tracing::info;

use super::VALIDATION_ERROR;
use crate::{
    client::{ApiClient, ApiError, ApiRequest},
    models::{LoginForm, Message, NewPassword, Token, UserPublic},
};

pub struct LoginService<'a> {
    client: &'a ApiClient,
}

impl<'a> LoginService<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// OAuth2-compatible token login.
    pub async fn login_access_token(&self, form: &LoginForm) -> Result<Token, ApiError> {
        info!(username = %form.username, "Requesting access token");
        let req = ApiRequest::post("/api/v1/login/access-token")
            .form([
                ("username", form.username.as_str()),
                ("password", form.password.as_str()),
            ])
            .error(422, VALIDATION_ERROR);
        self.client.request(req).await
    }

    /// Check the current token and return its user.
    pub async fn test_token(&self) -> Result<UserPublic, ApiError> {
        self.client
            .request(ApiRequest::post("/api/v1/login/test-token"))
            .await
    }

    pub async fn recover_password(&self, email: &str) -> Result<Message, ApiError> {
        let req = ApiRequest::post("/api/v1/password-recovery/{email}")
            .path("email", email)
            .error(422, VALIDATION_ERROR);
        self.client.request(req).await
    }

    pub async fn reset_password(&self, body: &NewPassword) -> Result<Message, ApiError> {
        let req = ApiRequest::post("/api/v1/reset-password/")
            .json(body)?
            .error(422, VALIDATION_ERROR);
        self.client.request(req).await
    }

    /// HTML content of the password-recovery e-mail.
    pub async fn recover_password_html_content(&self, email: &str) -> Result<String, ApiError> {
        let req = ApiRequest::post("/api/v1/password-recovery-html-content/{email}")
            .path("email", email)
            .error(422, VALIDATION_ERROR);
        self.client.request_text(req).await
    }
}
