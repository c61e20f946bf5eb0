use super::VALIDATION_ERROR;
use crate::{
    client::{ApiClient, ApiError, ApiRequest},
    models::Message,
};

pub struct UtilsService<'a> {
    client: &'a ApiClient,
}

impl<'a> UtilsService<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Ask the backend to send a test e-mail to `email_to`.
    pub async fn test_email(&self, email_to: &str) -> Result<Message, ApiError> {
        let req = ApiRequest::post("/api/v1/utils/test-email/")
            .query("email_to", email_to)
            .error(422, VALIDATION_ERROR);
        self.client.request(req).await
    }
}
