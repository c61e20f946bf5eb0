use uuid::Uuid;

use super::VALIDATION_ERROR;
use crate::{
    client::{ApiClient, ApiError, ApiRequest},
    models::{
        Message, UpdatePassword, UserCreate, UserPublic, UserRegister, UserUpdate, UserUpdateMe,
        UsersPublic,
    },
};

pub struct UsersService<'a> {
    client: &'a ApiClient,
}

impl<'a> UsersService<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn read_users(&self, skip: u64, limit: u64) -> Result<UsersPublic, ApiError> {
        let req = ApiRequest::get("/api/v1/users/")
            .query("skip", skip)
            .query("limit", limit)
            .error(422, VALIDATION_ERROR);
        self.client.request(req).await
    }

    pub async fn create_user(&self, body: &UserCreate) -> Result<UserPublic, ApiError> {
        let req = ApiRequest::post("/api/v1/users/")
            .json(body)?
            .error(422, VALIDATION_ERROR);
        self.client.request(req).await
    }

    pub async fn read_user_me(&self) -> Result<UserPublic, ApiError> {
        self.client.request(ApiRequest::get("/api/v1/users/me")).await
    }

    pub async fn delete_user_me(&self) -> Result<Message, ApiError> {
        self.client
            .request(ApiRequest::delete("/api/v1/users/me"))
            .await
    }

    pub async fn update_user_me(&self, body: &UserUpdateMe) -> Result<UserPublic, ApiError> {
        let req = ApiRequest::patch("/api/v1/users/me")
            .json(body)?
            .error(422, VALIDATION_ERROR);
        self.client.request(req).await
    }

    pub async fn update_password_me(&self, body: &UpdatePassword) -> Result<Message, ApiError> {
        let req = ApiRequest::patch("/api/v1/users/me/password")
            .json(body)?
            .error(422, VALIDATION_ERROR);
        self.client.request(req).await
    }

    /// Sign up without being logged in.
    pub async fn register_user(&self, body: &UserRegister) -> Result<UserPublic, ApiError> {
        let req = ApiRequest::post("/api/v1/users/signup")
            .json(body)?
            .error(422, VALIDATION_ERROR);
        self.client.request(req).await
    }

    pub async fn read_user_by_id(&self, user_id: Uuid) -> Result<UserPublic, ApiError> {
        let req = ApiRequest::get("/api/v1/users/{user_id}")
            .path("user_id", user_id)
            .error(422, VALIDATION_ERROR);
        self.client.request(req).await
    }

    pub async fn update_user(
        &self,
        user_id: Uuid,
        body: &UserUpdate,
    ) -> Result<UserPublic, ApiError> {
        let req = ApiRequest::patch("/api/v1/users/{user_id}")
            .path("user_id", user_id)
            .json(body)?
            .error(422, VALIDATION_ERROR);
        self.client.request(req).await
    }

    pub async fn delete_user(&self, user_id: Uuid) -> Result<Message, ApiError> {
        let req = ApiRequest::delete("/api/v1/users/{user_id}")
            .path("user_id", user_id)
            .error(422, VALIDATION_ERROR);
        self.client.request(req).await
    }
}
