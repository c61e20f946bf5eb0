use uuid::Uuid;

use super::VALIDATION_ERROR;
use crate::{
    client::{ApiClient, ApiError, ApiRequest},
    models::{ItemCreate, ItemPublic, ItemUpdate, ItemsPublic, Message},
};

pub struct ItemsService<'a> {
    client: &'a ApiClient,
}

impl<'a> ItemsService<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn read_items(&self, skip: u64, limit: u64) -> Result<ItemsPublic, ApiError> {
        let req = ApiRequest::get("/api/v1/items/")
            .query("skip", skip)
            .query("limit", limit)
            .error(422, VALIDATION_ERROR);
        self.client.request(req).await
    }

    pub async fn create_item(&self, body: &ItemCreate) -> Result<ItemPublic, ApiError> {
        let req = ApiRequest::post("/api/v1/items/")
            .json(body)?
            .error(422, VALIDATION_ERROR);
        self.client.request(req).await
    }

    pub async fn read_item(&self, id: Uuid) -> Result<ItemPublic, ApiError> {
        let req = ApiRequest::get("/api/v1/items/{id}")
            .path("id", id)
            .error(422, VALIDATION_ERROR);
        self.client.request(req).await
    }

    pub async fn update_item(&self, id: Uuid, body: &ItemUpdate) -> Result<ItemPublic, ApiError> {
        let req = ApiRequest::put("/api/v1/items/{id}")
            .path("id", id)
            .json(body)?
            .error(422, VALIDATION_ERROR);
        self.client.request(req).await
    }

    pub async fn delete_item(&self, id: Uuid) -> Result<Message, ApiError> {
        let req = ApiRequest::delete("/api/v1/items/{id}")
            .path("id", id)
            .error(422, VALIDATION_ERROR);
        self.client.request(req).await
    }
}
