//! Typed façades over the backend endpoints.
//!
//! Each method is a straight pass-through: it builds one [`ApiRequest`]
//! and hands it to the shared [`ApiClient`].
//!
//! [`ApiRequest`]: crate::client::ApiRequest

pub mod items;
pub mod login;
pub mod sensor_data;
pub mod users;
pub mod utils;

use crate::client::ApiClient;

pub use self::{
    items::ItemsService, login::LoginService, sensor_data::SensorDataService,
    users::UsersService, utils::UtilsService,
};

/// Description attached to every 422 the backend may answer with.
pub(crate) const VALIDATION_ERROR: &str = "Validation Error";

/// Default page bounds of the list endpoints.
pub const DEFAULT_SKIP: u64 = 0;
pub const DEFAULT_LIMIT: u64 = 100;

impl ApiClient {
    pub fn login(&self) -> LoginService<'_> {
        LoginService::new(self)
    }

    pub fn users(&self) -> UsersService<'_> {
        UsersService::new(self)
    }

    pub fn utils(&self) -> UtilsService<'_> {
        UtilsService::new(self)
    }

    pub fn items(&self) -> ItemsService<'_> {
        ItemsService::new(self)
    }

    pub fn sensor_data(&self) -> SensorDataService<'_> {
        SensorDataService::new(self)
    }
}
