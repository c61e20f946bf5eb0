//! Write operations: run the call, report it with a toast, then invalidate
//! the affected queries whether it succeeded or not.

use std::future::Future;

use crate::{
    client::ApiError,
    query::{keys, QueryCache, QueryKey},
    toast::Toast,
};

/// Toast shown on success and the query roots refreshed once the call settles.
#[derive(Debug, Clone)]
pub struct MutationOptions {
    pub success: Toast,
    pub invalidate: Vec<QueryKey>,
}

impl MutationOptions {
    pub fn new(success_message: &str, invalidate: impl IntoIterator<Item = QueryKey>) -> Self {
        Self {
            success: Toast::success(success_message),
            invalidate: invalidate.into_iter().collect(),
        }
    }

    pub fn sensor_created() -> Self {
        Self::new("Sensor Data created successfully.", [keys::sensors()])
    }

    pub fn sensor_updated() -> Self {
        Self::new("Sensor Data updated successfully.", [keys::sensors()])
    }

    pub fn sensor_deleted() -> Self {
        Self::new("The sensor data was deleted successfully.", [keys::sensors()])
    }

    pub fn item_created() -> Self {
        Self::new("Item created successfully.", [keys::items()])
    }

    pub fn item_updated() -> Self {
        Self::new("Item updated successfully.", [keys::items()])
    }

    pub fn item_deleted() -> Self {
        Self::new("The item was deleted successfully.", [keys::items()])
    }

    pub fn user_created() -> Self {
        Self::new("User created successfully.", [keys::users()])
    }

    pub fn user_updated() -> Self {
        Self::new("User updated successfully.", [keys::users()])
    }

    pub fn user_deleted() -> Self {
        Self::new("The user was deleted successfully.", [keys::users()])
    }

    pub fn profile_updated() -> Self {
        Self::new("User updated successfully.", [keys::current_user()])
    }

    pub fn password_updated() -> Self {
        Self::new("Password updated successfully.", [])
    }

    pub fn account_deleted() -> Self {
        Self::new(
            "Your account has been successfully deleted.",
            [keys::current_user()],
        )
    }
}

#[derive(Debug)]
pub struct MutationOutcome<T> {
    pub result: Result<T, ApiError>,
    pub toast: Toast,
}

impl<T> MutationOutcome<T> {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Await `call`, pick the toast for its outcome and invalidate
/// `options.invalidate` in the cache.
pub async fn mutate<T, Fut>(
    cache: &QueryCache,
    options: MutationOptions,
    call: Fut,
) -> MutationOutcome<T>
where
    Fut: Future<Output = Result<T, ApiError>>,
{
    let result = call.await;
    let toast = match &result {
        Ok(_) => options.success,
        Err(e) => Toast::from_api_error(e),
    };
    toast.log();

    for key in &options.invalidate {
        cache.invalidate_queries(key).await;
    }

    MutationOutcome { result, toast }
}
