use tracing::{debug, info};
use uuid::Uuid;

use super::VALIDATION_ERROR;
use crate::{
    client::{ApiClient, ApiError, ApiRequest, FilePart},
    models::{
        BarChartDashboard, CsvImportStatus, DashboardFetch, LineChartDashboard, Message, OptionList,
        SensorDataCreate, SensorDataListPublic, SensorDataPublic, SensorDataUpdate,
    },
};

/// Multipart field the backend reads the uploaded CSV from.
pub const CSV_FIELD: &str = "sensor_data_csv_file";

pub struct SensorDataService<'a> {
    client: &'a ApiClient,
}

impl<'a> SensorDataService<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Newest first, then by equipment id.
    pub async fn read_sensors_data(
        &self,
        skip: u64,
        limit: u64,
    ) -> Result<SensorDataListPublic, ApiError> {
        let req = ApiRequest::get("/api/v1/sensor-data/")
            .query("skip", skip)
            .query("limit", limit)
            .error(422, VALIDATION_ERROR);
        self.client.request(req).await
    }

    pub async fn create_sensor_data(
        &self,
        body: &SensorDataCreate,
    ) -> Result<SensorDataPublic, ApiError> {
        let req = ApiRequest::post("/api/v1/sensor-data/")
            .json(body)?
            .error(422, VALIDATION_ERROR);
        self.client.request(req).await
    }

    pub async fn read_sensor_data(&self, id: Uuid) -> Result<SensorDataPublic, ApiError> {
        let req = ApiRequest::get("/api/v1/sensor-data/{id}")
            .path("id", id)
            .error(422, VALIDATION_ERROR);
        self.client.request(req).await
    }

    /// Every record emitted by one equipment.
    pub async fn read_sensor_data_by_equipment(
        &self,
        equipment_id: &str,
    ) -> Result<SensorDataListPublic, ApiError> {
        let req = ApiRequest::get("/api/v1/sensor-data/equipment/{equipment_id}")
            .path("equipment_id", equipment_id)
            .error(422, VALIDATION_ERROR);
        self.client.request(req).await
    }

    pub async fn update_sensor_data(
        &self,
        id: Uuid,
        body: &SensorDataUpdate,
    ) -> Result<SensorDataPublic, ApiError> {
        let req = ApiRequest::put("/api/v1/sensor-data/{id}")
            .path("id", id)
            .json(body)?
            .error(422, VALIDATION_ERROR);
        self.client.request(req).await
    }

    pub async fn delete_sensor_data(&self, id: Uuid) -> Result<Message, ApiError> {
        let req = ApiRequest::delete("/api/v1/sensor-data/{id}")
            .path("id", id)
            .error(422, VALIDATION_ERROR);
        self.client.request(req).await
    }

    /// Per-equipment averages over the window selected by `fetch`.
    pub async fn read_dashboard_bar_chart(
        &self,
        fetch: &DashboardFetch,
    ) -> Result<BarChartDashboard, ApiError> {
        debug!(fetch_mode = %fetch.fetch_mode, skip = ?fetch.skip, limit = fetch.limit, "Fetching bar chart");
        let req = ApiRequest::post("/api/v1/sensor-data/dashboard/bar-chart")
            .json(fetch)?
            .error(422, VALIDATION_ERROR);
        self.client.request(req).await
    }

    /// Hour-by-hour averages of every equipment over the last day.
    pub async fn read_dashboard_line_chart(&self) -> Result<LineChartDashboard, ApiError> {
        debug!("Fetching line chart");
        let req = ApiRequest::post("/api/v1/sensor-data/dashboard/line-chart")
            .error(422, VALIDATION_ERROR);
        self.client.request(req).await
    }

    /// Distinct equipment ids, as select options.
    pub async fn read_equipment_options(&self) -> Result<OptionList, ApiError> {
        let req = ApiRequest::get("/api/v1/sensor-data/options/equipment")
            .error(422, VALIDATION_ERROR);
        self.client.request(req).await
    }

    /// Upload one CSV file; the backend creates a record per valid row.
    pub async fn import_csv(
        &self,
        file_name: &str,
        contents: Vec<u8>,
    ) -> Result<CsvImportStatus, ApiError> {
        info!(file_name = %file_name, bytes = contents.len(), "Uploading sensor data CSV");
        let req = ApiRequest::post("/api/v1/sensor-data/csv")
            .file(FilePart {
                field: CSV_FIELD.to_owned(),
                file_name: file_name.to_owned(),
                content_type: "text/csv".to_owned(),
                bytes: contents,
            })
            .error(422, VALIDATION_ERROR);
        self.client.request(req).await
    }
}
