use std::path::Path;

use tokio::fs;
use tracing::{info, warn};

use crate::{
    client::ApiClient,
    models::CsvImportStatus,
    query::{keys, QueryCache},
    toast::Toast,
};

/// Result of one upload attempt as shown to the user.
#[derive(Debug)]
pub struct ImportOutcome {
    /// Row counts, when the backend answered.
    pub status: Option<CsvImportStatus>,
    pub toast: Toast,
}

/// Toast for the row counts of a finished upload.
pub fn toast_for(status: CsvImportStatus) -> Toast {
    let CsvImportStatus {
        count_success,
        count_fail,
    } = status;

    if count_fail == 0 {
        Toast::success(format!("All rows ({count_success}) imported successfully!"))
    } else if count_success == 0 {
        Toast::error(
            "Fail",
            format!("All rows ({count_fail}) failed to be imported. Please verify your csv file."),
        )
    } else {
        Toast::warning(
            "Warning",
            format!(
                "Upload finished. {count_success} rows imported, but {count_fail} was not possible."
            ),
        )
    }
}

/// Upload `file` as sensor data. With no file nothing is sent.
///
/// Sensor list queries are invalidated after every attempt that reached the
/// backend.
pub async fn import_file(
    client: &ApiClient,
    cache: &QueryCache,
    file: Option<&Path>,
) -> ImportOutcome {
    let Some(path) = file else {
        let toast = Toast::warning("Warning", "Please upload a csv file...");
        toast.log();
        return ImportOutcome { status: None, toast };
    };

    let contents = match fs::read(path).await {
        Ok(contents) => contents,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "csv_import: failed to read file");
            let toast = Toast::error("Error", format!("Could not read {}: {e}", path.display()));
            return ImportOutcome { status: None, toast };
        }
    };

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload.csv".to_owned());

    let result = client.sensor_data().import_csv(&file_name, contents).await;
    cache.invalidate_queries(&keys::sensors()).await;

    let outcome = match result {
        Ok(status) => {
            info!(
                file_name = %file_name,
                count_success = status.count_success,
                count_fail = status.count_fail,
                "csv_import: finished"
            );
            ImportOutcome {
                status: Some(status),
                toast: toast_for(status),
            }
        }
        Err(e) => ImportOutcome {
            status: None,
            toast: Toast::from_api_error(&e),
        },
    };
    outcome.toast.log();
    outcome
}
