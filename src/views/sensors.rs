use std::fmt::Write;

use chrono::NaiveDateTime;

use super::table::{pager_line, Table};
use crate::{
    models::{SensorDataListPublic, SensorDataPublic},
    query::Pager,
};

pub const HEADING: &str = "Sensor Data Management";
pub const COLUMNS: [&str; 4] = ["Equipment ID", "Timestamp", "Value", "Actions"];

/// `dd/MM/yyyy HH:mm:ss`
pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format("%d/%m/%Y %H:%M:%S").to_string()
}

fn table(list: &SensorDataListPublic) -> Table {
    let mut table = Table::new(&COLUMNS);
    for record in &list.data {
        table.row(vec![
            record.equipment_id.clone(),
            format_timestamp(&record.timestamp),
            record.value.to_string(),
            record.id.to_string(),
        ]);
    }
    table
}

/// Sensor data page. The Actions column shows the id used by `edit`/`delete`.
pub fn render(list: &SensorDataListPublic, pager: &Pager, is_placeholder: bool) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "{HEADING}");
    let _ = writeln!(output);
    table(list).render(&mut output);
    if is_placeholder {
        let _ = writeln!(output, "(previous page shown while loading)");
    }
    let _ = writeln!(output);
    let _ = writeln!(
        output,
        "{}",
        pager_line(pager, pager.has_next_page(list.data.len(), is_placeholder))
    );
    output
}

/// Unpaged listing, e.g. every record of one equipment.
pub fn render_all(list: &SensorDataListPublic) -> String {
    let mut output = String::new();
    table(list).render(&mut output);
    let _ = writeln!(output);
    let _ = writeln!(output, "{} records", list.count);
    output
}

pub fn render_record(record: &SensorDataPublic) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "Id:           {}", record.id);
    let _ = writeln!(output, "Equipment ID: {}", record.equipment_id);
    let _ = writeln!(output, "Timestamp:    {}", format_timestamp(&record.timestamp));
    let _ = writeln!(output, "Value:        {}", record.value);
    output
}
