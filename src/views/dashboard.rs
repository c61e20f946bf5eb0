use std::fmt::Write;

use super::{
    sensors::format_timestamp,
    table::{pager_line, Table},
};
use crate::{
    dashboard::DashboardView,
    models::{BarChartItem, FetchMode, LineChartDashboard, OptionList},
};

pub const HEADING: &str = "Dashboard";
pub const EMPTY_MESSAGE: &str = "There were no entries for the data period selected.";
pub const HOURLY_HEADING: &str = "Hourly averages (last 24h)";
pub const HOURLY_EMPTY_MESSAGE: &str = "No readings in the last 24 hours.";
const BAR_WIDTH: usize = 40;

/// Horizontal bar chart, one bar per equipment, scaled to the largest
/// absolute average.
pub fn render_chart(items: &[BarChartItem], output: &mut String) {
    let max = items.iter().map(|i| i.avg.abs()).fold(0.0_f64, f64::max);
    let label_width = items
        .iter()
        .map(|i| i.equipment_id.chars().count())
        .max()
        .unwrap_or(0);

    for item in items {
        let len = if max > 0.0 {
            ((item.avg.abs() / max) * BAR_WIDTH as f64).round() as usize
        } else {
            0
        };
        let _ = writeln!(
            output,
            "{:<label_width$} | {} {}",
            item.equipment_id,
            "#".repeat(len),
            item.avg,
        );
    }
}

fn render_filter(view: &DashboardView, output: &mut String) {
    let filter = &view.filter;
    let _ = writeln!(output, "Period: {}", filter.fetch_mode.label());
    if filter.fetch_mode == FetchMode::Custom {
        let start = filter
            .begin_custom_date
            .as_ref()
            .map(format_timestamp)
            .unwrap_or_default();
        let end = filter
            .end_custom_date
            .as_ref()
            .map(format_timestamp)
            .unwrap_or_else(|| "now".to_owned());
        let _ = writeln!(output, "Range:  {start} .. {end}");
    }
    if filter.equipment_ids.is_empty() {
        let _ = writeln!(output, "Equipments: all");
    } else {
        let _ = writeln!(output, "Equipments: {}", filter.equipment_ids.join(", "));
    }
}

pub fn render(view: &DashboardView) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "{HEADING}");
    let _ = writeln!(output);
    render_filter(view, &mut output);
    let _ = writeln!(output);

    if view.data.count == 0 {
        let _ = writeln!(output, "{EMPTY_MESSAGE}");
        return output;
    }

    render_chart(&view.data.data, &mut output);
    let _ = writeln!(output);

    let mut table = Table::new(&["Equipment ID", "Average"]);
    for item in &view.data.data {
        table.row(vec![item.equipment_id.clone(), item.avg.to_string()]);
    }
    table.render(&mut output);
    if view.is_placeholder {
        let _ = writeln!(output, "(previous results shown while loading)");
    }
    let _ = writeln!(output);
    let _ = writeln!(output, "{}", pager_line(&view.pager, view.has_next_page()));
    output
}

/// One block per equipment, one line per hour. Bars share a single scale
/// across every equipment so the series can be compared.
pub fn render_hourly(chart: &LineChartDashboard) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "{HOURLY_HEADING}");
    let _ = writeln!(output);
    if chart.data.is_empty() {
        let _ = writeln!(output, "{HOURLY_EMPTY_MESSAGE}");
        return output;
    }

    let max = chart.data.iter().map(|i| i.avg.abs()).fold(0.0_f64, f64::max);
    let mut current: Option<&str> = None;
    for item in &chart.data {
        if current != Some(item.equipment_id.as_str()) {
            if current.is_some() {
                let _ = writeln!(output);
            }
            let _ = writeln!(output, "{}", item.equipment_id);
            current = Some(item.equipment_id.as_str());
        }
        let len = if max > 0.0 {
            ((item.avg.abs() / max) * BAR_WIDTH as f64).round() as usize
        } else {
            0
        };
        let _ = writeln!(
            output,
            "  {} | {} {}",
            item.date_trunc.format("%d/%m %H:00"),
            "#".repeat(len),
            item.avg,
        );
    }
    output
}

/// Equipment ids a user can pick from.
pub fn render_options(options: &OptionList) -> String {
    let mut output = String::new();
    if options.data.is_empty() {
        let _ = writeln!(output, "No equipment has reported data yet.");
        return output;
    }
    for option in &options.data {
        let _ = writeln!(output, "{}", option.label);
    }
    output
}
