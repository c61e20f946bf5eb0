use std::fmt::Write;

use crate::toast::Toast;

pub const HEADING: &str = "Import data from csv";

/// Upload page, optionally followed by the toast of the last attempt.
pub fn render(last: Option<&Toast>) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "{HEADING}");
    let _ = writeln!(
        output,
        "You can add missing data from sensors by uploading a csv file."
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "File: <Select a csv file>  (sensor-admin upload <file.csv>)");
    let _ = writeln!(output, "[Upload data]");
    if let Some(toast) = last {
        let _ = writeln!(output);
        let _ = writeln!(output, "{toast}");
    }
    output
}
