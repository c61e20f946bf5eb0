use std::fmt::Write;

use super::table::{pager_line, Table};
use crate::{models::ItemsPublic, query::Pager};

pub const HEADING: &str = "Items Management";

pub fn render(list: &ItemsPublic, pager: &Pager) -> String {
    let mut table = Table::new(&["ID", "Title", "Description", "Actions"]);
    for item in &list.data {
        table.row(vec![
            item.id.to_string(),
            item.title.clone(),
            item.description.clone().unwrap_or_else(|| "N/A".to_owned()),
            item.id.to_string(),
        ]);
    }

    let mut output = String::new();
    let _ = writeln!(output, "{HEADING}");
    let _ = writeln!(output);
    table.render(&mut output);
    let _ = writeln!(output);
    let _ = writeln!(
        output,
        "{}",
        pager_line(pager, pager.has_next_page(list.data.len(), false))
    );
    output
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::models::ItemPublic;

    #[test]
    fn missing_description_shows_na() {
        let list = ItemsPublic {
            data: vec![ItemPublic {
                id: Uuid::nil(),
                title: "Thermostat".into(),
                description: None,
                owner_id: Uuid::nil(),
            }],
            count: 1,
        };
        let out = render(&list, &Pager::new(0, 5));
        assert!(out.starts_with(HEADING));
        assert!(out.contains("Thermostat"));
        assert!(out.contains("N/A"));
    }
}
