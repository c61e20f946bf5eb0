use std::fmt::Write;

use uuid::Uuid;

use super::table::{pager_line, Table};
use crate::{
    models::{UserPublic, UsersPublic},
    query::Pager,
};

pub const HEADING: &str = "User Management";

fn role(user: &UserPublic) -> &'static str {
    if user.is_superuser {
        "Superuser"
    } else {
        "User"
    }
}

fn status(user: &UserPublic) -> &'static str {
    if user.is_active {
        "Active"
    } else {
        "Inactive"
    }
}

/// User list; `current_user` is marked "(You)".
pub fn render(list: &UsersPublic, pager: &Pager, current_user: Option<Uuid>) -> String {
    let mut table = Table::new(&["Full name", "Email", "Role", "Status", "Actions"]);
    for user in &list.data {
        let mut name = user.full_name.clone().unwrap_or_else(|| "N/A".to_owned());
        if current_user == Some(user.id) {
            name.push_str(" (You)");
        }
        table.row(vec![
            name,
            user.email.clone(),
            role(user).to_owned(),
            status(user).to_owned(),
            user.id.to_string(),
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

/// Single user detail, as printed by `me` and `users show`.
pub fn render_user(user: &UserPublic) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "Id:        {}", user.id);
    let _ = writeln!(output, "Email:     {}", user.email);
    let _ = writeln!(
        output,
        "Full name: {}",
        user.full_name.as_deref().unwrap_or("N/A")
    );
    let _ = writeln!(output, "Role:      {}", role(user));
    let _ = writeln!(output, "Status:    {}", status(user));
    output
}
