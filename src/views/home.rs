use std::fmt::Write;

use crate::models::UserPublic;

pub fn greeting(user: &UserPublic) -> String {
    format!("Welcome back, {}!", user.display_name())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavItem {
    pub title: &'static str,
    pub command: &'static str,
}

const ITEMS: [(u8, NavItem); 4] = [
    (1, NavItem { title: "Home", command: "me" }),
    (2, NavItem { title: "Dashboard", command: "dashboard" }),
    (3, NavItem { title: "Sensors", command: "sensors list" }),
    (5, NavItem { title: "User Settings", command: "users update-me" }),
];

const SUPERUSER_ITEMS: [(u8, NavItem); 2] = [
    (4, NavItem { title: "Upload", command: "upload" }),
    (6, NavItem { title: "Admin", command: "users list" }),
];

/// Sections available to `user`; Upload and Admin need a superuser.
pub fn nav_items(user: &UserPublic) -> Vec<NavItem> {
    let mut items: Vec<_> = ITEMS.to_vec();
    if user.is_superuser {
        items.extend(SUPERUSER_ITEMS);
    }
    items.sort_by_key(|(index, _)| *index);
    items.into_iter().map(|(_, item)| item).collect()
}

pub fn render(user: &UserPublic) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "{}", greeting(user));
    let _ = writeln!(output);
    for item in nav_items(user) {
        let _ = writeln!(output, "  {:<14} sensor-admin {}", item.title, item.command);
    }
    output
}
