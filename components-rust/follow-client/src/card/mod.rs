//! Plain-text rendering of user cards for the terminal.

use crate::dashboard::UserRow;
use common_lib::{FollowStatus, ManagedUser, UserSummary, PLACEHOLDER_AVATAR_URL};
use std::fmt::Write;

/// `999`, `1.2k`, `3.4M`. Trailing `.0` is dropped.
pub fn compact_count(count: u64) -> String {
    fn scaled(count: u64, unit: f64, suffix: &str) -> String {
        let value = format!("{:.1}", count as f64 / unit);
        let value = value.strip_suffix(".0").unwrap_or(&value);
        format!("{value}{suffix}")
    }

    match count {
        0..=999 => count.to_string(),
        1_000..=999_949 => scaled(count, 1_000.0, "k"),
        _ => scaled(count, 1_000_000.0, "M"),
    }
}

pub fn avatar_or_placeholder(avatar_url: &str) -> &str {
    if avatar_url.trim().is_empty() {
        PLACEHOLDER_AVATAR_URL
    } else {
        avatar_url
    }
}

/// Button label for a row, `None` for the viewer's own card.
pub fn button_label(row: &UserRow) -> Option<&'static str> {
    if row.is_self {
        return None;
    }
    match row.status {
        FollowStatus::Following => Some("Following"),
        FollowStatus::Follow | FollowStatus::None => Some("Follow"),
    }
}

fn write_summary(out: &mut String, user: &UserSummary) {
    let _ = writeln!(out, "{} (@{})", user.full_name, user.username);
    let _ = writeln!(out, "  id: {}", user.id);
    let _ = writeln!(out, "  avatar: {}", avatar_or_placeholder(&user.avatar_url));
    let _ = writeln!(
        out,
        "  {} followers | {} following",
        compact_count(user.followers_count),
        compact_count(user.following_count)
    );
    if let Some(bio) = user.bio.as_deref().filter(|b| !b.trim().is_empty()) {
        let _ = writeln!(out, "  {bio}");
    }
}

pub fn render_row(row: &UserRow) -> String {
    let mut out = String::new();
    write_summary(&mut out, &row.user);
    match button_label(row) {
        Some(label) => {
            let friend = if row.user.is_friend { " (friend)" } else { "" };
            let _ = writeln!(out, "  [ {label} ]{friend}");
        }
        None => {
            let _ = writeln!(out, "  (you)");
        }
    }
    out
}

pub fn render_rows(rows: &[UserRow], empty_message: &str) -> String {
    if rows.is_empty() {
        return format!("{empty_message}\n");
    }
    rows.iter().map(render_row).collect::<Vec<_>>().join("\n")
}

pub fn render_managed(user: &ManagedUser) -> String {
    let mut out = String::new();
    write_summary(&mut out, &user.summary);
    if let Some(email) = &user.email {
        let _ = writeln!(out, "  email: {email}");
    }
    out
}
