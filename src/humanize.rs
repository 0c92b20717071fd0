use chrono::{DateTime, Utc};

use crate::timewindow::{days_since, parse_instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    Tr,
    En,
}

/// Relative "last seen" text for a `last_active` timestamp.
/// An absent or unparseable timestamp reads as never logged in.
pub fn format_passive_days(
    last_active: Option<&str>,
    now: DateTime<Utc>,
    locale: Locale,
) -> String {
    let Some(raw) = last_active.filter(|raw| parse_instant(raw).is_some()) else {
        return match locale {
            Locale::Tr => "Hiç giriş yapmadı".to_string(),
            Locale::En => "Never logged in".to_string(),
        };
    };

    format_days(days_since(Some(raw), now), locale)
}

pub fn format_days(days: i64, locale: Locale) -> String {
    match (locale, days) {
        (Locale::Tr, i64::MIN..=0) => "Bugün".to_string(),
        (Locale::En, i64::MIN..=0) => "Today".to_string(),
        (Locale::Tr, 1) => "Dün".to_string(),
        (Locale::En, 1) => "Yesterday".to_string(),
        (Locale::Tr, 2..=6) => format!("{days} gün önce"),
        (Locale::En, 2..=6) => format!("{days} days ago"),
        (Locale::Tr, 7..=29) => format!("{} hafta önce", days / 7),
        (Locale::En, 7..=29) => plural(days / 7, "week"),
        (Locale::Tr, _) => format!("{} ay önce", days / 30),
        (Locale::En, _) => plural(days / 30, "month"),
    }
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{count} {unit}s ago")
    }
}
