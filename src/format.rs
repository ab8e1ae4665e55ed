//! Display formatting helpers shared by the alert and map transforms.

use std::sync::LazyLock;

use chrono::NaiveDate;
use rand::Rng;
use regex::Regex;

/// `YYYY-MM-DD`, optionally followed by a `T` or space and a time part.
pub const ISO_DATE_PATTERN: &str = r"^(\d{4}-\d{2}-\d{2})(?:[T ].*)?$";

static ISO_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(ISO_DATE_PATTERN).expect("ISO date pattern compiles"));

/// Reformats an ISO-like date (`YYYY-MM-DD`, optionally followed by a time
/// part) to the en-US locale date string `M/D/YYYY`.
///
/// Anything that does not start with a valid calendar date is returned
/// unchanged.
pub fn format_date(s: &str) -> String {
    let Some(date_part) = ISO_DATE.captures(s).and_then(|caps| caps.get(1)) else {
        return s.to_string();
    };

    match NaiveDate::parse_from_str(date_part.as_str(), "%Y-%m-%d") {
        Ok(date) => date.format("%-m/%-d/%Y").to_string(),
        Err(_) => s.to_string(),
    }
}

/// Upper-cases the first character of every space-separated word and
/// lower-cases the rest.
pub fn capitalize_first_letter(s: &str) -> String {
    s.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// A random `#rrggbb` color for map layers without a configured one.
pub fn get_random_color() -> String {
    let value: u32 = rand::thread_rng().gen_range(0..=0xFF_FFFF);
    format!("#{:06x}", value)
}
