//! Free-text meal command parser.
//!
//! Grammar (keyword and meal type are case-insensitive):
//!
//! ```text
//! command   := "log" WS meal_type ":" item_list
//! meal_type := "breakfast" | "lunch" | "dinner"
//! item_list := item ("," item)*
//! ```
//!
//! Items are trimmed and empty ones dropped; at least one must remain.
//!
//! A bare `log` with nothing after it reports [`ParseError::MissingSeparator`],
//! since the keyword is present but the `meal_type ":"` part is not. Every
//! variant renders the same fixed message at the transport boundary.

use crate::{MealLogCommand, MealType};

const KEYWORD: &str = "log";

/// Which grammar rule a message broke
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("message is empty")]
    Empty,

    #[error("message must start with the 'log' keyword")]
    MissingKeyword,

    #[error("expected ':' between meal type and food items")]
    MissingSeparator,

    #[error("unsupported meal type '{0}'")]
    UnknownMealType(String),

    #[error("no food items provided")]
    NoItems,
}

type ParseResult<T> = std::result::Result<T, ParseError>;

/// Parse a webhook message such as `log lunch: rice, dal, cucumber`
pub fn parse(text: &str) -> ParseResult<MealLogCommand> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ParseError::Empty);
    }

    let rest = take_keyword(text)?;
    let (meal_type, rest) = take_meal_type(rest)?;
    let food_items = take_items(rest)?;

    Ok(MealLogCommand {
        meal_type,
        food_items,
    })
}

/// Consume `log` plus the whitespace after it
fn take_keyword(text: &str) -> ParseResult<&str> {
    match text.split_once(char::is_whitespace) {
        Some((word, rest)) if word.eq_ignore_ascii_case(KEYWORD) => Ok(rest),
        // bare "log" with nothing after it
        None if text.eq_ignore_ascii_case(KEYWORD) => Err(ParseError::MissingSeparator),
        _ => Err(ParseError::MissingKeyword),
    }
}

/// Consume `<meal_type>:`
fn take_meal_type(text: &str) -> ParseResult<(MealType, &str)> {
    let (head, rest) = text
        .split_once(':')
        .ok_or(ParseError::MissingSeparator)?;

    let meal_type = head
        .parse::<MealType>()
        .map_err(|_| ParseError::UnknownMealType(head.trim().to_lowercase()))?;

    Ok((meal_type, rest))
}

/// Consume the comma-separated item list
fn take_items(text: &str) -> ParseResult<Vec<String>> {
    let items: Vec<String> = text
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect();

    if items.is_empty() {
        return Err(ParseError::NoItems);
    }
    Ok(items)
}
