//! Input and parsing helper functions for the CLI.

mod input;
mod parsing;

pub use input::{can_prompt, confirm, password_or_prompt, text_or_prompt};
pub use parsing::{
    guess_mime, parse_amount, parse_choice, parse_date, parse_on_off, parse_timezone,
};
