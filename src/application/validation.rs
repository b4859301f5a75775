//! Numeric prompts used by menu entries that ask for a value.

use crate::domain::errors::ValidationError;
use crate::domain::logging::get_time_provider;

/// How long a rejected entry's message stays visible
pub const ERROR_DISPLAY_MS: u64 = 3000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validator {
    Float,
    Integer,
    BoundedInteger { max: i64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PromptValue {
    Float(f64),
    Integer(i64),
}

impl PromptValue {
    pub fn as_f64(self) -> f64 {
        match self {
            PromptValue::Float(v) => v,
            PromptValue::Integer(v) => v as f64,
        }
    }
}

impl Validator {
    pub fn validate(&self, input: &str) -> Result<PromptValue, ValidationError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ValidationError::Empty);
        }
        match *self {
            Validator::Float => input
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(PromptValue::Float)
                .ok_or_else(|| ValidationError::NotAFloat(input.to_string())),
            Validator::Integer => parse_integer(input).map(PromptValue::Integer),
            Validator::BoundedInteger { max } => {
                let value = parse_integer(input)?;
                if value > max {
                    return Err(ValidationError::OutOfBounds { value, max });
                }
                Ok(PromptValue::Integer(value))
            }
        }
    }
}

fn parse_integer(input: &str) -> Result<i64, ValidationError> {
    input.parse::<i64>().map_err(|_| ValidationError::NotAnInteger(input.to_string()))
}

/// A labelled input box that keeps its last rejection on screen for a while
#[derive(Debug, Clone)]
pub struct Prompt {
    pub label: String,
    validator: Validator,
    error: Option<(String, u64)>,
}

impl Prompt {
    pub fn new(label: &str, validator: Validator) -> Self {
        Self { label: label.to_string(), validator, error: None }
    }

    pub fn submit(&mut self, input: &str) -> Result<PromptValue, ValidationError> {
        self.submit_at(input, get_time_provider().current_timestamp())
    }

    pub fn submit_at(&mut self, input: &str, now_ms: u64) -> Result<PromptValue, ValidationError> {
        match self.validator.validate(input) {
            Ok(value) => {
                self.error = None;
                Ok(value)
            }
            Err(e) => {
                self.error = Some((e.to_string(), now_ms));
                Err(e)
            }
        }
    }

    /// The rejection message, while it is still within its display window
    pub fn visible_error(&self, now_ms: u64) -> Option<&str> {
        self.error
            .as_ref()
            .filter(|(_, since)| now_ms.saturating_sub(*since) < ERROR_DISPLAY_MS)
            .map(|(message, _)| message.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validators() {
        assert_eq!(Validator::Float.validate(" 2.5 "), Ok(PromptValue::Float(2.5)));
        assert_eq!(Validator::Float.validate("abc"), Err(ValidationError::NotAFloat("abc".into())));
        assert_eq!(Validator::Integer.validate("2.5"), Err(ValidationError::NotAnInteger("2.5".into())));
        assert_eq!(
            Validator::BoundedInteger { max: 10 }.validate("11"),
            Err(ValidationError::OutOfBounds { value: 11, max: 10 })
        );
        assert_eq!(Validator::Integer.validate(""), Err(ValidationError::Empty));
    }

    #[test]
    fn error_message_times_out() {
        let mut prompt = Prompt::new("Levels", Validator::BoundedInteger { max: 9 });
        assert!(prompt.submit_at("12", 1_000).is_err());
        assert_eq!(prompt.visible_error(2_000), Some("12 exceeds the maximum of 9"));
        assert_eq!(prompt.visible_error(1_000 + ERROR_DISPLAY_MS), None);
        assert!(prompt.submit_at("3", 5_000).is_ok());
        assert_eq!(prompt.visible_error(5_001), None);
    }
}
