// Input validation for contact form fields

use regex::Regex;
use std::sync::LazyLock;

/// Letters (Latin or Cyrillic), single apostrophes, dashes and inner spaces
static NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Zа-яА-Я]+(([' -][a-zA-Zа-яА-Я ])?[a-zA-Zа-яА-Я]*)*$")
        .expect("name pattern compiles")
});

static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]{3}-[0-9]{2}-[0-9]{2}").expect("number pattern compiles"));

/// Required length of a phone number, dashes included
pub const NUMBER_LEN: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Number,
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Field::Name => write!(f, "name"),
            Field::Number => write!(f, "number"),
        }
    }
}

/// Why a form field was rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("This field is required")]
    Required(Field),

    #[error("Name may contain only letters, apostrophes, dashes and spaces")]
    NameFormat,

    #[error("Number may contain only digits and dashes. Format: 123-45-67")]
    NumberFormat,

    #[error("Number must be exactly {NUMBER_LEN} characters")]
    NumberLength,
}

impl ValidationError {
    pub fn field(&self) -> Field {
        match self {
            ValidationError::Required(field) => *field,
            ValidationError::NameFormat => Field::Name,
            ValidationError::NumberFormat | ValidationError::NumberLength => Field::Number,
        }
    }
}

pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::Required(Field::Name));
    }
    if !NAME_RE.is_match(name) {
        return Err(ValidationError::NameFormat);
    }
    Ok(())
}

pub fn validate_number(number: &str) -> Result<(), ValidationError> {
    if number.is_empty() {
        return Err(ValidationError::Required(Field::Number));
    }
    if !NUMBER_RE.is_match(number) {
        return Err(ValidationError::NumberFormat);
    }
    if number.chars().count() != NUMBER_LEN {
        return Err(ValidationError::NumberLength);
    }
    Ok(())
}

/// Validate both fields, name first
pub fn validate_contact(name: &str, number: &str) -> Result<(), ValidationError> {
    validate_name(name)?;
    validate_number(number)
}
