//! Domain errors raised by the pure ledger logic

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("Invalid year {0}")]
    InvalidYear(i32),

    #[error("Invalid month {0}: must be between 1 and 12")]
    InvalidMonth(u32),

    #[error("Invalid ISO week {week} for year {year}")]
    InvalidWeek { year: i32, week: u32 },

    #[error("A week can only be selected together with its month")]
    WeekWithoutMonth,

    #[error("Unknown ingredient: {0}")]
    UnknownIngredient(String),

    #[error("Unknown period type: {0}")]
    UnknownPeriodType(String),

    #[error("Quantity sold of {0} is too large")]
    QuantityTooLarge(String),
}

impl DomainError {
    /// Name of the request field the error refers to
    pub fn field(&self) -> &'static str {
        match self {
            DomainError::InvalidYear(_) => "year",
            DomainError::InvalidMonth(_) => "month",
            DomainError::InvalidWeek { .. } | DomainError::WeekWithoutMonth => "week",
            DomainError::UnknownIngredient(_) => "ingredient",
            DomainError::UnknownPeriodType(_) => "period_type",
            DomainError::QuantityTooLarge(_) => "sales",
        }
    }
}
