use thiserror::Error;

/// Errors raised while setting up a planning problem.
///
/// Everything here is a configuration error: rules, goals and inventories are
/// checked once at compile time, before any search starts. A search that runs
/// out of time is not an error and is reported through
/// [`SearchOutcome`](crate::SearchOutcome) instead.
#[derive(Error, Debug)]
pub enum PlannerError {
    /// A rule record lacks a field every rule must carry
    #[error("Rule '{rule}' is missing required field '{field}'")]
    MissingField { rule: String, field: &'static str },

    /// An item name that is not part of the declared vocabulary
    #[error("Unknown item '{item}' in {context}")]
    UnknownItem { context: String, item: String },

    /// Two rules share a name
    #[error("Rule already defined: {0}")]
    DuplicateRule(String),

    /// The vocabulary lists the same item twice
    #[error("Item already in vocabulary: {0}")]
    DuplicateItem(String),

    /// A quantity that is not a non-negative integer
    #[error("Invalid quantity {value} for item '{item}' in {context}")]
    InvalidQuantity {
        context: String,
        item: String,
        value: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PlannerError>;
