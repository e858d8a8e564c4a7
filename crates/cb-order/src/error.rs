use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("unable to parse the order: {0}")]
    ParseError(#[from] serde_json::Error),
    #[error("drink type {0} is not in the catalog")]
    DrinkTypeOutOfRange(usize),
    #[error("quantity {0} is outside the allowed range")]
    QuantityOutOfRange(u32),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("required fields are empty: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error("drink type {0} is not in the catalog")]
    DrinkTypeOutOfRange(usize),
    #[error("quantity {0} is outside the allowed range")]
    QuantityOutOfRange(u32),
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("the order is not ready to submit: {0}")]
    ValidationError(#[from] ValidationError),
    #[error("unable to encode the order: {0}")]
    EncodeError(#[source] serde_json::Error),
    #[error("the request failed: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("invalid response (status {status}): {body}")]
    InvalidResponseError {
        status: reqwest::StatusCode,
        body: String,
        #[source]
        source: DecodeError,
    },
    #[error("a submission is already in progress")]
    AlreadySubmitting,
}
