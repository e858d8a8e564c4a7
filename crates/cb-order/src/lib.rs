pub mod client;
pub mod confirmation;
pub mod constants;
pub mod error;
pub mod form;
pub mod order;
mod util;

pub use client::{Client, Endpoint};
pub use confirmation::Confirmation;
pub use form::{FormEvent, OrderForm, SubmissionState};
pub use order::{Order, OrderBuilder};
pub use util::default_http_client;
