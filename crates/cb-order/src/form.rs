use std::fmt;

use tracing::{debug, warn};

use crate::{error::SubmitError, Client, Confirmation, Order};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SubmissionState {
    #[default]
    Idle,
    Submitting,
    Confirmed(Confirmation),
    Failed(String),
}

/// Sent to observers whenever the form changes.
#[derive(Debug)]
pub enum FormEvent<'a> {
    OrderChanged(&'a Order),
    StateChanged(&'a SubmissionState),
}

const CANCELLED: &str = "the submission was cancelled";

type Observer = Box<dyn FnMut(&FormEvent<'_>) + Send>;

/// The order being filled in during a session, and the state of its submission.
///
/// Only one submission can be in flight at a time.
#[derive(Default)]
pub struct OrderForm {
    order: Order,
    state: SubmissionState,
    observers: Vec<Observer>,
}

impl fmt::Debug for OrderForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderForm")
            .field("order", &self.order)
            .field("state", &self.state)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl OrderForm {
    pub fn new(order: Order) -> Self {
        Self {
            order,
            ..Self::default()
        }
    }

    pub fn order(&self) -> &Order {
        &self.order
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    pub fn subscribe<F>(&mut self, observer: F)
    where
        F: FnMut(&FormEvent<'_>) + Send + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    /// Edit the order in place, then notify observers.
    pub fn update<F: FnOnce(&mut Order)>(&mut self, edit: F) {
        edit(&mut self.order);
        notify(&mut self.observers, FormEvent::OrderChanged(&self.order));
    }

    pub fn can_submit(&self) -> bool {
        self.order.is_valid() && self.state != SubmissionState::Submitting
    }

    /// Submit the current order through `client`.
    ///
    /// An invalid order is rejected without leaving `Idle`. Every other outcome
    /// is recorded in the state and returned. Dropping the future before it
    /// completes leaves the form `Failed` so the order can be resubmitted.
    pub async fn submit(&mut self, client: &Client) -> Result<Confirmation, SubmitError> {
        if self.state == SubmissionState::Submitting {
            return Err(SubmitError::AlreadySubmitting);
        }
        self.order.validate()?;

        self.set_state(SubmissionState::Submitting);
        let mut in_flight = InFlight {
            form: self,
            settled: false,
        };
        let result = client.submit(&in_flight.form.order).await;
        in_flight.settled = true;
        let next = match &result {
            Ok(confirmation) => SubmissionState::Confirmed(confirmation.clone()),
            Err(err) => SubmissionState::Failed(err.to_string()),
        };
        in_flight.form.set_state(next);
        result
    }

    /// Start over with a fresh order.
    pub fn reset(&mut self) {
        self.order = Order::default();
        notify(&mut self.observers, FormEvent::OrderChanged(&self.order));
        self.set_state(SubmissionState::Idle);
    }

    fn set_state(&mut self, state: SubmissionState) {
        debug!(from = ?self.state, to = ?state, "submission state changed");
        self.state = state;
        notify(&mut self.observers, FormEvent::StateChanged(&self.state));
    }
}

/// Moves the form out of `Submitting` if a submission is dropped mid-flight.
struct InFlight<'a> {
    form: &'a mut OrderForm,
    settled: bool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.settled {
            warn!("order submission cancelled before a response arrived");
            self.form
                .set_state(SubmissionState::Failed(CANCELLED.to_string()));
        }
    }
}

fn notify(observers: &mut [Observer], event: FormEvent<'_>) {
    for observer in observers.iter_mut() {
        observer(&event);
    }
}
