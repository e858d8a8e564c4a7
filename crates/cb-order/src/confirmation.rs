use crate::{error::DecodeError, Order};

/// The outcome of a successful submission, derived from the order the server sent back.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Confirmation {
    pub order: Order,
    pub message: String,
}

impl TryFrom<Order> for Confirmation {
    type Error = DecodeError;

    fn try_from(order: Order) -> Result<Self, DecodeError> {
        let drink = order
            .drink_name()
            .ok_or(DecodeError::DrinkTypeOutOfRange(order.drink_type))?;
        let message = format!(
            "Your Order for {} x {} coffee is on its way",
            order.quantity,
            drink.to_lowercase()
        );
        Ok(Self { order, message })
    }
}
