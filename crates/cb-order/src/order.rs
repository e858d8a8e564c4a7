use derive_builder::Builder;
use serde::{de, Deserialize, Deserializer, Serialize};

use crate::constants::{DRINK_TYPES, MAX_QUANTITY, MIN_QUANTITY};
use crate::error::{DecodeError, ValidationError};

/// A coffee order along with its delivery details.
///
/// Field order matches the wire format. `special_request_enabled` only drives
/// the form and is never sent; the extras are always sent.
#[derive(Builder, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[builder(default, setter(into), build_fn(validate = "Self::validate"))]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Index into [`DRINK_TYPES`]
    #[serde(rename = "type", deserialize_with = "integral")]
    pub drink_type: usize,
    #[serde(deserialize_with = "integral")]
    pub quantity: u32,
    #[serde(skip)]
    pub special_request_enabled: bool,
    pub extra_sugar: bool,
    pub extra_milk: bool,
    pub name: String,
    pub address: String,
    pub phone_number: String,
    pub city: String,
    pub post_code: String,
}

impl Default for Order {
    fn default() -> Self {
        Self {
            drink_type: 0,
            quantity: MIN_QUANTITY,
            special_request_enabled: false,
            extra_sugar: false,
            extra_milk: false,
            name: String::new(),
            address: String::new(),
            phone_number: String::new(),
            city: String::new(),
            post_code: String::new(),
        }
    }
}

impl Order {
    /// Whether every delivery field has been filled in. Whitespace counts as filled.
    pub fn is_valid(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Wire names of the delivery fields that are still empty.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("name", &self.name),
            ("address", &self.address),
            ("phoneNumber", &self.phone_number),
            ("city", &self.city),
            ("postCode", &self.post_code),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(field, _)| field)
        .collect()
    }

    /// Check everything a submission needs: delivery fields plus catalog and quantity bounds.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.check_ranges()?;
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(ValidationError::MissingFields(missing));
        }
        Ok(())
    }

    pub fn drink_name(&self) -> Option<&'static str> {
        DRINK_TYPES.get(self.drink_type).copied()
    }

    pub fn encode(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Parse an order from its wire form. Unknown keys are ignored.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let order: Order = serde_json::from_slice(bytes)?;
        if order.drink_name().is_none() {
            return Err(DecodeError::DrinkTypeOutOfRange(order.drink_type));
        }
        if !quantity_in_range(order.quantity) {
            return Err(DecodeError::QuantityOutOfRange(order.quantity));
        }
        Ok(order)
    }

    fn check_ranges(&self) -> Result<(), ValidationError> {
        check_ranges(self.drink_type, self.quantity)
    }
}

/// Accept a JSON number with no fractional part, including forms like `2.0`.
fn integral<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<u64>,
{
    let number = serde_json::Number::deserialize(deserializer)?;
    number
        .as_u64()
        .or_else(|| {
            number
                .as_f64()
                .filter(|value| {
                    value.fract() == 0.0 && *value >= 0.0 && *value <= u64::MAX as f64
                })
                .map(|value| value as u64)
        })
        .and_then(|value| T::try_from(value).ok())
        .ok_or_else(|| {
            let message = format!("expected a non-negative integer, found {number}");
            <D::Error as de::Error>::custom(message)
        })
}

fn check_ranges(drink_type: usize, quantity: u32) -> Result<(), ValidationError> {
    if drink_type >= DRINK_TYPES.len() {
        return Err(ValidationError::DrinkTypeOutOfRange(drink_type));
    }
    if !quantity_in_range(quantity) {
        return Err(ValidationError::QuantityOutOfRange(quantity));
    }
    Ok(())
}

fn quantity_in_range(quantity: u32) -> bool {
    (MIN_QUANTITY..=MAX_QUANTITY).contains(&quantity)
}

impl OrderBuilder {
    fn validate(&self) -> Result<(), String> {
        let defaults = Order::default();
        check_ranges(
            self.drink_type.unwrap_or(defaults.drink_type),
            self.quantity.unwrap_or(defaults.quantity),
        )
        .map_err(|err| err.to_string())
    }
}
