/// The drink catalog, indexed by `Order::drink_type`
pub const DRINK_TYPES: [&str; 5] = ["Cappuccino", "Latte", "Americano", "Espresso", "Hot Chocolate"];

/// Bounds of the drink count, inclusive
pub const MIN_QUANTITY: u32 = 1;
pub const MAX_QUANTITY: u32 = 20;

/// The default endpoint orders are posted to
pub const DEFAULT_ORDER_ENDPOINT: &str = "https://reqres.in/api/coffee";

/// The content type sent with order requests
pub const JSON_CONTENT_TYPE: &str = "application/json";
