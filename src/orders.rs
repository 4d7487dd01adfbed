//! Order entity helpers

use serde_json::Value;

use crate::api::models::Order;

/// Test if an order is on hold.
pub fn is_order_on_hold(order: &Order) -> bool {
    order.get("status").and_then(Value::as_str) == Some("holded")
        || order.contains_key("hold_before_state")
}

/// Test if an order is paid with cash on delivery.
pub fn is_order_cash_on_delivery(order: &Order) -> bool {
    order
        .get("payment")
        .and_then(|payment| payment.get("method"))
        .and_then(Value::as_str)
        == Some("cashondelivery")
}

/// The first shipping address of an order, if any.
///
/// The returned value is a reference into the order; clone it before editing
/// if the order must stay untouched.
pub fn get_order_shipping_address(order: &Order) -> Option<&Value> {
    order
        .get("extension_attributes")?
        .get("shipping_assignments")?
        .get(0)?
        .get("shipping")?
        .get("address")
}
