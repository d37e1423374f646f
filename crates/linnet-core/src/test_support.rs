//! Shared fixtures for unit tests.

use chrono::{TimeZone, Utc};

use crate::record::Stamp;
use crate::schema::{Cardinality, EdgeDefinition, EdgeSchema};

/// Customer.orders (principal) <-> Order.customer, plus Order.products
/// (principal) <-> Product.orders.
pub(crate) fn customer_order_schema() -> EdgeSchema {
    EdgeSchema::new(vec![
        EdgeDefinition::new("Customer", "orders", "Order", "OrdersOnCustomer")
            .with_counterpart("Order", "customer"),
        EdgeDefinition::new("Order", "customer", "Customer", "OrdersOnCustomer")
            .with_cardinality(Cardinality::One)
            .with_principal(false)
            .with_required(true)
            .with_counterpart("Customer", "orders"),
        EdgeDefinition::new("Order", "products", "Product", "ProductsOnOrder")
            .with_counterpart("Product", "orders"),
        EdgeDefinition::new("Product", "orders", "Order", "ProductsOnOrder")
            .with_principal(false)
            .with_counterpart("Order", "products"),
    ])
}

/// Fixed stamp at 2018-02-01T01:00:00Z.
pub(crate) fn stamp() -> Stamp {
    Stamp::new(Utc.timestamp_opt(1_517_446_800, 10).unwrap(), "linnet")
}
