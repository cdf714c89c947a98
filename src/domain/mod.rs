//! Checkout domain model: customer aggregates, orders, payment requests and
//! the ports the application layer talks to.

pub mod customer;
pub mod email;
pub mod order;
pub mod payment;
pub mod ports;
pub mod purchase;
