//! Pledge Checkout Domain Types
//!
//! This crate defines the data a checkout session works over: the
//! reward being backed, its add-ons, the shipping rules that price
//! delivery, and the project (and any existing backing) the pledge
//! belongs to.
//!
//! # Key Concepts
//!
//! - **Amount**: a non-negative quantity of money in the minor units of
//!   the project currency. All arithmetic is integer; rounding only
//!   happens at the edges (parsing user input, currency conversion).
//! - **Reward**: a tier with a minimum amount and optional shipping.
//!   The "no reward" placeholder is a reward whose minimum is the
//!   country's pledge floor and which never ships.
//! - **AddOn**: an extra reward bought alongside the main reward, with a
//!   quantity that is never zero.
//! - **ShippingRule**: the shipping cost of one item to one destination.
//! - **PledgeReason**: why the checkout was opened (new pledge, update,
//!   payment fix, ...), which governs what may be edited.
//!
//! # Architecture
//!
//! This is a pure types crate with no runtime dependencies. IDs use the
//! newtype pattern and implement `Display`, `generate()`, and `new()`.

#![deny(unsafe_code)]

mod country;
mod errors;
mod money;
mod project;
mod reason;
mod reward;
mod shipping;

pub use country::*;
pub use errors::*;
pub use money::*;
pub use project::*;
pub use reason::*;
pub use reward::*;
pub use shipping::*;
