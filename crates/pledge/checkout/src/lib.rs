//! Pledge Checkout Session
//!
//! Drives a checkout from the moment a backer picks a reward until the
//! total is handed to payment submission. Every UI input is a message;
//! a reducer applies it to the session state and the derived snapshot
//! (total, limits, button states) is republished.
//!
//! # Key Concepts
//!
//! - **CheckoutContext**: the current user and platform configuration,
//!   passed in explicitly instead of read from globals.
//! - **CheckoutEvent**: one input (shipping selected, bonus typed, add-ons
//!   changed, shipping rules arrived...).
//! - **CheckoutState::reduce**: applies an event and returns the effects
//!   to run, such as fetching shipping rules.
//! - **CheckoutSnapshot**: everything derived from the state, recomputed
//!   in full after every event.
//!
//! # Architecture
//!
//! ```text
//!  CheckoutHandle ──mpsc──▶ session task ──▶ CheckoutState::reduce
//!                                │                  │
//!                                │            Effect::FetchShippingRules
//!                                │                  ▼
//!                                │        ShippingRuleProvider (child task)
//!                                ▼
//!             watch<CheckoutSnapshot> + broadcast<Amount>
//! ```
//!
//! Shipping fetches are tagged with a generation. Only the response to
//! the latest request is applied; older requests are aborted.

#![deny(unsafe_code)]

mod context;
mod provider;
mod session;
mod state;

pub use context::*;
pub use provider::*;
pub use session::*;
pub use state::*;
