//! Pledge Total Calculator
//!
//! Prices a pledge: the reward minimum, each add-on's minimum times its
//! quantity, the shipping of every item to the selected destination,
//! and the bonus on top.
//!
//! ```text
//! total = reward.minimum + shipping(reward)
//!       + Σ (add_on.minimum + shipping(add_on)) × quantity
//!       + bonus
//! ```
//!
//! Everything here is a pure function of its inputs. The checkout
//! session calls back into this crate on every input change and never
//! adjusts a previous total incrementally.

#![deny(unsafe_code)]

mod bonus;
mod conversion;
mod operator;
mod total;

pub use bonus::*;
pub use conversion::*;
pub use operator::*;
pub use total::*;
