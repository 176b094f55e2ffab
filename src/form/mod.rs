//! Form state and enablement resolution
//!
//! The runtime side of the crate: the values a host holds for a tool's
//! inputs, and the pure resolver that decides which inputs are enabled.

mod resolve;
mod state;

pub use resolve::{resolve, Enablement};
pub use state::FormState;
