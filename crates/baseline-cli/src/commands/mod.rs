//! Command implementations
//!
//! Each command returns `Ok(false)` when it ran but found the host out of
//! compliance; `main` turns that into exit status 2.

mod applies;
mod facts;
mod policies;
mod state;

pub use applies::run_applies;
pub use facts::run_facts;
pub use policies::{run_check, run_fix};
pub use state::{run_state_change, run_state_check};
