// Gateway module for transport - follows the Train Station Pattern
// All external access must go through this gateway

// Private submodules - not directly accessible from outside
mod http;
mod traits;
mod types;

#[cfg(test)]
pub(crate) mod testing;

// Public re-exports - the ONLY way to access transport functionality
pub use http::{Credentials, HttpTransport};
pub use traits::Transport;
pub use types::{ApiRequest, Method};

#[cfg(test)]
pub(crate) use traits::MockTransport;
