//! Infrastructure layer
//!
//! Owns the scarce resource (the browser session) and the adapter the rest
//! of the engine drives it through.

pub mod chrome_driver;
pub mod driver;
pub mod pacing;
pub mod retry;
pub mod session;

pub use chrome_driver::ChromeDriver;
pub use driver::{ContextId, ElementHandle, UiDriver};
pub use pacing::Pacer;
pub use retry::RetryPolicy;
pub use session::UiSession;
