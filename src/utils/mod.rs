pub mod logging;
pub mod shutdown;

pub use logging::truncate_text;
pub use shutdown::wait_for_shutdown;
