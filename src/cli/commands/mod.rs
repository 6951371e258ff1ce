//! CLI command implementations

pub mod cache;
pub mod config;
pub mod event;
pub mod routes;
pub mod version;

pub use cache::execute as cache;
pub use config::execute as config;
pub use event::execute as event;
pub use routes::execute as routes;
pub use version::execute as version;
