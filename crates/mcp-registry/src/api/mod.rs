//! API endpoint implementations.

mod servers;

pub use servers::{DEFAULT_PAGE_SIZE, ServersApi};
