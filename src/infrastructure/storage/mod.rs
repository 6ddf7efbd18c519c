pub mod in_flight;
pub mod local;
pub mod memory;
pub mod paths;
