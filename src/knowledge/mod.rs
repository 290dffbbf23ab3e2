pub mod archive;
pub mod extract;
pub mod messages;
pub mod stats;
pub mod store;
pub mod types;
pub mod versions;
