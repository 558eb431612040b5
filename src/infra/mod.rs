pub mod cache;
pub mod carrier;
