pub mod handlers;
pub mod principal;
