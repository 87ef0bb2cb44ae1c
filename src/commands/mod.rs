pub mod batch;
pub mod extract;
mod inventory;
mod output;
pub mod route;
