pub mod atomic_database;
mod count;
mod element;
pub mod errors;
