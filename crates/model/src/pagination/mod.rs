pub mod cursor;
pub mod error;
mod token;
