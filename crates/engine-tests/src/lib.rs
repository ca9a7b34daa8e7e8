pub mod properties;
pub mod utils;
