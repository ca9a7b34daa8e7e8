pub mod entity;
pub mod field;
