pub mod primer;
pub mod result;
