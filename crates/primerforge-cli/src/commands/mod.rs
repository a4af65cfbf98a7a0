pub mod design;
pub mod serve;
