pub mod counter;
pub mod value;
