pub mod frame;
pub mod traits;
