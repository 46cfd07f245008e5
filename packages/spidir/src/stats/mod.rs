pub mod cubic;
pub mod density;
pub mod histogram;
