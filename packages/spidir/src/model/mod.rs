pub mod baserate;
pub mod learn;
pub mod params;
