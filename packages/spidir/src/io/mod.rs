pub mod distmat;
pub mod file;
pub mod fs;
pub mod json;
pub mod nwk;
pub mod params;
pub mod species_map;
