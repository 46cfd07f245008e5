pub mod reroot;
pub mod species_tree;
pub mod topology_key;
#[allow(clippy::module_inception)]
pub mod tree;
