pub mod recon_root;
pub mod reconcile;
pub mod species_map;
