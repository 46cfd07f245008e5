pub mod distance_matrix;
pub mod least_squares;
pub mod neighbor_join;
