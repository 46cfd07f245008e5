pub mod run_tree_search;
pub mod search_args;
