pub mod constants;
pub mod output_paths;
