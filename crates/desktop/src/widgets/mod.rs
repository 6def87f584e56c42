pub mod file_row;
pub mod result_row;
