pub mod audio;
pub mod pipeline;
pub mod shared;
pub mod translation;
