pub mod index;
pub mod optimize;
