pub mod browser;
pub mod compressor;
pub mod encoder;
pub mod resize;
pub mod staging;
