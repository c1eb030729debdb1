use image::{DynamicImage, ImageFormat, ImageResult};
use std::io::Cursor;

/// Re-encodes a decoded image back into one concrete on-disk format.
///
/// New formats are added by extending [`ENCODERS`]; call sites only ever go
/// through [`encoder_for`].
pub trait FormatEncoder: Send + Sync {
    fn format(&self) -> ImageFormat;

    fn encode(&self, image: &DynamicImage, out: &mut Vec<u8>) -> ImageResult<()>;
}

struct Jpeg;

impl FormatEncoder for Jpeg {
    fn format(&self) -> ImageFormat {
        ImageFormat::Jpeg
    }

    fn encode(&self, image: &DynamicImage, out: &mut Vec<u8>) -> ImageResult<()> {
        image.write_to(&mut Cursor::new(out), ImageFormat::Jpeg)
    }
}

struct Png;

impl FormatEncoder for Png {
    fn format(&self) -> ImageFormat {
        ImageFormat::Png
    }

    fn encode(&self, image: &DynamicImage, out: &mut Vec<u8>) -> ImageResult<()> {
        image.write_to(&mut Cursor::new(out), ImageFormat::Png)
    }
}

static ENCODERS: [&(dyn FormatEncoder); 2] = [&Jpeg, &Png];

/// Look up the encoder for a detected format; `None` means the format is
/// not supported by the pipeline.
pub fn encoder_for(format: ImageFormat) -> Option<&'static dyn FormatEncoder> {
    ENCODERS.iter().find(|e| e.format() == format).copied()
}
