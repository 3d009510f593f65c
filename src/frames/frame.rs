use image::{Delay, RgbaImage};

/// One still image of a (possibly animated) source, straight-alpha RGBA8.
///
/// Frames are never mutated in place: transforms build a new frame and carry the display delay
/// over with [`Frame::with_image`].
#[derive(Clone, Debug)]
pub struct Frame {
    image: RgbaImage,
    delay: Delay,
}

impl Frame {
    pub fn new(image: RgbaImage) -> Self {
        Self {
            image,
            delay: Delay::from_numer_denom_ms(0, 1),
        }
    }

    pub fn with_delay(image: RgbaImage, delay: Delay) -> Self {
        Self { image, delay }
    }

    /// A new frame holding `image` with this frame's timing.
    pub fn with_image(&self, image: RgbaImage) -> Self {
        Self {
            image,
            delay: self.delay,
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn delay(&self) -> Delay {
        self.delay
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }
}
