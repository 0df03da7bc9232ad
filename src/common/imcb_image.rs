use image::{DynamicImage, RgbImage};

/// A decoded upload, dimensions cached at construction.
#[derive(Debug, Clone)]
pub struct ImcbImage {
    pub image: DynamicImage,
    pub img_width: u32,
    pub img_height: u32,
}

impl From<DynamicImage> for ImcbImage {
    fn from(image: DynamicImage) -> Self {
        Self::new(image)
    }
}

impl From<RgbImage> for ImcbImage {
    fn from(image: RgbImage) -> Self {
        Self::new(DynamicImage::from(image))
    }
}

impl From<ImcbImage> for DynamicImage {
    fn from(image: ImcbImage) -> Self {
        image.image
    }
}

impl ImcbImage {
    pub fn new(image: DynamicImage) -> Self {
        let (img_width, img_height) = (image.width(), image.height());
        Self {
            image,
            img_width,
            img_height,
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.img_width, self.img_height)
    }

    pub fn width(&self) -> u32 {
        self.img_width
    }

    pub fn height(&self) -> u32 {
        self.img_height
    }

    pub fn to_rgb8(&self) -> RgbImage {
        self.image.to_rgb8()
    }
}
