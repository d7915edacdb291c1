use serde::Deserialize;

/// Rectangle as fractions of image width/height, origin at its top-left corner.
#[derive(Debug, Copy, Clone, PartialEq, Default, Deserialize)]
pub struct NormalizedRect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

/// Rectangle in image pixels, origin at its top-left corner. May extend past the image.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PixelRect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl NormalizedRect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> NormalizedRect {
        NormalizedRect { x, y, w, h }
    }

    /// Scales origin and size by the image dimensions.
    pub fn to_pixels(&self, width: u32, height: u32) -> PixelRect {
        let (width, height) = (width as f64, height as f64);
        PixelRect {
            x: (self.x * width) as f32,
            y: (self.y * height) as f32,
            w: (self.w * width) as f32,
            h: (self.h * height) as f32,
        }
    }
}

impl PixelRect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> PixelRect {
        PixelRect { x, y, w, h }
    }

    pub fn left(&self) -> f32 {
        self.x
    }
    pub fn right(&self) -> f32 {
        self.x + self.w
    }
    pub fn top(&self) -> f32 {
        self.y
    }
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    /// The imageproc rect covering this one, or None when it rounds to zero area.
    pub fn drawable(&self) -> Option<imageproc::rect::Rect> {
        let w = self.w.round();
        let h = self.h.round();
        if !(w >= 1. && h >= 1.) || !self.x.is_finite() || !self.y.is_finite() {
            return None;
        }

        Some(
            imageproc::rect::Rect::at(self.x.round() as i32, self.y.round() as i32)
                .of_size(w as u32, h as u32),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_pixels() {
        let r = NormalizedRect::new(0.25, 0.1, 0.5, 0.2);
        assert_eq!(r.to_pixels(400, 300), PixelRect::new(100., 30., 200., 60.));
    }

    #[test]
    fn test_edges() {
        let r = PixelRect::new(10., 20., 30., 40.);
        assert_eq!(r.left(), 10.);
        assert_eq!(r.right(), 40.);
        assert_eq!(r.top(), 20.);
        assert_eq!(r.bottom(), 60.);
    }

    #[test]
    fn test_drawable() {
        let r = PixelRect::new(-5., 2.4, 10.2, 3.6).drawable().unwrap();
        assert_eq!((r.left(), r.top(), r.width(), r.height()), (-5, 2, 10, 4));

        assert!(PixelRect::new(0., 0., 0.2, 10.).drawable().is_none());
        assert!(PixelRect::new(0., 0., 10., f32::NAN).drawable().is_none());
    }
}
