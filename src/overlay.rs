//! What to draw over an analysed image, and an `imageproc` renderer for it.
//!
//! The geometry helpers only turn normalized inference output into pixel positions; any
//! renderer can consume them. [`Overlay`] is the one this crate ships.

use crate::classify::{BodyPart, KeyPoint};
use crate::error::Result;
use crate::pipeline::{FaceAnalysis, PoseAnalysis, TextAnalysis};
use crate::shapes::{NormalizedRect, PixelRect};
use ab_glyph::{FontVec, PxScale};
use image::{Pixel, Rgba, RgbaImage};
use imageproc::drawing;
use std::path::Path;
use tracing::{debug, trace};

/// Bones drawn between pose keypoints.
pub const SKELETON: [(BodyPart, BodyPart); 16] = [
    (BodyPart::Nose, BodyPart::LeftEye),
    (BodyPart::LeftEye, BodyPart::LeftEar),
    (BodyPart::Nose, BodyPart::RightEye),
    (BodyPart::RightEye, BodyPart::RightEar),
    (BodyPart::LeftShoulder, BodyPart::RightShoulder),
    (BodyPart::LeftShoulder, BodyPart::LeftElbow),
    (BodyPart::LeftElbow, BodyPart::LeftWrist),
    (BodyPart::RightShoulder, BodyPart::RightElbow),
    (BodyPart::RightElbow, BodyPart::RightWrist),
    (BodyPart::LeftShoulder, BodyPart::LeftHip),
    (BodyPart::RightShoulder, BodyPart::RightHip),
    (BodyPart::LeftHip, BodyPart::RightHip),
    (BodyPart::LeftHip, BodyPart::LeftKnee),
    (BodyPart::LeftKnee, BodyPart::LeftAnkle),
    (BodyPart::RightHip, BodyPart::RightKnee),
    (BodyPart::RightKnee, BodyPart::RightAnkle),
];

/// Keypoints at or below this confidence are not drawn, nor are bones touching them.
pub const MIN_DRAW_CONFIDENCE: f32 = 0.5;

const JOINT_RADIUS: i32 = 4;
const LINE_WIDTH: i32 = 3;
const TEXT_LINE_WIDTH: i32 = 2;
const CAPTION_HEIGHT: f32 = 20.;
const CAPTION_FONT_SIZE: f32 = 12.;

const GREEN: Rgba<u8> = Rgba([0u8, 255u8, 0u8, 255u8]);
const RED: Rgba<u8> = Rgba([255u8, 0u8, 0u8, 255u8]);
const BLUE: Rgba<u8> = Rgba([0u8, 0u8, 255u8, 255u8]);
const WHITE: Rgba<u8> = Rgba([255u8, 255u8, 255u8, 255u8]);
const CAPTION_SHADE: Rgba<u8> = Rgba([0u8, 0u8, 255u8, 77u8]);

pub type PixelPoint = (f32, f32);

/// Where the emotion glyph goes: top-left corner and font size, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphPlacement {
    pub x: f32,
    pub y: f32,
    pub size: f32,
}

/// Face box in pixels, raised by 15% of its height and trimmed to 95% of it.
pub fn face_box(bounds: &NormalizedRect, width: u32, height: u32) -> PixelRect {
    let r = bounds.to_pixels(width, height);
    PixelRect::new(r.x, r.y - r.h * 0.15, r.w, r.h * 0.95)
}

/// Emotion glyph sized to 30% of the box width, centred 2px above the box. Glyphs are
/// taken to be square.
pub fn glyph_placement(face_box: &PixelRect) -> GlyphPlacement {
    let size = face_box.w * 0.3;
    GlyphPlacement {
        x: face_box.left() + (face_box.w - size) / 2.,
        y: face_box.top() - size - 2.,
        size,
    }
}

/// Strip directly above a text box holding its recognized text.
pub fn caption_strip(text_box: &PixelRect) -> PixelRect {
    PixelRect::new(
        text_box.x,
        text_box.y - CAPTION_HEIGHT,
        text_box.w,
        CAPTION_HEIGHT,
    )
}

fn on_image(p: PixelPoint, width: u32, height: u32) -> bool {
    p.0.is_finite()
        && p.1.is_finite()
        && p.0 >= 0.
        && p.1 >= 0.
        && p.0 <= width as f32
        && p.1 <= height as f32
}

fn drawable_keypoint(keypoints: &[KeyPoint], idx: usize, width: u32, height: u32) -> Option<PixelPoint> {
    let k = keypoints.get(idx)?;
    if k.confidence <= MIN_DRAW_CONFIDENCE {
        return None;
    }
    let p = k.position.to_pixels(width, height);
    on_image(p, width, height).then_some(p)
}

/// Pixel segments for every skeleton bone whose endpoints are both confident and on the image.
pub fn bones(keypoints: &[KeyPoint], width: u32, height: u32) -> Vec<(PixelPoint, PixelPoint)> {
    SKELETON
        .iter()
        .filter_map(|(a, b)| {
            Some((
                drawable_keypoint(keypoints, a.index(), width, height)?,
                drawable_keypoint(keypoints, b.index(), width, height)?,
            ))
        })
        .collect()
}

/// Pixel centres of confident keypoints on the image.
pub fn joints(keypoints: &[KeyPoint], width: u32, height: u32) -> Vec<PixelPoint> {
    (0..keypoints.len())
        .filter_map(|idx| drawable_keypoint(keypoints, idx, width, height))
        .collect()
}

/// Draws analyses onto images. Text is only drawn when a font was loaded.
#[derive(Default)]
pub struct Overlay {
    font: Option<FontVec>,
}

impl Overlay {
    pub fn new() -> Overlay {
        Overlay { font: None }
    }

    pub fn with_font(path: impl AsRef<Path>) -> Result<Overlay> {
        let bytes = std::fs::read(path.as_ref())?;
        Ok(Overlay {
            font: Some(FontVec::try_from_vec(bytes)?),
        })
    }

    pub fn draw_faces(&self, img: &mut RgbaImage, faces: &[FaceAnalysis]) {
        let (width, height) = img.dimensions();

        for face in faces {
            let bounds = face_box(&face.bounds, width, height);
            trace!("Face box {bounds:?}");
            draw_thick_rect(img, &bounds, LINE_WIDTH, GREEN);

            let glyph = glyph_placement(&bounds);
            self.draw_label(img, face.emotion.emoji(), glyph.x, glyph.y, glyph.size, WHITE);
        }
    }

    pub fn draw_pose(&self, img: &mut RgbaImage, pose: &PoseAnalysis) {
        let (width, height) = img.dimensions();

        let bones = bones(&pose.keypoints, width, height);
        debug!("Drawing {} bones", bones.len());
        for (start, end) in bones {
            draw_thick_line(img, start, end, GREEN);
        }

        for (x, y) in joints(&pose.keypoints, width, height) {
            drawing::draw_filled_circle_mut(
                img,
                (x.round() as i32, y.round() as i32),
                JOINT_RADIUS,
                RED,
            );
        }
    }

    pub fn draw_text(&self, img: &mut RgbaImage, text: &TextAnalysis) {
        let (width, height) = img.dimensions();

        for o in &text.observations {
            let bounds = o.bounds.to_pixels(width, height);
            draw_thick_rect(img, &bounds, TEXT_LINE_WIDTH, BLUE);

            if o.text.is_empty() {
                continue;
            }
            let caption = caption_strip(&bounds);
            shade(img, &caption, CAPTION_SHADE);
            self.draw_label(img, &o.text, caption.x, caption.y, CAPTION_FONT_SIZE, WHITE);
        }
    }

    fn draw_label(&self, img: &mut RgbaImage, text: &str, x: f32, y: f32, size: f32, color: Rgba<u8>) {
        let Some(font) = &self.font else {
            trace!("No font loaded, skipping label {text:?}");
            return;
        };
        if size.is_nan() || size <= 0. {
            return;
        }

        drawing::draw_text_mut(
            img,
            color,
            x.round() as i32,
            y.round() as i32,
            PxScale::from(size),
            font,
            text,
        );
    }
}

fn draw_thick_rect(img: &mut RgbaImage, bounds: &PixelRect, line_width: i32, color: Rgba<u8>) {
    for inset in 0..line_width {
        let inset = inset as f32;
        let r = PixelRect::new(
            bounds.x + inset,
            bounds.y + inset,
            bounds.w - 2. * inset,
            bounds.h - 2. * inset,
        );
        if let Some(r) = r.drawable() {
            drawing::draw_hollow_rect_mut(img, r, color);
        }
    }
}

fn draw_thick_line(img: &mut RgbaImage, start: PixelPoint, end: PixelPoint, color: Rgba<u8>) {
    let half = LINE_WIDTH / 2;
    for offset in -half..=half {
        let o = offset as f32;
        drawing::draw_line_segment_mut(img, (start.0 + o, start.1), (end.0 + o, end.1), color);
        drawing::draw_line_segment_mut(img, (start.0, start.1 + o), (end.0, end.1 + o), color);
    }
}

// alpha-blends `color` over the part of `area` that lies on the image
fn shade(img: &mut RgbaImage, area: &PixelRect, color: Rgba<u8>) {
    let (width, height) = img.dimensions();
    let x0 = area.left().max(0.).round() as u32;
    let y0 = area.top().max(0.).round() as u32;
    let x1 = (area.right().round().max(0.) as u32).min(width);
    let y1 = (area.bottom().round().max(0.) as u32).min(height);

    for y in y0..y1 {
        for x in x0..x1 {
            img.get_pixel_mut(x, y).blend(&color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{Emotion, FaceLandmarks, PoseAction};
    use crate::inference::TextObservation;
    use crate::shapes::NormalizedPoint;

    fn keypoints(confidence: f32) -> Vec<KeyPoint> {
        BodyPart::ALL
            .iter()
            .map(|p| {
                KeyPoint::new(
                    p.index() as u8,
                    NormalizedPoint::new(0.5, 0.05 * p.index() as f64 + 0.1),
                    confidence,
                )
            })
            .collect()
    }

    #[test]
    fn test_skeleton_indices() {
        let pairs: Vec<(usize, usize)> = SKELETON.iter().map(|(a, b)| (a.index(), b.index())).collect();
        assert_eq!(
            pairs,
            [
                (0, 1),
                (1, 3),
                (0, 2),
                (2, 4),
                (5, 6),
                (5, 7),
                (7, 9),
                (6, 8),
                (8, 10),
                (5, 11),
                (6, 12),
                (11, 12),
                (11, 13),
                (13, 15),
                (12, 14),
                (14, 16),
            ]
        );
    }

    #[test]
    fn test_all_bones_when_confident() {
        let kps = keypoints(0.8);
        assert_eq!(bones(&kps, 100, 100).len(), SKELETON.len());
        assert_eq!(joints(&kps, 100, 100).len(), 17);
    }

    #[test]
    fn test_confidence_threshold_is_strict() {
        let kps = keypoints(MIN_DRAW_CONFIDENCE);
        assert!(bones(&kps, 100, 100).is_empty());
        assert!(joints(&kps, 100, 100).is_empty());
    }

    #[test]
    fn test_low_confidence_endpoint_drops_its_bones() {
        let mut kps = keypoints(0.9);
        kps[BodyPart::LeftElbow.index()].confidence = 0.2;

        // left shoulder-elbow and left elbow-wrist
        assert_eq!(bones(&kps, 100, 100).len(), SKELETON.len() - 2);
        assert_eq!(joints(&kps, 100, 100).len(), 16);
    }

    #[test]
    fn test_off_image_points_are_skipped() {
        let mut kps = keypoints(0.9);
        kps[BodyPart::Nose.index()].position = NormalizedPoint::new(1.2, 0.5);
        kps[BodyPart::RightAnkle.index()].position = NormalizedPoint::new(0.5, f64::NAN);

        // nose has 2 bones, right ankle 1
        assert_eq!(bones(&kps, 100, 100).len(), SKELETON.len() - 3);
        assert_eq!(joints(&kps, 100, 100).len(), 15);
    }

    #[test]
    fn test_missing_keypoints_draw_nothing_there() {
        let kps = keypoints(0.9);
        // nose, eyes and left ear only
        assert_eq!(bones(&kps[..4], 100, 100).len(), 3);
    }

    #[test]
    fn test_bone_endpoints_in_pixels() {
        let kps = keypoints(0.9);
        let (start, end) = bones(&kps, 200, 100)[0];
        assert_eq!(start, (100., 10.));
        assert_eq!(end, (100., 15.));
    }

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn test_face_box() {
        let r = face_box(&NormalizedRect::new(0.25, 0.5, 0.5, 0.25), 400, 400);
        assert!(close(r.x, 100.) && close(r.y, 185.) && close(r.w, 200.) && close(r.h, 95.));
    }

    #[test]
    fn test_glyph_placement() {
        let g = glyph_placement(&PixelRect::new(100., 185., 200., 95.));
        assert!(close(g.x, 170.) && close(g.y, 123.) && close(g.size, 60.));
    }

    #[test]
    fn test_caption_strip() {
        let c = caption_strip(&PixelRect::new(10., 50., 80., 12.));
        assert_eq!(c, PixelRect::new(10., 30., 80., 20.));
    }

    #[test]
    fn test_draw_pose_marks_image() {
        let mut img = RgbaImage::new(100, 100);
        let pose = PoseAnalysis {
            keypoints: keypoints(0.9),
            action: PoseAction::Standing,
            confidence: 0.9,
        };

        Overlay::new().draw_pose(&mut img, &pose);

        assert_eq!(*img.get_pixel(50, 10), RED);
        assert_eq!(*img.get_pixel(50, 50), RED);
        assert_eq!(*img.get_pixel(5, 5), Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn test_draw_faces_without_font() {
        let mut img = RgbaImage::new(100, 100);
        let faces = [FaceAnalysis {
            bounds: NormalizedRect::new(0.2, 0.4, 0.5, 0.4),
            landmarks: FaceLandmarks::new(),
            emotion: Emotion::Neutral,
        }];

        Overlay::new().draw_faces(&mut img, &faces);

        // box spans x 20..70, y 34..72
        assert_eq!(*img.get_pixel(20, 50), GREEN);
        assert_eq!(*img.get_pixel(22, 50), GREEN);
        assert_eq!(*img.get_pixel(45, 34), GREEN);
        assert_eq!(*img.get_pixel(45, 50), Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn test_draw_text_shades_caption() {
        let mut img = RgbaImage::from_pixel(100, 100, WHITE);
        let text = TextAnalysis {
            observations: vec![TextObservation {
                bounds: NormalizedRect::new(0.1, 0.5, 0.5, 0.1),
                text: "hi".to_string(),
            }],
            text: "hi".to_string(),
        };

        Overlay::new().draw_text(&mut img, &text);

        assert_eq!(*img.get_pixel(10, 55), BLUE);
        let shaded = *img.get_pixel(30, 40);
        assert!(shaded[0] < 255 && shaded[2] == 255);
        assert_eq!(*img.get_pixel(30, 20), WHITE);
    }

    #[test]
    fn test_missing_font_is_an_error() {
        assert!(Overlay::with_font("/nonexistent/font.ttf").is_err());
    }
}
