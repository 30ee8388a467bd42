use std::{fmt::Debug, path::Path};

use image::{ImageFormat, Rgba, RgbaImage};
use imageproc::{drawing, rect::Rect};
use tracing::{debug, info};

use crate::{
    anerr,
    domain::{Shape, BB},
    fonts::LabelFont,
    result::{to_an, AnResult},
    sampling::{sample_annotations, Annotation},
};

pub const LABEL_BG: Rgba<u8> = Rgba([0, 0, 0, 160]);
pub const LABEL_FG: Rgba<u8> = Rgba([255, 255, 255, 255]);
// the label background reaches 3 pixels left and right of the text and 4 pixels above it
const LABEL_MARGIN_X: u32 = 3;
const LABEL_MARGIN_TOP: u32 = 4;

/// The three views of a submission. Each view has its fixed seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum View {
    Upper,
    Front,
    Lower,
}
impl View {
    pub fn seed(self) -> u64 {
        match self {
            View::Upper => 1,
            View::Front => 2,
            View::Lower => 3,
        }
    }
    pub fn name(self) -> &'static str {
        match self {
            View::Upper => "upper",
            View::Front => "front",
            View::Lower => "lower",
        }
    }
}
pub const VIEWS: [View; 3] = [View::Upper, View::Front, View::Lower];

pub fn stroke_width(im_w: u32) -> u32 {
    (im_w / 200).max(2)
}

pub fn font_size(im_w: u32) -> u32 {
    (im_w / 80).max(12)
}

pub fn read_image<P>(path: P) -> AnResult<RgbaImage>
where
    P: AsRef<Path> + Debug,
{
    let im = image::io::Reader::open(&path)
        .map_err(|e| anerr!("could not open image {:?}. {:?}", path, e))?
        .with_guessed_format()
        .map_err(to_an)?
        .decode()
        .map_err(|e| anerr!("could not decode image {:?}. {:?}", path, e))?;
    Ok(im.into_rgba8())
}

pub fn write_png<P>(im: &RgbaImage, path: P) -> AnResult<()>
where
    P: AsRef<Path> + Debug,
{
    im.save_with_format(&path, ImageFormat::Png)
        .map_err(|e| anerr!("could not write annotated image {:?}. {:?}", path, e))
}

/// Outline of the box `[x1, x2] x [y1, y2]` including both corners, `stroke` pixels thick towards
/// the inside. Parts outside of the image are skipped.
fn draw_outline(im: &mut RgbaImage, bb: &BB, color: Rgba<u8>, stroke: u32) {
    let (x1, y1, _, _) = bb.corners();
    for k in 0..stroke {
        let w = (bb.w + 1) as i64 - 2 * k as i64;
        let h = (bb.h + 1) as i64 - 2 * k as i64;
        if w <= 0 || h <= 0 {
            break;
        }
        let rect = Rect::at((x1 + k) as i32, (y1 + k) as i32).of_size(w as u32, h as u32);
        drawing::draw_hollow_rect_mut(im, rect, color);
    }
}

/// Label tag sitting on the top-left corner of the box. It is not moved into the image if the
/// box is close to the top border.
fn draw_label(im: &mut RgbaImage, anno: &Annotation, font: &LabelFont) {
    let label = anno.label();
    let (text_w, text_h) = font.text_size(&label);
    let (x1, y1) = (anno.bb.x as i32, anno.bb.y as i32);
    let bg_top = y1 - (text_h + LABEL_MARGIN_TOP) as i32;
    let bg = Rect::at(x1, bg_top).of_size(
        text_w + 2 * LABEL_MARGIN_X + 1,
        text_h + LABEL_MARGIN_TOP + 1,
    );
    drawing::draw_filled_rect_mut(im, bg, LABEL_BG);
    font.draw_text(
        im,
        LABEL_FG,
        x1 + LABEL_MARGIN_X as i32,
        y1 - text_h as i32 - 2,
        &label,
    );
}

pub fn draw_annotations(im: &mut RgbaImage, annos: &[Annotation], font: &LabelFont) {
    let stroke = stroke_width(im.width());
    for anno in annos {
        draw_outline(im, &anno.bb, anno.color, stroke);
        draw_label(im, anno, font);
    }
}

/// Draws the seeded annotations onto the image in place.
pub fn annotate_image(im: &mut RgbaImage, seed: u64) -> AnResult<Vec<Annotation>> {
    let shape = Shape::from_im(&*im);
    if shape.w == 0 || shape.h == 0 {
        return Err(anerr!("cannot annotate an empty image of shape {:?}", shape));
    }
    let annos = sample_annotations(shape, seed);
    let font = LabelFont::load(font_size(shape.w))?;
    draw_annotations(im, &annos, &font);
    Ok(annos)
}

/// Reads the image at `input_path`, draws 3 annotations placed according to `seed` and writes
/// the result as PNG to `output_path`. Nothing is written if reading or decoding fails.
pub fn annotate<P, Q>(input_path: P, output_path: Q, seed: u64) -> AnResult<Vec<Annotation>>
where
    P: AsRef<Path> + Debug,
    Q: AsRef<Path> + Debug,
{
    let mut im = read_image(&input_path)?;
    debug!("read {:?} with shape {:?}", input_path, Shape::from_im(&im));
    let annos = annotate_image(&mut im, seed)?;
    write_png(&im, &output_path)?;
    info!("annotated {:?} with seed {seed}", input_path);
    println!("Annotated {}", output_path.as_ref().display());
    Ok(annos)
}

#[cfg(test)]
use crate::{sampling::PALETTE, tracing_setup::init_tracing_for_tests};

#[cfg(test)]
fn make_test_im() -> RgbaImage {
    RgbaImage::from_pixel(800, 600, Rgba([10, 20, 30, 255]))
}

#[test]
fn test_sizes() {
    assert_eq!(stroke_width(100), 2);
    assert_eq!(stroke_width(800), 4);
    assert_eq!(stroke_width(1999), 9);
    assert_eq!(font_size(100), 12);
    assert_eq!(font_size(800), 12);
    assert_eq!(font_size(1920), 24);
}

#[test]
fn test_views() {
    let seeds = VIEWS.iter().map(|v| v.seed()).collect::<Vec<_>>();
    assert_eq!(seeds, vec![1, 2, 3]);
    assert_eq!(View::Front.name(), "front");
}

#[test]
fn test_outline() {
    let mut im = make_test_im();
    let bg = *im.get_pixel(0, 0);
    let bb = BB::from_corners(100, 100, 200, 150);
    draw_outline(&mut im, &bb, PALETTE[1], 4);
    // outer and inner ring
    assert_eq!(*im.get_pixel(100, 100), PALETTE[1]);
    assert_eq!(*im.get_pixel(200, 150), PALETTE[1]);
    assert_eq!(*im.get_pixel(103, 120), PALETTE[1]);
    assert_eq!(*im.get_pixel(197, 120), PALETTE[1]);
    // inside and outside untouched
    assert_eq!(*im.get_pixel(104, 120), bg);
    assert_eq!(*im.get_pixel(150, 125), bg);
    assert_eq!(*im.get_pixel(99, 120), bg);
    assert_eq!(*im.get_pixel(201, 120), bg);
}

#[test]
fn test_outline_clipped() {
    let mut im = make_test_im();
    // x2 == w and y2 == h lie outside of the image
    let bb = BB::from_corners(700, 500, 800, 600);
    draw_outline(&mut im, &bb, PALETTE[0], 4);
    assert_eq!(*im.get_pixel(799, 599), PALETTE[0]);
    assert_eq!(*im.get_pixel(797, 550), PALETTE[0]);
    assert_eq!(*im.get_pixel(796, 550), Rgba([10, 20, 30, 255]));
    // thicker than the box
    let bb = BB::from_corners(10, 10, 13, 12);
    draw_outline(&mut im, &bb, PALETTE[2], 9);
    assert_eq!(*im.get_pixel(11, 11), PALETTE[2]);
}

#[cfg(test)]
fn has_bright_pixel(im: &RgbaImage, xs: std::ops::Range<u32>, ys: std::ops::Range<u32>) -> bool {
    ys.flat_map(|y| xs.clone().map(move |x| (x, y)))
        .any(|(x, y)| im.get_pixel(x, y).0[..3].iter().all(|c| *c > 128))
}

#[test]
fn test_label() {
    let mut im = make_test_im();
    let bg = *im.get_pixel(0, 0);
    let anno = Annotation {
        bb: BB::from_corners(100, 100, 200, 150),
        color: PALETTE[0],
        index: 0,
    };
    let font = LabelFont::embedded(12).unwrap();
    let (tw, th) = font.text_size("ID1");
    draw_label(&mut im, &anno, &font);
    // background spans [x1, x1 + tw + 6] x [y1 - th - 4, y1]
    assert_eq!(*im.get_pixel(100, 100 - th - 4), LABEL_BG);
    assert_eq!(*im.get_pixel(100 + tw + 6, 100), LABEL_BG);
    assert_eq!(*im.get_pixel(101, 99), LABEL_BG);
    assert_eq!(*im.get_pixel(100 + tw + 7, 100), bg);
    assert_eq!(*im.get_pixel(100, 100 - th - 5), bg);
    assert_eq!(*im.get_pixel(100, 101), bg);
    // text starts 3 pixels right of the box and ends 2 pixels above it
    assert!(has_bright_pixel(&im, 103..(103 + tw), (98 - th)..98));
    assert!(!has_bright_pixel(&im, 100..103, (96 - th)..101));
    assert!(!has_bright_pixel(&im, 100..(107 + tw), 98..101));
}

#[test]
fn test_label_scales_with_image_width() {
    let mut im = RgbaImage::from_pixel(1920, 1080, Rgba([10, 20, 30, 255]));
    let anno = Annotation {
        bb: BB::from_corners(300, 400, 700, 600),
        color: PALETTE[1],
        index: 0,
    };
    let font = LabelFont::embedded(font_size(1920)).unwrap();
    let (tw, th) = font.text_size("ID1");
    let (tw_small, th_small) = LabelFont::embedded(font_size(800)).unwrap().text_size("ID1");
    assert!(tw > tw_small && th > th_small);
    draw_label(&mut im, &anno, &font);
    assert_eq!(*im.get_pixel(300, 400 - th - 4), LABEL_BG);
    assert_eq!(*im.get_pixel(300 + tw + 6, 400), LABEL_BG);
    assert!(has_bright_pixel(&im, 303..(303 + tw), (398 - th)..398));
}

#[test]
fn test_label_at_top_border() {
    let mut im = make_test_im();
    let bg = *im.get_pixel(0, 0);
    let anno = Annotation {
        bb: BB::from_corners(5, 2, 50, 40),
        color: PALETTE[0],
        index: 2,
    };
    draw_label(&mut im, &anno, &LabelFont::embedded(12).unwrap());
    assert_eq!(*im.get_pixel(5, 0), LABEL_BG);
    assert_eq!(*im.get_pixel(5, 2), LABEL_BG);
    assert_eq!(*im.get_pixel(5, 3), bg);
}

#[test]
fn test_draw_annotations() {
    init_tracing_for_tests();
    let mut im = make_test_im();
    let bg = *im.get_pixel(0, 0);
    let font = LabelFont::embedded(font_size(800)).unwrap();
    let (tw, th) = font.text_size("ID3");
    let annos = sample_annotations(Shape::from_im(&im), 1);
    draw_annotations(&mut im, &annos, &font);
    assert_eq!(Shape::from_im(&im), Shape { w: 800, h: 600 });
    // the last annotation is not covered by anything
    let last = annos[2];
    let (x1, y1, x2, y2) = last.bb.corners();
    assert_eq!(*im.get_pixel(x1, y2 - 1), PALETTE[2]);
    assert_eq!(*im.get_pixel(x1 + 1, y1 - 1), LABEL_BG);
    assert!(has_bright_pixel(&im, (x1 + 3)..(x1 + 3 + tw), (y1 - th - 2)..(y1 - 2)));
    // earlier boxes might cross the inside of the last one
    let mut im_last = make_test_im();
    draw_annotations(&mut im_last, &annos[2..], &font);
    assert_eq!(*im_last.get_pixel((x1 + x2) / 2, (y1 + y2) / 2), bg);
}

#[test]
fn test_annotate_image_deterministic() {
    let mut im1 = make_test_im();
    let mut im2 = make_test_im();
    let annos1 = annotate_image(&mut im1, 7).unwrap();
    let annos2 = annotate_image(&mut im2, 7).unwrap();
    assert_eq!(annos1, annos2);
    assert_eq!(im1, im2);
    assert_ne!(im1, make_test_im());
}

#[test]
fn test_annotate_empty() {
    let mut im = RgbaImage::new(0, 10);
    assert!(annotate_image(&mut im, 1).is_err());
}
