use std::ops::Range;

use image::Rgba;
use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::debug;

use crate::domain::{Shape, BB};

pub const N_ANNOTATIONS: usize = 3;
pub const ANNO_ALPHA: u8 = 200;
pub const PALETTE: [Rgba<u8>; 4] = [
    Rgba([255, 0, 0, ANNO_ALPHA]),
    Rgba([0, 200, 255, ANNO_ALPHA]),
    Rgba([255, 128, 0, ANNO_ALPHA]),
    Rgba([180, 0, 180, ANNO_ALPHA]),
];

// fractions of the image width and height respectively
const START_RANGE: Range<f64> = 0.05..0.6;
const WIDTH_RANGE: Range<f64> = 0.1..0.35;
const HEIGHT_RANGE: Range<f64> = 0.08..0.3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Annotation {
    pub bb: BB,
    pub color: Rgba<u8>,
    pub index: usize,
}
impl Annotation {
    pub fn label(&self) -> String {
        format!("ID{}", self.index + 1)
    }
}

pub fn color_of(index: usize) -> Rgba<u8> {
    PALETTE[index % PALETTE.len()]
}

/// Maps the sampled fractions to `(start, end)` with `0 <= start < end <= size` for `size > 0`.
/// The end is clamped to the image border, the extent is not resampled.
fn span(frac_start: f64, frac_extent: f64, size: u32) -> (u32, u32) {
    let size_f = size as f64;
    let start = (frac_start * size_f) as u32;
    let end = size_f.min(start as f64 + frac_extent * size_f) as u32;
    // only relevant for images that are a few pixels wide
    let start = start.min(size.saturating_sub(1));
    let end = end.max(start + 1).min(size.max(1));
    (start, end)
}

/// Places the boxes for one image. Each call owns its generator, hence the result only depends
/// on `shape` and `seed`.
pub fn sample_annotations(shape: Shape, seed: u64) -> Vec<Annotation> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..N_ANNOTATIONS)
        .map(|index| {
            let fx = rng.gen_range(START_RANGE);
            let fy = rng.gen_range(START_RANGE);
            let fw = rng.gen_range(WIDTH_RANGE);
            let fh = rng.gen_range(HEIGHT_RANGE);
            let (x1, x2) = span(fx, fw, shape.w);
            let (y1, y2) = span(fy, fh, shape.h);
            let anno = Annotation {
                bb: BB::from_corners(x1, y1, x2, y2),
                color: color_of(index),
                index,
            };
            debug!("sampled {} at {} for seed {seed}", anno.label(), anno.bb);
            anno
        })
        .collect()
}

#[cfg(test)]
use crate::tracing_setup::init_tracing_for_tests;

#[test]
fn test_deterministic() {
    init_tracing_for_tests();
    let shape = Shape { w: 800, h: 600 };
    for seed in [0, 1, 2, 3, 42] {
        assert_eq!(
            sample_annotations(shape, seed),
            sample_annotations(shape, seed)
        );
    }
}

#[test]
fn test_seeds_differ() {
    let shape = Shape { w: 800, h: 600 };
    assert_ne!(sample_annotations(shape, 1), sample_annotations(shape, 2));
    assert_ne!(sample_annotations(shape, 2), sample_annotations(shape, 3));
}

#[test]
fn test_bounds() {
    let shapes = [
        Shape { w: 800, h: 600 },
        Shape { w: 1920, h: 1080 },
        Shape { w: 37, h: 1013 },
        Shape { w: 10, h: 10 },
        Shape { w: 3, h: 2 },
        Shape { w: 1, h: 1 },
    ];
    for shape in shapes {
        for seed in 0..200 {
            for anno in sample_annotations(shape, seed) {
                let (x1, y1, x2, y2) = anno.bb.corners();
                assert!(x1 < x2 && x2 <= shape.w, "{} in {shape:?}", anno.bb);
                assert!(y1 < y2 && y2 <= shape.h, "{} in {shape:?}", anno.bb);
            }
        }
    }
}

#[test]
fn test_sampled_ranges() {
    let shape = Shape { w: 1000, h: 1000 };
    for seed in 0..100 {
        for anno in sample_annotations(shape, seed) {
            let (x1, y1, _, _) = anno.bb.corners();
            assert!((50..600).contains(&x1));
            assert!((50..600).contains(&y1));
            // at most 0.35 * w wide and 0.3 * h high, never wider than the remaining image
            assert!(anno.bb.w <= 350);
            assert!(anno.bb.h <= 300);
            assert!(anno.bb.w > 0 && anno.bb.x_max() <= shape.w);
            assert!(anno.bb.h > 0 && anno.bb.y_max() <= shape.h);
        }
    }
}

#[test]
fn test_span() {
    assert_eq!(span(0.5, 0.2, 100), (50, 70));
    // clamped at the border
    assert_eq!(span(0.55, 0.5, 100), (55, 100));
    assert_eq!(span(0.5, 0.1, 1), (0, 1));
    assert_eq!(span(0.05, 0.1, 5), (0, 1));
}

#[test]
fn test_labels_and_colors() {
    let annos = sample_annotations(Shape { w: 800, h: 600 }, 1);
    assert_eq!(annos.len(), N_ANNOTATIONS);
    let labels = annos.iter().map(|a| a.label()).collect::<Vec<_>>();
    assert_eq!(labels, vec!["ID1", "ID2", "ID3"]);
    let colors = annos.iter().map(|a| a.color.0).collect::<Vec<_>>();
    assert_eq!(
        colors,
        vec![[255, 0, 0, 200], [0, 200, 255, 200], [255, 128, 0, 200]]
    );
    assert_eq!(color_of(3), Rgba([180, 0, 180, 200]));
    assert_eq!(color_of(4), color_of(0));
}
