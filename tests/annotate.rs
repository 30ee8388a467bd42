use std::{fs, path::Path};

use annolib::{
    annotate,
    annotate::read_image,
    sampling::{Annotation, PALETTE},
    tracing_setup::init_tracing_for_tests,
};
use image::{ImageFormat, Rgba, RgbaImage};

const BG: Rgba<u8> = Rgba([90, 120, 80, 255]);

fn write_test_im(path: &Path, w: u32, h: u32) {
    RgbaImage::from_pixel(w, h, BG).save(path).unwrap();
}

// true if a later box or its label might have painted over `p`
fn covered_by_later(p: (u32, u32), later: &[Annotation]) -> bool {
    later.iter().any(|a| {
        let (x1, y1, x2, y2) = a.bb.corners();
        p.0 + 100 >= x1 && p.0 <= x2 + 100 && p.1 + 60 >= y1 && p.1 <= y2 + 1
    })
}

#[test]
fn test_800x600_seed_1() {
    init_tracing_for_tests();
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in_upper.png");
    let output = dir.path().join("out_upper.png");
    write_test_im(&input, 800, 600);

    let annos = annotate(&input, &output, 1).unwrap();
    assert_eq!(annos.len(), 3);
    let labels = annos.iter().map(|a| a.label()).collect::<Vec<_>>();
    assert_eq!(labels, vec!["ID1", "ID2", "ID3"]);
    let colors = annos.iter().map(|a| a.color.0).collect::<Vec<_>>();
    assert_eq!(
        colors,
        vec![[255, 0, 0, 200], [0, 200, 255, 200], [255, 128, 0, 200]]
    );

    let format = image::io::Reader::open(&output)
        .unwrap()
        .with_guessed_format()
        .unwrap()
        .format();
    assert_eq!(format, Some(ImageFormat::Png));
    let decoded = image::open(&output).unwrap();
    assert_eq!(decoded.color(), image::ColorType::Rgba8);
    let im = decoded.into_rgba8();
    assert_eq!(im.dimensions(), (800, 600));

    for (i, anno) in annos.iter().enumerate() {
        let (x1, _, _, y2) = anno.bb.corners();
        let p = (x1, y2 - 1);
        if !covered_by_later(p, &annos[i + 1..]) {
            assert_eq!(*im.get_pixel(p.0, p.1), PALETTE[i]);
        }
    }
    // pixels far away from all boxes are untouched
    let untouched = im
        .enumerate_pixels()
        .filter(|(x, y, _)| !covered_by_later((*x, *y), &annos))
        .all(|(_, _, p)| *p == BG);
    assert!(untouched);
}

#[test]
fn test_deterministic_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in_front.png");
    let out_1 = dir.path().join("out_1.png");
    let out_2 = dir.path().join("out_2.png");
    write_test_im(&input, 640, 480);
    let annos_1 = annotate(&input, &out_1, 2).unwrap();
    let annos_2 = annotate(&input, &out_2, 2).unwrap();
    assert_eq!(annos_1, annos_2);
    assert_eq!(fs::read(&out_1).unwrap(), fs::read(&out_2).unwrap());
}

#[test]
fn test_seed_independence() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.png");
    write_test_im(&input, 1024, 768);
    let annos_1 = annotate(&input, dir.path().join("out_1.png"), 1).unwrap();
    let annos_2 = annotate(&input, dir.path().join("out_2.png"), 2).unwrap();
    assert_ne!(annos_1, annos_2);
    for anno in annos_1.iter().chain(annos_2.iter()) {
        let (x1, y1, x2, y2) = anno.bb.corners();
        assert!(x1 < x2 && x2 <= 1024);
        assert!(y1 < y2 && y2 <= 768);
    }
}

#[test]
fn test_jpeg_input_and_extension() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in_lower.jpg");
    image::RgbImage::from_pixel(300, 200, image::Rgb([200, 200, 200]))
        .save(&input)
        .unwrap();
    // the format does not follow the extension
    let output = dir.path().join("out_lower.jpg");
    annotate(&input, &output, 3).unwrap();
    let format = image::io::Reader::open(&output)
        .unwrap()
        .with_guessed_format()
        .unwrap()
        .format();
    assert_eq!(format, Some(ImageFormat::Png));
    let im = read_image(&output).unwrap();
    assert_eq!(im.dimensions(), (300, 200));
}

#[test]
fn test_missing_input() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out.png");
    let res = annotate(dir.path().join("nope.png"), &output, 1);
    let err = res.unwrap_err();
    assert!(err.msg().contains("could not open image"));
    assert!(!output.exists());
}

#[test]
fn test_invalid_input() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.png");
    fs::write(&input, b"no image in here").unwrap();
    let output = dir.path().join("out.png");
    let err = annotate(&input, &output, 1).unwrap_err();
    assert!(err.msg().contains("could not decode image"));
    assert!(!output.exists());
}

#[test]
fn test_missing_output_dir() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.png");
    write_test_im(&input, 800, 600);
    let output = dir.path().join("not_there").join("out.png");
    let err = annotate(&input, &output, 1).unwrap_err();
    assert!(err.msg().contains("could not write annotated image"));
    assert!(!output.exists());
    assert!(!dir.path().join("not_there").exists());
}
