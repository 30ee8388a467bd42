use std::{
    fs,
    path::{Path, PathBuf},
};

use image::{Rgba, RgbaImage};
use imageproc::drawing;
use lazy_static::lazy_static;
use rusttype::{Font, Scale};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::{
    anerr,
    result::{trace_ok_warn, AnResult},
};

const FONT_NAME: &str = "arial.ttf";
const FONT_ROOTS: [&str; 6] = [
    "/usr/share/fonts",
    "/usr/local/share/fonts",
    "/Library/Fonts",
    "/System/Library/Fonts",
    "C:\\Windows\\Fonts",
    "C:\\Windows\\Fonts\\Supplemental",
];
// deep enough for layouts like /usr/share/fonts/truetype/msttcorefonts/Arial.ttf
const FONT_SEARCH_DEPTH: usize = 4;

static EMBEDDED_FONT_DATA: &[u8] = include_bytes!("../../resources/DejaVuSans/DejaVuSans.ttf");

/// Files named like [`FONT_NAME`] (ignoring case) below the given folders, sorted by path within
/// each folder.
pub fn find_named_fonts<P: AsRef<Path>>(roots: &[P]) -> Vec<PathBuf> {
    roots
        .iter()
        .flat_map(|root| {
            WalkDir::new(root)
                .max_depth(FONT_SEARCH_DEPTH)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|entry| entry.ok())
                .filter(|entry| entry.file_type().is_file())
                .filter(|entry| {
                    entry
                        .file_name()
                        .to_str()
                        .map(|name| name.eq_ignore_ascii_case(FONT_NAME))
                        == Some(true)
                })
                .map(|entry| entry.into_path())
        })
        .collect()
}

lazy_static! {
    /// Working directory first, then the usual system font folders.
    pub static ref FONT_CANDIDATES: Vec<PathBuf> = [FONT_NAME, "Arial.ttf"]
        .into_iter()
        .map(PathBuf::from)
        .chain(find_named_fonts(&FONT_ROOTS[..]))
        .collect();
    static ref SYSTEM_FONT: Option<Font<'static>> = first_loadable_font(&FONT_CANDIDATES);
    static ref EMBEDDED_FONT: Option<Font<'static>> = Font::try_from_bytes(EMBEDDED_FONT_DATA);
}

fn load_font_file(path: &Path) -> Option<Font<'static>> {
    if !path.is_file() {
        return None;
    }
    let data = trace_ok_warn(fs::read(path))?;
    let font = Font::try_from_vec(data);
    if font.is_none() {
        warn!("{path:?} is not a usable font file");
    }
    font
}

fn first_loadable_font(candidates: &[PathBuf]) -> Option<Font<'static>> {
    let found = candidates
        .iter()
        .find_map(|p| load_font_file(p).map(|font| (p, font)));
    match found {
        Some((p, font)) => {
            info!("using label font {p:?}");
            Some(font)
        }
        None => {
            debug!("no {FONT_NAME} found, falling back to the embedded label font");
            None
        }
    }
}

fn embedded_font() -> AnResult<Font<'static>> {
    EMBEDDED_FONT
        .clone()
        .ok_or_else(|| anerr!("the embedded label font could not be parsed"))
}

/// Font used for the box labels. Text may be placed partially outside the image, pixels that
/// do not hit the canvas are dropped.
#[derive(Clone)]
pub struct LabelFont {
    font: Font<'static>,
    scale: Scale,
}

impl LabelFont {
    /// Uses the first loadable font of [`FONT_CANDIDATES`] or the embedded DejaVu Sans, `size`
    /// pixels high.
    pub fn load(size: u32) -> AnResult<Self> {
        let font = match SYSTEM_FONT.clone() {
            Some(font) => font,
            None => embedded_font()?,
        };
        Ok(Self::new(font, size))
    }

    pub fn from_candidates(candidates: &[PathBuf], size: u32) -> AnResult<Self> {
        let font = match first_loadable_font(candidates) {
            Some(font) => font,
            None => embedded_font()?,
        };
        Ok(Self::new(font, size))
    }

    /// The embedded font, identical on every machine.
    pub fn embedded(size: u32) -> AnResult<Self> {
        Ok(Self::new(embedded_font()?, size))
    }

    fn new(font: Font<'static>, size: u32) -> Self {
        LabelFont {
            font,
            scale: Scale::uniform(size as f32),
        }
    }

    /// Width and height of the rendered text measured from the drawing position
    pub fn text_size(&self, text: &str) -> (u32, u32) {
        let (w, h) = drawing::text_size(self.scale, &self.font, text);
        (w.max(0) as u32, h.max(0) as u32)
    }

    pub fn draw_text(&self, im: &mut RgbaImage, color: Rgba<u8>, x: i32, y: i32, text: &str) {
        drawing::draw_text_mut(im, color, x, y, self.scale, &self.font, text);
    }
}

#[cfg(test)]
const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
#[cfg(test)]
const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

#[test]
fn test_fallback_on_missing_font() {
    let missing = PathBuf::from("/no/such/dir/arial.ttf");
    let font = LabelFont::from_candidates(&[missing], 12).unwrap();
    let embedded = LabelFont::embedded(12).unwrap();
    assert_eq!(font.text_size("ID1"), embedded.text_size("ID1"));
    assert_eq!(font.text_size(""), (0, 0));
}

#[test]
fn test_fallback_on_broken_font() {
    let dir = tempfile::tempdir().unwrap();
    let fake = dir.path().join("arial.ttf");
    fs::write(&fake, b"definitely not a truetype font").unwrap();
    assert!(load_font_file(&fake).is_none());
    let font = LabelFont::from_candidates(&[fake], 24).unwrap();
    let embedded = LabelFont::embedded(24).unwrap();
    assert_eq!(font.text_size("ID2"), embedded.text_size("ID2"));
}

#[test]
fn test_text_size_grows_with_font_size() {
    let (w_12, h_12) = LabelFont::embedded(12).unwrap().text_size("ID1");
    let (w_24, h_24) = LabelFont::embedded(24).unwrap().text_size("ID1");
    assert!(w_12 > 0 && h_12 > 0);
    assert!(w_24 > w_12);
    assert!(h_24 > h_12);
}

#[test]
fn test_draw_text() {
    let mut im = RgbaImage::from_pixel(100, 40, BLACK);
    let font = LabelFont::embedded(24).unwrap();
    let (w, h) = font.text_size("ID1");
    font.draw_text(&mut im, WHITE, 2, 2, "ID1");
    let is_drawn = |x: u32, y: u32| im.get_pixel(x, y)[0] > 0;
    // antialiased, hence mostly but not necessarily fully white
    assert!(im.pixels().any(|p| p[0] > 128 && p[1] > 128 && p[2] > 128));
    // nothing left of or below the measured text
    for y in 0..im.height() {
        assert!(!is_drawn(0, y) && !is_drawn(1, y));
        for x in (2 + w)..im.width() {
            assert!(!is_drawn(x, y));
        }
    }
    for x in 0..im.width() {
        for y in (2 + h)..im.height() {
            assert!(!is_drawn(x, y));
        }
    }
}

#[test]
fn test_draw_text_clipped() {
    let font = LabelFont::embedded(12).unwrap();
    let mut im = RgbaImage::from_pixel(6, 6, BLACK);
    font.draw_text(&mut im, WHITE, -1000, -1000, "ID3");
    font.draw_text(&mut im, WHITE, 1000, 1000, "ID3");
    assert!(im.pixels().all(|p| *p == BLACK));
    font.draw_text(&mut im, WHITE, -2, -5, "ID3");
    assert!(im.pixels().any(|p| *p != BLACK));
}

#[test]
fn test_find_named_fonts() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("truetype").join("msttcorefonts");
    fs::create_dir_all(&nested).unwrap();
    fs::write(nested.join("Arial.ttf"), b"x").unwrap();
    fs::write(nested.join("arial_bold.ttf"), b"x").unwrap();
    fs::write(dir.path().join("arial.ttf"), b"x").unwrap();
    let found = find_named_fonts(&[dir.path()]);
    assert_eq!(found.len(), 2);
    assert!(found.contains(&dir.path().join("arial.ttf")));
    assert!(found.contains(&nested.join("Arial.ttf")));
    assert!(find_named_fonts(&["/no/such/font/dir"]).is_empty());
}

#[test]
fn test_candidates() {
    assert_eq!(FONT_CANDIDATES[0], PathBuf::from("arial.ttf"));
    assert_eq!(FONT_CANDIDATES[1], PathBuf::from("Arial.ttf"));
}
