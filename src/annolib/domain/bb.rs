use std::fmt::Display;

/// Axis aligned box covering `x..x_max` and `y..y_max`. Annotation outlines are drawn inclusively
/// up to `x_max` and `y_max`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct BB {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}
impl BB {
    /// `(x1, y1)` and `(x2, y2)` are opposite corners, their order does not matter.
    pub fn from_corners(x1: u32, y1: u32, x2: u32, y2: u32) -> Self {
        let x_min = x1.min(x2);
        let y_min = y1.min(y2);
        BB {
            x: x_min,
            y: y_min,
            w: x1.max(x2) - x_min,
            h: y1.max(y2) - y_min,
        }
    }

    pub fn x_max(&self) -> u32 {
        self.x + self.w
    }

    pub fn y_max(&self) -> u32 {
        self.y + self.h
    }

    /// `(x1, y1, x2, y2)`
    pub fn corners(&self) -> (u32, u32, u32, u32) {
        (self.x, self.y, self.x_max(), self.y_max())
    }
}

impl Display for BB {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let bb_str = format!("[{}, {}, {}, {}]", self.x, self.y, self.w, self.h);
        f.write_str(bb_str.as_str())
    }
}

#[test]
fn test_from_corners() {
    let bb = BB::from_corners(10, 20, 30, 25);
    assert_eq!(
        bb,
        BB {
            x: 10,
            y: 20,
            w: 20,
            h: 5
        }
    );
    assert_eq!(bb.corners(), (10, 20, 30, 25));
    assert_eq!(BB::from_corners(30, 25, 10, 20), bb);
    assert_eq!(format!("{bb}"), "[10, 20, 20, 5]");
}
