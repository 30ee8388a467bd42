use image::GenericImageView;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Shape {
    pub w: u32,
    pub h: u32,
}
impl Shape {
    pub fn from_im<I>(im: &I) -> Self
    where
        I: GenericImageView,
    {
        Self {
            w: im.width(),
            h: im.height(),
        }
    }
}

#[test]
fn test_shape_from_im() {
    let im = image::RgbaImage::new(7, 3);
    assert_eq!(Shape::from_im(&im), Shape { w: 7, h: 3 });
}
