use crate::foundation::error::{PlotError, PlotResult};

/// One rendered generation: opaque, straight-alpha RGBA8, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl Frame {
    /// Build an opaque frame from premultiplied RGBA8 by compositing it over `bg_rgb`.
    pub fn from_premul(
        width: u32,
        height: u32,
        premul: &[u8],
        bg_rgb: [u8; 3],
    ) -> PlotResult<Self> {
        let expected = width as usize * height as usize * 4;
        if premul.len() != expected {
            return Err(PlotError::validation(format!(
                "frame data size mismatch: got {} bytes, expected {expected}",
                premul.len()
            )));
        }
        let mut data = vec![0u8; expected];
        flatten_premul_over_bg(&mut data, premul, bg_rgb);
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let px = &self.data[i..i + 4];
        Some([px[0], px[1], px[2], px[3]])
    }

    pub fn to_rgba_image(&self) -> PlotResult<image::RgbaImage> {
        image::RgbaImage::from_raw(self.width, self.height, self.data.clone())
            .ok_or_else(|| PlotError::validation("frame buffer does not match its dimensions"))
    }

    /// Write the frame as a PNG image into `out`.
    pub fn write_png<W: std::io::Write>(&self, out: W) -> std::io::Result<()> {
        use image::ImageEncoder as _;
        image::codecs::png::PngEncoder::new(out)
            .write_image(
                &self.data,
                self.width,
                self.height,
                image::ExtendedColorType::Rgba8,
            )
            .map_err(std::io::Error::other)
    }
}

fn flatten_premul_over_bg(dst: &mut [u8], src_premul: &[u8], bg_rgb: [u8; 3]) {
    let bg_r = u16::from(bg_rgb[0]);
    let bg_g = u16::from(bg_rgb[1]);
    let bg_b = u16::from(bg_rgb[2]);

    for (d, s) in dst.chunks_exact_mut(4).zip(src_premul.chunks_exact(4)) {
        let a = u16::from(s[3]);
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }

        let inv = 255u16 - a;
        d[0] = (u16::from(s[0]) + mul_div255(bg_r, inv)).min(255) as u8;
        d[1] = (u16::from(s[1]) + mul_div255(bg_g, inv)).min(255) as u8;
        d[2] = (u16::from(s[2]) + mul_div255(bg_b, inv)).min(255) as u8;
        d[3] = 255;
    }
}

fn mul_div255(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transparent_pixels_become_background() {
        let f = Frame::from_premul(1, 1, &[0, 0, 0, 0], [10, 20, 30]).unwrap();
        assert_eq!(f.data, vec![10, 20, 30, 255]);
    }

    #[test]
    fn opaque_pixels_are_kept() {
        let f = Frame::from_premul(1, 1, &[1, 2, 3, 255], [10, 20, 30]).unwrap();
        assert_eq!(f.pixel(0, 0), Some([1, 2, 3, 255]));
        assert_eq!(f.pixel(1, 0), None);
    }

    #[test]
    fn half_alpha_blends() {
        let f = Frame::from_premul(1, 1, &[128, 0, 0, 128], [0, 0, 0]).unwrap();
        assert_eq!(f.data, vec![128, 0, 0, 255]);
    }

    #[test]
    fn size_mismatch_is_rejected() {
        assert!(Frame::from_premul(2, 2, &[0; 4], [0, 0, 0]).is_err());
    }

    #[test]
    fn png_round_trips_dimensions() {
        let f = Frame::from_premul(3, 2, &[0; 24], [5, 6, 7]).unwrap();
        let mut png = Vec::new();
        f.write_png(&mut png).unwrap();
        let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (3, 2));
        assert_eq!(decoded.get_pixel(2, 1).0, [5, 6, 7, 255]);
    }
}
