use jpeg_decoder::{Decoder, PixelFormat as JpegFormat};

use super::error::CameraError;
use super::frame::PixelFormat;

/// Decode a raw device buffer into tightly packed RGB24 of the negotiated size.
pub fn decode_frame(
    data: &[u8],
    format: PixelFormat,
    width: u32,
    height: u32,
) -> Result<Vec<u8>, CameraError> {
    let rgb = match format {
        PixelFormat::Mjpeg => {
            let mut decoder = Decoder::new(data);
            let pixels = decoder.decode()?;
            let info = decoder
                .info()
                .ok_or(CameraError::UnsupportedFormat(PixelFormat::Mjpeg))?;
            let actual = (info.width as u32, info.height as u32);
            if actual != (width, height) {
                return Err(CameraError::FrameSize {
                    expected: (width, height),
                    actual,
                });
            }
            match info.pixel_format {
                JpegFormat::RGB24 => Ok(pixels),
                JpegFormat::L8 => Ok(pixels.iter().flat_map(|&l| [l, l, l]).collect()),
                _ => Err(CameraError::UnsupportedFormat(PixelFormat::Mjpeg)),
            }?
        }
        PixelFormat::Rgb24 => {
            // Already in RGB format
            data.to_vec()
        }
        PixelFormat::Yuyv4 => yuyv_to_rgb(data),
    };

    // Raw formats carry no size of their own
    let expected = width as usize * height as usize * 3;
    if rgb.len() != expected {
        return Err(CameraError::ShortFrame {
            expected,
            actual: rgb.len(),
        });
    }
    Ok(rgb)
}

/// BT.601 limited-range YUYV (YUY2) to RGB24.
pub fn yuyv_to_rgb(data: &[u8]) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(data.len() / 2 * 3);
    for chunk in data.chunks_exact(4) {
        let (y0, u, y1, v) = (chunk[0], chunk[1], chunk[2], chunk[3]);
        rgb.extend_from_slice(&yuv_pixel(y0, u, v));
        rgb.extend_from_slice(&yuv_pixel(y1, u, v));
    }
    rgb
}

fn yuv_pixel(y: u8, u: u8, v: u8) -> [u8; 3] {
    let c = y as i32 - 16;
    let d = u as i32 - 128;
    let e = v as i32 - 128;
    let clamp = |x: i32| x.clamp(0, 255) as u8;
    [
        clamp((298 * c + 409 * e + 128) >> 8),
        clamp((298 * c - 100 * d - 208 * e + 128) >> 8),
        clamp((298 * c + 516 * d + 128) >> 8),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yuyv_black_and_white() {
        let rgb = yuyv_to_rgb(&[16, 128, 235, 128]);
        assert_eq!(rgb, vec![0, 0, 0, 255, 255, 255]);
    }

    #[test]
    fn yuyv_ignores_trailing_partial_macropixel() {
        let rgb = yuyv_to_rgb(&[16, 128, 16, 128, 99]);
        assert_eq!(rgb.len(), 6);
    }

    #[test]
    fn rgb_passes_through() {
        let data = [1u8, 2, 3, 4, 5, 6];
        assert_eq!(decode_frame(&data, PixelFormat::Rgb24, 2, 1).unwrap(), data.to_vec());
    }

    #[test]
    fn garbage_mjpeg_is_an_error() {
        assert!(decode_frame(&[0, 1, 2, 3], PixelFormat::Mjpeg, 2, 2).is_err());
    }

    fn jpeg(width: u32, height: u32) -> Vec<u8> {
        let mut out = std::io::Cursor::new(Vec::new());
        image::RgbImage::from_pixel(width, height, image::Rgb([90, 120, 200]))
            .write_to(&mut out, image::ImageFormat::Jpeg)
            .unwrap();
        out.into_inner()
    }

    #[test]
    fn mjpeg_of_negotiated_size_decodes() {
        let rgb = decode_frame(&jpeg(16, 8), PixelFormat::Mjpeg, 16, 8).unwrap();
        assert_eq!(rgb.len(), 16 * 8 * 3);
    }

    #[test]
    fn mjpeg_size_mismatch_is_rejected() {
        let err = decode_frame(&jpeg(16, 8), PixelFormat::Mjpeg, 32, 24).unwrap_err();
        assert!(matches!(
            err,
            CameraError::FrameSize {
                expected: (32, 24),
                actual: (16, 8)
            }
        ));
    }

    #[test]
    fn short_yuyv_buffer_is_rejected() {
        let err = decode_frame(&[16, 128, 16, 128], PixelFormat::Yuyv4, 4, 2).unwrap_err();
        assert!(matches!(
            err,
            CameraError::ShortFrame {
                expected: 24,
                actual: 6
            }
        ));
    }
}
