use image::{Delay, Rgba, RgbaImage, codecs::gif::GifEncoder};

use super::*;

const RED: [u8; 4] = [255, 0, 0, 255];
const BLUE: [u8; 4] = [0, 0, 255, 255];

fn encode_gif(colors: &[[u8; 4]], delay_ms: u32, w: u32, h: u32) -> Vec<u8> {
    let mut buf = Vec::new();
    {
        let mut enc = GifEncoder::new(&mut buf);
        let frames = colors.iter().map(|c| {
            image::Frame::from_parts(
                RgbaImage::from_pixel(w, h, Rgba(*c)),
                0,
                0,
                Delay::from_numer_denom_ms(delay_ms, 1),
            )
        });
        enc.encode_frames(frames).unwrap();
    }
    buf
}

#[test]
fn decode_two_frame_gif() {
    let bytes = encode_gif(&[RED, BLUE], 100, 4, 3);
    let mut movie = GifMovie::decode(&bytes).unwrap();

    assert_eq!(movie.width(), 4);
    assert_eq!(movie.height(), 3);
    assert_eq!(movie.frame_count(), 2);
    assert_eq!(movie.duration_ms(), 200);

    let mut frame = Frame::new(4, 3);
    movie.draw(50, &mut frame).unwrap();
    assert_eq!(frame.pixel(0, 0), Some(RED));
    movie.draw(150, &mut frame).unwrap();
    assert_eq!(frame.pixel(3, 2), Some(BLUE));
}

#[test]
fn frame_index_wraps_on_duration() {
    let bytes = encode_gif(&[RED, BLUE, RED], 100, 1, 1);
    let movie = GifMovie::decode(&bytes).unwrap();

    assert_eq!(movie.frame_index_at(0), 0);
    assert_eq!(movie.frame_index_at(99), 0);
    assert_eq!(movie.frame_index_at(100), 1);
    assert_eq!(movie.frame_index_at(299), 2);
    assert_eq!(movie.frame_index_at(300), 0);
    assert_eq!(movie.frame_index_at(450), 1);
}

#[test]
fn single_frame_has_zero_duration() {
    let bytes = encode_gif(&[RED], 100, 2, 2);
    let mut movie = decode_movie(&bytes).unwrap();
    assert_eq!(movie.duration_ms(), 0);

    let mut frame = Frame::new(2, 2);
    movie.draw(12345, &mut frame).unwrap();
    assert_eq!(frame.pixel(1, 1), Some(RED));
}

#[test]
fn garbage_and_empty_are_decode_failures() {
    assert!(matches!(
        GifMovie::decode(b""),
        Err(GifViewError::DecodeFailure(_))
    ));
    assert!(matches!(
        GifMovie::decode(b"definitely not a gif"),
        Err(GifViewError::DecodeFailure(_))
    ));
}
