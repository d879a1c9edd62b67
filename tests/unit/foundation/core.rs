use super::*;

#[test]
fn delay_accepts_positive_values() {
    for ms in [1i64, 16, 33, 1000, i64::from(u32::MAX)] {
        assert_eq!(i64::from(FrameDelay::from_millis(ms).unwrap().as_millis()), ms);
    }
}

#[test]
fn delay_rejects_non_positive_and_huge_values() {
    for ms in [0i64, -1, -33, i64::MIN] {
        assert!(matches!(
            FrameDelay::from_millis(ms),
            Err(GifViewError::Configuration(_))
        ));
    }
    assert!(FrameDelay::from_millis(i64::from(u32::MAX) + 1).is_err());
}

#[test]
fn delay_default_is_thirty_three_millis() {
    assert_eq!(FrameDelay::default().as_millis(), DEFAULT_DELAY_MS);
    assert_eq!(
        FrameDelay::default().as_duration(),
        std::time::Duration::from_millis(33)
    );
}

#[test]
fn frame_pixel_bounds() {
    let mut f = Frame::new(2, 2);
    assert_eq!(f.data.len(), 16);
    f.data[12..16].copy_from_slice(&[1, 2, 3, 4]);
    assert_eq!(f.pixel(1, 1), Some([1, 2, 3, 4]));
    assert_eq!(f.pixel(0, 0), Some([0, 0, 0, 0]));
    assert_eq!(f.pixel(2, 0), None);

    f.clear();
    assert_eq!(f.pixel(1, 1), Some([0, 0, 0, 0]));
}

#[test]
fn frame_copy_from_checks_size() {
    let mut f = Frame::new(1, 1);
    f.copy_from(&[9, 8, 7, 6]).unwrap();
    assert_eq!(f.pixel(0, 0), Some([9, 8, 7, 6]));
    assert!(f.copy_from(&[0; 8]).is_err());
}
