use super::*;

fn renderer(samples: Vec<f32>) -> WaveformRenderer {
    WaveformRenderer::new(64, 36, samples.into(), 4.0, WaveformStyle::default())
}

#[test]
fn band_height_follows_width_ratio() {
    assert_eq!(band_height(640, 480), 150);
    assert_eq!(band_height(64, 36), 15);
    assert_eq!(band_height(640, 100), 100);
}

#[test]
fn column_extents_cover_every_column() {
    let samples: Vec<f32> = (0..256).map(|i| if i % 2 == 0 { 0.5 } else { -0.25 }).collect();
    let cols = column_extents(&samples, 64);
    assert_eq!(cols.len(), 64);
    for (lo, hi) in cols {
        assert_eq!(lo, -0.25);
        assert_eq!(hi, 0.5);
    }
    assert_eq!(column_extents(&[], 4), vec![(0.0, 0.0); 4]);
}

#[test]
fn rendered_frame_has_requested_size() {
    let r = renderer(vec![0.0, 1.0, -1.0, 0.0]);
    let frame = r.render(1.0).unwrap();
    assert_eq!((frame.width, frame.height), (64, 36));
    assert_eq!(frame.data.len(), frame.expected_len());
    assert!(!frame.premultiplied);
}

#[test]
fn dial_sweeps_across_the_frame() {
    let r = renderer(vec![0.0; 128]);
    assert_eq!(r.dial_x(0.0), 0);
    assert_eq!(r.dial_x(2.0), 32);
    assert_eq!(r.dial_x(4.0), 63);

    let frame = r.render(2.0).unwrap();
    let bottom_row = 35usize;
    let px = (bottom_row * 64 + 32) * 4;
    assert_eq!(&frame.data[px..px + 4], &WaveformStyle::default().dial);
}

#[test]
fn negative_time_is_a_render_failure() {
    let r = renderer(vec![0.0; 8]);
    let err = r.render(-1.0).unwrap_err();
    assert!(err.to_string().contains("invalid playback time"));
}
