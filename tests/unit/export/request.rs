use super::*;
use chrono::TimeZone as _;

fn request(samples: Vec<f32>) -> ExportRequest {
    ExportRequest::from_samples(
        64,
        36,
        Utc.with_ymd_and_hms(2021, 3, 11, 0, 0, 0).unwrap(),
        Duration::from_secs(3600),
        40,
        OctavesHigher::Eight,
        VolumeModifier::Fixed,
        samples,
    )
}

#[test]
fn multipliers_are_powers_of_two() {
    assert_eq!(OctavesHigher::Seven.multiplier(), 128);
    assert_eq!(OctavesHigher::Eight.multiplier(), 256);
    assert_eq!(OctavesHigher::Fourteen.multiplier(), 16_384);
    assert_eq!(OctavesHigher::from_octaves(11), Some(OctavesHigher::Eleven));
    assert_eq!(OctavesHigher::from_octaves(6), None);
    assert_eq!(OctavesHigher::Nine.to_string(), "\u{2669} 9");
}

#[test]
fn playback_length_follows_sample_count() {
    // 40 sps * 256 = 10_240 Hz; 20_480 samples play for 2 seconds.
    let req = request(vec![0.0; 20_480]);
    assert_eq!(req.nominal_sample_rate(), 10_240.0);
    assert!((req.playback_secs - 2.0).abs() < 1e-12);
    req.validate().unwrap();
}

#[test]
fn wall_clock_maps_playback_time_onto_real_span() {
    let req = request(vec![0.0; 20_480]);
    assert_eq!(req.wall_clock_at(0.0), req.start);
    let mid = req.wall_clock_at(1.0);
    assert_eq!((mid - req.start).num_seconds(), 1800);
    let past_end = req.wall_clock_at(10.0);
    assert_eq!((past_end - req.start).num_seconds(), 3600);
}

#[test]
fn validate_rejects_bad_shapes() {
    let mut req = request(vec![0.0; 1024]);
    req.width = 63;
    assert!(req.validate().is_err());

    let req = request(Vec::new());
    assert!(req.validate().is_err());

    let mut req = request(vec![0.0; 1024]);
    req.samples_per_second = 0;
    assert!(req.validate().is_err());
}
