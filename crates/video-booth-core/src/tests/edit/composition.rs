use crate::edit::{Composition, TimeRange, TrackKind};

use std::time::Duration;

fn secs(s: f64) -> Duration {
    Duration::from_secs_f64(s)
}

fn approx(a: Duration, b: Duration) -> bool {
    (a.as_secs_f64() - b.as_secs_f64()).abs() < 1e-6
}

/// WHAT: A 3s window slowed 3x grows a 10s clip to 16s
/// WHY: Output length is original + (multiplier - 1) x window
#[test]
fn given_ten_second_source_when_scaling_window_three_times_then_sixteen_seconds() {
    // Given: A 10s source with audio
    let mut composition = Composition::from_source(secs(10.0), true);

    // When: Stretching [1s, 4s) to 9s
    composition.scale_time_range(TimeRange::new(secs(1.0), secs(3.0)), secs(9.0));

    // Then: Both tracks last 16s
    assert!(approx(composition.duration(), secs(16.0)));
    for track in composition.tracks() {
        assert!(approx(track.duration(), secs(16.0)));
    }
}

/// WHAT: Only the window is slowed; before and after keep normal speed
/// WHY: The effect must not change the pacing of the rest of the clip
#[test]
fn given_inner_window_when_scaling_then_three_segments_with_only_middle_stretched() {
    // Given: A 10s video-only source
    let mut composition = Composition::from_source(secs(10.0), false);

    // When: Slowing [1s, 4s) by 3x
    composition.scale_time_range(TimeRange::new(secs(1.0), secs(3.0)), secs(9.0));

    // Then: pre / slowed / post segments cover the source contiguously
    let video = composition.track(TrackKind::Video).unwrap();
    assert_eq!(video.segments.len(), 3);

    let [pre, slow, post] = [video.segments[0], video.segments[1], video.segments[2]];
    assert!(approx(pre.source.start, secs(0.0)));
    assert!(approx(pre.source.duration, secs(1.0)));
    assert!((pre.stretch() - 1.0).abs() < 1e-9);

    assert!(approx(slow.source.start, secs(1.0)));
    assert!(approx(slow.source.duration, secs(3.0)));
    assert!(approx(slow.output_duration, secs(9.0)));
    assert!((slow.stretch() - 3.0).abs() < 1e-9);

    assert!(approx(post.source.start, secs(4.0)));
    assert!(approx(post.source.duration, secs(6.0)));
    assert!((post.stretch() - 1.0).abs() < 1e-9);

    assert!(composition.track(TrackKind::Audio).is_none());
}

/// WHAT: A window at the very start yields no empty leading segment
/// WHY: Zero-length segments make the export filter graph invalid
#[test]
fn given_window_at_start_when_scaling_then_two_segments() {
    // Given: A 5s source
    let mut composition = Composition::from_source(secs(5.0), true);

    // When: Slowing the first 2s by 2x
    composition.scale_time_range(TimeRange::new(secs(0.0), secs(2.0)), secs(4.0));

    // Then: Two segments per track, total 7s
    for track in composition.tracks() {
        assert_eq!(track.segments.len(), 2);
    }
    assert!(approx(composition.duration(), secs(7.0)));
}

/// WHAT: A window outside the timeline leaves the composition unchanged
/// WHY: Scaling must be a no-op rather than corrupt the timeline
#[test]
fn given_window_past_timeline_when_scaling_then_unchanged() {
    // Given: A 5s source
    let original = Composition::from_source(secs(5.0), true);
    let mut composition = original.clone();

    // When: Scaling a window that starts after the end
    composition.scale_time_range(TimeRange::new(secs(6.0), secs(2.0)), secs(6.0));

    // Then: Nothing changed
    assert_eq!(composition, original);
}

/// WHAT: Slowing twice compounds on the already-stretched timeline
/// WHY: scale_time_range works in output time, like an editing timeline
#[test]
fn given_scaled_composition_when_scaling_again_then_durations_compound() {
    // Given: A 10s source with [0s, 2s) slowed 2x (now 12s)
    let mut composition = Composition::from_source(secs(10.0), false);
    composition.scale_time_range(TimeRange::new(secs(0.0), secs(2.0)), secs(4.0));

    // When: Slowing output [4s, 6s) (source 2s..4s) by 2x
    composition.scale_time_range(TimeRange::new(secs(4.0), secs(2.0)), secs(4.0));

    // Then: 14s total, source still covered contiguously
    assert!(approx(composition.duration(), secs(14.0)));
    let video = composition.track(TrackKind::Video).unwrap();
    let covered: f64 = video
        .segments
        .iter()
        .map(|s| s.source.duration.as_secs_f64())
        .sum();
    assert!((covered - 10.0).abs() < 1e-6);
}
