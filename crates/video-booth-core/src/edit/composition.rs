use std::time::Duration;

/// A half-open `[start, start + duration)` span of media time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    /// Offset of the first instant.
    pub start: Duration,
    /// Length of the span.
    pub duration: Duration,
}

impl TimeRange {
    /// Creates a range.
    pub fn new(start: Duration, duration: Duration) -> Self {
        Self { start, duration }
    }

    /// First instant after the range.
    pub fn end(&self) -> Duration {
        self.start + self.duration
    }
}

/// Kind of media carried by a composition track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    /// Picture.
    Video,
    /// Sound.
    Audio,
}

/// A piece of source media placed on the output timeline.
///
/// Playback speed is `source.duration / output_duration`; a segment whose
/// output is longer than its source plays slowed down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    /// Span of the source file this segment plays.
    pub source: TimeRange,
    /// Time the segment occupies in the output.
    pub output_duration: Duration,
}

impl Segment {
    /// Output time per unit of source time (1.0 is normal speed).
    pub fn stretch(&self) -> f64 {
        if self.source.duration.is_zero() {
            return 1.0;
        }
        self.output_duration.as_secs_f64() / self.source.duration.as_secs_f64()
    }

    /// Sub-segment covering `len` of output time starting `offset` into this
    /// segment's output.
    fn slice(&self, offset: Duration, len: Duration) -> Segment {
        let stretch = self.stretch();
        Segment {
            source: TimeRange::new(
                self.source.start + offset.div_f64(stretch),
                len.div_f64(stretch),
            ),
            output_duration: len,
        }
    }
}

/// One track of a composition, as consecutive segments.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositionTrack {
    /// What the track carries.
    pub kind: TrackKind,
    /// Segments in output order.
    pub segments: Vec<Segment>,
}

impl CompositionTrack {
    /// Total output time of the track.
    pub fn duration(&self) -> Duration {
        self.segments.iter().map(|s| s.output_duration).sum()
    }

    fn scale(&mut self, range: TimeRange, factor: f64) {
        let mut scaled = Vec::with_capacity(self.segments.len() + 2);
        let mut cursor = Duration::ZERO;

        for segment in &self.segments {
            let seg_start = cursor;
            let seg_end = cursor + segment.output_duration;
            cursor = seg_end;

            let overlap_start = seg_start.max(range.start);
            let overlap_end = seg_end.min(range.end());

            if overlap_start >= overlap_end {
                scaled.push(*segment);
                continue;
            }

            let pieces = [
                (seg_start, overlap_start, false),
                (overlap_start, overlap_end, true),
                (overlap_end, seg_end, false),
            ];

            for (from, to, inside) in pieces {
                if to <= from {
                    continue;
                }
                let mut piece = segment.slice(from - seg_start, to - from);
                if inside {
                    piece.output_duration =
                        Duration::try_from_secs_f64(piece.output_duration.as_secs_f64() * factor)
                            .unwrap_or(Duration::MAX);
                }
                scaled.push(piece);
            }
        }

        self.segments = scaled;
    }
}

/// In-memory timeline of a single source file's tracks; the unit of export.
#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    tracks: Vec<CompositionTrack>,
}

impl Composition {
    /// A composition playing the whole source at normal speed.
    pub fn from_source(duration: Duration, with_audio: bool) -> Self {
        let whole = Segment {
            source: TimeRange::new(Duration::ZERO, duration),
            output_duration: duration,
        };

        let mut tracks = vec![CompositionTrack {
            kind: TrackKind::Video,
            segments: vec![whole],
        }];

        if with_audio {
            tracks.push(CompositionTrack {
                kind: TrackKind::Audio,
                segments: vec![whole],
            });
        }

        Self { tracks }
    }

    /// All tracks.
    pub fn tracks(&self) -> &[CompositionTrack] {
        &self.tracks
    }

    /// The track of the given kind, if present.
    pub fn track(&self, kind: TrackKind) -> Option<&CompositionTrack> {
        self.tracks.iter().find(|t| t.kind == kind)
    }

    /// Output duration (longest track).
    pub fn duration(&self) -> Duration {
        self.tracks
            .iter()
            .map(CompositionTrack::duration)
            .max()
            .unwrap_or_default()
    }

    /// Stretch `range` (in output time) to `to_duration` on every track.
    ///
    /// Everything outside the range keeps its current speed. Ranges that do
    /// not overlap the timeline, and empty ranges or targets, leave it
    /// unchanged.
    pub fn scale_time_range(&mut self, range: TimeRange, to_duration: Duration) {
        if range.duration.is_zero() || to_duration.is_zero() {
            return;
        }
        let factor = to_duration.as_secs_f64() / range.duration.as_secs_f64();
        for track in &mut self.tracks {
            track.scale(range, factor);
        }
    }
}
