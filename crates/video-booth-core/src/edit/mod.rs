mod composition;
mod editor;
mod ffmpeg;
mod slow_motion;
mod toolkit;

pub use {
    composition::{Composition, CompositionTrack, Segment, TimeRange, TrackKind},
    editor::VideoEditor,
    ffmpeg::FfmpegToolkit,
    slow_motion::{DEFAULT_MULTIPLIER, MAX_MULTIPLIER, MAX_WINDOW, SlowMotionSpec},
    toolkit::{ContainerType, ExportPreset, ExportRequest, ExportStatus, MediaInfo, MediaToolkit},
};
