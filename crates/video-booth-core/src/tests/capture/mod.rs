mod ffmpeg;
mod pipeline;
