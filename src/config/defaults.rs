pub const DEFAULT_BUFFER_CAPACITY: usize = 50;
pub const MIN_BUFFER_CAPACITY: usize = 1;
// Frames are full-resolution RGB; 1000 frames of 1080p is about 6 GB.
pub const MAX_BUFFER_CAPACITY: usize = 1000;

pub const DEFAULT_FFMPEG_CMD: &str = "ffmpeg";
pub const DEFAULT_FFPROBE_CMD: &str = "ffprobe";
