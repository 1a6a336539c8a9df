pub mod audio_extraction;

pub use audio_extraction::{
    AudioByteStream, AudioExtractionError, AudioStreamSource, YtDlpSource,
};
