//! Media services for the voice chat bot
//!
//! This crate wraps the two external tools the bot drives: the yt-dlp
//! extractor that searches and downloads audio, and the voice-call bridge
//! that streams a file into a group call. It also owns the scratch
//! directory downloads land in.

pub mod error;
pub mod extractor;
pub mod scratch;
pub mod utils;
pub mod voice;

pub use error::{MediaError, VoiceError};
pub use extractor::{DownloadProfile, Extractor, TrackInfo, YtDlp};
pub use scratch::{resolve_track, DownloadedTrack, ScratchDir, AUDIO_EXTENSIONS};
pub use voice::{AudioParameters, BridgeCredentials, VoiceBridge, VoiceCalls};
