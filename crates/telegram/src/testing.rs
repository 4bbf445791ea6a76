//! Recording fakes for the chat, extractor and voice seams

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use media::{
    AudioParameters, Extractor, MediaError, ScratchDir, TrackInfo, VoiceCalls, VoiceError,
};
use teloxide::types::{ChatId, MessageId};

use crate::chat::{ChatClient, StatusMessage};
use crate::error::{BotError, BotResult};
use crate::types::{AppContext, SystemStatus};

pub const CHAT: ChatId = ChatId(-1001);
pub const COMMAND_MSG: MessageId = MessageId(10);

/// What a handler did in the chat, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    Reply(String),
    Edit(MessageId, String),
}

#[derive(Default)]
pub struct FakeChat {
    events: Mutex<Vec<ChatEvent>>,
    next_id: AtomicI32,
    fail_replies: Mutex<Option<fn() -> BotError>>,
}

impl FakeChat {
    pub fn new() -> Self {
        Self {
            next_id: AtomicI32::new(100),
            ..Default::default()
        }
    }

    /// Make every reply fail with the error `make` builds
    pub fn fail_replies_with(&self, make: fn() -> BotError) {
        *self.fail_replies.lock().unwrap() = Some(make);
    }

    pub fn events(&self) -> Vec<ChatEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Texts of replies and edits, in order
    pub fn texts(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .map(|e| match e {
                ChatEvent::Reply(t) | ChatEvent::Edit(_, t) => t,
            })
            .collect()
    }
}

#[async_trait]
impl ChatClient for FakeChat {
    async fn reply(
        &self,
        chat_id: ChatId,
        _reply_to: MessageId,
        text: &str,
    ) -> BotResult<StatusMessage> {
        if let Some(make) = *self.fail_replies.lock().unwrap() {
            return Err(make());
        }
        self.events
            .lock()
            .unwrap()
            .push(ChatEvent::Reply(text.to_string()));
        Ok(StatusMessage {
            chat_id,
            message_id: MessageId(self.next_id.fetch_add(1, Ordering::SeqCst)),
        })
    }

    async fn edit(&self, message: StatusMessage, text: &str) -> BotResult<()> {
        self.events
            .lock()
            .unwrap()
            .push(ChatEvent::Edit(message.message_id, text.to_string()));
        Ok(())
    }
}

/// What the fake extractor should do when called
pub enum ExtractorBehavior {
    /// Write `<title>.<ext>` into the download dir and report it
    Download { title: String, ext: &'static str },
    /// Report a hit but write nothing
    DownloadNothing { title: String },
    NoResults,
    Fail,
}

pub struct FakeExtractor {
    behavior: ExtractorBehavior,
    calls: AtomicUsize,
    /// Directory listing taken right before "downloading"
    seen_before_download: Mutex<Vec<PathBuf>>,
}

impl FakeExtractor {
    pub fn new(behavior: ExtractorBehavior) -> Self {
        Self {
            behavior,
            calls: AtomicUsize::new(0),
            seen_before_download: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen_before_download(&self) -> Vec<PathBuf> {
        self.seen_before_download.lock().unwrap().clone()
    }
}

#[async_trait]
impl Extractor for FakeExtractor {
    async fn search_and_download(
        &self,
        _query: &str,
        dir: &Path,
    ) -> Result<Option<TrackInfo>, MediaError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let listing = std::fs::read_dir(dir)?
            .filter_map(|e| e.ok().map(|e| e.path()))
            .collect();
        *self.seen_before_download.lock().unwrap() = listing;

        match &self.behavior {
            ExtractorBehavior::Download { title, ext } => {
                std::fs::write(dir.join(format!("{title}.{ext}")), b"audio")?;
                Ok(Some(TrackInfo {
                    title: title.clone(),
                    base_path: dir.join(title),
                }))
            }
            ExtractorBehavior::DownloadNothing { title } => Ok(Some(TrackInfo {
                title: title.clone(),
                base_path: dir.join(title),
            })),
            ExtractorBehavior::NoResults => Ok(None),
            ExtractorBehavior::Fail => Err(MediaError::Extractor {
                status: "exit status: 1".to_string(),
                stderr: "ERROR: Unable to download webpage".to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceCall {
    Join(i64, PathBuf),
    Leave(i64),
}

/// Voice client that tracks joined chats in memory
#[derive(Default)]
pub struct FakeVoice {
    calls: Mutex<Vec<VoiceCall>>,
    joined: Mutex<Vec<i64>>,
    join_error: Mutex<Option<fn() -> VoiceError>>,
}

impl FakeVoice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every join fail with the error `make` builds
    pub fn fail_joins_with(&self, make: fn() -> VoiceError) {
        *self.join_error.lock().unwrap() = Some(make);
    }

    pub fn calls(&self) -> Vec<VoiceCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn joins(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, VoiceCall::Join(..)))
            .count()
    }

    pub fn is_joined(&self, chat_id: i64) -> bool {
        self.joined.lock().unwrap().contains(&chat_id)
    }
}

#[async_trait]
impl VoiceCalls for FakeVoice {
    async fn join(
        &self,
        chat_id: i64,
        input: &Path,
        _params: AudioParameters,
    ) -> Result<(), VoiceError> {
        self.calls
            .lock()
            .unwrap()
            .push(VoiceCall::Join(chat_id, input.to_path_buf()));
        if let Some(make) = *self.join_error.lock().unwrap() {
            return Err(make());
        }
        self.joined.lock().unwrap().push(chat_id);
        Ok(())
    }

    async fn leave(&self, chat_id: i64) -> Result<(), VoiceError> {
        self.calls.lock().unwrap().push(VoiceCall::Leave(chat_id));
        let mut joined = self.joined.lock().unwrap();
        match joined.iter().position(|c| *c == chat_id) {
            Some(idx) => {
                joined.remove(idx);
                Ok(())
            }
            None => Err(VoiceError::NotInCall),
        }
    }
}

/// Context wired to the given fakes and scratch directory
pub fn context(
    extractor: Arc<FakeExtractor>,
    voice: Arc<FakeVoice>,
    scratch: &Path,
    voice_available: bool,
) -> AppContext {
    AppContext {
        extractor,
        voice,
        scratch: ScratchDir::new(scratch),
        status: SystemStatus {
            voice_available,
            started_at: Utc::now(),
        },
    }
}
