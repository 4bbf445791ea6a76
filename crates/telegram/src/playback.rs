//! Per-chat playback lifecycle behind `/play` and `/stop`

use media::{resolve_track, AudioParameters, DownloadedTrack, MediaError, VoiceError};
use teloxide::types::{ChatId, MessageId};

use crate::chat::{ChatClient, StatusMessage};
use crate::constants::{emoji, messages};
use crate::error::{BotResult, ErrorCategory, UserMessage};
use crate::handlers;
use crate::types::AppContext;

/// A `/play` command after argument parsing
#[derive(Debug, Clone)]
pub struct PlaybackRequest {
    pub chat_id: ChatId,
    /// The command message, which replies are threaded under
    pub reply_to: MessageId,
    /// Normalized search text; empty when the user gave none
    pub query: String,
}

/// Search, download and stream a track into the chat's voice call
///
/// Once the status message is out, a failure edits it with the error's user
/// message and ends the command successfully. Rate limits are returned so the
/// caller can wait them out.
pub async fn play<C>(chat: &C, ctx: &AppContext, req: PlaybackRequest) -> BotResult<()>
where
    C: ChatClient + ?Sized,
{
    if req.query.is_empty() {
        chat.reply(req.chat_id, req.reply_to, messages::PLAY_USAGE)
            .await?;
        return Ok(());
    }

    if !ctx.status.voice_available {
        chat.reply(req.chat_id, req.reply_to, messages::VOICE_UNAVAILABLE)
            .await?;
        return Ok(());
    }

    let status = chat
        .reply(req.chat_id, req.reply_to, messages::SEARCHING)
        .await?;

    match fetch_and_stream(chat, ctx, &req, status).await {
        Ok(track) => {
            tracing::info!(
                chat_id = req.chat_id.0,
                "Now playing {} ({})",
                track.title,
                track.path.display()
            );
            Ok(())
        }
        Err(err) if matches!(err.category(), ErrorCategory::RateLimited(_)) => Err(err),
        Err(err) => {
            handlers::report(&err, req.chat_id, "play");
            chat.edit(status, &err.user_message()).await
        }
    }
}

async fn fetch_and_stream<C>(
    chat: &C,
    ctx: &AppContext,
    req: &PlaybackRequest,
    status: StatusMessage,
) -> BotResult<DownloadedTrack>
where
    C: ChatClient + ?Sized,
{
    ctx.scratch.prepare().await?;

    tracing::info!(chat_id = req.chat_id.0, "Searching for {:?}", req.query);
    let info = ctx
        .extractor
        .search_and_download(&req.query, ctx.scratch.path())
        .await?
        .ok_or_else(|| MediaError::NoResults(req.query.clone()))?;

    let track = resolve_track(&info).await?;
    tracing::debug!("Resolved {} to {}", track.title, track.path.display());

    if let Err(e) = ctx.voice.leave(req.chat_id.0).await {
        tracing::debug!(chat_id = req.chat_id.0, "No previous session left: {}", e);
    }

    chat.edit(status, messages::JOINING).await?;
    ctx.voice
        .join(req.chat_id.0, &track.path, AudioParameters::HIGH_QUALITY)
        .await?;

    chat.edit(
        status,
        &format!("{} Now playing: {}", emoji::NOTES, track.title),
    )
    .await?;

    Ok(track)
}

/// Leave the chat's voice call and discard downloaded audio
pub async fn stop<C>(
    chat: &C,
    ctx: &AppContext,
    chat_id: ChatId,
    reply_to: MessageId,
) -> BotResult<()>
where
    C: ChatClient + ?Sized,
{
    match ctx.voice.leave(chat_id.0).await {
        Ok(()) => {}
        Err(VoiceError::NotInCall) => {
            chat.reply(chat_id, reply_to, messages::NOTHING_PLAYING)
                .await?;
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    }

    ctx.scratch.remove().await?;
    tracing::info!(chat_id = chat_id.0, "Playback stopped");

    chat.reply(chat_id, reply_to, messages::STOPPED).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{
        context, ChatEvent, ExtractorBehavior, FakeChat, FakeExtractor, FakeVoice, VoiceCall,
        CHAT, COMMAND_MSG,
    };
    use media::VoiceCalls;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;

    fn request(query: &str) -> PlaybackRequest {
        PlaybackRequest {
            chat_id: CHAT,
            reply_to: COMMAND_MSG,
            query: query.to_string(),
        }
    }

    fn download(title: &str, ext: &'static str) -> Arc<FakeExtractor> {
        Arc::new(FakeExtractor::new(ExtractorBehavior::Download {
            title: title.to_string(),
            ext,
        }))
    }

    fn scratch_in(tmp: &TempDir) -> PathBuf {
        tmp.path().join("downloads")
    }

    fn listing(dir: &Path) -> Vec<PathBuf> {
        let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect();
        entries.sort();
        entries
    }

    #[tokio::test]
    async fn test_empty_query_replies_usage_without_download() {
        let tmp = TempDir::new().unwrap();
        let extractor = download("song x", "mp3");
        let voice = Arc::new(FakeVoice::new());
        let ctx = context(extractor.clone(), voice.clone(), &scratch_in(&tmp), true);
        let chat = FakeChat::new();

        play(&chat, &ctx, request("")).await.unwrap();

        assert_eq!(
            chat.events(),
            vec![ChatEvent::Reply(messages::PLAY_USAGE.to_string())]
        );
        assert_eq!(extractor.calls(), 0);
        assert!(voice.calls().is_empty());
    }

    #[tokio::test]
    async fn test_voice_unavailable_short_circuits() {
        let tmp = TempDir::new().unwrap();
        let extractor = download("song x", "mp3");
        let ctx = context(
            extractor.clone(),
            Arc::new(FakeVoice::new()),
            &scratch_in(&tmp),
            false,
        );
        let chat = FakeChat::new();

        play(&chat, &ctx, request("song x")).await.unwrap();

        assert_eq!(chat.texts(), vec![messages::VOICE_UNAVAILABLE.to_string()]);
        assert_eq!(extractor.calls(), 0);
    }

    #[tokio::test]
    async fn test_no_results_edits_status_and_never_joins() {
        let tmp = TempDir::new().unwrap();
        let extractor = Arc::new(FakeExtractor::new(ExtractorBehavior::NoResults));
        let voice = Arc::new(FakeVoice::new());
        let ctx = context(extractor, voice.clone(), &scratch_in(&tmp), true);
        let chat = FakeChat::new();

        play(&chat, &ctx, request("lofi beats")).await.unwrap();

        let events = chat.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], ChatEvent::Reply(messages::SEARCHING.to_string()));
        match &events[1] {
            ChatEvent::Edit(_, text) => {
                assert_eq!(text, "❌ No results found for \"lofi beats\".")
            }
            other => panic!("expected an edit, got {:?}", other),
        }
        assert!(voice.calls().is_empty());
    }

    #[tokio::test]
    async fn test_missing_file_reports_not_found_and_never_joins() {
        let tmp = TempDir::new().unwrap();
        let extractor = Arc::new(FakeExtractor::new(ExtractorBehavior::DownloadNothing {
            title: "ghost".to_string(),
        }));
        let voice = Arc::new(FakeVoice::new());
        let ctx = context(extractor, voice.clone(), &scratch_in(&tmp), true);
        let chat = FakeChat::new();

        play(&chat, &ctx, request("ghost")).await.unwrap();

        assert_eq!(
            chat.texts(),
            vec![
                messages::SEARCHING.to_string(),
                messages::FILE_NOT_FOUND.to_string()
            ]
        );
        assert_eq!(voice.joins(), 0);
    }

    #[tokio::test]
    async fn test_successful_play_edits_status_through_milestones() {
        let tmp = TempDir::new().unwrap();
        let scratch = scratch_in(&tmp);
        let voice = Arc::new(FakeVoice::new());
        let ctx = context(download("song x", "mp3"), voice.clone(), &scratch, true);
        let chat = FakeChat::new();

        play(&chat, &ctx, request("song x")).await.unwrap();

        let events = chat.events();
        let status_id = match &events[0] {
            ChatEvent::Reply(text) => {
                assert_eq!(text, messages::SEARCHING);
                MessageId(100)
            }
            other => panic!("expected a reply, got {:?}", other),
        };
        assert_eq!(
            events[1..],
            [
                ChatEvent::Edit(status_id, messages::JOINING.to_string()),
                ChatEvent::Edit(status_id, "🎶 Now playing: song x".to_string()),
            ]
        );

        assert_eq!(
            voice.calls(),
            vec![
                VoiceCall::Leave(CHAT.0),
                VoiceCall::Join(CHAT.0, scratch.join("song x.mp3")),
            ]
        );
        assert!(voice.is_joined(CHAT.0));
    }

    #[tokio::test]
    async fn test_scratch_holds_only_latest_attempt() {
        let tmp = TempDir::new().unwrap();
        let scratch = scratch_in(&tmp);
        std::fs::create_dir_all(scratch.join("old-album")).unwrap();
        std::fs::write(scratch.join("previous.mp3"), b"old").unwrap();

        let extractor = download("fresh", "m4a");
        let ctx = context(extractor.clone(), Arc::new(FakeVoice::new()), &scratch, true);

        play(&FakeChat::new(), &ctx, request("fresh")).await.unwrap();

        assert!(extractor.seen_before_download().is_empty());
        assert_eq!(listing(&scratch), vec![scratch.join("fresh.m4a")]);
    }

    #[tokio::test]
    async fn test_extractor_failure_is_shown_in_status() {
        let tmp = TempDir::new().unwrap();
        let extractor = Arc::new(FakeExtractor::new(ExtractorBehavior::Fail));
        let voice = Arc::new(FakeVoice::new());
        let ctx = context(extractor, voice.clone(), &scratch_in(&tmp), true);
        let chat = FakeChat::new();

        play(&chat, &ctx, request("song x")).await.unwrap();

        let texts = chat.texts();
        assert_eq!(texts.len(), 2);
        assert!(texts[1].starts_with("⚠️ Error: "));
        assert!(texts[1].chars().count() <= "⚠️ Error: ".chars().count() + 100);
        assert!(voice.calls().is_empty());
    }

    #[tokio::test]
    async fn test_join_permission_error_edits_status() {
        let tmp = TempDir::new().unwrap();
        let voice = Arc::new(FakeVoice::new());
        voice.fail_joins_with(|| VoiceError::AdminRequired);
        let ctx = context(download("song x", "mp3"), voice, &scratch_in(&tmp), true);
        let chat = FakeChat::new();

        play(&chat, &ctx, request("song x")).await.unwrap();

        assert_eq!(
            chat.texts(),
            vec![
                messages::SEARCHING.to_string(),
                messages::JOINING.to_string(),
                messages::ADMIN_REQUIRED.to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_join_rate_limit_propagates() {
        let tmp = TempDir::new().unwrap();
        let voice = Arc::new(FakeVoice::new());
        voice.fail_joins_with(|| VoiceError::FloodWait(3));
        let ctx = context(download("song x", "mp3"), voice, &scratch_in(&tmp), true);
        let chat = FakeChat::new();

        let err = play(&chat, &ctx, request("song x")).await.unwrap_err();

        assert_eq!(
            err.category(),
            ErrorCategory::RateLimited(Duration::from_secs(3))
        );
        assert_eq!(chat.texts().len(), 2);
    }

    #[tokio::test]
    async fn test_play_then_stop_leaves_and_removes_scratch() {
        let tmp = TempDir::new().unwrap();
        let scratch = scratch_in(&tmp);
        let voice = Arc::new(FakeVoice::new());
        let ctx = context(download("song x", "mp3"), voice.clone(), &scratch, true);
        let chat = FakeChat::new();

        play(&chat, &ctx, request("song x")).await.unwrap();
        assert!(scratch.join("song x.mp3").exists());

        stop(&chat, &ctx, CHAT, COMMAND_MSG).await.unwrap();

        assert!(!voice.is_joined(CHAT.0));
        assert_eq!(voice.calls().last(), Some(&VoiceCall::Leave(CHAT.0)));
        assert!(!scratch.exists());
        assert_eq!(
            chat.texts().last().map(String::as_str),
            Some(messages::STOPPED)
        );
    }

    #[tokio::test]
    async fn test_stop_with_missing_scratch_still_confirms() {
        let tmp = TempDir::new().unwrap();
        let scratch = scratch_in(&tmp);
        let voice = Arc::new(FakeVoice::new());
        voice
            .join(CHAT.0, Path::new("x.mp3"), AudioParameters::default())
            .await
            .unwrap();
        let ctx = context(download("x", "mp3"), voice, &scratch, true);
        let chat = FakeChat::new();

        stop(&chat, &ctx, CHAT, COMMAND_MSG).await.unwrap();

        assert_eq!(chat.texts(), vec![messages::STOPPED.to_string()]);
        assert!(!scratch.exists());
    }

    #[tokio::test]
    async fn test_stop_without_session_keeps_scratch() {
        let tmp = TempDir::new().unwrap();
        let scratch = scratch_in(&tmp);
        std::fs::create_dir_all(&scratch).unwrap();
        let ctx = context(
            download("x", "mp3"),
            Arc::new(FakeVoice::new()),
            &scratch,
            true,
        );
        let chat = FakeChat::new();

        stop(&chat, &ctx, CHAT, COMMAND_MSG).await.unwrap();

        assert_eq!(chat.texts(), vec![messages::NOTHING_PLAYING.to_string()]);
        assert!(scratch.exists());
    }
}
