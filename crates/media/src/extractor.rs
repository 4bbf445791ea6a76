//! yt-dlp search-and-download client
//!
//! The extractor is driven as a subprocess. It is asked to download the
//! first search hit and to print the info JSON of every entry it handled,
//! which is where the title and the output file name come from.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tokio::time::timeout;

use crate::error::MediaError;
use crate::utils;

/// How long a single search-and-download may take
pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(600);

/// Metadata of a downloaded search hit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackInfo {
    /// Track title as reported by the platform
    pub title: String,
    /// Output path without extension; the real file carries one of
    /// [`crate::AUDIO_EXTENSIONS`] after transcoding
    pub base_path: PathBuf,
}

/// Search-and-download service
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Search for `query` and download the first hit into `dir`
    ///
    /// Returns `Ok(None)` when the search comes back empty.
    async fn search_and_download(
        &self,
        query: &str,
        dir: &Path,
    ) -> Result<Option<TrackInfo>, MediaError>;
}

/// Fixed option set passed to the extractor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadProfile {
    pub format: &'static str,
    pub output_template: &'static str,
    pub search_prefix: &'static str,
    pub audio_format: &'static str,
    pub audio_quality: &'static str,
    pub no_playlist: bool,
    pub geo_bypass: bool,
    pub no_check_certificates: bool,
}

impl Default for DownloadProfile {
    fn default() -> Self {
        Self {
            format: "bestaudio/best",
            output_template: "%(title)s.%(ext)s",
            search_prefix: "ytsearch:",
            audio_format: "mp3",
            audio_quality: "192K",
            no_playlist: true,
            geo_bypass: true,
            no_check_certificates: true,
        }
    }
}

impl DownloadProfile {
    /// Build the extractor arguments for one query
    pub fn args(&self, query: &str, dir: &Path) -> Vec<String> {
        let output = dir.join(self.output_template);
        let mut args = vec![
            "--format".to_string(),
            self.format.to_string(),
            "--output".to_string(),
            output.to_string_lossy().into_owned(),
            "--quiet".to_string(),
            "--no-warnings".to_string(),
            "--no-progress".to_string(),
            // print the info JSON of each entry but still download it
            "--dump-json".to_string(),
            "--no-simulate".to_string(),
        ];
        if self.no_playlist {
            args.push("--no-playlist".to_string());
        }
        if self.geo_bypass {
            args.push("--geo-bypass".to_string());
        }
        if self.no_check_certificates {
            args.push("--no-check-certificates".to_string());
        }
        args.extend([
            "--extract-audio".to_string(),
            "--audio-format".to_string(),
            self.audio_format.to_string(),
            "--audio-quality".to_string(),
            self.audio_quality.to_string(),
            format!("{}{}", self.search_prefix, query),
        ]);
        args
    }
}

/// Subset of the yt-dlp info JSON we read
#[derive(Debug, Deserialize)]
struct EntryJson {
    title: Option<String>,
    #[serde(rename = "_filename")]
    prepared_filename: Option<String>,
    filename: Option<String>,
}

/// Parse the JSON lines printed by `--dump-json` into track infos
///
/// Blank lines are skipped. Entries without a file name are skipped as
/// well since there is nothing to resolve on disk for them.
pub fn parse_entries(stdout: &str) -> Result<Vec<TrackInfo>, MediaError> {
    let mut tracks = Vec::new();
    for line in stdout.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let entry: EntryJson = serde_json::from_str(line)?;
        let Some(filename) = entry.prepared_filename.or(entry.filename) else {
            tracing::warn!("Extractor entry without a file name, skipping");
            continue;
        };
        let base_path = utils::strip_extension(Path::new(&filename));
        let title = entry.title.unwrap_or_else(|| {
            base_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "Unknown".to_string())
        });
        tracks.push(TrackInfo { title, base_path });
    }
    Ok(tracks)
}

/// yt-dlp subprocess client
#[derive(Debug, Clone)]
pub struct YtDlp {
    program: String,
    leading_args: Vec<String>,
    profile: DownloadProfile,
    timeout: Duration,
}

impl YtDlp {
    /// Create a client for the given command line (e.g. `yt-dlp`)
    pub fn new(command: &str) -> Self {
        let (program, leading_args) =
            utils::split_command(command).unwrap_or_else(|| ("yt-dlp".to_string(), Vec::new()));
        Self {
            program,
            leading_args,
            profile: DownloadProfile::default(),
            timeout: DOWNLOAD_TIMEOUT,
        }
    }

    /// Override the download timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn profile(&self) -> &DownloadProfile {
        &self.profile
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.leading_args).kill_on_drop(true);
        cmd
    }

    /// Report the installed extractor version
    pub async fn version(&self) -> Result<String, MediaError> {
        let output = self
            .command()
            .arg("--version")
            .output()
            .await
            .map_err(|source| MediaError::Spawn {
                bin: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(MediaError::Extractor {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

#[async_trait]
impl Extractor for YtDlp {
    async fn search_and_download(
        &self,
        query: &str,
        dir: &Path,
    ) -> Result<Option<TrackInfo>, MediaError> {
        tracing::info!("Searching and downloading: {}", query);

        let mut cmd = self.command();
        cmd.args(self.profile.args(query, dir));

        let output = timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| MediaError::Timeout(self.timeout))?
            .map_err(|source| MediaError::Spawn {
                bin: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            tracing::error!("yt-dlp failed ({}): {}", output.status, stderr);
            return Err(MediaError::Extractor {
                status: output.status.to_string(),
                stderr,
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let track = parse_entries(&stdout)?.into_iter().next();
        match &track {
            Some(t) => tracing::info!("Downloaded \"{}\" to {}", t.title, t.base_path.display()),
            None => tracing::info!("No results for: {}", query),
        }
        Ok(track)
    }
}
