use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::foundation::core::Fps;
use crate::foundation::error::{MatteError, MatteResult};
use crate::media::frame::VideoFrame;
use crate::media::source::{FrameSource, MediaStatus, ReadyState};

/// Stream metadata reported by `ffprobe`.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoInfo {
    /// Probed file.
    pub source_path: PathBuf,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Nominal frame rate.
    pub fps: Fps,
    /// Container duration in seconds, 0 when unknown.
    pub duration_sec: f64,
}

/// Decoded frames buffered ahead of presentation.
pub const DECODE_QUEUE_DEPTH: usize = 8;

/// Read dimensions, frame rate and duration of the first video stream in `source_path`.
#[cfg(feature = "media-ffmpeg")]
#[tracing::instrument(skip_all, fields(path = %source_path.display()))]
pub fn probe_video(source_path: &Path) -> MatteResult<VideoInfo> {
    // Only the first video stream and the container duration are requested.
    let out = std::process::Command::new("ffprobe")
        .args(["-v", "error", "-select_streams", "v:0"])
        .args(["-show_entries", "stream=width,height,r_frame_rate:format=duration"])
        .args(["-of", "json"])
        .arg(source_path)
        .output()
        .map_err(|e| MatteError::decode(format!("cannot start ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(MatteError::decode(format!(
            "ffprobe rejected '{}': {}",
            source_path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let info = parse_probe(&out.stdout, source_path)?;
    tracing::debug!(
        width = info.width,
        height = info.height,
        fps = info.fps.as_f64(),
        duration_sec = info.duration_sec,
        "probed video"
    );
    Ok(info)
}

#[derive(serde::Deserialize)]
struct ProbeReport {
    #[serde(default)]
    streams: Vec<ProbedStream>,
    #[serde(default)]
    format: ProbedFormat,
}

#[derive(serde::Deserialize)]
struct ProbedStream {
    width: u32,
    height: u32,
    r_frame_rate: String,
}

#[derive(Default, serde::Deserialize)]
struct ProbedFormat {
    duration: Option<String>,
}

/// Turn `ffprobe -of json` output for one selected video stream into [`VideoInfo`].
#[cfg_attr(not(feature = "media-ffmpeg"), allow(dead_code))]
pub(crate) fn parse_probe(json: &[u8], source_path: &Path) -> MatteResult<VideoInfo> {
    let report: ProbeReport = serde_json::from_slice(json).map_err(|e| {
        MatteError::decode(format!(
            "unreadable ffprobe report for '{}': {e}",
            source_path.display()
        ))
    })?;
    let stream = report.streams.into_iter().next().ok_or_else(|| {
        MatteError::decode(format!("'{}' has no video stream", source_path.display()))
    })?;
    let fps = Fps::parse_ratio(&stream.r_frame_rate).map_err(|_| {
        MatteError::decode(format!(
            "'{}' reports frame rate '{}'",
            source_path.display(),
            stream.r_frame_rate
        ))
    })?;
    let duration_sec = report
        .format
        .duration
        .and_then(|d| d.parse::<f64>().ok())
        .unwrap_or(0.0);

    Ok(VideoInfo {
        source_path: source_path.to_path_buf(),
        width: stream.width,
        height: stream.height,
        fps,
        duration_sec,
    })
}

/// Read dimensions, frame rate and duration of the first video stream in `source_path`.
#[cfg(not(feature = "media-ffmpeg"))]
pub fn probe_video(_source_path: &Path) -> MatteResult<VideoInfo> {
    Err(MatteError::evaluation(
        "video sources require the 'media-ffmpeg' feature",
    ))
}

/// Streaming decoder: one `ffmpeg` child writing raw RGBA frames to a pipe, drained by a reader
/// thread into a bounded queue.
///
/// Decoding starts at construction so the first frame is usually buffered before playback begins.
/// The child is killed when the source is dropped.
#[cfg(feature = "media-ffmpeg")]
pub struct FfmpegSource {
    info: VideoInfo,
    child: std::process::Child,
    rx: std::sync::mpsc::Receiver<MatteResult<VideoFrame>>,

    playing: bool,
    started_at: Option<Duration>,
    current: Option<VideoFrame>,
    presented: u64,
    ready: ReadyState,
    eos: bool,
    ended: bool,
}

/// Streaming decoder placeholder; every constructor fails without the `media-ffmpeg` feature.
#[cfg(not(feature = "media-ffmpeg"))]
pub struct FfmpegSource {
    info: VideoInfo,
}

#[cfg(feature = "media-ffmpeg")]
impl FfmpegSource {
    /// Probe `path` and start decoding it.
    #[tracing::instrument(skip_all, fields(path = %path.display()))]
    pub fn open(path: &Path) -> MatteResult<Self> {
        use std::io::Read;
        use std::process::{Command, Stdio};

        let info = probe_video(path)?;
        let frame_len = crate::foundation::core::PixelSize {
            width: info.width,
            height: info.height,
        }
        .rgba8_len()?;
        if frame_len == 0 {
            return Err(MatteError::decode(
                "decoded video frame size is zero (invalid source dimensions)",
            ));
        }

        let mut child = Command::new("ffmpeg")
            .args(["-v", "error", "-nostdin", "-i"])
            .arg(path)
            .args(["-f", "rawvideo", "-pix_fmt", "rgba", "pipe:1"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| MatteError::decode(format!("failed to run ffmpeg for video decode: {e}")))?;
        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| MatteError::decode("ffmpeg stdout was not captured"))?;

        let (tx, rx) = std::sync::mpsc::sync_channel(DECODE_QUEUE_DEPTH);
        let (width, height) = (info.width, info.height);
        // Detached: the reader exits on EOF or once the receiver is gone.
        let spawned = std::thread::Builder::new()
            .name("chroma-matte-decode".to_string())
            .spawn(move || {
                loop {
                    let mut buf = vec![0u8; frame_len];
                    match stdout.read_exact(&mut buf) {
                        Ok(()) => {
                            if tx.send(VideoFrame::new(width, height, buf)).is_err() {
                                return;
                            }
                        }
                        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return,
                        Err(e) => {
                            let _ = tx.send(Err(MatteError::decode(format!(
                                "reading ffmpeg output failed: {e}"
                            ))));
                            return;
                        }
                    }
                }
            });
        if let Err(e) = spawned {
            reap(&mut child);
            return Err(MatteError::decode(format!("failed to spawn decode thread: {e}")));
        }

        Ok(Self {
            info,
            child,
            rx,
            playing: false,
            started_at: None,
            current: None,
            presented: 0,
            ready: ReadyState::Metadata,
            eos: false,
            ended: false,
        })
    }

    /// Probed stream metadata.
    pub fn info(&self) -> &VideoInfo {
        &self.info
    }

    fn pull(&mut self, target: u64) {
        use std::sync::mpsc::TryRecvError;

        while !self.eos && self.presented <= target {
            match self.rx.try_recv() {
                Ok(Ok(frame)) => {
                    self.current = Some(frame);
                    self.presented += 1;
                }
                Ok(Err(e)) => {
                    tracing::warn!(error = %e, "video decode failed; treating as end of stream");
                    self.eos = true;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => self.eos = true,
            }
        }
    }
}

#[cfg(not(feature = "media-ffmpeg"))]
impl FfmpegSource {
    /// Probe `path` and start decoding it.
    pub fn open(path: &Path) -> MatteResult<Self> {
        let info = probe_video(path)?;
        Ok(Self { info })
    }

    /// Probed stream metadata.
    pub fn info(&self) -> &VideoInfo {
        &self.info
    }
}

#[cfg(feature = "media-ffmpeg")]
impl FrameSource for FfmpegSource {
    fn play(&mut self) -> MatteResult<()> {
        self.playing = true;
        Ok(())
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn advance(&mut self, now: Duration) -> MediaStatus {
        if self.ended {
            return MediaStatus::Ended;
        }
        if !self.playing {
            return MediaStatus::Playing;
        }

        let start = *self.started_at.get_or_insert(now);
        let target = self.info.fps.frame_at(now.saturating_sub(start)).0;
        self.pull(target);

        if self.eos && self.presented <= target {
            self.ended = true;
            return MediaStatus::Ended;
        }
        self.ready = if self.current.is_none() {
            ReadyState::Metadata
        } else if self.presented > target {
            ReadyState::EnoughData
        } else {
            ReadyState::CurrentData
        };
        MediaStatus::Playing
    }

    fn ready_state(&self) -> ReadyState {
        self.ready
    }

    fn current_frame(&self) -> Option<&VideoFrame> {
        self.current.as_ref()
    }

    fn fps(&self) -> Fps {
        self.info.fps
    }
}

#[cfg(not(feature = "media-ffmpeg"))]
impl FrameSource for FfmpegSource {
    fn play(&mut self) -> MatteResult<()> {
        Err(MatteError::evaluation(
            "video sources require the 'media-ffmpeg' feature",
        ))
    }

    fn is_playing(&self) -> bool {
        false
    }

    fn advance(&mut self, _now: Duration) -> MediaStatus {
        MediaStatus::Playing
    }

    fn ready_state(&self) -> ReadyState {
        ReadyState::Nothing
    }

    fn current_frame(&self) -> Option<&VideoFrame> {
        None
    }

    fn fps(&self) -> Fps {
        self.info.fps
    }
}

#[cfg(feature = "media-ffmpeg")]
impl Drop for FfmpegSource {
    fn drop(&mut self) {
        reap(&mut self.child);
    }
}

/// Kill a decoder child and collect its exit status so it does not outlive its source.
#[cfg(feature = "media-ffmpeg")]
pub(crate) fn reap(child: &mut std::process::Child) {
    let _ = child.kill();
    let _ = child.wait();
}

#[cfg(test)]
#[path = "../../tests/unit/media/ffmpeg.rs"]
mod tests;
