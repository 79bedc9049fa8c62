//! chroma-matte removes a near-pure-green key color from video in real time and composites the
//! result with alpha onto an output surface.
//!
//! Every pixel goes through two passes that are combined with `min`:
//!
//! - a distance key: Euclidean RGB distance to the key color through a smooth transition band,
//!   which absorbs chroma-subsampling fringes at edges;
//! - a spill suppressor: pixels whose green exceeds `max(red, blue)` by enough are removed.
//!
//! Color channels are never modified; only alpha is attenuated.
//!
//! The same [`KeyParams`] drive three implementations that produce equivalent output:
//!
//! - [`CpuCompositor`], a reference rasterizer;
//! - `GpuCompositor` (feature `gpu`), a wgpu pipeline;
//! - [`EmbeddedDocument`], a WebGL page for web-view hosts.
//!
//! A [`PlaybackSession`] ties a [`FrameSource`] to a [`Compositor`] and is driven one display
//! refresh at a time; it skips frames until the source is ready and fires its completion callback
//! exactly once.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

pub(crate) mod encode;
pub(crate) mod config;
pub(crate) mod host;
pub(crate) mod key;
pub(crate) mod media;
pub(crate) mod render;
pub(crate) mod session;
/// Shader sources and quad geometry shared by the GPU hosts.
pub mod shader;

pub use crate::foundation::core::{Fps, FrameIndex, PixelSize, SurfaceSize};
pub use crate::foundation::error::{MatteError, MatteResult};
pub use crate::foundation::math::smoothstep;

pub use crate::config::{DEFAULT_RESIZE_RETRY_MS, MatteConfig};
pub use crate::encode::sink::{FrameSink, InMemorySink, PngSequenceSink, SinkConfig, write_png};
pub use crate::host::embedded::{ENDED_MESSAGE, EmbeddedDocument, EmbeddedHost, EmbeddedOptions};
pub use crate::host::native::{DEFAULT_SEQUENCE_FPS, mount_native, mount_uri};
pub use crate::key::matte::{
    Rgba8, key_alpha, key_distance, key_pixel, key_rgba8_in_place, primary_alpha, spill_amount,
    spill_multiplier,
};
pub use crate::key::params::{
    DEFAULT_KEY_COLOR, DEFAULT_SMOOTHING, DEFAULT_SPILL_HIGH, DEFAULT_SPILL_LOW,
    DEFAULT_THRESHOLD, KeyParams, parse_hex_rgb,
};
pub use crate::media::ffmpeg::{DECODE_QUEUE_DEPTH, FfmpegSource, VideoInfo, probe_video};
pub use crate::media::frame::VideoFrame;
pub use crate::media::open_source;
pub use crate::media::sequence::{decode_image, list_frames, load_image, load_sequence};
pub use crate::media::source::{FrameSource, MediaStatus, MemorySource, ReadyState};
pub use crate::media::uri::{MediaUri, UriKind};
pub use crate::render::cpu::CpuCompositor;
#[cfg(feature = "gpu")]
pub use crate::render::gpu::GpuCompositor;
pub use crate::render::{BackendKind, Compositor, FrameRGBA, create_compositor};
pub use crate::session::clock::{FrameClock, IntervalClock, ManualClock};
pub use crate::session::playback::{
    DEFAULT_PLAY_RETRY_INTERVAL, EndedCallback, PlaybackSession, SessionHandle, TickOutcome,
};
pub use crate::session::{RunSummary, render_to_sink, run_until_ended};
