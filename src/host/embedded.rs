use crate::config::{DEFAULT_RESIZE_RETRY_MS, MatteConfig};
use crate::foundation::error::{MatteError, MatteResult};
use crate::key::params::KeyParams;
use crate::media::uri::MediaUri;
use crate::session::playback::{DEFAULT_PLAY_RETRY_INTERVAL, EndedCallback};
use crate::shader;

/// Message the embedded document posts to its host when playback ends.
pub const ENDED_MESSAGE: &str = "VIDEO_ENDED";

/// Tuning for the generated document.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EmbeddedOptions {
    /// Delay of the second canvas sizing attempt, in milliseconds.
    pub resize_retry_ms: u32,
    /// Animation frames between refused `play()` attempts.
    pub play_retry_interval: u32,
}

impl Default for EmbeddedOptions {
    fn default() -> Self {
        Self {
            resize_retry_ms: DEFAULT_RESIZE_RETRY_MS,
            play_retry_interval: DEFAULT_PLAY_RETRY_INTERVAL,
        }
    }
}

impl From<&MatteConfig> for EmbeddedOptions {
    fn from(cfg: &MatteConfig) -> Self {
        Self {
            resize_retry_ms: cfg.resize_retry_ms,
            play_retry_interval: cfg.play_retry_interval.max(1),
        }
    }
}

/// A self-contained web document running the keying compositor on a WebGL canvas.
///
/// Load `html` in a web view whose base URL is `base_url`, so the document and the media share an
/// origin.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmbeddedDocument {
    /// Complete HTML markup.
    pub html: String,
    /// Base reference derived from the media URI, if one exists.
    pub base_url: Option<String>,
}

impl EmbeddedDocument {
    /// Build the document for `uri` with default options.
    pub fn build(uri: &MediaUri, params: &KeyParams) -> MatteResult<Self> {
        Self::build_with(uri, params, EmbeddedOptions::default())
    }

    /// Build the document for `uri`.
    #[tracing::instrument(skip_all, fields(uri = %uri))]
    pub fn build_with(
        uri: &MediaUri,
        params: &KeyParams,
        options: EmbeddedOptions,
    ) -> MatteResult<Self> {
        params.validate()?;
        let base_url = uri.base_reference();
        if base_url.is_none() {
            tracing::warn!("media uri has no derivable base; the web view may block the request");
        }

        let vertex = script_string(&shader::glsl_vertex_source())?;
        let fragment = script_string(&shader::glsl_fragment_source(params))?;
        let quad = script_number_array(&shader::QUAD_VERTICES)?;

        let html = format!(
            r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <style>
    * {{ margin: 0; padding: 0; box-sizing: border-box; }}
    html, body {{ width: 100%; height: 100%; background: transparent; overflow: hidden; }}
    canvas {{ display: block; width: 100%; height: 100%; }}
  </style>
</head>
<body>
  <canvas id="c"></canvas>
  <video id="v" src="{src}" autoplay muted playsinline style="display:none;"></video>
  <script>
  (function () {{
    var video = document.getElementById('v');
    var canvas = document.getElementById('c');
    var gl = canvas.getContext('webgl');
    if (!gl) {{ return; }}

    function compile(type, src) {{
      var s = gl.createShader(type);
      gl.shaderSource(s, src);
      gl.compileShader(s);
      return s;
    }}
    var prog = gl.createProgram();
    gl.attachShader(prog, compile(gl.VERTEX_SHADER, {vertex}));
    gl.attachShader(prog, compile(gl.FRAGMENT_SHADER, {fragment}));
    gl.linkProgram(prog);
    if (!gl.getProgramParameter(prog, gl.LINK_STATUS)) {{ return; }}
    gl.useProgram(prog);

    var buf = gl.createBuffer();
    gl.bindBuffer(gl.ARRAY_BUFFER, buf);
    gl.bufferData(gl.ARRAY_BUFFER, new Float32Array({quad}), gl.STATIC_DRAW);
    var aPos = gl.getAttribLocation(prog, '{attr_pos}');
    var aUv = gl.getAttribLocation(prog, '{attr_uv}');
    gl.enableVertexAttribArray(aPos);
    gl.enableVertexAttribArray(aUv);
    gl.vertexAttribPointer(aPos, 2, gl.FLOAT, false, {stride}, {pos_offset});
    gl.vertexAttribPointer(aUv, 2, gl.FLOAT, false, {stride}, {uv_offset});

    var tex = gl.createTexture();
    gl.bindTexture(gl.TEXTURE_2D, tex);
    gl.texParameteri(gl.TEXTURE_2D, gl.TEXTURE_WRAP_S, gl.CLAMP_TO_EDGE);
    gl.texParameteri(gl.TEXTURE_2D, gl.TEXTURE_WRAP_T, gl.CLAMP_TO_EDGE);
    gl.texParameteri(gl.TEXTURE_2D, gl.TEXTURE_MIN_FILTER, gl.LINEAR);
    gl.texParameteri(gl.TEXTURE_2D, gl.TEXTURE_MAG_FILTER, gl.LINEAR);
    gl.enable(gl.BLEND);
    {blend}

    function initSize() {{
      var dpr = window.devicePixelRatio || 1;
      canvas.width = Math.max(1, Math.floor(canvas.clientWidth * dpr));
      canvas.height = Math.max(1, Math.floor(canvas.clientHeight * dpr));
      gl.viewport(0, 0, canvas.width, canvas.height);
    }}
    window.addEventListener('load', initSize);
    setTimeout(initSize, {resize_retry_ms});

    function notify(msg) {{
      if (window.ReactNativeWebView) {{
        window.ReactNativeWebView.postMessage(msg);
      }} else if (window.parent && window.parent !== window) {{
        window.parent.postMessage(msg, '*');
      }}
    }}

    var live = true;
    var rafId = 0;
    var sincePlay = 0;
    function tryPlay() {{
      var p = video.play();
      if (p && p.catch) {{ p.catch(function () {{}}); }}
    }}

    function render() {{
      if (!live) {{ return; }}
      if (video.paused && !video.ended && ++sincePlay >= {play_retry_interval}) {{
        sincePlay = 0;
        tryPlay();
      }}
      if (video.readyState >= 2) {{
        gl.clearColor(0, 0, 0, 0);
        gl.clear(gl.COLOR_BUFFER_BIT);
        gl.texImage2D(gl.TEXTURE_2D, 0, gl.RGBA, gl.RGBA, gl.UNSIGNED_BYTE, video);
        gl.drawArrays(gl.TRIANGLE_STRIP, 0, {vertex_count});
      }}
      rafId = requestAnimationFrame(render);
    }}

    video.addEventListener('ended', function () {{
      if (!live) {{ return; }}
      live = false;
      cancelAnimationFrame(rafId);
      notify('{ended}');
    }});

    rafId = requestAnimationFrame(render);
    tryPlay();
  }})();
  </script>
</body>
</html>
"#,
            src = escape_attr(uri.as_str()),
            vertex = vertex,
            fragment = fragment,
            quad = quad,
            attr_pos = shader::GLSL_ATTR_POS,
            attr_uv = shader::GLSL_ATTR_UV,
            stride = shader::QUAD_STRIDE_BYTES,
            pos_offset = shader::QUAD_POS_OFFSET_BYTES,
            uv_offset = shader::QUAD_UV_OFFSET_BYTES,
            vertex_count = shader::QUAD_VERTEX_COUNT,
            resize_retry_ms = options.resize_retry_ms,
            play_retry_interval = options.play_retry_interval.max(1),
            ended = ENDED_MESSAGE,
            blend = canvas_blend_call(),
        );

        Ok(Self { html, base_url })
    }
}

/// Receives messages posted by an [`EmbeddedDocument`] and fires the ended callback once.
pub struct EmbeddedHost {
    document: EmbeddedDocument,
    on_ended: Option<EndedCallback>,
    ended: bool,
}

impl EmbeddedHost {
    /// Build the document for `uri` and hold `on_ended` until the document reports completion.
    pub fn mount(
        uri: &MediaUri,
        config: &MatteConfig,
        on_ended: impl FnOnce() + 'static,
    ) -> MatteResult<Self> {
        let document = EmbeddedDocument::build_with(uri, &config.key, config.into())?;
        Ok(Self {
            document,
            on_ended: Some(Box::new(on_ended)),
            ended: false,
        })
    }

    /// The document to load into the web view.
    pub fn document(&self) -> &EmbeddedDocument {
        &self.document
    }

    /// Handle one message from the web view. Returns `true` when this call fired the callback.
    ///
    /// Only the exact completion message is recognized; anything else is ignored.
    pub fn handle_message(&mut self, data: &str) -> bool {
        if data != ENDED_MESSAGE {
            tracing::trace!(message = data, "ignoring web view message");
            return false;
        }
        self.ended = true;
        match self.on_ended.take() {
            Some(callback) => {
                tracing::info!("embedded playback ended");
                callback();
                true
            }
            None => false,
        }
    }

    /// Whether the completion message has been received.
    pub fn has_ended(&self) -> bool {
        self.ended
    }
}

/// WebGL blend factor names used by the canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum GlBlendFactor {
    One,
    SrcAlpha,
    OneMinusSrcAlpha,
}

impl GlBlendFactor {
    fn gl_name(self) -> &'static str {
        match self {
            Self::One => "gl.ONE",
            Self::SrcAlpha => "gl.SRC_ALPHA",
            Self::OneMinusSrcAlpha => "gl.ONE_MINUS_SRC_ALPHA",
        }
    }

    /// Weight this factor contributes for a fragment of alpha `src_alpha`.
    pub(crate) fn weight(self, src_alpha: f32) -> f32 {
        match self {
            Self::One => 1.0,
            Self::SrcAlpha => src_alpha,
            Self::OneMinusSrcAlpha => 1.0 - src_alpha,
        }
    }
}

/// `blendFuncSeparate(srcRGB, dstRGB, srcAlpha, dstAlpha)` for the canvas.
///
/// Matches `wgpu::BlendState::ALPHA_BLENDING`: color is source-over weighted by source alpha, alpha
/// is premultiplied source-over, so a cleared canvas stores `a` and not `a * a`.
pub(crate) const CANVAS_BLEND: [GlBlendFactor; 4] = [
    GlBlendFactor::SrcAlpha,
    GlBlendFactor::OneMinusSrcAlpha,
    GlBlendFactor::One,
    GlBlendFactor::OneMinusSrcAlpha,
];

fn canvas_blend_call() -> String {
    let [src_rgb, dst_rgb, src_a, dst_a] = CANVAS_BLEND.map(GlBlendFactor::gl_name);
    format!("gl.blendFuncSeparate({src_rgb}, {dst_rgb}, {src_a}, {dst_a});")
}

/// Escape text for a double-quoted HTML attribute.
pub(crate) fn escape_attr(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
    out
}

/// Encode `s` as a JavaScript string literal that is safe inside a `<script>` element.
fn script_string(s: &str) -> MatteResult<String> {
    let json = serde_json::to_string(s).map_err(|e| MatteError::serde(e.to_string()))?;
    Ok(json.replace("</", "<\\/"))
}

fn script_number_array(values: &[f32]) -> MatteResult<String> {
    serde_json::to_string(values).map_err(|e| MatteError::serde(e.to_string()))
}

#[cfg(test)]
#[path = "../../tests/unit/host/embedded.rs"]
mod tests;
