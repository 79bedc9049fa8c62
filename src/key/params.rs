use serde::{Deserialize, Serialize};

use crate::foundation::error::{MatteError, MatteResult};

/// Default key color `#00FF08` in normalized RGB.
pub const DEFAULT_KEY_COLOR: [f32; 3] = [0.0, 1.0, 0.031];
/// Default RGB distance at the center of the keying transition band.
pub const DEFAULT_THRESHOLD: f32 = 0.45;
/// Default half-width of the keying transition band.
pub const DEFAULT_SMOOTHING: f32 = 0.15;
/// Default green dominance where spill suppression starts.
pub const DEFAULT_SPILL_LOW: f32 = 0.30;
/// Default green dominance where spill suppression reaches full transparency.
pub const DEFAULT_SPILL_HIGH: f32 = 0.55;

/// Chroma-key parameters shared by every backend and by the generated shader sources.
///
/// Deserializes from JSON with every field optional. `key_color` accepts either an `[r, g, b]`
/// array in `[0, 1]` or a `#RRGGBB` hex string.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KeyParams {
    /// Key color in normalized RGB.
    #[serde(deserialize_with = "deserialize_key_color")]
    pub key_color: [f32; 3],
    /// RGB distance from the key color at the center of the transition band.
    pub threshold: f32,
    /// Half-width of the anti-aliased transition band around `threshold`.
    pub smoothing: f32,
    /// Lower bound of the spill band (`g - max(r, b)`).
    pub spill_low: f32,
    /// Upper bound of the spill band.
    pub spill_high: f32,
}

impl Default for KeyParams {
    fn default() -> Self {
        Self {
            key_color: DEFAULT_KEY_COLOR,
            threshold: DEFAULT_THRESHOLD,
            smoothing: DEFAULT_SMOOTHING,
            spill_low: DEFAULT_SPILL_LOW,
            spill_high: DEFAULT_SPILL_HIGH,
        }
    }
}

impl KeyParams {
    /// Lower edge of the primary key band (`threshold - smoothing`).
    pub fn key_low(&self) -> f32 {
        self.threshold - self.smoothing
    }

    /// Upper edge of the primary key band (`threshold + smoothing`).
    pub fn key_high(&self) -> f32 {
        self.threshold + self.smoothing
    }

    /// Check that the parameters describe well-formed, non-empty transition bands.
    pub fn validate(&self) -> MatteResult<()> {
        for (i, c) in self.key_color.iter().enumerate() {
            if !c.is_finite() || !(0.0..=1.0).contains(c) {
                return Err(MatteError::validation(format!(
                    "key_color[{i}] must be within [0, 1]"
                )));
            }
        }
        for (name, v) in [
            ("threshold", self.threshold),
            ("smoothing", self.smoothing),
            ("spill_low", self.spill_low),
            ("spill_high", self.spill_high),
        ] {
            if !v.is_finite() {
                return Err(MatteError::validation(format!("{name} must be finite")));
            }
        }
        if self.threshold < 0.0 {
            return Err(MatteError::validation("threshold must be >= 0"));
        }
        // GLSL leaves smoothstep undefined for edge0 >= edge1.
        if self.smoothing <= 0.0 {
            return Err(MatteError::validation("smoothing must be > 0"));
        }
        if self.spill_low >= self.spill_high {
            return Err(MatteError::validation("spill_low must be < spill_high"));
        }
        Ok(())
    }
}

/// Parse `#RRGGBB` (leading `#` optional) into normalized RGB.
pub fn parse_hex_rgb(s: &str) -> MatteResult<[f32; 3]> {
    let trimmed = s.trim();
    let hex = trimmed.strip_prefix('#').unwrap_or(trimmed);
    if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(MatteError::validation(format!(
            "key color '{s}' must be #RRGGBB"
        )));
    }
    let mut out = [0.0f32; 3];
    for (i, slot) in out.iter_mut().enumerate() {
        let byte = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16)
            .map_err(|e| MatteError::validation(format!("key color '{s}': {e}")))?;
        *slot = f32::from(byte) / 255.0;
    }
    Ok(out)
}

fn deserialize_key_color<'de, D>(deserializer: D) -> Result<[f32; 3], D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Hex(String),
        Arr([f32; 3]),
    }

    match Repr::deserialize(deserializer)? {
        Repr::Hex(s) => parse_hex_rgb(&s).map_err(serde::de::Error::custom),
        Repr::Arr(v) => Ok(v),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/key/params.rs"]
mod tests;
