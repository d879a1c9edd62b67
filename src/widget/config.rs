use crate::foundation::{
    core::{DEFAULT_DELAY_MS, FrameDelay},
    error::{GifViewError, GifViewResult},
};

/// Attribute holding the source descriptor string.
pub const ATTR_SRC: &str = "gif_src";
/// Attribute for [`WidgetConfig::starting_on_init`].
pub const ATTR_STARTING_ON_INIT: &str = "starting_on_init";
/// Attribute for [`WidgetConfig::delay_in_millis`].
pub const ATTR_DELAY_IN_MILLIS: &str = "delay_in_millis";
/// Attribute for [`WidgetConfig::on_click_start_or_pause`].
pub const ATTR_ON_CLICK_START_OR_PAUSE: &str = "on_click_start_or_pause";

/// Declarative view configuration, as found in markup attributes or JSON.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WidgetConfig {
    /// Source descriptor string (`url:…` / `asset:…`), loaded once the view is configured.
    #[serde(rename = "gif_src", skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    /// Start playback as soon as a load finishes.
    pub starting_on_init: bool,
    /// Delay between ticks, must be positive.
    pub delay_in_millis: i64,
    /// Clicking toggles between playing and stopped.
    pub on_click_start_or_pause: bool,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            src: None,
            starting_on_init: true,
            delay_in_millis: i64::from(DEFAULT_DELAY_MS),
            on_click_start_or_pause: false,
        }
    }
}

impl WidgetConfig {
    pub fn validate(&self) -> GifViewResult<()> {
        FrameDelay::from_millis(self.delay_in_millis)?;
        Ok(())
    }

    pub fn from_json_str(s: &str) -> GifViewResult<Self> {
        let cfg: Self = serde_json::from_str(s)
            .map_err(|e| GifViewError::configuration(format!("parse widget config: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Build from `(name, value)` attribute pairs. Unknown names are ignored.
    pub fn from_attributes<'a, I>(attrs: I) -> GifViewResult<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut cfg = Self::default();
        for (name, value) in attrs {
            match name {
                ATTR_SRC => cfg.src = Some(value.to_string()),
                ATTR_STARTING_ON_INIT => cfg.starting_on_init = parse_bool(name, value)?,
                ATTR_DELAY_IN_MILLIS => {
                    cfg.delay_in_millis = value.trim().parse().map_err(|_| {
                        GifViewError::configuration(format!(
                            "attribute '{name}' must be an integer: {value}"
                        ))
                    })?
                }
                ATTR_ON_CLICK_START_OR_PAUSE => {
                    cfg.on_click_start_or_pause = parse_bool(name, value)?
                }
                _ => tracing::trace!(name, "ignoring unknown attribute"),
            }
        }
        cfg.validate()?;
        Ok(cfg)
    }
}

fn parse_bool(name: &str, value: &str) -> GifViewResult<bool> {
    match value.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(GifViewError::configuration(format!(
            "attribute '{name}' must be true or false: {value}"
        ))),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/widget/config.rs"]
mod tests;
