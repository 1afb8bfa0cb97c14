//! Look-and-feel options passed to the embedded page as URL query parameters

use serde::{Deserialize, Serialize};

pub const DEFAULT_STYLE: &str = "dark";
const LIGHT_STYLE: &str = "light";
const WHITE: &str = "FFFFFF";
const BLACK: &str = "000000";

/// Presentation options for an experience.
///
/// Colors are six-digit hex strings without `#`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewStyle {
    pub style: Option<String>,
    pub theme_name: Option<String>,
    pub loading_stickman_color: Option<String>,
    pub loading_background_color: Option<String>,
    pub loading_text_color: Option<String>,
}

impl Default for ViewStyle {
    fn default() -> Self {
        Self {
            style: Some(DEFAULT_STYLE.to_string()),
            theme_name: None,
            loading_stickman_color: None,
            loading_background_color: None,
            loading_text_color: None,
        }
    }
}

impl ViewStyle {
    pub fn light() -> Self {
        Self::default().style(LIGHT_STYLE)
    }

    pub fn style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }

    pub fn theme_name(mut self, name: impl Into<String>) -> Self {
        self.theme_name = Some(name.into());
        self
    }

    pub fn loading_stickman_color(mut self, hex: impl Into<String>) -> Self {
        self.loading_stickman_color = Some(hex.into());
        self
    }

    pub fn loading_background_color(mut self, hex: impl Into<String>) -> Self {
        self.loading_background_color = Some(hex.into());
        self
    }

    pub fn loading_text_color(mut self, hex: impl Into<String>) -> Self {
        self.loading_text_color = Some(hex.into());
        self
    }

    fn is_light(&self) -> bool {
        self.style.as_deref() == Some(LIGHT_STYLE)
    }

    /// Loading screen background: explicit value, else white for `light` and black otherwise.
    pub fn effective_background_color(&self) -> &str {
        match &self.loading_background_color {
            Some(color) => color,
            None if self.is_light() => WHITE,
            None => BLACK,
        }
    }

    /// Loading text color: explicit value, else the inverse of the default background.
    pub fn effective_text_color(&self) -> &str {
        match &self.loading_text_color {
            Some(color) => color,
            None if self.is_light() => BLACK,
            None => WHITE,
        }
    }

    /// Query parameters in the order the page expects them.
    ///
    /// The two loading colors are always present.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(5);
        if let Some(style) = &self.style {
            pairs.push(("style", style.clone()));
        }
        if let Some(theme) = &self.theme_name {
            pairs.push(("themeName", theme.clone()));
        }
        if let Some(color) = &self.loading_stickman_color {
            pairs.push(("loadingStickmanColor", color.clone()));
        }
        pairs.push((
            "loadingBackgroundColor",
            self.effective_background_color().to_string(),
        ));
        pairs.push(("loadingTextColor", self.effective_text_color().to_string()));
        pairs
    }

    /// Appends the style parameters to `url`, keeping any query it already has.
    pub fn apply_to(&self, url: &str) -> String {
        let query = self
            .query_pairs()
            .iter()
            .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&");
        let separator = if url.contains('?') { '&' } else { '?' };
        format!("{}{}{}", url, separator, query)
    }
}

/// Parses a six-digit hex color into RGB. Invalid input yields black.
pub fn parse_hex_color(hex: &str) -> (u8, u8, u8) {
    let value = u32::from_str_radix(hex.trim_start_matches('#'), 16).unwrap_or(0);
    (
        ((value >> 16) & 0xFF) as u8,
        ((value >> 8) & 0xFF) as u8,
        (value & 0xFF) as u8,
    )
}
