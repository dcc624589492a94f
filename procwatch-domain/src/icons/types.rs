use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Where an icon's bytes came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IconSource {
    /// A user override from the custom icon mapping.
    Custom { icon_name: String },
    /// Returned by an icon provider.
    Provider,
    /// Generated placeholder.
    Fallback,
}

/// Encoded image bytes plus their provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Icon {
    pub data: Vec<u8>,
    /// File extension style hint: "png", "svg", "ico".
    pub format: String,
    pub source: IconSource,
}

/// Shared, read-only handle handed out by the cache.
pub type IconRef = Arc<Icon>;

const FALLBACK_COLORS: [&str; 8] = [
    "#3B82F6", "#10B981", "#F59E0B", "#EF4444", "#8B5CF6", "#EC4899", "#14B8A6", "#6366F1",
];

impl Icon {
    pub fn new(data: Vec<u8>, format: impl Into<String>, source: IconSource) -> Self {
        Self { data, format: format.into(), source }
    }

    /// A 32x32 SVG badge showing the first letter of `process_name` on a colour
    /// picked deterministically from the name.
    pub fn fallback(process_name: &str) -> Self {
        let letter = process_name
            .chars()
            .find(|c| c.is_alphanumeric())
            .map(|c| c.to_uppercase().to_string())
            .unwrap_or_else(|| "?".to_string());
        let hash = process_name
            .bytes()
            .fold(0u32, |acc, b| acc.wrapping_mul(31).wrapping_add(u32::from(b)));
        let color = FALLBACK_COLORS[(hash as usize) % FALLBACK_COLORS.len()];
        let svg = format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"32\" height=\"32\">\
<rect width=\"32\" height=\"32\" rx=\"6\" fill=\"{}\"/>\
<text x=\"16\" y=\"22\" font-size=\"18\" font-family=\"sans-serif\" text-anchor=\"middle\" fill=\"#FFFFFF\">{}</text></svg>",
            color, letter
        );
        Self::new(svg.into_bytes(), "svg", IconSource::Fallback)
    }

    pub fn is_fallback(&self) -> bool {
        self.source == IconSource::Fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_uses_first_alphanumeric_letter() {
        let icon = Icon::fallback("_firefox");
        let svg = String::from_utf8(icon.data.clone()).unwrap();
        assert!(svg.contains(">F</text>"));
        assert!(icon.is_fallback());
        assert_eq!(icon.format, "svg");
    }

    #[test]
    fn test_fallback_is_deterministic() {
        assert_eq!(Icon::fallback("bash"), Icon::fallback("bash"));
        assert!(String::from_utf8(Icon::fallback("").data).unwrap().contains(">?</text>"));
    }
}
