//! Station card rendering.
//!
//! One artifact per work unit: a small SVG card annotated with the
//! station name and its derived temperature string.

/// Content type for rendered station cards.
pub const CONTENT_TYPE: &str = "image/svg+xml";

const CARD_WIDTH: u32 = 600;
const CARD_HEIGHT: u32 = 400;

/// Render one station card.
pub fn station_card(name: &str, derived_value: &str) -> String {
    let name = escape_text(name);
    let value = escape_text(derived_value);

    format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{CARD_WIDTH}" height="{CARD_HEIGHT}" viewBox="0 0 {CARD_WIDTH} {CARD_HEIGHT}">
  <rect width="{CARD_WIDTH}" height="{CARD_HEIGHT}" fill="#1e3a5f"/>
  <text x="20" y="56" font-family="sans-serif" font-size="36" fill="#ffffff">{name}</text>
  <text x="20" y="110" font-family="sans-serif" font-size="28" fill="#cfe3ff">Temp: {value} &#176;C</text>
</svg>
"##
    )
}

fn escape_text(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn card_carries_name_and_value() {
        let svg = station_card("De Bilt", "12.3");
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("De Bilt"));
        assert!(svg.contains("Temp: 12.3"));
    }

    #[test]
    fn markup_characters_are_escaped() {
        let svg = station_card("A < B & C", "N/A");
        assert!(svg.contains("A &lt; B &amp; C"));
        assert!(!svg.contains("A < B"));
    }
}
