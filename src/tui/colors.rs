// Palette shared by every screen
use ratatui::style::Color;

pub const BG_DARK: Color = Color::Rgb(24, 24, 32);
pub const BORDER_COLOR: Color = Color::Rgb(88, 91, 112);
pub const TEXT_PRIMARY: Color = Color::Rgb(205, 214, 244);
pub const TEXT_SECONDARY: Color = Color::Rgb(147, 153, 178);

/// Yeet, delete, errors
pub const ACCENT_PRIMARY: Color = Color::Rgb(243, 139, 168);
/// Keep
pub const ACCENT_SECONDARY: Color = Color::Rgb(166, 227, 161);
pub const ACCENT_HIGHLIGHT: Color = Color::Rgb(137, 180, 250);

/// Mixes two RGB colors; `t = 0` is `from`, `t = 1` is `to`.
///
/// Non-RGB colors cannot be mixed and snap at the halfway point.
pub fn blend(from: Color, to: Color, t: f32) -> Color {
    let t = t.clamp(0.0, 1.0);
    match (from, to) {
        (Color::Rgb(r1, g1, b1), Color::Rgb(r2, g2, b2)) => {
            let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
            Color::Rgb(mix(r1, r2), mix(g1, g2), mix(b1, b2))
        }
        _ if t < 0.5 => from,
        _ => to,
    }
}
