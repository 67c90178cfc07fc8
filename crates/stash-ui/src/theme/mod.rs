//! Theme system for Stash.
//!
//! Provides a two-layer theming system:
//! - `ThemeSettings`: preferences from the `[appearance]` config section
//! - `Theme`: Computed colors derived from settings + system appearance

use gpui::{hsla, px, rgb, App, Global, Hsla, Pixels, SharedString};

use stash_core::{AppearanceConfig, Rgb, ThemeMode};

// =============================================================================
// Theme Settings (User-Configurable)
// =============================================================================

/// User-configurable theme settings.
#[derive(Debug, Clone)]
pub struct ThemeSettings {
    /// Light, dark, or follow system.
    pub appearance: Appearance,
    /// Accent hue (0.0-1.0). Default is blue (210/360).
    pub accent_hue: f32,
    /// Main font family.
    pub font_family: SharedString,
    /// Base font size.
    pub font_size: Pixels,
}

impl Default for ThemeSettings {
    fn default() -> Self {
        Self {
            appearance: Appearance::System,
            accent_hue: 210.0 / 360.0,
            font_family: "Inter".into(),
            font_size: px(14.0),
        }
    }
}

impl ThemeSettings {
    /// Settings from the `[appearance]` config section.
    pub fn from_config(config: &AppearanceConfig) -> Self {
        Self {
            appearance: config.theme.into(),
            accent_hue: config.accent_hue / 360.0,
            ..Default::default()
        }
    }
}

impl Global for ThemeSettings {}

/// Appearance mode preference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Appearance {
    Light,
    Dark,
    #[default]
    System,
}

impl From<ThemeMode> for Appearance {
    fn from(mode: ThemeMode) -> Self {
        match mode {
            ThemeMode::Light => Appearance::Light,
            ThemeMode::Dark => Appearance::Dark,
            ThemeMode::System => Appearance::System,
        }
    }
}

// =============================================================================
// Theme (Computed)
// =============================================================================

/// The active theme with computed colors.
///
/// Access via `cx.theme()` in render methods.
#[derive(Debug, Clone)]
pub struct Theme {
    pub is_dark: bool,

    // -------------------------------------------------------------------------
    // Background Colors
    // -------------------------------------------------------------------------
    /// Main window background.
    pub background: Hsla,
    /// Search bar and folder tiles.
    pub surface: Hsla,
    /// Row or tile under the pointer.
    pub surface_hover: Hsla,
    /// Section header strip.
    pub header_background: Hsla,

    // -------------------------------------------------------------------------
    // Text Colors
    // -------------------------------------------------------------------------
    pub text: Hsla,
    pub text_muted: Hsla,
    pub text_placeholder: Hsla,

    // -------------------------------------------------------------------------
    // Interactive Colors
    // -------------------------------------------------------------------------
    /// Accent color for buttons and the logo mark.
    pub accent: Hsla,
    /// Background of the hover action buttons.
    pub action_background: Hsla,

    // -------------------------------------------------------------------------
    // Semantic Colors
    // -------------------------------------------------------------------------
    pub success: Hsla,
    pub error: Hsla,

    // -------------------------------------------------------------------------
    // Border Colors
    // -------------------------------------------------------------------------
    pub border: Hsla,
    pub border_focused: Hsla,

    // -------------------------------------------------------------------------
    // Typography
    // -------------------------------------------------------------------------
    pub font_family: SharedString,
    pub font_size: Pixels,
    /// Small font size (type labels, counts).
    pub font_size_small: Pixels,
    /// Large font size (folder names).
    pub font_size_large: Pixels,

    // -------------------------------------------------------------------------
    // Spacing
    // -------------------------------------------------------------------------
    pub spacing: Pixels,
    pub radius: Pixels,
    /// Avatar diameter in item rows.
    pub avatar_size: Pixels,
    /// Height of item rows.
    pub item_height: Pixels,
    /// Height of section header rows.
    pub group_header_height: Pixels,
}

impl Theme {
    /// Create a theme from settings and system appearance.
    pub fn from_settings(settings: &ThemeSettings, system_is_dark: bool) -> Self {
        let is_dark = match settings.appearance {
            Appearance::Dark => true,
            Appearance::Light => false,
            Appearance::System => system_is_dark,
        };

        let palette = if is_dark {
            Palette::dark(settings.accent_hue)
        } else {
            Palette::light(settings.accent_hue)
        };

        let base_size: f32 = settings.font_size.into();

        Self {
            is_dark,

            background: palette.bg_base,
            surface: palette.bg_elevated,
            surface_hover: palette.bg_hover,
            header_background: palette.bg_header,

            text: palette.fg_primary,
            text_muted: palette.fg_secondary,
            text_placeholder: palette.fg_tertiary,

            accent: palette.accent,
            action_background: palette.accent.with_alpha(if is_dark { 0.3 } else { 0.2 }),

            success: palette.success,
            error: palette.error,

            border: palette.border,
            border_focused: palette.accent,

            font_family: settings.font_family.clone(),
            font_size: settings.font_size,
            font_size_small: px(base_size - 2.0),
            font_size_large: px(base_size + 2.0),

            spacing: px(8.0),
            radius: px(8.0),
            avatar_size: px(32.0),
            item_height: px(48.0),
            group_header_height: px(28.0),
        }
    }

    pub fn dark() -> Self {
        Self::from_settings(&ThemeSettings::default(), true)
    }

    pub fn light() -> Self {
        Self::from_settings(&ThemeSettings::default(), false)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Global for Theme {}

/// Convert an avatar color to a GPUI color.
pub fn avatar_color(color: Rgb) -> Hsla {
    rgb(color.0).into()
}

// =============================================================================
// Palette (Internal)
// =============================================================================

struct Palette {
    bg_base: Hsla,
    bg_elevated: Hsla,
    bg_hover: Hsla,
    bg_header: Hsla,
    fg_primary: Hsla,
    fg_secondary: Hsla,
    fg_tertiary: Hsla,
    accent: Hsla,
    border: Hsla,
    success: Hsla,
    error: Hsla,
}

impl Palette {
    fn dark(accent_hue: f32) -> Self {
        Self {
            bg_base: hsla(0.0, 0.0, 0.10, 1.0),
            bg_elevated: hsla(0.0, 0.0, 1.0, 0.08),
            bg_hover: hsla(0.0, 0.0, 1.0, 0.12),
            bg_header: hsla(0.0, 0.0, 1.0, 0.04),
            fg_primary: hsla(0.0, 0.0, 0.95, 0.90),
            fg_secondary: hsla(0.0, 0.0, 0.60, 0.90),
            fg_tertiary: hsla(0.0, 0.0, 0.40, 0.90),
            accent: hsla(accent_hue, 0.80, 0.60, 1.0),
            border: hsla(0.0, 0.0, 1.0, 0.15),
            success: hsla(140.0 / 360.0, 0.70, 0.50, 1.0),
            error: hsla(0.0, 0.80, 0.50, 1.0),
        }
    }

    fn light(accent_hue: f32) -> Self {
        Self {
            bg_base: hsla(0.0, 0.0, 0.98, 1.0),
            bg_elevated: hsla(0.0, 0.0, 0.0, 0.05),
            bg_hover: hsla(0.0, 0.0, 0.0, 0.08),
            bg_header: hsla(0.0, 0.0, 0.0, 0.03),
            fg_primary: hsla(0.0, 0.0, 0.10, 1.0),
            fg_secondary: hsla(0.0, 0.0, 0.45, 1.0),
            fg_tertiary: hsla(0.0, 0.0, 0.60, 1.0),
            accent: hsla(accent_hue, 0.80, 0.50, 1.0),
            border: hsla(0.0, 0.0, 0.0, 0.15),
            success: hsla(140.0 / 360.0, 0.70, 0.40, 1.0),
            error: hsla(0.0, 0.80, 0.45, 1.0),
        }
    }
}

// =============================================================================
// Hsla Extension
// =============================================================================

trait HslaExt {
    fn with_alpha(self, a: f32) -> Hsla;
}

impl HslaExt for Hsla {
    fn with_alpha(self, a: f32) -> Hsla {
        Hsla { a, ..self }
    }
}

// =============================================================================
// Theme Extensions
// =============================================================================

/// Extension trait for convenient theme access.
pub trait ThemeExt {
    fn theme(&self) -> &Theme;
}

impl ThemeExt for App {
    fn theme(&self) -> &Theme {
        self.global::<Theme>()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_from_config() {
        let config = AppearanceConfig {
            theme: ThemeMode::Light,
            accent_hue: 0.0,
        };
        let settings = ThemeSettings::from_config(&config);
        assert_eq!(settings.appearance, Appearance::Light);
        assert!(settings.accent_hue.abs() < 0.001);

        let theme = Theme::from_settings(&settings, true);
        assert!(!theme.is_dark);
        assert!(theme.accent.h.abs() < 0.001);
        assert!(theme.border_focused.h.abs() < 0.001);
    }

    #[test]
    fn test_default_config_follows_system() {
        let settings = ThemeSettings::from_config(&AppearanceConfig::default());
        assert!((settings.accent_hue - 210.0 / 360.0).abs() < 0.001);
        assert!(Theme::from_settings(&settings, true).is_dark);
        assert!(!Theme::from_settings(&settings, false).is_dark);
    }

    #[test]
    fn test_font_size_derivation() {
        let settings = ThemeSettings {
            font_size: px(16.0),
            ..Default::default()
        };

        let theme = Theme::from_settings(&settings, true);
        let small: f32 = theme.font_size_small.into();
        let large: f32 = theme.font_size_large.into();
        assert!((small - 14.0).abs() < 0.001);
        assert!((large - 18.0).abs() < 0.001);
    }

    #[test]
    fn test_action_background_alpha_differs_by_mode() {
        let dark = Theme::dark();
        let light = Theme::light();
        assert!(dark.action_background.a > light.action_background.a);
    }

    #[test]
    fn test_avatar_color_is_opaque() {
        let color = avatar_color(Rgb(0x3f51b5));
        assert!((color.a - 1.0).abs() < 0.001);
    }
}
