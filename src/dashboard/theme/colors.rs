//! Color Constants
//!
//! Night-blue palette shared by the auth view and both dashboards.

use eframe::egui::Color32;

/// Dark background for main areas - Night blue
pub const BG_DARK: Color32 = Color32::from_rgb(0x14, 0x1B, 0x2D);

/// Top bar background
pub const TOP_BAR_BG: Color32 = Color32::from_rgb(0x1C, 0x25, 0x3B);

/// Card background
pub const CARD_BG: Color32 = Color32::from_rgb(0x22, 0x2D, 0x46);

/// Card border
pub const CARD_BORDER: Color32 = Color32::from_rgb(0x33, 0x42, 0x63);

/// Map canvas background
pub const MAP_BG: Color32 = Color32::from_rgb(0x2B, 0x3A, 0x55);

/// Map grid lines
pub const MAP_GRID: Color32 = Color32::from_rgb(0x3A, 0x4B, 0x6B);

/// Map pin
pub const MAP_PIN: Color32 = Color32::from_rgb(0xF4, 0x5B, 0x69);

/// Text on dark backgrounds
pub const TEXT_LIGHT: Color32 = Color32::from_rgb(0xE8, 0xEE, 0xF7);

/// Secondary text color (muted)
pub const TEXT_SECONDARY: Color32 = Color32::from_rgb(0x9A, 0xA8, 0xC0);

/// Accent color for primary buttons
pub const ACCENT: Color32 = Color32::from_rgb(0x25, 0x63, 0xEB);

/// Selected item background
pub const SELECTED_ITEM: Color32 = Color32::from_rgb(0x2E, 0x3F, 0x63);

/// Success color - Green
pub const SUCCESS: Color32 = Color32::from_rgb(0x4C, 0xAF, 0x50);

/// Error color - Red
pub const ERROR: Color32 = Color32::from_rgb(0xE5, 0x73, 0x73);

/// Warning color - Orange
pub const WARNING: Color32 = Color32::from_rgb(0xFF, 0xA7, 0x26);
