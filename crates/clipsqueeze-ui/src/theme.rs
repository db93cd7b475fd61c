// crates/clipsqueeze-ui/src/theme.rs
//
// Dark palette with a teal accent. Pinned to dark mode in ClipSqueezeApp::new.

use egui::{Context, Color32, Stroke, Visuals, Style};

use clipsqueeze_core::state::PresentationState;

// ── Palette ──────────────────────────────────────────────────────────────────
pub const ACCENT:        Color32 = Color32::from_rgb( 64, 196, 180);
pub const ACCENT_DIM:    Color32 = Color32::from_rgb( 30, 120, 110);
pub const ACCENT_HOVER:  Color32 = Color32::from_rgb(110, 222, 208);

pub const DARK_BG_0:     Color32 = Color32::from_rgb( 14,  14,  16);
pub const DARK_BG_1:     Color32 = Color32::from_rgb( 20,  20,  24);
pub const DARK_BG_2:     Color32 = Color32::from_rgb( 28,  28,  34);
pub const DARK_BG_3:     Color32 = Color32::from_rgb( 38,  38,  46);
pub const DARK_BG_4:     Color32 = Color32::from_rgb( 50,  50,  60);

pub const DARK_TEXT:     Color32 = Color32::from_rgb(220, 220, 230);
pub const DARK_TEXT_DIM: Color32 = Color32::from_rgb(120, 120, 138);
pub const DARK_BORDER:   Color32 = Color32::from_rgb( 55,  55,  68);

pub const OK_TEXT:       Color32 = Color32::from_rgb(150, 220, 160);
pub const WARN_TEXT:     Color32 = Color32::from_rgb(240, 180,  90);
pub const ERROR_TEXT:    Color32 = Color32::from_rgb(235, 105,  95);

pub fn configure_style(ctx: &Context) {
    let mut style = Style::default();

    style.spacing.item_spacing     = egui::vec2(6.0, 5.0);
    style.spacing.window_margin    = egui::Margin::same(10);
    style.spacing.button_padding   = egui::vec2(14.0, 7.0);
    style.spacing.scroll.bar_width = 8.0;
    style.spacing.indent           = 12.0;

    let cr = egui::CornerRadius::same(6);

    let mut v = Visuals::dark();
    v.panel_fill             = DARK_BG_1;
    v.window_fill            = DARK_BG_2;
    v.faint_bg_color         = DARK_BG_0;
    v.extreme_bg_color       = DARK_BG_0;
    v.window_stroke          = Stroke::new(1.0, DARK_BORDER);

    v.selection.bg_fill      = ACCENT;
    v.selection.stroke       = Stroke::new(1.0, DARK_BG_0);
    v.hyperlink_color        = ACCENT_HOVER;

    v.widgets.noninteractive.bg_fill       = DARK_BG_2;
    v.widgets.noninteractive.bg_stroke     = Stroke::new(1.0, DARK_BORDER);
    v.widgets.noninteractive.fg_stroke     = Stroke::new(1.0, DARK_TEXT_DIM);
    v.widgets.noninteractive.corner_radius = cr;

    v.widgets.inactive.bg_fill             = DARK_BG_3;
    v.widgets.inactive.bg_stroke           = Stroke::new(1.0, DARK_BORDER);
    v.widgets.inactive.fg_stroke           = Stroke::new(1.0, DARK_TEXT);
    v.widgets.inactive.corner_radius       = cr;

    v.widgets.hovered.bg_fill              = DARK_BG_4;
    v.widgets.hovered.bg_stroke            = Stroke::new(1.0, ACCENT_DIM);
    v.widgets.hovered.fg_stroke            = Stroke::new(1.5, ACCENT_HOVER);
    v.widgets.hovered.corner_radius        = cr;

    v.widgets.active.bg_fill               = ACCENT_DIM;
    v.widgets.active.bg_stroke             = Stroke::new(1.0, ACCENT);
    v.widgets.active.fg_stroke             = Stroke::new(2.0, Color32::WHITE);
    v.widgets.active.corner_radius         = cr;

    v.widgets.open.bg_fill                 = DARK_BG_4;
    v.widgets.open.bg_stroke               = Stroke::new(1.0, ACCENT_DIM);
    v.widgets.open.fg_stroke               = Stroke::new(1.5, ACCENT_HOVER);
    v.widgets.open.corner_radius           = cr;

    v.override_text_color = Some(DARK_TEXT);

    ctx.set_visuals(v);
    ctx.set_style(style);

    ctx.style_mut(|s| {
        s.visuals.window_corner_radius = cr;
        s.visuals.menu_corner_radius   = cr;
    });
}

/// Label colour for the message under the buttons.
pub fn message_color(state: &PresentationState) -> Color32 {
    match state {
        PresentationState::Complete(_)  => OK_TEXT,
        PresentationState::Cancelled(_) => WARN_TEXT,
        PresentationState::Failure(_)   => ERROR_TEXT,
        PresentationState::Initialized
        | PresentationState::Loading    => DARK_TEXT_DIM,
    }
}
