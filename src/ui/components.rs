// Reusable UI components
// Message bubbles, markdown rendering and buttons

use crate::chat::message::{ChatMessage, MessageRole};
use eframe::egui;
use egui_commonmark::{CommonMarkCache, CommonMarkViewer};

/// Render message text as CommonMark (GFM tables, lists, emphasis, code blocks)
/// `id` keeps per-message widget state such as code block scroll apart
pub fn markdown_text(ui: &mut egui::Ui, cache: &mut CommonMarkCache, id: &str, text: &str) {
    CommonMarkViewer::new(("message_markdown", id)).show(ui, cache, text);
}

/// Render one transcript message as a bubble
/// User messages are right-aligned and tinted, replies span the width
pub fn message_bubble(ui: &mut egui::Ui, cache: &mut CommonMarkCache, message: &ChatMessage) {
    let (label, fill, layout) = match message.role {
        MessageRole::User => (
            "You",
            ui.visuals().selection.bg_fill.gamma_multiply(0.35),
            egui::Layout::right_to_left(egui::Align::TOP),
        ),
        MessageRole::Assistant => (
            "Gemini",
            ui.visuals().faint_bg_color,
            egui::Layout::left_to_right(egui::Align::TOP),
        ),
    };

    ui.with_layout(layout, |ui| {
        let max_width = (ui.available_width() * 0.85).max(200.0);
        egui::Frame::none()
            .fill(fill)
            .rounding(egui::Rounding::same(8.0))
            .inner_margin(egui::Margin::symmetric(12.0, 8.0))
            .show(ui, |ui| {
                ui.set_max_width(max_width);
                ui.vertical(|ui| {
                    ui.label(egui::RichText::new(label).strong().small());
                    ui.add_space(2.0);
                    markdown_text(ui, cache, &message.id, &message.text());
                });
            });
    });
    ui.add_space(8.0);
}

/// Render a primary action button
pub fn primary_button(ui: &mut egui::Ui, text: &str) -> egui::Response {
    ui.button(egui::RichText::new(text).strong())
}

/// Render a stop button (typically red)
pub fn stop_button(ui: &mut egui::Ui) -> egui::Response {
    ui.button(egui::RichText::new("⏹ Stop").color(egui::Color32::from_rgb(220, 0, 0)))
}

/// Render the small delete button used on sidebar rows
pub fn delete_button(ui: &mut egui::Ui) -> egui::Response {
    ui.add(egui::Button::new(egui::RichText::new("🗑").size(12.0)).frame(false))
        .on_hover_text("Delete chat")
}

/// Render an error line under the transcript
pub fn error_banner(ui: &mut egui::Ui, message: &str) {
    ui.colored_label(egui::Color32::from_rgb(220, 0, 0), format!("⚠ {}", message));
}
