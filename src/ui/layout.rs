// Main application layout
// Handles window layout, panels, menu bar, and overall UI structure

use crate::chat::surface::{ChatStatus, ChatSurface};
use crate::chat::transport::ChatTransport;
use crate::state::AppState;
use crate::ui::components::*;
use eframe::egui;
use egui_commonmark::CommonMarkCache;

/// Render the main application layout
/// Includes menu bar, session sidebar, chat header, transcript and input
pub fn render_app_layout(
    ctx: &egui::Context,
    state: &mut AppState,
    surface: &mut ChatSurface,
    transport: &dyn ChatTransport,
    markdown: &mut CommonMarkCache,
) {
    let viewport_width = ctx.screen_rect().width();

    render_menu_bar(ctx, state, viewport_width);

    if state.ui_state.sidebar_visible {
        render_sidebar(ctx, state, viewport_width);
    }

    render_input_panel(ctx, surface, transport);

    egui::CentralPanel::default().show(ctx, |ui| {
        render_header(ui, state);
        ui.separator();
        render_transcript(ui, surface, markdown);
    });

    render_about_window(ctx, state);
}

/// Render the top menu bar
fn render_menu_bar(ctx: &egui::Context, state: &mut AppState, viewport_width: f32) {
    egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
        egui::menu::bar(ui, |ui| {
            // File menu
            ui.menu_button("File", |ui| {
                if ui.button("New Chat").clicked() {
                    state.new_chat(viewport_width);
                    ui.close_menu();
                }
                ui.separator();
                if ui.button("Quit").clicked() {
                    ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                }
            });

            // View menu
            ui.menu_button("View", |ui| {
                ui.checkbox(&mut state.ui_state.sidebar_visible, "Show Chats");
                let mut dark_mode = ctx.style().visuals.dark_mode;
                if ui.checkbox(&mut dark_mode, "Dark Mode").changed() {
                    let visuals = if dark_mode {
                        egui::Visuals::dark()
                    } else {
                        egui::Visuals::light()
                    };
                    ctx.set_visuals(visuals);
                }
            });

            // Help menu
            ui.menu_button("Help", |ui| {
                if ui.button("About").clicked() {
                    state.ui_state.about_open = true;
                    ui.close_menu();
                }
            });
        });
    });
}

/// Render the left sidebar with the session list
fn render_sidebar(ctx: &egui::Context, state: &mut AppState, viewport_width: f32) {
    egui::SidePanel::left("session_sidebar")
        .resizable(true)
        .default_width(240.0)
        .min_width(150.0)
        .show(ctx, |ui| {
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                ui.heading("Chats");
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if primary_button(ui, "+ New Chat").clicked() {
                        state.new_chat(viewport_width);
                    }
                });
            });
            ui.add_space(4.0);
            ui.separator();
            ui.add_space(4.0);

            egui::ScrollArea::vertical()
                .id_source("session_list_scroll")
                .auto_shrink([false; 2])
                .show(ui, |ui| {
                    // Collect rows first; clicks mutate the store
                    let rows: Vec<(String, String)> = state
                        .sessions
                        .sessions()
                        .iter()
                        .map(|s| (s.id.clone(), s.display_title().to_string()))
                        .collect();
                    let active_id = state.sessions.active_id().to_string();

                    for (id, title) in rows {
                        match session_row(ui, &id, &title, id == active_id) {
                            RowAction::Delete => {
                                state.delete_session(&id);
                            }
                            RowAction::Select => {
                                state.select_session(&id, viewport_width);
                            }
                            RowAction::None => {}
                        }
                        ui.add_space(4.0);
                    }
                });
        });
}

/// What a click on a sidebar row asked for
enum RowAction {
    None,
    Select,
    Delete,
}

/// Render one sidebar row
/// A click on the delete button never also selects the row
fn session_row(ui: &mut egui::Ui, id: &str, title: &str, is_active: bool) -> RowAction {
    let row_id = ui.id().with(("session_row", id));

    let mut frame = egui::Frame::none();
    frame.rounding = egui::Rounding::same(4.0);
    frame.inner_margin = egui::Margin::symmetric(0.0, 4.0);
    if is_active {
        frame.fill = ui.visuals().selection.bg_fill;
    }

    let mut delete_rect = egui::Rect::NOTHING;
    let mut delete_clicked = false;
    let row_response = frame.show(ui, |ui| {
        ui.horizontal(|ui| {
            ui.add_space(8.0);
            ui.add(egui::Label::new(title).truncate(true));
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.add_space(4.0);
                let delete = delete_button(ui);
                delete_rect = delete.rect;
                delete_clicked = delete.clicked();
            });
        })
    });

    let row_rect = row_response.response.rect;
    let interact = ui.interact(row_rect, row_id, egui::Sense::click());

    if interact.hovered() && !is_active {
        let stroke_color = ui.visuals().widgets.hovered.bg_fill;
        let stroke_color_alpha = egui::Color32::from_rgba_unmultiplied(
            stroke_color.r(),
            stroke_color.g(),
            stroke_color.b(),
            100,
        );
        ui.painter().rect_stroke(
            row_rect,
            egui::Rounding::same(4.0),
            egui::Stroke::new(2.0, stroke_color_alpha),
        );
    }

    // The row sense covers the button too, so route by pointer position
    let on_delete = interact
        .interact_pointer_pos()
        .map(|pos| delete_rect.contains(pos))
        .unwrap_or(false);

    if delete_clicked || (interact.clicked() && on_delete) {
        RowAction::Delete
    } else if interact.clicked() {
        RowAction::Select
    } else {
        RowAction::None
    }
}

/// Render the chat header with the sidebar toggle and session title
fn render_header(ui: &mut egui::Ui, state: &mut AppState) {
    ui.add_space(4.0);
    ui.horizontal(|ui| {
        let toggle = if state.ui_state.sidebar_visible { "◀" } else { "☰" };
        if ui.button(toggle).on_hover_text("Toggle chat list").clicked() {
            state.ui_state.sidebar_visible = !state.ui_state.sidebar_visible;
        }
        ui.add_space(8.0);
        ui.heading(state.sessions.active_session().display_title());
    });
    ui.add_space(4.0);
}

/// Render the scrollable transcript of the active session
fn render_transcript(ui: &mut egui::Ui, surface: &mut ChatSurface, markdown: &mut CommonMarkCache) {
    let scroll_to_bottom = surface.take_scroll_request();

    egui::ScrollArea::vertical()
        .id_source(("transcript", surface.session_id().to_string()))
        .auto_shrink([false; 2])
        .show(ui, |ui| {
            ui.add_space(8.0);
            if surface.messages().is_empty() {
                render_welcome_view(ui);
            } else {
                for message in surface.messages().iter() {
                    message_bubble(ui, markdown, message);
                }
            }

            if surface.status() == ChatStatus::Submitted {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label(egui::RichText::new("Thinking...").weak().italics());
                });
            }

            if let Some(error) = surface.last_error() {
                ui.add_space(4.0);
                error_banner(ui, error);
            }

            if scroll_to_bottom {
                ui.scroll_to_cursor(Some(egui::Align::BOTTOM));
            }
        });
}

/// Render the placeholder shown for an empty chat
fn render_welcome_view(ui: &mut egui::Ui) {
    ui.vertical_centered(|ui| {
        ui.add_space(80.0);
        ui.heading(egui::RichText::new("How can I help you today?").size(24.0));
        ui.add_space(12.0);
        ui.label(
            egui::RichText::new("Type a message below. Enter sends, Shift+Enter adds a new line.")
                .weak()
                .size(14.0),
        );
    });
}

/// Render the message input with send and stop controls
fn render_input_panel(ctx: &egui::Context, surface: &mut ChatSurface, transport: &dyn ChatTransport) {
    egui::TopBottomPanel::bottom("chat_input")
        .resizable(false)
        .show(ctx, |ui| {
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                let input_id = ui.id().with("message_input");
                let has_focus = ui.memory(|m| m.has_focus(input_id));

                // Consume plain Enter before the text edit sees it; Shift+Enter still inserts a newline
                let enter_pressed = has_focus
                    && ui.input_mut(|i| i.consume_key(egui::Modifiers::NONE, egui::Key::Enter));

                let button_width = 80.0;
                let busy = surface.is_busy();
                ui.add_sized(
                    [ui.available_width() - button_width - 8.0, 48.0],
                    egui::TextEdit::multiline(&mut surface.input)
                        .id(input_id)
                        .hint_text("Send a message...")
                        .desired_rows(2),
                );

                ui.vertical(|ui| {
                    if busy {
                        if stop_button(ui).clicked() {
                            surface.stop();
                        }
                    } else {
                        let can_send = !surface.input.trim().is_empty();
                        let send = ui.add_enabled(
                            can_send,
                            egui::Button::new(egui::RichText::new("Send ➤").strong()),
                        );
                        if send.clicked() || enter_pressed {
                            surface.submit(transport);
                            ui.memory_mut(|m| m.request_focus(input_id));
                        }
                    }
                });
            });
            ui.add_space(8.0);
        });
}

/// Render the About window
fn render_about_window(ctx: &egui::Context, state: &mut AppState) {
    egui::Window::new("About")
        .open(&mut state.ui_state.about_open)
        .collapsible(false)
        .resizable(false)
        .show(ctx, |ui| {
            ui.heading("Gemini Chat");
            ui.add_space(8.0);
            ui.label("A desktop chat client for the Gemini chat proxy.");
            ui.add_space(4.0);
            ui.label(
                egui::RichText::new(
                    "Demo application: chats live in memory only and are lost when the window closes. \
                     Replies come from a hosted model and may be inaccurate.",
                )
                .weak(),
            );
        });
}
