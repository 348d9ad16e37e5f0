use crate::agent::AgentDriver;
use crate::config::DriverKind;
use crate::event::AppEvent;
use crate::scheme::{self, mock, SchemeModel};
use crate::session::{SessionState, SessionStatus, ToolStatus, EXECUTING_SENTINEL};
use crate::theme::Theme;
use eframe::egui::{self, CornerRadius, RichText, ScrollArea, Sense};
use serde_json::{Map, Value};
use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::{SystemTime, UNIX_EPOCH};

// Pixels per meter for the flat stand-in boxes in the scheme grid.
const PREVIEW_SCALE: f32 = 12.0;
const PREVIEW_MIN: f32 = 24.0;
const PREVIEW_MAX: f32 = 120.0;

pub struct SchemerApp {
    rx: Receiver<AppEvent>,
    driver: Box<dyn AgentDriver>,
    driver_kind: DriverKind,
    theme: Theme,
    theme_applied: bool,
    session: SessionState,
    adopted_session: Option<String>,
    awaiting_session: bool,
    pre_submit: Option<SessionState>,
    schemes: Vec<SchemeModel>,
    selected_scheme: Option<u32>,
    input_buffer: String,
    diagnostics_log: Vec<String>,
    scroll_to_bottom: bool,
}

impl SchemerApp {
    pub fn new(rx: Receiver<AppEvent>, driver: Box<dyn AgentDriver>, driver_kind: DriverKind) -> Self {
        Self {
            rx,
            driver,
            driver_kind,
            theme: Theme::default(),
            theme_applied: false,
            session: SessionState::idle(),
            adopted_session: None,
            awaiting_session: false,
            pre_submit: None,
            schemes: mock::all_schemes(),
            selected_scheme: None,
            input_buffer: String::new(),
            diagnostics_log: Vec::new(),
            scroll_to_bottom: false,
        }
    }

    fn timestamp() -> String {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(duration) => duration.as_secs().to_string(),
            Err(_) => "0".to_string(),
        }
    }

    fn log_diagnostic(&mut self, message: impl Into<String>) {
        self.diagnostics_log
            .push(format!("[{}] {}", Self::timestamp(), message.into()));
    }

    /// Applies the submit transition if the guards allow it. Clears the
    /// previous session's results immediately; the driver's first snapshot
    /// supplies the new session id.
    fn try_submit(&mut self) -> bool {
        let query = self.input_buffer.trim().to_string();
        if !self.session.can_submit(&query) {
            return false;
        }

        let mut running = SessionState::idle();
        running.status = SessionStatus::Running;
        self.pre_submit = Some(std::mem::replace(&mut self.session, running));
        self.adopted_session = None;
        self.awaiting_session = true;

        self.driver.submit(query.clone());
        self.log_diagnostic(format!("query submitted: {query}"));
        self.input_buffer.clear();
        self.scroll_to_bottom = true;
        true
    }

    /// Explicit user reset from a terminal state back to idle. The old
    /// session is discarded entirely; the grid falls back to the example
    /// schemes until a new session produces results.
    fn new_session(&mut self) {
        self.driver.shutdown();
        self.session = SessionState::idle();
        self.adopted_session = None;
        self.awaiting_session = false;
        self.pre_submit = None;
        self.schemes = mock::all_schemes();
        self.selected_scheme = None;
        self.log_diagnostic("session reset");
    }

    fn drain_events(&mut self, ctx: &egui::Context) {
        loop {
            match self.rx.try_recv() {
                Ok(event) => self.apply_event(event, Some(ctx)),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.log_diagnostic("event channel disconnected");
                    break;
                }
            }
        }
    }

    fn apply_event(&mut self, event: AppEvent, ctx: Option<&egui::Context>) {
        match event {
            AppEvent::SessionUpdate(state) => {
                if self.awaiting_session && self.adopted_session.is_none() {
                    self.adopted_session = state.session_id.clone();
                    self.awaiting_session = false;
                    self.pre_submit = None;
                    if let Some(id) = &self.adopted_session {
                        self.log_diagnostic(format!("session started: {id}"));
                    }
                }

                // Updates from an abandoned session id keep arriving until
                // their driver task winds down; they are dropped here.
                if self.adopted_session.is_none() || state.session_id != self.adopted_session {
                    return;
                }

                if let Some(schemes) = &state.schemes {
                    self.schemes = schemes.clone();
                    self.selected_scheme = None;
                }

                let became_terminal =
                    state.status.is_terminal() && !self.session.status.is_terminal();
                self.session = state;
                if became_terminal {
                    self.log_diagnostic(format!(
                        "session finished: {}",
                        self.session.status.label()
                    ));
                }

                self.scroll_to_bottom = true;
                if let Some(ctx) = ctx {
                    ctx.request_repaint();
                }
            }
            AppEvent::DriverError(message) => {
                self.log_diagnostic(format!("driver error: {message}"));
                if self.awaiting_session && self.adopted_session.is_none() {
                    // Failed submission: restore the exact pre-submit state.
                    self.session = self.pre_submit.take().unwrap_or_else(SessionState::idle);
                    self.awaiting_session = false;
                }
                if let Some(ctx) = ctx {
                    ctx.request_repaint();
                }
            }
        }
    }

    fn render_top_bar(&mut self, ctx: &egui::Context) {
        let status = self.session.status;
        let status_color = self.theme.status_color(status);
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.strong("Schemer");
                ui.separator();
                ui.label(RichText::new(self.driver_kind.label()).color(self.theme.text_muted));
                ui.separator();
                ui.label(RichText::new(status.label()).color(status_color));
            });
        });
    }

    fn render_agent_panel(&mut self, ctx: &egui::Context) {
        let mut start_new_session = false;
        let mut send_now = false;

        egui::SidePanel::right("agent_panel")
            .resizable(true)
            .default_width(380.0)
            .show(ctx, |ui| {
                ui.heading("Agent");
                ui.separator();

                let session_height = (ui.available_height() - 170.0).max(120.0);
                ScrollArea::vertical()
                    .id_salt("agent_session")
                    .max_height(session_height)
                    .stick_to_bottom(true)
                    .show(ui, |ui| {
                        if self.session.status == SessionStatus::Idle {
                            ui.label("Enter a prompt below to start a new session.");
                            ui.label(
                                RichText::new(
                                    "Try \"show me a house\" or \"design an office building\".",
                                )
                                .color(self.theme.text_muted),
                            );
                        } else {
                            self.render_session_info(ui);
                            self.render_tool_cards(ui);
                            self.render_final_answer(ui);
                            if self.reset_available() && ui.button("Start New Query").clicked() {
                                start_new_session = true;
                            }
                        }

                        if self.scroll_to_bottom {
                            ui.scroll_to_cursor(Some(egui::Align::BOTTOM));
                        }
                    });
                self.scroll_to_bottom = false;

                ui.separator();
                egui::CollapsingHeader::new("Diagnostics")
                    .default_open(false)
                    .show(ui, |ui| {
                        ScrollArea::vertical()
                            .id_salt("diagnostics_log")
                            .max_height(90.0)
                            .stick_to_bottom(true)
                            .show(ui, |ui| {
                                for entry in &self.diagnostics_log {
                                    ui.label(RichText::new(entry).small());
                                }
                            });
                    });

                ui.separator();
                let running = self.session.status == SessionStatus::Running;
                let hint = if running {
                    "Waiting for response..."
                } else {
                    "Enter your prompt here..."
                };

                ui.horizontal(|ui| {
                    let response = ui.add_enabled(
                        !running,
                        egui::TextEdit::singleline(&mut self.input_buffer)
                            .desired_width(f32::INFINITY)
                            .hint_text(hint),
                    );
                    if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                        send_now = true;
                    }

                    let clicked = ui
                        .add_enabled(
                            !running && !self.input_buffer.trim().is_empty(),
                            egui::Button::new("Send"),
                        )
                        .clicked();
                    send_now |= clicked;
                });
            });

        if start_new_session {
            self.new_session();
        }
        if send_now && self.try_submit() {
            ctx.request_repaint();
        }
    }

    fn render_session_info(&self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label(RichText::new("Session ID:").color(self.theme.text_muted));
            ui.monospace(self.session.session_id.as_deref().unwrap_or("-"));
        });
        ui.horizontal(|ui| {
            ui.label(RichText::new("Status:").color(self.theme.text_muted));
            ui.label(
                RichText::new(self.session.status.label())
                    .color(self.theme.status_color(self.session.status)),
            );
        });
    }

    fn render_tool_cards(&self, ui: &mut egui::Ui) {
        if self.session.results.is_empty() {
            return;
        }

        ui.separator();
        ui.strong("Intermediate Results");
        // BTreeMap iteration is ascending lexical key order, which the
        // zero-padded step keys guarantee equals execution order.
        for (key, result) in &self.session.results {
            let title = format!("Tool: {}", result.tool);
            egui::CollapsingHeader::new(
                RichText::new(title).color(self.theme.tool_status_color(result.status)),
            )
            .id_salt(key)
            .default_open(result.status == ToolStatus::Running)
            .show(ui, |ui| {
                ui.label(
                    RichText::new(result.status.label())
                        .small()
                        .color(self.theme.tool_status_color(result.status)),
                );
                if result.result == EXECUTING_SENTINEL {
                    ui.label(
                        RichText::new("Tool is currently executing...")
                            .color(self.theme.text_muted),
                    );
                } else {
                    ui.monospace(&result.result);
                }
            });
        }
    }

    /// The explicit new-session reset is offered from any terminal state,
    /// including an error session that never produced a final answer.
    fn reset_available(&self) -> bool {
        self.session.status.is_terminal()
    }

    fn render_final_answer(&self, ui: &mut egui::Ui) {
        let Some(answer) = self.session.final_answer.as_deref() else {
            return;
        };

        ui.separator();
        ui.strong("Final Answer");
        self.theme.card_frame().show(ui, |ui| {
            ui.label(answer);
        });
    }

    fn render_scheme_grid(&mut self, ctx: &egui::Context) {
        let mut clicked_scheme: Option<u32> = None;

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Schemes");
            ui.label(
                RichText::new("Click a scheme to view its details.").color(self.theme.text_muted),
            );
            ui.separator();

            ScrollArea::vertical().id_salt("scheme_grid").show(ui, |ui| {
                ui.horizontal_wrapped(|ui| {
                    for scheme in &self.schemes {
                        let selected = self.selected_scheme == Some(scheme.id);
                        if render_scheme_card(ui, &self.theme, scheme, selected) {
                            clicked_scheme = Some(scheme.id);
                        }
                    }
                });
            });
        });

        if let Some(id) = clicked_scheme {
            self.selected_scheme = Some(id);
        }
    }

    fn render_detail_panel(&mut self, ctx: &egui::Context) {
        let Some(scheme) = self
            .selected_scheme
            .and_then(|id| self.schemes.iter().find(|scheme| scheme.id == id))
            .cloned()
        else {
            return;
        };

        let mut close = false;
        egui::SidePanel::right("scheme_detail")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading(format!("Scheme {} Details", scheme.id));
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("\u{d7}").clicked() {
                            close = true;
                        }
                    });
                });
                ui.separator();

                ScrollArea::vertical().id_salt("scheme_detail_body").show(ui, |ui| {
                    render_detail_section(
                        ui,
                        &self.theme,
                        "Parameters",
                        &scheme.parameters,
                        "No parameters available",
                    );
                    render_detail_section(
                        ui,
                        &self.theme,
                        "Evaluations",
                        &scheme.evaluations,
                        "No evaluations available",
                    );
                    self.render_visualization_section(ui, &scheme);
                });
            });

        if close {
            self.selected_scheme = None;
        }
    }

    fn render_visualization_section(&self, ui: &mut egui::Ui, scheme: &SchemeModel) {
        ui.strong("Visualization Properties");
        egui::Grid::new("detail_visualization")
            .num_columns(2)
            .spacing([self.theme.spacing_16, self.theme.spacing_8 / 2.0])
            .show(ui, |ui| {
                for (label, value) in [
                    ("Width", scheme.width),
                    ("Height", scheme.height),
                    ("Depth", scheme.depth),
                ] {
                    ui.label(RichText::new(label).color(self.theme.text_muted));
                    ui.label(format!("{value} m"));
                    ui.end_row();
                }

                ui.label(RichText::new("Color").color(self.theme.text_muted));
                ui.horizontal(|ui| {
                    let (rect, _) =
                        ui.allocate_exact_size(egui::vec2(14.0, 14.0), Sense::hover());
                    ui.painter()
                        .rect_filled(rect, CornerRadius::same(3), scheme.fill_color());
                    ui.label(&scheme.color);
                });
                ui.end_row();
            });
        ui.separator();
    }
}

fn render_detail_section(
    ui: &mut egui::Ui,
    theme: &Theme,
    title: &str,
    entries: &Map<String, Value>,
    placeholder: &str,
) {
    ui.strong(title);
    egui::Grid::new(format!("detail_{title}"))
        .num_columns(2)
        .spacing([theme.spacing_16, theme.spacing_8 / 2.0])
        .show(ui, |ui| {
            if entries.is_empty() {
                ui.label(RichText::new(placeholder).color(theme.text_muted));
                ui.label("-");
                ui.end_row();
            } else {
                for (key, value) in entries {
                    ui.label(
                        RichText::new(scheme::format_field_label(key)).color(theme.text_muted),
                    );
                    ui.label(scheme::format_scalar(value));
                    ui.end_row();
                }
            }
        });
    ui.separator();
}

/// One grid card: a flat colored box stand-in for the external 3D cuboid,
/// scaled from the scheme's footprint. Returns true on click.
fn render_scheme_card(
    ui: &mut egui::Ui,
    theme: &Theme,
    scheme: &SchemeModel,
    selected: bool,
) -> bool {
    let mut clicked = false;
    let fill = if selected { theme.surface_3 } else { theme.surface_2 };

    theme.panel_frame(fill, theme.spacing_12 as i8).show(ui, |ui| {
        ui.vertical(|ui| {
            let size = egui::vec2(
                (scheme.width as f32 * PREVIEW_SCALE).clamp(PREVIEW_MIN, PREVIEW_MAX),
                (scheme.height as f32 * PREVIEW_SCALE).clamp(PREVIEW_MIN, PREVIEW_MAX),
            );
            let (rect, response) = ui.allocate_exact_size(size, Sense::click());
            ui.painter()
                .rect_filled(rect, CornerRadius::same(theme.radius_8), scheme.fill_color());
            if response.clicked() {
                clicked = true;
            }

            let label = ui.add(
                egui::Label::new(RichText::new(format!("Scheme {}", scheme.id)).strong())
                    .sense(Sense::click()),
            );
            if label.clicked() {
                clicked = true;
            }
        });
    });

    clicked
}

impl eframe::App for SchemerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if !self.theme_applied {
            self.theme.apply_visuals(ctx);
            self.theme_applied = true;
        }

        self.drain_events(ctx);
        self.render_top_bar(ctx);
        self.render_agent_panel(ctx);
        self.render_detail_panel(ctx);
        self.render_scheme_grid(ctx);

        if self.session.status == SessionStatus::Running {
            // Keep draining driver updates while a session is in flight.
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{step_key, ToolResult};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc;
    use std::sync::{Arc, Mutex};

    struct StubDriver {
        submitted: Arc<Mutex<Vec<String>>>,
        shutdowns: Arc<AtomicUsize>,
    }

    impl AgentDriver for StubDriver {
        fn submit(&self, query: String) {
            self.submitted
                .lock()
                .expect("stub lock should not poison")
                .push(query);
        }

        fn shutdown(&self) {
            self.shutdowns.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn app_with_stub() -> (SchemerApp, Arc<Mutex<Vec<String>>>, Arc<AtomicUsize>) {
        let (_tx, rx) = mpsc::channel();
        let submitted = Arc::new(Mutex::new(Vec::new()));
        let shutdowns = Arc::new(AtomicUsize::new(0));
        let driver = StubDriver {
            submitted: Arc::clone(&submitted),
            shutdowns: Arc::clone(&shutdowns),
        };
        let app = SchemerApp::new(rx, Box::new(driver), DriverKind::Simulated);
        (app, submitted, shutdowns)
    }

    fn submissions(submitted: &Arc<Mutex<Vec<String>>>) -> Vec<String> {
        submitted
            .lock()
            .expect("stub lock should not poison")
            .clone()
    }

    #[test]
    fn blank_submit_never_changes_state() {
        let (mut app, submitted, _) = app_with_stub();
        app.input_buffer = "   \t ".to_string();

        assert!(!app.try_submit());
        assert_eq!(app.session, SessionState::idle());
        assert!(submissions(&submitted).is_empty());
    }

    #[test]
    fn submit_transitions_to_running_and_forwards_query() {
        let (mut app, submitted, _) = app_with_stub();
        app.input_buffer = "show me a house".to_string();

        assert!(app.try_submit());
        assert_eq!(app.session.status, SessionStatus::Running);
        assert!(app.session.results.is_empty());
        assert_eq!(app.session.final_answer, None);
        assert!(app.input_buffer.is_empty());
        assert_eq!(submissions(&submitted), vec!["show me a house"]);
    }

    #[test]
    fn submit_while_running_is_a_noop() {
        let (mut app, submitted, _) = app_with_stub();
        app.input_buffer = "first".to_string();
        assert!(app.try_submit());

        app.input_buffer = "second".to_string();
        assert!(!app.try_submit());
        assert_eq!(submissions(&submitted), vec!["first"]);
        assert_eq!(app.input_buffer, "second");
    }

    #[test]
    fn first_update_adopts_session_and_stale_updates_drop() {
        let (mut app, _, _) = app_with_stub();
        app.input_buffer = "query".to_string();
        assert!(app.try_submit());

        app.apply_event(
            AppEvent::SessionUpdate(SessionState::begin("live".to_string())),
            None,
        );
        assert_eq!(app.session.session_id.as_deref(), Some("live"));

        let mut stale = SessionState::begin("stale".to_string());
        stale.status = SessionStatus::Completed;
        stale.final_answer = Some("stale answer".to_string());
        app.apply_event(AppEvent::SessionUpdate(stale), None);

        assert_eq!(app.session.session_id.as_deref(), Some("live"));
        assert_eq!(app.session.final_answer, None);
    }

    #[test]
    fn updates_while_idle_are_dropped() {
        let (mut app, _, _) = app_with_stub();
        let mut orphan = SessionState::begin("orphan".to_string());
        orphan.status = SessionStatus::Completed;
        app.apply_event(AppEvent::SessionUpdate(orphan), None);
        assert_eq!(app.session, SessionState::idle());
    }

    #[test]
    fn terminal_update_sets_answer_and_allows_resubmit() {
        let (mut app, submitted, _) = app_with_stub();
        app.input_buffer = "query".to_string();
        assert!(app.try_submit());
        app.apply_event(
            AppEvent::SessionUpdate(SessionState::begin("live".to_string())),
            None,
        );

        let mut done = SessionState::begin("live".to_string());
        done.status = SessionStatus::Completed;
        done.results
            .insert(step_key(0), ToolResult::finished("search_documents", "ok"));
        done.final_answer = Some("all done".to_string());
        app.apply_event(AppEvent::SessionUpdate(done), None);

        assert_eq!(app.session.status, SessionStatus::Completed);
        assert_eq!(app.session.final_answer.as_deref(), Some("all done"));

        app.input_buffer = "follow up".to_string();
        assert!(app.try_submit());
        assert_eq!(submissions(&submitted).len(), 2);
    }

    #[test]
    fn driver_error_during_submit_restores_pre_submit_state() {
        let (mut app, _, _) = app_with_stub();

        // Establish a completed session first.
        app.input_buffer = "query".to_string();
        assert!(app.try_submit());
        let mut done = SessionState::begin("live".to_string());
        done.status = SessionStatus::Completed;
        done.final_answer = Some("kept".to_string());
        app.apply_event(AppEvent::SessionUpdate(done.clone()), None);

        // A failed second submission restores the completed view.
        app.input_buffer = "second".to_string();
        assert!(app.try_submit());
        app.apply_event(AppEvent::DriverError("connection refused".to_string()), None);

        assert_eq!(app.session, done);
        assert!(!app.awaiting_session);
    }

    #[test]
    fn reset_is_offered_for_error_sessions_without_final_answer() {
        let (mut app, _, _) = app_with_stub();
        assert!(!app.reset_available());

        app.input_buffer = "query".to_string();
        assert!(app.try_submit());
        assert!(!app.reset_available());
        app.apply_event(
            AppEvent::SessionUpdate(SessionState::begin("live".to_string())),
            None,
        );

        // A poll failure surfaces as a terminal error with no answer.
        let mut failed = SessionState::begin("live".to_string());
        failed.status = SessionStatus::Error;
        app.apply_event(AppEvent::SessionUpdate(failed), None);

        assert_eq!(app.session.final_answer, None);
        assert!(app.reset_available());

        app.new_session();
        assert_eq!(app.session, SessionState::idle());
    }

    #[test]
    fn new_session_returns_exact_idle_shape() {
        let (mut app, _, shutdowns) = app_with_stub();
        app.input_buffer = "query".to_string();
        assert!(app.try_submit());
        let mut done = SessionState::begin("live".to_string());
        done.status = SessionStatus::Error;
        app.apply_event(AppEvent::SessionUpdate(done), None);

        app.new_session();
        assert_eq!(app.session, SessionState::idle());
        assert_eq!(app.adopted_session, None);
        assert_eq!(app.schemes, mock::all_schemes());
        assert_eq!(shutdowns.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn schemes_in_update_replace_grid_wholesale() {
        let (mut app, _, _) = app_with_stub();
        app.input_buffer = "query".to_string();
        assert!(app.try_submit());

        let mut update = SessionState::begin("live".to_string());
        update.schemes = Some(vec![serde_json::from_value(serde_json::json!({
            "id": 42,
            "width": 2,
            "height": 3,
            "depth": 2,
            "color": "#42b883"
        }))
        .expect("scheme fixture should deserialize")]);
        app.apply_event(AppEvent::SessionUpdate(update), None);

        assert_eq!(app.schemes.len(), 1);
        assert_eq!(app.schemes[0].id, 42);
    }
}
