use std::{collections::HashMap, time::Duration};

use client_core::{
    parse_route, strings, ResponseSession, Route, SaveKind, SessionError, SessionPhase,
};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use shared::domain::QuestionId;

use crate::{
    backend_bridge::commands::BackendCommand,
    controller::{
        events::{UiError, UiErrorContext, UiEvent},
        orchestration::dispatch_backend_command,
    },
    ui::fields::{field_control, field_label},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusBannerSeverity {
    Info,
    Error,
}

#[derive(Debug, Clone)]
struct StatusBanner {
    severity: StatusBannerSeverity,
    message: String,
}

pub struct SurveyApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    link_input: String,
    route: Option<Route>,
    session: ResponseSession,
    number_drafts: HashMap<QuestionId, String>,
    status_banner: Option<StatusBanner>,
}

impl SurveyApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        initial_link: Option<String>,
    ) -> Self {
        let mut app = Self {
            cmd_tx,
            ui_rx,
            link_input: initial_link.clone().unwrap_or_default(),
            route: None,
            session: ResponseSession::new(None),
            number_drafts: HashMap::new(),
            status_banner: None,
        };
        if let Some(link) = initial_link {
            app.open_link(&link);
        }
        app
    }

    /// Replaces the current session with one for `input` and starts loading it.
    fn open_link(&mut self, input: &str) {
        let route = parse_route(input);
        tracing::info!(route = ?route, "opening survey link");
        self.session = ResponseSession::from_route(&route);
        self.route = Some(route);
        self.number_drafts.clear();
        self.status_banner = None;
        self.start_load();
    }

    fn start_load(&mut self) {
        let Ok(request) = self.session.begin_load() else {
            return;
        };
        let link = request.link.clone();
        if let Err(message) =
            dispatch_backend_command(&self.cmd_tx, BackendCommand::LoadSurvey { link: request.link })
        {
            self.session
                .apply_load(&link, Err(SessionError::LoadFailure(message)));
        }
    }

    fn start_save(&mut self, kind: SaveKind) {
        let Some(request) = self.session.begin_save(kind) else {
            return;
        };
        self.status_banner = None;
        let link = request.link.clone();
        if let Err(message) =
            dispatch_backend_command(&self.cmd_tx, BackendCommand::SaveResponse { request })
        {
            self.session
                .apply_save(&link, kind, Err(SessionError::SaveFailure(message.clone())));
            self.show_error(UiError::from_message(UiErrorContext::SaveResponse, message));
        }
    }

    fn show_error(&mut self, err: UiError) {
        tracing::debug!(context = ?err.context(), category = ?err.category(), "showing error banner");
        let message = if err.is_retryable() {
            format!("{} {}", err.message(), strings::BACKEND_UNAVAILABLE)
        } else {
            err.message().to_string()
        };
        self.status_banner = Some(StatusBanner {
            severity: StatusBannerSeverity::Error,
            message,
        });
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::SurveyLoaded { link, result } => {
                    if self.session.apply_load(&link, result) {
                        self.number_drafts.clear();
                    }
                }
                UiEvent::SaveFinished { link, kind, result } => {
                    if !self.session.apply_save(&link, kind, result) {
                        continue;
                    }
                    if let Some(err) = self.session.save_error().cloned() {
                        self.show_error(UiError::from_message(
                            UiErrorContext::SaveResponse,
                            err.message(),
                        ));
                    } else if kind == SaveKind::Draft && !self.session.is_completed() {
                        self.status_banner = Some(StatusBanner {
                            severity: StatusBannerSeverity::Info,
                            message: strings::DRAFT_SAVED.to_string(),
                        });
                    }
                }
                UiEvent::Error(err) => self.show_error(err),
            }
        }
    }

    fn show_link_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("survey_link_bar").show(ctx, |ui| {
            ui.add_space(6.0);
            ui.horizontal(|ui| {
                let width = (ui.available_width() - 80.0).max(120.0);
                let response = ui.add(
                    egui::TextEdit::singleline(&mut self.link_input)
                        .hint_text(strings::LINK_PROMPT)
                        .desired_width(width),
                );
                let submitted =
                    response.lost_focus() && ui.input(|input| input.key_pressed(egui::Key::Enter));
                if ui.button(strings::OPEN_LINK).clicked() || submitted {
                    let input = self.link_input.clone();
                    self.open_link(&input);
                }
            });
            ui.add_space(6.0);
        });
    }

    fn show_status_banner(&mut self, ui: &mut egui::Ui) {
        let Some(banner) = self.status_banner.clone() else {
            return;
        };
        let (fill, stroke) = match banner.severity {
            StatusBannerSeverity::Error => (
                egui::Color32::from_rgb(111, 53, 53),
                egui::Stroke::new(1.0, egui::Color32::from_rgb(175, 96, 96)),
            ),
            StatusBannerSeverity::Info => (
                egui::Color32::from_rgb(44, 88, 62),
                egui::Stroke::new(1.0, egui::Color32::from_rgb(92, 150, 112)),
            ),
        };

        egui::Frame::new()
            .fill(fill)
            .stroke(stroke)
            .corner_radius(egui::CornerRadius::same(8))
            .inner_margin(egui::Margin::symmetric(10, 8))
            .show(ui, |ui| {
                ui.horizontal_wrapped(|ui| {
                    ui.label(egui::RichText::new(&banner.message).color(egui::Color32::WHITE));
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button(strings::DISMISS).clicked() {
                            self.status_banner = None;
                            self.session.dismiss_save_error();
                        }
                    });
                });
            });
        ui.add_space(8.0);
    }

    fn show_message(ui: &mut egui::Ui, title: &str, body: Option<&str>) {
        ui.vertical_centered(|ui| {
            ui.add_space(48.0);
            ui.heading(title);
            if let Some(body) = body {
                ui.add_space(8.0);
                ui.label(body);
            }
        });
    }

    fn show_body(&mut self, ui: &mut egui::Ui) {
        let Some(route) = &self.route else {
            Self::show_message(ui, strings::LINK_PROMPT, None);
            return;
        };
        if *route == Route::NotFound {
            Self::show_message(ui, strings::ROUTE_NOT_FOUND, None);
            return;
        }

        match self.session.phase() {
            SessionPhase::InvalidLink => {
                Self::show_message(ui, strings::INVALID_LINK, Some(strings::INVALID_LINK_HINT));
            }
            SessionPhase::Idle | SessionPhase::Loading => {
                ui.vertical_centered(|ui| {
                    ui.add_space(48.0);
                    ui.spinner();
                    ui.label(strings::LOADING);
                });
            }
            SessionPhase::LoadFailed => {
                let message = self
                    .session
                    .load_error()
                    .map(SessionError::message)
                    .unwrap_or_else(|| strings::LOAD_FAILED_FALLBACK.to_string());
                Self::show_message(ui, strings::LOAD_FAILED_TITLE, Some(&message));
                ui.vertical_centered(|ui| {
                    if ui.button(strings::RETRY).clicked() {
                        self.start_load();
                    }
                });
            }
            SessionPhase::Editing => self.show_form(ui),
            SessionPhase::Completed => {
                Self::show_message(ui, strings::THANK_YOU_TITLE, Some(strings::THANK_YOU_BODY));
            }
        }
    }

    fn show_form(&mut self, ui: &mut egui::Ui) {
        let mut edits = Vec::new();
        let mut save_clicked = None;

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                if let Some(loaded) = self.session.survey() {
                    ui.heading(&loaded.survey.name);
                    if let Some(description) = &loaded.survey.description {
                        ui.label(description);
                    }
                }
                ui.add_space(4.0);
                ui.weak(strings::REQUIRED_HINT);
                ui.add_space(12.0);

                if let Some(form) = self.session.form() {
                    for group in &form.groups {
                        egui::Frame::group(ui.style())
                            .inner_margin(egui::Margin::same(12))
                            .show(ui, |ui| {
                                ui.set_width(ui.available_width());
                                for field in &group.fields {
                                    field_label(ui, field);
                                    if let Some(edit) =
                                        field_control(ui, field, &mut self.number_drafts)
                                    {
                                        edits.push((field.question_id().clone(), edit));
                                    }
                                    ui.add_space(10.0);
                                }
                            });
                        ui.add_space(10.0);
                    }
                }

                let pending = self.session.pending_save();
                let enabled = self.session.can_save();
                ui.horizontal(|ui| {
                    let draft_label = if pending == Some(SaveKind::Draft) {
                        strings::SAVING_DRAFT
                    } else {
                        strings::SAVE_DRAFT
                    };
                    if ui
                        .add_enabled(enabled, egui::Button::new(draft_label))
                        .clicked()
                    {
                        save_clicked = Some(SaveKind::Draft);
                    }
                    let submit_label = if pending == Some(SaveKind::Submit) {
                        strings::SUBMITTING
                    } else {
                        strings::SUBMIT
                    };
                    if ui
                        .add_enabled(enabled, egui::Button::new(submit_label))
                        .clicked()
                    {
                        save_clicked = Some(SaveKind::Submit);
                    }
                    if pending.is_some() {
                        ui.spinner();
                    }
                });
            });

        for (question_id, edit) in edits {
            self.session.edit(&question_id, edit);
        }
        if let Some(kind) = save_clicked {
            self.start_save(kind);
        }
    }
}

impl eframe::App for SurveyApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        self.show_link_bar(ctx);
        egui::CentralPanel::default().show(ctx, |ui| {
            self.show_status_banner(ui);
            self.show_body(ui);
        });

        if matches!(self.session.phase(), SessionPhase::Loading) || self.session.is_saving() {
            ctx.request_repaint_after(Duration::from_millis(50));
        } else {
            ctx.request_repaint_after(Duration::from_millis(250));
        }
    }
}
