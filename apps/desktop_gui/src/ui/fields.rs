use std::collections::HashMap;

use client_core::{
    form::{RenderedField, TextKind},
    strings, FieldControl, FieldEdit,
};
use eframe::egui;
use shared::domain::QuestionId;

const REQUIRED_MARK_COLOR: egui::Color32 = egui::Color32::from_rgb(200, 70, 70);
const HINT_COLOR: egui::Color32 = egui::Color32::from_rgb(220, 150, 80);

pub(crate) fn field_label(ui: &mut egui::Ui, field: &RenderedField<'_>) {
    ui.horizontal_wrapped(|ui| {
        ui.label(egui::RichText::new(field.label()).strong());
        if field.required {
            ui.label(egui::RichText::new("*").strong().color(REQUIRED_MARK_COLOR));
        }
    });
}

/// Draws one control and returns the respondent's edit, if any, this frame.
///
/// `number_drafts` keeps what was typed into number inputs so text that does
/// not parse yet stays on screen.
pub(crate) fn field_control(
    ui: &mut egui::Ui,
    field: &RenderedField<'_>,
    number_drafts: &mut HashMap<QuestionId, String>,
) -> Option<FieldEdit> {
    let mut edit = None;
    ui.push_id(field.question_id().as_str(), |ui| match &field.control {
        FieldControl::Text {
            kind,
            value,
            placeholder,
            ..
        } => {
            let mut buf = value.clone();
            let widget = match kind {
                TextKind::MultiLine => egui::TextEdit::multiline(&mut buf).desired_rows(3),
                TextKind::SingleLine | TextKind::Email | TextKind::Date => {
                    egui::TextEdit::singleline(&mut buf)
                }
            };
            let response = ui.add(
                widget
                    .hint_text(*placeholder)
                    .desired_width(f32::INFINITY),
            );
            if response.changed() {
                edit = Some(FieldEdit::SetText(buf));
            }
        }
        FieldControl::Number { value, .. } => {
            let mut buf = number_drafts
                .get(field.question_id())
                .cloned()
                .unwrap_or_else(|| value.clone());
            let response = ui.add(egui::TextEdit::singleline(&mut buf).desired_width(160.0));
            if !response.changed() && number_draft_rejected(&buf, value) {
                ui.label(egui::RichText::new(strings::NUMBER_INVALID).small().color(HINT_COLOR));
            }
            if response.changed() {
                number_drafts.insert(field.question_id().clone(), buf.clone());
                edit = Some(FieldEdit::SetNumber(buf));
            }
        }
        FieldControl::SingleChoice { options } => {
            for option in options {
                if ui.radio(option.selected, &option.label).clicked() && !option.selected {
                    edit = Some(FieldEdit::Select(option.label.clone()));
                }
            }
        }
        FieldControl::MultipleChoice { options } => {
            for option in options {
                let mut checked = option.selected;
                if ui.checkbox(&mut checked, &option.label).changed() {
                    edit = Some(FieldEdit::Toggle(option.label.clone()));
                }
            }
        }
        FieldControl::Rating { choices } => {
            ui.horizontal_wrapped(|ui| {
                for choice in choices {
                    let button = egui::Button::new(choice.value.to_string())
                        .selected(choice.selected)
                        .min_size(egui::vec2(32.0, 28.0));
                    if ui.add(button).clicked() {
                        edit = Some(FieldEdit::Rate(choice.value));
                    }
                }
            });
        }
    });
    edit
}

/// Typed text that did not become an answer: the stored value is empty while
/// the input is not.
fn number_draft_rejected(draft: &str, stored: &str) -> bool {
    stored.is_empty() && !draft.trim().is_empty()
}
