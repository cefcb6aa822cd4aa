//! Grouping, ordering and per-type control selection for a survey form.
//!
//! Everything here is pure: the front ends draw a [`RenderedForm`] and feed
//! the respondent's input back through [`apply_edit`], which returns a new
//! [`AnswerMap`] with exactly one entry replaced or removed.

use std::{collections::HashMap, ops::RangeInclusive};

use shared::{
    domain::{QuestionId, QuestionType},
    protocol::{AnswerValue, Question},
};
use tracing::{debug, trace};

use crate::{answers::AnswerMap, strings};

const DEFAULT_RATING_MIN: i64 = 1;
const DEFAULT_RATING_MAX: i64 = 5;
/// Upper bound on rating buttons so a misconfigured range cannot flood the form.
const MAX_RATING_CHOICES: usize = 101;

#[derive(Debug, Clone, PartialEq)]
pub struct QuestionGroup<'a> {
    pub group_code: &'a str,
    pub questions: Vec<&'a Question>,
}

impl QuestionGroup<'_> {
    pub fn min_order(&self) -> i64 {
        self.questions.iter().map(|q| q.order).min().unwrap_or(0)
    }
}

/// Partitions by group code in first-seen order, sorts each group by `order`
/// and then the groups by their lowest `order`. Both sorts are stable, so equal
/// orders keep their input order.
pub fn group_questions(questions: &[Question]) -> Vec<QuestionGroup<'_>> {
    let mut groups: Vec<QuestionGroup<'_>> = Vec::new();
    let mut slots: HashMap<&str, usize> = HashMap::new();

    for question in questions {
        let slot = *slots.entry(question.group_code.as_str()).or_insert_with(|| {
            groups.push(QuestionGroup {
                group_code: question.group_code.as_str(),
                questions: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].questions.push(question);
    }

    for group in &mut groups {
        group.questions.sort_by_key(|q| q.order);
    }
    groups.sort_by_key(|group| group.min_order());
    groups
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextKind {
    SingleLine,
    MultiLine,
    Email,
    Date,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceOption {
    pub label: String,
    pub selected: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatingChoice {
    pub value: i64,
    pub selected: bool,
}

/// Length and pattern hints travel with text controls but are not enforced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextHints {
    pub min_length: Option<u32>,
    pub max_length: Option<u32>,
    pub pattern: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldControl {
    Text {
        kind: TextKind,
        value: String,
        placeholder: &'static str,
        hints: TextHints,
    },
    Number {
        value: String,
        min: Option<f64>,
        max: Option<f64>,
    },
    SingleChoice {
        options: Vec<ChoiceOption>,
    },
    MultipleChoice {
        options: Vec<ChoiceOption>,
    },
    Rating {
        choices: Vec<RatingChoice>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedField<'a> {
    pub question: &'a Question,
    pub required: bool,
    pub control: FieldControl,
}

impl RenderedField<'_> {
    pub fn question_id(&self) -> &QuestionId {
        &self.question.id
    }

    pub fn label(&self) -> &str {
        &self.question.content
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedGroup<'a> {
    pub group_code: &'a str,
    pub fields: Vec<RenderedField<'a>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedForm<'a> {
    pub groups: Vec<RenderedGroup<'a>>,
}

impl<'a> RenderedForm<'a> {
    pub fn fields(&self) -> impl Iterator<Item = &RenderedField<'a>> {
        self.groups.iter().flat_map(|group| group.fields.iter())
    }
}

pub fn render_form<'a>(questions: &'a [Question], answers: &AnswerMap) -> RenderedForm<'a> {
    let groups = group_questions(questions)
        .into_iter()
        .map(|group| RenderedGroup {
            group_code: group.group_code,
            fields: group
                .questions
                .into_iter()
                .filter_map(|question| render_field(question, answers.get(&question.id)))
                .collect(),
        })
        .collect();
    RenderedForm { groups }
}

/// Picks the control for `question`. Unknown question types yield `None`.
pub fn render_field<'a>(
    question: &'a Question,
    answer: Option<&AnswerValue>,
) -> Option<RenderedField<'a>> {
    let control = match &question.question_type {
        QuestionType::Text => text_control(TextKind::SingleLine, question, answer),
        QuestionType::Textarea => text_control(TextKind::MultiLine, question, answer),
        QuestionType::Email => text_control(TextKind::Email, question, answer),
        QuestionType::Date => text_control(TextKind::Date, question, answer),
        QuestionType::Number => FieldControl::Number {
            value: answer.map(AnswerValue::display_text).unwrap_or_default(),
            min: question.min_value,
            max: question.max_value,
        },
        QuestionType::SingleChoice => {
            let selected = answer.and_then(AnswerValue::as_text);
            FieldControl::SingleChoice {
                options: question
                    .options
                    .iter()
                    .map(|option| ChoiceOption {
                        label: option.clone(),
                        selected: selected == Some(option.as_str()),
                    })
                    .collect(),
            }
        }
        QuestionType::MultipleChoice => {
            let selected = answer.and_then(AnswerValue::as_selections).unwrap_or(&[]);
            FieldControl::MultipleChoice {
                options: question
                    .options
                    .iter()
                    .map(|option| ChoiceOption {
                        label: option.clone(),
                        selected: selected.contains(option),
                    })
                    .collect(),
            }
        }
        QuestionType::Rating => {
            let selected = answer.and_then(AnswerValue::as_integer);
            FieldControl::Rating {
                choices: rating_range(question)
                    .take(MAX_RATING_CHOICES)
                    .map(|value| RatingChoice {
                        value,
                        selected: selected == Some(value),
                    })
                    .collect(),
            }
        }
        QuestionType::Unknown(tag) => {
            trace!(
                question_id = %question.id,
                question_type = %tag,
                "no control for unsupported question type"
            );
            return None;
        }
    };

    Some(RenderedField {
        question,
        required: question.is_required,
        control,
    })
}

fn text_control(kind: TextKind, question: &Question, answer: Option<&AnswerValue>) -> FieldControl {
    let placeholder = match kind {
        TextKind::SingleLine | TextKind::MultiLine => strings::TEXT_PLACEHOLDER,
        TextKind::Email => strings::EMAIL_PLACEHOLDER,
        TextKind::Date => strings::DATE_PLACEHOLDER,
    };
    FieldControl::Text {
        kind,
        value: answer.map(AnswerValue::display_text).unwrap_or_default(),
        placeholder,
        hints: TextHints {
            min_length: question.min_length,
            max_length: question.max_length,
            pattern: question.pattern.clone(),
        },
    }
}

/// `[minValue ?? 1, maxValue ?? 5]`, with fractional bounds rounded inward.
pub fn rating_range(question: &Question) -> RangeInclusive<i64> {
    let min = question
        .min_value
        .map(|v| v.ceil() as i64)
        .unwrap_or(DEFAULT_RATING_MIN);
    let max = question
        .max_value
        .map(|v| v.floor() as i64)
        .unwrap_or(DEFAULT_RATING_MAX);
    min..=max
}

/// One respondent action on one field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldEdit {
    /// New contents of a text, textarea, email or date input.
    SetText(String),
    /// Raw contents of a number input; empty means unanswered.
    SetNumber(String),
    Select(String),
    Toggle(String),
    Rate(i64),
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnswerChange {
    Set(AnswerValue),
    Clear,
    Unchanged,
}

pub fn answer_after_edit(
    question: &Question,
    current: Option<&AnswerValue>,
    edit: FieldEdit,
) -> AnswerChange {
    match (&question.question_type, edit) {
        (
            QuestionType::Text | QuestionType::Textarea | QuestionType::Email | QuestionType::Date,
            FieldEdit::SetText(text),
        ) => AnswerChange::Set(AnswerValue::Text(text)),
        (QuestionType::Number, FieldEdit::SetNumber(raw)) => parse_number(&raw),
        (QuestionType::SingleChoice, FieldEdit::Select(option)) => {
            if question.options.contains(&option) {
                AnswerChange::Set(AnswerValue::Text(option))
            } else {
                AnswerChange::Unchanged
            }
        }
        (QuestionType::MultipleChoice, FieldEdit::Toggle(option)) => {
            let mut selected = current
                .and_then(AnswerValue::as_selections)
                .map(<[String]>::to_vec)
                .unwrap_or_default();
            if let Some(position) = selected.iter().position(|item| *item == option) {
                selected.remove(position);
            } else if question.options.contains(&option) {
                selected.push(option);
            } else {
                return AnswerChange::Unchanged;
            }
            AnswerChange::Set(AnswerValue::Selections(selected))
        }
        (QuestionType::Rating, FieldEdit::Rate(value)) => {
            if rating_range(question).contains(&value) {
                AnswerChange::Set(AnswerValue::Integer(value))
            } else {
                AnswerChange::Unchanged
            }
        }
        (question_type, edit) => {
            debug!(
                question_id = %question.id,
                %question_type,
                ?edit,
                "ignoring edit that does not match question type"
            );
            AnswerChange::Unchanged
        }
    }
}

fn parse_number(raw: &str) -> AnswerChange {
    let raw = raw.trim();
    if raw.is_empty() {
        return AnswerChange::Clear;
    }
    if let Ok(value) = raw.parse::<i64>() {
        return AnswerChange::Set(AnswerValue::Integer(value));
    }
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => AnswerChange::Set(AnswerValue::Number(value)),
        _ => AnswerChange::Clear,
    }
}

/// Returns the map after `edit`. When nothing changes the same map comes back
/// (see [`AnswerMap::same_as`]).
pub fn apply_edit(answers: &AnswerMap, question: &Question, edit: FieldEdit) -> AnswerMap {
    match answer_after_edit(question, answers.get(&question.id), edit) {
        AnswerChange::Set(value) => answers.with_answer(question.id.clone(), value),
        AnswerChange::Clear => answers.without(&question.id),
        AnswerChange::Unchanged => answers.clone(),
    }
}

#[cfg(test)]
#[path = "tests/form_tests.rs"]
mod tests;
