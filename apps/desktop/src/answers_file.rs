//! Answers supplied on the command line as a JSON object keyed by question id
//! or question code.

use anyhow::{anyhow, bail, Result};
use client_core::{form::rating_range, FieldEdit};
use serde_json::{Map, Value};
use shared::{
    domain::{QuestionId, QuestionType},
    protocol::{AnswerValue, Question},
};

pub fn parse(raw: &str) -> Result<Map<String, Value>> {
    match serde_json::from_str::<Value>(raw)? {
        Value::Object(map) => Ok(map),
        other => bail!("answers file must hold a JSON object, found {other}"),
    }
}

pub fn find_question<'a>(questions: &'a [Question], key: &str) -> Option<&'a Question> {
    questions
        .iter()
        .find(|q| q.id.as_str() == key)
        .or_else(|| questions.iter().find(|q| q.question_code == key))
}

/// The edits that turn `current` into `value` for `question`.
pub fn edits_for(
    question: &Question,
    current: Option<&AnswerValue>,
    value: &Value,
) -> Result<Vec<FieldEdit>> {
    let mismatch = || {
        anyhow!(
            "value {value} does not fit question {} ({})",
            question.id,
            question.question_type
        )
    };

    let edits = match &question.question_type {
        QuestionType::Text | QuestionType::Textarea | QuestionType::Email | QuestionType::Date => {
            vec![FieldEdit::SetText(value.as_str().ok_or_else(mismatch)?.to_string())]
        }
        QuestionType::Number => {
            let raw = match value {
                Value::Number(number) => number.to_string(),
                Value::String(text) => text.trim().to_string(),
                Value::Null => String::new(),
                _ => return Err(mismatch()),
            };
            if raw.is_empty() {
                match current {
                    Some(_) => vec![FieldEdit::SetNumber(raw)],
                    None => Vec::new(),
                }
            } else if raw.parse::<f64>().is_ok_and(f64::is_finite) {
                vec![FieldEdit::SetNumber(raw)]
            } else {
                return Err(mismatch());
            }
        }
        QuestionType::SingleChoice => {
            let option = value.as_str().ok_or_else(mismatch)?;
            if !question.options.iter().any(|known| known == option) {
                bail!("'{option}' is not an option of question {}", question.id);
            }
            vec![FieldEdit::Select(option.to_string())]
        }
        QuestionType::MultipleChoice => {
            let wanted = value
                .as_array()
                .ok_or_else(mismatch)?
                .iter()
                .map(|item| item.as_str().map(str::to_string).ok_or_else(mismatch))
                .collect::<Result<Vec<_>>>()?;
            let selected = current
                .and_then(AnswerValue::as_selections)
                .unwrap_or(&[]);
            if let Some(unknown) = wanted
                .iter()
                .find(|option| !question.options.contains(option) && !selected.contains(option))
            {
                bail!("'{unknown}' is not an option of question {}", question.id);
            }
            selected
                .iter()
                .filter(|option| !wanted.contains(*option))
                .chain(wanted.iter().filter(|option| !selected.contains(*option)))
                .map(|option| FieldEdit::Toggle(option.clone()))
                .collect()
        }
        QuestionType::Rating => {
            let rating = value.as_i64().ok_or_else(mismatch)?;
            if !rating_range(question).contains(&rating) {
                bail!("rating {rating} is out of range for question {}", question.id);
            }
            vec![FieldEdit::Rate(rating)]
        }
        QuestionType::Unknown(tag) => bail!("question {} has unsupported type '{tag}'", question.id),
    };
    Ok(edits)
}

/// Resolves every key in `answers` against `questions`.
pub fn resolve<'a>(
    questions: &'a [Question],
    answers: &'a Map<String, Value>,
) -> Result<Vec<(&'a Question, &'a Value)>> {
    answers
        .iter()
        .map(|(key, value)| {
            find_question(questions, key)
                .map(|question| (question, value))
                .ok_or_else(|| anyhow!("no question with id or code '{key}'"))
        })
        .collect()
}

/// Edits the session refused. A draft is still saved without them, but a
/// submit is final so it is refused outright.
pub fn check_rejected(submit: bool, rejected: &[(QuestionId, FieldEdit)]) -> Result<()> {
    if rejected.is_empty() {
        return Ok(());
    }
    let listed = rejected
        .iter()
        .map(|(question_id, edit)| format!("{question_id}: {edit:?}"))
        .collect::<Vec<_>>()
        .join(", ");
    if submit {
        bail!("not submitting, some answers were not accepted: {listed}");
    }
    tracing::warn!(%listed, "saving draft without answers that were not accepted");
    Ok(())
}
