use std::{collections::BTreeMap, sync::Arc};

use shared::{
    domain::QuestionId,
    protocol::{AnswerEntry, AnswerValue},
};

/// Persistent answer map. Edits return a new map and leave `self` untouched,
/// so a snapshot taken for an in-flight save never sees later edits.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnswerMap(Arc<BTreeMap<QuestionId, AnswerValue>>);

impl AnswerMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, question_id: &QuestionId) -> Option<&AnswerValue> {
        self.0.get(question_id)
    }

    pub fn contains(&self, question_id: &QuestionId) -> bool {
        self.0.contains_key(question_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&QuestionId, &AnswerValue)> {
        self.0.iter()
    }

    pub fn with_answer(&self, question_id: QuestionId, value: AnswerValue) -> Self {
        let mut next = (*self.0).clone();
        next.insert(question_id, value);
        Self(Arc::new(next))
    }

    pub fn without(&self, question_id: &QuestionId) -> Self {
        if !self.contains(question_id) {
            return self.clone();
        }
        let mut next = (*self.0).clone();
        next.remove(question_id);
        Self(Arc::new(next))
    }

    /// True when both handles share the same underlying map.
    pub fn same_as(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn to_entries(&self) -> Vec<AnswerEntry> {
        self.0
            .iter()
            .map(|(question_id, value)| AnswerEntry {
                question_id: question_id.clone(),
                value: value.clone(),
            })
            .collect()
    }
}

impl From<BTreeMap<QuestionId, AnswerValue>> for AnswerMap {
    fn from(value: BTreeMap<QuestionId, AnswerValue>) -> Self {
        Self(Arc::new(value))
    }
}

impl FromIterator<(QuestionId, AnswerValue)> for AnswerMap {
    fn from_iter<T: IntoIterator<Item = (QuestionId, AnswerValue)>>(iter: T) -> Self {
        Self(Arc::new(iter.into_iter().collect()))
    }
}
