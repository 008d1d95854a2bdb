//! User choices collected while the wizard runs
//!
//! Pages record what the user picked; later pages (and the processes they
//! create) read it back.

use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Flag(bool),
    Choice(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Answers {
    values: BTreeMap<String, Answer>,
}

impl Answers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_flag(&mut self, key: impl Into<String>, value: bool) {
        self.values.insert(key.into(), Answer::Flag(value));
    }

    /// Flag value, `false` when unset or not a flag
    pub fn flag(&self, key: &str) -> bool {
        matches!(self.values.get(key), Some(Answer::Flag(true)))
    }

    pub fn set_choice(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), Answer::Choice(value.into()));
    }

    pub fn choice(&self, key: &str) -> Option<&str> {
        match self.values.get(key) {
            Some(Answer::Choice(value)) => Some(value),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Answer> {
        self.values.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}
