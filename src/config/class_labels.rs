use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

/// Class names in model output order: `labels[i]` names output `i`.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassLabels(Vec<String>);

#[derive(Debug, Error, PartialEq)]
pub enum LabelsError {
    #[error("label list cannot be empty")]
    Empty,
    #[error("duplicate label: {0}")]
    Duplicate(String),
}

impl ClassLabels {
    pub fn new<I, S>(labels: I) -> Result<Self, LabelsError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        if labels.is_empty() {
            return Err(LabelsError::Empty);
        }

        let mut seen = HashSet::new();
        for label in &labels {
            if !seen.insert(label.as_str()) {
                return Err(LabelsError::Duplicate(label.clone()));
            }
        }
        Ok(ClassLabels(labels))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }
}

impl Default for ClassLabels {
    fn default() -> Self {
        ClassLabels(
            ["angry", "happy", "relaxed", "sad"]
                .into_iter()
                .map(String::from)
                .collect(),
        )
    }
}

impl<'de> Deserialize<'de> for ClassLabels {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_seq(ClassLabelsVisitor)
    }
}

struct ClassLabelsVisitor;

impl<'de> de::Visitor<'de> for ClassLabelsVisitor {
    type Value = ClassLabels;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a non-empty list of unique class names")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: de::SeqAccess<'de>,
    {
        let mut labels = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(label) = seq.next_element::<String>()? {
            labels.push(label);
        }
        ClassLabels::new(labels).map_err(de::Error::custom)
    }
}

impl Serialize for ClassLabels {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}
