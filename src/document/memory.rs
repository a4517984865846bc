//! In-memory document model
//! Author: kartik4091
//!
//! Paragraphs of runs per area plus ordered properties. Serialized as JSON or
//! YAML, it is the interchange format of the CLI and batch driver.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{AreaKind, DocumentAccess, PropertyStore, TextContainer};
use crate::editor::FragmentInstruction;
use crate::error::{DocumentError, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Run {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
}

impl Run {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paragraph {
    pub runs: Vec<Run>,
}

impl Paragraph {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            runs: vec![Run::new(text)],
        }
    }

    pub fn from_runs<I, S>(runs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            runs: runs.into_iter().map(Run::new).collect(),
        }
    }

    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub read_only: bool,
}

impl Property {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            read_only: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InMemoryDocument {
    pub body: Vec<Paragraph>,
    pub headers: Vec<Paragraph>,
    pub footers: Vec<Paragraph>,
    pub text_boxes: Vec<Paragraph>,
    pub notes: Vec<Paragraph>,
    pub properties: Vec<Property>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub locked_areas: Vec<AreaKind>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub properties_locked: bool,
    #[serde(skip)]
    unreadable: bool,
}

impl InMemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single body paragraph holding `text` in one run.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            body: vec![Paragraph::from_text(text)],
            ..Self::default()
        }
    }

    /// Loads a document from JSON or YAML, chosen by extension; unknown
    /// extensions try JSON first, then YAML.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let document = match extension(path).as_deref() {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content)?,
            Some("json") => serde_json::from_str(&content)?,
            _ => match serde_json::from_str(&content) {
                Ok(document) => document,
                Err(_) => serde_yaml::from_str(&content)?,
            },
        };
        debug!(path = %path.display(), "Loaded document");
        Ok(document)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = match extension(path).as_deref() {
            Some("yaml") | Some("yml") => serde_yaml::to_string(self)?,
            _ => serde_json::to_string_pretty(self)?,
        };
        fs::write(path, content)?;
        Ok(())
    }

    /// Makes every accessor fail as if the underlying file were gone.
    pub fn mark_unreadable(&mut self) {
        self.unreadable = true;
    }

    pub fn paragraphs(&self, area: AreaKind) -> &[Paragraph] {
        match area {
            AreaKind::Body => &self.body,
            AreaKind::Headers => &self.headers,
            AreaKind::Footers => &self.footers,
            AreaKind::TextBoxes => &self.text_boxes,
            AreaKind::Notes => &self.notes,
        }
    }

    /// Paragraph texts of `area` joined by newlines.
    pub fn area_text(&self, area: AreaKind) -> String {
        self.paragraphs(area)
            .iter()
            .map(Paragraph::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.value.as_str())
    }

    fn check_readable(&self) -> std::result::Result<(), DocumentError> {
        if self.unreadable {
            return Err(DocumentError::Unreadable("document is no longer available".into()));
        }
        Ok(())
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

impl TextContainer for Vec<Paragraph> {
    fn block_count(&self) -> usize {
        self.len()
    }

    fn fragments(&self, block: usize) -> Option<Vec<String>> {
        self.get(block)
            .map(|p| p.runs.iter().map(|r| r.text.clone()).collect())
    }

    fn apply_instructions(
        &mut self,
        block: usize,
        instructions: &[FragmentInstruction],
    ) -> std::result::Result<(), DocumentError> {
        let paragraph = self.get_mut(block).ok_or_else(|| DocumentError::ItemUpdate {
            item: format!("paragraph {block}"),
            reason: "no such paragraph".into(),
        })?;
        if let Some(bad) = instructions.iter().find(|i| i.fragment() >= paragraph.runs.len()) {
            return Err(DocumentError::ItemUpdate {
                item: format!("paragraph {block}"),
                reason: format!("no run {}", bad.fragment()),
            });
        }

        let mut removals = Vec::new();
        for instruction in instructions {
            match instruction {
                FragmentInstruction::Update { fragment, content } => {
                    paragraph.runs[*fragment].text = content.clone();
                }
                FragmentInstruction::Remove { fragment } => removals.push(*fragment),
            }
        }
        removals.sort_unstable_by(|a, b| b.cmp(a));
        removals.dedup();
        for fragment in removals {
            paragraph.runs.remove(fragment);
        }
        Ok(())
    }
}

impl PropertyStore for Vec<Property> {
    fn list_text_properties(&self) -> Vec<(String, String)> {
        self.iter().map(|p| (p.name.clone(), p.value.clone())).collect()
    }

    fn set_text_property(&mut self, key: &str, value: &str) -> std::result::Result<(), DocumentError> {
        let property = self
            .iter_mut()
            .find(|p| p.name == key)
            .ok_or_else(|| DocumentError::ItemUpdate {
                item: format!("property {key}"),
                reason: "no such property".into(),
            })?;
        if property.read_only {
            return Err(DocumentError::ItemUpdate {
                item: format!("property {key}"),
                reason: "read-only".into(),
            });
        }
        property.value = value.to_string();
        Ok(())
    }
}

impl DocumentAccess for InMemoryDocument {
    fn text_area(&mut self, area: AreaKind) -> std::result::Result<&mut dyn TextContainer, DocumentError> {
        self.check_readable()?;
        if self.locked_areas.contains(&area) {
            return Err(DocumentError::AreaUnavailable {
                area: area.to_string(),
                reason: "area is locked".into(),
            });
        }
        let paragraphs = match area {
            AreaKind::Body => &mut self.body,
            AreaKind::Headers => &mut self.headers,
            AreaKind::Footers => &mut self.footers,
            AreaKind::TextBoxes => &mut self.text_boxes,
            AreaKind::Notes => &mut self.notes,
        };
        Ok(paragraphs)
    }

    fn properties(&mut self) -> std::result::Result<&mut dyn PropertyStore, DocumentError> {
        self.check_readable()?;
        if self.properties_locked {
            return Err(DocumentError::AreaUnavailable {
                area: "Properties".into(),
                reason: "property store is locked".into(),
            });
        }
        Ok(&mut self.properties)
    }
}
