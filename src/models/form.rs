//! Form field model, scoped to a single page visit

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::infrastructure::ElementHandle;

pub const UNKNOWN_QUESTION: &str = "Unknown question";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Textarea,
    Dropdown,
    RadioGroup,
    CheckboxGroup,
    FileUpload,
}

impl FieldKind {
    pub fn is_free_text(self) -> bool {
        matches!(self, FieldKind::Text | FieldKind::Textarea)
    }

    pub fn has_options(self) -> bool {
        matches!(
            self,
            FieldKind::Dropdown | FieldKind::RadioGroup | FieldKind::CheckboxGroup
        )
    }
}

impl Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FieldKind::Text => "text",
            FieldKind::Textarea => "textarea",
            FieldKind::Dropdown => "dropdown",
            FieldKind::RadioGroup => "radio",
            FieldKind::CheckboxGroup => "checkbox",
            FieldKind::FileUpload => "file",
        };
        f.write_str(name)
    }
}

/// One selectable choice. `control` is what gets clicked (radio/checkbox input);
/// dropdown options are selected by label through the select element instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldOption {
    pub label: String,
    pub control: Option<ElementHandle>,
}

/// A classified form field
#[derive(Debug, Clone)]
pub struct FormField {
    pub kind: FieldKind,
    pub label: String,
    /// Input / textarea / select / file input; the section itself when an
    /// upload affordance has no file input behind it
    pub control: ElementHandle,
    pub options: Vec<FieldOption>,
    /// Full visible text of the enclosing section
    pub section_text: String,
    /// Answer found in the advisory cache, attached during resolution
    pub cached_answer: Option<Vec<String>>,
}

impl FormField {
    pub fn option_labels(&self) -> Vec<String> {
        self.options.iter().map(|o| o.label.clone()).collect()
    }
}
