//! Form classifier - workflow layer
//!
//! Read-only inspection of the current application page. Every section of
//! the form is scanned for controls and each control group is classified by
//! evidence, strongest first:
//! 1. file input or an upload button → file upload
//! 2. select with more than one real option → dropdown
//! 3. radio inputs sharing a name → radio group
//! 4. checkbox inputs → checkbox group
//! 5. text-like input / textarea → text
//!
//! Label extraction never fails; the worst case is [`UNKNOWN_QUESTION`].

use tracing::debug;

use crate::error::AppResult;
use crate::infrastructure::{ElementHandle, UiSession};
use crate::models::{FieldKind, FieldOption, FormField, UNKNOWN_QUESTION};
use crate::platform::{BoardProfile, LABEL_SELECTORS, UPLOAD_WORDS};

/// Input types that take free text
const TEXT_INPUT_TYPES: &[&str] = &["", "text", "email", "tel", "number", "url", "search", "date"];

/// Buttons, or labels bound to a (usually hidden) input
const UPLOAD_AFFORDANCES: &str = "button, [role='button'], label[for]";

pub struct FormClassifier {
    board: &'static BoardProfile,
}

impl FormClassifier {
    pub fn new(board: &'static BoardProfile) -> Self {
        Self { board }
    }

    /// Classify every field on the page, in document order, each control once
    pub async fn classify_page(&self, session: &UiSession, surface: Option<ElementHandle>) -> AppResult<Vec<FormField>> {
        let sections = self.sections(session, surface).await?;
        debug!("Classifying {} form section(s)", sections.len());

        let mut fields: Vec<FormField> = Vec::new();
        for section in sections {
            for field in self.classify_section(session, section).await? {
                if fields.iter().all(|f| f.control != field.control) {
                    fields.push(field);
                }
            }
        }
        Ok(fields)
    }

    /// Form sections inside the surface, capped per board
    async fn sections(&self, session: &UiSession, surface: Option<ElementHandle>) -> AppResult<Vec<ElementHandle>> {
        let container = match session.find_first(self.board.form_containers, surface).await? {
            Some((container, _)) => Some(container),
            None => surface,
        };

        let mut sections = Vec::new();
        for selector in self.board.form_sections {
            for section in session.find_all(selector, container).await? {
                if !sections.contains(&section) {
                    sections.push(section);
                }
            }
        }

        if sections.is_empty() {
            // unknown layout: the whole form is one section
            let whole = match container {
                Some(container) => Some(container),
                None => session.find("form, body", None).await?,
            };
            sections.extend(whole);
        }

        if sections.len() > self.board.section_cap {
            debug!("Capping {} sections at {}", sections.len(), self.board.section_cap);
            sections.truncate(self.board.section_cap);
        }
        Ok(sections)
    }

    pub async fn classify_section(&self, session: &UiSession, section: ElementHandle) -> AppResult<Vec<FormField>> {
        let section_text = session.text(section).await?;

        // ========== 1. file upload ==========
        if let Some(input) = session.find("input[type='file']", Some(section)).await? {
            let label = self.question_label(session, section, &section_text, &[]).await?;
            return Ok(vec![field(FieldKind::FileUpload, label, input, Vec::new(), &section_text)]);
        }
        if self.has_upload_affordance(session, section).await? {
            let label = self.question_label(session, section, &section_text, &[]).await?;
            return Ok(vec![field(FieldKind::FileUpload, label, section, Vec::new(), &section_text)]);
        }

        let mut groups: Vec<(FieldKind, ElementHandle, Vec<FieldOption>)> = Vec::new();

        // ========== 2. dropdowns ==========
        for select in session.find_all("select", Some(section)).await? {
            let options = self.select_options(session, select).await?;
            if options.len() > 1 {
                groups.push((FieldKind::Dropdown, select, options));
            }
        }

        // ========== 3. radio groups ==========
        let radios = session.find_all("input[type='radio']", Some(section)).await?;
        for (first, options) in self.group_by_name(session, section, radios).await? {
            groups.push((FieldKind::RadioGroup, first, options));
        }

        // ========== 4. checkbox group ==========
        let checkboxes = session.find_all("input[type='checkbox']", Some(section)).await?;
        if let Some(first) = checkboxes.first().copied() {
            let mut options = Vec::with_capacity(checkboxes.len());
            for (i, checkbox) in checkboxes.iter().enumerate() {
                let label = self.option_label(session, section, *checkbox, i).await?;
                options.push(FieldOption {
                    label,
                    control: Some(*checkbox),
                });
            }
            groups.push((FieldKind::CheckboxGroup, first, options));
        }

        // ========== 5. free text ==========
        for textarea in session.find_all("textarea", Some(section)).await? {
            groups.push((FieldKind::Textarea, textarea, Vec::new()));
        }
        for input in session.find_all("input", Some(section)).await? {
            let kind = session
                .attribute(input, "type")
                .await?
                .unwrap_or_default()
                .to_lowercase();
            if TEXT_INPUT_TYPES.contains(&kind.as_str()) {
                groups.push((FieldKind::Text, input, Vec::new()));
            }
        }

        let option_labels: Vec<String> = groups
            .iter()
            .flat_map(|(_, _, options)| options.iter().map(|o| o.label.clone()))
            .collect();
        let section_label = self
            .question_label(session, section, &section_text, &option_labels)
            .await?;

        let several = groups.len() > 1;
        let mut fields = Vec::with_capacity(groups.len());
        for (kind, control, options) in groups {
            let label = if several && !kind.has_options() {
                self.control_label(session, section, control)
                    .await?
                    .unwrap_or_else(|| section_label.clone())
            } else {
                section_label.clone()
            };
            fields.push(field(kind, label, control, options, &section_text));
        }
        Ok(fields)
    }

    // ========== evidence helpers ==========

    async fn has_upload_affordance(&self, session: &UiSession, section: ElementHandle) -> AppResult<bool> {
        for element in session.find_all(UPLOAD_AFFORDANCES, Some(section)).await? {
            let text = session.text(element).await?.to_lowercase();
            if UPLOAD_WORDS.iter().any(|w| text.contains(w)) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Options with both a value and visible text; placeholders drop out
    async fn select_options(&self, session: &UiSession, select: ElementHandle) -> AppResult<Vec<FieldOption>> {
        let mut options = Vec::new();
        for option in session.find_all("option", Some(select)).await? {
            let label = session.text(option).await?;
            let value = session.attribute(option, "value").await?.unwrap_or_else(|| label.clone());
            if !label.is_empty() && !value.trim().is_empty() && !is_placeholder(&label) {
                options.push(FieldOption { label, control: None });
            }
        }
        Ok(options)
    }

    /// `(first radio, options)` per `name`, in document order
    async fn group_by_name(
        &self,
        session: &UiSession,
        section: ElementHandle,
        radios: Vec<ElementHandle>,
    ) -> AppResult<Vec<(ElementHandle, Vec<FieldOption>)>> {
        let mut groups: Vec<(String, ElementHandle, Vec<FieldOption>)> = Vec::new();
        for (i, radio) in radios.into_iter().enumerate() {
            let name = session.attribute(radio, "name").await?.unwrap_or_default();
            let label = self.option_label(session, section, radio, i).await?;
            let option = FieldOption {
                label,
                control: Some(radio),
            };
            match groups.iter_mut().find(|(n, _, _)| *n == name) {
                Some((_, _, options)) => options.push(option),
                None => groups.push((name, radio, vec![option])),
            }
        }
        Ok(groups
            .into_iter()
            .map(|(_, first, options)| (first, options))
            .collect())
    }

    /// aria-label, then `label[for=id]`, then the value attribute
    async fn option_label(
        &self,
        session: &UiSession,
        section: ElementHandle,
        input: ElementHandle,
        index: usize,
    ) -> AppResult<String> {
        if let Some(label) = self.control_label(session, section, input).await? {
            return Ok(label);
        }
        if let Some(value) = session.attribute(input, "value").await? {
            if !value.trim().is_empty() && value != "on" {
                return Ok(value.trim().to_string());
            }
        }
        Ok(format!("Option {}", index + 1))
    }

    async fn control_label(
        &self,
        session: &UiSession,
        section: ElementHandle,
        control: ElementHandle,
    ) -> AppResult<Option<String>> {
        if let Some(aria) = session.attribute(control, "aria-label").await? {
            if !aria.trim().is_empty() {
                return Ok(Some(clean_label(&aria)));
            }
        }
        if let Some(id) = session.attribute(control, "id").await?.filter(|id| !id.is_empty()) {
            let selector = format!("label[for=\"{}\"]", id.replace('"', "\\\""));
            if let Some(label) = session.find(&selector, Some(section)).await? {
                let text = clean_label(&session.text(label).await?);
                if !text.is_empty() {
                    return Ok(Some(text));
                }
            }
        }
        if let Some(placeholder) = session.attribute(control, "placeholder").await? {
            if !placeholder.trim().is_empty() {
                return Ok(Some(clean_label(&placeholder)));
            }
        }
        Ok(None)
    }

    /// Label elements first, then the whole section text
    async fn question_label(
        &self,
        session: &UiSession,
        section: ElementHandle,
        section_text: &str,
        option_labels: &[String],
    ) -> AppResult<String> {
        for selector in LABEL_SELECTORS {
            for element in session.find_all(selector, Some(section)).await? {
                let text = clean_label(&session.text(element).await?);
                if text.chars().count() > 3 && !option_labels.iter().any(|o| o.eq_ignore_ascii_case(&text)) {
                    return Ok(text);
                }
            }
        }

        let text = section_text.split_whitespace().collect::<Vec<_>>().join(" ");
        if text.is_empty() {
            Ok(UNKNOWN_QUESTION.to_string())
        } else {
            Ok(text)
        }
    }
}

fn field(
    kind: FieldKind,
    label: String,
    control: ElementHandle,
    options: Vec<FieldOption>,
    section_text: &str,
) -> FormField {
    FormField {
        kind,
        label,
        control,
        options,
        section_text: section_text.to_string(),
        cached_answer: None,
    }
}

/// First non-empty line, without required markers. Some boards render the
/// label twice (visible + screen-reader copy) on separate lines.
pub fn clean_label(raw: &str) -> String {
    let line = raw.lines().map(str::trim).find(|l| !l.is_empty()).unwrap_or("");
    line.trim_end_matches(|c: char| c == '*' || c.is_whitespace())
        .trim()
        .to_string()
}

fn is_placeholder(label: &str) -> bool {
    let lower = label.trim().to_lowercase();
    lower == "select an option" || lower == "please select" || lower.starts_with("-- ")
}
