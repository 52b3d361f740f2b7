//! LLM oracle - service layer
//!
//! [`AnswerOracle`] backed by an OpenAI-compatible chat endpoint.
//!
//! ## Stack
//! - `async-openai` for the API calls
//! - custom endpoint and model (OpenAI, xAI, Azure, ... anything speaking
//!   the chat-completions protocol)

use std::sync::Arc;

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult, OracleError};
use crate::models::{ApplicationProfile, JobCandidate, ProfileSection};
use crate::services::documents::{DocumentChoices, DocumentSelection};
use crate::services::oracle::{AnswerOracle, JobPostingSummary};

const SYSTEM_PROMPT: &str = "You fill in job applications on behalf of a candidate. \
    Answer in the first person, truthfully according to the candidate profile, \
    and as briefly as the question allows. Never add explanations.";

/// LLM oracle
///
/// Responsibilities:
/// - build prompts from the profile, the posting and the question
/// - call the chat-completions API
/// - normalise raw completions (quotes, list splitting, JSON extraction)
pub struct LlmOracle {
    client: Client<OpenAIConfig>,
    model_name: String,
    temperature: f32,
    profile: Arc<ApplicationProfile>,
    documents: DocumentChoices,
}

impl LlmOracle {
    pub fn new(config: &Config, profile: Arc<ApplicationProfile>) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        Self {
            client: Client::with_config(openai_config),
            model_name: config.llm_model_name.clone(),
            temperature: config.llm_temperature,
            profile,
            documents: DocumentChoices::default(),
        }
    }

    /// Resume / cover letter names `parse_job_posting` may pick from
    pub fn with_document_choices(mut self, documents: DocumentChoices) -> Self {
        self.documents = documents;
        self
    }

    /// Base chat call every prompt goes through
    pub async fn send_to_llm(&self, user_message: &str, system_message: Option<&str>) -> AppResult<String> {
        debug!(
            "Calling LLM (model: {}, prompt: {} chars)",
            self.model_name,
            user_message.len()
        );

        let mut messages = Vec::new();
        if let Some(sys_msg) = system_message {
            let system_msg = ChatCompletionRequestSystemMessageArgs::default()
                .content(sys_msg)
                .build()?;
            messages.push(ChatCompletionRequestMessage::System(system_msg));
        }
        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(user_message)
            .build()?;
        messages.push(ChatCompletionRequestMessage::User(user_msg));

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(messages)
            .temperature(self.temperature)
            .max_tokens(512u32)
            .build()?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("LLM API call failed: {}", e);
            AppError::llm_api_failed(&self.model_name, e.to_string())
        })?;

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| OracleError::EmptyContent {
                model: self.model_name.clone(),
            })?;

        Ok(content.trim().to_string())
    }

    fn context(&self, job: &JobCandidate) -> String {
        format!(
            "# Candidate profile\n{}\n\n# Job posting\n{}",
            self.profile.as_prompt_context(),
            job.formatted_job_information()
        )
    }

    async fn route_section(&self, question: &str) -> AppResult<ProfileSection> {
        let sections = ProfileSection::ALL
            .iter()
            .map(|s| format!("- {}", s.title()))
            .collect::<Vec<_>>()
            .join("\n");
        let prompt = format!(
            "An application form asks: '{question}'.\n\
             Which section of the candidate profile is most relevant? \
             Respond with exactly one of:\n{sections}\n\
             Reply with the section name only."
        );
        let label = self.send_to_llm(&prompt, None).await?;
        ProfileSection::from_label(&label).ok_or_else(|| OracleError::UnknownSection(label).into())
    }
}

#[async_trait]
impl AnswerOracle for LlmOracle {
    async fn answer_free_text(&self, job: &JobCandidate, question: &str) -> AppResult<String> {
        let prompt = format!(
            "{}\n\n# Question\n{question}\n\nWrite the answer to put in the form field.",
            self.context(job)
        );
        let answer = self.send_to_llm(&prompt, Some(SYSTEM_PROMPT)).await?;
        Ok(clean_choice(&answer))
    }

    async fn answer_from_options(&self, job: &JobCandidate, question: &str, options: &[String]) -> AppResult<String> {
        let prompt = format!(
            "{}\n\n# Question\n{question}\n\n# Options\n{}\n\n\
             Reply with exactly one option, copied verbatim.",
            self.context(job),
            bullet_list(options)
        );
        let answer = self.send_to_llm(&prompt, Some(SYSTEM_PROMPT)).await?;
        Ok(clean_choice(&answer))
    }

    async fn classify_and_extract(
        &self,
        _job: &JobCandidate,
        question: &str,
        options: &[String],
    ) -> AppResult<Vec<String>> {
        let section = self.route_section(question).await?;
        debug!("Question routed to {}", section);

        let mut prompt = format!(
            "# {}\n{}\n\n# Question\n{question}\n\n",
            section.title(),
            self.profile.section_text(section)
        );
        if options.is_empty() {
            prompt.push_str("Answer using only the section above.");
        } else {
            prompt.push_str(&format!(
                "# Options\n{}\n\nReply with every applicable option, copied verbatim and \
                 separated by commas. Reply with nothing if none apply.",
                bullet_list(options)
            ));
        }
        let answer = self.send_to_llm(&prompt, Some(SYSTEM_PROMPT)).await?;
        Ok(split_answers(&answer))
    }

    async fn parse_job_posting(&self, job: &JobCandidate) -> AppResult<JobPostingSummary> {
        let prompt = format!(
            "# Job posting\n{}\n\n\
             Available resumes: {:?}\nAvailable cover letters: {:?}\n\n\
             Reply with a JSON object only: \
             {{\"normalized_title\": \"<plain job title>\", \"resume\": \"<one resume>\", \
             \"cover_letter\": \"<one cover letter>\"}}",
            job.formatted_job_information(),
            self.documents.resumes,
            self.documents.cover_letters,
        );
        let response = self.send_to_llm(&prompt, None).await?;
        Ok(parse_posting_response(&response, &job.title, &self.documents))
    }
}

// ========== response parsing ==========

fn bullet_list(items: &[String]) -> String {
    items.iter().map(|o| format!("- {}", o)).collect::<Vec<_>>().join("\n")
}

/// Strip wrapping quotes / markdown emphasis / a trailing period
pub fn clean_choice(raw: &str) -> String {
    raw.trim()
        .trim_matches(|c: char| c == '"' || c == '\'' || c == '*' || c == '`')
        .trim_end_matches('.')
        .trim()
        .to_string()
}

/// Comma-separated multi-select answer
pub fn split_answers(raw: &str) -> Vec<String> {
    raw.split([',', '\n'])
        .map(|s| clean_choice(s.trim_start_matches('-')))
        .filter(|s| !s.is_empty())
        .collect()
}

#[derive(Deserialize)]
struct PostingResponse {
    normalized_title: Option<String>,
    resume: Option<String>,
    cover_letter: Option<String>,
}

/// Unparseable or out-of-range fields fall back to defaults
pub fn parse_posting_response(raw: &str, fallback_title: &str, choices: &DocumentChoices) -> JobPostingSummary {
    let json = match (raw.find('{'), raw.rfind('}')) {
        (Some(start), Some(end)) if start < end => &raw[start..=end],
        _ => raw,
    };
    let parsed = serde_json::from_str::<PostingResponse>(json).unwrap_or_else(|e| {
        warn!("⚠️ Unparseable posting summary ({}), using defaults", e);
        PostingResponse {
            normalized_title: None,
            resume: None,
            cover_letter: None,
        }
    });

    let defaults = DocumentSelection::default();
    let pick = |wanted: Option<String>, available: &[String], default: String| -> String {
        match wanted {
            Some(w) if available.is_empty() || available.contains(&w) => w,
            _ => available.first().cloned().unwrap_or(default),
        }
    };

    JobPostingSummary {
        normalized_title: parsed
            .normalized_title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| fallback_title.to_string()),
        documents: DocumentSelection {
            resume: pick(parsed.resume, &choices.resumes, defaults.resume),
            cover_letter: pick(parsed.cover_letter, &choices.cover_letters, defaults.cover_letter),
        },
    }
}
