//! Application profile
//!
//! Static personal / professional data loaded once at startup and read-only
//! for the rest of the run.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonalInformation {
    pub name: String,
    pub surname: String,
    pub email: String,
    pub phone: String,
    pub city: String,
    pub country: String,
    pub linkedin: String,
    pub github: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EducationDetail {
    pub education_level: String,
    pub institution: String,
    pub field_of_study: String,
    pub final_evaluation_grade: String,
    pub year_of_completion: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperienceDetail {
    pub position: String,
    pub company: String,
    pub employment_period: String,
    pub location: String,
    pub industry: String,
    pub key_responsibilities: Vec<String>,
    pub skills_acquired: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Language {
    pub language: String,
    pub proficiency: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VisaStatus {
    pub visa_situation: String,
    pub visa_type: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Availability {
    pub notice_period: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SalaryExpectations {
    pub salary_range: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkPreferences {
    pub remote_work: String,
    pub in_person_work: String,
    pub open_to_relocation: String,
    pub willing_to_complete_assessments: String,
    pub willing_to_undergo_drug_tests: String,
    pub willing_to_undergo_background_checks: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SelfIdentification {
    pub gender: String,
    pub pronouns: String,
    pub disability: String,
    pub ethnicity: String,
}

/// Years of experience per role, e.g. `{ role = "backend engineer", years = "4" }`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleExperience {
    pub role: String,
    pub years: String,
}

/// Application profile
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationProfile {
    pub personal_information: PersonalInformation,
    pub education_details: Vec<EducationDetail>,
    pub experience_details: Vec<ExperienceDetail>,
    pub languages: Vec<Language>,
    pub visa_status: VisaStatus,
    pub availability: Availability,
    pub salary_expectations: SalaryExpectations,
    pub work_preferences: WorkPreferences,
    pub develop_roles: Vec<RoleExperience>,
    pub programming_languages: Vec<String>,
    pub self_identification: SelfIdentification,
    pub interests: Vec<String>,
}

/// Profile section a question can be routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileSection {
    PersonalInformation,
    Education,
    ExperienceDetails,
    Languages,
    VisaStatus,
    Availability,
    SalaryExpectations,
    WorkPreferences,
    DevelopRoles,
    ProgrammingLanguages,
    SelfIdentification,
    Interests,
}

/// Normalized oracle label -> section
static SECTION_ALIASES: phf::Map<&'static str, ProfileSection> = phf::phf_map! {
    "personal information" => ProfileSection::PersonalInformation,
    "personal info" => ProfileSection::PersonalInformation,
    "education" => ProfileSection::Education,
    "education details" => ProfileSection::Education,
    "experience details" => ProfileSection::ExperienceDetails,
    "experience" => ProfileSection::ExperienceDetails,
    "languages" => ProfileSection::Languages,
    "language" => ProfileSection::Languages,
    "visa status" => ProfileSection::VisaStatus,
    "visa" => ProfileSection::VisaStatus,
    "work authorization" => ProfileSection::VisaStatus,
    "availability" => ProfileSection::Availability,
    "salary expectations" => ProfileSection::SalaryExpectations,
    "salary" => ProfileSection::SalaryExpectations,
    "work preferences" => ProfileSection::WorkPreferences,
    "develop roles" => ProfileSection::DevelopRoles,
    "develop role" => ProfileSection::DevelopRoles,
    "programming languages" => ProfileSection::ProgrammingLanguages,
    "self identification" => ProfileSection::SelfIdentification,
    "interests" => ProfileSection::Interests,
};

impl ProfileSection {
    pub const ALL: [ProfileSection; 12] = [
        ProfileSection::PersonalInformation,
        ProfileSection::Education,
        ProfileSection::ExperienceDetails,
        ProfileSection::Languages,
        ProfileSection::VisaStatus,
        ProfileSection::Availability,
        ProfileSection::SalaryExpectations,
        ProfileSection::WorkPreferences,
        ProfileSection::DevelopRoles,
        ProfileSection::ProgrammingLanguages,
        ProfileSection::SelfIdentification,
        ProfileSection::Interests,
    ];

    pub fn title(self) -> &'static str {
        match self {
            ProfileSection::PersonalInformation => "Personal Information",
            ProfileSection::Education => "Education",
            ProfileSection::ExperienceDetails => "Experience Details",
            ProfileSection::Languages => "Languages",
            ProfileSection::VisaStatus => "Visa Status",
            ProfileSection::Availability => "Availability",
            ProfileSection::SalaryExpectations => "Salary Expectations",
            ProfileSection::WorkPreferences => "Work Preferences",
            ProfileSection::DevelopRoles => "Develop Roles",
            ProfileSection::ProgrammingLanguages => "Programming Languages",
            ProfileSection::SelfIdentification => "Self Identification",
            ProfileSection::Interests => "Interests",
        }
    }

    /// Parse an oracle label such as `"Visa Status"`, `"visa_status"` or
    /// `"**Salary Expectations**"`.
    pub fn from_label(label: &str) -> Option<Self> {
        let normalized: String = label
            .trim()
            .trim_matches(|c: char| c == '*' || c == '"' || c == '\'' || c == '.')
            .to_lowercase()
            .replace(['_', '-'], " ");
        let normalized = normalized.split_whitespace().collect::<Vec<_>>().join(" ");
        SECTION_ALIASES.get(normalized.as_str()).copied()
    }
}

impl Display for ProfileSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.title())
    }
}

impl ApplicationProfile {
    /// Pretty JSON of one section, used as prompt context.
    pub fn section_text(&self, section: ProfileSection) -> String {
        let value = match section {
            ProfileSection::PersonalInformation => serde_json::to_value(&self.personal_information),
            ProfileSection::Education => serde_json::to_value(&self.education_details),
            ProfileSection::ExperienceDetails => serde_json::to_value(&self.experience_details),
            ProfileSection::Languages => serde_json::to_value(&self.languages),
            ProfileSection::VisaStatus => serde_json::to_value(&self.visa_status),
            ProfileSection::Availability => serde_json::to_value(&self.availability),
            ProfileSection::SalaryExpectations => serde_json::to_value(&self.salary_expectations),
            ProfileSection::WorkPreferences => serde_json::to_value(&self.work_preferences),
            ProfileSection::DevelopRoles => serde_json::to_value(&self.develop_roles),
            ProfileSection::ProgrammingLanguages => serde_json::to_value(&self.programming_languages),
            ProfileSection::SelfIdentification => serde_json::to_value(&self.self_identification),
            ProfileSection::Interests => serde_json::to_value(&self.interests),
        };
        value
            .and_then(|v| serde_json::to_string_pretty(&v))
            .unwrap_or_default()
    }

    /// Whole profile as prompt context.
    pub fn as_prompt_context(&self) -> String {
        ProfileSection::ALL
            .iter()
            .map(|s| format!("## {}\n{}", s.title(), self.section_text(*s)))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}
