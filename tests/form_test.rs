mod common;

use std::sync::Arc;
use std::time::Duration;

use common::*;
use easy_apply::models::{FieldKind, JobCandidate, OutcomeKind};
use easy_apply::platform::Board;
use easy_apply::services::{AnswerCache, GeneratedDocuments};
use easy_apply::workflow::{ApplicationCtx, ApplicationFlow, FlowSettings, FormClassifier};

fn settings() -> FlowSettings {
    FlowSettings {
        max_form_pages: 3,
        surface_timeout: Duration::from_millis(200),
        skip_apply: false,
    }
}

fn candidate(id: &str) -> JobCandidate {
    JobCandidate::new(Board::LinkedIn, "Rust Engineer", "Acme", "Remote", job_url(id))
}

/// Posting `id` whose Easy Apply modal holds `sections` and an inert submit
fn posting(id: &str, sections: Vec<El>) -> Arc<FakeDriver> {
    let key = format!("form-{}", id);
    let driver = Arc::new(FakeDriver::new(&format!("{}/jobs/search/", BASE)));
    driver
        .page(job_url(id), detail_page(Action::Render(key.clone())))
        .page(key, modal(sections, inert_submit()));
    driver
}

async fn apply(
    driver: &Arc<FakeDriver>,
    id: &str,
    oracle: Arc<ScriptedOracle>,
    documents: GeneratedDocuments,
    cache: AnswerCache,
) -> OutcomeKind {
    let session = session(driver.clone());
    let mut flow = ApplicationFlow::new(
        Board::LinkedIn.profile(),
        oracle,
        Arc::new(FixedDocuments { documents }),
        cache,
        settings(),
    );
    let job = candidate(id);
    let ctx = ApplicationCtx::new(1, &job);
    flow.run(&session, job, &ctx).await.unwrap().outcome.kind
}

#[tokio::test]
async fn strongest_evidence_decides_the_field_kind() {
    let url = format!("{}/apply/form", BASE);
    let mixed = section()
        .child(el("legend").text("Work preferences"))
        .child(el("input").id("remote-yes").attr("type", "radio").attr("name", "remote").attr("value", "Yes"))
        .child(el("label").attr("for", "remote-yes").text("Yes"))
        .child(el("input").id("remote-no").attr("type", "radio").attr("name", "remote").attr("value", "No"))
        .child(el("label").attr("for", "remote-no").text("No"))
        .child(el("input").id("relocate").attr("type", "checkbox").attr("value", "Open to relocation"))
        .child(el("label").attr("for", "relocate").text("Open to relocation"));

    let driver = Arc::new(FakeDriver::new("about:blank"));
    driver.page(
        url.clone(),
        modal(
            vec![
                text_question("city", "City"),
                select_question("exp", "Years of experience", &["0-2", "3+"]),
                // a single real option is no choice at all
                select_question("shift", "Preferred shift", &["Day"]),
                file_question("resume", "Resume").child(el("input").id("resume-note").attr("type", "text")),
                section()
                    .child(el("span").text("Cover letter"))
                    .child(el("button").text("Upload file")),
                mixed,
            ],
            inert_submit(),
        ),
    );
    let session = session(driver.clone());
    session.navigate(&url).await.unwrap();

    let fields = FormClassifier::new(Board::LinkedIn.profile())
        .classify_page(&session, None)
        .await
        .unwrap();

    let kinds: Vec<FieldKind> = fields.iter().map(|f| f.kind).collect();
    assert_eq!(
        kinds,
        vec![
            FieldKind::Text,
            FieldKind::Dropdown,
            FieldKind::FileUpload,
            FieldKind::FileUpload,
            FieldKind::RadioGroup,
            FieldKind::CheckboxGroup,
        ]
    );
    assert_eq!(fields[0].label, "City");
    // placeholder dropped
    assert_eq!(fields[1].option_labels(), vec!["0-2".to_string(), "3+".to_string()]);
    assert_eq!(fields[2].label, "Resume");
    assert_eq!(fields[4].label, "Work preferences");
    assert_eq!(fields[4].option_labels(), vec!["Yes".to_string(), "No".to_string()]);
    assert_eq!(fields[5].option_labels(), vec!["Open to relocation".to_string()]);
}

#[tokio::test]
async fn dropdown_gets_the_offered_option() {
    let driver = posting(
        "20",
        vec![select_question("exp", "Years of Rust experience", &["0-2", "3-5", "6+"])],
    );
    let oracle = Arc::new(ScriptedOracle::new().answer("years", "3-5"));

    let kind = apply(&driver, "20", oracle, GeneratedDocuments::default(), AnswerCache::ephemeral()).await;

    assert_eq!(kind, OutcomeKind::Applied);
    assert_eq!(driver.value_of("exp").as_deref(), Some("3-5"));
}

#[tokio::test]
async fn checkbox_groups_take_zero_one_or_many_answers() {
    let driver = posting(
        "21",
        vec![
            checkbox_question("langs", "Which languages do you use?", &["Rust", "Go", "Python"]),
            checkbox_question("shift", "Which shifts can you work?", &["Day", "Night"]),
            checkbox_question("office", "Which offices would you relocate to?", &["Berlin", "Austin"]),
            checkbox_question("terms", "I agree to the terms of service", &["I agree"]),
        ],
    );
    let oracle = Arc::new(
        ScriptedOracle::new()
            .answers("languages", &["Rust", "Python"])
            .answers("shifts", &["Night"]),
    );

    let kind = apply(&driver, "21", oracle.clone(), GeneratedDocuments::default(), AnswerCache::ephemeral()).await;

    assert_eq!(kind, OutcomeKind::Applied);
    assert!(driver.is_checked("langs-rust"));
    assert!(!driver.is_checked("langs-go"));
    assert!(driver.is_checked("langs-python"));
    assert!(!driver.is_checked("shift-day"));
    assert!(driver.is_checked("shift-night"));
    assert!(!driver.is_checked("office-berlin"));
    assert!(!driver.is_checked("office-austin"));

    // consent is ticked without asking
    assert!(driver.is_checked("terms-i agree"));
    assert!(!oracle.asked().iter().any(|q| q.contains("terms")));
}

#[tokio::test]
async fn missing_document_skips_only_its_upload() {
    let dir = tempfile::tempdir().unwrap();
    let resume = dir.path().join("resume.pdf");
    std::fs::write(&resume, b"%PDF-1.4").unwrap();
    let documents = GeneratedDocuments {
        resume: Some(resume.clone()),
        cover_letter: Some(dir.path().join("cover_letter.pdf")),
    };

    let driver = posting(
        "22",
        vec![
            file_question("resume-upload", "Resume"),
            file_question("cover-upload", "Cover letter"),
        ],
    );

    let kind = apply(&driver, "22", Arc::new(ScriptedOracle::new()), documents, AnswerCache::ephemeral()).await;

    assert_eq!(kind, OutcomeKind::Applied);
    assert_eq!(driver.uploads(), vec![resume]);
    assert!(!driver.uploads().contains(&dir.path().join("cover_letter.pdf")));
}

#[tokio::test]
async fn cached_answer_is_used_without_asking() {
    let driver = posting(
        "23",
        vec![
            text_question("phone", "Phone number"),
            text_question("city", "City"),
        ],
    );
    let mut cache = AnswerCache::ephemeral();
    cache.insert("Phone number", FieldKind::Text, vec!["5550199".to_string()]);
    let oracle = Arc::new(ScriptedOracle::new().answer("city", "Austin"));

    let kind = apply(&driver, "23", oracle.clone(), GeneratedDocuments::default(), cache).await;

    assert_eq!(kind, OutcomeKind::Applied);
    assert_eq!(driver.value_of("phone").as_deref(), Some("5550199"));
    assert_eq!(driver.value_of("city").as_deref(), Some("Austin"));
    assert_eq!(oracle.asked(), vec!["City".to_string()]);
}
