mod common;

use std::sync::Arc;
use std::time::Duration;

use common::*;
use easy_apply::models::{FailureKind, OutcomeKind, OutcomeReason, SkipReason};
use easy_apply::orchestrator::{App, AppParts, PageDwell};
use easy_apply::platform::{Board, SearchQuery};
use easy_apply::services::AnswerCache;
use easy_apply::utils::shutdown::never;

fn search_url(page: u32) -> String {
    search_url_for("Rust Engineer", page)
}

fn search_url_for(keywords: &str, page: u32) -> String {
    Board::LinkedIn.search_url(&SearchQuery {
        keywords: keywords.to_string(),
        location: "Remote".to_string(),
        page,
        remote_only: false,
    })
}

/// Three listings: one applies in place, one is blacklisted, one gets an
/// answer that is not on offer
fn board() -> Arc<FakeDriver> {
    let tiles = [
        Tile {
            id: "101",
            title: "Rust Engineer",
            company: "Acme",
            location: "Remote",
        },
        Tile {
            id: "102",
            title: "Rust Engineer",
            company: "Evil Corp",
            location: "Remote",
        },
        Tile {
            id: "103",
            title: "Systems Engineer",
            company: "Globex",
            location: "Remote",
        },
    ];
    let apply_url = format!("{}/apply/103", BASE);

    let driver = Arc::new(FakeDriver::new("about:blank"));
    driver
        .page(search_url(0), results_page(&tiles))
        // page two relists the same jobs
        .page(search_url(1), results_page(&tiles))
        .page(search_url(2), no_results_page())
        .page(job_url("101"), detail_page(Action::Render("modal-101".into())))
        .page(
            "modal-101",
            modal(
                vec![text_question("phone", "Phone number")],
                submit_button(Action::Render("sent".into())),
            ),
        )
        .page("sent", el("body").child(el("h2").text("Application sent")))
        .page(job_url("102"), detail_page(Action::Render("modal-101".into())))
        .page(job_url("103"), detail_page(Action::OpenTab(apply_url.clone())))
        .page(
            apply_url,
            modal(
                vec![radio_question("clearance", "Do you hold a security clearance?", &["Yes", "No"])],
                submit_button(Action::Render("sent".into())),
            ),
        );
    driver
}

#[tokio::test]
async fn every_listing_ends_in_exactly_one_recorded_outcome() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(dir.path().to_path_buf());
    config.company_blacklist = vec!["evil corp".to_string()];

    let driver = board();
    let logger = Arc::new(RecordingLogger::default());
    let parts = AppParts {
        session: session(driver.clone()),
        oracle: Arc::new(ScriptedOracle::new().answer("clearance", "Top secret")),
        documents: Arc::new(FixedDocuments::default()),
        cache: AnswerCache::ephemeral(),
        logger: logger.clone(),
        shutdown: never(),
    };
    let mut app = App::from_parts(config, parts).unwrap();

    let stats = app.run().await.unwrap();

    assert_eq!(stats.total(), 3);
    assert_eq!((stats.applied, stats.skipped, stats.failed), (1, 1, 1));

    // blacklisted job was never opened
    assert!(!driver.visited(&job_url("102")));
    // the tab opened for job 103 did not leak
    assert_eq!(driver.tab_count(), 1);

    let records = app.ledger().read_all().await.unwrap();
    assert_eq!(records.len(), 3);
    let applied = app.ledger().read(OutcomeKind::Applied).await.unwrap();
    assert_eq!(applied.len(), 1);
    assert_eq!(applied[0].link, job_url("101"));
    let skipped = app.ledger().read(OutcomeKind::Skipped).await.unwrap();
    assert_eq!(
        skipped[0].reason,
        Some(OutcomeReason::Skip(SkipReason::BlacklistedCompany))
    );
    let failed = app.ledger().read(OutcomeKind::Failed).await.unwrap();
    assert_eq!(
        failed[0].reason,
        Some(OutcomeReason::Failure(FailureKind::OracleContractViolation))
    );

    assert_eq!(logger.records().len(), 3);
    assert!(logger.is_closed());
    assert_eq!(app.discovery().seen().len(), 3);
}

#[tokio::test]
async fn interrupted_run_records_nothing_further() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path().to_path_buf());

    let (tx, rx) = tokio::sync::watch::channel(false);
    tx.send(true).unwrap();

    let driver = board();
    let logger = Arc::new(RecordingLogger::default());
    let parts = AppParts {
        session: session(driver.clone()),
        oracle: Arc::new(ScriptedOracle::new()),
        documents: Arc::new(FixedDocuments::default()),
        cache: AnswerCache::ephemeral(),
        logger: logger.clone(),
        shutdown: rx,
    };
    let mut app = App::from_parts(config, parts).unwrap();

    let stats = app.run().await.unwrap();

    assert_eq!(stats.total(), 0);
    assert!(logger.records().is_empty());
    assert!(logger.is_closed());
    assert!(!driver.visited(&search_url(0)));
}

#[tokio::test]
async fn untitled_listing_is_recorded_not_dropped() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(dir.path().to_path_buf());
    config.company_blacklist = vec!["Evil Corp".to_string()];

    let tiles = [
        Tile {
            id: "201",
            title: "Rust Engineer",
            company: "Acme",
            location: "Remote",
        },
        Tile {
            id: "202",
            title: "Rust Engineer",
            company: "Evil Corp",
            location: "Remote",
        },
        Tile {
            id: "203",
            title: "",
            company: "Initech",
            location: "Remote",
        },
    ];
    let driver = Arc::new(FakeDriver::new("about:blank"));
    driver
        .page(search_url(0), results_page(&tiles))
        .page(search_url(1), no_results_page())
        .page(job_url("201"), detail_page(Action::Render("modal".into())))
        .page(
            "modal",
            modal(
                vec![text_question("years", "Years of Rust experience")],
                submit_button(Action::Render("sent".into())),
            ),
        )
        .page("sent", el("body").child(el("h2").text("Application sent")));

    let parts = AppParts {
        session: session(driver.clone()),
        oracle: Arc::new(ScriptedOracle::new().answer("years", "5")),
        documents: Arc::new(FixedDocuments::default()),
        cache: AnswerCache::ephemeral(),
        logger: Arc::new(RecordingLogger::default()),
        shutdown: never(),
    };
    let mut app = App::from_parts(config, parts).unwrap();
    let stats = app.run().await.unwrap();

    assert_eq!(stats.total(), 3);
    assert_eq!((stats.applied, stats.skipped), (1, 2));

    // only the clean listing was opened
    assert!(driver.visited(&job_url("201")));
    assert!(!driver.visited(&job_url("202")));
    assert!(!driver.visited(&job_url("203")));

    let skipped = app.ledger().read(OutcomeKind::Skipped).await.unwrap();
    let untitled = skipped
        .iter()
        .find(|r| r.link == job_url("203"))
        .expect("untitled listing recorded");
    assert_eq!(untitled.job_title, easy_apply::models::UNKNOWN_TITLE);
    assert_eq!(
        untitled.reason,
        Some(OutcomeReason::Skip(SkipReason::IncompleteListing))
    );
}

#[tokio::test]
async fn page_of_seen_listings_does_not_end_the_search() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path().to_path_buf());

    let tile = |id| Tile {
        id,
        title: "Rust Engineer",
        company: "Acme",
        location: "Remote",
    };
    let driver = Arc::new(FakeDriver::new("about:blank"));
    driver
        .page(search_url_for("Systems Engineer", 0), results_page(&[tile("301")]))
        .page(search_url_for("Systems Engineer", 1), no_results_page())
        // the second search opens on a page the first one already covered
        .page(search_url_for("Rust Engineer", 0), results_page(&[tile("301")]))
        .page(search_url_for("Rust Engineer", 1), results_page(&[tile("302")]))
        .page(search_url_for("Rust Engineer", 2), no_results_page())
        .page(job_url("301"), detail_page(Action::Render("modal".into())))
        .page(job_url("302"), detail_page(Action::Render("modal".into())))
        .page(
            "modal",
            modal(
                vec![text_question("phone", "Phone number")],
                submit_button(Action::Render("sent".into())),
            ),
        )
        .page("sent", el("body").child(el("h2").text("Application sent")));

    let parts = AppParts {
        session: session(driver.clone()),
        oracle: Arc::new(ScriptedOracle::new().answer("phone", "555-0100")),
        documents: Arc::new(FixedDocuments::default()),
        cache: AnswerCache::ephemeral(),
        logger: Arc::new(RecordingLogger::default()),
        shutdown: never(),
    };
    let mut app = App::from_parts(config, parts).unwrap();
    let mut dwell = PageDwell::new(Duration::ZERO, 0, (0, 0));

    app.search("Systems Engineer", "Remote", &mut dwell).await.unwrap();
    app.search("Rust Engineer", "Remote", &mut dwell).await.unwrap();

    assert!(driver.visited(&search_url_for("Rust Engineer", 1)));
    assert!(driver.visited(&job_url("302")));
    assert_eq!(app.stats().applied, 2);
    assert_eq!(app.discovery().seen().len(), 2);
}
