//! LinkedIn: Easy Apply opens an in-place modal on the search page.

use super::{BoardProfile, SearchQuery};

const PAGE_SIZE: u32 = 25;

pub const PROFILE: BoardProfile = BoardProfile {
    base_url: "https://www.linkedin.com",
    link_params: &[],

    no_jobs_indicators: &["no matching jobs found", "unfortunately, things aren"],
    results_ready: &[".jobs-search-results-list", ".scaffold-layout__list", "div.job-card-container"],
    tiles: &[
        "li.scaffold-layout__list-item",
        ".jobs-search-results__list-item",
        "div.job-card-container",
    ],
    tile_title: &[
        ".job-card-list__title",
        "a.job-card-container__link strong",
        ".artdeco-entity-lockup__title",
    ],
    tile_company: &[
        ".job-card-container__primary-description",
        ".artdeco-entity-lockup__subtitle",
    ],
    tile_location: &[
        ".job-card-container__metadata-item",
        ".artdeco-entity-lockup__caption",
    ],
    tile_link: &["a.job-card-list__title", "a.job-card-container__link", "a[href*=\"/jobs/view/\"]"],
    tile_salary: &[".job-card-container__metadata-item--salary", ".artdeco-entity-lockup__metadata"],
    tile_apply_method: &[".job-card-container__apply-method", ".job-card-container__footer-item"],
    tile_id_attributes: &["data-occludable-job-id", "data-job-id"],

    detail_ready: &[".jobs-details", ".jobs-search__job-details--container", ".job-view-layout"],
    description: &[
        ".jobs-description-content__text",
        ".jobs-box__html-content",
        "#job-details",
    ],
    recruiter: &[".hirer-card__hirer-information a", ".jobs-poster__name a"],
    apply_buttons: &["button.jobs-apply-button", ".jobs-s-apply button", ".jobs-apply-button--top-card button"],
    apply_button_texts: &["easy apply"],
    easy_apply_keywords: &["easy apply"],

    surfaces: &[".jobs-easy-apply-modal", "div[role=\"dialog\"]", ".artdeco-modal"],
    form_containers: &[".jobs-easy-apply-modal", ".jobs-easy-apply-content", "form"],
    form_sections: &[
        ".jobs-easy-apply-form-section__grouping",
        ".fb-dash-form-element",
        ".jobs-easy-apply-form-element",
    ],
    section_cap: 15,
    submit_buttons: &["button[aria-label=\"Submit application\"]"],
    next_buttons: &[
        "button[aria-label=\"Continue to next step\"]",
        "button[aria-label=\"Review your application\"]",
    ],
    submit_texts: &["submit application", "submit"],
    next_texts: &["next", "review", "continue"],
    error_selectors: &[
        ".artdeco-inline-feedback--error",
        ".fb-dash-form-element-error",
        "[role=\"alert\"]",
    ],
    discard_selectors: &[
        "button[aria-label=\"Dismiss\"]",
        "button[data-control-name=\"discard_application_confirm_btn\"]",
        "button[data-test-dialog-secondary-btn]",
    ],

    login_url: "https://www.linkedin.com/login",
    email_inputs: &["#username"],
    password_inputs: &["#password"],
    login_submit: &["button[type=\"submit\"]"],
    logged_in_indicators: &[".global-nav__me", "nav.global-nav"],
    verification_markers: &["#captcha-internal", "input[name=\"pin\"]", "#input__phone_verification_pin"],
};

/// Sorted by date, Easy Apply only
pub fn search_url(query: &SearchQuery) -> String {
    let mut url = format!(
        "{}/jobs/search/?keywords={}&location={}&f_AL=true&sortBy=DD&start={}",
        PROFILE.base_url,
        urlencoding::encode(query.keywords.trim()),
        urlencoding::encode(query.location.trim()),
        query.page * PAGE_SIZE,
    );
    if query.remote_only {
        url.push_str("&f_WT=2");
    }
    url
}
