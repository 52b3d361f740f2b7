//! Indeed: "Apply now" on indeed-hosted postings opens the application in a
//! new tab.

use super::{BoardProfile, SearchQuery, COMMON_ERROR_SELECTORS};

const PAGE_SIZE: u32 = 10;

pub const PROFILE: BoardProfile = BoardProfile {
    base_url: "https://www.indeed.com",
    link_params: &["jk"],

    no_jobs_indicators: &["did not match any jobs", "no jobs found"],
    results_ready: &["#mosaic-provider-jobcards", "div.job_seen_beacon"],
    tiles: &["div.job_seen_beacon", "li div.cardOutline", "td.resultContent"],
    tile_title: &["h2.jobTitle span[title]", "h2.jobTitle", "a.jcs-JobTitle"],
    tile_company: &["[data-testid=\"company-name\"]", ".companyName"],
    tile_location: &["[data-testid=\"text-location\"]", ".companyLocation"],
    tile_link: &["a.jcs-JobTitle", "h2.jobTitle a"],
    tile_salary: &["[data-testid=\"attribute_snippet_testid\"]", ".salary-snippet-container"],
    tile_apply_method: &["[data-testid=\"indeedApply\"]", ".iaLabel", ".indeedApply"],
    tile_id_attributes: &["data-jk"],

    detail_ready: &["#jobsearch-ViewjobPaneWrapper", ".jobsearch-JobComponent", "#viewJobSSRRoot"],
    description: &["#jobDescriptionText", ".jobsearch-jobDescriptionText"],
    recruiter: &["[data-testid=\"inlineHeader-companyName\"] a"],
    apply_buttons: &["#indeedApplyButton", "button[id*=\"indeedApplyButton\"]", ".jobsearch-IndeedApplyButton-newDesign"],
    apply_button_texts: &["apply now", "easily apply"],
    easy_apply_keywords: &["apply now", "easily apply"],

    surfaces: &["#ia-container", "main form", "form"],
    form_containers: &["#ia-container", "main", "form", "body"],
    form_sections: &[
        ".ia-Questions-item",
        "[data-testid*=\"input-q\"]",
        ".form-group",
        "div[class*=\"question\"]",
    ],
    section_cap: 15,
    submit_buttons: &["button[data-testid=\"submit-application-button\"]"],
    next_buttons: &["button[data-testid=\"continue-button\"]", ".ia-continueButton"],
    submit_texts: &["submit your application", "submit"],
    next_texts: &["continue", "next", "review"],
    error_selectors: COMMON_ERROR_SELECTORS,
    discard_selectors: &[],

    login_url: "https://secure.indeed.com/account/login",
    email_inputs: &["input[type=\"email\"]", "input[name=\"__email\"]"],
    password_inputs: &["input[type=\"password\"]"],
    login_submit: &["button[type=\"submit\"]"],
    logged_in_indicators: &["#AccountMenu", "[data-gnav-element-name=\"AccountMenu\"]"],
    verification_markers: &["iframe[title*=\"hCaptcha\"]", "#challenge-running", "input[name=\"passcode\"]"],
};

pub fn search_url(query: &SearchQuery) -> String {
    let mut url = format!(
        "{}/jobs?q={}&l={}&sort=date&start={}",
        PROFILE.base_url,
        urlencoding::encode(query.keywords.trim()),
        urlencoding::encode(query.location.trim()),
        query.page * PAGE_SIZE,
    );
    if query.remote_only {
        url.push_str("&remotejob=032b3046-06a3-4876-8dfd-474eb5e7ed11");
    }
    url
}
