//! JobsDB: card click opens a sidebar (or the dedicated job page), Quick
//! Apply continues on a multi-page form in a new tab.

use super::{BoardProfile, SearchQuery, COMMON_ERROR_SELECTORS};

const PAGE_SIZE: u32 = 20;

pub const PROFILE: BoardProfile = BoardProfile {
    base_url: "https://hk.jobsdb.com",
    link_params: &[],

    no_jobs_indicators: &[
        "no jobs found",
        "0 jobs found",
        "no matching jobs",
        "no results found",
        "没有找到工作",
        "找不到職位",
    ],
    results_ready: &[
        "article[data-testid=\"job-card\"]",
        "[data-automation=\"job-list-item\"]",
        ".job-item",
        ".search-result",
    ],
    tiles: &[
        "article[data-testid=\"job-card\"]",
        "article[data-card-type=\"JobCard\"]",
        "[data-automation=\"job-list-item\"]",
        ".job-card",
    ],
    tile_title: &[
        "[data-automation=\"jobTitle\"]",
        ".job-title",
        "h3 a",
        "h4 a",
        ".position-title",
    ],
    tile_company: &[
        "[data-automation=\"jobCompany\"]",
        ".company-name",
        ".employer-name",
    ],
    tile_location: &[
        "[data-automation=\"jobCardLocation\"]",
        ".location",
        ".job-location",
    ],
    tile_link: &[
        "a[data-automation=\"job-list-item-link-overlay\"]",
        "a[data-automation=\"jobTitle\"]",
        "a[href*=\"/job/\"]",
        ".job-title a",
        "h3 a",
        "a[href*=\"/jobs/\"]",
    ],
    tile_salary: &["[data-automation=\"jobSalary\"]", ".salary", "[class*=\"salary\"]"],
    tile_apply_method: &[
        "[data-automation=\"job-detail-apply\"]",
        ".apply-button",
        ".quick-apply",
    ],
    tile_id_attributes: &["data-job-id"],

    detail_ready: &[
        "div[data-automation=\"splitViewJobDetailsWrapper\"]",
        "div[data-automation=\"jobDetailsPage\"]",
    ],
    description: &[
        "[data-automation=\"jobAdDetails\"]",
        "[data-automation=\"jobDescription\"]",
        ".job-description",
        ".job-details",
        "#job-description",
    ],
    recruiter: &["a[href*=\"/companies/\"]", "[data-automation=\"advertiser-name\"]"],
    apply_buttons: &[
        "a[data-automation=\"job-detail-apply\"]",
        "button[data-automation=\"job-detail-apply\"]",
        ".apply-button",
        "a[href*=\"/apply\"]",
    ],
    apply_button_texts: &["quick apply", "apply now", "apply"],
    easy_apply_keywords: &["quick apply", "easy apply"],

    surfaces: &[
        "form",
        ".application-form",
        ".job-apply-form",
        "[data-automation=\"applyPage\"]",
    ],
    form_containers: &["form", ".form-container", ".application-form", ".job-apply-form", "main", "body"],
    form_sections: &[
        ".form-group",
        ".field-group",
        ".form-section",
        ".question-group",
        "div[class*=\"form\"]",
        "div[class*=\"field\"]",
        "div[class*=\"question\"]",
    ],
    section_cap: 15,
    submit_buttons: &["button[type=\"submit\"]", "[data-testid=\"review-submit-application\"]"],
    next_buttons: &["[data-testid=\"continue-button\"]"],
    submit_texts: &["submit", "send"],
    next_texts: &["next", "continue"],
    error_selectors: COMMON_ERROR_SELECTORS,
    discard_selectors: &[],

    login_url: "https://hk.jobsdb.com/oauth/login/?returnUrl=%2F",
    email_inputs: &["#emailAddress", "input[name=\"email\"]", "input[type=\"email\"]"],
    password_inputs: &["#password", "input[name=\"password\"]", "input[type=\"password\"]"],
    login_submit: &["button[type=\"submit\"]", "[data-cy=\"login\"]"],
    logged_in_indicators: &[
        "[data-automation=\"member-menu\"]",
        ".profile-menu",
        "a[href*=\"/member/\"]",
        "a[href*=\"/profile/\"]",
    ],
    verification_markers: &[
        "iframe[src*=\"captcha\"]",
        "iframe[title*=\"challenge\"]",
        "#challenge-form",
        "input[name=\"code\"]",
    ],
};

/// `start` is an item offset, not a page number
pub fn search_url(query: &SearchQuery) -> String {
    let mut url = format!(
        "{}/hk/search-jobs?q={}&l={}&start={}&sortby=createdAt",
        PROFILE.base_url,
        urlencoding::encode(query.keywords.trim()),
        urlencoding::encode(query.location.trim()),
        query.page * PAGE_SIZE,
    );
    if query.remote_only {
        url.push_str("&remote=true");
    }
    url
}
