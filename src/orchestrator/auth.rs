//! Authentication glue
//!
//! Logs into the board when the session is not already signed in. Manual
//! verification (captcha, emailed code, PIN) is a bounded wait, with one
//! more bounded chance for the operator to confirm on stdin.

use std::io::BufRead;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::infrastructure::UiSession;
use crate::platform::BoardProfile;

/// How long the operator gets to press Enter after the automatic wait
const OPERATOR_TIMEOUT: Duration = Duration::from_secs(300);

pub struct Authenticator {
    board: &'static BoardProfile,
    email: Option<String>,
    password: Option<String>,
    verification_timeout: Duration,
    operator_timeout: Duration,
    check_timeout: Duration,
}

impl Authenticator {
    pub fn new(board: &'static BoardProfile, config: &Config) -> Self {
        Self {
            board,
            email: config.email.clone(),
            password: config.password.clone(),
            verification_timeout: Duration::from_secs(config.verification_timeout_secs),
            operator_timeout: OPERATOR_TIMEOUT,
            check_timeout: Duration::from_secs(5),
        }
    }

    pub fn with_timeouts(mut self, check: Duration, verification: Duration, operator: Duration) -> Self {
        self.check_timeout = check;
        self.verification_timeout = verification;
        self.operator_timeout = operator;
        self
    }

    pub async fn is_logged_in(&self, session: &UiSession, timeout: Duration) -> AppResult<bool> {
        match session
            .wait_until_visible_any(self.board.logged_in_indicators, None, timeout)
            .await
        {
            Ok(_) => Ok(true),
            Err(e) if e.is_run_level() => Err(e),
            Err(_) => Ok(false),
        }
    }

    pub async fn ensure_logged_in(&self, session: &UiSession) -> AppResult<()> {
        session.navigate(self.board.base_url).await?;
        if self.is_logged_in(session, self.check_timeout).await? {
            info!("✓ Already signed in");
            return Ok(());
        }

        info!("🔐 Signing in at {}", self.board.login_url);
        session.navigate(self.board.login_url).await?;
        self.submit_credentials(session).await?;

        if self.is_logged_in(session, self.verification_timeout).await? {
            info!("✓ Signed in");
            return Ok(());
        }

        if self.verification_pending(session).await? {
            warn!("⚠️ Verification required, complete it in the browser");
            if self.wait_for_operator().await && self.is_logged_in(session, self.check_timeout).await? {
                info!("✓ Signed in after manual verification");
                return Ok(());
            }
        }

        Err(AppError::AuthFailed(format!(
            "not signed in after {}s",
            self.verification_timeout.as_secs()
        )))
    }

    async fn submit_credentials(&self, session: &UiSession) -> AppResult<()> {
        let Some(email) = self.email.as_deref() else {
            warn!("⚠️ APPLY_EMAIL not set, waiting for a manual login");
            return Ok(());
        };

        if let Some((input, _)) = session.find_first(self.board.email_inputs, None).await? {
            session.human_type(input, email).await?;
        } else {
            debug!("No email field on the login page");
        }

        if let Some(password) = self.password.as_deref() {
            if let Some((input, _)) = session.find_first(self.board.password_inputs, None).await? {
                session.human_type(input, password).await?;
            }
        }

        match session.find_first_clickable(self.board.login_submit, None).await? {
            Some(button) => session.click(button).await,
            None => {
                warn!("⚠️ No login button found");
                Ok(())
            }
        }
    }

    async fn verification_pending(&self, session: &UiSession) -> AppResult<bool> {
        Ok(session
            .find_first(self.board.verification_markers, None)
            .await?
            .is_some())
    }

    /// `true` once the operator pressed Enter within the timeout
    async fn wait_for_operator(&self) -> bool {
        println!("Press Enter after completing the verification in the browser...");
        let read = tokio::task::spawn_blocking(|| {
            let mut line = String::new();
            std::io::stdin().lock().read_line(&mut line).map(|_| ())
        });
        match tokio::time::timeout(self.operator_timeout, read).await {
            Ok(Ok(Ok(()))) => true,
            Ok(_) => false,
            Err(_) => {
                warn!("⚠️ No operator confirmation within {}s", self.operator_timeout.as_secs());
                false
            }
        }
    }
}
