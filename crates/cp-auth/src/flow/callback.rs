//! Callback detection - classifying candidate navigation URLs
//!
//! Every navigation the browser surface reports runs through here. Most of
//! them are ordinary in-provider navigation (login form, consent page); the
//! detector's job is to spot the one that is the registered redirect
//! callback and pull the authorization code or error out of it.

use crate::flow::types::AuthFlowConfig;
use reqwest::Url;

/// Generic reason used when a provider error page is recognized without an
/// `error` query parameter
pub const GENERIC_AUTH_ERROR: &str = "authorization_error";

/// Classification of one candidate URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackOutcome {
    /// Not a callback; ordinary navigation
    None,

    /// Redirect target reached carrying an authorization code
    Code(String),

    /// Provider signalled failure
    Error(String),
}

/// Recognizes the registered redirect target among navigation URLs
#[derive(Debug, Clone)]
pub struct RedirectMatcher {
    redirect_prefixes: Vec<String>,
    error_page_prefixes: Vec<String>,
}

impl RedirectMatcher {
    /// Create a matcher for the given redirect-target prefixes
    pub fn new(redirect_prefixes: Vec<String>, error_page_prefixes: Vec<String>) -> Self {
        Self {
            redirect_prefixes,
            error_page_prefixes,
        }
    }

    /// Create a matcher from a flow configuration
    pub fn from_config(config: &AuthFlowConfig) -> Self {
        Self::new(
            config.redirect_prefixes.clone(),
            config.error_page_prefixes.clone(),
        )
    }

    /// Classify a candidate URL
    ///
    /// Never fails: anything that does not parse as an absolute URL is not
    /// a callback. Classification is side-effect-free and safe to repeat on
    /// the same URL; consumers still need their own handled-once gate
    /// because several navigation signals may carry the same URL.
    pub fn classify(&self, candidate: &str) -> CallbackOutcome {
        let url = match Url::parse(candidate) {
            Ok(url) => url,
            Err(_) => return CallbackOutcome::None,
        };

        let (code, error) = auth_query_params(&url);

        // Providers only emit `error` on failure, so it wins even when a
        // code is present on the same URL.
        if let Some(error) = error {
            return CallbackOutcome::Error(error);
        }

        if self.is_redirect_target(candidate) {
            if let Some(code) = code {
                return CallbackOutcome::Code(code);
            }
        }

        if self.is_error_page(candidate) {
            return CallbackOutcome::Error(GENERIC_AUTH_ERROR.to_string());
        }

        CallbackOutcome::None
    }

    /// Whether the URL is the registered redirect target
    pub fn is_redirect_target(&self, candidate: &str) -> bool {
        matches_any_prefix(candidate, &self.redirect_prefixes)
    }

    fn is_error_page(&self, candidate: &str) -> bool {
        matches_any_prefix(candidate, &self.error_page_prefixes)
    }
}

fn matches_any_prefix(candidate: &str, prefixes: &[String]) -> bool {
    prefixes
        .iter()
        .any(|prefix| candidate.starts_with(prefix.as_str()))
}

/// Extract non-empty `code` and `error` query parameters
fn auth_query_params(url: &Url) -> (Option<String>, Option<String>) {
    let mut code = None;
    let mut error = None;

    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" if !value.is_empty() => code = Some(value.into_owned()),
            "error" if !value.is_empty() => error = Some(value.into_owned()),
            _ => {}
        }
    }

    (code, error)
}
