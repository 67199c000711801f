use async_trait::async_trait;
use tracing::{debug, warn};

use jobhawk_core::config::HhConfig;
use jobhawk_core::types::{ApiError, JobApi, Posting, Preferences};

use crate::error::{HhError, Result};
use crate::types::{Dictionaries, ExperienceBucket, Resume, ResumesPage, SearchPage, Vacancy};

/// hh.ru quotes salaries in a single fixed currency.
const SALARY_CURRENCY: &str = "RUR";

/// hh.ru REST client.
///
/// Thin wrapper over reqwest; every request carries the configured
/// User-Agent (hh rejects anonymous clients) and user-scoped calls add a
/// Bearer token.
pub struct HhClient {
    client: reqwest::Client,
    config: HhConfig,
    per_page: u32,
}

impl HhClient {
    pub fn new(config: &HhConfig, per_page: u32) -> Self {
        Self {
            client: reqwest::Client::new(),
            config: config.clone(),
            per_page,
        }
    }

    fn authed(&self, builder: reqwest::RequestBuilder, access_token: &str) -> reqwest::RequestBuilder {
        builder
            .header("User-Agent", &self.config.user_agent)
            .header("Authorization", format!("Bearer {access_token}"))
    }

    /// Search vacancies matching `prefs`, concatenating every result page
    /// in provider order (newest-published first).
    pub async fn search_vacancies(
        &self,
        access_token: &str,
        prefs: &Preferences,
    ) -> Result<Vec<Vacancy>> {
        let url = format!("{}/vacancies", self.config.api_base_url);

        let first = self.search_page(&url, access_token, prefs, 0).await?;
        let pages = first.pages;
        let mut items = first.items;

        for page in 1..pages {
            let next = self.search_page(&url, access_token, prefs, page).await?;
            items.extend(next.items);
        }

        debug!(count = items.len(), pages, "vacancy search complete");
        Ok(items)
    }

    async fn search_page(
        &self,
        url: &str,
        access_token: &str,
        prefs: &Preferences,
        page: u32,
    ) -> Result<SearchPage> {
        let params = search_params(prefs, page, self.per_page);
        let resp = self
            .authed(self.client.get(url), access_token)
            .query(&params)
            .send()
            .await?;
        let resp = check_status(resp).await?;
        let parsed: SearchPage = resp.json().await.map_err(|e| HhError::Parse(e.to_string()))?;
        Ok(parsed)
    }

    /// Submit a response ("negotiation") to one vacancy. hh expects a
    /// multipart form, not JSON.
    pub async fn apply_to(
        &self,
        access_token: &str,
        vacancy_id: &str,
        resume_id: &str,
        message: &str,
    ) -> Result<()> {
        let url = format!("{}/negotiations", self.config.api_base_url);
        let form = reqwest::multipart::Form::new()
            .text("vacancy_id", vacancy_id.to_string())
            .text("resume_id", resume_id.to_string())
            .text("message", message.to_string());

        let resp = self
            .authed(self.client.post(&url), access_token)
            .multipart(form)
            .send()
            .await?;
        check_status(resp).await?;
        Ok(())
    }

    /// The user's own resumes, for the resume-selection step.
    pub async fn list_resumes(&self, access_token: &str) -> Result<Vec<Resume>> {
        let url = format!("{}/resumes/mine", self.config.api_base_url);
        let resp = self.authed(self.client.get(&url), access_token).send().await?;
        let resp = check_status(resp).await?;
        let page: ResumesPage = resp.json().await.map_err(|e| HhError::Parse(e.to_string()))?;
        Ok(page.items)
    }

    /// Provider-defined experience buckets. Public dictionary — no token.
    pub async fn experience_buckets(&self) -> Result<Vec<ExperienceBucket>> {
        let url = format!("{}/dictionaries", self.config.api_base_url);
        let resp = self
            .client
            .get(&url)
            .header("User-Agent", &self.config.user_agent)
            .send()
            .await?;
        let resp = check_status(resp).await?;
        let dicts: Dictionaries = resp.json().await.map_err(|e| HhError::Parse(e.to_string()))?;
        Ok(dicts.experience)
    }
}

#[async_trait]
impl JobApi for HhClient {
    async fn search(
        &self,
        access_token: &str,
        prefs: &Preferences,
    ) -> std::result::Result<Vec<Posting>, ApiError> {
        let vacancies = self.search_vacancies(access_token, prefs).await?;
        Ok(vacancies.into_iter().map(Posting::from).collect())
    }

    async fn apply(
        &self,
        access_token: &str,
        posting_id: &str,
        resume_id: &str,
        message: &str,
    ) -> std::result::Result<(), ApiError> {
        self.apply_to(access_token, posting_id, resume_id, message)
            .await?;
        Ok(())
    }
}

/// Query parameters for one `/vacancies` page. Kept pure so the mapping
/// from preferences to the wire is testable without a server.
pub fn search_params(prefs: &Preferences, page: u32, per_page: u32) -> Vec<(String, String)> {
    let mut params = vec![
        ("page".to_string(), page.to_string()),
        ("per_page".to_string(), per_page.to_string()),
        ("order_by".to_string(), "publication_time".to_string()),
    ];

    if !prefs.keywords.is_empty() {
        params.push(("text".to_string(), prefs.keywords.join(" ")));
    }
    if let Some(ref experience) = prefs.experience {
        params.push(("experience".to_string(), experience.join(",")));
    }
    if let Some(min_salary) = prefs.min_salary {
        params.push(("salary".to_string(), min_salary.to_string()));
        params.push(("currency".to_string(), SALARY_CURRENCY.to_string()));
    }

    params
}

/// Map a non-2xx response to a typed error. A 403 whose body mentions
/// `test_required` means the vacancy demands a prescreening test.
async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let message = resp.text().await.unwrap_or_default();
    if status.as_u16() == 403 && message.contains("test_required") {
        return Err(HhError::TestRequired);
    }

    warn!(status = status.as_u16(), body = %message, "hh API error");
    Err(HhError::Api {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn base_params_always_present() {
        let params = search_params(&Preferences::default(), 0, 100);
        assert_eq!(find(&params, "page"), Some("0"));
        assert_eq!(find(&params, "per_page"), Some("100"));
        assert_eq!(find(&params, "order_by"), Some("publication_time"));
        assert_eq!(find(&params, "text"), None);
        assert_eq!(find(&params, "salary"), None);
        assert_eq!(find(&params, "experience"), None);
    }

    #[test]
    fn keywords_join_with_spaces() {
        let prefs = Preferences {
            keywords: vec!["rust".into(), "backend".into()],
            ..Preferences::default()
        };
        let params = search_params(&prefs, 0, 100);
        assert_eq!(find(&params, "text"), Some("rust backend"));
    }

    #[test]
    fn experience_joins_with_commas() {
        let prefs = Preferences {
            experience: Some(vec!["noExperience".into(), "between1And3".into()]),
            ..Preferences::default()
        };
        let params = search_params(&prefs, 0, 100);
        assert_eq!(find(&params, "experience"), Some("noExperience,between1And3"));
    }

    #[test]
    fn min_salary_pins_the_currency() {
        let prefs = Preferences {
            min_salary: Some(250_000),
            ..Preferences::default()
        };
        let params = search_params(&prefs, 2, 50);
        assert_eq!(find(&params, "salary"), Some("250000"));
        assert_eq!(find(&params, "currency"), Some(SALARY_CURRENCY));
        assert_eq!(find(&params, "page"), Some("2"));
    }

    #[test]
    fn vacancy_maps_to_posting() {
        let vacancy: Vacancy = serde_json::from_str(
            r#"{"id":"123","name":"Rust Developer","alternate_url":"https://hh.ru/vacancy/123","has_test":true,"extra":"ignored"}"#,
        )
        .unwrap();
        let posting = Posting::from(vacancy);
        assert_eq!(posting.id, "123");
        assert!(posting.requires_test);
        assert_eq!(posting.url, "https://hh.ru/vacancy/123");
    }

    #[test]
    fn has_test_defaults_false_when_absent() {
        let vacancy: Vacancy = serde_json::from_str(
            r#"{"id":"1","name":"n","alternate_url":"u"}"#,
        )
        .unwrap();
        assert!(!vacancy.has_test);
    }
}
