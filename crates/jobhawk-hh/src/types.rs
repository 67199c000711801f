use serde::Deserialize;

use jobhawk_core::types::Posting;

/// One page of `/vacancies` search results.
#[derive(Debug, Deserialize)]
pub struct SearchPage {
    pub pages: u32,
    pub items: Vec<Vacancy>,
}

/// Vacancy fields the engine cares about; the API returns far more.
#[derive(Debug, Clone, Deserialize)]
pub struct Vacancy {
    pub id: String,
    pub name: String,
    pub alternate_url: String,
    #[serde(default)]
    pub has_test: bool,
}

impl From<Vacancy> for Posting {
    fn from(v: Vacancy) -> Self {
        Posting {
            id: v.id,
            name: v.name,
            url: v.alternate_url,
            requires_test: v.has_test,
        }
    }
}

/// A resume from `/resumes/mine`, offered to the user for selection.
#[derive(Debug, Clone, Deserialize)]
pub struct Resume {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct ResumesPage {
    pub items: Vec<Resume>,
}

/// An experience bucket from `/dictionaries`, e.g. `between1And3`.
#[derive(Debug, Clone, Deserialize)]
pub struct ExperienceBucket {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct Dictionaries {
    pub experience: Vec<ExperienceBucket>,
}

/// OAuth token grant response.
#[derive(Debug, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    /// hh rotates the refresh token on every grant; fall back to the old
    /// one if a response ever omits it.
    pub refresh_token: Option<String>,
    pub expires_in: i64,
}
