//! Content request construction
//!
//! ```text
//! GET {base}/{workouts|plans|exercises}[/{id|title}]?lang=&category=&lastDocId=&limit=&body_parts=a,b
//! x-api-key: ...
//! x-company-name: ...
//! ```

use bridge_traits::http::HttpRequest;
use core_runtime::config::Credentials;

use crate::charset::CharacterPolicy;
use crate::error::{ContentError, Result};
use crate::models::{BodyPart, ContentType};

/// Filters shared by every list request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilter {
    pub lang: Option<String>,
    pub category: Option<String>,
    pub body_parts: Vec<BodyPart>,
    pub last_doc_id: Option<String>,
    pub limit: Option<u32>,
}

impl ListFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = Some(lang.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn body_parts(mut self, parts: impl IntoIterator<Item = BodyPart>) -> Self {
        self.body_parts = parts.into_iter().collect();
        self
    }

    /// Continue after the cursor returned by the previous page
    pub fn after(mut self, last_doc_id: impl Into<String>) -> Self {
        self.last_doc_id = Some(last_doc_id.into());
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// A single content request.
///
/// The request targets one entity when an id or title is set (id wins) and a
/// list otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentQuery {
    pub content_type: ContentType,
    pub id: Option<String>,
    pub title: Option<String>,
    pub filter: ListFilter,
}

impl ContentQuery {
    pub fn list(content_type: ContentType) -> Self {
        Self {
            content_type,
            id: None,
            title: None,
            filter: ListFilter::default(),
        }
    }

    pub fn by_id(content_type: ContentType, id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::list(content_type)
        }
    }

    pub fn by_title(content_type: ContentType, title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::list(content_type)
        }
    }

    pub fn with_filter(mut self, filter: ListFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn lang(mut self, lang: impl Into<String>) -> Self {
        self.filter.lang = Some(lang.into());
        self
    }

    pub fn is_list(&self) -> bool {
        self.id.is_none() && self.title.is_none()
    }

    /// Path segment after the endpoint, id taking precedence over title
    fn selector(&self) -> Option<&str> {
        self.id.as_deref().or(self.title.as_deref())
    }

    /// Rejects empty selectors and values containing disallowed characters.
    ///
    /// Identifiers and `lang` use [`CharacterPolicy::Strict`]. Titles,
    /// categories and cursors are free text that is percent-encoded into the
    /// URL, so they only use [`CharacterPolicy::Basic`] and may contain
    /// punctuation such as `.` or `(`.
    pub fn validate(&self) -> Result<()> {
        let filter = &self.filter;
        let fields = [
            ("id", self.id.as_deref(), CharacterPolicy::Strict),
            ("title", self.title.as_deref(), CharacterPolicy::Basic),
            ("lang", filter.lang.as_deref(), CharacterPolicy::Strict),
            ("category", filter.category.as_deref(), CharacterPolicy::Basic),
            ("lastDocId", filter.last_doc_id.as_deref(), CharacterPolicy::Basic),
        ];

        for (name, value, policy) in fields {
            let Some(value) = value else { continue };
            if value.trim().is_empty() && matches!(name, "id" | "title" | "lang") {
                return Err(ContentError::Validation(format!("{} cannot be empty", name)));
            }
            if let Some(bad) = policy.find_disallowed(value) {
                return Err(ContentError::Validation(format!(
                    "{} contains disallowed character '{}'",
                    name, bad
                )));
            }
        }

        Ok(())
    }

    /// Full request URL
    pub fn url(&self, base_url: &str, default_lang: &str) -> String {
        let mut url = format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            self.content_type.endpoint()
        );
        if let Some(selector) = self.selector() {
            url.push('/');
            url.push_str(&urlencoding::encode(selector));
        }

        let filter = &self.filter;
        let lang = filter.lang.as_deref().unwrap_or(default_lang);
        let mut params: Vec<(&str, String)> = vec![("lang", lang.to_string())];
        if let Some(category) = &filter.category {
            params.push(("category", category.clone()));
        }
        if let Some(cursor) = &filter.last_doc_id {
            params.push(("lastDocId", cursor.clone()));
        }
        if let Some(limit) = filter.limit {
            params.push(("limit", limit.to_string()));
        }
        if !filter.body_parts.is_empty() {
            let joined = filter
                .body_parts
                .iter()
                .map(BodyPart::as_str)
                .collect::<Vec<_>>()
                .join(",");
            params.push(("body_parts", joined));
        }

        let query = params
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        format!("{}?{}", url, query)
    }

    /// Validates the query and builds the authenticated request.
    pub fn to_request(
        &self,
        base_url: &str,
        default_lang: &str,
        credentials: &Credentials,
    ) -> Result<HttpRequest> {
        self.validate()?;

        Ok(HttpRequest::get(self.url(base_url, default_lang))
            .header("x-api-key", credentials.api_key.clone())
            .header("x-company-name", credentials.company_name.clone())
            .accept_json())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://admin.kinestex.com/api/v1";

    fn credentials() -> Credentials {
        Credentials {
            api_key: "key".into(),
            company_name: "Acme".into(),
            user_id: "user-1".into(),
        }
    }

    #[test]
    fn test_list_url_has_only_lang() {
        let query = ContentQuery::list(ContentType::Workout);
        assert!(query.is_list());
        assert_eq!(query.url(BASE, "en"), format!("{}/workouts?lang=en", BASE));
    }

    #[test]
    fn test_id_wins_over_title() {
        let mut query = ContentQuery::by_id(ContentType::Plan, "plan-1");
        query.title = Some("Strength Plan".into());
        assert!(!query.is_list());
        assert_eq!(query.url(BASE, "en"), format!("{}/plans/plan-1?lang=en", BASE));
    }

    #[test]
    fn test_title_is_percent_encoded() {
        let query = ContentQuery::by_title(ContentType::Workout, "Fitness Lite").lang("es");
        assert_eq!(
            query.url(BASE, "en"),
            format!("{}/workouts/Fitness%20Lite?lang=es", BASE)
        );
    }

    #[test]
    fn test_list_filters_in_order() {
        let filter = ListFilter::new()
            .category("Fitness")
            .after("doc-9")
            .limit(5)
            .body_parts([BodyPart::Abs, BodyPart::LowerBack]);
        let query = ContentQuery::list(ContentType::Exercise).with_filter(filter);

        assert_eq!(
            query.url(BASE, "en"),
            format!(
                "{}/exercises?lang=en&category=Fitness&lastDocId=doc-9&limit=5&body_parts=Abs%2CLower%20Back",
                BASE
            )
        );
    }

    #[test]
    fn test_request_headers() {
        let request = ContentQuery::list(ContentType::Workout)
            .to_request(BASE, "en", &credentials())
            .unwrap();

        assert_eq!(request.headers.get("x-api-key"), Some(&"key".to_string()));
        assert_eq!(request.headers.get("x-company-name"), Some(&"Acme".to_string()));
        assert_eq!(
            request.headers.get("Accept"),
            Some(&"application/json".to_string())
        );
    }

    #[test]
    fn test_validation_rejects_disallowed_characters() {
        let query = ContentQuery::by_id(ContentType::Workout, "w1<script>");
        assert!(matches!(
            query.to_request(BASE, "en", &credentials()),
            Err(ContentError::Validation(msg)) if msg.contains("id")
        ));

        let query = ContentQuery::by_title(ContentType::Workout, "Core<img>");
        assert!(query.validate().is_err());

        let query = ContentQuery::by_id(ContentType::Workout, "w1;drop");
        assert!(query.validate().is_err());
    }

    #[test]
    fn test_free_text_allows_punctuation() {
        let query = ContentQuery::by_title(ContentType::Workout, "Fitness 2.0 (Beginner)")
            .with_filter(
                ListFilter::new()
                    .category("Cardio; HIIT")
                    .after("page.2#next"),
            );
        assert!(query.validate().is_ok());
        assert_eq!(
            query.url(BASE, "en"),
            format!(
                "{}/workouts/Fitness%202.0%20%28Beginner%29?lang=en&category=Cardio%3B%20HIIT&lastDocId=page.2%23next",
                BASE
            )
        );

        let query = ContentQuery::by_title(ContentType::Plan, "Mom's Core");
        assert!(matches!(
            query.validate(),
            Err(ContentError::Validation(msg)) if msg.contains("title")
        ));
    }

    #[test]
    fn test_validation_rejects_empty_id() {
        let query = ContentQuery::by_id(ContentType::Exercise, " ");
        assert!(matches!(query.validate(), Err(ContentError::Validation(_))));
    }
}
