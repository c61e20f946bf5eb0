use reqwest::{Method, Url};
use serde::Serialize;

use super::error::ApiError;

// ---------------------------------------------------------------------------
// Body
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(serde_json::Value),
    /// `application/x-www-form-urlencoded` fields, in order.
    Form(Vec<(String, String)>),
    /// `multipart/form-data` file parts.
    Multipart(Vec<FilePart>),
}

#[derive(Debug, Clone)]
pub struct FilePart {
    pub field: String,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

// ---------------------------------------------------------------------------
// ApiRequest
// ---------------------------------------------------------------------------

/// Declarative description of one backend call.
///
/// `url` is a template such as `/api/v1/users/{user_id}`; every `{name}`
/// segment must be bound with [`ApiRequest::path`].
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    url: &'static str,
    path: Vec<(&'static str, String)>,
    query: Vec<(&'static str, String)>,
    body: RequestBody,
    errors: Vec<(u16, &'static str)>,
}

impl ApiRequest {
    pub fn new(method: Method, url: &'static str) -> Self {
        Self {
            method,
            url,
            path: Vec::new(),
            query: Vec::new(),
            body: RequestBody::Empty,
            errors: Vec::new(),
        }
    }

    pub fn get(url: &'static str) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: &'static str) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn put(url: &'static str) -> Self {
        Self::new(Method::PUT, url)
    }

    pub fn patch(url: &'static str) -> Self {
        Self::new(Method::PATCH, url)
    }

    pub fn delete(url: &'static str) -> Self {
        Self::new(Method::DELETE, url)
    }

    pub fn path(mut self, name: &'static str, value: impl ToString) -> Self {
        self.path.push((name, value.to_string()));
        self
    }

    pub fn query(mut self, name: &'static str, value: impl ToString) -> Self {
        self.query.push((name, value.to_string()));
        self
    }

    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body)
            .map_err(|e| ApiError::InvalidRequest(format!("unserializable JSON body: {e}")))?;
        self.body = RequestBody::Json(value);
        Ok(self)
    }

    pub fn form<K: Into<String>, V: Into<String>>(
        mut self,
        fields: impl IntoIterator<Item = (K, V)>,
    ) -> Self {
        self.body = RequestBody::Form(
            fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    pub fn file(mut self, part: FilePart) -> Self {
        match &mut self.body {
            RequestBody::Multipart(parts) => parts.push(part),
            body => *body = RequestBody::Multipart(vec![part]),
        }
        self
    }

    /// Describe an expected failure status, e.g. `422 => "Validation Error"`.
    pub fn error(mut self, status: u16, description: &'static str) -> Self {
        self.errors.push((status, description));
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn template(&self) -> &'static str {
        self.url
    }

    pub fn media_type(&self) -> Option<&'static str> {
        match self.body {
            RequestBody::Empty => None,
            RequestBody::Json(_) => Some("application/json"),
            RequestBody::Form(_) => Some("application/x-www-form-urlencoded"),
            RequestBody::Multipart(_) => Some("multipart/form-data"),
        }
    }

    pub fn description_for(&self, status: u16) -> Option<&'static str> {
        self.errors
            .iter()
            .find(|(code, _)| *code == status)
            .map(|(_, description)| *description)
    }

    pub(crate) fn take_body(&mut self) -> RequestBody {
        std::mem::take(&mut self.body)
    }

    /// Join the template onto `base`, substituting path params as single
    /// percent-encoded segments and appending query params in order.
    pub fn resolve_url(&self, base: &Url) -> Result<Url, ApiError> {
        let mut url = base.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                ApiError::InvalidRequest(format!("base URL cannot carry a path: {base}"))
            })?;
            segments.pop_if_empty();

            for segment in self.url.trim_start_matches('/').split('/') {
                match placeholder(segment) {
                    Some(name) => {
                        let value = self
                            .path
                            .iter()
                            .find(|(key, _)| *key == name)
                            .map(|(_, value)| value.as_str())
                            .ok_or_else(|| {
                                ApiError::InvalidRequest(format!(
                                    "missing path param {name:?} for {}",
                                    self.url
                                ))
                            })?;
                        segments.push(value);
                    }
                    None => {
                        segments.push(segment);
                    }
                }
            }
        }

        if let Some((name, _)) = self
            .path
            .iter()
            .find(|(name, _)| !self.url.contains(&format!("{{{name}}}")))
        {
            return Err(ApiError::InvalidRequest(format!(
                "path param {name:?} has no placeholder in {}",
                self.url
            )));
        }

        if !self.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in &self.query {
                pairs.append_pair(name, value);
            }
        }

        Ok(url)
    }
}

fn placeholder(segment: &str) -> Option<&str> {
    segment.strip_prefix('{')?.strip_suffix('}')
}
