use std::collections::HashMap;

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::header,
    response::{IntoResponse, Response},
};

use crate::config::DEFAULT_SERVICE_HOST;
use crate::error::ApiError;

/// Request parameters merged from the query string and a form-encoded body.
///
/// Body values win over query values with the same key. A body with no
/// content type is still parsed as a form.
#[derive(Debug, Default, Clone)]
pub struct RequestParams(pub HashMap<String, String>);

impl RequestParams {
    pub fn from_pairs(query: Option<&str>, body: Option<&[u8]>) -> Self {
        let mut params = HashMap::new();
        if let Some(qs) = query {
            params.extend(url::form_urlencoded::parse(qs.as_bytes()).into_owned());
        }
        if let Some(body) = body {
            params.extend(url::form_urlencoded::parse(body).into_owned());
        }
        Self(params)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// A required field: absent and blank are reported as distinct errors.
    pub fn required(
        &self,
        key: &str,
        missing: ApiError,
        blank: ApiError,
    ) -> Result<&str, ApiError> {
        match self.get(key) {
            None => Err(missing),
            Some(v) if v.trim().is_empty() => Err(blank),
            Some(v) => Ok(v),
        }
    }

    /// Explicit `service_host`, if the caller sent a non-empty one.
    pub fn explicit_service_host(&self) -> Option<&str> {
        self.get("service_host").filter(|h| !h.is_empty())
    }

    pub fn service_host(&self) -> &str {
        resolve_service_host(self.get("service_host"))
    }
}

pub fn resolve_service_host(value: Option<&str>) -> &str {
    match value {
        Some(host) if !host.is_empty() => host,
        _ => DEFAULT_SERVICE_HOST,
    }
}

fn is_form_body(req: &Request) -> bool {
    match req.headers().get(header::CONTENT_TYPE) {
        None => true,
        Some(ct) => ct
            .to_str()
            .map(|ct| ct.starts_with("application/x-www-form-urlencoded"))
            .unwrap_or(false),
    }
}

impl<S> FromRequest<S> for RequestParams
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let query = req.uri().query().map(str::to_owned);
        let parse_body = is_form_body(&req);

        let body = Bytes::from_request(req, state)
            .await
            .map_err(IntoResponse::into_response)?;

        let body = (parse_body && !body.is_empty()).then_some(&body[..]);
        Ok(Self::from_pairs(query.as_deref(), body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_host_defaults_to_localhost() {
        assert_eq!(resolve_service_host(None), "localhost");
        assert_eq!(resolve_service_host(Some("")), "localhost");
        assert_eq!(resolve_service_host(Some("service.net")), "service.net");
    }

    #[test]
    fn body_overrides_query() {
        let params = RequestParams::from_pairs(
            Some("service_host=query.net&name=a"),
            Some(&b"service_host=body.net"[..]),
        );
        assert_eq!(params.service_host(), "body.net");
        assert_eq!(params.get("name"), Some("a"));
    }

    #[test]
    fn required_distinguishes_missing_and_blank() {
        let params = RequestParams::from_pairs(Some("name=&hostname=%20"), None);
        assert!(matches!(
            params.required("other", ApiError::MissingName, ApiError::EmptyName),
            Err(ApiError::MissingName)
        ));
        assert!(matches!(
            params.required("name", ApiError::MissingName, ApiError::EmptyName),
            Err(ApiError::EmptyName)
        ));
        assert!(matches!(
            params.required("hostname", ApiError::MissingHostname, ApiError::EmptyHostname),
            Err(ApiError::EmptyHostname)
        ));
    }

    #[test]
    fn explicit_service_host_ignores_empty_value() {
        let params = RequestParams::from_pairs(Some("service_host="), None);
        assert_eq!(params.explicit_service_host(), None);
    }
}
