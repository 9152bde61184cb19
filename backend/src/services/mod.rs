//! HTTP surface for the operator's letter editor.
//!
//! - `templates`: read-only catalog listing under `/api/templates`.
//! - `sessions`: editing sessions under `/api/sessions`, from field edits to
//!   preview, download and submission.

pub mod sessions;
pub mod templates;

use crate::config::Settings;
use crate::submission::StaticCredential;
use actix_web::http::header::AUTHORIZATION;
use actix_web::HttpRequest;

/// Bearer credential for an outgoing submission: the operator's own token
/// when the request carries one, the configured token otherwise.
pub(crate) fn forwarded_credential(req: &HttpRequest, settings: &Settings) -> StaticCredential {
    let forwarded = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty());
    StaticCredential(forwarded.or_else(|| settings.bearer_token.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::submission::CredentialSource;
    use actix_web::test::TestRequest;

    #[test]
    fn operator_token_wins_over_configured_one() {
        let settings = Settings {
            bearer_token: Some("server".into()),
            ..Settings::default()
        };
        let req = TestRequest::default()
            .insert_header((AUTHORIZATION, "Bearer operator"))
            .to_http_request();
        assert_eq!(
            forwarded_credential(&req, &settings).bearer_token().as_deref(),
            Some("operator")
        );

        let req = TestRequest::default().to_http_request();
        assert_eq!(
            forwarded_credential(&req, &settings).bearer_token().as_deref(),
            Some("server")
        );
    }
}
