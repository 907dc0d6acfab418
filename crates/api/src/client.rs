//! `reqwest`-backed implementation of [`AdminTransport`].

use std::time::Instant;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, header};
use tracing::{debug, warn};

use crate::config::{ConfigError, DaConfig};
use crate::error::TransportError;
use crate::retry::duration_ms;
use crate::transport::{AdminRequest, AdminResponse, AdminTransport, RequestBody};

/// Thin wrapper around a configured `reqwest::Client`.
///
/// Default headers (authorization, accept, user agent) and the request
/// timeout are fixed at construction from the supplied [`DaConfig`]. The
/// client is cheap to clone and shares its connection pool.
#[derive(Debug, Clone)]
pub struct DaClient {
    http: Client,
}

impl DaClient {
    pub fn new(config: &DaConfig) -> Result<Self, ConfigError> {
        let mut default_headers = header::HeaderMap::new();
        if let Some(token) = config.token.as_deref() {
            let mut value = header::HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| ConfigError::InvalidToken)?;
            value.set_sensitive(true);
            default_headers.insert(header::AUTHORIZATION, value);
        }
        default_headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json, text/html;q=0.9, */*;q=0.8"));

        let http = Client::builder()
            .default_headers(default_headers)
            .user_agent(config.user_agent.clone())
            .timeout(config.request_timeout)
            .build()
            .map_err(|error| ConfigError::HttpClient(error.to_string()))?;
        Ok(Self { http })
    }
}

#[async_trait]
impl AdminTransport for DaClient {
    async fn execute(&self, request: AdminRequest) -> Result<AdminResponse, TransportError> {
        let start = Instant::now();
        let AdminRequest { method, url, body } = request;
        debug!(method = %method, url = %url, "admin request started");

        let mut builder = self.http.request(method.clone(), url.clone());
        builder = match body {
            RequestBody::Empty => builder,
            RequestBody::Form(fields) => builder.form(&fields),
            RequestBody::Multipart(file) => {
                let size = file.bytes.len();
                let part = Part::bytes(file.bytes)
                    .file_name(file.file_name)
                    .mime_str(&file.content_type)?;
                debug!(method = %method, url = %url, size, content_type = %file.content_type, "multipart body prepared");
                builder.multipart(Form::new().part(file.field, part))
            }
        };

        let response = builder.send().await.map_err(|error| {
            let error = TransportError::from(error);
            warn!(
                method = %method,
                url = %url,
                kind = %error.kind(),
                error = %error,
                duration_ms = duration_ms(start.elapsed()),
                "admin request failed"
            );
            error
        })?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await?.to_vec();
        debug!(
            method = %method,
            url = %url,
            status = %status,
            body_len = body.len(),
            duration_ms = duration_ms(start.elapsed()),
            "admin request completed"
        );
        Ok(AdminResponse {
            status,
            content_type,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportErrorKind;
    use crate::transport::MultipartFile;
    use httpmock::MockServer;
    use url::Url;

    fn client_for(token: Option<&str>) -> DaClient {
        let mut config = DaConfig::default();
        if let Some(token) = token {
            config = config.with_token(token);
        }
        DaClient::new(&config).expect("client")
    }

    fn url(server: &MockServer, path: &str) -> Url {
        Url::parse(&server.url(path)).expect("mock url")
    }

    #[tokio::test]
    async fn get_sends_bearer_token_and_returns_body() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method("GET")
                .path("/source/acme/site/index.html")
                .header("authorization", "Bearer t0ken");
            then.status(200).header("content-type", "text/html").body("<main>hi</main>");
        });

        let response = client_for(Some("t0ken"))
            .execute(AdminRequest::get(url(&server, "/source/acme/site/index.html")))
            .await
            .expect("response");

        mock.assert();
        assert!(response.is_success());
        assert_eq!(response.content_type.as_deref(), Some("text/html"));
        assert_eq!(response.body, b"<main>hi</main>");
    }

    #[tokio::test]
    async fn non_success_statuses_are_returned_not_raised() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method("DELETE").path("/source/acme/site/missing.html");
            then.status(404).body("not found");
        });

        let response = client_for(None)
            .execute(AdminRequest::delete(url(&server, "/source/acme/site/missing.html")))
            .await
            .expect("response");
        assert_eq!(response.status.as_u16(), 404);
    }

    #[tokio::test]
    async fn multipart_upload_posts_form_data() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method("POST")
                .path("/source/acme/site/assets/img.png")
                .header_includes("content-type", "multipart/form-data")
                .body_includes("name=\"data\"")
                .body_includes("filename=\"img.png\"");
            then.status(201).header("content-type", "application/json").body("{}");
        });

        let request = AdminRequest::post(
            url(&server, "/source/acme/site/assets/img.png"),
            RequestBody::Multipart(MultipartFile {
                field: "data".into(),
                file_name: "img.png".into(),
                content_type: "image/png".into(),
                bytes: vec![0x89, b'P', b'N', b'G'],
            }),
        );
        let response = client_for(None).execute(request).await.expect("response");

        mock.assert();
        assert_eq!(response.status.as_u16(), 201);
    }

    #[tokio::test]
    async fn form_body_is_url_encoded() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method("POST")
                .path("/copy/acme/site/docs/a.html")
                .body("destination=%2Facme%2Fsite%2Fdocs%2Fb.html");
            then.status(204);
        });

        let request = AdminRequest::post(
            url(&server, "/copy/acme/site/docs/a.html"),
            RequestBody::Form(vec![("destination".into(), "/acme/site/docs/b.html".into())]),
        );
        let response = client_for(None).execute(request).await.expect("response");

        mock.assert();
        assert_eq!(response.status.as_u16(), 204);
    }

    #[tokio::test]
    async fn refused_connections_are_classified_transient() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        let address = listener.local_addr().expect("addr");
        drop(listener);

        let target = Url::parse(&format!("http://{address}/source/acme/site/x")).expect("url");
        let error = client_for(None)
            .execute(AdminRequest::get(target))
            .await
            .expect_err("nothing listens on the port");

        assert!(matches!(
            error.kind(),
            TransportErrorKind::Connect | TransportErrorKind::ConnectionReset | TransportErrorKind::Network
        ));
        assert!(error.kind().is_transient());
    }
}
