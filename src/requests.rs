use log::{debug, warn};
use reqwest::{Client, ClientBuilder, Response, StatusCode};

use crate::ratelimit::RateLimiter;

/// Username and password for the timetable site's basic auth.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

pub struct RequestClient {
    client: Client,
    rate_limiter: RateLimiter,
    credentials: Option<Credentials>,
}

impl RequestClient {
    pub fn new(credentials: Option<Credentials>) -> anyhow::Result<Self> {
        let client = ClientBuilder::new().build()?;
        let rate_limiter = RateLimiter::new();
        Ok(Self {
            client,
            rate_limiter,
            credentials,
        })
    }

    pub async fn fetch_url_response(&self, url: &str) -> anyhow::Result<Response> {
        // Wait (non-blocking) until we're allowed to make a request according
        // to our self-imposed rate-limiting policy.
        self.rate_limiter.wait_until_ready().await;

        debug!("GET {url}");
        let mut request = self.client.get(url);
        if let Some(credentials) = &self.credentials {
            request = request.basic_auth(&credentials.username, Some(&credentials.password));
        }
        let response = request.send().await?.error_for_status()?;
        Ok(response)
    }

    pub async fn fetch_url_body(&self, url: &str) -> anyhow::Result<String> {
        let response = self.fetch_url_response(url).await?;
        let body = response.text().await?;
        Ok(body)
    }

    /// Follows redirects from a short link and returns where it ends up.
    pub async fn expand_url(&self, url: &str) -> anyhow::Result<String> {
        self.rate_limiter.wait_until_ready().await;
        let response = self.client.head(url).send().await?;
        Ok(response.url().to_string())
    }

    /// Whether `credentials` are accepted by the basic-auth protected `url`.
    pub async fn credentials_are_valid(
        &self,
        url: &str,
        credentials: &Credentials,
    ) -> anyhow::Result<bool> {
        self.rate_limiter.wait_until_ready().await;
        let response = self
            .client
            .get(url)
            .basic_auth(&credentials.username, Some(&credentials.password))
            .send()
            .await?;
        match response.status() {
            status if status.is_success() => Ok(true),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(false),
            status => {
                warn!("Credential check at {url} answered {status}");
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn credentials() -> Credentials {
        Credentials {
            username: "user".to_string(),
            password: "pass".to_string(),
        }
    }

    #[tokio::test]
    async fn sends_basic_auth() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/module.htm"))
            .and(header("authorization", "Basic dXNlcjpwYXNz"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
            .expect(1)
            .mount(&server)
            .await;

        let client = RequestClient::new(Some(credentials())).unwrap();
        let body = client
            .fetch_url_body(&format!("{}/module.htm", server.uri()))
            .await
            .unwrap();
        assert_eq!(body, "<html></html>");
    }

    #[tokio::test]
    async fn error_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = RequestClient::new(None).unwrap();
        assert!(client.fetch_url_body(&server.uri()).await.is_err());
    }

    #[tokio::test]
    async fn rejected_credentials_are_invalid() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = RequestClient::new(None).unwrap();
        let valid = client
            .credentials_are_valid(&server.uri(), &credentials())
            .await
            .unwrap();
        assert!(!valid);
    }

    #[tokio::test]
    async fn expands_redirects() {
        let server = MockServer::start().await;
        let target = format!("{}/maps/@54.77,-1.57,17z", server.uri());
        Mock::given(path("/short"))
            .respond_with(ResponseTemplate::new(302).insert_header("Location", target.as_str()))
            .mount(&server)
            .await;
        Mock::given(path("/maps/@54.77,-1.57,17z"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let client = RequestClient::new(None).unwrap();
        let expanded = client
            .expand_url(&format!("{}/short", server.uri()))
            .await
            .unwrap();
        assert_eq!(expanded, target);
    }
}
