// src/api_client.rs

use crate::{config::ApiConfig, errors::AppError};
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

/// Wspólny klient HTTP panelu: jeden adres bazowy, JSON w obie strony.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self, AppError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Skleja adres bazowy ze ścieżką endpointu, np. `/admin/orders`.
    pub fn endpoint(&self, path: &str) -> Result<Url, AppError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{}/{}", base, path))?)
    }

    pub async fn get_json<T, Q>(&self, path: &str, query: &Q) -> Result<T, AppError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let url = self.endpoint(path)?;
        tracing::debug!("GET {}", url);
        let body = self.send(self.http.get(url).query(query)).await?;
        decode(path, &body)
    }

    /// PUT z opcjonalnym ciałem JSON; odpowiedź jest nieprzezroczysta dla panelu.
    pub async fn put_json<B>(&self, path: &str, body: Option<&B>) -> Result<Value, AppError>
    where
        B: Serialize + ?Sized,
    {
        let url = self.endpoint(path)?;
        tracing::debug!("PUT {}", url);
        let mut request = self.http.put(url);
        if let Some(body) = body {
            request = request.json(body);
        }
        let bytes = self.send(request).await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        decode(path, &bytes)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Vec<u8>, AppError> {
        let resp = request.send().await.map_err(|e| {
            tracing::error!("Błąd sieci podczas komunikacji z API: {:?}", e);
            AppError::Transport(e)
        })?;

        let status = resp.status();
        if status.is_success() {
            Ok(resp.bytes().await?.to_vec())
        } else {
            let error_text = resp
                .text()
                .await
                .unwrap_or_else(|_| "Brak treści błędu".to_string());
            tracing::warn!(
                "API odrzuciło żądanie: Status={}, Treść={}",
                status,
                error_text
            );
            Err(AppError::Status {
                status,
                body: error_text,
            })
        }
    }
}

fn decode<T: DeserializeOwned>(path: &str, body: &[u8]) -> Result<T, AppError> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::error!("Błąd deserializacji odpowiedzi z {}: {}", path, e);
        AppError::Decode(format!("{}: {}", path, e))
    })
}

/// Koduje identyfikator rekordu do użycia jako segment ścieżki.
pub fn path_segment(id: &str) -> String {
    urlencoding::encode(id).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(&ApiConfig {
            base_url: Url::parse(base).unwrap(),
            timeout: Duration::from_secs(1),
        })
        .unwrap()
    }

    #[test]
    fn endpoint_joins_with_and_without_trailing_slash() {
        assert_eq!(
            client("http://localhost:5000/api").endpoint("/admin/orders").unwrap().as_str(),
            "http://localhost:5000/api/admin/orders"
        );
        assert_eq!(
            client("http://localhost:5000/api/").endpoint("order/analytics").unwrap().as_str(),
            "http://localhost:5000/api/order/analytics"
        );
    }

    #[test]
    fn path_segment_escapes_reserved_characters() {
        assert_eq!(path_segment("abc/../x y"), "abc%2F..%2Fx%20y");
        assert_eq!(path_segment("order123"), "order123");
    }
}
