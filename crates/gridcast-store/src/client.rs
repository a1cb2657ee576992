// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of GridCast.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

use chrono::{DateTime, Utc};
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::errors::{StoreError, StoreResult};
use crate::sign;
use crate::types::{ErrorResponse, ListBucketResult, LocationConstraint, ObjectMeta};

/// Static access credentials for the store. Optional on the client:
/// without them requests go out unsigned (anonymous access).
#[derive(Clone)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .finish()
    }
}

/// Read-only S3 REST client, path-style addressing.
///
/// Stateless apart from the connection pool; one instance is shared
/// across all requests via the web layer's `AppState`.
#[derive(Debug, Clone)]
pub struct StoreClient {
    endpoint: String,
    region: String,
    bucket: String,
    credentials: Option<Credentials>,
    client: Client,
}

impl StoreClient {
    pub fn new(
        endpoint: impl Into<String>,
        region: impl Into<String>,
        bucket: impl Into<String>,
        credentials: Option<Credentials>,
    ) -> StoreResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| StoreError::Config(format!("Failed to build HTTP client: {e}")))?;

        let endpoint = endpoint.into().trim_end_matches('/').to_owned();
        let bucket = bucket.into();
        if bucket.is_empty() {
            return Err(StoreError::Config("bucket name is empty".to_owned()));
        }

        Ok(Self {
            endpoint,
            region: region.into(),
            bucket,
            credentials,
            client,
        })
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn has_credentials(&self) -> bool {
        self.credentials.is_some()
    }

    /// Fetch one object's bytes.
    pub async fn get_object(&self, key: &str) -> StoreResult<Vec<u8>> {
        let uri = format!("/{}/{}", self.bucket, encode_key(key));
        debug!("📥 [STORE] GET {}", key);

        let response = self.send(&uri, &[]).await?;
        match response.status() {
            StatusCode::OK => {
                let bytes = response.bytes().await?;
                debug!("✅ [STORE] {} ({} bytes)", key, bytes.len());
                Ok(bytes.to_vec())
            }
            StatusCode::NOT_FOUND => {
                warn!("⚠️ [STORE] Object not found: {}", key);
                Err(StoreError::NotFound(key.to_owned()))
            }
            status => Err(self.service_error(status, response).await),
        }
    }

    /// List all objects under a prefix, following continuation tokens.
    pub async fn list_objects(&self, prefix: &str) -> StoreResult<Vec<ObjectMeta>> {
        let uri = format!("/{}", self.bucket);
        let mut objects = Vec::new();
        let mut continuation: Option<String> = None;

        loop {
            let mut query: Vec<(&str, String)> = vec![("list-type", "2".to_owned())];
            if !prefix.is_empty() {
                query.push(("prefix", prefix.to_owned()));
            }
            if let Some(token) = &continuation {
                query.push(("continuation-token", token.clone()));
            }

            let response = self.send(&uri, &query).await?;
            let status = response.status();
            if !status.is_success() {
                return Err(self.service_error(status, response).await);
            }

            let body = response.text().await?;
            let page: ListBucketResult = quick_xml::de::from_str(&body)
                .map_err(|e| StoreError::Decode(format!("list response: {e}")))?;

            for entry in page.contents {
                let last_modified = DateTime::parse_from_rfc3339(&entry.last_modified)
                    .map(|dt| dt.with_timezone(&Utc))
                    .unwrap_or_else(|_| {
                        debug!(
                            "Unparseable LastModified '{}' for {}, treating as epoch",
                            entry.last_modified, entry.key
                        );
                        DateTime::UNIX_EPOCH
                    });
                objects.push(ObjectMeta {
                    key: entry.key,
                    last_modified,
                    size: entry.size,
                });
            }

            continuation = page.next_continuation_token.filter(|_| page.is_truncated);
            if continuation.is_none() {
                break;
            }
        }

        info!("📦 [STORE] Listed {} objects under '{}'", objects.len(), prefix);
        Ok(objects)
    }

    /// Region the bucket lives in; empty LocationConstraint means us-east-1.
    pub async fn bucket_location(&self) -> StoreResult<String> {
        let uri = format!("/{}", self.bucket);
        let response = self.send(&uri, &[("location", String::new())]).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(self.service_error(status, response).await);
        }

        let body = response.text().await?;
        let constraint: LocationConstraint = quick_xml::de::from_str(&body)
            .map_err(|e| StoreError::Decode(format!("location response: {e}")))?;
        Ok(constraint
            .region
            .filter(|region| !region.is_empty())
            .unwrap_or_else(|| "us-east-1".to_owned()))
    }

    /// Issue one GET, signing it when credentials are configured.
    async fn send(&self, canonical_uri: &str, query: &[(&str, String)]) -> StoreResult<Response> {
        // Query pairs are encoded and sorted once so the URL on the wire
        // matches the canonical query string the signature covers.
        let mut pairs: Vec<(String, String)> = query
            .iter()
            .map(|(name, value)| {
                (
                    urlencoding::encode(name).into_owned(),
                    urlencoding::encode(value).into_owned(),
                )
            })
            .collect();
        pairs.sort();
        let canonical_query = pairs
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("&");

        let mut url = format!("{}{}", self.endpoint, canonical_uri);
        if !canonical_query.is_empty() {
            url.push('?');
            url.push_str(&canonical_query);
        }

        let mut request = self.client.get(&url);
        if let Some(credentials) = &self.credentials {
            let host = host_header(&self.endpoint)?;
            for (name, value) in sign::signing_headers(
                credentials,
                &host,
                canonical_uri,
                &canonical_query,
                &self.region,
                Utc::now(),
            ) {
                request = request.header(&name, &value);
            }
        }

        Ok(request.send().await?)
    }

    async fn service_error(&self, status: StatusCode, response: Response) -> StoreError {
        let body = response.text().await.unwrap_or_default();
        let (code, message) = match quick_xml::de::from_str::<ErrorResponse>(&body) {
            Ok(parsed) if !parsed.code.is_empty() => (parsed.code, parsed.message),
            _ => ("Unknown".to_owned(), body),
        };
        error!(
            "❌ [STORE] Request failed with {}: {} ({})",
            status, code, message
        );
        StoreError::Service {
            status: status.as_u16(),
            code,
            message,
        }
    }
}

/// Percent-encode an object key, keeping `/` as the segment separator.
fn encode_key(key: &str) -> String {
    key.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Host header value for the configured endpoint (host[:port], default
/// ports omitted, matching what reqwest sends).
fn host_header(endpoint: &str) -> StoreResult<String> {
    let url = reqwest::Url::parse(endpoint)
        .map_err(|e| StoreError::Config(format!("invalid endpoint '{endpoint}': {e}")))?;
    let host = url
        .host_str()
        .ok_or_else(|| StoreError::Config(format!("endpoint '{endpoint}' has no host")))?;
    Ok(match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn client(server: &Server) -> StoreClient {
        StoreClient::new(server.url(), "us-east-1", "test-bucket", None).unwrap()
    }

    #[tokio::test]
    async fn test_get_object_success() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/test-bucket/daily_prediction/latest_forecast.csv")
            .with_status(200)
            .with_body("time,predicted_ontario_demand\n")
            .create_async()
            .await;

        let bytes = client(&server)
            .get_object("daily_prediction/latest_forecast.csv")
            .await
            .unwrap();

        assert_eq!(bytes, b"time,predicted_ontario_demand\n");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_object_not_found() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/test-bucket/missing.csv")
            .with_status(404)
            .create_async()
            .await;

        let result = client(&server).get_object("missing.csv").await;
        assert!(matches!(result, Err(StoreError::NotFound(key)) if key == "missing.csv"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_object_service_error_parses_xml() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/test-bucket/forbidden.csv")
            .with_status(403)
            .with_body(
                "<?xml version=\"1.0\"?><Error><Code>AccessDenied</Code>\
                 <Message>Access Denied</Message></Error>",
            )
            .create_async()
            .await;

        let result = client(&server).get_object("forbidden.csv").await;
        match result {
            Err(StoreError::Service {
                status,
                code,
                message,
            }) => {
                assert_eq!(status, 403);
                assert_eq!(code, "AccessDenied");
                assert_eq!(message, "Access Denied");
            }
            other => panic!("expected service error, got {other:?}"),
        }
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_list_objects_parses_entries() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/test-bucket")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("list-type".into(), "2".into()),
                Matcher::UrlEncoded("prefix".into(), "hourly_data/".into()),
            ]))
            .with_status(200)
            .with_body(
                "<?xml version=\"1.0\"?>\
                 <ListBucketResult xmlns=\"http://s3.amazonaws.com/doc/2006-03-01/\">\
                 <IsTruncated>false</IsTruncated>\
                 <Contents><Key>hourly_data/a.json</Key>\
                 <LastModified>2025-10-17T10:00:00.000Z</LastModified>\
                 <Size>120</Size></Contents>\
                 <Contents><Key>hourly_data/b.json</Key>\
                 <LastModified>2025-10-17T12:00:00.000Z</LastModified>\
                 <Size>130</Size></Contents>\
                 </ListBucketResult>",
            )
            .create_async()
            .await;

        let objects = client(&server).list_objects("hourly_data/").await.unwrap();
        assert_eq!(objects.len(), 2);
        assert_eq!(objects[0].key, "hourly_data/a.json");
        assert_eq!(objects[0].size, 120);
        assert!(objects[1].last_modified > objects[0].last_modified);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_bucket_location_defaults_to_us_east_1() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/test-bucket")
            .match_query(Matcher::UrlEncoded("location".into(), "".into()))
            .with_status(200)
            .with_body(
                "<?xml version=\"1.0\"?>\
                 <LocationConstraint xmlns=\"http://s3.amazonaws.com/doc/2006-03-01/\">\
                 </LocationConstraint>",
            )
            .create_async()
            .await;

        let location = client(&server).bucket_location().await.unwrap();
        assert_eq!(location, "us-east-1");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_signed_request_carries_sigv4_headers() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/test-bucket/key.csv")
            .match_header(
                "authorization",
                Matcher::Regex("^AWS4-HMAC-SHA256 Credential=AKID/".to_owned()),
            )
            .match_header("x-amz-date", Matcher::Regex("^[0-9]{8}T[0-9]{6}Z$".to_owned()))
            .with_status(200)
            .with_body("ok")
            .create_async()
            .await;

        let credentials = Credentials {
            access_key_id: "AKID".to_owned(),
            secret_access_key: "secret".to_owned(),
        };
        let client =
            StoreClient::new(server.url(), "us-east-1", "test-bucket", Some(credentials)).unwrap();
        let bytes = client.get_object("key.csv").await.unwrap();

        assert_eq!(bytes, b"ok");
        mock.assert_async().await;
    }

    #[test]
    fn test_encode_key_preserves_separators() {
        assert_eq!(
            encode_key("hourly_data/2025-10-17 14.json"),
            "hourly_data/2025-10-17%2014.json"
        );
    }

    #[test]
    fn test_credentials_debug_redacts_secret() {
        let credentials = Credentials {
            access_key_id: "AKID".to_owned(),
            secret_access_key: "secret".to_owned(),
        };
        let printed = format!("{credentials:?}");
        assert!(printed.contains("AKID"));
        assert!(!printed.contains("secret_access_key: \"secret\""));
    }
}
