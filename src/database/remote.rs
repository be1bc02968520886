use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::debug;
use reqwest::{Client, Response, StatusCode, Url};
use serde::Serialize;
use serde_json::Value as JsonValue;

use super::backend::{PersistResult, PersistenceError, SeriesBackend};
use crate::catalog::{SeriesDetails, SeriesRecord};
use crate::core::config::RemoteConfig;

/// Body of `POST /series`: the validated fields plus the creation stamp.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NewSeries<'a> {
    #[serde(flatten)]
    details: &'a SeriesDetails,
    created_at: DateTime<Utc>,
}

/// Remote CRUD binding over the `/series` resource of an HTTP service.
pub struct RemoteBackend {
    client: Client,
    base_url: Url,
}

impl RemoteBackend {
    pub fn from_config(cfg: &RemoteConfig) -> PersistResult<Self> {
        let base_url = Url::parse(&cfg.base_url)
            .map_err(|e| PersistenceError::InvalidBaseUrl(format!("{}: {}", cfg.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(PersistenceError::InvalidBaseUrl(cfg.base_url.clone()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_seconds))
            .build()?;

        Ok(Self { client, base_url })
    }

    /// Append path segments to the base URL, percent-encoding each one
    fn build_url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn collection_url(&self) -> Url {
        self.build_url(&["series"])
    }

    /// `/series/{id}`; ids that would collapse into another path are refused
    fn item_url(&self, id: &str) -> PersistResult<Url> {
        if id.is_empty() || id == "." || id == ".." {
            return Err(PersistenceError::UnaddressableId(id.to_string()));
        }
        Ok(self.build_url(&["series", id]))
    }

    /// Turn a non-success status into an error, keeping the body for context
    async fn check(resp: Response) -> PersistResult<Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(PersistenceError::UnexpectedStatus {
            status: status.as_u16(),
            body,
        })
    }

    async fn read_record(resp: Response, fallback_created_at: DateTime<Utc>) -> PersistResult<SeriesRecord> {
        let value: JsonValue = resp
            .json()
            .await
            .map_err(|e| PersistenceError::MalformedResponse(e.to_string()))?;
        decode_record(value, fallback_created_at)
            .map_err(|e| PersistenceError::MalformedResponse(e.to_string()))
    }
}

/// Services that do not keep `createdAt` get the supplied stamp filled in.
fn decode_record(mut value: JsonValue, fallback_created_at: DateTime<Utc>) -> Result<SeriesRecord, serde_json::Error> {
    if let Some(obj) = value.as_object_mut() {
        obj.entry("createdAt")
            .or_insert_with(|| JsonValue::String(fallback_created_at.to_rfc3339()));
    }
    serde_json::from_value(value)
}

#[async_trait]
impl SeriesBackend for RemoteBackend {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn load(&self) -> PersistResult<Vec<SeriesRecord>> {
        let url = self.collection_url();
        debug!("GET {}", url);
        let resp = Self::check(self.client.get(url).send().await?).await?;

        let body = resp.text().await?;
        let items = match serde_json::from_str::<JsonValue>(&body) {
            Ok(JsonValue::Array(items)) => items,
            Ok(_) => return Err(PersistenceError::Corrupt("expected a JSON array".to_string())),
            Err(e) => return Err(PersistenceError::Corrupt(e.to_string())),
        };

        let now = Utc::now();
        items
            .into_iter()
            .map(|item| decode_record(item, now).map_err(|e| PersistenceError::Corrupt(e.to_string())))
            .collect()
    }

    async fn fetch(&self, id: &str) -> PersistResult<Option<SeriesRecord>> {
        let url = match self.item_url(id) {
            Ok(url) => url,
            Err(e) if e.is_not_found() => return Ok(None),
            Err(e) => return Err(e),
        };
        debug!("GET {}", url);
        let resp = self.client.get(url).send().await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let resp = Self::check(resp).await?;
        Self::read_record(resp, Utc::now()).await.map(Some)
    }

    async fn create(
        &self,
        details: &SeriesDetails,
        created_at: DateTime<Utc>,
        _existing: &[SeriesRecord],
    ) -> PersistResult<SeriesRecord> {
        let url = self.collection_url();
        debug!("POST {}", url);
        let body = NewSeries { details, created_at };
        let resp = Self::check(self.client.post(url).json(&body).send().await?).await?;
        Self::read_record(resp, created_at).await
    }

    async fn update(
        &self,
        record: &SeriesRecord,
        _next: &[SeriesRecord],
    ) -> PersistResult<SeriesRecord> {
        let url = self.item_url(&record.id)?;
        debug!("PUT {}", url);
        let resp = Self::check(self.client.put(url).json(record).send().await?).await?;
        Self::read_record(resp, record.created_at).await
    }

    async fn delete(&self, id: &str, _next: &[SeriesRecord]) -> PersistResult<()> {
        let url = self.item_url(id)?;
        debug!("DELETE {}", url);
        Self::check(self.client.delete(url).send().await?).await?;
        Ok(())
    }

    /// The service has no bulk endpoint, so records are deleted one by one.
    /// Records the service no longer knows about count as cleared.
    async fn clear(&self, current: &[SeriesRecord]) -> PersistResult<()> {
        for record in current {
            match self.delete(&record.id, &[]).await {
                Ok(()) => {}
                Err(e) if e.is_not_found() => {
                    debug!("Series {} already gone from the service", record.id)
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    async fn replace_all(
        &self,
        current: &[SeriesRecord],
        details: &[SeriesDetails],
        created_at: DateTime<Utc>,
    ) -> PersistResult<Vec<SeriesRecord>> {
        self.clear(current).await?;
        let mut records = Vec::with_capacity(details.len());
        for item in details {
            let record = self.create(item, created_at, &[]).await?;
            records.push(record);
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn backend(base_url: &str) -> RemoteBackend {
        RemoteBackend::from_config(&RemoteConfig {
            base_url: base_url.to_string(),
            timeout_seconds: 5,
        })
        .unwrap()
    }

    #[test]
    fn test_urls_join_cleanly() {
        let remote = backend("http://localhost:5000/");
        assert_eq!(remote.collection_url().as_str(), "http://localhost:5000/series");
        assert_eq!(
            remote.item_url("42").unwrap().as_str(),
            "http://localhost:5000/series/42"
        );

        let nested = backend("http://localhost:5000/api");
        assert_eq!(
            nested.item_url("42").unwrap().as_str(),
            "http://localhost:5000/api/series/42"
        );
    }

    #[test]
    fn test_item_url_encodes_the_id() {
        let remote = backend("http://localhost:5000");
        assert_eq!(
            remote.item_url("../x").unwrap().as_str(),
            "http://localhost:5000/series/..%2Fx"
        );
        assert_eq!(
            remote.item_url("a?b#c").unwrap().as_str(),
            "http://localhost:5000/series/a%3Fb%23c"
        );
        assert!(remote.item_url("..").unwrap_err().is_not_found());
        assert!(remote.item_url("").is_err());
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let result = RemoteBackend::from_config(&RemoteConfig {
            base_url: "not a url".to_string(),
            timeout_seconds: 5,
        });
        assert!(matches!(result, Err(PersistenceError::InvalidBaseUrl(_))));
    }

    #[test]
    fn test_decode_fills_missing_created_at() {
        let stamp = Utc::now();
        let record = decode_record(json!({"id": 3, "title": "Fargo"}), stamp).unwrap();
        assert_eq!(record.id, "3");
        assert_eq!(record.created_at.timestamp(), stamp.timestamp());
    }
}
