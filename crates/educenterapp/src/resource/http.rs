//! REST client for one backend collection.
//!
//! | Operation | Request |
//! |-----------|---------|
//! | `query`   | `GET api/<plural>?field=term&...` |
//! | `get`     | `GET api/<plural>/<id>` |
//! | `update`  | `PUT api/<plural>` with the whole record as body |
//! | `delete`  | `DELETE api/<plural>/<id>` |
//!
//! Students also have the integration endpoints: `GET api/history/students/<instant>`,
//! `GET api/export/students` (spreadsheet of active students) and `POST api/import/students`
//! (multipart upload under the `file` field, answered with one [`OperationResult`] per row).
//!
//! Non-success statuses map to [`EduError`]: `404` → `NotFound`, `400`/`422` → `Validation`
//! (with the backend's `X-<app>-error` alert header), anything else → `Http`.

use super::{JsonParser, Resource, ResponseParser};
use crate::error::{EduError, Result};
use crate::model::{Entity, EntityId, OperationResult, Student};
use crate::predicate::Predicate;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::multipart::{Form, Part};
use reqwest::{Response, StatusCode, Url};
use std::marker::PhantomData;
use std::time::Duration;
use tracing::{debug, info};

pub use reqwest::Client;

pub fn build_client(timeout: Duration) -> Result<Client> {
    Ok(Client::builder().timeout(timeout).build()?)
}

pub struct RestResource<R, P = JsonParser> {
    client: Client,
    base: Url,
    app_name: String,
    parser: P,
    _entity: PhantomData<fn() -> R>,
}

impl<R: Entity> RestResource<R> {
    pub fn new(client: Client, base_url: &str, app_name: &str) -> Result<Self> {
        // Url::join drops the last path segment unless the base ends with a slash.
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        let base = Url::parse(&normalized)
            .map_err(|e| EduError::Config(format!("invalid base url {base_url:?}: {e}")))?;
        Ok(Self {
            client,
            base,
            app_name: app_name.to_string(),
            parser: JsonParser,
            _entity: PhantomData,
        })
    }
}

impl<R: Entity, P> RestResource<R, P> {
    /// Swaps the parser used for single-record responses.
    pub fn with_parser<Q: ResponseParser<R>>(self, parser: Q) -> RestResource<R, Q> {
        RestResource {
            client: self.client,
            base: self.base,
            app_name: self.app_name,
            parser,
            _entity: PhantomData,
        }
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base
            .join(path)
            .map_err(|e| EduError::Config(format!("invalid resource path {path:?}: {e}")))
    }

    fn collection_url(&self) -> Result<Url> {
        self.url(&format!("api/{}", R::PATH))
    }

    fn item_url(&self, id: EntityId) -> Result<Url> {
        self.url(&format!("api/{}/{}", R::PATH, id))
    }

    fn alert_header(&self, response: &Response, kind: &str) -> Option<String> {
        let name = format!("x-{}-{}", self.app_name.to_lowercase(), kind);
        response
            .headers()
            .get(name.as_str())
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }

    async fn checked(&self, response: Response, id: Option<EntityId>) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            if let Some(alert) = self.alert_header(&response, "alert") {
                info!(entity = R::NAME, alert = %alert, "backend alert");
            }
            return Ok(response);
        }

        let alert = self.alert_header(&response, "error");
        let body = response.text().await?;
        Err(match (status, id) {
            (StatusCode::NOT_FOUND, Some(id)) => EduError::NotFound {
                entity: R::NAME,
                id,
            },
            (StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY, _) => {
                EduError::Validation {
                    status: status.as_u16(),
                    alert,
                    body: serde_json::from_str(&body)
                        .unwrap_or(serde_json::Value::String(body)),
                }
            }
            _ => EduError::Http {
                status: status.as_u16(),
                body,
            },
        })
    }

    async fn fetch_list(&self, url: Url, predicate: Option<&Predicate>) -> Result<Vec<R>> {
        let mut request = self.client.get(url);
        if let Some(predicate) = predicate {
            request = request.query(predicate);
        }
        let response = self.checked(request.send().await?, None).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait(?Send)]
impl<R, P> Resource<R> for RestResource<R, P>
where
    R: Entity,
    P: ResponseParser<R>,
{
    async fn query(&self, predicate: Option<&Predicate>) -> Result<Vec<R>> {
        let url = self.collection_url()?;
        debug!(entity = R::NAME, %url, ?predicate, "query");
        self.fetch_list(url, predicate).await
    }

    async fn get(&self, id: EntityId) -> Result<R> {
        let url = self.item_url(id)?;
        debug!(entity = R::NAME, %url, "get");
        let response = self.checked(self.client.get(url).send().await?, Some(id)).await?;
        self.parser.parse_one(&response.text().await?)
    }

    async fn update(&self, record: &R) -> Result<R> {
        let url = self.collection_url()?;
        debug!(entity = R::NAME, %url, id = ?record.id(), "update");
        let response = self.client.put(url).json(record).send().await?;
        let response = self.checked(response, record.id()).await?;
        self.parser.parse_one(&response.text().await?)
    }

    async fn delete(&self, id: EntityId) -> Result<()> {
        let url = self.item_url(id)?;
        debug!(entity = R::NAME, %url, "delete");
        self.checked(self.client.delete(url).send().await?, Some(id))
            .await?;
        Ok(())
    }
}

impl<P> RestResource<Student, P> {
    /// Students as they were at `at`, from the backend's audit history.
    pub async fn history(&self, at: DateTime<Utc>) -> Result<Vec<Student>> {
        let stamp = at.to_rfc3339_opts(SecondsFormat::Secs, true);
        let url = self.url(&format!("api/history/{}/{}", Student::PATH, stamp))?;
        debug!(%url, "history");
        self.fetch_list(url, None).await
    }

    /// Spreadsheet of every active student, as the raw bytes the backend renders.
    pub async fn export(&self) -> Result<Vec<u8>> {
        let url = self.url(&format!("api/export/{}", Student::PATH))?;
        debug!(%url, "export");
        let response = self.checked(self.client.get(url).send().await?, None).await?;
        Ok(response.bytes().await?.to_vec())
    }

    /// Uploads a spreadsheet of students for the backend to save.
    pub async fn import(
        &self,
        file_name: &str,
        contents: Vec<u8>,
    ) -> Result<Vec<OperationResult>> {
        let url = self.url(&format!("api/import/{}", Student::PATH))?;
        debug!(%url, file_name, bytes = contents.len(), "import");
        let part = Part::bytes(contents).file_name(file_name.to_string());
        let form = Form::new().part("file", part);
        let response = self.client.post(url).multipart(form).send().await?;
        let response = self.checked(response, None).await?;
        let results: Vec<OperationResult> = serde_json::from_str(&response.text().await?)?;
        let failed = results.iter().filter(|r| !r.is_success()).count();
        info!(rows = results.len(), failed, "students imported");
        Ok(results)
    }
}
