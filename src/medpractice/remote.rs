//! Blocking HTTP client for a remote `medpractice-server`.
//!
//! Every call has three outcomes:
//!
//! - `Ok(Some(value))`: the server answered successfully
//! - `Ok(None)`: the server could not be used (connection refused, timeout,
//!   5xx, undecodable body). The failure is logged and the caller is expected
//!   to fall back to local state.
//! - `Err(_)`: the server understood the request and refused it (4xx). The
//!   error carries the server's [`ErrorKind`].

use crate::commands::Draft;
use crate::error::{ErrorBody, ErrorKind, PracticeError, Result};
use crate::model::{Entity, Id};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

pub struct RemoteClient {
    base_url: String,
    http: Client,
}

impl RemoteClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| PracticeError::Config(format!("could not build HTTP client: {}", e)))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn execute(&self, request: RequestBuilder) -> Result<Option<Response>> {
        let response = match request.send() {
            Ok(response) => response,
            Err(e) => {
                warn!(remote = %self.base_url, error = %e, "remote unreachable, using local state");
                return Ok(None);
            }
        };

        let status = response.status();
        debug!(remote = %self.base_url, url = %response.url(), %status, "remote reply");
        if status.is_success() {
            return Ok(Some(response));
        }
        if status.is_client_error() {
            return Err(rejection(status, response));
        }

        warn!(remote = %self.base_url, %status, "remote failed, using local state");
        Ok(None)
    }

    fn fetch<R: DeserializeOwned>(&self, request: RequestBuilder) -> Result<Option<R>> {
        let Some(response) = self.execute(request)? else {
            return Ok(None);
        };
        match response.json::<R>() {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!(remote = %self.base_url, error = %e, "undecodable reply, using local state");
                Ok(None)
            }
        }
    }

    pub fn list<T: Entity>(&self) -> Result<Option<Vec<T>>> {
        self.fetch(self.http.get(self.url(T::KIND.collection())))
    }

    /// `GET /{collection}` with filter parameters in the query string.
    pub fn list_filtered<T: Entity, Q: Serialize>(&self, filter: &Q) -> Result<Option<Vec<T>>> {
        self.fetch(self.http.get(self.url(T::KIND.collection())).query(filter))
    }

    pub fn search<T: Entity>(&self, query: &str) -> Result<Option<Vec<T>>> {
        let url = self.url(&format!("{}/search", T::KIND.collection()));
        self.fetch(self.http.get(url).query(&[("q", query)]))
    }

    pub fn get<T: Entity>(&self, id: Id) -> Result<Option<T>> {
        let url = self.url(&format!("{}/{}", T::KIND.collection(), id));
        self.fetch(self.http.get(url))
    }

    pub fn create<D: Draft>(&self, draft: &D) -> Result<Option<D::Entity>> {
        let url = self.url(<D::Entity as Entity>::KIND.collection());
        self.fetch(self.http.post(url).json(draft))
    }

    pub fn update<D: Draft>(&self, id: Id, draft: &D) -> Result<Option<D::Entity>> {
        let url = self.url(&format!("{}/{}", <D::Entity as Entity>::KIND.collection(), id));
        self.fetch(self.http.put(url).json(draft))
    }

    pub fn delete<T: Entity>(&self, id: Id) -> Result<Option<()>> {
        let url = self.url(&format!("{}/{}", T::KIND.collection(), id));
        Ok(self.execute(self.http.delete(url))?.map(|_| ()))
    }
}

fn rejection(status: StatusCode, response: Response) -> PracticeError {
    match response.json::<ErrorBody>() {
        Ok(body) => body.into(),
        Err(_) if status == StatusCode::NOT_FOUND => PracticeError::Rejected {
            kind: ErrorKind::NotFound,
            message: "not found on server".to_string(),
        },
        Err(_) => PracticeError::Rejected {
            kind: ErrorKind::ValidationFailed,
            message: format!("server rejected the request ({})", status),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Patient;

    #[test]
    fn trailing_slashes_are_dropped_from_the_base_url() {
        let client = RemoteClient::new("http://localhost:5158/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:5158");
        assert_eq!(client.url("patients/3"), "http://localhost:5158/patients/3");
    }

    #[test]
    fn connection_failures_read_as_unreachable() {
        // Nothing listens on the discard port
        let client = RemoteClient::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        assert!(client.list::<Patient>().unwrap().is_none());
        assert!(client.delete::<Patient>(1).unwrap().is_none());
    }
}
