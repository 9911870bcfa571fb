use log::debug;
use reqwest::blocking::{Client, Response};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;

use crate::remote::{
    RemoteError, RemoteResult, RemoteSheet, SheetId, SheetPayload, SheetSource, SheetSummary,
};

pub const DEFAULT_API_BASE: &str = "https://api.smartsheet.com/2.0";

const USER_AGENT_VALUE: &str = concat!("sheet-sync/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct SheetListPayload {
    #[serde(default)]
    data: Vec<SheetSummary>,
}

#[derive(Debug, Clone)]
pub struct SmartsheetClient {
    client: Client,
    api_base: String,
    access_token: String,
}

impl SmartsheetClient {
    pub fn new(access_token: impl Into<String>, api_base: impl Into<String>) -> RemoteResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        let api_base = api_base.into().trim_end_matches('/').to_string();
        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|source| RemoteError::Http {
                url: api_base.clone(),
                source,
            })?;
        Ok(Self {
            client,
            api_base,
            access_token: access_token.into(),
        })
    }

    fn get(&self, url: &str) -> RemoteResult<Response> {
        debug!("GET {url}");
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .map_err(|source| RemoteError::Http {
                url: url.to_string(),
                source,
            })?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().unwrap_or_default();
        Err(RemoteError::Status {
            url: url.to_string(),
            status: status.as_u16(),
            body,
        })
    }

    fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> RemoteResult<T> {
        let body = self
            .get(url)?
            .text()
            .map_err(|source| RemoteError::Http {
                url: url.to_string(),
                source,
            })?;
        Ok(serde_json::from_str(&body)?)
    }
}

impl SheetSource for SmartsheetClient {
    fn list_sheets(&self) -> RemoteResult<Vec<SheetSummary>> {
        let url = format!("{}/sheets?includeAll=true", self.api_base);
        let payload: SheetListPayload = self.get_json(&url)?;
        Ok(payload.data)
    }

    fn get_sheet(&self, id: SheetId) -> RemoteResult<RemoteSheet> {
        let url = format!("{}/sheets/{id}", self.api_base);
        let payload: SheetPayload = self.get_json(&url)?;
        Ok(payload.into_sheet())
    }
}
