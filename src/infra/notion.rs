use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;
use url::Url;

use crate::application::source::{BlockPager, Paginated, SourceError};
use crate::config::SourceSettings;
use crate::domain::block::Block;
use crate::domain::page::Page;

use super::error::InfraError;

pub const DEFAULT_API_BASE_URL: &str = "https://api.notion.com/";
pub const DEFAULT_NOTION_VERSION: &str = "2022-06-28";
/// Largest page size the platform accepts.
pub const MAX_PAGE_SIZE: u32 = 100;

const VERSION_HEADER: &str = "Notion-Version";

/// [`BlockPager`] backed by the platform's REST API.
#[derive(Clone, Debug)]
pub struct NotionHttpClient {
    client: Client,
    base: Url,
    token: String,
    notion_version: String,
    page_size: u32,
}

impl NotionHttpClient {
    pub fn new(settings: &SourceSettings) -> Result<Self, InfraError> {
        let token = settings
            .token
            .clone()
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| {
                InfraError::configuration(
                    "source.token is required (set NOTION_TOKEN or BLOCKDOWN__SOURCE__TOKEN)",
                )
            })?;
        let base = with_trailing_slash(settings.api_base_url.clone());
        let client = Client::builder()
            .user_agent(Self::user_agent())
            .build()
            .map_err(|err| InfraError::http(err.to_string()))?;

        Ok(Self {
            client,
            base,
            token,
            notion_version: settings.notion_version.clone(),
            page_size: settings.page_size.get().min(MAX_PAGE_SIZE),
        })
    }

    pub fn user_agent() -> &'static str {
        concat!("blockdown/", env!("CARGO_PKG_VERSION"))
    }

    fn url(&self, path: &str) -> Result<Url, SourceError> {
        self.base
            .join(path)
            .map_err(|err| SourceError::request(path, err.to_string()))
    }

    fn children_url(&self, block_id: &str, cursor: Option<&str>) -> Result<Url, SourceError> {
        let mut url = self.url(&format!("v1/blocks/{block_id}/children"))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("page_size", &self.page_size.to_string());
            if let Some(cursor) = cursor {
                query.append_pair("start_cursor", cursor);
            }
        }
        Ok(url)
    }

    fn query_body(&self, cursor: Option<&str>) -> Value {
        let mut body = Map::new();
        body.insert("page_size".to_string(), Value::from(self.page_size));
        if let Some(cursor) = cursor {
            body.insert("start_cursor".to_string(), Value::from(cursor));
        }
        Value::Object(body)
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, SourceError> {
        let endpoint = url.path().to_string();
        debug!(%endpoint, "GET");
        let resp = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .header(VERSION_HEADER, &self.notion_version)
            .send()
            .await
            .map_err(|err| SourceError::request(&endpoint, err.to_string()))?;
        Self::handle(&endpoint, resp).await
    }

    async fn post<T: DeserializeOwned>(&self, url: Url, body: &Value) -> Result<T, SourceError> {
        let endpoint = url.path().to_string();
        debug!(%endpoint, "POST");
        let resp = self
            .client
            .post(url)
            .bearer_auth(&self.token)
            .header(VERSION_HEADER, &self.notion_version)
            .json(body)
            .send()
            .await
            .map_err(|err| SourceError::request(&endpoint, err.to_string()))?;
        Self::handle(&endpoint, resp).await
    }

    async fn handle<T: DeserializeOwned>(endpoint: &str, resp: Response) -> Result<T, SourceError> {
        let status = resp.status();
        let bytes = resp
            .bytes()
            .await
            .map_err(|err| SourceError::request(endpoint, err.to_string()))?;
        if !status.is_success() {
            return Err(SourceError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }
        serde_json::from_slice(&bytes).map_err(|err| SourceError::decode(endpoint, err.to_string()))
    }
}

#[async_trait]
impl BlockPager for NotionHttpClient {
    async fn list_children(
        &self,
        block_id: &str,
        cursor: Option<&str>,
    ) -> Result<Paginated<Block>, SourceError> {
        let url = self.children_url(block_id, cursor)?;
        self.get(url).await
    }

    async fn query_database(
        &self,
        database_id: &str,
        cursor: Option<&str>,
    ) -> Result<Paginated<Page>, SourceError> {
        let url = self.url(&format!("v1/databases/{database_id}/query"))?;
        let body = self.query_body(cursor);
        self.post(url, &body).await
    }

    async fn retrieve_page(&self, page_id: &str) -> Result<Page, SourceError> {
        let url = self.url(&format!("v1/pages/{page_id}"))?;
        self.get(url).await
    }
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}
