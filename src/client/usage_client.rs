use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use tracing::debug;

use crate::client::errors::ClientError;
use crate::client::UsageSource;
use crate::models::{AccountCredential, UsageRecord};

pub const DEFAULT_API_BASE_URL: &str = "https://api.twilio.com";
pub const DEFAULT_PAGE_SIZE: u32 = 50;

const API_VERSION: &str = "2010-04-01";

/// HTTP reader for the monthly usage-records collection.
#[derive(Debug, Clone)]
pub struct UsageClient {
    http: Client,
    base_url: String,
    page_size: u32
}

#[derive(Debug, Deserialize)]
struct UsagePage {
    #[serde(default)]
    usage_records: Vec<UsageRecord>,
    #[serde(default)]
    next_page_uri: Option<String>
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
    code: Option<u32>
}

impl UsageClient {
    /// Creates a client for the given API root, e.g. `https://api.twilio.com`.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let base_url = base_url.trim_end_matches('/');

        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ClientError::InvalidBaseUrl(base_url.to_string()));
        }

        let http = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.to_string(),
            page_size: DEFAULT_PAGE_SIZE
        })
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    fn first_page_url(&self, credential: &AccountCredential) -> String {
        format!(
            "{}/{API_VERSION}/Accounts/{}/Usage/Records/Monthly.json?PageSize={}",
            self.base_url, credential.account_id, self.page_size
        )
    }

    async fn fetch_page(&self, credential: &AccountCredential, url: &str) -> Result<UsagePage, ClientError> {
        let response = self.http
            .get(url)
            .basic_auth(&credential.account_id, Some(&credential.secret))
            .send()
            .await?;

        let response = check_status(response).await?;
        let page = response.json::<UsagePage>().await?;

        debug!(
            "Fetched page of {} usage records for account [{}], more pages: {}",
            page.usage_records.len(),
            credential.masked_id(),
            page.next_page_uri.is_some()
        );

        Ok(page)
    }
}

impl UsageSource for UsageClient {
    fn monthly_records(&self, credential: AccountCredential) -> BoxStream<'static, Result<UsageRecord, ClientError>> {
        let first_page = self.first_page_url(&credential);
        let client = self.clone();

        //NOTE: Each page is requested only once the previous page has been fully consumed downstream
        stream::try_unfold(Some(first_page), move |next_page| {
            let client = client.clone();
            let credential = credential.clone();

            async move {
                let Some(url) = next_page else {
                    return Ok(None);
                };

                let page = client.fetch_page(&credential, &url).await?;
                let next_page = page.next_page_uri.map(|uri| format!("{}{uri}", client.base_url));

                Ok::<_, ClientError>(Some((page.usage_records, next_page)))
            }
        })
        .map_ok(|records| stream::iter(records.into_iter().map(Ok)))
        .try_flatten()
        .boxed()
    }
}

async fn check_status(response: Response) -> Result<Response, ClientError> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ApiErrorBody>(&body) {
        Ok(ApiErrorBody { message: Some(message), code: Some(code) }) => format!("{message} (code {code})"),
        Ok(ApiErrorBody { message: Some(message), .. }) => message,
        _ if body.trim().is_empty() => status.canonical_reason().unwrap_or("no response body").to_string(),
        _ => body
    };

    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(ClientError::RateLimited { message });
    }

    Err(ClientError::Api {
        status: status.as_u16(),
        message
    })
}
