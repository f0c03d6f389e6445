//! Request plumbing shared by every typed call.
//!
//! A connection carries the service base URL, a cookie-keeping HTTP client
//! for account sessions, and the anonymous device token sent as a header on
//! every request.

use eyre::{bail, Result, WrapErr};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;
use versemark_primitives::owner::DeviceId;
use versemark_server_primitives::DEVICE_ID_HEADER;

#[derive(Clone, Copy, Debug)]
enum RequestType {
    Get,
    Put,
    Post,
    Delete,
}

#[derive(Clone, Debug)]
pub struct ConnectionInfo {
    pub api_url: Url,
    pub client: Client,
    pub device_id: Option<DeviceId>,
}

impl ConnectionInfo {
    pub fn new(api_url: Url, device_id: Option<DeviceId>) -> Result<Self> {
        let client = Client::builder()
            .cookie_store(true)
            .build()
            .wrap_err("failed to construct HTTP client")?;

        Ok(Self {
            api_url,
            client,
            device_id,
        })
    }

    pub async fn get<O: DeserializeOwned>(&self, path: &str) -> Result<O> {
        self.request(RequestType::Get, path, None::<()>).await
    }

    pub async fn put<I, O>(&self, path: &str, body: I) -> Result<O>
    where
        I: Serialize,
        O: DeserializeOwned,
    {
        self.request(RequestType::Put, path, Some(body)).await
    }

    pub async fn post<I, O>(&self, path: &str, body: Option<I>) -> Result<O>
    where
        I: Serialize,
        O: DeserializeOwned,
    {
        self.request(RequestType::Post, path, body).await
    }

    pub async fn delete<O: DeserializeOwned>(&self, path: &str) -> Result<O> {
        self.request(RequestType::Delete, path, None::<()>).await
    }

    async fn request<I, O>(&self, req_type: RequestType, path: &str, body: Option<I>) -> Result<O>
    where
        I: Serialize,
        O: DeserializeOwned,
    {
        let mut url = self.api_url.clone();
        url.set_path(path);

        let mut builder = match req_type {
            RequestType::Get => self.client.get(url),
            RequestType::Put => self.client.put(url),
            RequestType::Post => self.client.post(url),
            RequestType::Delete => self.client.delete(url),
        };

        if let Some(ref device_id) = self.device_id {
            builder = builder.header(DEVICE_ID_HEADER, device_id.as_str());
        }

        if let Some(ref body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            bail!("request rejected: no account session or device token was accepted");
        }

        if status == StatusCode::FORBIDDEN {
            bail!("request rejected: this resource requires an account session");
        }

        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            bail!("request failed with status {status}: {detail}");
        }

        response.json::<O>().await.map_err(Into::into)
    }
}
