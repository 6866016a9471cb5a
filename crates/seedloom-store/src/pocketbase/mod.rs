use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use tokio::sync::RwLock;
use tracing::{debug, info};

use seedloom_core::{Credentials, GeneratedRecord, RecordStore, Result, Session};

use crate::error::StoreError;
use crate::options::StoreOptions;

mod wire;

use wire::{AuthRequest, AuthResponse, ListPage, status_error, to_record};

/// Adapter for a PocketBase server.
pub struct PocketBaseStore {
    http: Client,
    options: StoreOptions,
    token: RwLock<Option<String>>,
}

impl PocketBaseStore {
    pub fn new(options: StoreOptions) -> std::result::Result<Self, StoreError> {
        let http = Client::builder()
            .timeout(options.timeout())
            .build()
            .map_err(|err| StoreError::Client(err.to_string()))?;
        Ok(Self {
            http,
            options,
            token: RwLock::new(None),
        })
    }

    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    pub async fn is_authenticated(&self) -> bool {
        self.token.read().await.is_some()
    }

    async fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match self.token.read().await.as_deref() {
            Some(token) => request.header(reqwest::header::AUTHORIZATION, token),
            None => request,
        }
    }

    async fn login(&self, credentials: &Credentials) -> std::result::Result<String, StoreError> {
        let body = AuthRequest {
            identity: &credentials.identity,
            password: &credentials.password,
        };
        let response = send(self.http.post(self.options.auth_url()).json(&body)).await?;
        let auth: AuthResponse = decode(response).await?;
        Ok(auth.token)
    }

    async fn create(
        &self,
        collection: &str,
        record: &GeneratedRecord,
    ) -> std::result::Result<GeneratedRecord, StoreError> {
        let request = self
            .authorized(self.http.post(self.options.records_url(collection)))
            .await
            .json(&record.values);
        let response = send(request).await?;
        to_record(decode(response).await?)
    }

    async fn list_all(
        &self,
        collection: &str,
    ) -> std::result::Result<Vec<GeneratedRecord>, StoreError> {
        let per_page = self.options.page_size.max(1);
        let mut records = Vec::new();
        let mut page = 1u32;

        loop {
            let request = self
                .authorized(self.http.get(self.options.records_url(collection)))
                .await
                .query(&[("page", page), ("perPage", per_page)]);
            let listed: ListPage = decode(send(request).await?).await?;
            let last = listed.is_last(per_page);
            for item in listed.items {
                records.push(to_record(item)?);
            }
            debug!(collection, page, fetched = records.len(), "listed page");
            if last {
                return Ok(records);
            }
            page += 1;
        }
    }
}

async fn send(request: RequestBuilder) -> std::result::Result<Response, StoreError> {
    let response = request
        .send()
        .await
        .map_err(|err| StoreError::Network(err.to_string()))?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(status_error(status, &body))
}

async fn decode<T: serde::de::DeserializeOwned>(
    response: Response,
) -> std::result::Result<T, StoreError> {
    response
        .json()
        .await
        .map_err(|err| StoreError::InvalidResponse(err.to_string()))
}

#[async_trait]
impl RecordStore for PocketBaseStore {
    fn kind(&self) -> &'static str {
        "pocketbase"
    }

    async fn authenticate(&self, credentials: &Credentials) -> Result<Session> {
        let token = self
            .login(credentials)
            .await
            .map_err(StoreError::into_authentication)?;
        *self.token.write().await = Some(token.clone());
        info!(store = "pocketbase", identity = %credentials.identity, "authenticated");
        Ok(Session {
            identity: credentials.identity.clone(),
            token,
        })
    }

    async fn create_record(
        &self,
        collection: &str,
        record: &GeneratedRecord,
    ) -> Result<GeneratedRecord> {
        let created = self
            .create(collection, record)
            .await
            .map_err(StoreError::into_persistence)?;
        debug!(collection, id = ?created.id, "record created");
        Ok(created)
    }

    async fn get_full_list(&self, collection: &str) -> Result<Vec<GeneratedRecord>> {
        self.list_all(collection)
            .await
            .map_err(StoreError::into_persistence)
    }
}
