use std::env;

use anyhow::{Context, Result};
use serde_json::{Value, json};

use seedloom_core::{Credentials, GeneratedRecord, RecordStore};
use seedloom_store::{PocketBaseStore, StoreOptions};

/// Live server settings; the test is skipped unless `TEST_POCKETBASE_URL` is set.
fn live_options() -> Option<(StoreOptions, Credentials, String)> {
    let url = env::var("TEST_POCKETBASE_URL").ok()?;
    let mut options = StoreOptions::default().with_url(url);
    if let Ok(path) = env::var("TEST_POCKETBASE_AUTH_PATH") {
        options.auth_path = path;
    }
    let credentials = Credentials::new(
        env::var("TEST_POCKETBASE_EMAIL").unwrap_or_else(|_| "admin@example.com".to_string()),
        env::var("TEST_POCKETBASE_PASSWORD").unwrap_or_else(|_| "admin12345".to_string()),
    );
    let collection =
        env::var("TEST_POCKETBASE_COLLECTION").unwrap_or_else(|_| "categories".to_string());
    Some((options, credentials, collection))
}

#[tokio::test]
async fn creates_and_lists_records_on_live_server() -> Result<()> {
    let Some((options, credentials, collection)) = live_options() else {
        return Ok(());
    };
    let store = PocketBaseStore::new(options)?;

    store
        .authenticate(&credentials)
        .await
        .context("authenticating against TEST_POCKETBASE_URL")?;

    let name = format!("seedloom-{}", uuid::Uuid::new_v4().simple());
    let Value::Object(values) = json!({ "name": name }) else {
        unreachable!()
    };
    let created = store
        .create_record(&collection, &GeneratedRecord::new(values))
        .await
        .with_context(|| format!("creating a record in {collection}"))?;
    let id = created.id.clone().context("created record has no id")?;

    let listed = store.get_full_list(&collection).await?;
    assert!(listed.iter().any(|record| record.id.as_deref() == Some(id.as_str())));
    Ok(())
}
