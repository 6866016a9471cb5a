use std::sync::{Arc, Mutex};

use anyhow::Context;
use serde_json::{Value, json};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use seedloom_core::{Credentials, Error as CoreError, GeneratedRecord, RecordStore};
use seedloom_store::{PocketBaseStore, StoreOptions};

/// Head and body of every request the canned server saw.
type Seen = Arc<Mutex<Vec<(String, String)>>>;

async fn serve(replies: Vec<(u16, Value)>) -> anyhow::Result<(String, Seen)> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let url = format!("http://{}", listener.local_addr()?);
    let seen: Seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);

    tokio::spawn(async move {
        for (status, body) in replies {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            let Some(request) = read_request(&mut socket).await else {
                return;
            };
            sink.lock().unwrap().push(request);
            let body = body.to_string();
            let response = format!(
                "HTTP/1.1 {status} Canned\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    Ok((url, seen))
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> Option<(String, String)> {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let read = socket.read(&mut chunk).await.ok()?;
        if read == 0 {
            return None;
        }
        buffer.extend_from_slice(&chunk[..read]);
        let text = String::from_utf8_lossy(&buffer).to_string();
        let Some(split) = text.find("\r\n\r\n") else {
            continue;
        };
        let head = &text[..split];
        let length = head
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse::<usize>().ok())
                    .flatten()
            })
            .unwrap_or(0);
        if buffer.len() >= split + 4 + length {
            let body = String::from_utf8_lossy(&buffer[split + 4..split + 4 + length]).to_string();
            return Some((head.to_string(), body));
        }
    }
}

fn store(url: String, page_size: u32) -> anyhow::Result<PocketBaseStore> {
    let options = StoreOptions {
        page_size,
        timeout_secs: 5,
        ..StoreOptions::default().with_url(url)
    };
    Ok(PocketBaseStore::new(options)?)
}

fn record(values: Value) -> GeneratedRecord {
    let Value::Object(map) = values else {
        panic!("expected object");
    };
    GeneratedRecord::new(map)
}

#[tokio::test]
async fn authenticates_then_sends_token_on_create() -> anyhow::Result<()> {
    let (url, seen) = serve(vec![
        (200, json!({"token": "tok-123", "admin": {"id": "a1"}})),
        (
            200,
            json!({"id": "abc123def456ghi", "collectionName": "brands", "brand_name": "Acme", "is_active": true}),
        ),
    ])
    .await?;
    let store = store(url, 200)?;

    let session = store
        .authenticate(&Credentials::new("admin@example.com", "secret"))
        .await?;
    assert_eq!(session.token, "tok-123");
    assert!(store.is_authenticated().await);

    let created = store
        .create_record("brands", &record(json!({"brand_name": "Acme", "is_active": true})))
        .await?;
    assert_eq!(created.id.as_deref(), Some("abc123def456ghi"));
    assert_eq!(created.get("brand_name"), Some(&json!("Acme")));

    let seen = seen.lock().unwrap().clone();
    let (auth_head, auth_body) = seen.first().context("auth request")?;
    assert!(auth_head.starts_with("POST /api/admins/auth-with-password"));
    let auth_body: Value = serde_json::from_str(auth_body)?;
    assert_eq!(auth_body, json!({"identity": "admin@example.com", "password": "secret"}));

    let (create_head, create_body) = seen.get(1).context("create request")?;
    assert!(create_head.starts_with("POST /api/collections/brands/records"));
    assert!(create_head.to_lowercase().contains("authorization: tok-123"));
    let create_body: Value = serde_json::from_str(create_body)?;
    assert_eq!(create_body, json!({"brand_name": "Acme", "is_active": true}));
    Ok(())
}

#[tokio::test]
async fn rejected_login_is_an_authentication_error() -> anyhow::Result<()> {
    let (url, _) = serve(vec![(
        400,
        json!({"code": 400, "message": "Failed to authenticate.", "data": {}}),
    )])
    .await?;
    let store = store(url, 200)?;

    let err = store
        .authenticate(&Credentials::new("admin@example.com", "wrong"))
        .await
        .unwrap_err();

    match err {
        CoreError::Authentication(message) => {
            assert_eq!(message, "status 400: Failed to authenticate.")
        }
        other => panic!("expected authentication error, got {other}"),
    }
    assert!(!store.is_authenticated().await);
    Ok(())
}

#[tokio::test]
async fn validation_failures_surface_pocketbase_message() -> anyhow::Result<()> {
    let (url, _) = serve(vec![(
        400,
        json!({"code": 400, "message": "Failed to create record.", "data": {"name": {"code": "validation_required"}}}),
    )])
    .await?;
    let store = store(url, 200)?;

    let err = store
        .create_record("categories", &record(json!({"name": ""})))
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::Persistence(ref message) if message.contains("Failed to create record.")));
    Ok(())
}

#[tokio::test]
async fn full_list_follows_pages() -> anyhow::Result<()> {
    let item = |id: &str| json!({"id": id, "name": format!("category {id}")});
    let (url, seen) = serve(vec![
        (
            200,
            json!({"page": 1, "perPage": 2, "totalItems": 3, "totalPages": 2, "items": [item("c1"), item("c2")]}),
        ),
        (
            200,
            json!({"page": 2, "perPage": 2, "totalItems": 3, "totalPages": 2, "items": [item("c3")]}),
        ),
    ])
    .await?;
    let store = store(url, 2)?;

    let records = store.get_full_list("categories").await?;

    let ids: Vec<&str> = records.iter().filter_map(|r| r.id.as_deref()).collect();
    assert_eq!(ids, vec!["c1", "c2", "c3"]);
    assert!(records.iter().all(|r| r.get("id").is_none()));

    let seen = seen.lock().unwrap().clone();
    assert!(seen[0].0.starts_with("GET /api/collections/categories/records?page=1&perPage=2"));
    assert!(seen[1].0.starts_with("GET /api/collections/categories/records?page=2&perPage=2"));
    Ok(())
}

#[tokio::test]
async fn list_rejects_items_without_id() -> anyhow::Result<()> {
    let (url, _) = serve(vec![(
        200,
        json!({"page": 1, "totalPages": 1, "items": [{"name": "orphan"}]}),
    )])
    .await?;
    let store = store(url, 200)?;

    let err = store.get_full_list("categories").await.unwrap_err();
    assert!(matches!(err, CoreError::Persistence(_)));
    Ok(())
}
