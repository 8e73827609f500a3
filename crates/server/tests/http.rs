use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use migration::MigratorTrait;

async fn spawn_app() -> std::net::SocketAddr {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    add_user(&db, "alice", "alice@example.com").await;

    let engine = engine::Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    server::spawn_with_listener(engine, db, listener).unwrap()
}

async fn add_user(db: &DatabaseConnection, username: &str, email: &str) {
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO users (username, password, email) VALUES (?, ?, ?)",
        vec![username.into(), "password".into(), email.into()],
    ))
    .await
    .unwrap();
}

async fn request(
    addr: std::net::SocketAddr,
    method: &str,
    path: &str,
    auth: Option<(&str, &str)>,
    body: Option<&str>,
) -> (u16, String) {
    let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();

    let mut req = format!("{method} {path} HTTP/1.1\r\nhost: {addr}\r\nconnection: close\r\n");
    if let Some((user, pass)) = auth {
        let token = BASE64.encode(format!("{user}:{pass}"));
        req.push_str(&format!("authorization: Basic {token}\r\n"));
    }
    match body {
        Some(body) => {
            req.push_str(&format!(
                "content-type: application/json\r\ncontent-length: {}\r\n\r\n{body}",
                body.len()
            ));
        }
        None => req.push_str("\r\n"),
    }

    stream.write_all(req.as_bytes()).await.unwrap();
    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.unwrap();
    let response = String::from_utf8(response).unwrap();

    let status: u16 = response
        .split_whitespace()
        .nth(1)
        .unwrap()
        .parse()
        .unwrap();
    let body = response
        .split_once("\r\n\r\n")
        .map(|(_, b)| b.to_string())
        .unwrap_or_default();
    (status, body)
}

#[tokio::test]
async fn requests_without_credentials_are_rejected() {
    let addr = spawn_app().await;

    let (status, _) = request(addr, "GET", "/trips", None, None).await;
    assert_eq!(status, 401);

    let (status, _) = request(addr, "GET", "/trips", Some(("alice", "wrong")), None).await;
    assert_eq!(status, 401);
}

#[tokio::test]
async fn trip_round_trip_over_http() {
    let addr = spawn_app().await;
    let auth = Some(("alice", "password"));

    let (status, body) = request(
        addr,
        "POST",
        "/trips",
        auth,
        Some(r#"{"name":"Nepal","destination":"Kathmandu","start_date":"2026-10-01","end_date":"2026-10-03"}"#),
    )
    .await;
    assert_eq!(status, 201);
    let created: serde_json::Value = serde_json::from_str(&body).unwrap();
    let trip_id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["name"], "Nepal");

    let (status, body) = request(addr, "GET", "/trips", auth, None).await;
    assert_eq!(status, 200);
    let listed: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(listed["trips"].as_array().unwrap().len(), 1);

    let (status, body) = request(addr, "GET", &format!("/trips/{trip_id}"), auth, None).await;
    assert_eq!(status, 200);
    let itinerary: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(itinerary["days"].as_array().unwrap().len(), 3);

    let (status, body) = request(
        addr,
        "GET",
        &format!("/trips/{trip_id}/balances"),
        auth,
        None,
    )
    .await;
    assert_eq!(status, 200);
    let balances: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(balances["balances"][0]["balance_minor"], 0);
}

#[tokio::test]
async fn engine_errors_surface_as_http_statuses() {
    let addr = spawn_app().await;
    let auth = Some(("alice", "password"));

    let (status, _) = request(addr, "GET", "/trips/nope", auth, None).await;
    assert_eq!(status, 404);

    let (status, body) = request(
        addr,
        "POST",
        "/trips",
        auth,
        Some(r#"{"name":"Backwards","start_date":"2026-10-03","end_date":"2026-10-01"}"#),
    )
    .await;
    assert_eq!(status, 422);
    let err: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert!(err["error"].as_str().unwrap().contains("date"));
}
