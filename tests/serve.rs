//! End-to-end: a real listener, a real database file, raw HTTP/1.1 over TCP.

use std::net::SocketAddr;

use rusqlite::Connection;
use tempfile::NamedTempFile;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::oneshot;

use bistro::store::{SharedStore, Store, StoreConfig};
use bistro::{api, Server};

fn seed_database() -> NamedTempFile {
    let file = NamedTempFile::new().unwrap();
    let conn = Connection::open(file.path()).unwrap();
    conn.execute_batch(
        r#"
        CREATE TABLE restaurants (
            id INTEGER PRIMARY KEY, name TEXT, cuisine TEXT, rating REAL,
            isVeg INTEGER, hasOutdoorSeating INTEGER, isLuxury INTEGER
        );
        CREATE TABLE dishes (
            id INTEGER PRIMARY KEY, name TEXT, price REAL, rating REAL, isVeg INTEGER
        );
        INSERT INTO restaurants VALUES (1, 'Spice Hub', 'Indian', 4.5, 1, 1, 0);
        INSERT INTO restaurants VALUES (2, 'Harbor Grill', 'Seafood', 4.2, 0, 1, 1);
        INSERT INTO dishes VALUES (1, 'Paneer Tikka', 220, 4.6, 1);
        INSERT INTO dishes VALUES (2, 'Fish Curry', 320, 4.4, 0);
        "#,
    )
    .unwrap();
    file
}

async fn request(addr: SocketAddr, method: &str, target: &str) -> (u16, String, String) {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let req = format!("{method} {target} HTTP/1.1\r\nhost: localhost\r\nconnection: close\r\n\r\n");
    stream.write_all(req.as_bytes()).await.unwrap();

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.unwrap();
    let raw = String::from_utf8(raw).unwrap();

    let (head, body) = raw.split_once("\r\n\r\n").unwrap();
    let status = head.split(' ').nth(1).unwrap().parse().unwrap();
    (status, head.to_ascii_lowercase(), body.to_owned())
}

#[tokio::test]
async fn serves_queries_from_a_database_file() {
    let db_file = seed_database();
    let store = Store::open(&StoreConfig::new(db_file.path())).unwrap();

    let server = Server::bind("127.0.0.1:0".parse().unwrap()).await.unwrap();
    let addr = server.local_addr().unwrap();
    let (stop, stopped) = oneshot::channel::<()>();
    let handle = tokio::spawn(server.serve_with_shutdown(
        api::routes(SharedStore::ready(store)),
        async move { let _ = stopped.await; },
    ));

    let (status, head, body) = request(addr, "GET", "/restaurants/cuisine/Indian").await;
    assert_eq!(status, 200);
    assert!(head.contains("access-control-allow-origin: *"), "{head}");
    let body: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["restaurants"]["name"], "Spice Hub");

    let (status, _, body) = request(addr, "GET", "/restaurants/cuisine/Mexican").await;
    assert_eq!(status, 404);
    assert_eq!(body, r#"{"message":"No Restaurant found"}"#);

    let (status, _, body) = request(addr, "GET", "/dishes/sort-by-price").await;
    assert_eq!(status, 200);
    let body: serde_json::Value = serde_json::from_str(&body).unwrap();
    let names: Vec<_> = body["dishes"].as_array().unwrap().iter().map(|d| d["name"].clone()).collect();
    assert_eq!(names, [serde_json::json!("Paneer Tikka"), serde_json::json!("Fish Curry")]);

    let (status, head, body) = request(addr, "OPTIONS", "/dishes").await;
    assert_eq!(status, 204);
    assert!(head.contains("access-control-allow-methods: get,head,put,patch,post,delete"), "{head}");
    assert!(body.is_empty());

    stop.send(()).unwrap();
    handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn uninstalled_store_answers_500() {
    let server = Server::bind("127.0.0.1:0".parse().unwrap()).await.unwrap();
    let addr = server.local_addr().unwrap();
    let (stop, stopped) = oneshot::channel::<()>();
    let handle = tokio::spawn(server.serve_with_shutdown(
        api::routes(SharedStore::new()),
        async move { let _ = stopped.await; },
    ));

    let (status, _, body) = request(addr, "GET", "/restaurants").await;
    assert_eq!(status, 500);
    assert_eq!(body, r#"{"error":"Database not initialized yet"}"#);

    stop.send(()).unwrap();
    handle.await.unwrap().unwrap();
}
