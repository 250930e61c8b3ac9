//! Shared helpers for license server tests.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDate;
use license_server::server::{AppState, build_router};

pub const SECRET: &str = "SECRET";
pub const KEY: &str = "KEY";

/// The reference envelope: `{id: "test", valid 2000-1-1 .. 3000-1-1}` signed with `SECRET`.
pub const TEST_LICENSE: &str = "eyJsaWNlbnNlIjp7ImlkIjoidGVzdCIsIm1ldGEiOnt9LCJ2YWxpZF9mcm9tIjoiMjAwMC0xLTEiLCJ2YWxpZF91bnRpbCI6IjMwMDAtMS0xIn0sInNpZ25hdHVyZSI6ImVhYzJkMjI2ZjA0NTFjMmQ5NTM2NzkxZDg2NDEyMjRhZWFmMjkwY2NmZjEzYWQxZDE0YmYxY2U2OGMyYzJmMmQifQ==";

pub fn fixed_today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
}

/// Spin up the HTTP server on an OS-assigned port, returning the base URL.
///
/// The server runs on its own runtime thread so tests can use the blocking
/// client.
pub fn spawn_test_server() -> String {
    let state = AppState::new(SECRET, KEY).with_clock(fixed_today);
    let app = build_router(Arc::new(state));

    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.set_nonblocking(true).unwrap();
    let port = listener.local_addr().unwrap().port();

    std::thread::spawn(move || {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::from_std(listener).unwrap();
            axum::serve(listener, app).await.unwrap();
        });
    });

    format!("http://127.0.0.1:{}", port)
}

pub fn client() -> reqwest::blocking::Client {
    reqwest::blocking::Client::new()
}
