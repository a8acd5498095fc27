use assert_cmd::prelude::*;
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::process::Command;
use std::thread;

/// Serve a single canned HTTP response on a loopback port
fn serve_once(status_line: &'static str, body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());
        let mut line = String::new();
        while reader.read_line(&mut line).unwrap() > 0 && line != "\r\n" {
            line.clear();
        }
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status_line,
            body.len(),
            body
        );
        stream.write_all(response.as_bytes()).unwrap();
    });

    base_url
}

fn flightdesk() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_flightdesk"));
    // Keep the user's config file and env out of the picture
    cmd.env("FLIGHTDESK_CONFIG", "/nonexistent/flightdesk.toml")
        .env_remove("FLIGHTDESK_API_URL")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn lookup_prints_json() {
    let base_url = serve_once(
        "200 OK",
        r#"[{"code":"NRT","name":"Narita International","city":"Tokyo"},{"code":"HND","name":"Haneda","city":"Tokyo"}]"#,
    );

    let output = flightdesk()
        .args(["lookup", "airport", "tokyo", "--json", "--api-url", &base_url])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let parsed: serde_json::Value = serde_json::from_slice(&output).unwrap();
    let codes: Vec<&str> = parsed
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["code"].as_str().unwrap())
        .collect();
    assert_eq!(codes, vec!["NRT", "HND"]);
}

#[test]
fn lookup_rejects_short_query() {
    let output = flightdesk()
        .args(["lookup", "airport", " N ", "--api-url", "http://127.0.0.1:9"])
        .assert()
        .failure()
        .get_output()
        .stderr
        .clone();

    let stderr = String::from_utf8_lossy(&output);
    assert!(stderr.contains("at least 2 characters"), "stderr: {stderr}");
}

#[test]
fn lookup_reports_server_errors() {
    let base_url = serve_once("500 Internal Server Error", "upstream down");

    let output = flightdesk()
        .args(["lookup", "airline", "air", "--api-url", &base_url])
        .assert()
        .failure()
        .get_output()
        .stderr
        .clone();

    let stderr = String::from_utf8_lossy(&output);
    assert!(stderr.contains("Failed to look up airline 'air'"), "stderr: {stderr}");
    assert!(stderr.contains("500"), "stderr: {stderr}");
}

#[test]
fn invalid_api_url_is_rejected() {
    let output = flightdesk()
        .args(["lookup", "airport", "paris", "--api-url", "ftp://example.com"])
        .assert()
        .failure()
        .get_output()
        .stderr
        .clone();

    let stderr = String::from_utf8_lossy(&output);
    assert!(stderr.contains("Invalid API base URL"), "stderr: {stderr}");
}
