//! CLI integration tests against a mock catalog backend.

mod common;

use serde_json::{Value, json};
use tempfile::TempDir;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{run_cli_with_env, run_cli_with_env_failure, run_cli_with_env_success};

fn api_url(server: &MockServer) -> String {
    format!("http://127.0.0.1:{}/api", server.address().port())
}

fn grant(access: &str, refresh: &str) -> Value {
    json!({
        "success": true,
        "message": "Login successful",
        "data": {
            "user": {"id": "u1", "name": "Ana", "email": "ana@example.com"},
            "tokens": {"accessToken": access, "refreshToken": refresh}
        }
    })
}

async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(grant("a1", "r1")))
        .mount(server)
        .await;
}

fn login(data_dir: &TempDir, api: &str) {
    run_cli_with_env_success(
        &[
            "auth",
            "login",
            "--email",
            "ana@example.com",
            "--password",
            "hunter22",
        ],
        data_dir.path(),
        api,
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_login_whoami_logout() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    let data_dir = TempDir::new().unwrap();
    let api = api_url(&server);

    login(&data_dir, &api);
    assert!(data_dir.path().join("session.json").exists());

    let stdout = run_cli_with_env_success(&["auth", "whoami"], data_dir.path(), &api);
    assert!(stdout.contains("ana@example.com"));

    let stdout = run_cli_with_env_success(&["auth", "whoami", "--json"], data_dir.path(), &api);
    let state: Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(state["isAuthenticated"], json!(true));

    run_cli_with_env_success(&["auth", "logout"], data_dir.path(), &api);
    let stderr = run_cli_with_env_failure(&["auth", "whoami"], data_dir.path(), &api);
    assert!(stderr.contains("No active session"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_login_failure_reports_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "success": false,
            "message": "Invalid email or password"
        })))
        .mount(&server)
        .await;
    let data_dir = TempDir::new().unwrap();

    let stderr = run_cli_with_env_failure(
        &["auth", "login", "--email", "ana@example.com", "--password", "x"],
        data_dir.path(),
        &api_url(&server),
    );
    assert!(stderr.contains("Invalid email or password"));
    assert!(!data_dir.path().join("session.json").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_list_refreshes_expired_session() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/movies"))
        .and(header("authorization", "Bearer a1"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"tokens": {"accessToken": "a2", "refreshToken": "r2"}}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/movies"))
        .and(header("authorization", "Bearer a2"))
        .and(query_param("genre", "horror"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "movies": [{"id": "m1", "title": "Alien", "rating": 8.5}],
                "pagination": {"total": 1, "page": 1, "limit": 12}
            }
        })))
        .mount(&server)
        .await;

    let data_dir = TempDir::new().unwrap();
    let api = api_url(&server);
    login(&data_dir, &api);

    let stdout = run_cli_with_env_success(
        &["movies", "list", "--genre", "Horror", "--json"],
        data_dir.path(),
        &api,
    );
    let movie: Value = serde_json::from_str(stdout.lines().next().unwrap()).unwrap();
    assert_eq!(movie["title"], json!("Alien"));

    // The refreshed tokens were written through to disk.
    let stored = std::fs::read_to_string(data_dir.path().join("session.json")).unwrap();
    assert!(stored.contains("a2"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_failed_refresh_logs_out() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/movies/m1"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "success": false,
            "message": "Refresh token expired"
        })))
        .mount(&server)
        .await;

    let data_dir = TempDir::new().unwrap();
    let api = api_url(&server);
    login(&data_dir, &api);

    let stderr = run_cli_with_env_failure(&["movies", "get", "m1"], data_dir.path(), &api);
    assert!(stderr.contains("Refresh token expired"));

    let stderr = run_cli_with_env_failure(&["auth", "whoami"], data_dir.path(), &api);
    assert!(stderr.contains("No active session"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_create_requires_session() {
    let server = MockServer::start().await;
    let data_dir = TempDir::new().unwrap();

    let output = run_cli_with_env(
        &[
            "movies",
            "create",
            "--title",
            "Heat",
            "--duration",
            "170",
            "--release-date",
            "1995-12-15",
            "--genre",
            "crime",
            "--director",
            "Michael Mann",
            "--image-url",
            "https://cdn.example.com/heat.png",
        ],
        data_dir.path(),
        &api_url(&server),
    );
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("No active session"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_upload_prints_url() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/upload/image"))
        .and(header("authorization", "Bearer a1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "imageUrl": "https://cdn.example.com/poster.png"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let data_dir = TempDir::new().unwrap();
    let api = api_url(&server);
    login(&data_dir, &api);

    let image = data_dir.path().join("poster.png");
    std::fs::write(&image, [0x89, b'P', b'N', b'G']).unwrap();

    let stdout = run_cli_with_env_success(
        &["upload", image.to_str().unwrap()],
        data_dir.path(),
        &api,
    );
    assert!(stdout.contains("https://cdn.example.com/poster.png"));
}

#[test]
fn test_trailer_embed() {
    let data_dir = TempDir::new().unwrap();
    let stdout = run_cli_with_env_success(
        &["trailer", "https://youtu.be/dQw4w9WgXcQ"],
        data_dir.path(),
        "http://localhost:3000/api",
    );
    assert_eq!(stdout.trim(), "https://www.youtube.com/embed/dQw4w9WgXcQ");

    run_cli_with_env_failure(
        &["trailer", "ftp://example.com/x"],
        data_dir.path(),
        "http://localhost:3000/api",
    );
}
