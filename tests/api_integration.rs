//! HTTP API integration tests
//!
//! Drive the full router (access gates, handlers, XML views) against the
//! in-memory backend and a scratch upload directory.

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Request, StatusCode, header},
};
use base64::{Engine, engine::general_purpose::STANDARD};
use restjpg::{
    config::Config,
    http::{AppState, build_router},
    storage::{MemoryStorage, Storage},
    templates::build_env,
};
use std::{path::PathBuf, sync::Arc};
use tower::ServiceExt;
use url::{Url, form_urlencoded};

const REDIRECT_URI: &str = "https://gallery.example.com/callback";
const JPEG: &[u8] = &[
    0xFF, 0xD8, 0xFF, 0xDB, 0x00, 0x43, 0x00, 0x08, 0x06, 0x06, 0x07, 0x06, 0x05, 0x08, 0xFF, 0xD9,
];
const BOUNDARY: &str = "restjpg-test-boundary";

struct TestApp {
    router: Router,
    upload_dir: PathBuf,
}

struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl TestResponse {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    fn header(&self, name: header::HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    fn challenges(&self) -> Vec<String> {
        self.headers
            .get_all(header::WWW_AUTHENTICATE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .map(str::to_string)
            .collect()
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.upload_dir);
    }
}

fn basic(id: &str, secret: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{id}:{secret}")))
}

fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

fn element_text(body: &str, element: &str) -> String {
    let open = format!("<{element}>");
    let start = body
        .find(&open)
        .unwrap_or_else(|| panic!("no <{element}> in {body}"))
        + open.len();
    let end = body[start..].find(&format!("</{element}>")).unwrap();
    body[start..start + end].to_string()
}

/// Text of the first `<link rel="...">` element in `body`
fn link_text(body: &str, rel: &str) -> String {
    let start = body
        .find(&format!("<link rel=\"{rel}\""))
        .unwrap_or_else(|| panic!("no {rel} link in {body}"));
    let rest = &body[start..];
    let text_start = rest.find('>').unwrap() + 1;
    let text_end = rest.find("</link>").unwrap();
    rest[text_start..text_end].to_string()
}

fn multipart_body(title: Option<&str>, file: Option<&[u8]>) -> Vec<u8> {
    let mut body = Vec::new();
    if let Some(title) = title {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"title\"\r\n\r\n{title}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some(file) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"photo.jpg\"\r\nContent-Type: image/jpeg\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(file);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

impl TestApp {
    fn new() -> Self {
        let upload_dir = std::env::temp_dir().join(format!(
            "restjpg-api-{}",
            hex::encode(rand::random::<[u8; 8]>())
        ));

        let config = Config {
            version: "test".to_string(),
            http_port: "8080".to_string().try_into().unwrap(),
            external_base: "http://localhost:8080".to_string().try_into().unwrap(),
            storage_backend: "memory".to_string(),
            database_url: None,
            upload_path: upload_dir.to_string_lossy().to_string().try_into().unwrap(),
            auth_realm: "rest-jpg".to_string().try_into().unwrap(),
            max_upload_size: "1MB".to_string().try_into().unwrap(),
        };
        let templates = build_env("http://localhost:8080".to_string(), "test".to_string()).unwrap();
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());

        let router = build_router(AppState::new(
            Arc::new(config),
            Arc::new(templates),
            storage,
        ));
        Self { router, upload_dir }
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let (parts, body) = response.into_parts();
        let body = axum::body::to_bytes(body, usize::MAX).await.unwrap().to_vec();
        TestResponse {
            status: parts.status,
            headers: parts.headers,
            body,
        }
    }

    async fn request(&self, method: &str, uri: &str, auth: Option<&str>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(auth) = auth {
            builder = builder.header(header::AUTHORIZATION, auth);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    async fn get(&self, uri: &str, auth: Option<&str>) -> TestResponse {
        self.request("GET", uri, auth).await
    }

    async fn delete(&self, uri: &str, auth: Option<&str>) -> TestResponse {
        self.request("DELETE", uri, auth).await
    }

    async fn post_form(&self, uri: &str, form: &[(&str, &str)]) -> TestResponse {
        let body = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(form)
            .finish();
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    async fn upload(&self, auth: &str, title: Option<&str>, file: Option<&[u8]>) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri("/upload")
            .header(header::AUTHORIZATION, auth)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(multipart_body(title, file)))
            .unwrap();
        self.send(request).await
    }

    async fn register_user(&self, id: &str, password: &str) {
        let response = self
            .post_form(
                "/register",
                &[("id", id), ("name", "Test User"), ("password", password)],
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.text());
    }

    /// Returns the new client's id and secret
    async fn register_client(&self) -> (String, String) {
        let response = self
            .post_form(
                "/oauth/register-client",
                &[("name", "Gallery"), ("redirect_uri", REDIRECT_URI)],
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.text());
        let body = response.text();
        (element_text(&body, "id"), element_text(&body, "secret"))
    }

    async fn authorize_response(
        &self,
        auth: &str,
        client_id: &str,
        redirect_uri: &str,
        scopes: &str,
    ) -> TestResponse {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("response_type", "token")
            .append_pair("client_id", client_id)
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("scopes", scopes)
            .append_pair("state", "xyz")
            .finish();
        self.get(&format!("/oauth/authorize?{query}"), Some(auth))
            .await
    }

    /// Run the implicit grant for `user` and return the issued token
    async fn grant(&self, user: &str, password: &str, client_id: &str, scopes: &str) -> String {
        let response = self
            .authorize_response(&basic(user, password), client_id, REDIRECT_URI, scopes)
            .await;
        assert_eq!(response.status, StatusCode::SEE_OTHER, "{}", response.text());

        let location = Url::parse(response.header(header::LOCATION).unwrap()).unwrap();
        location
            .query_pairs()
            .find(|(key, _)| key == "token")
            .map(|(_, value)| value.into_owned())
            .unwrap()
    }

    async fn upload_image(&self, auth: &str, title: &str) -> String {
        let response = self.upload(auth, Some(title), Some(JPEG)).await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.text());
        element_text(&response.text(), "id")
    }
}

#[tokio::test]
async fn test_registration_and_login() {
    let app = TestApp::new();
    app.register_user("alice", "s3cret").await;

    let response = app.get("/users", Some(&basic("alice", "s3cret"))).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header(header::CONTENT_TYPE), Some("application/xml"));
    assert_eq!(
        response.header(header::CACHE_CONTROL),
        Some("no-cache, no-store, must-revalidate")
    );
    assert!(response.text().contains("<id>alice</id>"));

    let response = app.get("/user/alice", Some(&basic("alice", "wrong"))).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert!(response.text().contains("<code>401</code>"));
    assert!(response.text().contains("Invalid credentials."));
    assert_eq!(
        response.challenges(),
        vec![
            r#"Basic realm="rest-jpg", charset="UTF-8""#.to_string(),
            r#"Bearer realm="rest-jpg""#.to_string(),
        ]
    );
}

#[tokio::test]
async fn test_registration_responses_carry_ids() {
    let app = TestApp::new();

    let response = app
        .post_form(
            "/register",
            &[("id", "carol"), ("name", "Carol"), ("password", "pw")],
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let body = response.text();
    assert_eq!(element_text(&body, "id"), "carol");
    assert_eq!(element_text(&body, "name"), "Carol");
    assert_eq!(
        link_text(&body, "images"),
        "http://localhost:8080/user/carol/images"
    );

    let response = app
        .post_form(
            "/oauth/register-client",
            &[("name", "Gallery"), ("redirect_uri", REDIRECT_URI)],
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let body = response.text();
    let client_id = element_text(&body, "id");
    assert!(client_id.starts_with('$'));
    assert_eq!(element_text(&body, "redirect_uri"), REDIRECT_URI);
    assert!(!element_text(&body, "secret").is_empty());

    let response = app
        .get(&format!("/oauth/client/{client_id}"), Some(&basic("carol", "pw")))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(element_text(&response.text(), "id"), client_id);
}

#[tokio::test]
async fn test_registration_rejects_duplicates_and_bad_input() {
    let app = TestApp::new();
    app.register_user("alice", "s3cret").await;

    let response = app
        .post_form(
            "/register",
            &[("id", "alice"), ("name", "Other"), ("password", "x")],
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert!(response.text().contains("User ID already registered."));

    let response = app
        .post_form("/register", &[("id", "bob"), ("name", "Bob")])
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.text().contains("password"));

    let response = app
        .post_form(
            "/register",
            &[("id", "bob smith"), ("name", "Bob"), ("password", "x")],
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_authorization_headers() {
    let app = TestApp::new();
    app.register_user("alice", "s3cret").await;

    let response = app.get("/users", Some("garbage")).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.challenges().is_empty());

    let response = app.get("/users", Some("Digest xyz")).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app.get("/users", Some("Basic !!!not-base64")).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app.get("/users", None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.challenges().len(), 2);
}

#[tokio::test]
async fn test_empty_bearer_token_is_unauthorized() {
    let app = TestApp::new();
    app.register_user("alice", "s3cret").await;
    let (client_id, _) = app.register_client().await;

    for header in ["Bearer ", "Bearer", "bearer    "] {
        let response = app
            .get(&format!("/oauth/client/{client_id}"), Some(header))
            .await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED, "{header:?}");
        assert!(response.text().contains("Invalid token."));
        assert_eq!(response.challenges().len(), 2);

        let response = app.get("/users", Some(header)).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED, "{header:?}");
    }
}

#[tokio::test]
async fn test_token_issue_inspect_revoke() {
    let app = TestApp::new();
    app.register_user("alice", "s3cret").await;
    let (client_id, _) = app.register_client().await;

    let response = app
        .authorize_response(&basic("alice", "s3cret"), &client_id, REDIRECT_URI, "read")
        .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert!(response.text().contains("Authorization granted."));
    let location = response.header(header::LOCATION).unwrap();
    assert!(location.starts_with(REDIRECT_URI));
    assert!(location.contains("scopes=read"));
    assert!(location.contains("state=xyz"));

    let token = app.grant("alice", "s3cret", &client_id, "read").await;
    assert_eq!(token.len(), 128);

    let response = app.get("/oauth/token", Some(&bearer(&token))).await;
    assert_eq!(response.status, StatusCode::OK);
    let body = response.text();
    assert_eq!(element_text(&body, "user_id"), "alice");
    assert_eq!(element_text(&body, "client_id"), client_id);
    assert_eq!(element_text(&body, "scopes"), "read");

    let response = app.get("/user/alice/tokens", Some(&basic("alice", "s3cret"))).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.text().contains(&token));

    let response = app
        .delete(
            &format!("/oauth/token/{token}"),
            Some(&basic("alice", "s3cret")),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.text().contains("Token successfully revoked."));

    let response = app.get("/oauth/token", Some(&bearer(&token))).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.challenges(),
        vec![r#"Bearer realm="rest-jpg""#.to_string()]
    );
}

#[tokio::test]
async fn test_grant_is_always_returned_in_query() {
    let app = TestApp::new();
    app.register_user("alice", "s3cret").await;
    let (client_id, _) = app.register_client().await;

    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("response_type", "token")
        .append_pair("client_id", &client_id)
        .append_pair("redirect_uri", REDIRECT_URI)
        .append_pair("scopes", "read")
        .append_pair("response_mode", "fragment")
        .finish();
    let response = app
        .get(
            &format!("/oauth/authorize?{query}"),
            Some(&basic("alice", "s3cret")),
        )
        .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);

    let location = Url::parse(response.header(header::LOCATION).unwrap()).unwrap();
    assert_eq!(location.fragment(), None);
    let token = location
        .query_pairs()
        .find(|(key, _)| key == "token")
        .map(|(_, value)| value.into_owned())
        .unwrap();

    let response = app.get("/oauth/token", Some(&bearer(&token))).await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_authorize_validation() {
    let app = TestApp::new();
    app.register_user("alice", "s3cret").await;
    let (client_id, _) = app.register_client().await;
    let auth = basic("alice", "s3cret");

    let response = app
        .authorize_response(&auth, &client_id, "https://evil.example.com/cb", "read")
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app
        .authorize_response(&auth, "$unknown", REDIRECT_URI, "read")
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(response.text().contains("Client not found."));

    let response = app
        .authorize_response(&auth, &client_id, REDIRECT_URI, "read admin")
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.text().contains("Invalid scopes."));

    let response = app
        .get(
            "/oauth/authorize?response_type=code&client_id=x&scopes=read&redirect_uri=y",
            Some(&auth),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let token = app.grant("alice", "s3cret", &client_id, "write").await;
    let response = app
        .authorize_response(&bearer(&token), &client_id, REDIRECT_URI, "read")
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert!(
        response
            .text()
            .contains("Invalid credential type for this endpoint.")
    );
}

#[tokio::test]
async fn test_scope_enforcement() {
    let app = TestApp::new();
    app.register_user("alice", "s3cret").await;
    let (client_id, _) = app.register_client().await;

    let read_token = app.grant("alice", "s3cret", &client_id, "read").await;
    let response = app
        .upload(&bearer(&read_token), Some("Sunset"), Some(JPEG))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert!(
        response
            .text()
            .contains("Insufficient token scope for this endpoint.")
    );

    let response = app.get("/users", Some(&bearer(&read_token))).await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app
        .get(&format!("/oauth/client/{client_id}"), Some(&bearer(&read_token)))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(!response.text().contains("<secret>"));

    let write_token = app.grant("alice", "s3cret", &client_id, "write").await;
    let image_id = app.upload_image(&bearer(&write_token), "Sunset").await;

    let response = app
        .get(&format!("/image/{image_id}"), Some(&bearer(&read_token)))
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app
        .get("/user/alice/tokens", Some(&bearer(&write_token)))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_sessions_are_confined_to_their_user() {
    let app = TestApp::new();
    app.register_user("alice", "s3cret").await;
    app.register_user("bob", "hunter2").await;
    let (client_id, _) = app.register_client().await;

    let bobs_image = app.upload_image(&basic("bob", "hunter2"), "Bob's cat").await;
    let alice_token = app.grant("alice", "s3cret", &client_id, "write").await;
    let alices_image = app.upload_image(&bearer(&alice_token), "Alice's dog").await;

    let response = app
        .get(&format!("/image/{bobs_image}"), Some(&bearer(&alice_token)))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app
        .delete(&format!("/image/{bobs_image}"), Some(&bearer(&alice_token)))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app
        .get("/user/bob/images", Some(&bearer(&alice_token)))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app
        .get(&format!("/image/{alices_image}"), Some(&bearer(&alice_token)))
        .await;
    assert_eq!(response.status, StatusCode::OK);

    // Password users may browse other users' images but not change them.
    let response = app
        .get("/user/bob/images", Some(&basic("alice", "s3cret")))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.text().contains(&format!("<id>{bobs_image}</id>")));

    let response = app
        .delete(&format!("/image/{bobs_image}"), Some(&basic("alice", "s3cret")))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app
        .delete("/user/bob", Some(&basic("alice", "s3cret")))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_client_deletion_revokes_tokens() {
    let app = TestApp::new();
    app.register_user("alice", "s3cret").await;
    let (client_id, secret) = app.register_client().await;
    let token = app.grant("alice", "s3cret", &client_id, "read").await;

    let response = app
        .delete(
            &format!("/oauth/client/{client_id}"),
            Some(&basic("alice", "s3cret")),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app
        .delete(
            &format!("/oauth/client/{client_id}"),
            Some(&basic(&client_id, "not-the-secret")),
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = app
        .delete(
            &format!("/oauth/client/{client_id}"),
            Some(&basic(&client_id, &secret)),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.text().contains("Client successfully deleted."));

    let response = app.get("/oauth/token", Some(&bearer(&token))).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = app
        .get(&format!("/oauth/client/{client_id}"), Some(&basic("alice", "s3cret")))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_upload_and_download() {
    let app = TestApp::new();
    app.register_user("alice", "s3cret").await;
    let auth = basic("alice", "s3cret");

    let response = app.upload(&auth, Some("Sunset"), Some(JPEG)).await;
    assert_eq!(response.status, StatusCode::OK);
    let body = response.text();
    let image_id = element_text(&body, "id");
    assert_eq!(element_text(&body, "owner_id"), "alice");
    assert_eq!(
        response.header(header::LOCATION),
        Some(format!("http://localhost:8080/image/{image_id}").as_str())
    );
    assert_eq!(
        link_text(&body, "download"),
        format!("http://localhost:8080/image/{image_id}/download")
    );
    assert!(app.upload_dir.join("alice").join(format!("{image_id}.jpg")).exists());

    let response = app
        .get(&format!("/image/{image_id}/download"), Some(&auth))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header(header::CONTENT_TYPE), Some("image/jpeg"));
    assert_eq!(response.body, JPEG);

    let response = app.get("/user/alice/images", Some(&auth)).await;
    assert_eq!(response.status, StatusCode::OK);
    let body = response.text();
    assert!(body.contains("<title>Sunset</title>"));
    assert!(body.contains(&format!("<id>{image_id}</id>")));
    assert_eq!(
        link_text(&body, "download"),
        format!("http://localhost:8080/image/{image_id}/download")
    );

    let response = app
        .delete(&format!("/image/{image_id}"), Some(&auth))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(!app.upload_dir.join("alice").join(format!("{image_id}.jpg")).exists());

    let response = app.get(&format!("/image/{image_id}"), Some(&auth)).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(response.text().contains("Image not found."));
}

#[tokio::test]
async fn test_upload_rejects_invalid_files() {
    let app = TestApp::new();
    app.register_user("alice", "s3cret").await;
    let auth = basic("alice", "s3cret");

    let response = app
        .upload(&auth, Some("Not a photo"), Some(b"GIF89a not a jpeg"))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(
        response
            .text()
            .contains("Unsupported file type, only JPEG allowed.")
    );

    let response = app.upload(&auth, None, Some(JPEG)).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.text().contains("title"));

    let response = app.upload(&auth, Some("Empty"), None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.text().contains("file"));
}

#[tokio::test]
async fn test_delete_user_removes_everything() {
    let app = TestApp::new();
    app.register_user("alice", "s3cret").await;
    app.register_user("bob", "hunter2").await;
    let (client_id, _) = app.register_client().await;
    let token = app.grant("alice", "s3cret", &client_id, "write").await;
    app.upload_image(&basic("alice", "s3cret"), "Sunset").await;

    let response = app.delete("/user/alice", Some(&bearer(&token))).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app.delete("/user/alice", Some(&basic("alice", "s3cret"))).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(!app.upload_dir.join("alice").exists());

    let response = app.get("/oauth/token", Some(&bearer(&token))).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = app.get("/user/alice", Some(&basic("bob", "hunter2"))).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(response.text().contains("User not found."));
}

#[tokio::test]
async fn test_unknown_routes_render_xml_errors() {
    let app = TestApp::new();

    let response = app.get("/no/such/route", None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.header(header::CONTENT_TYPE), Some("application/xml"));
    assert!(response.text().contains("<code>404</code>"));
    assert!(response.text().contains("<message>Not Found.</message>"));

    let response = app.request("PUT", "/users", None).await;
    assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
    assert!(response.text().contains("<code>405</code>"));
}
