use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;
use tower::ServiceExt; // for `oneshot`

use mashup::api::{build_router, state::AppState};
use mashup::audio::{AudioEngine, WavEngine};
use mashup::config::Config;
use mashup::notify::Notifier;
use mashup::pipeline::{Fetcher, MashupArchive, Orchestrator, SourceLocator, SourceReference};
use mashup::sources::{Candidate, SourceError, SourceLookup, SourceRetriever};

/// Test config with tight form limits, parsed the way a deployment file would be
fn create_test_config(scratch_root: &Path) -> Config {
    let config_toml = format!(
        r#"
[server]
bind_addr = "127.0.0.1:0"
max_form_bytes = "1KB"

[limits]
max_videos = 5
max_duration_secs = 30

[audio]
engine = "wav"

[storage]
scratch_root = "{}"
"#,
        scratch_root.display()
    );

    toml::from_str(&config_toml).expect("Failed to parse test config")
}

/// Lookup that reports `available` hits and counts calls
struct CountingLookup {
    available: usize,
    calls: AtomicUsize,
}

#[async_trait]
impl SourceLookup for CountingLookup {
    async fn search(&self, _query: &str, limit: usize) -> Result<Vec<Candidate>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok((0..self.available.min(limit))
            .map(|i| Candidate {
                id: Some(format!("clip{i}")),
                url: Some(format!("https://example.com/watch?v=clip{i}")),
                title: Some(format!("Clip {i}")),
            })
            .collect())
    }
}

/// Writes one second of silence per reference
struct SilenceRetriever;

#[async_trait]
impl SourceRetriever for SilenceRetriever {
    async fn retrieve(
        &self,
        _reference: &SourceReference,
        dir: &Path,
        stem: &str,
        format: &str,
    ) -> Result<PathBuf, SourceError> {
        let path = dir.join(format!("{stem}.{format}"));
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).expect("create wav");
        for _ in 0..8000 {
            writer.write_sample(0i16).expect("write sample");
        }
        writer.finalize().expect("finalize wav");
        Ok(path)
    }
}

struct StubNotifier(bool);

#[async_trait]
impl Notifier for StubNotifier {
    async fn notify(&self, _recipient: &str, _archive: &MashupArchive) -> bool {
        self.0
    }
}

struct TestApp {
    router: Router,
    lookup: Arc<CountingLookup>,
    scratch: TempDir,
}

/// Builds a router whose pipeline runs entirely in-process
fn build_test_app(available: usize, delivered: bool) -> TestApp {
    let scratch = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(scratch.path());

    let lookup = Arc::new(CountingLookup {
        available,
        calls: AtomicUsize::new(0),
    });
    let engine: Arc<dyn AudioEngine> = Arc::new(WavEngine::new());

    let orchestrator = Orchestrator::builder()
        .locator(SourceLocator::new(lookup.clone(), config.sources.oversample))
        .fetcher(Fetcher::new(Arc::new(SilenceRetriever), engine.clone(), 2))
        .engine(engine)
        .notifier(Arc::new(StubNotifier(delivered)))
        .scratch_root(config.storage.scratch_root.clone())
        .build();

    TestApp {
        router: build_router(AppState::new(config, orchestrator)),
        lookup,
        scratch,
    }
}

fn form_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_index_renders_form() {
    let app = build_test_app(3, true);

    let response = app
        .router
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("<form method=\"post\""));
    assert!(html.contains("name=\"singer\""));
    assert!(html.contains("max=\"5\""));
}

#[tokio::test]
async fn test_submit_success() {
    let app = build_test_app(10, true);

    let response = app
        .router
        .oneshot(form_request(
            "singer=Some+Band&videos=2&duration=1&email=fan%40example.com",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Mashup created and sent to your email."));
    assert_eq!(app.lookup.calls.load(Ordering::SeqCst), 1);
    assert_eq!(std::fs::read_dir(app.scratch.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_submit_delivery_failure() {
    let app = build_test_app(10, false);

    let response = app
        .router
        .oneshot(form_request(
            "singer=Some+Band&videos=1&duration=1&email=fan%40example.com",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Mashup created but email could not be sent."));
}

#[tokio::test]
async fn test_submit_without_sources() {
    let app = build_test_app(0, true);

    let response = app
        .router
        .oneshot(form_request(
            "singer=Nobody&videos=3&duration=5&email=fan%40example.com",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Could not create mashup (YouTube may have blocked requests)."));
}

#[tokio::test]
async fn test_invalid_form_rerenders_with_notice() {
    let app = build_test_app(3, true);

    let response = app
        .router
        .oneshot(form_request(
            "singer=Band&videos=99&duration=5&email=fan%40example.com",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let html = body_text(response).await;
    assert!(html.contains("Number of videos must be between 1 and 5."));
    assert!(html.contains("<form method=\"post\""));
    assert_eq!(app.lookup.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_non_numeric_and_missing_fields() {
    for body in [
        "singer=Band&videos=two&duration=5&email=fan%40example.com",
        "singer=Band&videos=2&email=fan%40example.com",
        "singer=&videos=2&duration=5&email=fan%40example.com",
        "singer=Band&videos=2&duration=5&email=not-an-email",
    ] {
        let app = build_test_app(3, true);
        let response = app.router.oneshot(form_request(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body={body}");
        assert_eq!(app.lookup.calls.load(Ordering::SeqCst), 0);
    }
}

#[tokio::test]
async fn test_wrong_content_type_rerenders_form() {
    let app = build_test_app(3, true);

    let response = app
        .router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    let html = body_text(response).await;
    assert!(html.contains("The form could not be read."));
}

#[tokio::test]
async fn test_oversized_form_is_rejected() {
    let app = build_test_app(3, true);
    let body = format!(
        "singer={}&videos=1&duration=1&email=fan%40example.com",
        "a".repeat(4096)
    );

    let response = app.router.oneshot(form_request(&body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(app.lookup.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_health() {
    let app = build_test_app(3, true);

    let response = app
        .router
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["jobs"]["jobs_started"], 0);
}
