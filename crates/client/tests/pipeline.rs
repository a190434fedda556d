use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use coverscout_client::{
    CoverPipeline, CoverRenderer, ExtractedCover, FetchConfig, Heuristic, MarkupCoverExtractor, RenderError,
    ResolveOptions, StaticFetcher,
};
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Stands in for a browser that finds `<img data-src=...>` after scripts ran.
struct ScriptedRenderer {
    src: &'static str,
    calls: AtomicUsize,
}

#[async_trait]
impl CoverRenderer for ScriptedRenderer {
    async fn render_cover(&self, url: &Url) -> Result<Option<ExtractedCover>, RenderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Some(ExtractedCover::new(self.src.to_string(), Heuristic::DomQuery, url.as_str())))
    }
}

fn static_pipeline() -> CoverPipeline {
    let fetcher = StaticFetcher::new(FetchConfig::default()).expect("client builds");
    CoverPipeline::new(Arc::new(fetcher), Arc::new(MarkupCoverExtractor::new()))
}

async fn serve(server: &MockServer, route: &str, status: u16, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_raw(body.to_string(), "text/html"))
        .mount(server)
        .await;
}

#[tokio::test]
async fn relative_og_image_resolves_against_page() {
    let server = MockServer::start().await;
    serve(&server, "/manga/1", 200, r#"<head><meta property="og:image" content="/covers/a.jpg"></head>"#).await;

    let cover = static_pipeline()
        .resolve_cover(&format!("{}/manga/1", server.uri()), ResolveOptions::default())
        .await;
    assert_eq!(cover, Some(format!("{}/covers/a.jpg", server.uri())));
}

#[tokio::test]
async fn json_ld_array_uses_first_image() {
    let server = MockServer::start().await;
    let body = r#"<script type="application/ld+json">{"@type":"Book","image":["https://cdn.test/x.png","https://cdn.test/y.png"]}</script>"#;
    serve(&server, "/book", 200, body).await;

    let found = static_pipeline().resolve(&format!("{}/book", server.uri()), ResolveOptions::default()).await.unwrap();
    assert_eq!(found.cover.absolute_url, "https://cdn.test/x.png");
    assert_eq!(found.candidate.source_heuristic, Heuristic::StructuredData);
}

#[tokio::test]
async fn srcset_takes_first_candidate() {
    let server = MockServer::start().await;
    serve(&server, "/gallery", 200, r#"<img class="cover" srcset="/c-320.jpg 320w, /c-640.jpg 640w">"#).await;

    let cover = static_pipeline()
        .resolve_cover(&format!("{}/gallery", server.uri()), ResolveOptions::default())
        .await;
    assert_eq!(cover, Some(format!("{}/c-320.jpg", server.uri())));
}

#[tokio::test]
async fn redirected_page_resolves_against_final_url() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/m/1"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/series/one/"))
        .mount(&server)
        .await;
    serve(&server, "/series/one/", 200, r#"<link rel="image_src" href="cover.webp">"#).await;

    let cover = static_pipeline().resolve_cover(&format!("{}/m/1", server.uri()), ResolveOptions::default()).await;
    assert_eq!(cover, Some(format!("{}/series/one/cover.webp", server.uri())));
}

#[tokio::test]
async fn http_error_falls_back_only_when_allowed() {
    let server = MockServer::start().await;
    serve(&server, "/spa", 404, "<div id=app></div>").await;
    let url = format!("{}/spa", server.uri());

    let renderer = Arc::new(ScriptedRenderer { src: "/img/c.png", calls: AtomicUsize::new(0) });
    let pipeline = static_pipeline().with_renderer(renderer.clone());

    assert_eq!(pipeline.resolve_cover(&url, ResolveOptions::default()).await, None);
    assert_eq!(renderer.calls.load(Ordering::SeqCst), 0);

    let cover = pipeline.resolve_cover(&url, ResolveOptions::with_rendered_fallback()).await;
    assert_eq!(cover, Some(format!("{}/img/c.png", server.uri())));
    assert_eq!(renderer.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn static_hit_skips_renderer() {
    let server = MockServer::start().await;
    serve(&server, "/", 200, r#"<meta name="twitter:image" content="https://cdn.test/t.jpg">"#).await;

    let renderer = Arc::new(ScriptedRenderer { src: "/never.png", calls: AtomicUsize::new(0) });
    let pipeline = static_pipeline().with_renderer(renderer.clone());

    let cover = pipeline.resolve_cover(&server.uri(), ResolveOptions::with_rendered_fallback()).await;
    assert_eq!(cover.as_deref(), Some("https://cdn.test/t.jpg"));
    assert_eq!(renderer.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn page_without_images_yields_none() {
    let server = MockServer::start().await;
    serve(&server, "/", 200, "<html><body><h1>Chapters</h1></body></html>").await;

    assert_eq!(static_pipeline().resolve_cover(&server.uri(), ResolveOptions::default()).await, None);
}
