//! Integration tests for the crawler
//!
//! These tests use wiremock to serve small gallery sites and run the full
//! cycle end-to-end with the static renderer: configuration, run folder,
//! traversal and report.

use chrono::Local;
use gallery_sweep::config::{load_from_lookup, read_file_config, ConfigOverrides, FileConfig};
use gallery_sweep::output::{RunDirectory, REPORT_FILE_NAME};
use gallery_sweep::renderer::{PageElement, PageRenderer, StaticRenderer};
use gallery_sweep::{execute_run, ConfigError, CrawlConfig, DoneReason, RenderError, Traversal};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::watch;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// An HTML response
fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(
        format!("<html><head><title>Gallery</title></head><body>{}</body></html>", body),
        "text/html",
    )
}

async fn mount_page(server: &MockServer, page_path: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(response)
        .mount(server)
        .await;
}

/// Test configuration: fast settles, short timeout
fn test_config(seed: &str, max_pages: u32, output_dir: &Path) -> CrawlConfig {
    let mut config = CrawlConfig::with_defaults(Url::parse(seed).expect("Failed to parse seed"));
    config.max_pages = max_pages;
    config.page_load_timeout = Duration::from_secs(1);
    config.scroll_settle = Duration::ZERO;
    config.navigation_settle = Duration::ZERO;
    config.user_agent = Some("TestBot/1.0".to_string());
    config.output_dir = output_dir.to_path_buf();
    config
}

fn paths(urls: &[Url]) -> Vec<String> {
    urls.iter().map(|u| u.path().to_string()).collect()
}

/// Mounts `count` gallery pages chained by rel="next", two images each
async fn mount_chained_gallery(server: &MockServer, count: u32) {
    for n in 1..=count {
        let mut body = format!(
            r#"<img src="/img/{n}a.jpg" alt="a"><img src="/img/{n}b.jpg" alt="b">"#
        );
        if n < count {
            body.push_str(&format!(r#"<a rel="next" href="/gallery/{}">Next</a>"#, n + 1));
        }
        mount_page(server, &format!("/gallery/{}", n), html(&body)).await;
    }
}

#[tokio::test]
async fn test_three_pages_linked_by_rel_next() {
    let server = MockServer::start().await;
    mount_chained_gallery(&server, 3).await;

    let root = TempDir::new().unwrap();
    let config = test_config(&format!("{}/gallery/1", server.uri()), 10, root.path());
    let run_dir = RunDirectory::create(&config.output_dir, Local::now()).unwrap();
    let (_tx, rx) = watch::channel(false);

    let summary = execute_run(&config, &run_dir, rx)
        .await
        .expect("Run should succeed");

    assert_eq!(summary.pages_visited, 3);
    assert_eq!(summary.images_found, 6);
    assert_eq!(summary.done, DoneReason::Exhausted);

    let report = summary.report_path.expect("Report should be written");
    assert_eq!(report, run_dir.path().join(REPORT_FILE_NAME));
    let html = std::fs::read_to_string(report).unwrap();
    assert!(html.contains("6 images found"));
    assert!(html.contains(&format!("{}/img/3b.jpg", server.uri())));
}

#[tokio::test]
async fn test_visit_order_and_sorted_images() {
    let server = MockServer::start().await;
    mount_chained_gallery(&server, 3).await;

    let root = TempDir::new().unwrap();
    let config = test_config(&format!("{}/gallery/1", server.uri()), 10, root.path());
    let mut renderer = StaticRenderer::launch(&config).unwrap();

    let outcome = Traversal::new(&mut renderer, &config).run().await;

    assert_eq!(
        paths(&outcome.visited),
        vec!["/gallery/1", "/gallery/2", "/gallery/3"]
    );
    assert_eq!(
        paths(&outcome.images),
        vec![
            "/img/1a.jpg",
            "/img/1b.jpg",
            "/img/2a.jpg",
            "/img/2b.jpg",
            "/img/3a.jpg",
            "/img/3b.jpg"
        ]
    );
}

#[tokio::test]
async fn test_disabled_next_button_falls_back_to_links() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        html(
            r#"<img src="/img/home.jpg">
               <button class="next-page" disabled>Next</button>
               <a href="/about">About us</a>"#,
        ),
    )
    .await;
    mount_page(&server, "/about", html(r#"<img src="/img/team.jpg">"#)).await;

    let root = TempDir::new().unwrap();
    let config = test_config(&format!("{}/", server.uri()), 10, root.path());
    let mut renderer = StaticRenderer::launch(&config).unwrap();

    let outcome = Traversal::new(&mut renderer, &config).run().await;

    assert_eq!(paths(&outcome.visited), vec!["/", "/about"]);
    assert_eq!(paths(&outcome.images), vec!["/img/home.jpg", "/img/team.jpg"]);
    assert_eq!(outcome.done, DoneReason::Exhausted);
}

#[tokio::test]
async fn test_same_image_on_two_pages_counted_once() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/gallery/1",
        html(r#"<img src="/img/logo.png"><a class="next-page" href="/gallery/2">Next</a>"#),
    )
    .await;
    mount_page(&server, "/gallery/2", html(r#"<img src="/img/logo.png">"#)).await;

    let root = TempDir::new().unwrap();
    let config = test_config(&format!("{}/gallery/1", server.uri()), 10, root.path());
    let mut renderer = StaticRenderer::launch(&config).unwrap();

    let outcome = Traversal::new(&mut renderer, &config).run().await;

    assert_eq!(outcome.pages_visited(), 2);
    assert_eq!(paths(&outcome.images), vec!["/img/logo.png"]);
}

#[tokio::test]
async fn test_slow_page_yields_no_images_but_is_visited() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        html(r#"<img src="/img/first.jpg"><a rel="next" href="/slow">Next</a>"#),
    )
    .await;
    mount_page(
        &server,
        "/slow",
        html(r#"<img src="/img/never.jpg">"#).set_delay(Duration::from_secs(3)),
    )
    .await;

    let root = TempDir::new().unwrap();
    let config = test_config(&format!("{}/", server.uri()), 10, root.path());
    let mut renderer = StaticRenderer::launch(&config).unwrap();

    let outcome = Traversal::new(&mut renderer, &config).run().await;

    assert_eq!(paths(&outcome.visited), vec!["/", "/slow"]);
    assert_eq!(paths(&outcome.images), vec!["/img/first.jpg"]);
    assert_eq!(outcome.done, DoneReason::Exhausted);
}

#[tokio::test]
async fn test_page_cap_limits_visits() {
    let server = MockServer::start().await;
    mount_chained_gallery(&server, 5).await;

    let root = TempDir::new().unwrap();
    let config = test_config(&format!("{}/gallery/1", server.uri()), 2, root.path());
    let run_dir = RunDirectory::create(&config.output_dir, Local::now()).unwrap();
    let (_tx, rx) = watch::channel(false);

    let summary = execute_run(&config, &run_dir, rx).await.unwrap();

    assert_eq!(summary.pages_visited, 2);
    assert_eq!(summary.images_found, 4);
    assert_eq!(summary.done, DoneReason::PageCapReached);
}

#[tokio::test]
async fn test_heuristic_page_link() {
    let server = MockServer::start().await;
    // No pager markup, only a numbered link; the link fallback finds it
    mount_page(
        &server,
        "/list",
        html(r#"<img src="/img/x.jpg"><a href="/list?page=2">2</a>"#),
    )
    .await;

    let root = TempDir::new().unwrap();
    let config = test_config(&format!("{}/list", server.uri()), 10, root.path());
    let mut renderer = StaticRenderer::launch(&config).unwrap();

    let outcome = Traversal::new(&mut renderer, &config).run().await;

    let visited: Vec<String> = outcome.visited.iter().map(|u| u.to_string()).collect();
    assert_eq!(visited.len(), 2);
    assert!(visited[1].ends_with("/list?page=2"));
}

#[tokio::test]
async fn test_off_site_images_and_links_ignored() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        html(
            r#"<img src="https://cdn.elsewhere.test/a.jpg">
               <img src="data:image/gif;base64,R0lGODlhAQABAAAAACw=">
               <img data-src="/img/lazy.jpg">
               <a href="https://elsewhere.test/page/2">Other site</a>
               <a href="mailto:someone@example.com">Mail</a>"#,
        ),
    )
    .await;

    let root = TempDir::new().unwrap();
    let config = test_config(&format!("{}/", server.uri()), 10, root.path());
    let mut renderer = StaticRenderer::launch(&config).unwrap();

    let outcome = Traversal::new(&mut renderer, &config).run().await;

    assert_eq!(outcome.pages_visited(), 1);
    assert_eq!(paths(&outcome.images), vec!["/img/lazy.jpg"]);
}

#[tokio::test]
async fn test_missing_page_yields_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let root = TempDir::new().unwrap();
    let config = test_config(&format!("{}/gone", server.uri()), 10, root.path());
    let run_dir = RunDirectory::create(&config.output_dir, Local::now()).unwrap();
    let (_tx, rx) = watch::channel(false);

    let summary = execute_run(&config, &run_dir, rx).await.unwrap();

    assert_eq!(summary.pages_visited, 1);
    assert_eq!(summary.images_found, 0);
    assert!(summary.report_path.is_none());
    assert!(!run_dir.path().join(REPORT_FILE_NAME).exists());
}

#[tokio::test]
async fn test_interrupt_before_start_still_returns_summary() {
    let server = MockServer::start().await;
    mount_chained_gallery(&server, 3).await;

    let root = TempDir::new().unwrap();
    let config = test_config(&format!("{}/gallery/1", server.uri()), 10, root.path());
    let run_dir = RunDirectory::create(&config.output_dir, Local::now()).unwrap();
    let (_tx, rx) = watch::channel(true);

    let summary = execute_run(&config, &run_dir, rx).await.unwrap();

    assert_eq!(summary.pages_visited, 0);
    assert_eq!(summary.done, DoneReason::Interrupted);
}

#[test]
fn test_missing_start_url_aborts_before_run_directory() {
    let root = TempDir::new().unwrap();
    let output_dir = root.path().join("RESULT");
    let env: HashMap<&str, String> = HashMap::from([
        ("OUTPUT_DIR", output_dir.display().to_string()),
        ("MAX_PAGES", "5".to_string()),
    ]);

    // Same order as the binary: configuration first, run folder second
    let result = load_from_lookup(FileConfig::default(), &ConfigOverrides::default(), |key| {
        env.get(key).cloned()
    })
    .map(|config| RunDirectory::create(&config.output_dir, Local::now()));

    assert!(matches!(result, Err(ConfigError::MissingStartUrl)));
    assert!(!output_dir.exists());
}

#[tokio::test]
async fn test_toml_file_drives_a_run() {
    let server = MockServer::start().await;
    mount_chained_gallery(&server, 4).await;

    let root = TempDir::new().unwrap();
    let config_path = root.path().join("sweep.toml");
    std::fs::write(
        &config_path,
        format!(
            r#"
start-url = "{}/gallery/1"
max-pages = 3
page-load-timeout = 2
output-dir = "{}"
scroll-settle-ms = 0
navigation-settle-ms = 0
"#,
            server.uri(),
            root.path().join("out").display()
        ),
    )
    .unwrap();

    let file = read_file_config(&config_path).unwrap();
    let config = load_from_lookup(file, &ConfigOverrides::default(), |_| None).unwrap();
    assert_eq!(config.max_pages, 3);

    let run_dir = RunDirectory::create(&config.output_dir, Local::now()).unwrap();
    let (_tx, rx) = watch::channel(false);
    let summary = execute_run(&config, &run_dir, rx).await.unwrap();

    assert_eq!(summary.pages_visited, 3);
    assert!(run_dir.path().starts_with(root.path().join("out")));
    assert!(run_dir.path().join(REPORT_FILE_NAME).exists());
}

#[tokio::test]
async fn test_stale_element_after_navigation() {
    let server = MockServer::start().await;
    mount_chained_gallery(&server, 2).await;

    let root = TempDir::new().unwrap();
    let config = test_config(&format!("{}/gallery/1", server.uri()), 10, root.path());
    let mut renderer = StaticRenderer::launch(&config).unwrap();

    renderer.load(&config.start_url).await.unwrap();
    let next = renderer.find_all("a[rel='next']").await.unwrap();
    assert_eq!(next.len(), 1);

    next[0].activate().await.unwrap();
    assert!(renderer.current_url().await.unwrap().ends_with("/gallery/2"));

    let result = next[0].attribute("href").await;
    assert!(matches!(result, Err(RenderError::StaleElement)));
}

#[tokio::test]
async fn test_redirected_seed_is_not_loaded_twice() {
    let server = MockServer::start().await;
    let landing = format!("{}/gallery/", server.uri());
    Mock::given(method("GET"))
        .and(path("/gallery"))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", landing.as_str()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/gallery/"))
        .respond_with(html(
            r#"<img src="/img/a.jpg"><a href="/gallery/">Home</a><a href="/about">About</a>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/about"))
        .respond_with(html(r#"<a href="/gallery/">Back to the gallery</a>"#))
        .expect(1)
        .mount(&server)
        .await;

    let root = TempDir::new().unwrap();
    let config = test_config(&format!("{}/gallery", server.uri()), 10, root.path());
    let mut renderer = StaticRenderer::launch(&config).unwrap();

    let outcome = Traversal::new(&mut renderer, &config).run().await;

    assert_eq!(paths(&outcome.visited), vec!["/gallery", "/about"]);
    assert_eq!(paths(&outcome.images), vec!["/img/a.jpg"]);
    assert_eq!(outcome.done, DoneReason::Exhausted);
}
