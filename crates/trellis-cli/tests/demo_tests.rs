//! End-to-end tests for the demo app and the CLI commands driving it.

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use rstest::rstest;
use trellis::{App, Config, Frame, NavigationIntent, NavigationMode, Session};
use trellis_cli::commands::render::{frames, RenderOptions};
use trellis_cli::commands::routes;
use trellis_cli::demo::{app_with, DemoOptions};

fn demo() -> App {
    demo_failing(0.0)
}

fn demo_failing(fetch_failure_rate: f64) -> App {
    app_with(
        &Config::default(),
        DemoOptions {
            loading_delay: Duration::ZERO,
            fetch_failure_rate,
        },
    )
    .unwrap()
}

fn body(frame: &Frame) -> String {
    frame
        .document()
        .map(|doc| doc.body.clone().into_string())
        .unwrap_or_default()
}

#[tokio::test]
async fn test_dynamic_metadata_title() {
    let app = demo();
    let frame = app.render("/metadata-example/2").settle().await;

    assert_eq!(frame.label(), "ready");
    assert_eq!(frame.document().unwrap().title(), Some("Page Deux ✍🏻"));
    assert!(body(&frame).contains("Trellis demo"));
}

#[tokio::test]
async fn test_static_metadata_title() {
    let app = demo();
    let frame = app.render("/metadata-example").settle().await;

    let document = frame.document().unwrap();
    assert_eq!(document.title(), Some("Metadata example"));
    assert_eq!(
        document.metadata.description(),
        Some("This is my example of writing static metadata")
    );
}

#[tokio::test]
async fn test_unknown_metadata_example_uses_generic_fallback() {
    let app = demo();
    let frame = app.render("/metadata-example/99").settle().await;

    assert_eq!(frame.status(), 500);
    let html = body(&frame);
    assert!(html.contains("An error occurred"));
    assert!(html.contains("no metadata example `99`"));
    // root layout stays around the generic fallback
    assert!(html.contains("Trellis demo"));
}

#[tokio::test]
async fn test_error_example_failure_shows_fallback() {
    let app = demo_failing(1.0);
    let frames = frames(&app, "/error-example", RenderOptions::default()).await;

    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].status(), 500);
    assert!(body(&frames[0]).contains("Failed to fetch products"));
    assert!(body(&frames[0]).contains("Try again"));
}

#[tokio::test]
async fn test_error_example_draws_every_attempt() {
    let app = demo_failing(1.0);
    let options = RenderOptions {
        retries: 2,
        show_loading: false,
    };

    // each retry fetches again instead of reusing an earlier outcome
    let labels: Vec<&str> = frames(&app, "/error-example", options)
        .await
        .iter()
        .map(Frame::label)
        .collect();
    assert_eq!(labels, vec!["errored", "errored", "errored"]);

    // a second, independent render fails on its own draw too
    let again = app.render("/error-example").settle().await;
    assert_eq!(again.status(), 500);
}

#[tokio::test]
async fn test_error_example_succeeds_when_fetch_succeeds() {
    let app = demo();
    let options = RenderOptions {
        retries: 3,
        show_loading: false,
    };
    let frames = frames(&app, "/error-example", options).await;

    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].label(), "ready");
    assert!(body(&frames[0]).contains("Product List:"));
}

#[tokio::test]
async fn test_loading_example_shows_loading_first() {
    let app = app_with(
        &Config::default(),
        DemoOptions {
            loading_delay: Duration::from_millis(50),
            fetch_failure_rate: 0.0,
        },
    )
    .unwrap();
    let frames = frames(
        &app,
        "/loading-example",
        RenderOptions {
            retries: 0,
            show_loading: true,
        },
    )
    .await;

    let labels: Vec<&str> = frames.iter().map(Frame::label).collect();
    assert_eq!(labels, vec!["loading", "ready"]);
    assert!(body(&frames[0]).contains("Loading..."));
    assert!(body(&frames[1]).contains("Users: 10000"));
}

#[rstest]
#[case("/about", "About")]
#[case("/contact", "Contact")]
#[tokio::test]
async fn test_marketing_group_layout(#[case] href: &str, #[case] heading: &str) {
    let app = demo();
    let html = body(&app.render(href).settle().await);

    assert!(html.contains(&format!("<h1>{}</h1>", heading)));
    assert!(html.contains("<main>"));
    assert!(html.contains(r#"<a href="/contact">Contact</a>"#));
}

#[tokio::test]
async fn test_profile_lists_repeated_names() {
    let app = demo();
    let html = body(&app.render("/profile?name=betty&name=sofia").settle().await);

    assert!(html.contains("pathname: /profile"));
    assert!(html.contains("<li>betty</li><li>sofia</li>"));
}

#[tokio::test]
async fn test_profile_navigates_home() {
    let mut session = Session::new(Arc::new(demo()));

    let frame = session.open("/profile?go=home").settle().await;
    assert_eq!(frame.label(), "ready");

    let intent = session.try_next_intent().unwrap();
    assert_eq!(
        intent,
        NavigationIntent {
            href: "/".into(),
            mode: NavigationMode::Push,
        }
    );

    let frame = session.follow(intent).settle().await;
    assert!(body(&frame).contains("<h1>Home</h1>"));
    assert_eq!(session.history(), &["/profile?go=home".to_string(), "/".to_string()]);
}

#[tokio::test]
async fn test_profile_navigation_needs_a_session() {
    let app = demo();
    let frame = app.render("/profile?go=home").settle().await;

    assert_eq!(frame.status(), 500);
}

#[rstest]
#[case("/optional-catch-all-route", vec![])]
#[case("/optional-catch-all-route/phones/apple", vec!["phones", "apple"])]
#[tokio::test]
async fn test_optional_catch_all_filters(#[case] href: &str, #[case] filters: Vec<&str>) {
    let app = demo();
    let html = body(&app.render(href).settle().await);

    assert!(html.contains("Optional Product Filter"));
    for filter in &filters {
        assert!(html.contains(&format!("<li>{}</li>", filter)));
    }
    assert_eq!(html.contains("filters"), !filters.is_empty());
}

#[tokio::test]
async fn test_product_details() {
    let app = demo();
    let html = body(&app.render("/products/7").settle().await);

    assert!(html.contains("Product Details Page - 7"));
}

#[tokio::test]
async fn test_dashboard_nested_layout() {
    let app = demo();
    let html = body(&app.render("/dashboard/analytics").settle().await);

    assert!(html.contains("<aside>"));
    assert!(html.contains("<h1>Dashboard Analytics</h1>"));
}

#[tokio::test]
async fn test_unknown_path_not_found() {
    let app = demo();
    let frame = app.render("/nope").settle().await;

    assert_eq!(frame.status(), 404);
    assert!(body(&frame).contains("The page you are looking for was not found!"));
}

#[test]
fn test_routes_listing() {
    let rows = routes::rows(&demo());
    let urls: Vec<&str> = rows.iter().map(|row| row.url.as_str()).collect();

    assert!(urls.contains(&"/"));
    assert!(urls.contains(&"/about"));
    assert!(urls.contains(&"/products/[slug]"));
    assert!(urls.contains(&"/optional-catch-all-route/[[...slug]]"));

    let products = urls.iter().position(|url| *url == "/products").unwrap();
    let details = urls.iter().position(|url| *url == "/products/[slug]").unwrap();
    assert!(products < details);

    let about = rows.iter().find(|row| row.url == "/about").unwrap();
    assert_eq!(about.pattern, "/(marketing)/about");
}
