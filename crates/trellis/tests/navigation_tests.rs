//! Navigation context threading and session-driven navigation

use std::sync::Arc;

use maud::html;
use pretty_assertions::assert_eq;
use trellis::{App, ContentError, Frame, NavigationIntent, NavigationMode, Session};

fn app() -> Arc<App> {
    let app = App::builder()
        .page("app/page", |_ctx| async { Ok(html! { h1 { "Home" } }) })
        .page("app/profile/page", |ctx| async move {
            let names: Vec<String> = ctx
                .navigation
                .search_params()
                .get_all("name")
                .into_iter()
                .map(str::to_string)
                .collect();
            Ok(html! {
                p { (ctx.navigation.pathname()) }
                ul { @for name in &names { li { (name) } } }
            })
        })
        .page("app/redirect/page", |ctx| async move {
            match ctx.navigation.replace("/profile?name=betty") {
                Ok(()) => Ok(html! { "redirecting" }),
                Err(err) => Err(ContentError::new(err.to_string())),
            }
        })
        .not_found("app/not-found", |_nav| html! { "Not Found" })
        .build()
        .unwrap();
    Arc::new(app)
}

fn body(frame: &Frame) -> String {
    frame
        .document()
        .map(|doc| doc.body.clone().into_string())
        .unwrap_or_default()
}

#[tokio::test]
async fn test_page_sees_every_search_value() {
    let frame = app()
        .render("/profile?name=betty&name=sofia&name=sandra")
        .settle()
        .await;

    assert_eq!(
        body(&frame),
        "<p>/profile</p><ul><li>betty</li><li>sofia</li><li>sandra</li></ul>"
    );
}

#[tokio::test]
async fn test_navigate_without_session_is_a_content_error() {
    let frame = app().render("/redirect").settle().await;
    assert_eq!(frame.label(), "errored");
}

#[tokio::test]
async fn test_session_follows_intents() {
    let mut session = Session::new(app());

    let frame = session.open("/redirect").settle().await;
    assert_eq!(body(&frame), "redirecting");

    let intent = session.try_next_intent().unwrap();
    assert_eq!(
        intent,
        NavigationIntent {
            href: "/profile?name=betty".into(),
            mode: NavigationMode::Replace,
        }
    );

    let frame = session.follow(intent).settle().await;
    assert_eq!(body(&frame), "<p>/profile</p><ul><li>betty</li></ul>");
    assert_eq!(session.history(), &["/profile?name=betty".to_string()]);
}

#[tokio::test]
async fn test_session_history_and_not_found() {
    let mut session = Session::new(app());

    session.open("/");
    let frame = session.open("/missing").settle().await;
    assert_eq!(frame.status(), 404);
    assert_eq!(body(&frame), "Not Found");

    assert_eq!(session.history(), &["/".to_string(), "/missing".to_string()]);
    assert_eq!(session.current().unwrap().href(), "/missing");
}

#[tokio::test]
async fn test_follow_next_waits_for_intent() {
    let mut session = Session::new(app());
    session.open("/redirect").settle().await;

    let render = session.follow_next().await.unwrap();
    assert_eq!(render.href(), "/profile?name=betty");
}
