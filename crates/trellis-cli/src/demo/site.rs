use maud::html;
use trellis::{AppBuilder, ContentError, Metadata};

pub fn routes(builder: AppBuilder) -> AppBuilder {
    builder
        .layout("app/layout", |props| {
            html! {
                header {
                    a href="/" { "Trellis demo" }
                }
                (props.children)
            }
        })
        .metadata(
            "app/layout",
            Metadata::new()
                .with("title", "Trellis demo")
                .with("description", "Nested layouts, metadata and async pages"),
        )
        .page("app/page", |_ctx| async {
            Ok(html! {
                h1 { "Home" }
                ul {
                    li { a href="/products" { "Products" } }
                    li { a href="/metadata-example" { "Metadata example" } }
                    li { a href="/error-example" { "Error example" } }
                    li { a href="/loading-example" { "Loading example" } }
                    li { a href="/dashboard" { "Dashboard" } }
                    li { a href="/profile?name=betty&name=sofia&name=sandra" { "Profile" } }
                }
            })
        })
        .not_found("app/not-found", |_nav| {
            html! {
                div {
                    h1 { "The page you are looking for was not found!" }
                    a.button href="/" { "go to Homepage" }
                }
            }
        })
        .layout("app/(marketing)/layout", |props| {
            html! {
                div {
                    header {
                        nav {
                            a href="/" { "Home" }
                            a href="/about" { "About" }
                            a href="/contact" { "Contact" }
                        }
                    }
                    main { (props.children) }
                }
            }
        })
        .page("app/(marketing)/about/page", |_ctx| async {
            Ok(html! { h1 { "About" } })
        })
        .page("app/(marketing)/contact/page", |_ctx| async {
            Ok(html! { h1 { "Contact" } })
        })
        .page("app/profile/page", |ctx| async move {
            let search = ctx.navigation.search_params();
            if search.get("go") == Some("home") {
                if let Err(err) = ctx.navigation.navigate("/") {
                    return Err(ContentError::new(err.to_string()));
                }
            }
            Ok(html! {
                div {
                    h1 { "Profile component" }
                    p { "pathname: " (ctx.navigation.pathname()) }
                    @if search.has("name") {
                        ul.names {
                            @for name in search.get_all("name") {
                                li { (name) }
                            }
                        }
                    }
                    a.button href="/profile?go=home" { "Navigate to home page" }
                }
            })
        })
        .layout("app/dashboard/layout", |props| {
            html! {
                div.flex {
                    aside {
                        h2 { "dashboard" }
                        nav {
                            ul {
                                li { a href="/dashboard" { "Dashboard Home" } }
                                li { a href="/dashboard/analytics" { "Dashboard Analytics" } }
                            }
                        }
                    }
                    div.content { (props.children) }
                }
            }
        })
        .page("app/dashboard/page", |_ctx| async {
            Ok(html! { h1 { "Dashboard Home" } })
        })
        .page("app/dashboard/analytics/page", |_ctx| async {
            Ok(html! { h1 { "Dashboard Analytics" } })
        })
}
