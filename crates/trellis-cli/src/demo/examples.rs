use maud::html;
use rand::Rng;
use trellis::{AppBuilder, ContentError};

use super::DemoOptions;

const PRODUCTS: [&str; 3] = ["One", "Two", "Three"];

pub fn routes(builder: AppBuilder, options: &DemoOptions) -> AppBuilder {
    let failure_rate = options.fetch_failure_rate.clamp(0.0, 1.0);
    let delay = options.loading_delay;

    builder
        .page("app/error-example/page", move |_ctx| {
            // drawn once per attempt
            let failed = rand::thread_rng().gen_bool(failure_rate);
            async move {
                if failed {
                    return Err(ContentError::new("Failed to fetch products"));
                }
                Ok(html! {
                    div {
                        h1 { "Product List:" }
                        div.grid {
                            @for name in PRODUCTS {
                                div { p { (name) } }
                            }
                        }
                    }
                })
            }
        })
        .error("app/error-example/error", |error, _retry| {
            let message = if error.message().is_empty() {
                "An error occurred"
            } else {
                error.message()
            };
            html! {
                div.error {
                    (message)
                    button { "Try again" }
                }
            }
        })
        .loading("app/loading-example/loading", || {
            Ok(html! { p.loading { "Loading..." } })
        })
        .page("app/loading-example/page", move |_ctx| async move {
            tokio::time::sleep(delay).await;
            let users = 10_000;
            Ok(html! {
                div {
                    h1 { "Loading example" }
                    p { "Users: " (users) }
                }
            })
        })
}
