use maud::html;
use trellis::{AppBuilder, ContentError, Metadata, MetadataResolutionError, MetadataSource};

const EXAMPLES: [(&str, &str); 4] = [("1", "One"), ("2", "Two"), ("3", "Three"), ("4", "Four")];

/// Titles served by the dynamic example, keyed by slug
fn example_title(slug: &str) -> Option<&'static str> {
    match slug {
        "1" => Some("Page Un 👍🏽"),
        "2" => Some("Page Deux ✍🏻"),
        "3" => Some("Page Trois ✨"),
        "4" => Some("Page Quatre 🎉"),
        _ => None,
    }
}

pub fn routes(builder: AppBuilder) -> AppBuilder {
    builder
        .page("app/metadata-example/page", |_ctx| async {
            Ok(html! {
                div {
                    h1 { "Metadata Examples" }
                    ul {
                        @for (id, title) in EXAMPLES {
                            li { a href={ "/metadata-example/" (id) } { (title) } }
                        }
                    }
                }
            })
        })
        .metadata(
            "app/metadata-example/page",
            Metadata::new()
                .with("title", "Metadata example")
                .with("description", "This is my example of writing static metadata"),
        )
        .page("app/metadata-example/[slug]/page", |ctx| async move {
            let slug = ctx.params.get_one("slug").unwrap_or_default();
            match example_title(slug) {
                Some(title) => Ok(html! {
                    div { h1 { (title) } }
                }),
                None => Err(ContentError::new(format!("no metadata example `{}`", slug))),
            }
        })
        .metadata(
            "app/metadata-example/[slug]/page",
            MetadataSource::dynamic(|params| async move {
                let slug = params.get_one("slug").unwrap_or_default();
                example_title(slug)
                    .map(|title| Metadata::new().with("title", title).with("description", title))
                    .ok_or_else(|| {
                        MetadataResolutionError::new(format!("no metadata example `{}`", slug))
                    })
            }),
        )
}
