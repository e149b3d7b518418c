use maud::html;
use trellis::AppBuilder;

struct Product {
    id: &'static str,
    name: &'static str,
    price: u32,
}

const PRODUCTS: [Product; 8] = [
    Product { id: "1", name: "Mobile", price: 500 },
    Product { id: "2", name: "Laptop", price: 1500 },
    Product { id: "3", name: "Tablet", price: 1000 },
    Product { id: "4", name: "Smart Watch", price: 200 },
    Product { id: "5", name: "Smart TV", price: 1000 },
    Product { id: "6", name: "Smart Home", price: 1000 },
    Product { id: "7", name: "Smart Phone", price: 1000 },
    Product { id: "8", name: "Smart Watch", price: 200 },
];

pub fn routes(builder: AppBuilder) -> AppBuilder {
    builder
        .page("app/products/page", |_ctx| async {
            Ok(html! {
                div {
                    h1 { "Products page" }
                    div.grid {
                        @for product in &PRODUCTS {
                            div.product {
                                h2 { (product.name) }
                                p { "$" (product.price) }
                                a href={ "/products/" (product.id) } { "View Details" }
                            }
                        }
                    }
                }
            })
        })
        .page("app/products/[slug]/page", |ctx| async move {
            let slug = ctx.params.get_one("slug").unwrap_or_default();
            Ok(html! {
                h2 { "Product Details Page - " (slug) }
            })
        })
        .page("app/optional-catch-all-route/[[...slug]]/page", |ctx| async move {
            let filters = ctx.params.get_many("slug").unwrap_or_default();
            Ok(html! {
                div {
                    "Optional Product Filter"
                    @if !filters.is_empty() {
                        ul.filters {
                            @for filter in filters {
                                li { (filter) }
                            }
                        }
                    }
                }
            })
        })
}
