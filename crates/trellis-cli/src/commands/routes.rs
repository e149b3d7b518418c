use anyhow::Result;
use colored::Colorize;
use serde_json::{json, Value};
use trellis::App;

/// One row of the route listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRow {
    /// File-path pattern, groups included
    pub pattern: String,
    /// URL shape, groups omitted
    pub url: String,
    pub params: Vec<String>,
    pub catch_all: bool,
}

/// Routes in matching order, most specific first
pub fn rows(app: &App) -> Vec<RouteRow> {
    app.router()
        .routes()
        .iter()
        .map(|pattern| RouteRow {
            pattern: pattern.to_string(),
            url: pattern.url_pattern(),
            params: pattern.params().map(str::to_string).collect(),
            catch_all: pattern.has_catch_all(),
        })
        .collect()
}

pub fn to_json(rows: &[RouteRow]) -> Value {
    Value::Array(
        rows.iter()
            .map(|row| {
                json!({
                    "pattern": row.pattern,
                    "url": row.url,
                    "params": row.params,
                    "catch_all": row.catch_all,
                })
            })
            .collect(),
    )
}

pub fn execute(app: &App, as_json: bool) -> Result<()> {
    let rows = rows(app);

    if as_json {
        println!("{}", serde_json::to_string_pretty(&to_json(&rows))?);
        return Ok(());
    }

    println!("{}", format!("{} routes", rows.len()).green().bold());
    println!();
    for row in &rows {
        let mut line = format!("  {:<40}", row.url.cyan());
        if row.pattern != row.url {
            line.push_str(&format!(" {}", row.pattern.dimmed()));
        }
        if !row.params.is_empty() {
            line.push_str(&format!(" [{}]", row.params.join(", ").yellow()));
        }
        println!("{}", line);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use maud::html;
    use pretty_assertions::assert_eq;

    fn app() -> App {
        App::builder()
            .page("app/page", |_| async { Ok(html! {}) })
            .page("app/(shop)/items/[id]/page", |_| async { Ok(html! {}) })
            .page("app/docs/[[...rest]]/page", |_| async { Ok(html! {}) })
            .build()
            .unwrap()
    }

    #[test]
    fn test_rows_describe_patterns() {
        let rows = rows(&app());
        let item = rows.iter().find(|row| row.url == "/items/[id]").unwrap();

        assert_eq!(item.pattern, "/(shop)/items/[id]");
        assert_eq!(item.params, vec!["id".to_string()]);
        assert!(!item.catch_all);

        let docs = rows.iter().find(|row| row.url == "/docs/[[...rest]]").unwrap();
        assert!(docs.catch_all);
    }

    #[test]
    fn test_json_listing() {
        let value = to_json(&rows(&app()));
        let first = &value.as_array().unwrap()[0];

        assert_eq!(value.as_array().unwrap().len(), 3);
        assert!(first.get("pattern").is_some());
        assert!(first.get("catch_all").is_some());
    }
}
