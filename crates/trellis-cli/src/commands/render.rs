use anyhow::Result;
use colored::Colorize;
use tracing::debug;
use trellis::{App, Frame};

#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    /// How many times an errored render is retried
    pub retries: u32,
    /// Include the frame shown while content is pending
    pub show_loading: bool,
}

/// Renders `href` and collects the frames it goes through
///
/// Must be called inside a tokio runtime.
pub async fn frames(app: &App, href: &str, options: RenderOptions) -> Vec<Frame> {
    let render = app.render(href);
    let mut frames = Vec::new();

    if options.show_loading {
        let frame = render.current_frame();
        if !frame.is_settled() {
            frames.push(frame);
        }
    }

    let mut frame = render.settle().await;
    for attempt in 0..options.retries {
        if !matches!(frame, Frame::Errored(_)) {
            break;
        }
        frames.push(frame);
        if !render.retry() {
            return frames;
        }
        debug!(href, retry = attempt + 1, "retrying render");
        frame = render.settle().await;
    }
    frames.push(frame);

    frames
}

pub async fn execute(app: &App, href: &str, options: RenderOptions) -> Result<()> {
    for frame in frames(app, href, options).await {
        let status = match frame.status() {
            200 => frame.status().to_string().green(),
            404 => frame.status().to_string().yellow(),
            _ => frame.status().to_string().red(),
        };
        eprintln!("{} {} {}", "==>".bold(), status, frame.label().bold());

        match frame.document() {
            Some(document) => println!("{}", document.render().into_string()),
            None => eprintln!("{}", "(nothing to show until content is ready)".dimmed()),
        }
    }

    Ok(())
}
