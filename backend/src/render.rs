//! Server-side rendering of the single classification page.
//!
//! The page lives in `assets/index.html` with `{{TOKEN}}` placeholders that
//! are filled here. Result markup is only emitted when there is a result, so
//! the idle page carries no empty placeholders.

use shared::ClassificationResult;

const TEMPLATE: &str = include_str!("../assets/index.html");

const HEADING: &str = "Waste Classification";

pub fn render_page(result: Option<&ClassificationResult>) -> String {
    let content = result.map(render_result).unwrap_or_default();
    TEMPLATE
        .replace("{{HEADING}}", HEADING)
        .replace("{{CONTENT}}", &content)
}

/// Shown for every failure; which stage failed is never revealed.
pub fn render_error_page() -> String {
    TEMPLATE.replace("{{HEADING}}", HEADING).replace(
        "{{CONTENT}}",
        "      <div class=\"error\">Something went wrong while classifying the image.</div>",
    )
}

fn render_result(result: &ClassificationResult) -> String {
    format!(
        r#"      <img src="{url}" class="uploaded-image" alt="Uploaded Image">
      <div class="result">Prediction: {label}</div>
      <div class="result">{recommendation}</div>"#,
        url = html_escape(&result.image_url),
        label = html_escape(result.label()),
        recommendation = html_escape(result.recommendation()),
    )
}

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
