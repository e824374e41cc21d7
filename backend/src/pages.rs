//! Server-rendered pages. Both templates are compiled into the binary and
//! filled by `{{TOKEN}}` substitution; anything user-controlled is
//! HTML-escaped before it lands in a page.

use shared::ClassifyResponse;

const HOME_TEMPLATE: &str = include_str!("assets/home.html");
const RESULT_TEMPLATE: &str = include_str!("assets/result.html");

/// Upload form. `message` is the flash-style banner carried over on a
/// redirect after a failed request.
pub fn home_page(message: Option<&str>) -> String {
    let banner = match message {
        Some(text) if !text.is_empty() => {
            format!("<div class=\"flash\">{}</div>", escape(text))
        }
        _ => String::new(),
    };
    HOME_TEMPLATE.replace("{{FLASH}}", &banner)
}

pub fn result_page(response: &ClassifyResponse, image_url: &str) -> String {
    RESULT_TEMPLATE
        .replace("{{IMAGE_URL}}", &escape(image_url))
        .replace("{{PREDICTION}}", &escape(&response.prediction))
        .replace("{{CONFIDENCE}}", &format!("{:.1}", response.confidence))
        .replace("{{CONFIDENCE_LEVEL}}", &escape(&response.confidence_level))
        .replace("{{CONFIDENCE_COLOR}}", &escape(&response.confidence_color))
        .replace("{{DESCRIPTION}}", &escape(&response.description))
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
