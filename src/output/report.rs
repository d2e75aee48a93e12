//! HTML gallery report
//!
//! Renders the final image set into a single self-contained `index.html`:
//! a header with the generation time and image count, then a four-column
//! grid of cards, one per image, in the order given.

use crate::output::OutputResult;
use chrono::{DateTime, Local};
use maud::{html, Markup, PreEscaped, DOCTYPE};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use url::Url;

/// File name of the report inside the run directory
pub const REPORT_FILE_NAME: &str = "index.html";

/// Timestamp format shown in the report
pub const REPORT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const STYLE: &str = r#"
:root {
    --primary-color: #ff6b6b;
    --secondary-color: #4ecdc4;
    --bg-color: #f8f9fa;
    --card-bg: #ffffff;
    --text-color: #333;
    --text-light: #6c757d;
    --shadow: 0 4px 15px rgba(0, 0, 0, 0.1);
    --transition: all 0.3s ease;
}
* { margin: 0; padding: 0; box-sizing: border-box; }
body {
    font-family: 'Poppins', sans-serif;
    background-color: var(--bg-color);
    color: var(--text-color);
    line-height: 1.6;
    padding: 20px;
}
.container { max-width: 1400px; margin: 0 auto; padding: 20px; }
header {
    text-align: center;
    margin-bottom: 30px;
    padding: 20px;
    background: linear-gradient(135deg, var(--primary-color), #ff8e8e);
    color: white;
    border-radius: 10px;
    box-shadow: var(--shadow);
    cursor: pointer;
}
h1 { font-size: 2.5rem; margin-bottom: 10px; font-weight: 600; }
.stats {
    display: flex;
    justify-content: center;
    gap: 20px;
    margin-top: 15px;
    font-size: 0.9rem;
    opacity: 0.9;
}
.image-container {
    display: grid;
    grid-template-columns: repeat(4, 1fr);
    gap: 20px;
    margin-top: 20px;
}
.image-item {
    background: var(--card-bg);
    border-radius: 12px;
    overflow: hidden;
    box-shadow: var(--shadow);
    transition: var(--transition);
    display: flex;
    flex-direction: column;
}
.image-item:hover { transform: translateY(-5px); box-shadow: 0 10px 25px rgba(0, 0, 0, 0.15); }
.image-wrapper { width: 100%; padding-bottom: 100%; position: relative; overflow: hidden; }
.image-item img {
    position: absolute;
    top: 0;
    left: 0;
    width: 100%;
    height: 100%;
    object-fit: contain;
    transition: var(--transition);
    background: #f5f5f5;
}
.image-item:hover img { transform: scale(1.05); }
.image-details { padding: 15px; flex-grow: 1; display: flex; flex-direction: column; }
.image-url {
    font-size: 0.75rem;
    color: var(--primary-color);
    word-break: break-all;
    text-decoration: none;
    padding: 8px 12px;
    background: rgba(255, 107, 107, 0.1);
    border-radius: 6px;
    margin-top: 10px;
    transition: var(--transition);
    display: inline-block;
}
.image-url:hover { background: rgba(255, 107, 107, 0.2); color: #e64a4a; }
.image-meta {
    display: flex;
    justify-content: space-between;
    font-size: 0.8rem;
    color: var(--text-light);
    margin-top: 10px;
}
.image-index {
    background: var(--secondary-color);
    color: white;
    width: 30px;
    height: 30px;
    border-radius: 50%;
    display: flex;
    align-items: center;
    justify-content: center;
    font-weight: 600;
    position: absolute;
    top: 10px;
    right: 10px;
    z-index: 2;
}
.no-image {
    display: flex;
    align-items: center;
    justify-content: center;
    background: #f0f0f0;
    color: #999;
    font-size: 0.9rem;
    height: 200px;
}
"#;

const FONT_STYLESHEET: &str =
    "https://fonts.googleapis.com/css2?family=Poppins:wght@300;400;500;600&display=swap";

/// Swaps a broken image for a placeholder
const IMAGE_FALLBACK_JS: &str =
    r#"this.parentElement.innerHTML='<div class="no-image">Image not available</div>'"#;

const SCROLL_TO_TOP_JS: &str = r#"
document.querySelector('header').addEventListener('click', function() {
    window.scrollTo({ top: 0, behavior: 'smooth' });
});
"#;

/// Renders the report document
///
/// Pure: the same images and timestamp always give the same document.
/// Images are shown in the order given, numbered from 1. Every URL is
/// escaped by the template, in attributes and in text.
///
/// # Example
///
/// ```
/// use chrono::{Local, TimeZone};
/// use gallery_sweep::output::render_report;
/// use url::Url;
///
/// let images = vec![Url::parse("https://example.com/a.jpg").unwrap()];
/// let at = Local.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
/// let html = render_report(&images, &at);
/// assert!(html.contains("1 images found"));
/// ```
pub fn render_report(images: &[Url], generated_at: &DateTime<Local>) -> String {
    let timestamp = generated_at.format(REPORT_TIMESTAMP_FORMAT).to_string();

    let page = html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                title { "Image Crawler Results - " (timestamp) }
                link href=(FONT_STYLESHEET) rel="stylesheet";
                style { (PreEscaped(STYLE)) }
            }
            body {
                div.container {
                    header {
                        h1 { "Image Gallery" }
                        div.stats {
                            span { "📅 " (timestamp) }
                            span { "🖼️ " (images.len()) " images found" }
                        }
                    }
                    div."image-container" {
                        @for (idx, image) in images.iter().enumerate() {
                            (image_card(idx + 1, image))
                        }
                    }
                }
                script { (PreEscaped(SCROLL_TO_TOP_JS)) }
            }
        }
    };

    page.into_string()
}

fn image_card(index: usize, image: &Url) -> Markup {
    html! {
        div."image-item" {
            div."image-wrapper" {
                span."image-index" { (index) }
                img src=(image.as_str()) alt=(format!("Image {}", index)) loading="eager" onerror=(IMAGE_FALLBACK_JS);
            }
            div."image-details" {
                div."image-meta" {
                    span { "#" (index) }
                    span { "🔗 Source" }
                }
                a."image-url" href=(image.as_str()) target="_blank" rel="noopener noreferrer" {
                    (image.as_str())
                }
            }
        }
    }
}

/// Writes the report into `dir`
///
/// Returns the report path, or `None` when there are no images, in which
/// case nothing is written.
pub fn write_report(
    dir: &Path,
    images: &[Url],
    generated_at: &DateTime<Local>,
) -> OutputResult<Option<PathBuf>> {
    if images.is_empty() {
        tracing::warn!("No images found to generate report");
        return Ok(None);
    }

    let path = dir.join(REPORT_FILE_NAME);
    let mut file = File::create(&path)?;
    file.write_all(render_report(images, generated_at).as_bytes())?;

    tracing::info!("HTML report generated: {}", path.display());
    Ok(Some(path))
}
