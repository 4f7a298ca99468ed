//! Local report export.
//!
//! Turns an analysis text into a titled, timestamped HTML document on
//! disk. No backend involvement: the console already holds the content.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

/// Render the report document. `content` is preformatted analysis text.
pub fn render_report(title: &str, content: &str, generated_at: DateTime<Utc>) -> String {
    let title = escape_html(title);
    let content = escape_html(content);
    let stamp = generated_at.format("%Y-%m-%d %H:%M:%S UTC");
    format!(
        r#"<html>
  <head>
    <title>LogFlow SRE Report - {title}</title>
    <style>
      body {{ font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; padding: 40px; color: #111827; line-height: 1.6; }}
      .header {{ border-bottom: 2px solid #2563eb; padding-bottom: 20px; margin-bottom: 30px; }}
      .header h1 {{ color: #2563eb; margin: 0; font-size: 24px; }}
      .meta {{ color: #6b7280; font-size: 12px; margin-top: 5px; }}
      .content {{ white-space: pre-wrap; background: #f9fafb; padding: 20px; border-radius: 8px; border: 1px solid #e5e7eb; }}
      .footer {{ margin-top: 50px; font-size: 10px; color: #9ca3af; text-align: center; border-top: 1px solid #e5e7eb; padding-top: 10px; }}
    </style>
  </head>
  <body>
    <div class="header">
      <h1>LogFlow SRE Analysis Report</h1>
      <div class="meta">Generated on {stamp} | Subject: {title}</div>
    </div>
    <div class="content">{content}</div>
    <div class="footer">Confidential SRE Document | Powered by LogFlow</div>
  </body>
</html>
"#
    )
}

/// Write the rendered report into `dir` with a slugged, timestamped name
/// and return the full path.
pub fn write_report(
    dir: &Path,
    title: &str,
    content: &str,
    generated_at: DateTime<Utc>,
) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let filename = format!(
        "logflow-report-{}-{}.html",
        slug(title),
        generated_at.format("%Y%m%dT%H%M%SZ")
    );
    let path = dir.join(filename);
    fs::write(&path, render_report(title, content, generated_at))?;
    Ok(path)
}

fn slug(title: &str) -> String {
    let mut out = String::new();
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('-') && !out.is_empty() {
            out.push('-');
        }
    }
    let trimmed = out.trim_matches('-');
    if trimmed.is_empty() {
        "report".to_string()
    } else {
        trimmed.to_string()
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_embeds_title_timestamp_and_content() {
        let at = DateTime::parse_from_rfc3339("2026-02-01T15:52:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let html = render_report("Crash Period", "ROOT CAUSE\n- db pool", at);
        assert!(html.contains("Subject: Crash Period"));
        assert!(html.contains("2026-02-01 15:52:00 UTC"));
        assert!(html.contains("ROOT CAUSE\n- db pool"));
    }

    #[test]
    fn content_is_escaped() {
        let html = render_report("t", "a < b && c > d", Utc::now());
        assert!(html.contains("a &lt; b &amp;&amp; c &gt; d"));
    }

    #[test]
    fn writes_slugged_file() {
        let dir = tempfile::tempdir().unwrap();
        let at = DateTime::parse_from_rfc3339("2026-02-01T15:52:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let path = write_report(dir.path(), "Crash Period #1", "body", at).unwrap();
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("logflow-report-crash-period-1-"));
        assert!(name.ends_with(".html"));
        assert!(fs::read_to_string(&path).unwrap().contains("body"));
    }
}
