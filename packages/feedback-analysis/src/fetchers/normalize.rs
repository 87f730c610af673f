//! Known-pattern URL rewrites applied before fetching.
//!
//! Collaborative document editors serve a login wall on their "edit" URLs
//! but render readable HTML on their public view URLs.

use tracing::debug;
use url::Url;

/// Rewrite a Google Docs/Sheets/Slides/Forms edit URL to its view form.
/// Other URLs are returned unchanged.
pub fn normalize_url(url: Url) -> Url {
    if url.host_str() != Some("docs.google.com") {
        return url;
    }

    let segments: Vec<String> = match url.path_segments() {
        Some(segments) => segments.map(String::from).collect(),
        None => return url,
    };

    let view = match segments.first().map(String::as_str) {
        Some("document") | Some("presentation") => "preview",
        Some("spreadsheets") => "htmlview",
        Some("forms") => "viewform",
        _ => return url,
    };

    let Some(d_idx) = segments.iter().position(|s| s == "d") else {
        return url;
    };
    let Some(edit_idx) = segments.iter().position(|s| s == "edit") else {
        return url;
    };
    // Need at least a document id between "d" and "edit"
    if edit_idx <= d_idx + 1 {
        return url;
    }

    let mut rewritten = url.clone();
    let path = format!("/{}/{}", segments[..edit_idx].join("/"), view);
    rewritten.set_path(&path);
    rewritten.set_fragment(None);

    debug!(original = %url, rewritten = %rewritten, "Normalized document URL");
    rewritten
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalize(url: &str) -> String {
        normalize_url(Url::parse(url).unwrap()).to_string()
    }

    #[test]
    fn test_document_edit_becomes_preview() {
        assert_eq!(
            normalize("https://docs.google.com/document/d/abc123/edit?usp=sharing"),
            "https://docs.google.com/document/d/abc123/preview?usp=sharing"
        );
    }

    #[test]
    fn test_sheet_edit_drops_fragment() {
        assert_eq!(
            normalize("https://docs.google.com/spreadsheets/d/s1/edit#gid=0"),
            "https://docs.google.com/spreadsheets/d/s1/htmlview"
        );
    }

    #[test]
    fn test_form_edit_becomes_viewform() {
        assert_eq!(
            normalize("https://docs.google.com/forms/d/f9/edit"),
            "https://docs.google.com/forms/d/f9/viewform"
        );
    }

    #[test]
    fn test_other_urls_unchanged() {
        assert_eq!(
            normalize("https://docs.google.com/document/d/abc123/preview"),
            "https://docs.google.com/document/d/abc123/preview"
        );
        assert_eq!(
            normalize("https://example.com/document/d/abc/edit"),
            "https://example.com/document/d/abc/edit"
        );
    }
}
