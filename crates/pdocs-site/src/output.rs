//! Output file naming.

use std::path::{Component, Path, PathBuf};

/// Source extensions stripped when deriving an output name.
const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown"];

/// Output file for a page, relative to the output directory.
///
/// The name is the front matter slug when set, otherwise the source file
/// name without its markdown extension. `.html` is appended. Returns `None`
/// if the name is empty, absolute or climbs out of the output directory.
pub(crate) fn output_path(slug: Option<&str>, source: &Path) -> Option<PathBuf> {
    let name = match slug {
        Some(slug) => slug.to_owned(),
        None => source_stem(source)?,
    };
    let name = name.trim_matches('/');

    let path = Path::new(name);
    let valid = !name.is_empty()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
    valid.then(|| PathBuf::from(format!("{name}.html")))
}

fn source_stem(source: &Path) -> Option<String> {
    let file_name = source.file_name()?.to_str()?;
    let stem = match source.extension().and_then(|e| e.to_str()) {
        Some(ext) if MARKDOWN_EXTENSIONS.contains(&ext) => source.file_stem()?.to_str()?,
        _ => file_name,
    };
    Some(stem.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(slug: Option<&str>, source: &str) -> Option<String> {
        output_path(slug, Path::new(source)).map(|p| p.to_string_lossy().into_owned())
    }

    #[test]
    fn test_slug_wins() {
        assert_eq!(output(Some("start"), "intro.md").as_deref(), Some("start.html"));
    }

    #[test]
    fn test_basename_without_markdown_extension() {
        assert_eq!(output(None, "guide/intro.md").as_deref(), Some("intro.html"));
        assert_eq!(output(None, "notes.markdown").as_deref(), Some("notes.html"));
    }

    #[test]
    fn test_other_extensions_are_kept() {
        assert_eq!(output(None, "notes.txt").as_deref(), Some("notes.txt.html"));
    }

    #[test]
    fn test_nested_slug() {
        assert_eq!(output(Some("guide/intro"), "intro.md").as_deref(), Some("guide/intro.html"));
    }

    #[test]
    fn test_rejects_escaping_names() {
        assert_eq!(output(Some("../outside"), "a.md"), None);
        assert_eq!(output(Some("guide/../../x"), "a.md"), None);
        assert_eq!(output(Some("."), "a.md"), None);
    }

    #[test]
    fn test_leading_slash_is_trimmed() {
        assert_eq!(output(Some("/about"), "a.md").as_deref(), Some("about.html"));
    }
}
