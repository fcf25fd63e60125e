/// Directory name under which every published image lives.
pub const IMAGES_ROOT: &str = "images";

/// Normalize a raw image reference into a distribution-relative path.
///
/// References already rooted at `images/` keep their sub-path; anything else
/// keeps only its final segment, re-rooted under `images/`. Backslashes are
/// accepted as separators and output always uses `/`. An empty reference, or
/// one with no file segment, normalizes to `""`.
pub fn normalize_image_path(raw: &str) -> String {
    let unified = raw.replace('\\', "/");
    let segments: Vec<&str> = unified
        .split('/')
        .filter(|s| !s.is_empty() && *s != ".")
        .collect();

    match segments.as_slice() {
        [] | [IMAGES_ROOT] => String::new(),
        [IMAGES_ROOT, rest @ ..] => format!("{IMAGES_ROOT}/{}", rest.join("/")),
        [.., last] => format!("{IMAGES_ROOT}/{last}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_file_name_is_rerooted() {
        assert_eq!(normalize_image_path("foo.png"), "images/foo.png");
    }

    #[test]
    fn foreign_directories_are_discarded() {
        assert_eq!(normalize_image_path("assets/amiibo/foo.png"), "images/foo.png");
    }

    #[test]
    fn images_sub_path_is_preserved() {
        assert_eq!(normalize_image_path("images/sub/bar.png"), "images/sub/bar.png");
    }

    #[test]
    fn backslashes_are_separators() {
        assert_eq!(normalize_image_path("images\\sub\\bar.png"), "images/sub/bar.png");
        assert_eq!(normalize_image_path("C:\\art\\baz.png"), "images/baz.png");
    }

    #[test]
    fn empty_reference_stays_empty() {
        assert_eq!(normalize_image_path(""), "");
        assert_eq!(normalize_image_path("///"), "");
        assert_eq!(normalize_image_path("images/"), "");
    }

    #[test]
    fn redundant_separators_collapse() {
        assert_eq!(normalize_image_path("images//sub/./bar.png"), "images/sub/bar.png");
    }

    #[test]
    fn normalization_is_idempotent() {
        let inputs = [
            "",
            "foo.png",
            "images/foo.png",
            "images\\a\\b.png",
            "x/y/z.png",
            "images",
            "./images/c.png",
            "/abs/path/d.png",
            "weird\\mix/of/e.png",
        ];
        for input in inputs {
            let once = normalize_image_path(input);
            assert_eq!(normalize_image_path(&once), once, "input: {input}");
            assert!(once.is_empty() || once.starts_with("images/"), "input: {input}");
        }
    }
}
