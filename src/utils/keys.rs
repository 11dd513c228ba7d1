use std::path::{Path, PathBuf};

pub const MINIFIED_JS_MAP_SUFFIX: &str = ".min.js.map";
pub const MINIFIED_CSS_MAP_SUFFIX: &str = ".min.css.map";
pub const ASSETS_DEST_PREFIX: &str = "assets/";

fn strip_source_prefix<'a>(key: &'a str, prefix: &str) -> &'a str {
    key.strip_prefix(prefix).unwrap_or(key).trim_start_matches('/')
}

/// Re-roots an object found under the assets source prefix below `assets/`.
pub fn asset_dest_key(key: &str, assets_prefix: &str) -> String {
    format!("{}{}", ASSETS_DEST_PREFIX, strip_source_prefix(key, assets_prefix))
}

/// Pages land at the root of the destination bucket.
pub fn page_dest_key(key: &str, version_prefix: &str) -> String {
    strip_source_prefix(key, version_prefix).to_string()
}

pub fn is_js_source_map(key: &str) -> bool {
    key.ends_with(MINIFIED_JS_MAP_SUFFIX)
}

pub fn is_source_map(key: &str) -> bool {
    is_js_source_map(key) || key.ends_with(MINIFIED_CSS_MAP_SUFFIX)
}

/// Public URL of the minified bundle a source map belongs to.
pub fn minified_url(base_url: &str, map_dest_key: &str) -> String {
    let url = format!("{}/{}", base_url, map_dest_key);
    match url.strip_suffix(".map") {
        Some(stripped) => stripped.to_string(),
        None => url,
    }
}

/// Local path for a staged object. The key's directory structure is mirrored
/// under `staging_dir`, so objects sharing a basename never collide and no
/// single path component is longer than the key's own segments.
/// Empty, `.` and `..` segments are dropped to keep the path inside `staging_dir`.
pub fn staging_path(staging_dir: &Path, key: &str) -> PathBuf {
    let mut path = staging_dir.to_path_buf();
    for segment in key
        .split('/')
        .filter(|s| !s.is_empty() && *s != "." && *s != "..")
    {
        path.push(segment);
    }
    path
}
