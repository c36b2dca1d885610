use url::Url;

const SIZE_PARAM: &str = "name";
const FORMAT_PARAM: &str = "format";
const PREFERRED_SIZE: &str = "large";
const SMALLER_NAMED_SIZES: [&str; 3] = ["thumb", "small", "medium"];
/// Longest edge of the `large` rendition.
const LARGE_EDGE: u32 = 2048;
const DEFAULT_EXTENSION: &str = "jpg";

/// Rewrite a media URL to request its large rendition.
///
/// Only `name=<size>` values known to be smaller than `large` are replaced:
/// `thumb`, `small`, `medium` and `<w>x<h>` below 2048 on both edges. All
/// other parameters keep their order. Unparseable URLs, URLs without a size
/// parameter and larger or unknown sizes are returned unchanged.
pub fn upgrade_media_url(url: &str) -> String {
    let Ok(mut parsed) = Url::parse(url) else {
        return url.to_string();
    };

    let pairs: Vec<(String, String)> = parsed
        .query_pairs()
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    let needs_upgrade = pairs
        .iter()
        .any(|(key, value)| key == SIZE_PARAM && is_below_large(value));
    if !needs_upgrade {
        return url.to_string();
    }

    parsed.query_pairs_mut().clear().extend_pairs(pairs.iter().map(|(key, value)| {
        if key == SIZE_PARAM {
            (key.as_str(), PREFERRED_SIZE)
        } else {
            (key.as_str(), value.as_str())
        }
    }));
    parsed.to_string()
}

fn is_below_large(size: &str) -> bool {
    if SMALLER_NAMED_SIZES.contains(&size) {
        return true;
    }
    let Some((width, height)) = size.split_once('x') else {
        return false;
    };
    match (width.parse::<u32>(), height.parse::<u32>()) {
        (Ok(width), Ok(height)) => width < LARGE_EDGE && height < LARGE_EDGE,
        _ => false,
    }
}

/// File extension implied by the `format` query parameter.
pub fn media_extension(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|parsed| {
            parsed
                .query_pairs()
                .find(|(key, _)| key == FORMAT_PARAM)
                .map(|(_, value)| value.to_ascii_lowercase())
        })
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
}
