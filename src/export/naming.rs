use std::path::Path;

/// Name of the concatenated output written by direct concatenation.
pub const FINAL_OUTPUT_NAME: &str = "final_output.mp4";

/// Strip characters that are invalid in file names on common filesystems.
pub fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .filter(|c| !matches!(c, '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|'))
        .collect()
}

/// `<index>_<sanitized title>.mp4`
pub fn segment_file_name(index: usize, title: &str) -> String {
    format!("{index}_{}.mp4", sanitize_title(title))
}

const FULL_VIDEO_SUFFIX: &str = "_FULL_VIDEO.mp4";

/// `<owner>_FULL_VIDEO.mp4`
pub fn full_video_file_name(owner: &str) -> String {
    format!("{}{FULL_VIDEO_SUFFIX}", sanitize_title(owner))
}

/// Prefix of in-progress encodes; renamed to their final name only once complete.
pub const PARTIAL_PREFIX: &str = ".partial-";

/// Whether `file_name` is an exported segment that direct concatenation should pick up.
pub fn is_segment_file(file_name: &str) -> bool {
    file_name.ends_with(".mp4")
        && !file_name.starts_with(PARTIAL_PREFIX)
        && file_name != FINAL_OUTPUT_NAME
        && !file_name.ends_with(FULL_VIDEO_SUFFIX)
}

/// Numeric prefix before the first `_` of the file stem, as produced by [`segment_file_name`].
pub fn parse_index_prefix(file_name: &str) -> Option<u64> {
    let stem = Path::new(file_name).file_stem()?.to_str()?;
    stem.split('_').next()?.parse().ok()
}

/// Order file names by index prefix; names without one keep their relative order at the end.
pub fn sort_by_index_prefix(names: &mut [String]) {
    names.sort_by_key(|n| parse_index_prefix(n).unwrap_or(u64::MAX));
}

#[cfg(test)]
#[path = "../../tests/unit/export/naming.rs"]
mod tests;
