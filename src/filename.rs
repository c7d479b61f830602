//! File name conventions used by image generators.

use chrono::{NaiveDate, NaiveDateTime};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Recovers a creation date from a generator file name.
///
/// Recognized prefixes:
/// - `yyyyMMdd` (e.g. `20240131-153012_seed.png`)
/// - `yy-MM-dd` (e.g. `24-01-31 1girl.png`), read as 20yy
///
/// The date is returned at midnight. Prefixes that are not a real calendar date yield `None`.
pub fn parse_created_at(file_name: &str) -> Option<NaiveDateTime> {
    parse_compact_date(file_name)
        .or_else(|| parse_dashed_date(file_name))
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

fn parse_compact_date(file_name: &str) -> Option<NaiveDate> {
    let prefix = file_name.get(..8)?;
    if !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::from_ymd_opt(
        prefix[..4].parse().ok()?,
        prefix[4..6].parse().ok()?,
        prefix[6..8].parse().ok()?,
    )
}

fn parse_dashed_date(file_name: &str) -> Option<NaiveDate> {
    let prefix = file_name.get(..8)?;
    let shape_matches = prefix.bytes().enumerate().all(|(idx, b)| match idx {
        2 | 5 => b == b'-',
        _ => b.is_ascii_digit(),
    });
    if !shape_matches {
        return None;
    }
    let year: i32 = prefix[..2].parse().ok()?;
    NaiveDate::from_ymd_opt(
        2000 + year,
        prefix[3..5].parse().ok()?,
        prefix[6..8].parse().ok()?,
    )
}

/// Whether `path` names an image the gallery indexes.
pub fn is_image_file(path: &str) -> bool {
    path.rsplit_once('.')
        .map(|(_, ext)| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|candidate| ext.eq_ignore_ascii_case(candidate))
        })
        .unwrap_or(false)
}
