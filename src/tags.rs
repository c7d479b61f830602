use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

pub type TagSet = BTreeSet<String>;
pub type ArtistSet = BTreeSet<String>;

const ARTIST_PREFIX: &str = "artist:";

static WRAPPED_IN_PARENS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\(.*\)$").expect("valid parenthesis pattern"));

// Matches anywhere in the tag, so `foo:12bar` also loses its `:12`.
static WEIGHT_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":[0-9]+(\.[0-9]+)?").expect("valid weight pattern"));

/// Extracts normalized tags from the positive prompt.
///
/// Rules:
/// - comma-split prompt fragments
/// - one outer `[ ]` or `{ }` layer removed, then one outer `( )` layer
/// - weights like `:1.2` removed
/// - empty fragments dropped, duplicates collapsed
pub fn extract_tags(prompt: &str) -> TagSet {
    let mut tags = TagSet::new();
    if prompt.trim().is_empty() {
        return tags;
    }

    for token in prompt.split(',') {
        let cleaned = clean_tag(token);
        if !cleaned.is_empty() {
            tags.insert(cleaned);
        }
    }

    tags
}

/// Removes weighting and grouping syntax from a single prompt fragment.
///
/// Only one layer of each bracket kind is stripped: `((nested))` becomes `(nested)`.
pub fn clean_tag(tag: &str) -> String {
    let mut tag = tag.trim();
    if tag.is_empty() {
        return String::new();
    }

    if let Some(inner) = strip_outer(tag, '[', ']').or_else(|| strip_outer(tag, '{', '}')) {
        tag = inner;
    }

    if WRAPPED_IN_PARENS.is_match(tag) {
        if let Some(inner) = strip_outer(tag, '(', ')') {
            tag = inner;
        }
    }

    WEIGHT_SUFFIX.replace_all(tag, "").trim().to_string()
}

fn strip_outer(tag: &str, open: char, close: char) -> Option<&str> {
    tag.strip_prefix(open)?.strip_suffix(close)
}

/// Splits `artist:` tags out of a tag set.
///
/// Returns `(tags, artists)`; the two sets never share an entry. A bare `artist:` with
/// nothing after it stays a regular tag.
pub fn partition_artists(tags: TagSet) -> (TagSet, ArtistSet) {
    let mut remaining = TagSet::new();
    let mut artists = ArtistSet::new();

    for tag in tags {
        match artist_name(&tag) {
            Some(name) => {
                artists.insert(name.to_string());
            }
            None => {
                remaining.insert(tag);
            }
        }
    }

    (remaining, artists)
}

/// Moves every artist tag out of `tags` and returns the artist names.
pub fn extract_artists(tags: &mut TagSet) -> ArtistSet {
    let (remaining, artists) = partition_artists(std::mem::take(tags));
    *tags = remaining;
    artists
}

fn artist_name(tag: &str) -> Option<&str> {
    let prefix = tag.get(..ARTIST_PREFIX.len())?;
    if !prefix.eq_ignore_ascii_case(ARTIST_PREFIX) {
        return None;
    }
    let name = tag[ARTIST_PREFIX.len()..].trim();
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}
