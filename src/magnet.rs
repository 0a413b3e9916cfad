use crate::models::MagnetLink;

/// Builds a magnet URI from an info hash, display name and tracker list.
///
/// Without a hash there is nothing to identify the torrent by, so the
/// result is [`MagnetLink::Unavailable`] rather than a partial URI. Trackers
/// keep the order they were discovered in.
pub fn synthesize(title: &str, info_hash: Option<&str>, trackers: &[String]) -> MagnetLink {
    let hash = match info_hash.map(str::trim) {
        Some(hash) if !hash.is_empty() => hash,
        _ => return MagnetLink::Unavailable,
    };

    let mut uri = format!(
        "magnet:?xt=urn:btih:{}&dn={}",
        hash,
        urlencoding::encode(title)
    );
    for tracker in trackers {
        uri.push_str("&tr=");
        uri.push_str(&urlencoding::encode(tracker));
    }

    MagnetLink::Available(uri)
}
