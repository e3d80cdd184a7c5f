use super::info_hash::InfoHash;

/// Build `magnet:?xt=urn:btih:<hex>&dn=<name>` with the name percent-encoded.
pub fn magnet_link(info_hash: &InfoHash, display_name: &str) -> String {
    format!(
        "magnet:?xt=urn:btih:{}&dn={}",
        info_hash.to_hex(),
        urlencoding::encode(display_name)
    )
}
