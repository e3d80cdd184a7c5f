const KIB: f64 = 1024.0;
const MIB: f64 = 1024.0 * 1024.0;
const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Parse an advertised size such as `"1.5 MiB"` into bytes.
///
/// Only binary `KiB`, `MiB` and `GiB` units are understood. Anything else,
/// including an unparsable quantity, yields 0.
pub fn parse_size(text: &str) -> u64 {
    let Some((quantity, unit)) = text.trim().split_once(char::is_whitespace) else {
        return 0;
    };

    let multiplier = match unit.trim() {
        "KiB" => KIB,
        "MiB" => MIB,
        "GiB" => GIB,
        _ => return 0,
    };

    match quantity.parse::<f64>() {
        Ok(q) if q.is_finite() && q >= 0.0 => (q * multiplier) as u64,
        _ => 0,
    }
}
