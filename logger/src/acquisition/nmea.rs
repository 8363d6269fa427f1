/// Minimal NMEA GGA parsing for the GY-GPS6MV2 receiver. Only the fix
/// sentence matters here; everything else on the wire is ignored.

/// A parsed GGA fix in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GgaFix {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: Option<f32>,
}

/// Parses one `$..GGA` sentence. Returns `None` for non-GGA lines, fix
/// quality 0 (invalid), malformed coordinates, or a failed checksum.
pub fn parse_gga(line: &str) -> Option<GgaFix> {
    let line = line.trim();
    let body = line.strip_prefix('$')?;

    let body = match body.split_once('*') {
        Some((body, checksum)) => {
            let expected = u8::from_str_radix(checksum.trim(), 16).ok()?;
            if nmea_checksum(body) != expected {
                return None;
            }
            body
        }
        None => body,
    };

    let fields: Vec<&str> = body.split(',').collect();
    if fields.len() < 10 || !fields[0].ends_with("GGA") {
        return None;
    }
    // Fix quality 0 means the receiver has no position yet.
    if matches!(fields[6].trim(), "" | "0") {
        return None;
    }

    Some(GgaFix {
        latitude: dm_to_decimal(fields[2], fields[3])?,
        longitude: dm_to_decimal(fields[4], fields[5])?,
        altitude: fields[9].trim().parse::<f32>().ok(),
    })
}

fn nmea_checksum(body: &str) -> u8 {
    body.bytes().fold(0, |acc, b| acc ^ b)
}

/// NMEA packs coordinates as ddmm.mmmm (degrees * 100 + minutes).
fn dm_to_decimal(value: &str, direction: &str) -> Option<f64> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    let raw: f64 = value.parse().ok()?;
    let degrees = (raw / 100.0).trunc();
    let minutes = raw - degrees * 100.0;
    let mut decimal = degrees + minutes / 60.0;
    if matches!(direction.trim(), "S" | "W") {
        decimal = -decimal;
    }
    Some(decimal)
}
