use crate::ToolError;
use std::path::Path;
use std::time::Duration;
use url::Url;

const RESERVED_FILENAME_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Make a file name safe to write: reserved and control characters become
/// `_`, and leading dots are dropped so the result is never hidden or
/// relative.
pub fn sanitize_filename(input: &str) -> String {
    let cleaned: String = input
        .chars()
        .map(|c| {
            if RESERVED_FILENAME_CHARS.contains(&c) || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();

    cleaned.trim().trim_start_matches('.').to_string()
}

/// Swap the extension of a file name, keeping the stem.
pub fn replace_extension(name: &str, extension: &str) -> String {
    let stem = Path::new(name)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or(name);
    format!("{stem}.{extension}")
}

pub fn format_duration(duration: Duration) -> String {
    match duration.as_secs() {
        0 => format!("{}ms", duration.as_millis()),
        1..=59 => format!("{:.1}s", duration.as_secs_f64()),
        secs => format!("{}m {:02}s", secs / 60, secs % 60),
    }
}

/// Human-readable size in binary units.
pub fn format_bytes(bytes: u64) -> String {
    const STEPS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];

    if bytes < 1024 {
        return format!("{bytes} B");
    }

    let mut value = bytes as f64 / 1024.0;
    let mut unit = STEPS[0];
    for next in &STEPS[1..] {
        if value < 1024.0 {
            break;
        }
        value /= 1024.0;
        unit = next;
    }

    format!("{value:.1} {unit}")
}

/// Parse `url` and require an http or https scheme.
pub fn validate_url(url: &str) -> Result<Url, ToolError> {
    let parsed = Url::parse(url.trim()).map_err(|e| ToolError::InvalidUrl(format!("{url}: {e}")))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ToolError::InvalidUrl(format!(
            "{url}: unsupported scheme {}",
            parsed.scheme()
        )));
    }

    Ok(parsed)
}

/// Host name of a parsed URL, without any `www.` prefix.
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str()
        .map(|host| host.strip_prefix("www.").unwrap_or(host).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("track.mp3"), "track.mp3");
        assert_eq!(sanitize_filename("live/set 01.ogg"), "live_set 01.ogg");
        assert_eq!(sanitize_filename("..\\secret.wav"), "_secret.wav");
        assert_eq!(sanitize_filename(".hidden.flac"), "hidden.flac");
    }

    #[test]
    fn test_replace_extension() {
        assert_eq!(replace_extension("song.wav", "mp3"), "song.mp3");
        assert_eq!(replace_extension("archive.tar.gz", "ogg"), "archive.tar.ogg");
        assert_eq!(replace_extension("noext", "flac"), "noext.flac");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(250)), "250ms");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.5s");
        assert_eq!(format_duration(Duration::from_secs(125)), "2m 05s");
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1023), "1023 B");
        assert_eq!(format_bytes(1536), "1.5 KiB");
        assert_eq!(format_bytes(10 * 1024 * 1024), "10.0 MiB");
        assert_eq!(format_bytes(3 * 1024 * 1024 * 1024), "3.0 GiB");
    }

    #[test]
    fn test_validate_url() {
        assert!(validate_url("https://example.com/a?b=c").is_ok());
        assert!(validate_url("  http://example.com  ").is_ok());
        assert!(matches!(
            validate_url("ftp://example.com"),
            Err(ToolError::InvalidUrl(_))
        ));
        assert!(matches!(validate_url("example"), Err(ToolError::InvalidUrl(_))));
    }

    #[test]
    fn test_extract_domain() {
        let url = Url::parse("https://www.videos.example.com/watch?v=1").unwrap();
        assert_eq!(extract_domain(&url), Some("videos.example.com".to_string()));

        let ip = Url::parse("http://127.0.0.1:8080/").unwrap();
        assert_eq!(extract_domain(&ip), Some("127.0.0.1".to_string()));
    }
}
