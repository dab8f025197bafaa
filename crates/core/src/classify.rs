use crate::ClassifiedBrowser;
use crate::user_agent::UserAgent;

/// Maps a raw User-Agent header onto the browser taxonomy used by the daily
/// summary. An empty family means the record should be skipped.
pub fn classify(header: &str) -> ClassifiedBrowser {
    let agent = UserAgent::parse(header);
    let mut family = agent.browser;
    let mut version = agent.version;

    // Stock Android browser detection is mostly wrong.
    if family == "Android" {
        return ClassifiedBrowser::default();
    }

    if family == "Chromium" {
        family = "Chrome".to_string();
    }

    // Chrome builds misreported as Safari carry a four-part version.
    if family == "Safari" && version.matches('.').count() == 3 {
        family = "Chrome".to_string();
    }

    match family.as_str() {
        "Chrome" | "Opera" => {
            if let Some(idx) = version.find('.') {
                version.truncate(idx);
            }
        }
        "Safari" => {
            let parts: Vec<&str> = version.split('.').collect();
            if parts.len() > 2 {
                version = format!("{}.{}", parts[0], parts[1]);
            }
        }
        _ => {}
    }

    ClassifiedBrowser {
        family,
        version,
        mobile: agent.mobile,
    }
}
