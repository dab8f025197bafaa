/// One `name/version (comment; comment)` product token of a User-Agent header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Section<'a> {
    name: &'a str,
    version: &'a str,
    comment: Vec<&'a str>,
}

/// Browser name, version and device class detected from a User-Agent header.
///
/// Detection is positional: the first product is `Mozilla/x` for every modern
/// browser, the second is the rendering engine, and the browser itself is
/// found relative to the engine or at the end of the header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserAgent {
    pub browser: String,
    pub version: String,
    pub mobile: bool,
}

impl UserAgent {
    pub fn parse(header: &str) -> Self {
        let sections = parse_sections(header.trim());
        let (browser, version) = detect_browser(&sections);
        Self {
            browser: browser.to_string(),
            version: version.to_string(),
            mobile: is_mobile(&sections),
        }
    }
}

fn parse_sections(header: &str) -> Vec<Section<'_>> {
    let bytes = header.as_bytes();
    let mut sections: Vec<Section<'_>> = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b' ' {
            i += 1;
            continue;
        }
        if bytes[i] == b'(' {
            // Comment without a product in front of it.
            let (comment, next) = read_comment(header, i);
            match sections.last_mut() {
                Some(section) => section.comment.extend(comment),
                None => sections.push(Section {
                    comment,
                    ..Section::default()
                }),
            }
            i = next;
            continue;
        }

        let start = i;
        while i < bytes.len() && bytes[i] != b' ' && bytes[i] != b'(' {
            i += 1;
        }
        let token = &header[start..i];
        let (name, version) = token.split_once('/').unwrap_or((token, ""));
        let mut section = Section {
            name,
            version,
            comment: Vec::new(),
        };

        let mut lookahead = i;
        while lookahead < bytes.len() && bytes[lookahead] == b' ' {
            lookahead += 1;
        }
        if lookahead < bytes.len() && bytes[lookahead] == b'(' {
            let (comment, next) = read_comment(header, lookahead);
            section.comment = comment;
            i = next;
        }
        sections.push(section);
    }
    sections
}

/// Reads a parenthesised comment starting at `open`, honouring nesting.
/// Returns the `;`-separated entries and the index just past the comment.
fn read_comment(header: &str, open: usize) -> (Vec<&str>, usize) {
    let bytes = header.as_bytes();
    let mut depth = 0usize;
    let mut end = bytes.len();
    for (idx, byte) in bytes.iter().enumerate().skip(open) {
        match byte {
            b'(' => depth += 1,
            b')' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    end = idx;
                    break;
                }
            }
            _ => {}
        }
    }
    let inner = &header[open + 1..end];
    let entries = inner
        .split(';')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .collect();
    (entries, (end + 1).min(bytes.len()))
}

fn detect_browser<'a>(sections: &[Section<'a>]) -> (&'a str, &'a str) {
    let Some(first) = sections.first() else {
        return ("", "");
    };

    if first.name != "Mozilla" {
        // Presto-era Opera reports its real version in a trailing `Version/`.
        if first.name == "Opera" {
            if let Some(version) = sections.iter().find(|section| section.name == "Version") {
                return ("Opera", version.version);
            }
        }
        return (first.name, first.version);
    }

    if sections.len() == 1 {
        return legacy_internet_explorer(first);
    }
    if sections.len() < 3 {
        return ("", "");
    }

    // Some platforms put a bare product (e.g. `Ubuntu`) right after the engine.
    let index = if sections[2].version.is_empty() && sections.len() > 3 {
        3
    } else {
        2
    };

    match sections[1].name {
        "AppleWebKit" => {
            let (browser, version) = webkit_browser(sections, index);
            if browser == "Safari" && is_android(first) {
                ("Android", version)
            } else {
                (browser, version)
            }
        }
        "Gecko" => (sections[index].name, sections[index].version),
        "like" if sections[2].name == "Gecko" => ("Internet Explorer", trident_version(first)),
        _ => ("", ""),
    }
}

fn webkit_browser<'a>(sections: &[Section<'a>], index: usize) -> (&'a str, &'a str) {
    let last = &sections[sections.len() - 1];
    match last.name {
        "Edge" | "Edg" | "EdgA" => return ("Edge", last.version),
        "OPR" => return ("Opera", last.version),
        _ => {}
    }

    let third_from_end = &sections[sections.len() - 3];
    if third_from_end.name == "YaBrowser" {
        return ("YaBrowser", third_from_end.version);
    }

    let section = &sections[index];
    let browser = match section.name {
        "Chrome" | "CriOS" => "Chrome",
        "HeadlessChrome" => "Headless Chrome",
        "Chromium" => "Chromium",
        "GSA" => "Google App",
        "FxiOS" => "Firefox",
        _ => "Safari",
    };
    (browser, section.version)
}

fn legacy_internet_explorer<'a>(section: &Section<'a>) -> (&'a str, &'a str) {
    let is_msie = section.comment.len() > 1
        && section.comment[0] == "compatible"
        && section.comment[1].starts_with("MSIE");
    if !is_msie {
        return ("", "");
    }
    let version = section.comment[1]
        .trim_start_matches("MSIE")
        .trim_start();
    ("Internet Explorer", version)
}

fn trident_version<'a>(section: &Section<'a>) -> &'a str {
    section
        .comment
        .iter()
        .copied()
        .find_map(|entry| entry.strip_prefix("rv:"))
        .unwrap_or("")
}

fn is_android(section: &Section<'_>) -> bool {
    section
        .comment
        .iter()
        .any(|entry| entry.starts_with("Android"))
}

fn is_mobile(sections: &[Section<'_>]) -> bool {
    sections.iter().any(|section| {
        section.name == "Mobile"
            || section.comment.iter().any(|entry| {
                entry.starts_with("Mobile")
                    || entry.starts_with("iPhone")
                    || entry.starts_with("iPod")
                    || entry.starts_with("Windows Phone")
            })
    })
}
