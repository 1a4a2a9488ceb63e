use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    #[default]
    Lf,
    Crlf,
    Mixed,
}

impl LineEnding {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Lf => "lf",
            LineEnding::Crlf => "crlf",
            LineEnding::Mixed => "mixed",
        }
    }
}

pub fn detect_line_ending_enum(content: &str) -> LineEnding {
    let crlf = content.matches("\r\n").count();
    let lf = content.matches('\n').count() - crlf;

    match (crlf > 0, lf > 0) {
        (true, true) => LineEnding::Mixed,
        (true, false) => LineEnding::Crlf,
        _ => LineEnding::Lf,
    }
}

/// Canonical whitespace for rendered output.
///
/// Every line loses trailing spaces, tabs and carriage returns, so CRLF input
/// comes out as LF. Trailing newlines collapse into exactly one, and an empty
/// document becomes a single `"\n"`.
pub fn normalize_whitespace(content: &str) -> String {
    let mut out = String::with_capacity(content.len() + 1);

    for (i, line) in content.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(line.trim_end_matches([' ', '\t', '\r']));
    }

    let kept = out.trim_end_matches('\n').len();
    out.truncate(kept);
    out.push('\n');
    out
}
