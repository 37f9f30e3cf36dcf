//! Log scanning for Maven build output.
//!
//! Pure text analysis: version-token extraction from `--version` output,
//! ANSI escape stripping, and the error-line classifier used by the
//! error-free-log check.

use std::sync::OnceLock;

use regex::Regex;

/// One terminal control sequence: ESC `[`, parameter bytes, intermediate
/// bytes, final byte.
const ANSI_PATTERN: &str = "\u{1b}\\[[;\\d]*[ -/]*[@-~]";

/// The greedy prefix anchors the capture to the last digit-led token on a
/// "Maven" line, so build dates and other numbers earlier in the line do not
/// win over the version.
const VERSION_PATTERN: &str = r"(?i).*Maven.*? ([0-9]\.\S*).*";

fn ansi_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(ANSI_PATTERN).expect("ANSI pattern compiles"))
}

fn version_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(VERSION_PATTERN).expect("version pattern compiles"))
}

/// Removes all ANSI escape sequences, leaving every other character
/// untouched. Idempotent.
pub fn strip_ansi(text: &str) -> String {
    ansi_regex().replace_all(text, "").into_owned()
}

/// Scans lines in order for a Maven version token and returns the first one
/// found.
///
/// A line matches when it mentions "Maven" (case-insensitively) followed by
/// a `<digit>.<non-whitespace>*` token; the token is the extracted version.
pub fn extract_maven_version<I, S>(lines: I) -> Option<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let re = version_regex();
    for line in lines {
        if let Some(caps) = re.captures(line.as_ref()) {
            if let Some(version) = caps.get(1) {
                return Some(version.as_str().to_string());
            }
        }
    }
    None
}

/// Whether a log line reports a real build error.
///
/// A line qualifies when it carries the `[ERROR]` marker after ANSI
/// stripping and is not one of the known Velocity false positives.
pub fn is_build_error(line: &str) -> bool {
    strip_ansi(line).contains("[ERROR]") && !is_velocity_noise(line)
}

/// Velocity logs macro diagnostics at error level even when the build is
/// fine: lines naming the global library file, or a "VM #" macro slot.
fn is_velocity_noise(line: &str) -> bool {
    line.contains("VM_global_library.vm") || (line.contains("VM #") && line.contains("macro"))
}
