//! Parsing the machine-readable header of a module interface.
//!
//! The first few lines of an interface carry two headers matched by fixed
//! patterns: the format version the interface was printed in, and the
//! frozen argument vector the printing compiler wants replayed into the
//! sub-invocation that rebuilds the module.

use std::fmt;
use std::path::Path;

use regex::Regex;

use lumen_common::{Filesystem, Ident, Interner};

/// File extension for textual module interfaces.
pub const INTERFACE_EXTENSION: &str = "lumeninterface";

/// The interface format version this compiler knows how to rebuild.
pub const INTERFACE_FORMAT_VERSION: InterfaceVersion = InterfaceVersion { major: 1, minor: 0 };

const VERSION_PATTERN: &str = r"(?m)^// lumen-interface-format-version: ([0-9.]+)";
const FLAGS_PATTERN: &str = r"(?m)^// lumen-module-flags:[ \t]*(.*)";

/// A dotted interface format version.
///
/// Only the major component gates compatibility; minor bumps mark
/// compatible field additions.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct InterfaceVersion {
    /// Compatibility-gating component.
    pub major: u32,
    /// Compatible-revision component.
    pub minor: u32,
}

impl InterfaceVersion {
    /// Parses a `major` or `major.minor` token. Extra dotted components are
    /// tolerated and ignored.
    pub fn parse(token: &str) -> Option<Self> {
        let mut parts = token.split('.');
        let major = parts.next()?.parse().ok()?;
        let minor = match parts.next() {
            Some(p) => p.parse().ok()?,
            None => 0,
        };
        Some(Self { major, minor })
    }
}

impl fmt::Display for InterfaceVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// The parsed header of an interface file.
#[derive(Debug)]
pub struct InterfaceHeader {
    /// Format version declared by the interface.
    pub version: InterfaceVersion,
    /// Tokenized flags line, interned into the session interner.
    pub args: Vec<Ident>,
}

/// Why an interface header could not be extracted.
#[derive(Debug, thiserror::Error)]
pub enum InterfaceHeaderError {
    /// The interface file could not be read.
    #[error("cannot open module interface: {0}")]
    Open(std::io::Error),

    /// No format-version header line was found.
    #[error("missing interface format version header")]
    MissingVersion,

    /// The version token did not parse as a dotted version.
    #[error("malformed interface format version `{0}`")]
    InvalidVersion(String),

    /// No module-flags header line was found.
    #[error("missing module flags header")]
    MissingFlags,
}

/// Reads `interface_path` and extracts its format version and flag vector.
///
/// The flags payload is tokenized with shell quoting rules and the tokens
/// are interned so they stay alive for the duration of the sub-build.
pub fn extract_interface_header(
    fs: &dyn Filesystem,
    interner: &Interner,
    interface_path: &Path,
) -> Result<InterfaceHeader, InterfaceHeaderError> {
    let bytes = fs.read(interface_path).map_err(InterfaceHeaderError::Open)?;
    let text = String::from_utf8_lossy(&bytes);

    let version_re = Regex::new(VERSION_PATTERN).unwrap();
    let flags_re = Regex::new(FLAGS_PATTERN).unwrap();

    let version_token = version_re
        .captures(&text)
        .and_then(|c| c.get(1))
        .ok_or(InterfaceHeaderError::MissingVersion)?
        .as_str();
    let version = InterfaceVersion::parse(version_token)
        .ok_or_else(|| InterfaceHeaderError::InvalidVersion(version_token.to_string()))?;

    let flags_line = flags_re
        .captures(&text)
        .and_then(|c| c.get(1))
        .ok_or(InterfaceHeaderError::MissingFlags)?
        .as_str();

    let args = tokenize_command_line(flags_line)
        .iter()
        .map(|tok| interner.get_or_intern(tok))
        .collect();

    Ok(InterfaceHeader { version, args })
}

/// Splits a flags line into arguments with shell quoting rules.
///
/// Whitespace separates tokens; single quotes preserve everything
/// literally; double quotes allow backslash escapes; a bare backslash
/// escapes the next character. An unterminated quote runs to the end of
/// the line.
pub fn tokenize_command_line(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            c if c.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            '\'' => {
                in_token = true;
                for q in chars.by_ref() {
                    if q == '\'' {
                        break;
                    }
                    current.push(q);
                }
            }
            '"' => {
                in_token = true;
                while let Some(q) = chars.next() {
                    match q {
                        '"' => break,
                        '\\' => {
                            if let Some(escaped) = chars.next() {
                                current.push(escaped);
                            }
                        }
                        _ => current.push(q),
                    }
                }
            }
            '\\' => {
                in_token = true;
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            }
            _ => {
                in_token = true;
                current.push(c);
            }
        }
    }
    if in_token {
        tokens.push(current);
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_common::OsFilesystem;

    fn write_interface(dir: &Path, name: &str, text: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn extracts_version_and_flags() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_interface(
            dir.path(),
            "Core.lumeninterface",
            "// lumen-interface-format-version: 1.0\n\
             // lumen-module-flags: -target arm64-unknown-linux -module-name Core\n\
             public func hello()\n",
        );

        let interner = Interner::new();
        let header = extract_interface_header(&OsFilesystem, &interner, &path).unwrap();
        assert_eq!(header.version, InterfaceVersion { major: 1, minor: 0 });
        assert_eq!(
            interner.resolve_all(&header.args),
            vec!["-target", "arm64-unknown-linux", "-module-name", "Core"]
        );
    }

    #[test]
    fn missing_version_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_interface(
            dir.path(),
            "Core.lumeninterface",
            "// lumen-module-flags: -module-name Core\n",
        );
        let interner = Interner::new();
        let err = extract_interface_header(&OsFilesystem, &interner, &path).unwrap_err();
        assert!(matches!(err, InterfaceHeaderError::MissingVersion));
    }

    #[test]
    fn missing_flags_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_interface(
            dir.path(),
            "Core.lumeninterface",
            "// lumen-interface-format-version: 1.0\n",
        );
        let interner = Interner::new();
        let err = extract_interface_header(&OsFilesystem, &interner, &path).unwrap_err();
        assert!(matches!(err, InterfaceHeaderError::MissingFlags));
    }

    #[test]
    fn unreadable_interface() {
        let interner = Interner::new();
        let err = extract_interface_header(
            &OsFilesystem,
            &interner,
            Path::new("/nonexistent/Core.lumeninterface"),
        )
        .unwrap_err();
        assert!(matches!(err, InterfaceHeaderError::Open(_)));
    }

    #[test]
    fn malformed_version_token() {
        assert!(InterfaceVersion::parse("one.two").is_none());
        assert!(InterfaceVersion::parse("").is_none());
    }

    #[test]
    fn version_parsing_variants() {
        assert_eq!(
            InterfaceVersion::parse("2"),
            Some(InterfaceVersion { major: 2, minor: 0 })
        );
        assert_eq!(
            InterfaceVersion::parse("1.7"),
            Some(InterfaceVersion { major: 1, minor: 7 })
        );
        // Extra components are ignored.
        assert_eq!(
            InterfaceVersion::parse("1.2.3"),
            Some(InterfaceVersion { major: 1, minor: 2 })
        );
    }

    #[test]
    fn version_display() {
        assert_eq!(InterfaceVersion { major: 1, minor: 0 }.to_string(), "1.0");
    }

    #[test]
    fn tokenize_plain_args() {
        assert_eq!(
            tokenize_command_line("-target arm64 -module-name Core"),
            vec!["-target", "arm64", "-module-name", "Core"]
        );
    }

    #[test]
    fn tokenize_collapses_whitespace() {
        assert_eq!(tokenize_command_line("  -I   /a/b  "), vec!["-I", "/a/b"]);
    }

    #[test]
    fn tokenize_double_quotes() {
        assert_eq!(
            tokenize_command_line(r#"-I "/path with spaces/include""#),
            vec!["-I", "/path with spaces/include"]
        );
    }

    #[test]
    fn tokenize_single_quotes_literal() {
        assert_eq!(
            tokenize_command_line(r"'-I' '/a b/\n'"),
            vec!["-I", r"/a b/\n"]
        );
    }

    #[test]
    fn tokenize_backslash_escape() {
        assert_eq!(tokenize_command_line(r"/a\ b"), vec!["/a b"]);
    }

    #[test]
    fn tokenize_escaped_quote_in_double_quotes() {
        assert_eq!(tokenize_command_line(r#""say \"hi\"""#), vec![r#"say "hi""#]);
    }

    #[test]
    fn tokenize_empty_line() {
        assert!(tokenize_command_line("").is_empty());
        assert!(tokenize_command_line("   ").is_empty());
    }

    #[test]
    fn tokenize_empty_quoted_token() {
        assert_eq!(tokenize_command_line("'' -x"), vec!["", "-x"]);
    }
}
