//! Command-line argument parsing
//!
//! Supports:
//! - Scanning one file, with its language detected from the extension
//! - A caret position, so selection modes can be tried out
//! - Text or JSON output

use clap::Parser;
use std::path::PathBuf;

use ligatures_limited::ligature::SelectionMode;
use ligatures_limited::syntax::LanguageId;

/// Report which ligatures in a file would be suppressed
#[derive(Parser, Debug)]
#[command(
    name = "ligatures-limited",
    version,
    about = "Report which ligatures in a file would be suppressed"
)]
pub struct CliArgs {
    /// File to scan
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Language id to scan as (detected from the extension by default)
    #[arg(short, long, value_name = "ID")]
    pub language: Option<String>,

    /// Settings file (defaults to the user config)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Force debug highlighting on
    #[arg(short, long)]
    pub debug: bool,

    /// Override the selection mode (cursor, line, selection, off)
    #[arg(long, value_name = "MODE")]
    pub selection_mode: Option<SelectionMode>,

    /// Caret position as LINE:COL (1-indexed)
    #[arg(long, value_name = "LINE:COL")]
    pub cursor: Option<String>,

    /// Print ranges as JSON
    #[arg(long)]
    pub json: bool,

    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone)]
pub struct ScanRequest {
    pub file: PathBuf,
    pub language: String,
    pub config: Option<PathBuf>,
    pub debug: bool,
    pub selection_mode: Option<SelectionMode>,
    /// Caret position, 0-indexed
    pub cursor: Option<(usize, usize)>,
    pub json: bool,
}

impl CliArgs {
    /// Convert parsed CLI args into a scan request
    pub fn into_config(self) -> Result<ScanRequest, String> {
        let language = self
            .language
            .unwrap_or_else(|| LanguageId::from_path(&self.file).host_id().to_string());

        // Convert from 1-indexed (user input) to 0-indexed (internal)
        let cursor = match self.cursor.as_deref() {
            Some(text) => Some(parse_cursor(text)?),
            None => None,
        };

        Ok(ScanRequest {
            file: self.file,
            language,
            config: self.config,
            debug: self.debug,
            selection_mode: self.selection_mode,
            cursor,
            json: self.json,
        })
    }
}

fn parse_cursor(text: &str) -> Result<(usize, usize), String> {
    let (line, column) = text.split_once(':').unwrap_or((text, "1"));
    let parse = |s: &str| {
        s.trim()
            .parse::<usize>()
            .map_err(|_| format!("Invalid cursor position: {}", text))
    };
    Ok((parse(line)?.saturating_sub(1), parse(column)?.saturating_sub(1)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(file: &str) -> CliArgs {
        CliArgs {
            file: PathBuf::from(file),
            language: None,
            config: None,
            debug: false,
            selection_mode: None,
            cursor: None,
            json: false,
            verbose: 0,
        }
    }

    #[test]
    fn test_language_from_extension() {
        let config = args("src/main.rs").into_config().unwrap();
        assert_eq!(config.language, "rust");

        let config = args("notes.txt").into_config().unwrap();
        assert_eq!(config.language, "plaintext");
    }

    #[test]
    fn test_explicit_language_wins() {
        let mut a = args("main.rs");
        a.language = Some("markdown".to_string());
        assert_eq!(a.into_config().unwrap().language, "markdown");
    }

    #[test]
    fn test_cursor_converted_to_zero_indexed() {
        let mut a = args("a.js");
        a.cursor = Some("3:7".to_string());
        assert_eq!(a.into_config().unwrap().cursor, Some((2, 6)));

        let mut a = args("a.js");
        a.cursor = Some("5".to_string());
        assert_eq!(a.into_config().unwrap().cursor, Some((4, 0)));
    }

    #[test]
    fn test_bad_cursor_rejected() {
        let mut a = args("a.js");
        a.cursor = Some("x:1".to_string());
        assert!(a.into_config().is_err());
    }

    #[test]
    fn test_parse_flags() {
        let parsed = CliArgs::try_parse_from([
            "ligatures-limited",
            "a.ts",
            "--selection-mode",
            "line",
            "--json",
            "-vv",
        ])
        .unwrap();
        assert_eq!(parsed.selection_mode, Some(SelectionMode::Line));
        assert!(parsed.json);
        assert_eq!(parsed.verbose, 2);
    }
}
