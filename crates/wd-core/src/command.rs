//! Command extraction from shell history lines.

/// Separator between a history line's metadata prefix and its command.
const SEPARATOR: char = ';';

/// Extracts the command portion of a shell history line.
///
/// zsh extended history lines look like `: 1700000000:0;git status`; the
/// command is everything after the first `;`. Lines without a separator are
/// returned unchanged.
pub fn extract_command(line: &str) -> &str {
    line.split_once(SEPARATOR).map_or(line, |(_, command)| command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_first_separator() {
        assert_eq!(extract_command("2024-01-01 10:00;git status"), "git status");
        assert_eq!(extract_command(": 1700000000:0;git status"), "git status");
    }

    #[test]
    fn keeps_later_separators_in_command() {
        assert_eq!(extract_command(": 1:0;cd foo; make"), "cd foo; make");
    }

    #[test]
    fn line_without_separator_is_verbatim() {
        assert_eq!(extract_command("cargo build"), "cargo build");
    }

    #[test]
    fn trailing_separator_yields_empty_command() {
        assert_eq!(extract_command("prefix;"), "");
    }
}
