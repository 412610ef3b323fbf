//! Line commands accepted by the interactive session.

use std::path::PathBuf;

use thiserror::Error;

pub const HELP: &str = "\
commands:
  file <path>   select an image (preview follows when k is not Auto)
  file          clear the selection
  k <n>         set cluster count, 0 = Auto
  b <n>         set golden-ratio weight
  submit        run the full analysis
  status        show the current form and result area
  help          show this list
  quit          leave the session";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SelectFile(PathBuf),
    ClearFile,
    SetK(u32),
    SetBWeight(u32),
    Submit,
    Status,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command '{0}'; type 'help' for a list")]
    Unknown(String),
    #[error("'{command}' expects {expected}")]
    MissingArgument {
        command: &'static str,
        expected: &'static str,
    },
    #[error("'{0}' is not a non-negative integer")]
    InvalidNumber(String),
}

impl Command {
    /// Parses one input line; blank lines yield `None`.
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (keyword, rest) = match line.split_once(char::is_whitespace) {
            Some((keyword, rest)) => (keyword, rest.trim()),
            None => (line, ""),
        };

        let command = match keyword.to_ascii_lowercase().as_str() {
            "file" | "open" => {
                if rest.is_empty() {
                    Command::ClearFile
                } else {
                    Command::SelectFile(PathBuf::from(rest))
                }
            }
            "k" => Command::SetK(parse_number("k", rest)?),
            "b" | "b_weight" | "bweight" => Command::SetBWeight(parse_number("b", rest)?),
            "submit" | "analyze" => Command::Submit,
            "status" => Command::Status,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            _ => return Err(CommandError::Unknown(keyword.to_string())),
        };
        Ok(Some(command))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::SelectFile(_) => "select_file",
            Command::ClearFile => "clear_file",
            Command::SetK(_) => "set_k",
            Command::SetBWeight(_) => "set_b_weight",
            Command::Submit => "submit",
            Command::Status => "status",
            Command::Help => "help",
            Command::Quit => "quit",
        }
    }
}

fn parse_number(command: &'static str, raw: &str) -> Result<u32, CommandError> {
    if raw.is_empty() {
        return Err(CommandError::MissingArgument {
            command,
            expected: "a number",
        });
    }
    raw.parse::<u32>()
        .map_err(|_| CommandError::InvalidNumber(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_line_is_ignored() {
        assert_eq!(Command::parse("   "), Ok(None));
    }

    #[test]
    fn file_keeps_spaces_in_path() {
        assert_eq!(
            Command::parse("file  ./my shots/shell 1.png "),
            Ok(Some(Command::SelectFile(PathBuf::from("./my shots/shell 1.png"))))
        );
        assert_eq!(Command::parse("file"), Ok(Some(Command::ClearFile)));
    }

    #[test]
    fn sliders_take_non_negative_integers() {
        assert_eq!(Command::parse("k 0"), Ok(Some(Command::SetK(0))));
        assert_eq!(Command::parse("B 15000"), Ok(Some(Command::SetBWeight(15_000))));
        assert_eq!(
            Command::parse("k -1"),
            Err(CommandError::InvalidNumber("-1".to_string()))
        );
        assert_eq!(
            Command::parse("k"),
            Err(CommandError::MissingArgument {
                command: "k",
                expected: "a number",
            })
        );
    }

    #[test]
    fn keywords_and_aliases() {
        assert_eq!(Command::parse("analyze"), Ok(Some(Command::Submit)));
        assert_eq!(Command::parse("exit"), Ok(Some(Command::Quit)));
        assert_eq!(Command::parse("?"), Ok(Some(Command::Help)));
        assert_eq!(
            Command::parse("zoom 3"),
            Err(CommandError::Unknown("zoom".to_string()))
        );
    }
}
