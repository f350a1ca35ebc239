//! The command line format spoken over an established channel.
//!
//! A command is one secure message of UTF-8 text: a short verb optionally
//! followed by a filename argument.

/// Upload: `u <filename>`, followed by a bulk transfer from the client.
pub const CMD_UPLOAD: &str = "u";

/// Retrieve list: `rl`, answered by a bulk transfer of the listing text.
pub const CMD_LIST: &str = "rl";

/// Retrieve file: `rf <filename>`, answered by a bulk transfer.
pub const CMD_RETRIEVE: &str = "rf";

/// A parsed command.
#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    /// Client wants to upload the named file.
    Upload(String),
    /// Client wants the listing of stored files.
    List,
    /// Client wants the named stored file back.
    Retrieve(String),
}

impl Command {
    /// Parse a received command line.
    ///
    /// Returns `None` for unknown verbs, missing arguments, or trailing
    /// junk; the caller treats that as a protocol violation.
    pub fn parse(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace();
        let verb = parts.next()?;
        let arg = parts.next();
        if parts.next().is_some() {
            return None;
        }

        match (verb, arg) {
            (CMD_UPLOAD, Some(name)) => Some(Command::Upload(name.to_owned())),
            (CMD_LIST, None) => Some(Command::List),
            (CMD_RETRIEVE, Some(name)) => Some(Command::Retrieve(name.to_owned())),
            _ => None,
        }
    }

    /// The wire form of this command.
    pub fn to_line(&self) -> String {
        match self {
            Command::Upload(name) => format!("{CMD_UPLOAD} {name}"),
            Command::List => CMD_LIST.to_owned(),
            Command::Retrieve(name) => format!("{CMD_RETRIEVE} {name}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_verbs() {
        assert_eq!(
            Command::parse("u report.pdf"),
            Some(Command::Upload("report.pdf".into()))
        );
        assert_eq!(Command::parse("rl"), Some(Command::List));
        assert_eq!(
            Command::parse("rf report.pdf"),
            Some(Command::Retrieve("report.pdf".into()))
        );
    }

    #[test]
    fn rejects_malformed_lines() {
        assert_eq!(Command::parse(""), None);
        assert_eq!(Command::parse("u"), None);
        assert_eq!(Command::parse("rf"), None);
        assert_eq!(Command::parse("rl extra"), None);
        assert_eq!(Command::parse("u two names"), None);
        assert_eq!(Command::parse("delete everything"), None);
    }

    #[test]
    fn wire_form_round_trips() {
        for command in [
            Command::Upload("a.bin".into()),
            Command::List,
            Command::Retrieve("b.bin".into()),
        ] {
            assert_eq!(Command::parse(&command.to_line()).unwrap(), command);
        }
    }
}
