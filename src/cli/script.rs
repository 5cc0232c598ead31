//! Line-oriented action scripts read during a session.
//!
//! ```text
//! click #save
//! type #search milk and eggs
//! commit #search
//! select #size large
//! focus #search
//! views
//! dump
//! quit
//! ```
//!
//! Blank lines and lines starting with `#` are skipped. Text after a
//! `type` target is taken verbatim, so it may contain spaces or be empty.

use std::str::FromStr;

use thiserror::Error;

use crate::dom::Document;
use crate::event::UserAction;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScriptError {
    #[error("unknown command `{0}`")]
    Unknown(String),

    #[error("`{0}` needs a target like `#id`")]
    MissingTarget(&'static str),

    #[error("`{0}` is not a target, expected `#id`")]
    BadTarget(String),

    #[error("`{0}` needs a value")]
    MissingValue(&'static str),

    #[error("no element with id `{0}`")]
    NotFound(String),
}

/// One script line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptCommand {
    Click(String),
    Type(String, String),
    Commit(String),
    Select(String, String),
    Focus(String),
    /// List bound views and their anchors
    Views,
    /// Print the whole document
    Dump,
    Quit,
}

impl ScriptCommand {
    /// Parse a line; `None` for blank lines and comments.
    pub fn parse_line(line: &str) -> Result<Option<Self>, ScriptError> {
        let line = line.trim_start();
        if line.trim().is_empty() || line.starts_with('#') {
            return Ok(None);
        }
        line.parse().map(Some)
    }

    /// Resolve the target id against `doc`. `None` for non-action commands.
    pub fn action(&self, doc: &Document) -> Result<Option<UserAction>, ScriptError> {
        let find = |id: &str| {
            doc.element_by_id(id)
                .ok_or_else(|| ScriptError::NotFound(id.to_string()))
        };
        let action = match self {
            Self::Click(id) => UserAction::Click(find(id)?),
            Self::Type(id, text) => UserAction::Type(find(id)?, text.clone()),
            Self::Commit(id) => UserAction::Commit(find(id)?),
            Self::Select(id, value) => UserAction::Select(find(id)?, value.clone()),
            Self::Focus(id) => UserAction::Focus(find(id)?),
            Self::Views | Self::Dump | Self::Quit => return Ok(None),
        };
        Ok(Some(action))
    }
}

impl FromStr for ScriptCommand {
    type Err = ScriptError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (verb, rest) = split_word(line);

        match verb.to_ascii_lowercase().as_str() {
            "click" => Ok(Self::Click(target("click", rest)?.0)),
            "commit" => Ok(Self::Commit(target("commit", rest)?.0)),
            "focus" => Ok(Self::Focus(target("focus", rest)?.0)),
            "type" => {
                let (id, text) = target("type", rest)?;
                Ok(Self::Type(id, text.to_string()))
            }
            "select" => {
                let (id, value) = target("select", rest)?;
                let value = value.trim();
                if value.is_empty() {
                    return Err(ScriptError::MissingValue("select"));
                }
                Ok(Self::Select(id, value.to_string()))
            }
            "views" => Ok(Self::Views),
            "dump" => Ok(Self::Dump),
            "quit" | "exit" => Ok(Self::Quit),
            _ => Err(ScriptError::Unknown(verb.to_string())),
        }
    }
}

/// First whitespace-delimited word and the remainder after one separator.
fn split_word(s: &str) -> (&str, &str) {
    match s.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest),
        None => (s, ""),
    }
}

fn target<'a>(verb: &'static str, rest: &'a str) -> Result<(String, &'a str), ScriptError> {
    let (word, rest) = split_word(rest.trim_start());
    if word.is_empty() {
        return Err(ScriptError::MissingTarget(verb));
    }
    match word.strip_prefix('#') {
        Some(id) if !id.is_empty() => Ok((id.to_string(), rest)),
        _ => Err(ScriptError::BadTarget(word.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::TlParser;

    fn parse(line: &str) -> Result<Option<ScriptCommand>, ScriptError> {
        ScriptCommand::parse_line(line)
    }

    #[test]
    fn test_skips_blank_and_comments() {
        assert_eq!(parse(""), Ok(None));
        assert_eq!(parse("   "), Ok(None));
        assert_eq!(parse("# open the menu"), Ok(None));
    }

    #[test]
    fn test_simple_commands() {
        assert_eq!(parse("click #save"), Ok(Some(ScriptCommand::Click("save".into()))));
        assert_eq!(parse("  Commit #q  "), Ok(Some(ScriptCommand::Commit("q".into()))));
        assert_eq!(parse("focus #q"), Ok(Some(ScriptCommand::Focus("q".into()))));
        assert_eq!(parse("views"), Ok(Some(ScriptCommand::Views)));
        assert_eq!(parse("dump"), Ok(Some(ScriptCommand::Dump)));
        assert_eq!(parse("exit"), Ok(Some(ScriptCommand::Quit)));
    }

    #[test]
    fn test_type_keeps_text_verbatim() {
        assert_eq!(
            parse("type #search milk and  eggs"),
            Ok(Some(ScriptCommand::Type("search".into(), "milk and  eggs".into())))
        );
        assert_eq!(
            parse("type #search"),
            Ok(Some(ScriptCommand::Type("search".into(), String::new())))
        );
    }

    #[test]
    fn test_select_needs_value() {
        assert_eq!(
            parse("select #size large"),
            Ok(Some(ScriptCommand::Select("size".into(), "large".into())))
        );
        assert_eq!(parse("select #size"), Err(ScriptError::MissingValue("select")));
    }

    #[test]
    fn test_errors() {
        assert_eq!(parse("hover #x"), Err(ScriptError::Unknown("hover".into())));
        assert_eq!(parse("click"), Err(ScriptError::MissingTarget("click")));
        assert_eq!(parse("click save"), Err(ScriptError::BadTarget("save".into())));
        assert_eq!(parse("click #"), Err(ScriptError::BadTarget("#".into())));
    }

    #[test]
    fn test_action_resolves_ids() {
        let doc = Document::parse(r#"<input id="q"><button id="go">Go</button>"#, &TlParser).unwrap();
        let go = doc.element_by_id("go").unwrap();
        let q = doc.element_by_id("q").unwrap();

        assert_eq!(
            ScriptCommand::Click("go".into()).action(&doc),
            Ok(Some(UserAction::Click(go)))
        );
        assert_eq!(
            ScriptCommand::Type("q".into(), "hi".into()).action(&doc),
            Ok(Some(UserAction::Type(q, "hi".into())))
        );
        assert_eq!(ScriptCommand::Dump.action(&doc), Ok(None));
        assert_eq!(
            ScriptCommand::Click("missing".into()).action(&doc),
            Err(ScriptError::NotFound("missing".into()))
        );
    }
}
