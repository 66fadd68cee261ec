//! Inline control-tag lexer.
//!
//! Every transcript or memory line is split into a token stream of plain
//! text and control tags before any segmentation happens:
//!
//! ```text
//! <IgnoreFollowing>            everything after this is a hint, not transcript
//! <ContinueSection>            this line does not open a new owner
//! <Comment> ... </Comment>     author comment, may span lines
//! <StoryMode>                  memory switch for narrative continuation
//! <Alias:Bob-user>             Bob speaks as the user role
//! <Pseudo:Bob,Eve-model>       Bob and Eve are wrapped as model, name kept inline
//! ```
//!
//! Marker spellings come from [`MarkerConfig`]; all of them are matched by a
//! single alternation so a line is scanned once.

use promptweave_config::MarkerConfig;
use promptweave_core::{FormatError, Role};
use regex_lite::{Regex, escape};
use tracing::warn;

/// A lexical unit of one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    Text(&'a str),
    IgnoreFollowing,
    ContinueSection,
    CommentOpen,
    CommentClose,
    StoryMode,
    Alias { owner: &'a str, role: Role },
    Pseudonym { owners: Vec<&'a str>, role: &'a str },
}

impl Token<'_> {
    fn is_control(&self) -> bool {
        !matches!(self, Token::Text(_))
    }
}

/// One line after comment stripping and control-tag extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LexedLine {
    /// Visible text with every control tag and comment removed.
    pub text: String,
    pub aliases: Vec<(String, Role)>,
    pub pseudonyms: Vec<(String, String)>,
    pub ignore_following: bool,
    pub continue_section: bool,
    pub story_mode: bool,
    /// The line carried only comments or control tags and contributes no text.
    pub discarded: bool,
}

pub struct Lexer {
    pattern: Regex,
}

impl Lexer {
    pub fn new(markers: &MarkerConfig) -> Result<Self, FormatError> {
        let pattern = format!(
            r"(?P<ignore>{})|(?P<cont>{})|(?P<open>{})|(?P<close>{})|(?P<story>{})|<{}:(?P<alias_owner>[^<>]+?)-(?P<alias_role>(?i:user|sys|system|model))>|<{}:(?P<pseudo_owners>[^<>]+?)-(?P<pseudo_role>[^<>\-]+)>",
            escape(&markers.ignore_following),
            escape(&markers.continue_section),
            escape(&markers.comment_open),
            escape(&markers.comment_close),
            escape(&markers.story_mode),
            escape(&markers.alias_tag),
            escape(&markers.pseudonym_tag),
        );
        let pattern = Regex::new(&pattern).map_err(|e| FormatError::InvalidMarkers(e.to_string()))?;
        Ok(Self { pattern })
    }

    /// Split a single line into text and control tokens.
    pub fn tokenize<'a>(&self, line: &'a str) -> Vec<Token<'a>> {
        let mut tokens = Vec::new();
        let mut last = 0;

        for caps in self.pattern.captures_iter(line) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            if whole.start() > last {
                tokens.push(Token::Text(&line[last..whole.start()]));
            }
            last = whole.end();

            let token = if caps.name("ignore").is_some() {
                Token::IgnoreFollowing
            } else if caps.name("cont").is_some() {
                Token::ContinueSection
            } else if caps.name("open").is_some() {
                Token::CommentOpen
            } else if caps.name("close").is_some() {
                Token::CommentClose
            } else if caps.name("story").is_some() {
                Token::StoryMode
            } else if let (Some(owner), Some(role)) = (caps.name("alias_owner"), caps.name("alias_role")) {
                match Role::from_reserved(role.as_str()) {
                    Some(role) => Token::Alias {
                        owner: owner.as_str().trim(),
                        role,
                    },
                    None => Token::Text(whole.as_str()),
                }
            } else if let (Some(owners), Some(role)) =
                (caps.name("pseudo_owners"), caps.name("pseudo_role"))
            {
                Token::Pseudonym {
                    owners: owners
                        .as_str()
                        .split(',')
                        .map(str::trim)
                        .filter(|o| !o.is_empty())
                        .collect(),
                    role: role.as_str().trim(),
                }
            } else {
                Token::Text(whole.as_str())
            };
            tokens.push(token);
        }

        if last < line.len() {
            tokens.push(Token::Text(&line[last..]));
        }
        tokens
    }

    /// Lex a line, applying and updating the multi-line comment state.
    ///
    /// Inside a comment everything up to the next close marker is dropped,
    /// including control tags. An open marker inside a comment has no effect.
    /// The scan stops at an ignore-following marker.
    pub fn lex_line(&self, line: &str, comment_active: &mut bool) -> LexedLine {
        let started_in_comment = *comment_active;
        let tokens = self.tokenize(line);
        let had_controls = tokens.iter().any(Token::is_control);
        let mut lexed = LexedLine::default();

        for token in tokens {
            if *comment_active {
                if token == Token::CommentClose {
                    *comment_active = false;
                }
                continue;
            }
            match token {
                Token::Text(text) => lexed.text.push_str(text),
                Token::CommentOpen => *comment_active = true,
                Token::CommentClose => {}
                Token::IgnoreFollowing => {
                    lexed.ignore_following = true;
                    break;
                }
                Token::ContinueSection => lexed.continue_section = true,
                Token::StoryMode => lexed.story_mode = true,
                Token::Alias { owner, role } => lexed.aliases.push((owner.to_string(), role)),
                Token::Pseudonym { owners, role } => {
                    if owners.is_empty() || role.is_empty() {
                        warn!(line, "Pseudonym declaration without owners or role dropped");
                        continue;
                    }
                    lexed
                        .pseudonyms
                        .extend(owners.into_iter().map(|o| (o.to_string(), role.to_string())));
                }
            }
        }

        lexed.discarded =
            lexed.text.trim().is_empty() && (had_controls || started_in_comment);
        lexed
    }
}
