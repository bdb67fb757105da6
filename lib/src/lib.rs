/*!
A Unicode-aware regular expression engine built on a threaded bytecode
VM.

A pattern is parsed into an AST, lowered to a linear instruction
sequence, and executed by simulating a set of prioritized threads over
the subject — the classic Thompson/Pike NFA technique, which keeps
matching time linear in the subject length while still supporting
submatch capture.

```
use regex_vm::Regex;

let re = Regex::new("(foo|bar)baz").unwrap();
assert!(re.is_match("foobaz"));

let caps = re.find("xx barbaz yy").unwrap();
assert_eq!(caps.group(1), Some(3..6));
```

The supported syntax covers literals, `.`, alternation, capture groups,
character classes, the `\d`, `\w`, `\s` escapes and their negations,
the assertions `^`, `$`, `\b`, `\B` and the subject-begin/-end escapes,
and the quantifiers `*`, `+`, `?`, `{n}`, `{n,}`, `{,m}`, `{n,m}`. All
quantifiers are greedy.
*/

mod ast;
mod errors;
mod parser;
mod thompson;
mod unicode;
mod utf8;

use std::ops::Range;

use log::{error, trace};

use crate::parser::Parser;
use crate::thompson::{CompiledRegex, PikeVm};

pub use crate::errors::{ParseError, ParseErrorKind};
pub use crate::utf8::InvalidUtf8Policy;

/// A compiled regular expression.
///
/// Compilation is the expensive step; the resulting `Regex` is immutable
/// and can be executed any number of times, concurrently if needed.
#[derive(Debug)]
pub struct Regex {
    program: CompiledRegex,
}

impl Regex {
    /// Compiles a pattern.
    pub fn new(pattern: &str) -> Result<Regex, ParseError> {
        Regex::from_bytes(pattern.as_bytes())
    }

    /// Compiles a pattern given as raw bytes. Fails with
    /// [`ParseErrorKind::InvalidUtf8`] if the bytes are not valid UTF-8.
    pub fn from_bytes(pattern: &[u8]) -> Result<Regex, ParseError> {
        let parsed = Parser::parse(pattern)?;
        let program = CompiledRegex::compile(parsed);
        trace!("compiled regex: {}", program);
        Ok(Regex { program })
    }

    /// Returns true if the pattern matches the whole subject.
    pub fn is_match(&self, subject: &str) -> bool {
        self.exec(subject, true, false).is_some()
    }

    /// Finds the first match anywhere in the subject.
    pub fn find(&self, subject: &str) -> Option<Captures> {
        self.exec(subject, false, false)
    }

    /// Runs the pattern over `subject`.
    ///
    /// With `anchored`, the match must cover the subject from its first
    /// byte to its last. With `longest`, the engine keeps simulating
    /// after a match is found, as long as threads of higher priority
    /// remain, and reports the furthest-reaching match.
    pub fn exec(
        &self,
        subject: &str,
        anchored: bool,
        longest: bool,
    ) -> Option<Captures> {
        self.exec_bytes(
            subject.as_bytes(),
            anchored,
            longest,
            InvalidUtf8Policy::Replace,
        )
    }

    /// Like [`Regex::exec`], for subjects that are raw bytes. `policy`
    /// decides how invalid UTF-8 sequences in the subject are decoded.
    pub fn exec_bytes(
        &self,
        subject: &[u8],
        anchored: bool,
        longest: bool,
        policy: InvalidUtf8Policy,
    ) -> Option<Captures> {
        let mut vm = PikeVm::new(&self.program);
        vm.exec(subject, anchored, longest, policy)
            .map(|saves| Captures { saves })
    }
}

/// Capture positions recorded by a successful execution.
///
/// Positions are byte offsets into the subject the pattern was executed
/// against, and are only meaningful for that subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Captures {
    saves: Vec<Option<usize>>,
}

impl Captures {
    /// The range matched by a capture group. Group 0 is the whole match;
    /// explicit groups are numbered from 1 in the order of their opening
    /// parenthesis. Returns `None` for groups that did not participate
    /// in the match.
    pub fn group(&self, index: usize) -> Option<Range<usize>> {
        let start = *self.saves.get(2 * index)?;
        let end = *self.saves.get(2 * index + 1)?;
        Some(start?..end?)
    }

    /// Number of capture groups, the whole-match group 0 included.
    pub fn group_count(&self) -> usize {
        self.saves.len() / 2
    }
}

/// Parses a pattern and logs any parse failure. Produces no program;
/// useful for checking patterns ahead of time.
pub fn validate(pattern: &str) {
    if let Err(err) = Parser::parse(pattern.as_bytes()) {
        error!("{}", err);
    }
}
