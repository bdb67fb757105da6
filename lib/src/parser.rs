/*!
Recursive-descent regular expression parser.

The grammar follows the naming used in the ECMAScript standard, although
the accepted syntax is not fully compatible:

```text
disjunction  := alternative ('|' disjunction)?
alternative  := term+
term         := assertion | atom quantifier?
atom         := '.' | '(' disjunction ')' | '\' escape | '[' class ']' | literal
quantifier   := '*' | '+' | '?' | '{' int? (',' int?)? '}'
```

Parsing is single-pass with no recovery: the first error aborts and is
reported with a marker at the offending offset.
*/

use crate::ast::{
    AstKind, AstNode, CharRange, Matcher, ParsedRegex, Quantifier,
};
use crate::errors::{ParseError, ParseErrorKind};
use crate::unicode::CharProperty;
use crate::utf8;

/// Characters that cannot appear as bare literals outside a class.
const SYNTAX_CHARS: &str = "^$.*+?()[]{}|";

/// An entry of the class-escape table: `\d`, `\D`, `\w`, `\W`, `\s`, `\S`.
struct ClassEscape {
    cp: char,
    property: CharProperty,
    additional_chars: &'static str,
    negated: bool,
}

const CLASS_ESCAPES: [ClassEscape; 6] = [
    ClassEscape {
        cp: 'd',
        property: CharProperty::Digit,
        additional_chars: "",
        negated: false,
    },
    ClassEscape {
        cp: 'D',
        property: CharProperty::Digit,
        additional_chars: "",
        negated: true,
    },
    ClassEscape {
        cp: 'w',
        property: CharProperty::Alnum,
        additional_chars: "_",
        negated: false,
    },
    ClassEscape {
        cp: 'W',
        property: CharProperty::Alnum,
        additional_chars: "_",
        negated: true,
    },
    ClassEscape {
        cp: 's',
        property: CharProperty::Space,
        additional_chars: "",
        negated: false,
    },
    ClassEscape {
        cp: 'S',
        property: CharProperty::Space,
        additional_chars: "",
        negated: true,
    },
];

const CONTROL_ESCAPES: [(char, char); 5] =
    [('f', '\x0c'), ('n', '\n'), ('r', '\r'), ('t', '\t'), ('v', '\x0b')];

/// Parses a pattern into a [`ParsedRegex`].
pub(crate) struct Parser<'a> {
    pattern: &'a [u8],
    /// The pattern decoded up front: (byte offset, codepoint) pairs.
    chars: Vec<(usize, char)>,
    pos: usize,
    capture_count: u32,
    matchers: Vec<Matcher>,
}

impl<'a> Parser<'a> {
    pub fn parse(pattern: &'a [u8]) -> Result<ParsedRegex, ParseError> {
        let mut chars = Vec::new();
        let mut offset = 0;
        while offset < pattern.len() {
            match utf8::decode(&pattern[offset..]) {
                Some((cp, width)) => {
                    chars.push((offset, cp));
                    offset += width;
                }
                None => {
                    return Err(ParseError::new(
                        ParseErrorKind::InvalidUtf8,
                        pattern,
                        offset,
                    ))
                }
            }
        }

        let mut parser = Parser {
            pattern,
            chars,
            pos: 0,
            // Group 0 is the whole pattern.
            capture_count: 1,
            matchers: Vec::new(),
        };

        let ast = parser.disjunction(Some(0))?;

        if !parser.at_end() {
            let kind = if parser.peek() == Some(')') {
                ParseErrorKind::UnmatchedParen
            } else {
                ParseErrorKind::TrailingCharacters
            };
            return Err(parser.error(kind));
        }

        Ok(ParsedRegex {
            ast,
            capture_count: parser.capture_count,
            matchers: parser.matchers,
        })
    }

    fn disjunction(
        &mut self,
        capture: Option<u32>,
    ) -> Result<AstNode, ParseError> {
        let mut node = self.alternative()?;
        if self.peek() != Some('|') {
            if let AstKind::Sequence { capture: c, .. } = &mut node.kind {
                *c = capture;
            }
            return Ok(node);
        }
        self.bump();
        // Longer alternations nest to the right; only the outermost node
        // carries the capture index.
        let rhs = self.disjunction(None)?;
        Ok(AstNode::new(AstKind::Alternation {
            capture,
            children: vec![node, rhs],
        }))
    }

    fn alternative(&mut self) -> Result<AstNode, ParseError> {
        let mut children = Vec::new();
        while let Some(node) = self.term()? {
            children.push(node);
        }
        if children.is_empty() {
            return Err(self.error(ParseErrorKind::EmptyAlternative));
        }
        Ok(AstNode::new(AstKind::Sequence { capture: None, children }))
    }

    fn term(&mut self) -> Result<Option<AstNode>, ParseError> {
        if let Some(node) = self.assertion() {
            return Ok(Some(node));
        }
        match self.atom()? {
            Some(mut node) => {
                node.quantifier = self.quantifier()?;
                Ok(Some(node))
            }
            None => Ok(None),
        }
    }

    fn assertion(&mut self) -> Option<AstNode> {
        let kind = match self.peek()? {
            '^' => AstKind::LineStart,
            '$' => AstKind::LineEnd,
            '\\' => {
                let kind = match self.peek_at(1)? {
                    'b' => AstKind::WordBoundary,
                    'B' => AstKind::NotWordBoundary,
                    '`' => AstKind::SubjectBegin,
                    '\'' => AstKind::SubjectEnd,
                    _ => return None,
                };
                self.bump();
                kind
            }
            _ => return None,
        };
        self.bump();
        Some(AstNode::new(kind))
    }

    fn atom(&mut self) -> Result<Option<AstNode>, ParseError> {
        let Some(cp) = self.peek() else { return Ok(None) };
        match cp {
            '.' => {
                self.bump();
                Ok(Some(AstNode::new(AstKind::AnyChar)))
            }
            '(' => {
                self.bump();
                let capture = self.capture_count;
                self.capture_count += 1;
                let node = self.disjunction(Some(capture))?;
                if self.peek() != Some(')') {
                    return Err(self.error(ParseErrorKind::UnclosedParen));
                }
                self.bump();
                Ok(Some(node))
            }
            '\\' => {
                self.bump();
                self.atom_escape().map(Some)
            }
            '[' => {
                self.bump();
                self.character_class().map(Some)
            }
            cp if SYNTAX_CHARS.contains(cp) => Ok(None),
            cp => {
                self.bump();
                Ok(Some(AstNode::new(AstKind::Literal(cp))))
            }
        }
    }

    fn atom_escape(&mut self) -> Result<AstNode, ParseError> {
        let Some(cp) = self.peek() else {
            return Err(self.error(ParseErrorKind::UnknownEscape));
        };
        self.bump();

        if let Some(escape) = CLASS_ESCAPES.iter().find(|e| e.cp == cp) {
            let ranges = escape
                .additional_chars
                .chars()
                .map(CharRange::single)
                .collect();
            let matcher_id = self.matchers.len();
            self.matchers.push(Matcher::new(
                ranges,
                vec![(escape.property, true)],
                escape.negated,
            ));
            return Ok(AstNode::new(AstKind::Matcher(matcher_id)));
        }

        if let Some((_, value)) =
            CONTROL_ESCAPES.iter().find(|(name, _)| *name == cp)
        {
            return Ok(AstNode::new(AstKind::Literal(*value)));
        }

        if cp == '\\' || SYNTAX_CHARS.contains(cp) {
            return Ok(AstNode::new(AstKind::Literal(cp)));
        }

        Err(self.error(ParseErrorKind::UnknownEscape))
    }

    fn character_class(&mut self) -> Result<AstNode, ParseError> {
        let negated = self.peek() == Some('^');
        if negated {
            self.bump();
        }

        let mut ranges = Vec::new();
        let mut properties = Vec::new();

        while let Some(cp) = self.peek() {
            if cp == ']' {
                break;
            }
            self.bump();

            // A '-' that does not form a range is the literal '-'.
            if cp == '-' {
                ranges.push(CharRange::single('-'));
                continue;
            }

            if self.at_end() {
                break;
            }

            if cp == '\\' {
                if let Some(escape) = self
                    .peek()
                    .and_then(|e| CLASS_ESCAPES.iter().find(|esc| esc.cp == e))
                {
                    properties.push((escape.property, !escape.negated));
                    ranges.extend(
                        escape.additional_chars.chars().map(CharRange::single),
                    );
                    self.bump();
                    continue;
                }
            }

            let mut range = CharRange::single(cp);
            if self.peek() == Some('-') {
                self.bump();
                let Some(max) = self.peek() else { break };
                self.bump();
                range.max = max;
                if range.min > range.max {
                    return Err(self.error(ParseErrorKind::InvalidRange));
                }
            }
            ranges.push(range);
        }

        if self.at_end() {
            return Err(self.error(ParseErrorKind::UnclosedClass));
        }
        self.bump(); // the closing ']'

        let matcher_id = self.matchers.len();
        self.matchers.push(Matcher::new(ranges, properties, negated));
        Ok(AstNode::new(AstKind::Matcher(matcher_id)))
    }

    fn quantifier(&mut self) -> Result<Quantifier, ParseError> {
        match self.peek() {
            Some('*') => {
                self.bump();
                Ok(Quantifier::ZeroOrMore)
            }
            Some('+') => {
                self.bump();
                Ok(Quantifier::OneOrMore)
            }
            Some('?') => {
                self.bump();
                Ok(Quantifier::Optional)
            }
            Some('{') => {
                self.bump();
                let min = self.read_int();
                let mut max = min;
                if self.peek() == Some(',') {
                    self.bump();
                    max = self.read_int();
                }
                if self.peek() != Some('}') {
                    return Err(
                        self.error(ParseErrorKind::MalformedQuantifier)
                    );
                }
                self.bump();
                Ok(Quantifier::Repeat { min, max })
            }
            _ => Ok(Quantifier::One),
        }
    }

    /// Reads a decimal integer, returning `None` if no digits are
    /// present.
    fn read_int(&mut self) -> Option<u32> {
        let mut value = None;
        while let Some(digit) = self.peek().and_then(|cp| cp.to_digit(10)) {
            self.bump();
            value = Some(
                value.unwrap_or(0_u32).saturating_mul(10).saturating_add(digit),
            );
        }
        value
    }

    fn peek(&self) -> Option<char> {
        self.peek_at(0)
    }

    fn peek_at(&self, n: usize) -> Option<char> {
        self.chars.get(self.pos + n).map(|(_, cp)| *cp)
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    fn at_end(&self) -> bool {
        self.pos == self.chars.len()
    }

    /// Byte offset of the current position within the pattern.
    fn offset(&self) -> usize {
        self.chars.get(self.pos).map_or(self.pattern.len(), |(off, _)| *off)
    }

    fn error(&self, kind: ParseErrorKind) -> ParseError {
        ParseError::new(kind, self.pattern, self.offset())
    }
}
