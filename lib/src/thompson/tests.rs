use pretty_assertions::assert_eq;

use crate::parser::Parser;
use crate::{validate, InvalidUtf8Policy, ParseErrorKind, Regex};

use super::CompiledRegex;

fn compile(pattern: &str) -> CompiledRegex {
    CompiledRegex::compile(Parser::parse(pattern.as_bytes()).unwrap())
}

macro_rules! assert_code {
    ($pattern:expr, $code:expr) => {{
        assert_eq!($code, compile($pattern).to_string());
    }};
}

#[test]
fn code_literals() {
    assert_code!(
        "ab",
        r#"
00000: SPLIT_B 0000b
00005: ANY_CHAR
00006: SPLIT_A 00005
0000b: SAVE 0
0000d: LIT 'a'
0000f: LIT 'b'
00011: SAVE 1
00013: MATCH
"#
    );
}

#[test]
fn code_star() {
    assert_code!(
        "a*b",
        r#"
00000: SPLIT_B 0000b
00005: ANY_CHAR
00006: SPLIT_A 00005
0000b: SAVE 0
0000d: SPLIT_A 00019
00012: LIT 'a'
00014: SPLIT_B 00012
00019: LIT 'b'
0001b: SAVE 1
0001d: MATCH
"#
    );
}

#[test]
fn code_alternation() {
    assert_code!(
        "a|b",
        r#"
00000: SPLIT_B 0000b
00005: ANY_CHAR
00006: SPLIT_A 00005
0000b: SAVE 0
0000d: SPLIT_A 00019
00012: LIT 'a'
00014: JUMP 0001b
00019: LIT 'b'
0001b: SAVE 1
0001d: MATCH
"#
    );
}

#[test]
fn code_group_and_matcher() {
    assert_code!(
        r"(a)\d",
        r#"
00000: SPLIT_B 0000b
00005: ANY_CHAR
00006: SPLIT_A 00005
0000b: SAVE 0
0000d: SAVE 2
0000f: LIT 'a'
00011: SAVE 3
00013: MATCHER 0
00015: SAVE 1
00017: MATCH
"#
    );
}

#[test]
fn code_bounded_repetition() {
    assert_code!(
        "a{2,3}",
        r#"
00000: SPLIT_B 0000b
00005: ANY_CHAR
00006: SPLIT_A 00005
0000b: SAVE 0
0000d: LIT 'a'
0000f: LIT 'a'
00011: SPLIT_A 00018
00016: LIT 'a'
00018: SAVE 1
0001a: MATCH
"#
    );
}

#[test]
fn simple_repetition() {
    let re = Regex::new("a*b").unwrap();
    assert!(re.is_match("b"));
    assert!(re.is_match("ab"));
    assert!(re.is_match("aaab"));
    assert!(!re.is_match("acb"));
    assert!(!re.is_match("abc"));
    assert!(!re.is_match(""));
}

#[test]
fn line_anchors() {
    let re = Regex::new("^a.*b$").unwrap();
    assert!(re.is_match("afoob"));
    assert!(re.is_match("ab"));
    assert!(!re.is_match("bab"));
    assert!(!re.is_match(""));
}

#[test]
fn group_repetition() {
    let re = Regex::new("^(foo|qux|baz)+(bar)?baz$").unwrap();
    let subject = "fooquxbarbaz";
    let caps = re.exec(subject, true, false).unwrap();
    assert_eq!(caps.group(1), Some(3..6));
    assert_eq!(&subject[caps.group(1).unwrap()], "qux");
    assert_eq!(&subject[caps.group(2).unwrap()], "bar");
    assert!(!re.is_match("fooquxbarbaze"));
    assert!(!re.is_match("quxbar"));
    assert!(!re.is_match("blahblah"));
    assert!(re.is_match("bazbaz"));
    assert!(re.is_match("quxbaz"));
}

#[test]
fn word_boundaries() {
    let re = Regex::new(r".*\b(foo|bar)\b.*").unwrap();
    let subject = "qux foo baz";
    let caps = re.exec(subject, true, false).unwrap();
    assert_eq!(&subject[caps.group(1).unwrap()], "foo");
    assert!(!re.is_match("quxfoobaz"));
    assert!(re.is_match("bar"));
    assert!(!re.is_match("foobar"));
}

#[test]
fn not_word_boundary() {
    assert!(Regex::new(r"foo\Bbar").unwrap().is_match("foobar"));
    assert!(!Regex::new(r"foo\B.bar").unwrap().is_match("foo bar"));
}

#[test]
fn plain_alternation() {
    let re = Regex::new("(foo|bar)").unwrap();
    assert!(re.is_match("foo"));
    assert!(re.is_match("bar"));
    assert!(!re.is_match("foobar"));
}

#[test]
fn bounded_repetition() {
    let re = Regex::new("a{3,5}b").unwrap();
    assert!(!re.is_match("aab"));
    assert!(re.is_match("aaab"));
    assert!(re.is_match("aaaaab"));
    assert!(!re.is_match("aaaaaab"));

    let re = Regex::new("a{3}b").unwrap();
    assert!(!re.is_match("aab"));
    assert!(re.is_match("aaab"));
    assert!(!re.is_match("aaaab"));

    let re = Regex::new("a{3,}b").unwrap();
    assert!(!re.is_match("aab"));
    assert!(re.is_match("aaab"));
    assert!(re.is_match("aaaaab"));

    let re = Regex::new("a{,3}b").unwrap();
    assert!(re.is_match("b"));
    assert!(re.is_match("ab"));
    assert!(re.is_match("aaab"));
    assert!(!re.is_match("aaaab"));
}

#[test]
fn zero_repetition_matches_empty() {
    let re = Regex::new("a{0}").unwrap();
    assert!(re.is_match(""));
}

#[test]
fn empty_subject() {
    assert!(Regex::new("a*").unwrap().is_match(""));
    assert!(!Regex::new("a+").unwrap().is_match(""));
    assert!(Regex::new("^$").unwrap().is_match(""));
    assert!(!Regex::new("^$").unwrap().is_match("a"));
}

#[test]
fn longest_match() {
    let re = Regex::new("f.*a(.*o)").unwrap();

    let subject = "blahfoobarfoobaz";
    let caps = re.exec(subject, false, true).unwrap();
    assert_eq!(&subject[caps.group(0).unwrap()], "foobarfoo");
    assert_eq!(&subject[caps.group(1).unwrap()], "rfoo");

    let subject = "mais que fais la police";
    let caps = re.exec(subject, false, true).unwrap();
    assert_eq!(&subject[caps.group(0).unwrap()], "fais la po");
    assert_eq!(&subject[caps.group(1).unwrap()], " po");
}

#[test]
fn longest_extends_greedy_repetition() {
    let re = Regex::new("a*").unwrap();
    let caps = re.exec("aaa", false, true).unwrap();
    assert_eq!(caps.group(0), Some(0..3));
}

#[test]
fn unicode_class_ranges() {
    let re = Regex::new("[àb-dX-Z]{3,5}").unwrap();
    assert!(re.is_match("càY"));
    assert!(!re.is_match("àeY"));
    assert!(re.is_match("dcbàX"));
    assert!(!re.is_match("efg"));
}

#[test]
fn unicode_range() {
    let re = Regex::new("[à-é]").unwrap();
    assert!(re.is_match("â"));
    assert!(!re.is_match("z"));
}

#[test]
fn digit_class() {
    let re = Regex::new(r"\d{3}").unwrap();
    assert!(re.is_match("123"));
    assert!(!re.is_match("1x3"));
}

#[test]
fn class_with_literal_dash() {
    let re = Regex::new(r"[-\d]+").unwrap();
    assert!(re.is_match("123-456"));
    assert!(!re.is_match("123_456"));
}

#[test]
fn class_escapes() {
    assert!(Regex::new(r"\w+").unwrap().is_match("héllo_1"));
    assert!(!Regex::new(r"\w").unwrap().is_match("!"));
    assert!(Regex::new(r"\W").unwrap().is_match("!"));
    assert!(!Regex::new(r"\W").unwrap().is_match("_"));
    assert!(Regex::new(r"\s").unwrap().is_match(" "));
    assert!(Regex::new(r"\S").unwrap().is_match("x"));
    assert!(!Regex::new(r"\S").unwrap().is_match(" "));
    assert!(Regex::new(r"\D").unwrap().is_match("x"));
    assert!(!Regex::new(r"\D").unwrap().is_match("7"));
}

#[test]
fn classes_with_escapes() {
    let re = Regex::new(r"[\s,;]+").unwrap();
    assert!(re.is_match(" ,\t;"));

    let re = Regex::new(r"[\S]+").unwrap();
    assert!(re.is_match("abc"));
    assert!(!re.is_match("a c"));

    let re = Regex::new("[^ab]").unwrap();
    assert!(re.is_match("c"));
    assert!(!re.is_match("a"));
}

#[test]
fn control_and_syntax_escapes() {
    assert!(Regex::new(r"a\tb").unwrap().is_match("a\tb"));
    assert!(Regex::new(r"\n").unwrap().is_match("\n"));
    assert!(Regex::new(r"\.\*\(\)").unwrap().is_match(".*()"));
}

#[test]
fn dot_matches_newline() {
    assert!(Regex::new("a.b").unwrap().is_match("a\nb"));
}

#[test]
fn line_vs_subject_anchors() {
    assert!(Regex::new("^b").unwrap().find("a\nb").is_some());
    assert!(Regex::new(r"\`b").unwrap().find("a\nb").is_none());
    assert!(Regex::new("a$").unwrap().find("a\nb").is_some());
    assert!(Regex::new(r"a\'").unwrap().find("a\nb").is_none());
    assert!(Regex::new(r"\`foo\'").unwrap().is_match("foo"));
}

#[test]
fn word_boundary_at_subject_start() {
    assert!(Regex::new(r"\bfoo").unwrap().is_match("foo"));
}

#[test]
fn find_reports_leftmost_match() {
    let re = Regex::new("foo").unwrap();
    let caps = re.find("xfoofoo").unwrap();
    assert_eq!(caps.group(0), Some(1..4));
}

#[test]
fn leftmost_first_alternation() {
    // The left alternative wins even though the right one would match a
    // longer string.
    let re = Regex::new("foo|foobar").unwrap();
    let caps = re.find("xxfoobar").unwrap();
    assert_eq!(caps.group(0), Some(2..5));
}

#[test]
fn anchored_ignores_partial_matches() {
    let re = Regex::new("a+").unwrap();
    let caps = re.exec("aaa", true, false).unwrap();
    assert_eq!(caps.group(0), Some(0..3));
}

#[test]
fn anchored_match_starts_at_zero() {
    let re = Regex::new("foo").unwrap();
    assert!(re.exec("xfoo", true, false).is_none());
    let caps = re.exec("foo", true, false).unwrap();
    assert_eq!(caps.group(0), Some(0..3));
}

#[test]
fn unused_group_is_none() {
    let re = Regex::new("(a)|(b)").unwrap();
    let caps = re.exec("b", true, false).unwrap();
    assert_eq!(caps.group(0), Some(0..1));
    assert_eq!(caps.group(1), None);
    assert_eq!(caps.group(2), Some(0..1));
    assert_eq!(caps.group_count(), 3);
}

#[test]
fn pathological_patterns_terminate() {
    // Nested repetition over an optional body; thread deduplication
    // keeps the state set bounded by the code size.
    let re = Regex::new("(a?)*b").unwrap();
    assert!(re.is_match("aaab"));
    assert!(!re.is_match("aaac"));

    // A zero-width loop body must not spin forever.
    let re = Regex::new(r"(\b)*a").unwrap();
    assert!(re.is_match("a"));

    let re = Regex::new("(a|a)*b").unwrap();
    let mut subject = "a".repeat(64);
    assert!(!re.is_match(&subject));
    subject.push('b');
    assert!(re.is_match(&subject));

    assert!(!Regex::new("(a*)*c").unwrap().is_match(&"a".repeat(64)));
}

#[test]
fn invalid_subject_policies() {
    let re = Regex::new("a.b").unwrap();
    // Replace: the invalid byte decodes as U+FFFD, which `.` consumes.
    assert!(re
        .exec_bytes(b"a\xffb", true, false, InvalidUtf8Policy::Replace)
        .is_some());
    // Truncate: the subject ends at the invalid byte.
    assert!(re
        .exec_bytes(b"a\xffb", true, false, InvalidUtf8Policy::Truncate)
        .is_none());
    // Under Truncate, end-of-subject assertions hold at the cut point.
    let re = Regex::new("a$").unwrap();
    assert!(re
        .exec_bytes(b"a\xffxyz", true, false, InvalidUtf8Policy::Truncate)
        .is_some());
}

#[test]
fn invalid_pattern_bytes() {
    let err = Regex::from_bytes(b"a\xff").unwrap_err();
    assert_eq!(err.kind(), ParseErrorKind::InvalidUtf8);
}

#[test]
fn capture_offsets_are_byte_offsets() {
    let re = Regex::new("(é)x").unwrap();
    let caps = re.exec("éx", true, false).unwrap();
    assert_eq!(caps.group(0), Some(0..3));
    assert_eq!(caps.group(1), Some(0..2));
}

#[test]
fn validate_does_not_panic() {
    validate("(a|b)+");
    validate("(unclosed");
    validate("[b-a]");
}
