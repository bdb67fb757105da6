/*!
Character-property oracle consulted by matcher predicates and by the
word-boundary assertions.
*/

/// A Unicode character property, named after the `wctype` family the
/// class escapes are defined in terms of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CharProperty {
    Alnum,
    Digit,
    Space,
}

impl CharProperty {
    pub fn contains(self, cp: char) -> bool {
        match self {
            CharProperty::Alnum => cp.is_alphanumeric(),
            CharProperty::Digit => cp.is_numeric(),
            CharProperty::Space => cp.is_whitespace(),
        }
    }
}

/// Returns true if `cp` is a word character. This is the single predicate
/// behind `\w`, `\W` and the word-boundary assertions; they must agree.
pub(crate) fn is_word_char(cp: char) -> bool {
    cp == '_' || cp.is_alphanumeric()
}
