//! Title search grammar.
//!
//! Unquoted words match as prefixes (`gold` finds `GoldenEye`), `"quoted
//! words"` must appear consecutively, a leading `-` negates the next term,
//! and the word `or` joins its neighbours with OR. Everything else is
//! AND-ed, and AND binds tighter than OR. Matching is case-insensitive and
//! works on the alphanumeric words of a title.

/// A run of consecutive title words. When `prefix_last` is set the final
/// word only has to be a prefix of the title word it lines up with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    words: Vec<String>,
    prefix_last: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    term: Term,
    negated: bool,
}

/// Parsed query in disjunctive form: a title matches when every clause of
/// at least one group matches. No groups means "match everything".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    groups: Vec<Vec<Clause>>,
}

impl SearchQuery {
    pub fn parse(input: &str) -> Self {
        let mut parser = Parser::default();
        let chars: Vec<char> = input.chars().collect();
        let mut i = 0;

        while i < chars.len() {
            match chars[i] {
                '"' => {
                    i += 1;
                    // An unmatched quote is dropped and scanning resumes.
                    if let Some(len) = chars[i..].iter().position(|&c| c == '"') {
                        let quoted: String = chars[i..i + len].iter().collect();
                        i += len + 1;
                        parser.push(Term {
                            words: words_of(&quoted),
                            prefix_last: false,
                        });
                    }
                }
                ' ' => i += 1,
                '-' => {
                    i += 1;
                    parser.negate_next = true;
                }
                _ => {
                    let len = chars[i..]
                        .iter()
                        .position(|&c| c == ' ')
                        .unwrap_or(chars.len() - i);
                    let word: String = chars[i..i + len].iter().collect();
                    i += len;

                    if word.eq_ignore_ascii_case("or") {
                        parser.or_next = true;
                    } else {
                        parser.push(Term {
                            words: words_of(&word),
                            prefix_last: true,
                        });
                    }
                }
            }
        }

        Self {
            groups: parser.groups,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn matches(&self, title: &str) -> bool {
        if self.groups.is_empty() {
            return true;
        }
        let tokens = words_of(title);
        self.groups.iter().any(|group| {
            group
                .iter()
                .all(|clause| clause.term.matches(&tokens) != clause.negated)
        })
    }
}

#[derive(Default)]
struct Parser {
    groups: Vec<Vec<Clause>>,
    negate_next: bool,
    or_next: bool,
}

impl Parser {
    fn push(&mut self, term: Term) {
        let negated = std::mem::take(&mut self.negate_next);
        let or_join = std::mem::take(&mut self.or_next);
        // Terms made only of operator characters vanish, like their modifiers.
        if term.words.is_empty() {
            return;
        }
        let clause = Clause { term, negated };
        match self.groups.last_mut() {
            Some(group) if !or_join => group.push(clause),
            _ => self.groups.push(vec![clause]),
        }
    }
}

impl Term {
    fn matches(&self, tokens: &[String]) -> bool {
        let n = self.words.len();
        if n == 0 || tokens.len() < n {
            return false;
        }
        tokens.windows(n).any(|window| {
            window.iter().zip(&self.words).enumerate().all(|(j, (token, word))| {
                if self.prefix_last && j == n - 1 {
                    token.starts_with(word.as_str())
                } else {
                    token == word
                }
            })
        })
    }
}

/// Lowercased alphanumeric runs of `text`.
fn words_of(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}
