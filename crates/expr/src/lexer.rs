//! Expression tokenizer.

use anyhow::{Result, bail};
use stagehand_engine::ExpressionParser;
use stagehand_types::{Token, TokenSequence};

/// The default parser capability: turns expression text into tokens.
#[derive(Debug, Default, Clone, Copy)]
pub struct Lexer;

impl ExpressionParser for Lexer {
    fn parse(&self, source: &str) -> Result<TokenSequence> {
        tokenize(source)
    }
}

/// Tokenizes expression source text.
///
/// Identifiers are `[A-Za-z_][A-Za-z0-9_]*`; `true`, `false`, and `null` are
/// recognized as literals. Strings accept single or double quotes with
/// backslash escapes. Numbers are unsigned decimal with an optional
/// fraction; a leading `-` lexes as [`Token::Minus`] and is folded by the
/// evaluator.
pub fn tokenize(source: &str) -> Result<TokenSequence> {
    let mut tokens = Vec::new();
    let mut chars = source.char_indices().peekable();

    while let Some((position, character)) = chars.next() {
        match character {
            c if c.is_whitespace() => {}

            '.' => tokens.push(Token::Dot),
            '[' => tokens.push(Token::LBracket),
            ']' => tokens.push(Token::RBracket),
            '(' => tokens.push(Token::LParen),
            ')' => tokens.push(Token::RParen),
            '+' => tokens.push(Token::Plus),
            '-' => tokens.push(Token::Minus),

            '=' => {
                if chars.next_if(|(_, next)| *next == '=').is_some() {
                    tokens.push(Token::Eq);
                } else {
                    tokens.push(Token::Assign);
                }
            }
            '!' => {
                if chars.next_if(|(_, next)| *next == '=').is_some() {
                    tokens.push(Token::Ne);
                } else {
                    tokens.push(Token::Not);
                }
            }
            '<' => {
                if chars.next_if(|(_, next)| *next == '=').is_some() {
                    tokens.push(Token::Le);
                } else {
                    tokens.push(Token::Lt);
                }
            }
            '>' => {
                if chars.next_if(|(_, next)| *next == '=').is_some() {
                    tokens.push(Token::Ge);
                } else {
                    tokens.push(Token::Gt);
                }
            }
            '&' => {
                if chars.next_if(|(_, next)| *next == '&').is_none() {
                    bail!("expected '&&' at byte {position}");
                }
                tokens.push(Token::And);
            }
            '|' => {
                if chars.next_if(|(_, next)| *next == '|').is_none() {
                    bail!("expected '||' at byte {position}");
                }
                tokens.push(Token::Or);
            }

            quote @ ('\'' | '"') => {
                let mut text = String::new();
                let mut closed = false;
                while let Some((_, next)) = chars.next() {
                    match next {
                        '\\' => match chars.next() {
                            Some((_, escaped)) => text.push(escaped),
                            None => break,
                        },
                        c if c == quote => {
                            closed = true;
                            break;
                        }
                        other => text.push(other),
                    }
                }
                if !closed {
                    bail!("unterminated string literal starting at byte {position}");
                }
                tokens.push(Token::Str(text));
            }

            digit if digit.is_ascii_digit() => {
                let mut literal = String::from(digit);
                let mut seen_dot = false;
                while let Some((_, next)) = chars.peek().copied() {
                    if next.is_ascii_digit() {
                        literal.push(next);
                        chars.next();
                    } else if next == '.' && !seen_dot {
                        // Only consume the dot when a digit follows; otherwise
                        // it is path navigation.
                        let mut lookahead = chars.clone();
                        lookahead.next();
                        if lookahead.peek().is_some_and(|(_, after)| after.is_ascii_digit()) {
                            seen_dot = true;
                            literal.push('.');
                            chars.next();
                        } else {
                            break;
                        }
                    } else {
                        break;
                    }
                }
                let number: f64 = literal.parse()?;
                tokens.push(Token::Number(number));
            }

            letter if letter.is_ascii_alphabetic() || letter == '_' => {
                let mut word = String::from(letter);
                while let Some((_, next)) = chars.peek().copied() {
                    if next.is_ascii_alphanumeric() || next == '_' {
                        word.push(next);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(match word.as_str() {
                    "true" => Token::Bool(true),
                    "false" => Token::Bool(false),
                    "null" => Token::Null,
                    _ => Token::Ident(word),
                });
            }

            other => bail!("unexpected character '{other}' at byte {position}"),
        }
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use stagehand_types::Token::*;

    #[test]
    fn tokenizes_comparison_expression() {
        let tokens = tokenize("count == 3").unwrap();
        assert_eq!(tokens, vec![Ident("count".into()), Eq, Number(3.0)]);
    }

    #[test]
    fn tokenizes_paths_and_indices() {
        let tokens = tokenize("items[0].name").unwrap();
        assert_eq!(
            tokens,
            vec![Ident("items".into()), LBracket, Number(0.0), RBracket, Dot, Ident("name".into())]
        );
    }

    #[test]
    fn distinguishes_assignment_from_equality() {
        assert_eq!(tokenize("x = 1").unwrap(), vec![Ident("x".into()), Assign, Number(1.0)]);
        assert_eq!(tokenize("x == 1").unwrap(), vec![Ident("x".into()), Eq, Number(1.0)]);
    }

    #[test]
    fn reads_quoted_strings_with_escapes() {
        assert_eq!(tokenize(r#""a b""#).unwrap(), vec![Str("a b".into())]);
        assert_eq!(tokenize(r"'it\'s'").unwrap(), vec![Str("it's".into())]);
    }

    #[test]
    fn reads_fractional_numbers_but_not_path_dots() {
        assert_eq!(tokenize("3.25").unwrap(), vec![Number(3.25)]);
        assert_eq!(tokenize("a.b").unwrap(), vec![Ident("a".into()), Dot, Ident("b".into())]);
    }

    #[test]
    fn keywords_become_literals() {
        assert_eq!(tokenize("true && !false || null").unwrap(), vec![Bool(true), And, Not, Bool(false), Or, Null]);
    }

    #[test]
    fn rejects_unterminated_strings() {
        assert!(tokenize("'open").unwrap_err().to_string().contains("unterminated"));
    }

    #[test]
    fn rejects_single_ampersand() {
        assert!(tokenize("a & b").unwrap_err().to_string().contains("&&"));
    }

    #[test]
    fn rejects_unknown_characters() {
        assert!(tokenize("a ~ b").unwrap_err().to_string().contains('~'));
    }

    #[test]
    fn empty_input_yields_no_tokens() {
        assert!(tokenize("   ").unwrap().is_empty());
    }
}
