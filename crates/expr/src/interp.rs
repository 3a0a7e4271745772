//! Token-sequence interpreter.
//!
//! Evaluates directly over the token stream with one level of lookahead.
//! Precedence, loosest first: assignment, `||`, `&&`, comparisons, `+`/`-`,
//! unary `!`/`-`, then literals, parenthesized groups, and variable paths.
//! Both operands of `&&`/`||` are evaluated; there is no short-circuiting.

use anyhow::{Result, bail};
use serde_json::{Number, Value};
use stagehand_engine::ExpressionEvaluator;
use stagehand_types::{ExecutionContext, Token, TokenSequence, display_value, is_truthy};

/// The default evaluator capability.
#[derive(Debug, Default, Clone, Copy)]
pub struct Interpreter;

impl ExpressionEvaluator for Interpreter {
    fn evaluate(&self, tokens: &TokenSequence, context: &mut ExecutionContext) -> Result<Value> {
        let mut cursor = Cursor { tokens, position: 0 };
        let value = cursor.expression(context)?;
        match cursor.peek() {
            None => Ok(value),
            Some(token) => bail!("unexpected trailing token '{token}'"),
        }
    }
}

struct Cursor<'t> {
    tokens: &'t [Token],
    position: usize,
}

impl<'t> Cursor<'t> {
    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.position)
    }

    fn peek_second(&self) -> Option<&'t Token> {
        self.tokens.get(self.position + 1)
    }

    fn advance(&mut self) -> Option<&'t Token> {
        let token = self.tokens.get(self.position);
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.position += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: &Token) -> Result<()> {
        match self.advance() {
            Some(token) if token == expected => Ok(()),
            Some(token) => bail!("expected '{expected}', found '{token}'"),
            None => bail!("expected '{expected}' at end of expression"),
        }
    }

    fn expression(&mut self, context: &mut ExecutionContext) -> Result<Value> {
        self.assignment(context)
    }

    /// `name = expr` writes into the context and yields the assigned value.
    fn assignment(&mut self, context: &mut ExecutionContext) -> Result<Value> {
        if let (Some(Token::Ident(name)), Some(Token::Assign)) = (self.peek(), self.peek_second()) {
            let name = name.clone();
            self.position += 2;
            let value = self.assignment(context)?;
            context.set(name, value.clone());
            return Ok(value);
        }
        self.or_expr(context)
    }

    fn or_expr(&mut self, context: &mut ExecutionContext) -> Result<Value> {
        let mut left = self.and_expr(context)?;
        while self.eat(&Token::Or) {
            let right = self.and_expr(context)?;
            left = Value::Bool(is_truthy(&left) || is_truthy(&right));
        }
        Ok(left)
    }

    fn and_expr(&mut self, context: &mut ExecutionContext) -> Result<Value> {
        let mut left = self.comparison(context)?;
        while self.eat(&Token::And) {
            let right = self.comparison(context)?;
            left = Value::Bool(is_truthy(&left) && is_truthy(&right));
        }
        Ok(left)
    }

    fn comparison(&mut self, context: &mut ExecutionContext) -> Result<Value> {
        let left = self.additive(context)?;
        let Some(operator) = self.peek().filter(|token| {
            matches!(token, Token::Eq | Token::Ne | Token::Lt | Token::Le | Token::Gt | Token::Ge)
        }) else {
            return Ok(left);
        };
        let operator = operator.clone();
        self.position += 1;
        let right = self.additive(context)?;

        let verdict = match operator {
            Token::Eq => values_equal(&left, &right),
            Token::Ne => !values_equal(&left, &right),
            ordering => {
                let relation = order_values(&left, &right)?;
                match ordering {
                    Token::Lt => relation.is_lt(),
                    Token::Le => relation.is_le(),
                    Token::Gt => relation.is_gt(),
                    Token::Ge => relation.is_ge(),
                    _ => unreachable!("filtered to comparison operators"),
                }
            }
        };
        Ok(Value::Bool(verdict))
    }

    fn additive(&mut self, context: &mut ExecutionContext) -> Result<Value> {
        let mut left = self.unary(context)?;
        loop {
            if self.eat(&Token::Plus) {
                let right = self.unary(context)?;
                left = add_values(&left, &right)?;
            } else if self.eat(&Token::Minus) {
                let right = self.unary(context)?;
                left = subtract_values(&left, &right)?;
            } else {
                return Ok(left);
            }
        }
    }

    fn unary(&mut self, context: &mut ExecutionContext) -> Result<Value> {
        if self.eat(&Token::Not) {
            let operand = self.unary(context)?;
            return Ok(Value::Bool(!is_truthy(&operand)));
        }
        if self.eat(&Token::Minus) {
            let operand = self.unary(context)?;
            let Some(number) = operand.as_f64() else {
                bail!("unary '-' requires a number, got {}", kind_of(&operand));
            };
            return Ok(number_value(-number)?);
        }
        self.primary(context)
    }

    fn primary(&mut self, context: &mut ExecutionContext) -> Result<Value> {
        match self.advance() {
            Some(Token::Number(number)) => number_value(*number),
            Some(Token::Str(text)) => Ok(Value::String(text.clone())),
            Some(Token::Bool(flag)) => Ok(Value::Bool(*flag)),
            Some(Token::Null) => Ok(Value::Null),
            Some(Token::LParen) => {
                let value = self.expression(context)?;
                self.expect(&Token::RParen)?;
                Ok(value)
            }
            Some(Token::Ident(name)) => {
                let name = name.clone();
                self.path(context, name)
            }
            Some(token) => bail!("expected a value, found '{token}'"),
            None => bail!("unexpected end of expression"),
        }
    }

    /// Resolves `root(.field | [index])*` against the context.
    ///
    /// Missing variables and missing path segments resolve to `Null` rather
    /// than failing, matching the engine's condition semantics.
    fn path(&mut self, context: &mut ExecutionContext, root: String) -> Result<Value> {
        let mut current = context.get(&root).cloned().unwrap_or(Value::Null);
        loop {
            if self.eat(&Token::Dot) {
                let Some(Token::Ident(field)) = self.advance() else {
                    bail!("expected a field name after '.'");
                };
                current = current.get(field).cloned().unwrap_or(Value::Null);
            } else if self.eat(&Token::LBracket) {
                let index = self.expression(context)?;
                self.expect(&Token::RBracket)?;
                current = index_value(&current, &index);
            } else {
                return Ok(current);
            }
        }
    }
}

fn index_value(target: &Value, index: &Value) -> Value {
    match (target, index) {
        (Value::Array(items), Value::Number(number)) => number
            .as_u64()
            .and_then(|position| items.get(position as usize))
            .cloned()
            .unwrap_or(Value::Null),
        (Value::Object(map), Value::String(key)) => map.get(key).cloned().unwrap_or(Value::Null),
        _ => Value::Null,
    }
}

/// JSON equality with numeric coercion, so `1 == 1.0` holds.
fn values_equal(left: &Value, right: &Value) -> bool {
    match (left.as_f64(), right.as_f64()) {
        (Some(a), Some(b)) => a == b,
        _ => left == right,
    }
}

fn order_values(left: &Value, right: &Value) -> Result<std::cmp::Ordering> {
    if let (Some(a), Some(b)) = (left.as_f64(), right.as_f64()) {
        return a
            .partial_cmp(&b)
            .ok_or_else(|| anyhow::anyhow!("cannot order {a} against {b}"));
    }
    if let (Value::String(a), Value::String(b)) = (left, right) {
        return Ok(a.cmp(b));
    }
    bail!("cannot order {} against {}", kind_of(left), kind_of(right));
}

/// `+` adds numbers; if either side is a string, both are rendered and
/// concatenated.
fn add_values(left: &Value, right: &Value) -> Result<Value> {
    if left.is_string() || right.is_string() {
        return Ok(Value::String(format!("{}{}", display_value(left), display_value(right))));
    }
    match (left.as_i64(), right.as_i64()) {
        (Some(a), Some(b)) => Ok(Value::Number(Number::from(a + b))),
        _ => {
            let (Some(a), Some(b)) = (left.as_f64(), right.as_f64()) else {
                bail!("'+' requires numbers or strings, got {} and {}", kind_of(left), kind_of(right));
            };
            number_value(a + b)
        }
    }
}

fn subtract_values(left: &Value, right: &Value) -> Result<Value> {
    match (left.as_i64(), right.as_i64()) {
        (Some(a), Some(b)) => Ok(Value::Number(Number::from(a - b))),
        _ => {
            let (Some(a), Some(b)) = (left.as_f64(), right.as_f64()) else {
                bail!("'-' requires numbers, got {} and {}", kind_of(left), kind_of(right));
            };
            number_value(a - b)
        }
    }
}

fn number_value(number: f64) -> Result<Value> {
    // Keep whole results as integers so counters stay integral.
    if number.fract() == 0.0 && number.abs() < i64::MAX as f64 {
        return Ok(Value::Number(Number::from(number as i64)));
    }
    Number::from_f64(number)
        .map(Value::Number)
        .ok_or_else(|| anyhow::anyhow!("expression produced a non-finite number"))
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use serde_json::json;

    fn eval(source: &str, context: &mut ExecutionContext) -> Result<Value> {
        Interpreter.evaluate(&tokenize(source)?, context)
    }

    fn eval_fresh(source: &str) -> Value {
        eval(source, &mut ExecutionContext::new()).expect("evaluates")
    }

    #[test]
    fn arithmetic_stays_integral() {
        assert_eq!(eval_fresh("1 + 2"), json!(3));
        assert_eq!(eval_fresh("10 - 4 - 3"), json!(3));
        assert_eq!(eval_fresh("1.5 + 1"), json!(2.5));
        assert_eq!(eval_fresh("-3 + 5"), json!(2));
    }

    #[test]
    fn string_concatenation() {
        let mut context = ExecutionContext::new();
        context.set("name", json!("world"));
        assert_eq!(eval("'hello ' + name", &mut context).unwrap(), json!("hello world"));
        assert_eq!(eval("'n=' + 3", &mut context).unwrap(), json!("n=3"));
    }

    #[test]
    fn equality_coerces_numbers() {
        assert_eq!(eval_fresh("1 == 1.0"), json!(true));
        assert_eq!(eval_fresh("'a' == 'a'"), json!(true));
        assert_eq!(eval_fresh("'a' != 'b'"), json!(true));
        assert_eq!(eval_fresh("null == null"), json!(true));
    }

    #[test]
    fn ordering_numbers_and_strings() {
        assert_eq!(eval_fresh("2 < 10"), json!(true));
        assert_eq!(eval_fresh("2 >= 2"), json!(true));
        assert_eq!(eval_fresh("'abc' < 'abd'"), json!(true));
        assert!(eval("true < 1", &mut ExecutionContext::new()).is_err());
    }

    #[test]
    fn boolean_connectives_and_negation() {
        assert_eq!(eval_fresh("true && false"), json!(false));
        assert_eq!(eval_fresh("true || false"), json!(true));
        assert_eq!(eval_fresh("!''"), json!(true));
        assert_eq!(eval_fresh("!!'x'"), json!(true));
        assert_eq!(eval_fresh("1 == 1 && 2 == 2"), json!(true));
    }

    #[test]
    fn paths_navigate_objects_and_arrays() {
        let mut context = ExecutionContext::new();
        context.set("app", json!({"name": "web", "dynos": [{"id": "d1"}, {"id": "d2"}]}));

        assert_eq!(eval("app.name", &mut context).unwrap(), json!("web"));
        assert_eq!(eval("app.dynos[1].id", &mut context).unwrap(), json!("d2"));
        assert_eq!(eval("app.dynos['oops']", &mut context).unwrap(), json!(null));
        assert_eq!(eval("app.missing.deeper", &mut context).unwrap(), json!(null));
        assert_eq!(eval("ghost", &mut context).unwrap(), json!(null));
    }

    #[test]
    fn assignment_writes_into_the_context() {
        let mut context = ExecutionContext::new();
        assert_eq!(eval("count = 2 + 3", &mut context).unwrap(), json!(5));
        assert_eq!(context.get("count"), Some(&json!(5)));

        // Chained assignment threads the same value through.
        eval("a = b = 7", &mut context).unwrap();
        assert_eq!(context.get("a"), Some(&json!(7)));
        assert_eq!(context.get("b"), Some(&json!(7)));
    }

    #[test]
    fn parentheses_group() {
        let mut context = ExecutionContext::new();
        context.set("i", json!(0));
        assert_eq!(eval("(i = i + 1) < 3", &mut context).unwrap(), json!(true));
        assert_eq!(context.get("i"), Some(&json!(1)));
    }

    #[test]
    fn trailing_tokens_are_rejected() {
        let error = eval("1 2", &mut ExecutionContext::new()).unwrap_err();
        assert!(error.to_string().contains("trailing"));
    }

    #[test]
    fn empty_expression_is_rejected() {
        let error = eval("", &mut ExecutionContext::new()).unwrap_err();
        assert!(error.to_string().contains("end of expression"));
    }
}
