//! `${{ … }}` template interpolation shared by the output and exec actions.

use stagehand_engine::{ExecutionError, Expression, ServiceContainer};
use stagehand_types::{ExecutionContext, display_value};

/// A text template split into literal runs and embedded expressions.
///
/// Expressions are lazy: nothing is parsed until the template is rendered.
#[derive(Debug, Clone, Default)]
pub(crate) struct Template {
    segments: Vec<Segment>,
}

#[derive(Debug, Clone)]
enum Segment {
    Literal(String),
    Embedded(Expression),
}

impl Template {
    /// Splits `raw` on `${{ … }}` markers.
    ///
    /// A marker without a closing `}}` is kept as literal text rather than
    /// reported, so malformed templates degrade visibly instead of failing
    /// at configure time.
    pub fn parse(raw: &str) -> Self {
        let mut segments = Vec::new();
        let mut remainder = raw;

        while let Some(start) = remainder.find("${{") {
            let (before, after_marker) = remainder.split_at(start);
            if !before.is_empty() {
                segments.push(Segment::Literal(before.to_string()));
            }
            let body = &after_marker[3..];
            let Some(end) = body.find("}}") else {
                segments.push(Segment::Literal(after_marker.to_string()));
                return Self { segments };
            };
            let expression = body[..end].trim();
            if !expression.is_empty() {
                segments.push(Segment::Embedded(Expression::text(expression)));
            }
            remainder = &body[end + 2..];
        }

        if !remainder.is_empty() {
            segments.push(Segment::Literal(remainder.to_string()));
        }
        Self { segments }
    }

    /// Renders the template, evaluating each embedded expression in order.
    pub fn render(
        &self,
        action: &str,
        services: &ServiceContainer,
        context: &mut ExecutionContext,
    ) -> Result<String, ExecutionError> {
        let mut output = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => output.push_str(text),
                Segment::Embedded(expression) => {
                    let value = expression.evaluate(action, services, context)?;
                    output.push_str(&display_value(&value));
                }
            }
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(raw: &str, context: &mut ExecutionContext) -> String {
        Template::parse(raw)
            .render("echo", &stagehand_expr::default_services(), context)
            .expect("renders")
    }

    #[test]
    fn interpolates_expressions_between_literals() {
        let mut context = ExecutionContext::new();
        context.set("app", json!("web"));
        context.set("region", json!("eu"));
        assert_eq!(
            render("deploy ${{ app }} to ${{ region }}!", &mut context),
            "deploy web to eu!"
        );
    }

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(render("no markers here", &mut ExecutionContext::new()), "no markers here");
    }

    #[test]
    fn unterminated_marker_stays_literal() {
        let mut context = ExecutionContext::new();
        context.set("app", json!("web"));
        assert_eq!(render("x ${{ app", &mut context), "x ${{ app");
    }

    #[test]
    fn null_renders_empty() {
        assert_eq!(render("[${{ missing }}]", &mut ExecutionContext::new()), "[]");
    }
}
