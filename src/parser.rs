use indexmap::IndexMap;
use tracing::debug;

use crate::ast::*;
use crate::chars::{is_attribute_name_char, is_identifier_char, is_tag_name_char};
use crate::error::{ParseError, ParseErrorKind};

type Result<T> = std::result::Result<T, ParseError>;

/// What a single step of body parsing produced.
enum Item {
    Node(AnnotatedExpression),
    /// A bare `{ end }`, carrying the range of the `end` identifier.
    End(Range),
}

impl Item {
    // Outside a loop body `end` is just another variable.
    fn into_node(self) -> AnnotatedExpression {
        match self {
            Item::Node(node) => node,
            Item::End(range) => AnnotatedExpression::new(
                Expression::Variable {
                    name: "end".to_string(),
                },
                range,
            ),
        }
    }
}

/// Recursive-descent parser over a borrowed template source.
///
/// Scanning and parsing are fused: the parser moves a single byte cursor
/// left to right and never backtracks.
pub struct Parser<'a> {
    input: &'a str,
    cursor: usize,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, cursor: 0 }
    }

    /// Parse one node spanning the whole input (surrounding whitespace allowed).
    pub fn parse(&mut self) -> Result<AnnotatedExpression> {
        self.skip_whitespace();
        let node = self.parse_item()?.into_node();
        self.skip_whitespace();
        if !self.remaining().is_empty() {
            return Err(self.error(ParseErrorKind::UnexpectedRemainder));
        }
        Ok(node)
    }

    fn remaining(&self) -> &'a str {
        &self.input[self.cursor..]
    }

    fn advance(&mut self, n: usize) {
        self.cursor += n;
    }

    fn error(&self, reason: ParseErrorKind) -> ParseError {
        ParseError::new(reason, self.cursor)
    }

    fn skip_whitespace(&mut self) {
        let rest = self.remaining();
        let trimmed = rest.trim_start();
        self.advance(rest.len() - trimmed.len());
    }

    fn expect(&mut self, literal: &'static str) -> Result<()> {
        if self.remaining().starts_with(literal) {
            self.advance(literal.len());
            Ok(())
        } else {
            Err(self.error(ParseErrorKind::Expected(literal)))
        }
    }

    /// Consume the longest run of characters matching `pred`.
    fn scan(&mut self, pred: fn(char) -> bool, empty: ParseErrorKind) -> Result<(String, Range)> {
        let rest = self.remaining();
        let len = rest.find(|c: char| !pred(c)).unwrap_or(rest.len());
        if len == 0 {
            return Err(self.error(empty));
        }
        let start = self.cursor;
        self.advance(len);
        Ok((rest[..len].to_string(), start..self.cursor))
    }

    fn identifier(&mut self) -> Result<(String, Range)> {
        self.scan(is_identifier_char, ParseErrorKind::ExpectedIdentifier)
    }

    fn tag_name(&mut self) -> Result<String> {
        self.scan(is_tag_name_char, ParseErrorKind::ExpectedTagName)
            .map(|(name, _)| name)
    }

    fn attribute_name(&mut self) -> Result<String> {
        self.scan(is_attribute_name_char, ParseErrorKind::ExpectedAttributeName)
            .map(|(name, _)| name)
    }

    /// An element or a braced statement/expression.
    fn parse_item(&mut self) -> Result<Item> {
        let rest = self.remaining();
        if rest.starts_with('<') {
            self.parse_element().map(Item::Node)
        } else if rest.starts_with('{') {
            self.parse_braced()
        } else {
            Err(self.error(ParseErrorKind::UnexpectedRemainder))
        }
    }

    fn parse_expression(&mut self) -> Result<AnnotatedExpression> {
        let (name, range) = self.identifier()?;
        Ok(AnnotatedExpression::new(Expression::Variable { name }, range))
    }

    fn parse_braced(&mut self) -> Result<Item> {
        self.expect("{")?;
        self.skip_whitespace();
        let expr = self.parse_expression()?;

        // `for` and `end` are ordinary identifiers, recognized by value here.
        let is_end = match &expr.expression {
            Expression::Variable { name } if name == "for" => {
                return self.parse_for(expr.range.start).map(Item::Node);
            }
            Expression::Variable { name } => name == "end",
            _ => false,
        };

        self.skip_whitespace();
        self.expect("}")?;
        if is_end {
            Ok(Item::End(expr.range))
        } else {
            Ok(Item::Node(expr))
        }
    }

    /// Rest of a loop, after the `for` keyword at `start`.
    fn parse_for(&mut self, start: usize) -> Result<AnnotatedExpression> {
        self.skip_whitespace();
        let (variable_name, _) = self.identifier()?;
        self.skip_whitespace();
        self.expect("in")?;
        self.skip_whitespace();
        let collection = self.parse_expression()?;
        self.skip_whitespace();
        self.expect("}")?;

        let mut body = Vec::new();
        let end = loop {
            self.skip_whitespace();
            if self.remaining().is_empty() {
                return Err(self.error(ParseErrorKind::Expected("end")));
            }
            match self.parse_item()? {
                Item::Node(node) => body.push(node),
                Item::End(range) => break range.end,
            }
        };

        Ok(AnnotatedExpression::new(
            Expression::For {
                variable_name,
                collection: Box::new(collection),
                body,
            },
            start..end,
        ))
    }

    fn parse_element(&mut self) -> Result<AnnotatedExpression> {
        let start = self.cursor;
        self.expect("<")?;
        let name = self.tag_name()?;

        let mut attributes = IndexMap::new();
        loop {
            self.skip_whitespace();
            if self.remaining().starts_with('>') {
                self.advance(1);
                break;
            }
            let attribute = self.attribute_name()?;
            self.skip_whitespace();
            self.expect("=")?;
            self.skip_whitespace();
            self.expect("{")?;
            self.skip_whitespace();
            let value = self.parse_expression()?;
            self.skip_whitespace();
            self.expect("}")?;
            attributes.insert(attribute, value);
        }

        let closing = format!("</{name}>");
        let mut body = Vec::new();
        loop {
            self.skip_whitespace();
            let rest = self.remaining();
            if rest.starts_with(&closing) {
                self.advance(closing.len());
                break;
            }
            if rest.is_empty() || rest.starts_with("</") {
                return Err(self.error(ParseErrorKind::ExpectedClosingTag(name)));
            }
            body.push(self.parse_item()?.into_node());
        }

        Ok(AnnotatedExpression::new(
            Expression::Tag {
                name,
                attributes,
                body,
            },
            start..self.cursor,
        ))
    }
}

/// Parse a template into a range-annotated tree.
pub fn parse(source: &str) -> Result<AnnotatedExpression> {
    let result = Parser::new(source).parse();
    match &result {
        Ok(tree) => debug!(len = source.len(), range = ?tree.range, "parsed template"),
        Err(err) => debug!(offset = err.offset, reason = %err.reason, "template parse failed"),
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_err(source: &str) -> (ParseErrorKind, usize) {
        let err = parse(source).unwrap_err();
        (err.reason, err.offset)
    }

    #[test]
    fn variable() {
        let tree = parse("{ title }").unwrap();
        assert_eq!(tree.simplify(), SimpleExpression::variable("title"));
        assert_eq!(tree.range, 2..7);
    }

    #[test]
    fn variable_without_spaces() {
        let tree = parse("{title}").unwrap();
        assert_eq!(tree.range, 1..6);
    }

    #[test]
    fn nested_tags() {
        let tree = parse("<p><span>{bar}</span>{ title }</p>").unwrap();
        let expected = SimpleExpression::tag(
            "p",
            Vec::<(String, SimpleExpression)>::new(),
            vec![
                SimpleExpression::tag(
                    "span",
                    Vec::<(String, SimpleExpression)>::new(),
                    vec![SimpleExpression::variable("bar")],
                ),
                SimpleExpression::variable("title"),
            ],
        );
        assert_eq!(tree.simplify(), expected);
        assert_eq!(tree.range, 0..34);
    }

    #[test]
    fn tag_ranges() {
        let tree = parse("<p>{ title }</p>").unwrap();
        assert_eq!(tree.range, 0..16);
        match &tree.expression {
            Expression::Tag { body, .. } => assert_eq!(body[0].range, 5..10),
            other => panic!("expected tag, got {other:?}"),
        }
    }

    #[test]
    fn attributes_keep_source_order() {
        let tree = parse("<a href={ url } title={t} alt = {x}></a>").unwrap();
        match &tree.expression {
            Expression::Tag { attributes, .. } => {
                let names: Vec<&str> = attributes.keys().map(String::as_str).collect();
                assert_eq!(names, ["href", "title", "alt"]);
                assert_eq!(attributes["href"].range, 10..13);
            }
            other => panic!("expected tag, got {other:?}"),
        }
    }

    #[test]
    fn for_loop() {
        let source = "{ for x in xs }<p>{ x }</p>{ end }";
        let tree = parse(source).unwrap();
        let expected = SimpleExpression::for_loop(
            "x",
            SimpleExpression::variable("xs"),
            vec![SimpleExpression::tag(
                "p",
                Vec::<(String, SimpleExpression)>::new(),
                vec![SimpleExpression::variable("x")],
            )],
        );
        assert_eq!(tree.simplify(), expected);
        assert_eq!(tree.range, 2..32);
        match &tree.expression {
            Expression::For {
                collection, body, ..
            } => {
                assert_eq!(collection.range, 11..13);
                assert_eq!(body[0].range, 15..27);
            }
            other => panic!("expected for, got {other:?}"),
        }
    }

    #[test]
    fn whitespace_between_nodes_is_skipped() {
        let tree = parse("\n<ul>\n  <li>{ x }</li>\n  <li>{ y }</li>\n</ul>\n").unwrap();
        match tree.expression {
            Expression::Tag { body, .. } => assert_eq!(body.len(), 2),
            other => panic!("expected tag, got {other:?}"),
        }
    }

    #[test]
    fn end_outside_loop_is_a_variable() {
        let tree = parse("<p>{ end }</p>").unwrap();
        let expected = SimpleExpression::tag(
            "p",
            Vec::<(String, SimpleExpression)>::new(),
            vec![SimpleExpression::variable("end")],
        );
        assert_eq!(tree.simplify(), expected);
    }

    #[test]
    fn nested_loops() {
        let tree = parse("{ for row in rows }{ for cell in row }{ cell }{ end }{ end }").unwrap();
        let expected = SimpleExpression::for_loop(
            "row",
            SimpleExpression::variable("rows"),
            vec![SimpleExpression::for_loop(
                "cell",
                SimpleExpression::variable("row"),
                vec![SimpleExpression::variable("cell")],
            )],
        );
        assert_eq!(tree.simplify(), expected);
    }

    #[test]
    fn missing_closing_tag() {
        assert_eq!(
            parse_err("<p>{ title }"),
            (ParseErrorKind::ExpectedClosingTag("p".into()), 12)
        );
    }

    #[test]
    fn mismatched_closing_tag() {
        assert_eq!(
            parse_err("<p>{ title }</q>"),
            (ParseErrorKind::ExpectedClosingTag("p".into()), 12)
        );
        // Closing literal is matched exactly.
        assert_eq!(
            parse_err("<p></P>"),
            (ParseErrorKind::ExpectedClosingTag("p".into()), 3)
        );
    }

    #[test]
    fn literal_attribute_value() {
        assert_eq!(
            parse_err("<div id=\"x\"></div>"),
            (ParseErrorKind::Expected("{"), 8)
        );
    }

    #[test]
    fn missing_equals() {
        assert_eq!(parse_err("<div id></div>"), (ParseErrorKind::Expected("="), 7));
    }

    #[test]
    fn character_class_errors() {
        assert_eq!(parse_err("{ 1 }"), (ParseErrorKind::ExpectedIdentifier, 2));
        assert_eq!(parse_err("<1>"), (ParseErrorKind::ExpectedTagName, 1));
        assert_eq!(parse_err("<p ={x}></p>"), (ParseErrorKind::ExpectedAttributeName, 3));
        assert_eq!(parse_err("<p id={}></p>"), (ParseErrorKind::ExpectedIdentifier, 7));
    }

    #[test]
    fn unexpected_remainder() {
        assert_eq!(parse_err(""), (ParseErrorKind::UnexpectedRemainder, 0));
        assert_eq!(parse_err("hello"), (ParseErrorKind::UnexpectedRemainder, 0));
        assert_eq!(parse_err("<p>hi</p>"), (ParseErrorKind::UnexpectedRemainder, 3));
        assert_eq!(parse_err("{ x }{ y }"), (ParseErrorKind::UnexpectedRemainder, 5));
    }

    #[test]
    fn unterminated_braces() {
        assert_eq!(parse_err("{ x"), (ParseErrorKind::Expected("}"), 3));
        assert_eq!(parse_err("<p>{ x </p>"), (ParseErrorKind::Expected("}"), 7));
    }

    #[test]
    fn loop_errors() {
        assert_eq!(parse_err("{ for x on xs }"), (ParseErrorKind::Expected("in"), 8));
        assert_eq!(parse_err("{ for }"), (ParseErrorKind::ExpectedIdentifier, 6));
        assert_eq!(
            parse_err("{ for x in xs }<p></p>"),
            (ParseErrorKind::Expected("end"), 22)
        );
        assert_eq!(parse_err("{ for x in xs <p></p>"), (ParseErrorKind::Expected("}"), 14));
    }

    #[test]
    fn reparse_printed_tree() {
        let sources = [
            "{ title }",
            "<p><span>{bar}</span>{ title }</p>",
            "<div id={name} class={ kind }>\n  { for x in xs }<li>{x}</li>{ end }\n</div>",
        ];
        for source in sources {
            let first = parse(source).unwrap().simplify();
            let second = parse(&first.to_string()).unwrap().simplify();
            assert_eq!(first, second, "{source}");
        }
    }
}
