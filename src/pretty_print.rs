use crate::ParseError;
use ariadne::{Color, Label, Report, ReportKind, Source};

impl ParseError {
    fn label_message(&self) -> String {
        match self {
            ParseError::UnexpectedToken { expected, .. } => format!("Expected {expected} here"),
            ParseError::NoPrefixParseFn { .. } => "This token cannot start an expression".to_string(),
            ParseError::InvalidInteger { .. } => "This literal does not fit in a 64-bit integer".to_string(),
        }
    }

    /// Writes the error to stderr, with the offending token underlined in
    /// `input`. `source_name` is the file name shown in the report header.
    pub fn pretty_print(&self, source_name: &str, input: &str) -> std::io::Result<()> {
        let span = self.span().to_range();
        Report::build(ReportKind::Error, (source_name, span.clone()))
            .with_message(self.to_string())
            .with_label(
                Label::new((source_name, span))
                    .with_message(self.label_message())
                    .with_color(Color::Red),
            )
            .finish()
            .eprint((source_name, Source::from(input)))
    }
}

#[cfg(test)]
mod tests {
    use crate::parse;

    #[test]
    fn test_label_messages() {
        let (_, errors) = parse("let x 5; 99999999999999999999; )");
        let labels: Vec<String> = errors.iter().map(|e| e.label_message()).collect();
        assert_eq!(
            labels,
            vec![
                "Expected = here",
                "This literal does not fit in a 64-bit integer",
                "This token cannot start an expression",
            ]
        );
    }

    #[test]
    fn test_pretty_print_at_end_of_input() {
        let input = "let f = fn(x) { x";
        let (_, errors) = parse(input);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].pretty_print("test.monkey", input).is_ok());
    }
}
