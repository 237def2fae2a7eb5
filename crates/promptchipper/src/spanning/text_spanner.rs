//! # Text Spanner

use core::ops::Range;
use std::sync::Arc;

use crate::errors::PCResult;
use crate::regex::RegexWrapperPattern;
use crate::spanning::SpanLexer;

/// Span Reference for [`TextSpanner`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SpanRef {
    /// A span matched by the lexer.
    Word(Range<usize>),

    /// A span between lexer matches.
    Gap(Range<usize>),
}

impl SpanRef {
    /// The byte range of this span.
    pub fn range(&self) -> Range<usize> {
        match self {
            SpanRef::Word(range) | SpanRef::Gap(range) => range.clone(),
        }
    }
}

impl From<SpanRef> for Range<usize> {
    fn from(span: SpanRef) -> Self {
        match span {
            SpanRef::Word(range) => range,
            SpanRef::Gap(range) => range,
        }
    }
}

/// Splits text into [`SpanRef`]s with a [`SpanLexer`].
///
/// Every byte of the text is covered by exactly one span, in order.
#[derive(Clone)]
pub struct TextSpanner {
    word_lexer: Arc<dyn SpanLexer>,
}

impl TextSpanner {
    /// Build a new [`TextSpanner`] over a lexer.
    pub fn new(word_lexer: Arc<dyn SpanLexer>) -> Self {
        Self { word_lexer }
    }

    /// Build a new [`TextSpanner`] from a regex pattern.
    ///
    /// ## Returns
    /// The spanner; or [`crate::PCError::ModelLoad`] if the pattern does not compile.
    pub fn from_pattern<P: Into<RegexWrapperPattern>>(pattern: P) -> PCResult<Self> {
        let regex = pattern.into().compile()?;
        Ok(Self::new(Arc::new(regex)))
    }

    /// Visit each span of `text`, in order.
    ///
    /// Words are the lexer matches; gaps are the text between them, including
    /// any leading and trailing text.
    pub fn for_each_split_span(
        &self,
        text: &str,
        f: &mut dyn FnMut(SpanRef),
    ) {
        let mut last = 0;
        while let Some((start, end)) = self.word_lexer.next_span(text, last) {
            if last < start {
                f(SpanRef::Gap(last..start));
            }
            f(SpanRef::Word(start..end));
            last = end;
        }

        if last < text.len() {
            f(SpanRef::Gap(last..text.len()));
        }
    }

    /// Split text into spans.
    pub fn split_spans(
        &self,
        text: &str,
    ) -> Vec<SpanRef> {
        let mut spans = Vec::new();
        self.for_each_split_span(text, &mut |span_ref| spans.push(span_ref));
        spans
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::DEFAULT_PATTERN;

    #[test]
    fn test_for_each_split_span() {
        use SpanRef::*;

        let spanner = TextSpanner::from_pattern(r"\w+").unwrap();

        let source = "abc 1 def  ghi   ";
        assert_eq!(
            spanner.split_spans(source),
            vec![
                Word(0..3),
                Gap(3..4),
                Word(4..5),
                Gap(5..6),
                Word(6..9),
                Gap(9..11),
                Word(11..14),
                Gap(14..17),
            ]
        );

        assert_eq!(
            spanner.split_spans("  abc"),
            vec![Gap(0..2), Word(2..5)]
        );
        assert_eq!(spanner.split_spans("   "), vec![Gap(0..3)]);
    }

    #[test]
    fn test_spans_cover_text() {
        let spanner = TextSpanner::from_pattern(DEFAULT_PATTERN).unwrap();

        let source = "Hello, world!  It's 2024\r\n\tnaïve café 東京 🦀🦀";
        let spans = spanner.split_spans(source);

        let mut last = 0;
        for span in &spans {
            let range = span.range();
            assert_eq!(range.start, last);
            assert!(range.start < range.end);
            last = range.end;
        }
        assert_eq!(last, source.len());

        let rebuilt: String = spans
            .into_iter()
            .map(|s| &source[Range::<usize>::from(s)])
            .collect();
        assert_eq!(rebuilt, source);
    }

    #[test]
    fn test_empty_text() {
        let spanner = TextSpanner::from_pattern(r"\w+").unwrap();
        assert_eq!(spanner.split_spans(""), Vec::<SpanRef>::new());

        let mut visits = 0;
        spanner.for_each_split_span("", &mut |_| visits += 1);
        assert_eq!(visits, 0);
    }
}
