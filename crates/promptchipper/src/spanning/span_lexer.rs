//! # Span Lexer Trait

/// Trait for finding the next occurrence of a span.
///
/// ## Implementation Notes
///
/// This trait is typically implemented on concrete types like [`RegexWrapper`](crate::regex::RegexWrapper).
///
/// Smart pointer types that implement `Deref<Target: SpanLexer>` (such as `Arc<T>` and `Box<T>`)
/// automatically implement `SpanLexer` through a blanket implementation.
pub trait SpanLexer: Send + Sync {
    /// Find the next non-empty occurrence of a span.
    ///
    /// ## Arguments
    /// * `text` - the text to scan over.
    /// * `offset` - the offset to start scanning from.
    ///
    /// ## Returns
    /// The span bounds, if found, relative to `text`.
    fn next_span(
        &self,
        text: &str,
        offset: usize,
    ) -> Option<(usize, usize)>;
}

// Blanket implementation for any type that derefs to a SpanLexer.
impl<D> SpanLexer for D
where
    D: core::ops::Deref + Send + Sync,
    D::Target: SpanLexer,
{
    fn next_span(
        &self,
        text: &str,
        offset: usize,
    ) -> Option<(usize, usize)> {
        self.deref().next_span(text, offset)
    }
}
