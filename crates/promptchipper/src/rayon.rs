//! # Rayon Batch Parallelism
//!
//! Requires the `rayon` feature.

use rayon::prelude::*;

use crate::errors::PCResult;
use crate::tokenizer::Tokenizer;
use crate::types::TokenType;

/// Batch-level parallel [`Tokenizer`] wrapper.
///
/// Single calls go straight to the inner engine; batch calls are spread
/// over the ``rayon`` thread pool.
#[derive(Clone, Debug)]
pub struct ParallelRayonTokenizer<D> {
    /// The wrapped engine.
    pub inner: D,
}

impl<D> ParallelRayonTokenizer<D> {
    /// Wrap an engine.
    pub fn new(inner: D) -> Self {
        Self { inner }
    }
}

impl<T, D> Tokenizer<T> for ParallelRayonTokenizer<D>
where
    T: TokenType,
    D: Tokenizer<T>,
{
    fn n_words(&self) -> usize {
        self.inner.n_words()
    }

    fn vocab(&self) -> Vec<String> {
        self.inner.vocab()
    }

    fn bos_id(&self) -> T {
        self.inner.bos_id()
    }

    fn eos_id(&self) -> T {
        self.inner.eos_id()
    }

    fn encode(
        &self,
        text: &str,
        add_bos: bool,
        add_eos: bool,
    ) -> PCResult<Vec<T>> {
        self.inner.encode(text, add_bos, add_eos)
    }

    fn decode(
        &self,
        tokens: &[T],
    ) -> PCResult<String> {
        self.inner.decode(tokens)
    }

    fn get_control_token(
        &self,
        literal: &str,
    ) -> PCResult<T> {
        self.inner.get_control_token(literal)
    }

    fn to_string(
        &self,
        tokens: &[T],
    ) -> PCResult<String> {
        self.inner.to_string(tokens)
    }

    fn encode_batch(
        &self,
        texts: &[&str],
        add_bos: bool,
        add_eos: bool,
    ) -> PCResult<Vec<Vec<T>>> {
        texts
            .par_iter()
            .map(|text| self.inner.encode(text, add_bos, add_eos))
            .collect()
    }

    fn decode_batch(
        &self,
        batch: &[&[T]],
    ) -> PCResult<Vec<String>> {
        batch
            .par_iter()
            .map(|tokens| self.inner.decode(tokens))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PCError;
    use crate::vocab::testing::build_test_tokenizer;

    fn check_batches<T: TokenType>() {
        let serial = build_test_tokenizer::<T>();
        let parallel = ParallelRayonTokenizer::new(serial.clone());

        assert_eq!(parallel.n_words(), serial.n_words());
        assert_eq!(parallel.bos_id(), serial.bos_id());
        assert_eq!(parallel.eos_id(), serial.eos_id());

        let owned: Vec<String> = (0..64)
            .map(|i| format!("Hello world {i}, the thing is abab{i} 東京"))
            .collect();
        let texts: Vec<&str> = owned.iter().map(String::as_str).collect();

        let expected = serial.encode_batch(&texts, true, false).unwrap();
        let actual = parallel.encode_batch(&texts, true, false).unwrap();
        assert_eq!(actual, expected);

        let refs: Vec<&[T]> = actual.iter().map(Vec::as_slice).collect();
        assert_eq!(parallel.decode_batch(&refs).unwrap(), owned);

        let bad = [T::max_value()];
        assert!(matches!(
            parallel.decode_batch(&[&refs[0][..], &bad[..]]),
            Err(PCError::InvalidTokenId { .. })
        ));
    }

    #[test]
    fn test_batches_u16() {
        check_batches::<u16>();
    }

    #[test]
    fn test_batches_u32() {
        check_batches::<u32>();
    }
}
