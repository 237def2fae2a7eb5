//! # Byte Vocabulary

use crate::types::TokenType;

/// The `u8 -> T` table used to seed span merges.
///
/// Every byte has a token; this is what makes any input encodable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ByteTokenTable<T: TokenType> {
    tokens: [T; 256],
}

impl<T: TokenType> ByteTokenTable<T> {
    /// Build a table from a lookup function.
    ///
    /// ## Returns
    /// The table; or the first byte for which `lookup` returned `None`.
    pub fn try_from_fn<F>(mut lookup: F) -> Result<Self, u8>
    where
        F: FnMut(u8) -> Option<T>,
    {
        let mut tokens = [T::zero(); 256];
        for (idx, slot) in tokens.iter_mut().enumerate() {
            let byte = idx as u8;
            *slot = lookup(byte).ok_or(byte)?;
        }
        Ok(Self { tokens })
    }

    /// The token for a byte.
    #[inline(always)]
    pub fn get(
        &self,
        byte: u8,
    ) -> T {
        self.tokens[byte as usize]
    }

    /// Append the byte tokens of `span` to `tokens`.
    #[inline(always)]
    pub fn append_tokens(
        &self,
        span: &[u8],
        tokens: &mut Vec<T>,
    ) {
        tokens.extend(span.iter().map(|&b| self.tokens[b as usize]));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_table() {
        let table = ByteTokenTable::<u16>::try_from_fn(|b| Some(b as u16 + 3)).unwrap();
        assert_eq!(table.get(0), 3);
        assert_eq!(table.get(255), 258);

        let mut tokens = vec![1u16];
        table.append_tokens(b"ab", &mut tokens);
        assert_eq!(tokens, vec![1, 97 + 3, 98 + 3]);
    }

    #[test]
    fn test_missing_byte() {
        let err = ByteTokenTable::<u32>::try_from_fn(|b| if b == 0x80 { None } else { Some(b as u32) })
            .unwrap_err();
        assert_eq!(err, 0x80);
    }
}
