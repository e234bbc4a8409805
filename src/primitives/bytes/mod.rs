#![forbid(unsafe_code)]
//! Fixed-width and length-prefixed encoders shared by the key and value codecs.

pub mod ord {
    //! Big-endian encoders for fixed-width integers and short strings.

    use crate::types::{GraphError, Result};

    /// Appends `v` in big-endian byte order.
    pub fn put_u16_be(dst: &mut Vec<u8>, v: u16) {
        dst.extend_from_slice(&v.to_be_bytes());
    }

    /// Appends a `u16` length prefix followed by `bytes`.
    ///
    /// Fails with `InvalidArgument` when `bytes` does not fit the prefix.
    pub fn put_bytes_u16(dst: &mut Vec<u8>, bytes: &[u8], what: &str) -> Result<()> {
        let len = u16::try_from(bytes.len()).map_err(|_| {
            GraphError::invalid(format!(
                "{what} too long ({} bytes, max {})",
                bytes.len(),
                u16::MAX
            ))
        })?;
        put_u16_be(dst, len);
        dst.extend_from_slice(bytes);
        Ok(())
    }

    /// Appends a `u16` length-prefixed UTF-8 string.
    pub fn put_str_u16(dst: &mut Vec<u8>, s: &str, what: &str) -> Result<()> {
        put_bytes_u16(dst, s.as_bytes(), what)
    }

    /// Encodes a counter value the way the key-value store's atomic increment stores it.
    pub fn i64_le(v: i64) -> [u8; 8] {
        v.to_le_bytes()
    }

    /// Decodes a counter value written by the key-value store's atomic increment.
    pub fn get_i64_le(src: &[u8]) -> Result<i64> {
        let bytes: [u8; 8] = src
            .try_into()
            .map_err(|_| GraphError::Corruption("counter value is not 8 bytes"))?;
        Ok(i64::from_le_bytes(bytes))
    }
}

pub mod buf {
    //! A slice-backed cursor for parsing persisted values.

    use core::fmt;

    use crate::types::{GraphError, Result};

    /// A cursor for reading bytes from a slice with offset tracking.
    pub struct Cursor<'a> {
        buf: &'a [u8],
        off: usize,
    }

    impl<'a> Cursor<'a> {
        /// Creates a new cursor starting at offset 0.
        pub fn new(buf: &'a [u8]) -> Self {
            Self { buf, off: 0 }
        }

        /// Takes the next `n` bytes, failing with `Corruption(what)` if the buffer is short.
        pub fn take(&mut self, n: usize, what: &'static str) -> Result<&'a [u8]> {
            let end = self
                .off
                .checked_add(n)
                .filter(|end| *end <= self.buf.len())
                .ok_or(GraphError::Corruption(what))?;
            let slice = &self.buf[self.off..end];
            self.off = end;
            Ok(slice)
        }

        /// Reads a single byte.
        pub fn u8(&mut self, what: &'static str) -> Result<u8> {
            Ok(self.take(1, what)?[0])
        }

        /// Reads a big-endian `u16`.
        pub fn u16_be(&mut self, what: &'static str) -> Result<u16> {
            let raw = self.take(2, what)?;
            Ok(u16::from_be_bytes([raw[0], raw[1]]))
        }

        /// Reads a `u16` length-prefixed byte string.
        pub fn bytes_u16(&mut self, what: &'static str) -> Result<&'a [u8]> {
            let len = self.u16_be(what)? as usize;
            self.take(len, what)
        }

        /// Reads a `u16` length-prefixed UTF-8 string.
        pub fn str_u16(&mut self, what: &'static str) -> Result<&'a str> {
            let raw = self.bytes_u16(what)?;
            core::str::from_utf8(raw).map_err(|_| GraphError::Corruption("string is not UTF-8"))
        }

        /// Returns the number of bytes remaining in the buffer.
        pub fn remaining(&self) -> usize {
            self.buf.len().saturating_sub(self.off)
        }

        /// Returns `true` once every byte has been consumed.
        pub fn is_empty(&self) -> bool {
            self.remaining() == 0
        }
    }

    impl<'a> fmt::Debug for Cursor<'a> {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.debug_struct("Cursor")
                .field("off", &self.off)
                .field("remaining", &self.remaining())
                .finish()
        }
    }
}
