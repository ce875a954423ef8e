//! Big-endian primitive reads over a raw byte slice.
//!
//! Everything in the `.slp` raw section is big-endian (the game is a
//! PowerPC title). These helpers never allocate; they either return the
//! value at `offset` or fail with [`ParseError::Truncated`].

use crate::errors::ParseError;
use crate::Result;

fn array<const N: usize>(buf: &[u8], offset: usize) -> Result<[u8; N]> {
    buf.get(offset..offset + N)
        .and_then(|slice| slice.try_into().ok())
        .ok_or(ParseError::Truncated(offset))
}

pub(crate) fn read_bytes(buf: &[u8], offset: usize, len: usize) -> Result<&[u8]> {
    buf.get(offset..offset + len).ok_or(ParseError::Truncated(offset))
}

pub(crate) fn read_u8(buf: &[u8], offset: usize) -> Result<u8> {
    buf.get(offset).copied().ok_or(ParseError::Truncated(offset))
}

pub(crate) fn read_i8(buf: &[u8], offset: usize) -> Result<i8> {
    Ok(read_u8(buf, offset)? as i8)
}

pub(crate) fn read_u16(buf: &[u8], offset: usize) -> Result<u16> {
    Ok(u16::from_be_bytes(array(buf, offset)?))
}

pub(crate) fn read_u32(buf: &[u8], offset: usize) -> Result<u32> {
    Ok(u32::from_be_bytes(array(buf, offset)?))
}

pub(crate) fn read_i32(buf: &[u8], offset: usize) -> Result<i32> {
    Ok(i32::from_be_bytes(array(buf, offset)?))
}

pub(crate) fn read_f32(buf: &[u8], offset: usize) -> Result<f32> {
    Ok(f32::from_be_bytes(array(buf, offset)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_are_big_endian() {
        let buf = [0x00, 0x01, 0x02, 0x03, 0x04];

        assert_eq!(read_u8(&buf, 4).unwrap(), 0x04);
        assert_eq!(read_u16(&buf, 1).unwrap(), 0x0102);
        assert_eq!(read_u32(&buf, 0).unwrap(), 0x00010203);
        assert_eq!(read_i32(&buf, 1).unwrap(), 0x01020304);
    }

    #[test]
    fn float_reads_match_bit_patterns() {
        let buf = 1.5f32.to_be_bytes();
        assert_eq!(read_f32(&buf, 0).unwrap(), 1.5);
    }

    #[test]
    fn out_of_range_reads_are_truncation_errors() {
        let buf = [0u8; 4];

        assert!(matches!(read_u32(&buf, 1), Err(ParseError::Truncated(1))));
        assert!(matches!(read_u8(&buf, 4), Err(ParseError::Truncated(4))));
        assert!(matches!(read_bytes(&buf, 2, 3), Err(ParseError::Truncated(2))));
    }

    #[test]
    fn signed_reads_preserve_sign() {
        let buf = (-123i32).to_be_bytes();
        assert_eq!(read_i32(&buf, 0).unwrap(), -123);
        assert_eq!(read_i8(&[0xff], 0).unwrap(), -1);
    }
}
