//! The on-output token encoding.
//!
//! A token output carries exactly two data fields in its locking
//! condition: field 0 is the UTF-8 bytes of the asset identifier, field 1
//! is the amount as a Bitcoin-style variable-length integer. Decoding
//! checks shape only; lineage and conservation are the engines' job.

use crate::error::{DecodeError, EncodeError};
use crate::types::{AssetId, TokenRecord};

/// Serialize a token record into the two data fields carried by an
/// output's locking condition.
pub fn encode(record: &TokenRecord) -> Result<Vec<Vec<u8>>, EncodeError> {
    if record.asset_id.as_str().is_empty() {
        return Err(EncodeError::EmptyAssetId);
    }
    Ok(vec![
        record.asset_id.as_str().as_bytes().to_vec(),
        write_varint(record.amount),
    ])
}

/// Decode the data fields of an output back into a token record.
pub fn decode(fields: &[Vec<u8>]) -> Result<TokenRecord, DecodeError> {
    if fields.len() != 2 {
        return Err(DecodeError::WrongFieldCount(fields.len()));
    }
    let asset_id = std::str::from_utf8(&fields[0]).map_err(|_| DecodeError::BadAssetId)?;
    let (amount, consumed) = read_varint(&fields[1])?;
    if consumed != fields[1].len() {
        return Err(DecodeError::TrailingBytes(fields[1].len() - consumed));
    }
    Ok(TokenRecord {
        asset_id: AssetId::new(asset_id),
        amount,
    })
}

/// Write an amount as a Bitcoin-style varint.
///
/// One byte below 0xfd, then 0xfd + u16, 0xfe + u32, 0xff + u64, all
/// little-endian.
pub fn write_varint(value: u64) -> Vec<u8> {
    match value {
        0..=0xfc => vec![value as u8],
        0xfd..=0xffff => {
            let mut out = vec![0xfd];
            out.extend_from_slice(&(value as u16).to_le_bytes());
            out
        }
        0x1_0000..=0xffff_ffff => {
            let mut out = vec![0xfe];
            out.extend_from_slice(&(value as u32).to_le_bytes());
            out
        }
        _ => {
            let mut out = vec![0xff];
            out.extend_from_slice(&value.to_le_bytes());
            out
        }
    }
}

/// Read a Bitcoin-style varint from the front of `bytes`, returning the
/// value and how many bytes it occupied.
pub fn read_varint(bytes: &[u8]) -> Result<(u64, usize), DecodeError> {
    let &tag = bytes.first().ok_or(DecodeError::BadVarint)?;
    match tag {
        0xfd => {
            let body = bytes.get(1..3).ok_or(DecodeError::BadVarint)?;
            Ok((u16::from_le_bytes(body.try_into().unwrap()) as u64, 3))
        }
        0xfe => {
            let body = bytes.get(1..5).ok_or(DecodeError::BadVarint)?;
            Ok((u32::from_le_bytes(body.try_into().unwrap()) as u64, 5))
        }
        0xff => {
            let body = bytes.get(1..9).ok_or(DecodeError::BadVarint)?;
            Ok((u64::from_le_bytes(body.try_into().unwrap()), 9))
        }
        small => Ok((small as u64, 1)),
    }
}
