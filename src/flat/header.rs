// Copyright (c) 2025-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::{
    coding::{Decode, Encode},
    Error, FormatVersion, TableMeta,
};
use byteorder::{ReadBytesExt, WriteBytesExt, LE};
use std::io::{Read, Write};

pub const MAGIC_BYTES: [u8; 3] = [b'R', b'H', b'T'];

/// Byte offset of the table metadata (`key_num`, `lpsl`, `max_key_num`, `table_size`)
pub const META_OFFSET: usize = MAGIC_BYTES.len()
    // Format version
    + std::mem::size_of::<u8>()
    // Value size
    + std::mem::size_of::<u32>();

/// Header of a flat table buffer
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Header {
    pub version: FormatVersion,

    /// Size of a record value in bytes
    pub value_size: u32,

    pub meta: TableMeta,
}

impl Header {
    pub const fn serialized_len() -> usize {
        META_OFFSET
            // Key count
            + std::mem::size_of::<u32>()
            // Longest PSL
            + std::mem::size_of::<u32>()
            // Max key count
            + std::mem::size_of::<u32>()
            // Table size
            + std::mem::size_of::<u32>()
    }
}

impl Encode for Header {
    fn encode_into<W: Write>(&self, writer: &mut W) -> crate::Result<()> {
        writer.write_all(&MAGIC_BYTES)?;
        writer.write_u8(self.version.into())?;
        writer.write_u32::<LE>(self.value_size)?;

        writer.write_u32::<LE>(self.meta.key_num)?;
        writer.write_u32::<LE>(self.meta.lpsl)?;
        writer.write_u32::<LE>(self.meta.max_key_num)?;
        writer.write_u32::<LE>(self.meta.table_size)?;

        Ok(())
    }
}

impl Decode for Header {
    fn decode_from<R: Read>(reader: &mut R) -> crate::Result<Self> {
        let mut magic = [0u8; MAGIC_BYTES.len()];
        reader.read_exact(&mut magic)?;

        if magic != MAGIC_BYTES {
            return Err(Error::InvalidHeader("magic"));
        }

        let version = FormatVersion::try_from(reader.read_u8()?)?;
        let value_size = reader.read_u32::<LE>()?;

        let key_num = reader.read_u32::<LE>()?;
        let lpsl = reader.read_u32::<LE>()?;
        let max_key_num = reader.read_u32::<LE>()?;
        let table_size = reader.read_u32::<LE>()?;

        Ok(Self {
            version,
            value_size,
            meta: TableMeta {
                key_num,
                lpsl,
                max_key_num,
                table_size,
            },
        })
    }
}
