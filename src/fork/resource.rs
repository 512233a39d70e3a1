//! Classic resource fork container: header, resource map, type list, reference lists.
//!
//! Only lookup is supported. Attributes, names and the in-memory handle fields are read past
//! but never interpreted.

use crate::catalog::bytes::{BeReader, PutBe};
use crate::error::ResourceForkError;
use crate::types::FourCharCode;

pub const RESOURCE_HEADER_LEN: usize = 16;

/// Offset of the type list offset field within the map.
const MAP_TYPE_LIST_OFFSET_FIELD: usize = 24;
const TYPE_ENTRY_LEN: usize = 8;
const REFERENCE_ENTRY_LEN: usize = 12;

/// Data section offset used when building forks, after the header and the 240 bytes
/// historically reserved for system use.
const BUILT_DATA_OFFSET: usize = 256;

/// A parsed view over resource fork bytes.
#[derive(Debug, Clone, Copy)]
pub struct ResourceFork<'a> {
    bytes: &'a [u8],
    data_offset: usize,
    map_offset: usize,
    map_length: usize,
}

/// One entry of the reference list for a resource type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceReference {
    pub id: i16,
    pub name_offset: u16,
    pub attributes: u8,
    /// Offset of the resource's length word, relative to the data section.
    pub data_offset: u32,
}

impl<'a> ResourceFork<'a> {
    pub fn parse(bytes: &'a [u8]) -> Result<Self, ResourceForkError> {
        let header = bytes
            .get(..RESOURCE_HEADER_LEN)
            .ok_or(ResourceForkError::TruncatedHeader(bytes.len()))?;
        let field = |index: usize| {
            let at = index * 4;
            u32::from_be_bytes([header[at], header[at + 1], header[at + 2], header[at + 3]]) as usize
        };
        let data_offset = field(0);
        let map_offset = field(1);
        let data_length = field(2);
        let map_length = field(3);

        check_range(bytes, "data section", data_offset, data_length)?;
        check_range(bytes, "resource map", map_offset, map_length)?;
        if map_length < MAP_TYPE_LIST_OFFSET_FIELD + 4 {
            return Err(ResourceForkError::OutOfBounds {
                what: "resource map header",
                offset: map_offset,
            });
        }

        Ok(Self {
            bytes,
            data_offset,
            map_offset,
            map_length,
        })
    }

    fn map(&self) -> &'a [u8] {
        &self.bytes[self.map_offset..self.map_offset + self.map_length]
    }

    fn type_list_start(&self) -> Result<usize, ResourceForkError> {
        let mut field = BeReader::new(&self.map()[MAP_TYPE_LIST_OFFSET_FIELD..]);
        field
            .u16()
            .map(|v| v as usize)
            .map_err(|_| out_of_bounds("type list offset", MAP_TYPE_LIST_OFFSET_FIELD))
    }

    /// Every resource type in the map together with its reference count.
    pub fn types(&self) -> Result<Vec<(FourCharCode, usize)>, ResourceForkError> {
        Ok(self
            .type_entries()?
            .into_iter()
            .map(|entry| (entry.res_type, entry.count))
            .collect())
    }

    fn type_entries(&self) -> Result<Vec<TypeEntry>, ResourceForkError> {
        let map = self.map();
        let start = self.type_list_start()?;
        let list = map
            .get(start..)
            .ok_or_else(|| out_of_bounds("type list", start))?;
        let mut source = BeReader::new(list);
        // Stored as count minus one; 0xFFFF means the map is empty.
        let stored = source.u16().map_err(|_| out_of_bounds("type list", start))?;
        let count = stored.wrapping_add(1) as usize;

        let mut entries = Vec::with_capacity(count);
        for index in 0..count {
            let offset = start + 2 + index * TYPE_ENTRY_LEN;
            let err = |_| out_of_bounds("type list entry", offset);
            entries.push(TypeEntry {
                res_type: FourCharCode(source.u32().map_err(err)?),
                count: source.u16().map_err(err)?.wrapping_add(1) as usize,
                reference_list_offset: start + source.u16().map_err(err)? as usize,
            });
        }
        Ok(entries)
    }

    /// References for one resource type, in map order. Empty if the type is not present.
    pub fn references(
        &self,
        res_type: FourCharCode,
    ) -> Result<Vec<ResourceReference>, ResourceForkError> {
        let map = self.map();
        let Some(entry) = self
            .type_entries()?
            .into_iter()
            .find(|entry| entry.res_type == res_type)
        else {
            return Ok(Vec::new());
        };

        let list = map
            .get(entry.reference_list_offset..)
            .ok_or_else(|| out_of_bounds("reference list", entry.reference_list_offset))?;
        let mut source = BeReader::new(list);
        let mut references = Vec::with_capacity(entry.count);
        for index in 0..entry.count {
            let offset = entry.reference_list_offset + index * REFERENCE_ENTRY_LEN;
            let err = |_| out_of_bounds("reference entry", offset);
            let id = source.i16().map_err(err)?;
            let name_offset = source.u16().map_err(err)?;
            let packed = source.u32().map_err(err)?;
            let _handle = source.u32().map_err(err)?;
            references.push(ResourceReference {
                id,
                name_offset,
                attributes: (packed >> 24) as u8,
                data_offset: packed & 0x00ff_ffff,
            });
        }
        Ok(references)
    }

    /// Bytes of the resource with the given type and ID, if the map lists one.
    pub fn find(
        &self,
        res_type: FourCharCode,
        id: i16,
    ) -> Result<Option<&'a [u8]>, ResourceForkError> {
        let Some(reference) = self
            .references(res_type)?
            .into_iter()
            .find(|reference| reference.id == id)
        else {
            return Ok(None);
        };
        self.resource_data(&reference).map(Some)
    }

    fn resource_data(&self, reference: &ResourceReference) -> Result<&'a [u8], ResourceForkError> {
        let offset = self.data_offset + reference.data_offset as usize;
        let mut source = BeReader::new(self.bytes.get(offset..).unwrap_or_default());
        let length = source
            .u32()
            .map_err(|_| out_of_bounds("resource length", offset))? as usize;
        source
            .take(length)
            .map_err(|_| out_of_bounds("resource data", offset + 4))
    }
}

#[derive(Debug, Clone, Copy)]
struct TypeEntry {
    res_type: FourCharCode,
    count: usize,
    /// Absolute offset within the map.
    reference_list_offset: usize,
}

fn out_of_bounds(what: &'static str, offset: usize) -> ResourceForkError {
    ResourceForkError::OutOfBounds { what, offset }
}

fn check_range(
    bytes: &[u8],
    what: &'static str,
    offset: usize,
    length: usize,
) -> Result<(), ResourceForkError> {
    match offset.checked_add(length) {
        Some(end) if end <= bytes.len() => Ok(()),
        _ => Err(out_of_bounds(what, offset)),
    }
}

/// Assembles a resource fork from (type, ID, data) triples.
///
/// Resources of the same type are grouped under one type entry in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct ResourceForkBuilder {
    resources: Vec<(FourCharCode, i16, Vec<u8>)>,
}

impl ResourceForkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(mut self, res_type: FourCharCode, id: i16, data: impl Into<Vec<u8>>) -> Self {
        self.resources.push((res_type, id, data.into()));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut types: Vec<(FourCharCode, Vec<usize>)> = Vec::new();
        for (index, (res_type, _, _)) in self.resources.iter().enumerate() {
            match types.iter_mut().find(|(t, _)| t == res_type) {
                Some((_, members)) => members.push(index),
                None => types.push((*res_type, vec![index])),
            }
        }

        let mut data = Vec::new();
        let mut data_offsets = Vec::with_capacity(self.resources.len());
        for (_, _, bytes) in &self.resources {
            data_offsets.push(data.len() as u32);
            data.put_u32(bytes.len() as u32);
            data.extend_from_slice(bytes);
        }

        let type_list_offset = (MAP_TYPE_LIST_OFFSET_FIELD + 4) as u16;
        let mut type_list = Vec::new();
        type_list.put_u16((types.len() as u16).wrapping_sub(1));
        let mut reference_lists = Vec::new();
        let mut reference_list_offset = 2 + types.len() * TYPE_ENTRY_LEN;
        for (res_type, members) in &types {
            type_list.put_u32(res_type.0);
            type_list.put_u16((members.len() as u16).wrapping_sub(1));
            type_list.put_u16(reference_list_offset as u16);
            for &index in members {
                let (_, id, _) = &self.resources[index];
                reference_lists.put_i16(*id);
                reference_lists.put_u16(0xffff);
                reference_lists.put_u32(data_offsets[index] & 0x00ff_ffff);
                reference_lists.put_u32(0);
            }
            reference_list_offset += members.len() * REFERENCE_ENTRY_LEN;
        }

        let map_offset = BUILT_DATA_OFFSET + data.len();
        let map_length =
            MAP_TYPE_LIST_OFFSET_FIELD + 4 + type_list.len() + reference_lists.len();

        let mut header = Vec::with_capacity(RESOURCE_HEADER_LEN);
        header.put_u32(BUILT_DATA_OFFSET as u32);
        header.put_u32(map_offset as u32);
        header.put_u32(data.len() as u32);
        header.put_u32(map_length as u32);

        let mut out = header.clone();
        out.resize(BUILT_DATA_OFFSET, 0);
        out.extend_from_slice(&data);
        // Map: copy of header, next-map handle, file reference, attributes.
        out.extend_from_slice(&header);
        out.put_u32(0);
        out.put_u16(0);
        out.put_u16(0);
        out.put_u16(type_list_offset);
        out.put_u16(map_length as u16);
        out.extend_from_slice(&type_list);
        out.extend_from_slice(&reference_lists);
        out
    }
}
