//! Entry index: one scan that locates every top-level entry.
//!
//! Runs once, after the version header, before anything is decoded. Each
//! step reads a tag byte and a varint length and skips the payload; entry
//! contents are never interpreted here. A corrupt length therefore surfaces
//! as an out-of-bounds read on a later pass, not during the scan.

use crate::buf::PickleBuf;
use crate::error::{Result, UnpickleError};

/// Location of one top-level entry.
#[derive(Copy, Clone, Debug)]
pub struct EntryMeta {
    /// Offset of the entry's tag byte.
    pub offset: usize,
    /// The raw tag byte, kept so callers can classify entries without
    /// re-seeking.
    pub tag: u8,
}

/// Scan the buffer from the cursor's current position to the end, producing
/// the dense entry-number -> location table.
pub fn scan(buf: &mut PickleBuf<'_>) -> Result<Vec<EntryMeta>> {
    let mut entries = Vec::new();
    while buf.pos() < buf.len() {
        let offset = buf.pos();
        let tag = buf.read_byte()?;
        let len = buf.read_nat()? as usize;
        let next = buf.pos().checked_add(len).filter(|&n| n <= buf.len());
        let next = next.ok_or_else(|| {
            UnpickleError::corrupt(offset, format!("entry length {len} runs past end of buffer"))
        })?;
        entries.push(EntryMeta { offset, tag });
        buf.set_pos(next);
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn scan_records_tag_offsets() {
        // Three entries: [tag=1 len=2 xx xx] [tag=2 len=0] [tag=11 len=1 x]
        let bytes = [1u8, 2, 0xAA, 0xBB, 2, 0, 11, 1, 0xCC];
        let mut buf = PickleBuf::new(&bytes);
        let entries = scan(&mut buf).unwrap();
        let locs: Vec<_> = entries.iter().map(|e| (e.offset, e.tag)).collect();
        assert_eq!(locs, vec![(0, 1), (4, 2), (6, 11)]);
    }

    #[test]
    fn scan_is_content_agnostic() {
        // A bogus tag byte scans fine; only interpretation rejects it.
        let bytes = [99u8, 1, 0xFF];
        let mut buf = PickleBuf::new(&bytes);
        assert_eq!(scan(&mut buf).unwrap().len(), 1);
    }

    #[test]
    fn scan_rejects_length_past_end() {
        let bytes = [1u8, 10, 0xAA];
        let mut buf = PickleBuf::new(&bytes);
        assert!(scan(&mut buf).is_err());
    }

    #[test]
    fn empty_body_scans_to_empty_index() {
        let mut buf = PickleBuf::new(&[]);
        assert!(scan(&mut buf).unwrap().is_empty());
    }
}
