//! Test-side pickle encoder.
//!
//! Builds byte-exact buffers entry by entry: each `entry` call appends a
//! `[tag][length][payload]` record and returns its dense index, so payloads
//! can reference earlier entries by number. Forward references go through
//! `reserve`/`fill`.

/// Entry tags, mirrored here so tests read as wire layouts.
pub mod tags {
    pub const TERM_NAME: u8 = 1;
    pub const TYPE_NAME: u8 = 2;
    pub const NONE_SYM: u8 = 3;
    pub const TYPE_SYM: u8 = 4;
    pub const ALIAS_SYM: u8 = 5;
    pub const CLASS_SYM: u8 = 6;
    pub const MODULE_SYM: u8 = 7;
    pub const VAL_SYM: u8 = 8;
    pub const EXT_REF: u8 = 9;
    pub const EXT_MOD_CLASS_REF: u8 = 10;
    pub const NO_TPE: u8 = 11;
    pub const NO_PREFIX_TPE: u8 = 12;
    pub const THIS_TPE: u8 = 13;
    pub const SINGLE_TPE: u8 = 14;
    pub const CONSTANT_TPE: u8 = 15;
    pub const TYPE_REF_TPE: u8 = 16;
    pub const TYPE_BOUNDS_TPE: u8 = 17;
    pub const REFINED_TPE: u8 = 18;
    pub const CLASS_INFO_TPE: u8 = 19;
    pub const METHOD_TPE: u8 = 20;
    pub const POLY_TPE: u8 = 21;
    pub const IMPLICIT_METHOD_TPE: u8 = 22;
    pub const LITERAL_UNIT: u8 = 24;
    pub const LITERAL_BOOLEAN: u8 = 25;
    pub const LITERAL_INT: u8 = 29;
    pub const LITERAL_LONG: u8 = 30;
    pub const LITERAL_FLOAT: u8 = 31;
    pub const LITERAL_STRING: u8 = 33;
    pub const SYM_ANNOT: u8 = 40;
    pub const CHILDREN: u8 = 41;
    pub const EXISTENTIAL_TPE: u8 = 48;
    pub const TREE: u8 = 49;
    pub const MODIFIERS: u8 = 50;
}

/// Append a base-128 varint, most significant group first, continuation
/// bit on all but the last byte.
pub fn push_nat(out: &mut Vec<u8>, mut value: u64) {
    let mut groups = vec![(value & 0x7f) as u8];
    value >>= 7;
    while value != 0 {
        groups.push(0x80 | (value & 0x7f) as u8);
        value >>= 7;
    }
    groups.reverse();
    out.extend_from_slice(&groups);
}

/// A payload of consecutive varint entry references.
pub fn refs(items: &[u64]) -> Vec<u8> {
    let mut out = Vec::new();
    for &item in items {
        push_nat(&mut out, item);
    }
    out
}

#[derive(Default)]
pub struct PickleWriter {
    entries: Vec<(u8, Vec<u8>)>,
}

impl PickleWriter {
    pub fn new() -> Self {
        PickleWriter::default()
    }

    /// Append an entry, returning its index.
    pub fn entry(&mut self, tag: u8, payload: Vec<u8>) -> u64 {
        self.entries.push((tag, payload));
        (self.entries.len() - 1) as u64
    }

    /// Claim an index for an entry written later with [`PickleWriter::fill`].
    pub fn reserve(&mut self) -> u64 {
        self.entry(0, Vec::new())
    }

    pub fn fill(&mut self, index: u64, tag: u8, payload: Vec<u8>) {
        self.entries[index as usize] = (tag, payload);
    }

    pub fn term_name(&mut self, text: &str) -> u64 {
        self.entry(tags::TERM_NAME, text.as_bytes().to_vec())
    }

    pub fn type_name(&mut self, text: &str) -> u64 {
        self.entry(tags::TYPE_NAME, text.as_bytes().to_vec())
    }

    /// Local symbol payload: name, owner, flag word, optional access
    /// boundary, info.
    pub fn symbol_payload(
        name: u64,
        owner: u64,
        flags: u64,
        private_within: Option<u64>,
        info: u64,
    ) -> Vec<u8> {
        let mut out = Vec::new();
        push_nat(&mut out, name);
        push_nat(&mut out, owner);
        push_nat(&mut out, flags);
        if let Some(pw) = private_within {
            push_nat(&mut out, pw);
        }
        push_nat(&mut out, info);
        out
    }

    /// Encode with the standard header.
    pub fn finish(&self) -> Vec<u8> {
        self.finish_with_version(veld_pickle::MAJOR_VERSION, veld_pickle::MINOR_VERSION)
    }

    pub fn finish_with_version(&self, major: u32, minor: u32) -> Vec<u8> {
        let mut out = Vec::new();
        push_nat(&mut out, u64::from(major));
        push_nat(&mut out, u64::from(minor));
        for (tag, payload) in &self.entries {
            out.push(*tag);
            push_nat(&mut out, payload.len() as u64);
            out.extend_from_slice(payload);
        }
        out
    }
}
