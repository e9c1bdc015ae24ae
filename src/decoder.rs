use crate::instructions::{CatalogError, Descriptor, Encoding};
use crate::isa::legv8::CATALOG;
use std::collections::HashMap;
use tracing::debug;

pub use crate::instructions::Operands;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoded {
    pub desc: &'static Descriptor,
    pub operands: Operands,
    pub word: u32,
}

pub trait Decoder {
    fn decode(&self, raw32: u32) -> Option<Decoded>;
}

#[derive(Debug)]
struct Entry {
    desc: &'static Descriptor,
    encoding: Encoding,
}

/// All descriptors sharing one mask, keyed by their match value.
#[derive(Debug)]
pub struct MaskGroup {
    pub mask: u32,
    matches: HashMap<u32, usize>,
}

impl MaskGroup {
    pub fn specificity(&self) -> u32 {
        self.mask.count_ones()
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

/// Mutable construction phase of the opcode table.
#[derive(Debug, Default)]
pub struct OpcodeTableBuilder {
    entries: Vec<Entry>,
    groups: HashMap<u32, MaskGroup>,
}

impl OpcodeTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, desc: &'static Descriptor) -> Result<&mut Self, CatalogError> {
        let encoding = desc.encoding()?;
        let (mask, match_bits) = (encoding.mask, encoding.match_bits);
        let group = self.groups.entry(mask).or_insert_with(|| MaskGroup {
            mask,
            matches: HashMap::new(),
        });
        if let Some(&idx) = group.matches.get(&match_bits) {
            return Err(CatalogError::Collision {
                existing: self.entries[idx].desc.syntax,
                new: desc.syntax,
                mask,
                match_bits,
            });
        }
        group.matches.insert(match_bits, self.entries.len());
        self.entries.push(Entry { desc, encoding });
        Ok(self)
    }

    pub fn extend(&mut self, catalog: &'static [Descriptor]) -> Result<&mut Self, CatalogError> {
        for desc in catalog {
            self.insert(desc)?;
        }
        Ok(self)
    }

    /// Freeze the table: most specific masks first, ties by mask value.
    pub fn build(self) -> OpcodeTable {
        let mut groups: Vec<MaskGroup> = self.groups.into_values().collect();
        groups.sort_by(|a, b| {
            b.specificity()
                .cmp(&a.specificity())
                .then(a.mask.cmp(&b.mask))
        });
        debug!(groups = groups.len(), entries = self.entries.len(), "opcode table built");
        OpcodeTable {
            entries: self.entries,
            groups,
        }
    }
}

/// Immutable decode table; safe to share between threads.
#[derive(Debug)]
pub struct OpcodeTable {
    entries: Vec<Entry>,
    groups: Vec<MaskGroup>,
}

impl OpcodeTable {
    pub fn from_catalog(catalog: &'static [Descriptor]) -> Result<Self, CatalogError> {
        let mut b = OpcodeTableBuilder::new();
        b.extend(catalog)?;
        Ok(b.build())
    }

    /// Groups in probe order.
    pub fn groups(&self) -> &[MaskGroup] {
        &self.groups
    }

    /// Descriptors of one group, ordered by match value.
    pub fn group_entries(&self, group: &MaskGroup) -> Vec<(u32, &'static Descriptor)> {
        let mut v: Vec<_> = group
            .matches
            .iter()
            .map(|(&m, &idx)| (m, self.entries[idx].desc))
            .collect();
        v.sort_by_key(|&(m, _)| m);
        v
    }

    pub fn find(&self, word: u32) -> Option<Decoded> {
        self.groups.iter().find_map(|g| {
            let &idx = g.matches.get(&(word & g.mask))?;
            let e = &self.entries[idx];
            Some(Decoded {
                desc: e.desc,
                operands: e.encoding.extract(word),
                word,
            })
        })
    }
}

impl Decoder for OpcodeTable {
    fn decode(&self, raw32: u32) -> Option<Decoded> {
        self.find(raw32)
    }
}

/// The catalog plus its decode table: the entry point used by the
/// assembler/statement layer.
#[derive(Debug)]
pub struct InstructionSet {
    catalog: &'static [Descriptor],
    table: OpcodeTable,
}

impl InstructionSet {
    pub fn new() -> Result<Self, CatalogError> {
        Self::from_catalog(CATALOG)
    }

    pub fn from_catalog(catalog: &'static [Descriptor]) -> Result<Self, CatalogError> {
        Ok(Self {
            catalog,
            table: OpcodeTable::from_catalog(catalog)?,
        })
    }

    pub fn instructions(&self) -> &'static [Descriptor] {
        self.catalog
    }

    pub fn table(&self) -> &OpcodeTable {
        &self.table
    }

    pub fn match_mnemonic(&self, name: &str) -> Vec<&'static Descriptor> {
        self.catalog
            .iter()
            .filter(|d| d.mnemonic().eq_ignore_ascii_case(name))
            .collect()
    }

    pub fn match_mnemonic_prefix(&self, prefix: &str) -> Vec<&'static Descriptor> {
        let prefix = prefix.to_ascii_lowercase();
        self.catalog
            .iter()
            .filter(|d| d.mnemonic().to_ascii_lowercase().starts_with(&prefix))
            .collect()
    }
}

impl Decoder for InstructionSet {
    fn decode(&self, raw32: u32) -> Option<Decoded> {
        self.table.find(raw32)
    }
}
