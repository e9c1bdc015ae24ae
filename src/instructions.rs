use crate::branch::Condition;
use serde::{Deserialize, Serialize};
use std::ops::Deref;

/// Encoding format tag carried by every catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Format {
    R,
    I,
    J,
    IBranch,
}

/// Semantic action identifier, resolved by the executor's dispatch table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Nop,
    // integer arithmetic
    Add,
    Adds,
    Sub,
    Subs,
    Addi,
    Addis,
    Subi,
    Subis,
    Mul,
    Smulh,
    Umulh,
    Sdiv,
    Udiv,
    // logical and shifts
    And,
    Ands,
    Andi,
    Andis,
    Orr,
    Orri,
    Eor,
    Eori,
    Lsl,
    Lsr,
    // control flow
    B,
    BRel,
    Bl,
    Br,
    Cbnz,
    Cbz,
    CbnzRel,
    CbzRel,
    BCond(Condition),
    Svc,
    // memory and moves
    Ldxr,
    Stxr,
    Ldur,
    Stur,
    Lda,
    Movz,
    Movk,
    Ldurb,
    Ldurh,
    Sturb,
    Sturh,
    // floating point
    Fadds,
    Fsubs,
    Fmuls,
    Fdivs,
    Faddd,
    Fsubd,
    Fmuld,
    Fdivd,
    Ldurs,
    Ldurd,
    Sturs,
    Sturd,
    Fcmps,
    Fcmpd,
}

/// One catalog entry. Templates are 32 characters, bit 31 first; `0`/`1` are
/// fixed bits and any other character names an operand field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Descriptor {
    pub syntax: &'static str,
    pub description: &'static str,
    pub format: Format,
    pub template: &'static str,
    pub action: Action,
}

impl Descriptor {
    pub const fn new(
        syntax: &'static str,
        description: &'static str,
        format: Format,
        template: &'static str,
        action: Action,
    ) -> Self {
        Self { syntax, description, format, template, action }
    }

    pub fn mnemonic(&self) -> &'static str {
        self.syntax.split_whitespace().next().unwrap_or(self.syntax)
    }

    pub fn encoding(&self) -> Result<Encoding, CatalogError> {
        Encoding::parse(self.template)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("template {template:?} has {len} bits, expected 32")]
    TemplateLength { template: &'static str, len: usize },
    #[error("template {template:?} names more than {max} operand fields")]
    TooManyFields { template: &'static str, max: usize },
    #[error("{new:?} collides with {existing:?} (mask {mask:#010x}, match {match_bits:#010x})")]
    Collision {
        existing: &'static str,
        new: &'static str,
        mask: u32,
        match_bits: u32,
    },
}

/// Zero-extended operand field values in template order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Operands {
    vals: [i32; Operands::CAPACITY],
    len: u8,
}

impl Operands {
    pub const CAPACITY: usize = 4;

    fn push(&mut self, v: i32) {
        self.vals[self.len as usize] = v;
        self.len += 1;
    }
}

impl Deref for Operands {
    type Target = [i32];
    fn deref(&self) -> &[i32] {
        &self.vals[..self.len as usize]
    }
}

/// One operand field: the bit positions it occupies, MSB first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub letter: char,
    pub bits: u32,
    pub width: u32,
}

impl Field {
    fn gather(&self, word: u32) -> u32 {
        let mut v = 0;
        for pos in (0..32).rev().filter(|p| self.bits & (1 << p) != 0) {
            v = (v << 1) | ((word >> pos) & 1);
        }
        v
    }

    fn scatter(&self, value: u32) -> u32 {
        let mut word = 0;
        let mut src = self.width;
        for pos in (0..32).rev().filter(|p| self.bits & (1 << p) != 0) {
            src -= 1;
            word |= ((value >> src) & 1) << pos;
        }
        word
    }
}

/// Mask/match pair and operand layout compiled from a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoding {
    pub mask: u32,
    pub match_bits: u32,
    pub fields: Vec<Field>,
}

impl Encoding {
    pub fn parse(template: &'static str) -> Result<Self, CatalogError> {
        let len = template.chars().count();
        if len != 32 {
            return Err(CatalogError::TemplateLength { template, len });
        }
        let mut mask = 0u32;
        let mut match_bits = 0u32;
        let mut fields: Vec<Field> = Vec::new();
        for (i, ch) in template.chars().enumerate() {
            let bit = 1u32 << (31 - i);
            match ch {
                '0' => mask |= bit,
                '1' => {
                    mask |= bit;
                    match_bits |= bit;
                }
                letter => match fields.iter_mut().find(|f| f.letter == letter) {
                    Some(f) => {
                        f.bits |= bit;
                        f.width += 1;
                    }
                    None => fields.push(Field { letter, bits: bit, width: 1 }),
                },
            }
        }
        if fields.len() > Operands::CAPACITY {
            return Err(CatalogError::TooManyFields { template, max: Operands::CAPACITY });
        }
        Ok(Self { mask, match_bits, fields })
    }

    pub fn matches(&self, word: u32) -> bool {
        word & self.mask == self.match_bits
    }

    pub fn extract(&self, word: u32) -> Operands {
        let mut ops = Operands::default();
        for f in &self.fields {
            ops.push(f.gather(word) as i32);
        }
        ops
    }

    /// Place operand values into the template; excess high bits are dropped.
    pub fn encode(&self, operands: &[i32]) -> u32 {
        self.fields
            .iter()
            .zip(operands)
            .fold(self.match_bits, |word, (f, &v)| word | f.scatter(v as u32))
    }
}
