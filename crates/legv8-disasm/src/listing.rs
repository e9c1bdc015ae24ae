use legv8_sim::decoder::{Decoder, OpcodeTable};
use legv8_sim::disasm::fmt_decoded;
use serde::Serialize;
use std::fmt::Write as _;

use crate::model::Image;

/// One disassembled word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Line {
    pub addr: u32,
    pub word: u32,
    pub text: String,
}

/// Decode every word in `[start, end)`; stops early at unmapped memory.
pub fn disassemble<D: Decoder>(img: &Image, dec: &D, start: u32, end: u32) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut pc = start;
    while pc < end {
        let Some(word) = img.read_u32(pc) else { break };
        let text = match dec.decode(word) {
            Some(d) => fmt_decoded(&d, pc),
            None => format!(".word {word:#010x}"),
        };
        lines.push(Line { addr: pc, word, text });
        pc = pc.wrapping_add(4);
    }
    lines
}

pub fn render_text(lines: &[Line], show_bytes: bool) -> String {
    let mut buf = String::new();
    for l in lines {
        let _ = write!(buf, "{:#010x}: ", l.addr);
        if show_bytes {
            for b in l.word.to_le_bytes() {
                let _ = write!(buf, "{b:02x} ");
            }
            buf.push_str("  ");
        }
        let _ = writeln!(buf, "{}", l.text);
    }
    buf
}

#[derive(Debug, Clone, Serialize)]
pub struct OpcodeRow {
    pub mask: u32,
    pub specificity: u32,
    pub match_bits: u32,
    pub syntax: &'static str,
}

/// The match table flattened in the order words are probed against it.
pub fn opcode_rows(table: &OpcodeTable) -> Vec<OpcodeRow> {
    table
        .groups()
        .iter()
        .flat_map(|g| {
            table.group_entries(g).into_iter().map(move |(match_bits, desc)| OpcodeRow {
                mask: g.mask,
                specificity: g.specificity(),
                match_bits,
                syntax: desc.syntax,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use legv8_sim::isa::legv8::CATALOG;
    use legv8_sim::InstructionSet;
    use pretty_assertions::assert_eq;

    #[test]
    fn range_listing_marks_unknown_words() {
        let addi = CATALOG
            .iter()
            .find(|d| d.syntax == "ADDI X1,X2,100")
            .unwrap()
            .encoding()
            .unwrap()
            .encode(&[1, 31, 5]);
        assert_eq!(addi, 0x203F_0005);
        // followed by an unassigned opcode
        let mut bytes = addi.to_le_bytes().to_vec();
        bytes.extend(0xFC00_0000u32.to_le_bytes());
        let img = Image::raw(0x100, bytes);
        let set = InstructionSet::new().unwrap();
        let lines = disassemble(&img, &set, 0x100, 0x110);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text, "ADDI X1,X31,5");
        assert_eq!(lines[1].text, ".word 0xfc000000");
        assert_eq!(
            render_text(&lines[..1], true),
            "0x00000100: 05 00 3f 20   ADDI X1,X31,5\n"
        );
    }

    #[test]
    fn opcode_rows_follow_probe_order() {
        let set = InstructionSet::new().unwrap();
        let rows = opcode_rows(set.table());
        assert_eq!(rows.len(), set.instructions().len());
        assert_eq!(rows[0].syntax, "nop");
        assert!(rows.windows(2).all(|w| w[0].specificity >= w[1].specificity));
    }
}
