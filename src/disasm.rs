use crate::branch::{region_target, INSTRUCTION_LENGTH};
use crate::decoder::Decoded;
use crate::exec::sext;
use crate::instructions::Format;

/// Render a decoded instruction by substituting its operands into the
/// catalog syntax. `pc` is the address the word was fetched from.
///
/// Register tokens keep their bank letter, `target` becomes an absolute
/// address, `label` a branch destination (or a plain value outside of
/// compare-and-branch), and negative example immediates are shown signed.
pub fn fmt_decoded(d: &Decoded, pc: u32) -> String {
    let desc = d.desc;
    let mnemonic = desc.mnemonic();
    let rest = desc.syntax[mnemonic.len()..].trim_start();
    let widths: Vec<u32> = desc
        .encoding()
        .map(|e| e.fields.iter().map(|f| f.width).collect())
        .unwrap_or_default();

    let mut out = String::from(mnemonic);
    if rest.is_empty() {
        return out;
    }
    out.push(' ');

    let b = rest.as_bytes();
    let digits_end = |mut j: usize| {
        while j < b.len() && b[j].is_ascii_digit() {
            j += 1;
        }
        j
    };
    let mut next = 0;
    let mut i = 0;
    while i < b.len() {
        let c = b[i];
        let boundary = i == 0 || !b[i - 1].is_ascii_alphanumeric();
        let digit_at = |j: usize| j < b.len() && b[j].is_ascii_digit();
        let (end, rendered) = if boundary && matches!(c, b'X' | b'S' | b'D') && digit_at(i + 1) {
            let end = digits_end(i + 1);
            (end, d.operands.get(next).map(|v| format!("{}{v}", c as char)))
        } else if boundary && (c.is_ascii_digit() || (c == b'-' && digit_at(i + 1))) {
            let end = digits_end(i + 1);
            let render = |v: i32| {
                if c == b'-' {
                    let w = widths.get(next).copied().unwrap_or(32);
                    sext(v, w).to_string()
                } else {
                    v.to_string()
                }
            };
            (end, d.operands.get(next).map(|&v| render(v)))
        } else if boundary && rest[i..].starts_with("target") {
            let v = d.operands.get(next);
            (i + 6, v.map(|&v| format!("{:#010x}", region_target(pc, v))))
        } else if boundary && rest[i..].starts_with("label") {
            let v = d.operands.get(next).map(|&v| {
                if desc.format == Format::IBranch {
                    let disp = (sext(v, 16) as u32).wrapping_shl(2);
                    format!("{:#010x}", pc.wrapping_add(INSTRUCTION_LENGTH).wrapping_add(disp))
                } else {
                    format!("{v:#x}")
                }
            });
            (i + 5, v)
        } else {
            out.push(c as char);
            i += 1;
            continue;
        };
        match rendered {
            Some(s) => out.push_str(&s),
            None => out.push_str(&rest[i..end]),
        }
        next += 1;
        i = end;
    }
    out
}
