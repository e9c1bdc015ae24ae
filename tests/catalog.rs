use legv8_sim::decoder::Decoder;
use legv8_sim::isa::legv8::CATALOG;
use legv8_sim::{Action, InstructionSet};
use pretty_assertions::assert_eq;

fn enc_r(op: u32, d: u32, n: u32, m: u32, shamt: u32, funct: u32) -> u32 {
    (op << 26) | (d << 21) | (n << 16) | (m << 11) | (shamt << 6) | funct
}

fn enc_i(op: u32, d: u32, n: u32, imm16: u32) -> u32 {
    (op << 26) | (d << 21) | (n << 16) | (imm16 & 0xFFFF)
}

#[test]
fn every_template_compiles() {
    for d in CATALOG {
        assert_eq!(d.template.len(), 32, "{}", d.syntax);
        d.encoding().unwrap_or_else(|e| panic!("{}: {e}", d.syntax));
    }
    assert!(InstructionSet::new().is_ok());
}

#[test]
fn syntax_operands_match_template_fields() {
    for d in CATALOG {
        let rest = &d.syntax[d.mnemonic().len()..];
        let tokens = rest
            .split(|c: char| matches!(c, ',' | '[' | ']' | ' '))
            .filter(|t| !t.is_empty() && *t != "LSL")
            .count();
        assert_eq!(tokens, d.encoding().unwrap().fields.len(), "{}", d.syntax);
    }
}

#[test]
fn every_entry_decodes_to_itself() {
    let set = InstructionSet::new().unwrap();
    for d in CATALOG {
        let e = d.encoding().unwrap();
        let ops: Vec<i32> = e
            .fields
            .iter()
            .enumerate()
            .map(|(k, f)| ((5 + 3 * k as u32) & ((1u32 << f.width) - 1)) as i32)
            .collect();
        let word = e.encode(&ops);
        assert!(e.matches(word), "{}", d.syntax);
        let got = set.decode(word).unwrap_or_else(|| panic!("{} did not decode", d.syntax));
        assert_eq!(got.desc.syntax, d.syntax);
        assert_eq!(&*got.operands, &ops[..]);
        assert_eq!(got.word, word);
    }
}

#[test]
fn hand_encoded_words() {
    let set = InstructionSet::new().unwrap();

    let add = set.decode(enc_r(0, 4, 5, 6, 0, 0x20)).unwrap();
    assert_eq!(add.desc.action, Action::Add);
    assert_eq!(&*add.operands, &[4, 5, 6]);

    let lsr = set.decode(enc_r(0, 1, 2, 0, 7, 0x02)).unwrap();
    assert_eq!(lsr.desc.action, Action::Lsr);
    assert_eq!(&*lsr.operands, &[1, 2, 7]);

    // offsets come back zero-extended; sign is applied by the executor
    let ldur = set.decode(enc_i(0x23, 1, 2, 0xFFF8)).unwrap();
    assert_eq!(ldur.desc.action, Action::Ldur);
    assert_eq!(&*ldur.operands, &[1, 2, 0xFFF8]);

    let udiv = set.decode(enc_r(0x1C, 3, 4, 5, 0, 0x1B)).unwrap();
    assert_eq!(udiv.desc.action, Action::Udiv);

    assert_eq!(set.decode(0).unwrap().desc.action, Action::Nop);
}

#[test]
fn unassigned_opcode_misses() {
    let set = InstructionSet::new().unwrap();
    for d in CATALOG {
        assert!(!d.encoding().unwrap().matches(0xFC00_0000), "{}", d.syntax);
    }
    assert!(set.decode(0xFC00_0000).is_none());
    assert!(set.decode(0x0000_003F).is_none());
}

#[test]
fn decode_is_pure() {
    let set = InstructionSet::new().unwrap();
    let w = enc_i(0x08, 1, 2, 0x1234);
    assert_eq!(set.decode(w), set.decode(w));
}

#[test]
fn probe_order_is_most_specific_first() {
    let set = InstructionSet::new().unwrap();
    let groups = set.table().groups();
    assert_eq!(groups[0].mask, 0xFFFF_FFFF);
    for w in groups.windows(2) {
        let (a, b) = (&w[0], &w[1]);
        assert!(
            a.specificity() > b.specificity()
                || (a.specificity() == b.specificity() && a.mask < b.mask),
            "{:#010x} before {:#010x}",
            a.mask,
            b.mask
        );
    }
    let total: usize = groups.iter().map(|g| g.len()).sum();
    assert_eq!(total, CATALOG.len());
}

#[test]
fn nop_shadows_the_all_zero_shift() {
    // LSL X0,X0,0 has the same bits as nop; the exact mask wins
    let set = InstructionSet::new().unwrap();
    assert_eq!(set.decode(0).unwrap().desc.syntax, "nop");
    assert_eq!(set.decode(enc_r(0, 1, 0, 0, 0, 0)).unwrap().desc.action, Action::Lsl);
}

#[test]
fn every_action_has_an_encoding() {
    use legv8_sim::branch::Condition;
    use Action::*;
    let mut all = vec![
        Nop, Add, Adds, Sub, Subs, Addi, Addis, Subi, Subis, Mul, Smulh, Umulh, Sdiv, Udiv, And,
        Ands, Andi, Andis, Orr, Orri, Eor, Eori, Lsl, Lsr, B, BRel, Bl, Br, Cbnz, Cbz, CbnzRel,
        CbzRel, Svc, Ldxr, Stxr, Ldur, Stur, Lda, Movz, Movk, Ldurb, Ldurh, Sturb, Sturh, Fadds,
        Fsubs, Fmuls, Fdivs, Faddd, Fsubd, Fmuld, Fdivd, Ldurs, Ldurd, Sturs, Sturd, Fcmps, Fcmpd,
    ];
    all.extend(
        [
            Condition::Eq,
            Condition::Ne,
            Condition::Cs,
            Condition::Cc,
            Condition::Mi,
            Condition::Pl,
            Condition::Vs,
            Condition::Vc,
            Condition::Hi,
            Condition::Ls,
            Condition::Ge,
            Condition::Lt,
            Condition::Gt,
            Condition::Le,
            Condition::Al,
        ]
        .map(BCond),
    );
    for a in all {
        assert!(CATALOG.iter().any(|d| d.action == a), "{a:?} missing");
    }
}
