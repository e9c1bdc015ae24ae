use legv8_sim::{Format, InstructionSet};
use pretty_assertions::assert_eq;

fn syntaxes(v: Vec<&'static legv8_sim::Descriptor>) -> Vec<&'static str> {
    v.into_iter().map(|d| d.syntax).collect()
}

#[test]
fn mnemonic_lookup_ignores_case() {
    let set = InstructionSet::new().unwrap();
    assert_eq!(syntaxes(set.match_mnemonic("add")), ["ADD X1,X2,X3"]);
    assert_eq!(syntaxes(set.match_mnemonic("NOP")), ["nop"]);
    assert!(set.match_mnemonic("nope").is_empty());
}

#[test]
fn overloaded_mnemonics_return_every_form() {
    let set = InstructionSet::new().unwrap();
    assert_eq!(syntaxes(set.match_mnemonic("B")), ["B target", "B -100"]);
    let al = set.match_mnemonic("b.al");
    assert_eq!(syntaxes(al.clone()), ["B.AL target", "B.AL -100"]);
    assert_eq!(al[0].format, Format::J);
    assert_eq!(syntaxes(set.match_mnemonic("CBZ")), ["CBZ X1,label", "CBZ X1,-100"]);
    assert_eq!(syntaxes(set.match_mnemonic("cbnz")), ["CBNZ X1,label", "CBNZ X1,-100"]);
    assert_eq!(syntaxes(set.match_mnemonic("MOVZ")), ["MOVZ X1,100,LSL 0", "MOVZ X1,100,0"]);
    assert_eq!(syntaxes(set.match_mnemonic("MOVK")), ["MOVK X1,100,LSL 0", "MOVK X1,100,0"]);
}

#[test]
fn prefix_lookup() {
    let set = InstructionSet::new().unwrap();
    assert_eq!(
        syntaxes(set.match_mnemonic_prefix("add")),
        ["ADD X1,X2,X3", "ADDS X1,X2,X3", "ADDI X1,X2,100", "ADDIS X1,X2,100"]
    );
    assert_eq!(set.match_mnemonic_prefix("B.").len(), 18);
    assert_eq!(set.match_mnemonic_prefix("LDUR").len(), 5);
    assert_eq!(set.match_mnemonic_prefix("").len(), set.instructions().len());
}
