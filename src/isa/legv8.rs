//! LEGv8 instruction catalog.
//!
//! Field letters: `d` destination or transfer register, `n` first source or
//! base register, `m` second source, `s` shift amount or status register,
//! `t` stored register, `i` immediate/offset/target, `l` move-wide lane.
//! Operands are decoded in order of first appearance, so each template lists
//! its fields in the same order as the example syntax.

use crate::branch::Condition;
use crate::instructions::Action::{self, *};
use crate::instructions::Descriptor;
use crate::instructions::Format::{self, IBranch, I, J, R};

const fn op(
    syntax: &'static str,
    description: &'static str,
    format: Format,
    template: &'static str,
    action: Action,
) -> Descriptor {
    Descriptor::new(syntax, description, format, template, action)
}

pub static CATALOG: &[Descriptor] = &[
    op("nop", "Null operation : machine code is all zeroes", R,
       "00000000000000000000000000000000", Nop),

    // ---- integer arithmetic ----
    op("ADD X1,X2,X3", "Addition with overflow : set X1 to (X2 plus X3)", R,
       "000000dddddnnnnnmmmmm00000100000", Add),
    op("ADDS X1,X2,X3", "Add and set flags : set X1 to (X2 plus X3), and set the processor flags", R,
       "000000dddddnnnnnmmmmm00000100001", Adds),
    op("SUB X1,X2,X3", "Subtraction with overflow : set X1 to (X2 minus X3)", R,
       "000000dddddnnnnnmmmmm00000100010", Sub),
    op("SUBS X1,X2,X3", "Subtract and set flags : set X1 to (X2 minus X3), and set the processor flags", R,
       "000000dddddnnnnnmmmmm00000100011", Subs),
    op("ADDI X1,X2,100", "Addition immediate with overflow : set X1 to (X2 plus sign-extended 16-bit immediate)", I,
       "001000dddddnnnnniiiiiiiiiiiiiiii", Addi),
    op("ADDIS X1,X2,100", "Add an immediate and set flags : set X1 to (X2 plus sign-extended 16-bit immediate), and set the processor flags", I,
       "001001dddddnnnnniiiiiiiiiiiiiiii", Addis),
    op("SUBI X1,X2,100", "Subtraction immediate with overflow : set X1 to (X2 minus sign-extended 16-bit immediate)", I,
       "001010dddddnnnnniiiiiiiiiiiiiiii", Subi),
    op("SUBIS X1,X2,100", "Subtract an immediate and set flags : set X1 to (X2 minus sign-extended 16-bit immediate), and set the processor flags", I,
       "001011dddddnnnnniiiiiiiiiiiiiiii", Subis),
    op("MUL X1,X2,X3", "Multiplication without overflow : set X1 to low-order 32 bits of the product of X2 and X3", R,
       "011100dddddnnnnnmmmmm00000000010", Mul),
    op("SMULH X1,X2,X3", "Signed multiplication high : set X1 to high-order 32 bits of the product of X2 and X3", R,
       "011100dddddnnnnnmmmmm00000000011", Smulh),
    op("UMULH X1,X2,X3", "Unsigned multiplication high : set X1 to high-order 32 bits of the product of unsigned X2 and X3", R,
       "011100dddddnnnnnmmmmm00000000100", Umulh),
    op("SDIV X1,X2,X3", "Division : divide X2 by X3 then set X1 to the quotient (no effect when X3 is zero)", R,
       "011100dddddnnnnnmmmmm00000011010", Sdiv),
    op("UDIV X1,X2,X3", "Division unsigned : divide unsigned X2 by X3 then set X1 to the quotient (no effect when X3 is zero)", R,
       "011100dddddnnnnnmmmmm00000011011", Udiv),

    // ---- logical and shifts ----
    op("AND X1,X2,X3", "Bitwise AND : set X1 to bitwise AND of X2 and X3", R,
       "000000dddddnnnnnmmmmm00000100100", And),
    op("ANDS X1,X2,X3", "Bitwise AND and set flags : set X1 to bitwise AND of X2 and X3, then set Negative and Zero without touching Carry or oVerflow", R,
       "000000dddddnnnnnmmmmm00000100111", Ands),
    op("ANDI X1,X2,100", "Bitwise AND immediate : set X1 to bitwise AND of X2 and zero-extended 16-bit immediate", I,
       "001100dddddnnnnniiiiiiiiiiiiiiii", Andi),
    op("ANDIS X1,X2,100", "Bitwise AND immediate and set flags : set X1 to bitwise AND of X2 and zero-extended 16-bit immediate, then set Negative and Zero", I,
       "010000dddddnnnnniiiiiiiiiiiiiiii", Andis),
    op("ORR X1,X2,X3", "Bitwise OR : set X1 to bitwise OR of X2 and X3", R,
       "000000dddddnnnnnmmmmm00000100101", Orr),
    op("ORRI X1,X2,100", "Bitwise OR immediate : set X1 to bitwise OR of X2 and zero-extended 16-bit immediate", I,
       "001101dddddnnnnniiiiiiiiiiiiiiii", Orri),
    op("EOR X1,X2,X3", "Bitwise XOR (exclusive OR) : set X1 to bitwise XOR of X2 and X3", R,
       "000000dddddnnnnnmmmmm00000100110", Eor),
    op("EORI X1,X2,100", "Bitwise XOR immediate : set X1 to bitwise XOR of X2 and zero-extended 16-bit immediate", I,
       "001110dddddnnnnniiiiiiiiiiiiiiii", Eori),
    op("LSL X1,X2,10", "Logical shift left : set X1 to X2 shifted left by the immediate", R,
       "000000dddddnnnnn00000sssss000000", Lsl),
    op("LSR X1,X2,10", "Logical shift right : set X1 to X2 shifted right by the immediate, zero-filling", R,
       "000000dddddnnnnn00000sssss000010", Lsr),

    // ---- control flow ----
    op("B target", "Branch unconditionally : jump to statement at target address", J,
       "000010iiiiiiiiiiiiiiiiiiiiiiiiii", B),
    op("B -100", "Branch unconditionally : jump a number of instructions forward equal to the immediate", R,
       "000101iiiiiiiiiiiiiiiiiiiiiiiiii", BRel),
    op("B.AL target", "Branch always : jump to statement at target address", J,
       "01010001110iiiiiiiiiiiiiiiiiiiii", BCond(Condition::Al)),
    op("B.AL -100", "Branch always : jump a number of instructions forward equal to the immediate", R,
       "000111iiiiiiiiiiiiiiiiiiiiiiiiii", BRel),
    op("BL target", "Branch with link : set X30 to the return address then jump to statement at target address", J,
       "000011iiiiiiiiiiiiiiiiiiiiiiiiii", Bl),
    op("BR X1", "Branch register : jump to statement whose address is in X1", R,
       "000000nnnnn000000000000000001000", Br),
    op("CBNZ X1,label", "Compare and branch not zero : branch to label if X1 is not zero", IBranch,
       "000001nnnnn00000iiiiiiiiiiiiiiii", Cbnz),
    op("CBZ X1,label", "Compare and branch zero : branch to label if X1 is zero", IBranch,
       "000001nnnnn00001iiiiiiiiiiiiiiii", Cbz),
    op("CBNZ X1,-100", "Compare and branch not zero : if X1 is not zero, jump a number of instructions forward equal to the immediate", IBranch,
       "000100nnnnn00000iiiiiiiiiiiiiiii", CbnzRel),
    op("CBZ X1,-100", "Compare and branch zero : if X1 is zero, jump a number of instructions forward equal to the immediate", IBranch,
       "000100nnnnn00001iiiiiiiiiiiiiiii", CbzRel),
    op("B.EQ target", "Branch on equal : jump to target if Zero is set", J,
       "01010000000iiiiiiiiiiiiiiiiiiiii", BCond(Condition::Eq)),
    op("B.NE target", "Branch on not equal : jump to target if Zero is clear", J,
       "01010000001iiiiiiiiiiiiiiiiiiiii", BCond(Condition::Ne)),
    op("B.CS target", "Branch on carry set : jump to target if Carry is set", J,
       "01010000010iiiiiiiiiiiiiiiiiiiii", BCond(Condition::Cs)),
    op("B.HS target", "Branch on unsigned higher or same : jump to target if Carry is set", J,
       "01010010010iiiiiiiiiiiiiiiiiiiii", BCond(Condition::Cs)),
    op("B.CC target", "Branch on carry clear : jump to target if Carry is clear", J,
       "01010000011iiiiiiiiiiiiiiiiiiiii", BCond(Condition::Cc)),
    op("B.LO target", "Branch on unsigned lower : jump to target if Carry is clear", J,
       "01010010011iiiiiiiiiiiiiiiiiiiii", BCond(Condition::Cc)),
    op("B.MI target", "Branch on minus : jump to target if Negative is set", J,
       "01010000100iiiiiiiiiiiiiiiiiiiii", BCond(Condition::Mi)),
    op("B.PL target", "Branch on plus : jump to target if Negative is clear", J,
       "01010000101iiiiiiiiiiiiiiiiiiiii", BCond(Condition::Pl)),
    op("B.VS target", "Branch on overflow set : jump to target if oVerflow is set", J,
       "01010000110iiiiiiiiiiiiiiiiiiiii", BCond(Condition::Vs)),
    op("B.VC target", "Branch on overflow clear : jump to target if oVerflow is clear", J,
       "01010000111iiiiiiiiiiiiiiiiiiiii", BCond(Condition::Vc)),
    op("B.HI target", "Branch on unsigned higher : jump to target if Carry is set and Zero is clear", J,
       "01010001000iiiiiiiiiiiiiiiiiiiii", BCond(Condition::Hi)),
    op("B.LS target", "Branch on unsigned lower or same : jump to target if Carry is clear or Zero is set", J,
       "01010001001iiiiiiiiiiiiiiiiiiiii", BCond(Condition::Ls)),
    op("B.GE target", "Branch on signed greater or equal : jump to target if Negative equals oVerflow", J,
       "01010001010iiiiiiiiiiiiiiiiiiiii", BCond(Condition::Ge)),
    op("B.LT target", "Branch on signed less than : jump to target if Negative differs from oVerflow", J,
       "01010001011iiiiiiiiiiiiiiiiiiiii", BCond(Condition::Lt)),
    op("B.GT target", "Branch on signed greater than : jump to target if Zero is clear and Negative equals oVerflow", J,
       "01010001100iiiiiiiiiiiiiiiiiiiii", BCond(Condition::Gt)),
    op("B.LE target", "Branch on signed less or equal : jump to target if Zero is set or Negative differs from oVerflow", J,
       "01010001101iiiiiiiiiiiiiiiiiiiii", BCond(Condition::Le)),
    op("SVC 0", "Issue a system call : execute the system call specified by value in X8", J,
       "010110iiiiiiiiiiiiiiiiiiiiiiiiii", Svc),

    // ---- memory and moves ----
    op("LDXR X1,[X2,-100]", "Load exclusive register : behaves as LDUR since only one processor is simulated", I,
       "110000dddddnnnnniiiiiiiiiiiiiiii", Ldxr),
    op("STXR X1,X3,[X2]", "Store exclusive register : store X1 at the address in X2, then set X3 to 0 for success", I,
       "111000tttttsssssnnnnn00000000000", Stxr),
    op("LDUR X1,[X2,-100]", "Load word : set X1 to contents of effective memory word address", I,
       "100011dddddnnnnniiiiiiiiiiiiiiii", Ldur),
    op("STUR X1,[X2,-100]", "Store word : store contents of X1 into effective memory word address", I,
       "101011dddddnnnnniiiiiiiiiiiiiiii", Stur),
    op("LDA X1,label", "Load address : set X1 to the value of the label", I,
       "011000dddddiiiiiiiiiiiiiiiiiiiii", Lda),
    op("MOVZ X1,100,LSL 0", "Move wide with zero : set one halfword of X1 to the immediate and zero the rest; LSL selects the halfword, valid inputs 0-3", I,
       "110010dddddiiiiiiiiiiiiiiiilllll", Movz),
    op("MOVK X1,100,LSL 0", "Move wide with keep : set one halfword of X1 to the immediate and keep the rest; LSL selects the halfword, valid inputs 0-3", I,
       "110011dddddiiiiiiiiiiiiiiiilllll", Movk),
    op("MOVZ X1,100,0", "Move wide with zero : as MOVZ X1,100,LSL 0 with the halfword selector written bare", I,
       "110110dddddiiiiiiiiiiiiiiiilllll", Movz),
    op("MOVK X1,100,0", "Move wide with keep : as MOVK X1,100,LSL 0 with the halfword selector written bare", I,
       "110111dddddiiiiiiiiiiiiiiiilllll", Movk),
    op("LDURB X1,[X2,-100]", "Load byte unsigned : set X1 to zero-extended 8-bit value from effective memory byte address", I,
       "100100dddddnnnnniiiiiiiiiiiiiiii", Ldurb),
    op("LDURH X1,[X2,-100]", "Load halfword unsigned : set X1 to zero-extended 16-bit value from effective memory halfword address", I,
       "100101dddddnnnnniiiiiiiiiiiiiiii", Ldurh),
    op("STURB X1,[X2,-100]", "Store byte : store the low-order 8 bits of X1 into the effective memory byte address", I,
       "101000dddddnnnnniiiiiiiiiiiiiiii", Sturb),
    op("STURH X1,[X2,-100]", "Store halfword : store the low-order 16 bits of X1 into the effective memory halfword address", I,
       "101001dddddnnnnniiiiiiiiiiiiiiii", Sturh),

    // ---- floating point ----
    op("FADDS S0,S1,S3", "Floating point addition single precision : set S0 to S1 plus S3", R,
       "01000110000dddddnnnnnmmmmm000000", Fadds),
    op("FSUBS S0,S1,S3", "Floating point subtraction single precision : set S0 to S1 minus S3", R,
       "01000110000dddddnnnnnmmmmm000001", Fsubs),
    op("FMULS S0,S1,S3", "Floating point multiplication single precision : set S0 to S1 times S3", R,
       "01000110000dddddnnnnnmmmmm000010", Fmuls),
    op("FDIVS S0,S1,S3", "Floating point division single precision : set S0 to S1 divided by S3", R,
       "01000110000dddddnnnnnmmmmm000011", Fdivs),
    op("FADDD D0,D2,D4", "Floating point addition double precision : set D0 to D2 plus D4", R,
       "01000110001dddddnnnnnmmmmm000000", Faddd),
    op("FSUBD D0,D2,D4", "Floating point subtraction double precision : set D0 to D2 minus D4", R,
       "01000110001dddddnnnnnmmmmm000001", Fsubd),
    op("FMULD D0,D2,D4", "Floating point multiplication double precision : set D0 to D2 times D4", R,
       "01000110001dddddnnnnnmmmmm000010", Fmuld),
    op("FDIVD D0,D2,D4", "Floating point division double precision : set D0 to D2 divided by D4", R,
       "01000110001dddddnnnnnmmmmm000011", Fdivd),
    op("LDURS S1,[X2,-100]", "Load floating point single : set S1 to 32-bit value from effective memory word address", I,
       "110001dddddnnnnniiiiiiiiiiiiiiii", Ldurs),
    op("LDURD D2,[X2,-100]", "Load floating point double : set D2 to 64-bit value from effective memory doubleword address", I,
       "110101dddddnnnnniiiiiiiiiiiiiiii", Ldurd),
    op("STURS S1,[X2,-100]", "Store floating point single : store 32-bit value in S1 to effective memory word address", I,
       "111001dddddnnnnniiiiiiiiiiiiiiii", Sturs),
    op("STURD D2,[X2,-100]", "Store floating point double : store 64-bit value in D2 to effective memory doubleword address", I,
       "111101dddddnnnnniiiiiiiiiiiiiiii", Sturd),
    op("FCMPS S0,S1", "Floating point compare single : equal sets Z and V, less than sets N, greater than sets V, unordered sets C", R,
       "01000110000nnnnnmmmmm00000110010", Fcmps),
    op("FCMPD D0,D2", "Floating point compare double : equal sets Z and V, less than sets N, greater than sets V, unordered sets C", R,
       "01000110001nnnnnmmmmm00000110010", Fcmpd),
];
