pub mod listing;
pub mod model;

pub use listing::{disassemble, opcode_rows, render_text, Line, OpcodeRow};
pub use model::{load_raw_bin, Image, Segment};
