//! Instruction decoder producing assembly text and control flow.
//!
//! Decodes enough of each instruction to print it and to classify how control
//! leaves it. Branch and jump targets are resolved against the program counter.

use std::fmt;

use crate::Xlen;
use crate::registers::{creg_name, reg_name};

/// How control leaves a decoded instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    /// Falls through to the next instruction.
    Next,
    /// Unconditional direct jump.
    Jump(u64),
    /// Direct call; returns to the next instruction.
    Call(u64),
    /// Conditional branch to the target, otherwise falls through.
    Branch(u64),
    /// Register-indirect call; only the return point is known.
    IndirectCall,
    /// Register-indirect jump with an unknown destination.
    IndirectJump,
    Return,
    /// Traps or trap returns: no static successor.
    Halt,
}

/// One decoded instruction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Decoded {
    pub size: u8,
    pub text: String,
    pub flow: Flow,
}

impl Decoded {
    const fn new(size: u8, text: String, flow: Flow) -> Self {
        Self { size, text, flow }
    }

    const fn next(size: u8, text: String) -> Self {
        Self::new(size, text, Flow::Next)
    }
}

impl fmt::Display for Decoded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Decode `raw` at `pc`.
///
/// The two low bits select the length: `0b11` is a 32-bit instruction, any
/// other value a 16-bit compressed one whose upper half of `raw` is ignored.
/// Returns `None` for encodings that are reserved, illegal or unsupported.
#[must_use]
pub fn decode(raw: u32, pc: u64, xlen: Xlen) -> Option<Decoded> {
    if raw & 0x3 == 0x3 {
        decode_standard(raw, pc, xlen)
    } else {
        let [lo, hi, ..] = raw.to_le_bytes();
        decode_compressed(u16::from_le_bytes([lo, hi]), pc, xlen)
    }
}

#[allow(clippy::too_many_lines)]
fn decode_standard(raw: u32, pc: u64, xlen: Xlen) -> Option<Decoded> {
    let opcode = raw & 0x7F;
    let rd = (raw >> 7) & 0x1F;
    let rs1 = (raw >> 15) & 0x1F;
    let rs2 = (raw >> 20) & 0x1F;
    let funct3 = (raw >> 12) & 0x7;
    let funct7 = (raw >> 25) & 0x7F;
    let rv64 = xlen == Xlen::Rv64;

    let decoded = match opcode {
        0b011_0111 => Decoded::next(4, format!("lui {}, {:#x}", reg_name(rd), raw >> 12)),
        0b001_0111 => Decoded::next(4, format!("auipc {}, {:#x}", reg_name(rd), raw >> 12)),
        0b110_1111 => {
            let target = xlen.offset(pc, decode_j_imm(raw));
            if rd == 0 {
                Decoded::new(4, format!("j {target:#x}"), Flow::Jump(target))
            } else {
                Decoded::new(4, format!("jal {}, {target:#x}", reg_name(rd)), Flow::Call(target))
            }
        }
        0b110_0111 if funct3 == 0 => {
            let imm = decode_i_imm(raw);
            match (rd, rs1, imm) {
                (0, 1, 0) => Decoded::new(4, "ret".to_string(), Flow::Return),
                (0, _, _) => Decoded::new(
                    4,
                    format!("jr {imm}({})", reg_name(rs1)),
                    Flow::IndirectJump,
                ),
                _ => Decoded::new(
                    4,
                    format!("jalr {}, {imm}({})", reg_name(rd), reg_name(rs1)),
                    Flow::IndirectCall,
                ),
            }
        }
        0b110_0011 => {
            let mnemonic = match funct3 {
                0 => "beq",
                1 => "bne",
                4 => "blt",
                5 => "bge",
                6 => "bltu",
                7 => "bgeu",
                _ => return None,
            };
            let target = xlen.offset(pc, decode_b_imm(raw));
            Decoded::new(
                4,
                format!("{mnemonic} {}, {}, {target:#x}", reg_name(rs1), reg_name(rs2)),
                Flow::Branch(target),
            )
        }
        0b000_0011 => {
            let mnemonic = match (funct3, rv64) {
                (0, _) => "lb",
                (1, _) => "lh",
                (2, _) => "lw",
                (3, true) => "ld",
                (4, _) => "lbu",
                (5, _) => "lhu",
                (6, true) => "lwu",
                _ => return None,
            };
            Decoded::next(
                4,
                format!("{mnemonic} {}, {}({})", reg_name(rd), decode_i_imm(raw), reg_name(rs1)),
            )
        }
        0b010_0011 => {
            let mnemonic = match (funct3, rv64) {
                (0, _) => "sb",
                (1, _) => "sh",
                (2, _) => "sw",
                (3, true) => "sd",
                _ => return None,
            };
            Decoded::next(
                4,
                format!("{mnemonic} {}, {}({})", reg_name(rs2), decode_s_imm(raw), reg_name(rs1)),
            )
        }
        0b001_0011 => decode_op_imm(raw, rd, rs1, funct3, rv64)?,
        0b001_1011 if rv64 => decode_op_imm_32(raw, rd, rs1, funct3)?,
        0b011_0011 => {
            let mnemonic = match (funct7, funct3) {
                (0x00, 0) => "add",
                (0x20, 0) => "sub",
                (0x00, 1) => "sll",
                (0x00, 2) => "slt",
                (0x00, 3) => "sltu",
                (0x00, 4) => "xor",
                (0x00, 5) => "srl",
                (0x20, 5) => "sra",
                (0x00, 6) => "or",
                (0x00, 7) => "and",
                (0x01, 0) => "mul",
                (0x01, 1) => "mulh",
                (0x01, 2) => "mulhsu",
                (0x01, 3) => "mulhu",
                (0x01, 4) => "div",
                (0x01, 5) => "divu",
                (0x01, 6) => "rem",
                (0x01, 7) => "remu",
                _ => return None,
            };
            format_r(mnemonic, rd, rs1, rs2)
        }
        0b011_1011 if rv64 => {
            let mnemonic = match (funct7, funct3) {
                (0x00, 0) => "addw",
                (0x20, 0) => "subw",
                (0x00, 1) => "sllw",
                (0x00, 5) => "srlw",
                (0x20, 5) => "sraw",
                (0x01, 0) => "mulw",
                (0x01, 4) => "divw",
                (0x01, 5) => "divuw",
                (0x01, 6) => "remw",
                (0x01, 7) => "remuw",
                _ => return None,
            };
            format_r(mnemonic, rd, rs1, rs2)
        }
        0b000_1111 => match funct3 {
            0 => Decoded::next(4, "fence".to_string()),
            1 => Decoded::next(4, "fence.i".to_string()),
            _ => return None,
        },
        0b111_0011 => decode_system(raw, rd, rs1, funct3)?,
        0b010_1111 => decode_amo(raw, rd, rs1, rs2, funct3, rv64)?,
        _ => return None,
    };
    Some(decoded)
}

fn format_r(mnemonic: &str, rd: u32, rs1: u32, rs2: u32) -> Decoded {
    Decoded::next(
        4,
        format!("{mnemonic} {}, {}, {}", reg_name(rd), reg_name(rs1), reg_name(rs2)),
    )
}

fn decode_op_imm(raw: u32, rd: u32, rs1: u32, funct3: u32, rv64: bool) -> Option<Decoded> {
    let imm = decode_i_imm(raw);
    let text = match funct3 {
        0 if rd == 0 && rs1 == 0 && imm == 0 => "nop".to_string(),
        0 if rs1 == 0 => format!("li {}, {imm}", reg_name(rd)),
        0 if imm == 0 => format!("mv {}, {}", reg_name(rd), reg_name(rs1)),
        0 => format!("addi {}, {}, {imm}", reg_name(rd), reg_name(rs1)),
        2 => format!("slti {}, {}, {imm}", reg_name(rd), reg_name(rs1)),
        3 => format!("sltiu {}, {}, {imm}", reg_name(rd), reg_name(rs1)),
        4 => format!("xori {}, {}, {imm}", reg_name(rd), reg_name(rs1)),
        6 => format!("ori {}, {}, {imm}", reg_name(rd), reg_name(rs1)),
        7 => format!("andi {}, {}, {imm}", reg_name(rd), reg_name(rs1)),
        1 | 5 => {
            // RV64 widens the shift amount into the low funct7 bit.
            let (shamt, high, arithmetic) = if rv64 {
                ((raw >> 20) & 0x3F, raw >> 26, 0x10)
            } else {
                ((raw >> 20) & 0x1F, raw >> 25, 0x20)
            };
            let mnemonic = match (funct3, high) {
                (1, 0) => "slli",
                (5, 0) => "srli",
                (5, h) if h == arithmetic => "srai",
                _ => return None,
            };
            format!("{mnemonic} {}, {}, {shamt}", reg_name(rd), reg_name(rs1))
        }
        _ => return None,
    };
    Some(Decoded::next(4, text))
}

fn decode_op_imm_32(raw: u32, rd: u32, rs1: u32, funct3: u32) -> Option<Decoded> {
    let imm = decode_i_imm(raw);
    let shamt = (raw >> 20) & 0x1F;
    let text = match (funct3, raw >> 25) {
        (0, _) if imm == 0 => format!("sext.w {}, {}", reg_name(rd), reg_name(rs1)),
        (0, _) => format!("addiw {}, {}, {imm}", reg_name(rd), reg_name(rs1)),
        (1, 0x00) => format!("slliw {}, {}, {shamt}", reg_name(rd), reg_name(rs1)),
        (5, 0x00) => format!("srliw {}, {}, {shamt}", reg_name(rd), reg_name(rs1)),
        (5, 0x20) => format!("sraiw {}, {}, {shamt}", reg_name(rd), reg_name(rs1)),
        _ => return None,
    };
    Some(Decoded::next(4, text))
}

fn decode_system(raw: u32, rd: u32, rs1: u32, funct3: u32) -> Option<Decoded> {
    let decoded = match raw {
        0x0000_0073 => Decoded::next(4, "ecall".to_string()),
        0x0010_0073 => Decoded::new(4, "ebreak".to_string(), Flow::Halt),
        0x1020_0073 => Decoded::new(4, "sret".to_string(), Flow::Halt),
        0x3020_0073 => Decoded::new(4, "mret".to_string(), Flow::Halt),
        0x1050_0073 => Decoded::next(4, "wfi".to_string()),
        // csrrw zero, cycle, zero
        0xC000_1073 => Decoded::new(4, "unimp".to_string(), Flow::Halt),
        _ => {
            let csr = raw >> 20;
            let text = match funct3 {
                1 => format!("csrrw {}, {csr:#x}, {}", reg_name(rd), reg_name(rs1)),
                2 => format!("csrrs {}, {csr:#x}, {}", reg_name(rd), reg_name(rs1)),
                3 => format!("csrrc {}, {csr:#x}, {}", reg_name(rd), reg_name(rs1)),
                5 => format!("csrrwi {}, {csr:#x}, {rs1}", reg_name(rd)),
                6 => format!("csrrsi {}, {csr:#x}, {rs1}", reg_name(rd)),
                7 => format!("csrrci {}, {csr:#x}, {rs1}", reg_name(rd)),
                _ => return None,
            };
            Decoded::next(4, text)
        }
    };
    Some(decoded)
}

fn decode_amo(raw: u32, rd: u32, rs1: u32, rs2: u32, funct3: u32, rv64: bool) -> Option<Decoded> {
    let width = match (funct3, rv64) {
        (2, _) => "w",
        (3, true) => "d",
        _ => return None,
    };
    let mnemonic = match raw >> 27 {
        0x02 if rs2 == 0 => {
            return Some(Decoded::next(
                4,
                format!("lr.{width} {}, ({})", reg_name(rd), reg_name(rs1)),
            ));
        }
        0x03 => "sc",
        0x01 => "amoswap",
        0x00 => "amoadd",
        0x04 => "amoxor",
        0x0C => "amoand",
        0x08 => "amoor",
        0x10 => "amomin",
        0x14 => "amomax",
        0x18 => "amominu",
        0x1C => "amomaxu",
        _ => return None,
    };
    Some(Decoded::next(
        4,
        format!(
            "{mnemonic}.{width} {}, {}, ({})",
            reg_name(rd),
            reg_name(rs2),
            reg_name(rs1)
        ),
    ))
}

fn decode_compressed(raw: u16, pc: u64, xlen: Xlen) -> Option<Decoded> {
    if raw == 0 {
        return None;
    }
    let funct3 = u32::from((raw >> 13) & 0x7);
    match raw & 0x3 {
        0 => decode_c_quadrant0(raw, funct3, xlen),
        1 => decode_c_quadrant1(raw, funct3, pc, xlen),
        2 => decode_c_quadrant2(raw, funct3, xlen),
        _ => None,
    }
}

fn decode_c_quadrant0(raw: u16, funct3: u32, xlen: Xlen) -> Option<Decoded> {
    let bits = u32::from(raw);
    let rd = creg_name(bits >> 2);
    let rs1 = creg_name(bits >> 7);
    let freg = ((bits >> 2) & 0x7) + 8;
    let rv64 = xlen == Xlen::Rv64;

    let text = match funct3 {
        0b000 => {
            let imm = decode_addi4spn_imm(raw);
            if imm == 0 {
                return None;
            }
            format!("c.addi4spn {rd}, sp, {imm}")
        }
        0b001 => format!("c.fld f{freg}, {}({rs1})", decode_cl_ld_offset(raw)),
        0b010 => format!("c.lw {rd}, {}({rs1})", decode_cl_lw_offset(raw)),
        0b011 if rv64 => format!("c.ld {rd}, {}({rs1})", decode_cl_ld_offset(raw)),
        0b011 => format!("c.flw f{freg}, {}({rs1})", decode_cl_lw_offset(raw)),
        0b101 => format!("c.fsd f{freg}, {}({rs1})", decode_cl_ld_offset(raw)),
        0b110 => format!("c.sw {rd}, {}({rs1})", decode_cl_lw_offset(raw)),
        0b111 if rv64 => format!("c.sd {rd}, {}({rs1})", decode_cl_ld_offset(raw)),
        0b111 => format!("c.fsw f{freg}, {}({rs1})", decode_cl_lw_offset(raw)),
        _ => return None,
    };
    Some(Decoded::next(2, text))
}

fn decode_c_quadrant1(raw: u16, funct3: u32, pc: u64, xlen: Xlen) -> Option<Decoded> {
    let bits = u32::from(raw);
    let rd = (bits >> 7) & 0x1F;
    let rv64 = xlen == Xlen::Rv64;

    let decoded = match funct3 {
        0b000 if rd == 0 => Decoded::next(2, "c.nop".to_string()),
        0b000 => Decoded::next(2, format!("c.addi {}, {}", reg_name(rd), decode_ci_imm(raw))),
        0b001 if rv64 => {
            if rd == 0 {
                return None;
            }
            Decoded::next(2, format!("c.addiw {}, {}", reg_name(rd), decode_ci_imm(raw)))
        }
        0b001 => {
            let target = xlen.offset(pc, decode_cj_imm(raw));
            Decoded::new(2, format!("c.jal {target:#x}"), Flow::Call(target))
        }
        0b010 => Decoded::next(2, format!("c.li {}, {}", reg_name(rd), decode_ci_imm(raw))),
        0b011 if rd == 2 => {
            let imm = decode_ci16sp_imm(raw);
            if imm == 0 {
                return None;
            }
            Decoded::next(2, format!("c.addi16sp sp, {imm}"))
        }
        0b011 => {
            let imm = decode_ci_lui_imm(raw);
            if imm == 0 {
                return None;
            }
            let upper = (imm.cast_unsigned() >> 12) & 0xF_FFFF;
            Decoded::next(2, format!("c.lui {}, {upper:#x}", reg_name(rd)))
        }
        0b100 => {
            let rd = creg_name(bits >> 7);
            let rs2 = creg_name(bits >> 2);
            let shamt = (((bits >> 12) & 0x1) << 5) | ((bits >> 2) & 0x1F);
            let text = match ((bits >> 10) & 0x3, (bits >> 12) & 0x1, (bits >> 5) & 0x3) {
                (0b00, _, _) => format!("c.srli {rd}, {shamt}"),
                (0b01, _, _) => format!("c.srai {rd}, {shamt}"),
                (0b10, _, _) => format!("c.andi {rd}, {}", decode_ci_imm(raw)),
                (0b11, 0, 0b00) => format!("c.sub {rd}, {rs2}"),
                (0b11, 0, 0b01) => format!("c.xor {rd}, {rs2}"),
                (0b11, 0, 0b10) => format!("c.or {rd}, {rs2}"),
                (0b11, 0, 0b11) => format!("c.and {rd}, {rs2}"),
                (0b11, 1, 0b00) if rv64 => format!("c.subw {rd}, {rs2}"),
                (0b11, 1, 0b01) if rv64 => format!("c.addw {rd}, {rs2}"),
                _ => return None,
            };
            Decoded::next(2, text)
        }
        0b101 => {
            let target = xlen.offset(pc, decode_cj_imm(raw));
            Decoded::new(2, format!("c.j {target:#x}"), Flow::Jump(target))
        }
        _ => {
            let mnemonic = if funct3 == 0b110 { "c.beqz" } else { "c.bnez" };
            let target = xlen.offset(pc, decode_cb_imm(raw));
            Decoded::new(
                2,
                format!("{mnemonic} {}, {target:#x}", creg_name(bits >> 7)),
                Flow::Branch(target),
            )
        }
    };
    Some(decoded)
}

fn decode_c_quadrant2(raw: u16, funct3: u32, xlen: Xlen) -> Option<Decoded> {
    let bits = u32::from(raw);
    let rd = (bits >> 7) & 0x1F;
    let rs2 = (bits >> 2) & 0x1F;
    let rv64 = xlen == Xlen::Rv64;

    let decoded = match funct3 {
        0b000 => {
            let shamt = (((bits >> 12) & 0x1) << 5) | rs2;
            Decoded::next(2, format!("c.slli {}, {shamt}", reg_name(rd)))
        }
        0b001 => Decoded::next(2, format!("c.fldsp f{rd}, {}(sp)", decode_ci_ldsp_offset(raw))),
        0b010 if rd != 0 => Decoded::next(
            2,
            format!("c.lwsp {}, {}(sp)", reg_name(rd), decode_ci_lwsp_offset(raw)),
        ),
        0b011 if rv64 && rd != 0 => Decoded::next(
            2,
            format!("c.ldsp {}, {}(sp)", reg_name(rd), decode_ci_ldsp_offset(raw)),
        ),
        0b011 if !rv64 => Decoded::next(2, format!("c.flwsp f{rd}, {}(sp)", decode_ci_lwsp_offset(raw))),
        0b100 => match ((bits >> 12) & 0x1, rd, rs2) {
            (0, 0, 0) => return None,
            (0, 1, 0) => Decoded::new(2, "c.jr ra".to_string(), Flow::Return),
            (0, rs1, 0) => Decoded::new(2, format!("c.jr {}", reg_name(rs1)), Flow::IndirectJump),
            (0, rd, rs2) => Decoded::next(2, format!("c.mv {}, {}", reg_name(rd), reg_name(rs2))),
            (_, 0, 0) => Decoded::new(2, "c.ebreak".to_string(), Flow::Halt),
            (_, rs1, 0) => Decoded::new(2, format!("c.jalr {}", reg_name(rs1)), Flow::IndirectCall),
            (_, rd, rs2) => Decoded::next(2, format!("c.add {}, {}", reg_name(rd), reg_name(rs2))),
        },
        0b101 => Decoded::next(2, format!("c.fsdsp f{rs2}, {}(sp)", decode_css_sdsp_offset(raw))),
        0b110 => Decoded::next(
            2,
            format!("c.swsp {}, {}(sp)", reg_name(rs2), decode_css_swsp_offset(raw)),
        ),
        0b111 if rv64 => Decoded::next(
            2,
            format!("c.sdsp {}, {}(sp)", reg_name(rs2), decode_css_sdsp_offset(raw)),
        ),
        0b111 => Decoded::next(2, format!("c.fswsp f{rs2}, {}(sp)", decode_css_swsp_offset(raw))),
        _ => return None,
    };
    Some(decoded)
}

const fn decode_i_imm(instr: u32) -> i32 {
    instr.cast_signed() >> 20
}

const fn decode_s_imm(instr: u32) -> i32 {
    let imm_11_5 = (instr >> 25) & 0x7F;
    let imm_4_0 = (instr >> 7) & 0x1F;
    let imm = (imm_11_5 << 5) | imm_4_0;
    (imm.cast_signed() << 20) >> 20
}

const fn decode_b_imm(instr: u32) -> i32 {
    let imm_12 = (instr >> 31) & 0x1;
    let imm_11 = (instr >> 7) & 0x1;
    let imm_10_5 = (instr >> 25) & 0x3F;
    let imm_4_1 = (instr >> 8) & 0xF;
    let imm = (imm_12 << 12) | (imm_11 << 11) | (imm_10_5 << 5) | (imm_4_1 << 1);
    (imm.cast_signed() << 19) >> 19
}

const fn decode_j_imm(instr: u32) -> i32 {
    let imm_20 = (instr >> 31) & 0x1;
    let imm_19_12 = (instr >> 12) & 0xFF;
    let imm_11 = (instr >> 20) & 0x1;
    let imm_10_1 = (instr >> 21) & 0x3FF;
    let imm = (imm_20 << 20) | (imm_19_12 << 12) | (imm_11 << 11) | (imm_10_1 << 1);
    (imm.cast_signed() << 11) >> 11
}

// Compressed immediates

fn decode_ci_imm(raw: u16) -> i32 {
    let imm_5 = u32::from((raw >> 12) & 0x1);
    let imm_4_0 = u32::from((raw >> 2) & 0x1F);
    let imm = (imm_5 << 5) | imm_4_0;
    (imm.cast_signed() << 26) >> 26
}

fn decode_ci_lui_imm(raw: u16) -> i32 {
    let imm_17 = u32::from((raw >> 12) & 0x1);
    let imm_16_12 = u32::from((raw >> 2) & 0x1F);
    let imm = (imm_17 << 17) | (imm_16_12 << 12);
    (imm.cast_signed() << 14) >> 14
}

fn decode_ci16sp_imm(raw: u16) -> i32 {
    let imm_9 = u32::from((raw >> 12) & 0x1);
    let imm_4 = u32::from((raw >> 6) & 0x1);
    let imm_6 = u32::from((raw >> 5) & 0x1);
    let imm_8_7 = u32::from((raw >> 3) & 0x3);
    let imm_5 = u32::from((raw >> 2) & 0x1);
    let imm = (imm_9 << 9) | (imm_8_7 << 7) | (imm_6 << 6) | (imm_5 << 5) | (imm_4 << 4);
    (imm.cast_signed() << 22) >> 22
}

fn decode_ci_lwsp_offset(raw: u16) -> u32 {
    let bits = u32::from(raw);
    let imm_5 = (bits >> 12) & 0x1;
    let imm_4_2 = (bits >> 4) & 0x7;
    let imm_7_6 = (bits >> 2) & 0x3;
    (imm_7_6 << 6) | (imm_5 << 5) | (imm_4_2 << 2)
}

fn decode_ci_ldsp_offset(raw: u16) -> u32 {
    let bits = u32::from(raw);
    let imm_5 = (bits >> 12) & 0x1;
    let imm_4_3 = (bits >> 5) & 0x3;
    let imm_8_6 = (bits >> 2) & 0x7;
    (imm_8_6 << 6) | (imm_5 << 5) | (imm_4_3 << 3)
}

fn decode_css_swsp_offset(raw: u16) -> u32 {
    let bits = u32::from(raw);
    let imm_5_2 = (bits >> 9) & 0xF;
    let imm_7_6 = (bits >> 7) & 0x3;
    (imm_7_6 << 6) | (imm_5_2 << 2)
}

fn decode_css_sdsp_offset(raw: u16) -> u32 {
    let bits = u32::from(raw);
    let imm_5_3 = (bits >> 10) & 0x7;
    let imm_8_6 = (bits >> 7) & 0x7;
    (imm_8_6 << 6) | (imm_5_3 << 3)
}

fn decode_cj_imm(raw: u16) -> i32 {
    let bits = u32::from(raw);
    let imm_11 = (bits >> 12) & 0x1;
    let imm_4 = (bits >> 11) & 0x1;
    let imm_9_8 = (bits >> 9) & 0x3;
    let imm_10 = (bits >> 8) & 0x1;
    let imm_6 = (bits >> 7) & 0x1;
    let imm_7 = (bits >> 6) & 0x1;
    let imm_3_1 = (bits >> 3) & 0x7;
    let imm_5 = (bits >> 2) & 0x1;
    let imm = (imm_11 << 11)
        | (imm_10 << 10)
        | (imm_9_8 << 8)
        | (imm_7 << 7)
        | (imm_6 << 6)
        | (imm_5 << 5)
        | (imm_4 << 4)
        | (imm_3_1 << 1);
    (imm.cast_signed() << 20) >> 20
}

fn decode_cb_imm(raw: u16) -> i32 {
    let bits = u32::from(raw);
    let imm_8 = (bits >> 12) & 0x1;
    let imm_4_3 = (bits >> 10) & 0x3;
    let imm_7_6 = (bits >> 5) & 0x3;
    let imm_2_1 = (bits >> 3) & 0x3;
    let imm_5 = (bits >> 2) & 0x1;
    let imm = (imm_8 << 8) | (imm_7_6 << 6) | (imm_5 << 5) | (imm_4_3 << 3) | (imm_2_1 << 1);
    (imm.cast_signed() << 23) >> 23
}

fn decode_addi4spn_imm(raw: u16) -> u32 {
    let bits = u32::from(raw);
    let imm_5_4 = (bits >> 11) & 0x3;
    let imm_9_6 = (bits >> 7) & 0xF;
    let imm_2 = (bits >> 6) & 0x1;
    let imm_3 = (bits >> 5) & 0x1;
    (imm_9_6 << 6) | (imm_5_4 << 4) | (imm_3 << 3) | (imm_2 << 2)
}

fn decode_cl_lw_offset(raw: u16) -> u32 {
    let bits = u32::from(raw);
    let imm_5_3 = (bits >> 10) & 0x7;
    let imm_2 = (bits >> 6) & 0x1;
    let imm_6 = (bits >> 5) & 0x1;
    (imm_6 << 6) | (imm_5_3 << 3) | (imm_2 << 2)
}

fn decode_cl_ld_offset(raw: u16) -> u32 {
    let bits = u32::from(raw);
    let imm_5_3 = (bits >> 10) & 0x7;
    let imm_7_6 = (bits >> 5) & 0x3;
    (imm_7_6 << 6) | (imm_5_3 << 3)
}
