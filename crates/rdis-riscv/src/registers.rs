/// Get register ABI name.
#[must_use]
pub const fn reg_name(reg: u32) -> &'static str {
    match reg {
        0 => "zero",
        1 => "ra",
        2 => "sp",
        3 => "gp",
        4 => "tp",
        5 => "t0",
        6 => "t1",
        7 => "t2",
        8 => "s0",
        9 => "s1",
        10 => "a0",
        11 => "a1",
        12 => "a2",
        13 => "a3",
        14 => "a4",
        15 => "a5",
        16 => "a6",
        17 => "a7",
        18 => "s2",
        19 => "s3",
        20 => "s4",
        21 => "s5",
        22 => "s6",
        23 => "s7",
        24 => "s8",
        25 => "s9",
        26 => "s10",
        27 => "s11",
        28 => "t3",
        29 => "t4",
        30 => "t5",
        31 => "t6",
        _ => "??",
    }
}

/// Name of a three-bit compressed register field (x8..x15).
#[must_use]
pub(crate) const fn creg_name(field: u32) -> &'static str {
    reg_name((field & 0x7) + 8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reg_names() {
        assert_eq!(reg_name(0), "zero");
        assert_eq!(reg_name(2), "sp");
        assert_eq!(reg_name(31), "t6");
        assert_eq!(reg_name(32), "??");
        assert_eq!(creg_name(0), "s0");
        assert_eq!(creg_name(2), "a0");
    }
}
