use super::*;
use test_case::test_case;

#[test_case(10, 3 => (3, 1) ; "ten over three")]
#[test_case(7, 7 => (1, 0) ; "exact")]
#[test_case(10, 0 => (u32::MAX, u32::MAX) ; "divide by zero")]
#[test_case(0, 5 => (0, 0) ; "zero numerator")]
fn udiv_writes_quotient_and_remainder(a: u32, b: u32) -> (u32, u32) {
    udiv(a, b)
}

#[test_case(8, 8, 0x0000_ab00 => 0xffff_ffab_u32 ; "sign extended")]
#[test_case(8, 8, 0x0000_2b00 => 0x0000_002b ; "positive field")]
#[test_case(0, 5, 0x1234_5678 => 0 ; "zero width")]
#[test_case(32, 0, 0x8000_0001 => 0 ; "width 32 masks to zero")]
#[test_case(4, 30, 0x8000_0000_u32 as i32 as u32 => 0xffff_fffe ; "field past the top")]
fn ibfe_extracts_signed(width: u32, offset: u32, src: u32) -> u32 {
    ibfe(width, offset, src as i32) as u32
}

#[test_case(8, 8, 0x0000_ab00 => 0x0000_00ab ; "no sign extension")]
#[test_case(0, 0, u32::MAX => 0 ; "zero width")]
#[test_case(16, 16, 0xdead_beef => 0x0000_dead ; "high half")]
fn ubfe_extracts_unsigned(width: u32, offset: u32, src: u32) -> u32 {
    ubfe(width, offset, src)
}

#[test_case(8, 4, 0xff, 0 => 0x0000_0ff0 ; "insert into zero")]
#[test_case(4, 0, 0xab, 0xffff_ffff => 0xffff_fffb ; "low nibble")]
#[test_case(0, 8, 0xff, 0x1234_5678 => 0x1234_5678 ; "zero width keeps base")]
fn bfi_inserts_fields(width: u32, offset: u32, insert: u32, base: u32) -> u32 {
    bfi(width, offset, insert, base)
}

#[test]
fn bfrev_round_trips_low_half() {
    // Round trip of the low 16 bits through the reversal and shift-down.
    for x in [0u32, 1, 0xffff, 0xabcd, 0x8001, 0x1234_5678] {
        let rev = x.reverse_bits();
        assert_eq!((rev >> 16).reverse_bits() >> 16, x & 0xffff, "x = {x:#x}");
    }
}

#[test_case(0x0000_0001 => 31 ; "lsb only")]
#[test_case(0x8000_0000 => 0 ; "msb only")]
#[test_case(0 => u32::MAX ; "all zero")]
#[test_case(0x0001_0000 => 15 ; "middle")]
fn firstbit_hi_is_msb_first(x: u32) -> u32 {
    firstbit_hi(x)
}

#[test_case(0x0000_0001 => 0 ; "lsb only")]
#[test_case(0x8000_0000 => 31 ; "msb only")]
#[test_case(0 => u32::MAX ; "all zero")]
fn firstbit_lo_is_lsb_first(x: u32) -> u32 {
    firstbit_lo(x)
}

#[test_case(u32::MAX => u32::MAX ; "minus one has no differing bit")]
#[test_case(0x8000_0000 => 1 ; "sign plus zeros")]
#[test_case(0x0000_00ff => 24 ; "positive")]
#[test_case(0 => u32::MAX ; "zero")]
fn firstbit_shi_inverts_negatives(x: u32) -> u32 {
    firstbit_shi(x)
}

#[test_case(u32::MAX, 1 => (0, 1) ; "carry out")]
#[test_case(1, 2 => (3, 0) ; "no carry")]
#[test_case(u32::MAX, u32::MAX => (u32::MAX - 1, 1) ; "max operands")]
fn uaddc_produces_carry(a: u32, b: u32) -> (u32, u32) {
    uaddc(a, b)
}

#[test_case(5, 3 => (2, 1) ; "no borrow")]
#[test_case(3, 5 => (0xffff_fffe, 0) ; "borrow")]
#[test_case(0, 0 => (0, 1) ; "equal")]
fn usubb_uses_the_bias_bit(a: u32, b: u32) -> (u32, u32) {
    usubb(a, b)
}

#[test]
fn compare_mask_is_all_ones() {
    assert_eq!(compare_mask(true), 0xffff_ffff);
    assert_eq!(compare_mask(false), 0);
}
