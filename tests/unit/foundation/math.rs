use super::*;

#[test]
fn mul_div255_rounds_to_nearest() {
    assert_eq!(mul_div255_u16(255, 255), 255);
    assert_eq!(mul_div255_u16(128, 255), 128);
    assert_eq!(mul_div255_u16(0, 200), 0);
    assert_eq!(mul_div255_u8(200, 128), 100);
}

#[test]
fn unit_scale_clamps() {
    assert_eq!(unit_to_u8_scale(-1.0), 0);
    assert_eq!(unit_to_u8_scale(0.5), 128);
    assert_eq!(unit_to_u8_scale(4.0), 255);
}
