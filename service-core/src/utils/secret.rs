use subtle::ConstantTimeEq;

/// Compare a presented shared secret against the expected one in constant time.
///
/// Length mismatches return early; only the byte comparison is constant time.
pub fn secrets_match(expected: &str, presented: &str) -> bool {
    let expected_bytes = expected.as_bytes();
    let presented_bytes = presented.as_bytes();

    if expected_bytes.len() != presented_bytes.len() {
        return false;
    }

    expected_bytes.ct_eq(presented_bytes).into()
}
