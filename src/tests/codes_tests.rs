// src/tests/codes_tests.rs

//! Tests for [`crate::data::codes`].

use crate::data::codes::{
    deref_text,
    method_text,
    result_code_text,
    scope_text,
    ResultCode,
    CODE_TEXT_UNKNOWN,
};

use ::test_case::test_case;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[test_case(0x00, "SUCCESS")]
#[test_case(0x0E, "SASL_BIND_IN_PROGRESS")]
#[test_case(0x20, "NO_SUCH_OBJECT")]
#[test_case(0x31, "INVALID_CREDENTIALS")]
#[test_case(0x44, "ALREADY_EXISTS")]
#[test_case(0x50, "OTHER")]
#[test_case(0x7A, "ASSERTION_FAILED")]
#[test_case(0x1000, "SYNC_REFRESH_REQUIRED")]
#[test_case(0x4111, "X_CANNOT_CHAIN")]
fn test_result_code_text(
    code: ResultCode,
    text: &str,
) {
    assert_eq!(result_code_text(code), text);
}

#[test_case(0x0F; "gap below attribute errors")]
#[test_case(9999; "large unknown")]
#[test_case(-1; "negative")]
fn test_result_code_text_unknown(code: ResultCode) {
    assert_eq!(result_code_text(code), CODE_TEXT_UNKNOWN);
}

#[test_case(0, "Base")]
#[test_case(1, "Onelevel")]
#[test_case(2, "Subtree")]
#[test_case(3, "Children")]
#[test_case(4, CODE_TEXT_UNKNOWN)]
#[test_case(-1, CODE_TEXT_UNKNOWN)]
fn test_scope_text(
    scope: i64,
    text: &str,
) {
    assert_eq!(scope_text(scope), text);
}

#[test_case(0, "Never")]
#[test_case(1, "Searching")]
#[test_case(2, "Finding")]
#[test_case(3, "Always")]
#[test_case(9, CODE_TEXT_UNKNOWN)]
fn test_deref_text(
    deref: i64,
    text: &str,
) {
    assert_eq!(deref_text(deref), text);
}

#[test_case(0x00, "None")]
#[test_case(0x80, "Simple")]
#[test_case(0xA3, "SASL")]
#[test_case(0x81, CODE_TEXT_UNKNOWN)]
fn test_method_text(
    method: i64,
    text: &str,
) {
    assert_eq!(method_text(method), text);
}
