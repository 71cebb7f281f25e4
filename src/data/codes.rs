// src/data/codes.rs

//! Static protocol code tables: LDAP result codes, search scopes, alias
//! dereference policies, and bind methods.
//!
//! Every lookup resolves an unknown numeric value to the
//! [`CODE_TEXT_UNKNOWN`] sentinel rather than failing; record emission must
//! never fail solely because of an unrecognized code.

use std::collections::BTreeMap;

use ::lazy_static::lazy_static;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A numeric LDAP result code, `err=` in the log.
pub type ResultCode = i64;

/// Symbolic text for any numeric code not in a table.
pub const CODE_TEXT_UNKNOWN: &str = "UNKNOWN";

/// LDAP result codes to symbolic names.
///
/// RFC 4511 Appendix A plus the OpenLDAP cancel-extension, assertion,
/// proxied-authorization, and experimental/private-use (`X_`) codes.
const RESULT_CODE_TEXTS: &[(ResultCode, &str)] = &[
    (0x00, "SUCCESS"),
    (0x01, "OPERATIONS_ERROR"),
    (0x02, "PROTOCOL_ERROR"),
    (0x03, "TIMELIMIT_EXCEEDED"),
    (0x04, "SIZELIMIT_EXCEEDED"),
    (0x05, "COMPARE_FALSE"),
    (0x06, "COMPARE_TRUE"),
    (0x07, "AUTH_METHOD_NOT_SUPPORTED"),
    (0x08, "STRONG_AUTH_REQUIRED"),
    (0x09, "PARTIAL_RESULTS"),
    (0x0A, "REFERRAL"),
    (0x0B, "ADMINLIMIT_EXCEEDED"),
    (0x0C, "UNAVAILABLE_CRITICAL_EXTENSION"),
    (0x0D, "CONFIDENTIALITY_REQUIRED"),
    (0x0E, "SASL_BIND_IN_PROGRESS"),
    // attribute errors
    (0x10, "NO_SUCH_ATTRIBUTE"),
    (0x11, "UNDEFINED_TYPE"),
    (0x12, "INAPPROPRIATE_MATCHING"),
    (0x13, "CONSTRAINT_VIOLATION"),
    (0x14, "TYPE_OR_VALUE_EXISTS"),
    (0x15, "INVALID_SYNTAX"),
    // name errors
    (0x20, "NO_SUCH_OBJECT"),
    (0x21, "ALIAS_PROBLEM"),
    (0x22, "INVALID_DN_SYNTAX"),
    (0x23, "IS_LEAF"),
    (0x24, "ALIAS_DEREF_PROBLEM"),
    // security errors
    (0x2F, "X_PROXY_AUTHZ_FAILURE"),
    (0x30, "INAPPROPRIATE_AUTH"),
    (0x31, "INVALID_CREDENTIALS"),
    (0x32, "INSUFFICIENT_ACCESS"),
    // service errors
    (0x33, "BUSY"),
    (0x34, "UNAVAILABLE"),
    (0x35, "UNWILLING_TO_PERFORM"),
    (0x36, "LOOP_DETECT"),
    // update errors
    (0x40, "NAMING_VIOLATION"),
    (0x41, "OBJECT_CLASS_VIOLATION"),
    (0x42, "NOT_ALLOWED_ON_NONLEAF"),
    (0x43, "NOT_ALLOWED_ON_RDN"),
    (0x44, "ALREADY_EXISTS"),
    (0x45, "NO_OBJECT_CLASS_MODS"),
    (0x46, "RESULTS_TOO_LARGE"),
    (0x47, "AFFECTS_MULTIPLE_DSAS"),
    // other errors
    (0x4C, "VLV_ERROR"),
    (0x50, "OTHER"),
    // cancel extension, RFC 3909
    (0x76, "CANCELLED"),
    (0x77, "NO_SUCH_OPERATION"),
    (0x78, "TOO_LATE"),
    (0x79, "CANNOT_CANCEL"),
    // assertion control, RFC 4528
    (0x7A, "ASSERTION_FAILED"),
    // proxied authorization, RFC 4370
    (0x7B, "PROXIED_AUTH_DENIED"),
    // experimental and private-use codes
    (0x1000, "SYNC_REFRESH_REQUIRED"),
    (0x4100, "X_SYNC_REFRESH_REQUIRED"),
    (0x410E, "X_NO_OPERATION"),
    (0x410F, "X_ASSERTION_FAILED"),
    (0x4110, "X_NO_REFS_FOUND"),
    (0x4111, "X_CANNOT_CHAIN"),
];

type MapResultCodeText = BTreeMap<ResultCode, &'static str>;

lazy_static! {
    /// Map of numeric LDAP result code to symbolic name.
    pub static ref MAP_RESULT_CODE_TEXT: MapResultCodeText = {
        let mut map = MapResultCodeText::new();
        for code_text in RESULT_CODE_TEXTS.iter() {
            map.insert(code_text.0, code_text.1);
        }

        map
    };
}

/// Symbolic name for a numeric LDAP result code.
/// Unknown codes resolve to [`CODE_TEXT_UNKNOWN`].
pub fn result_code_text(code: ResultCode) -> &'static str {
    match MAP_RESULT_CODE_TEXT.get(&code) {
        Some(text) => text,
        None => CODE_TEXT_UNKNOWN,
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// small fixed code tables
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Symbolic name for a search `scope=` value.
pub const fn scope_text(scope: i64) -> &'static str {
    match scope {
        0 => "Base",
        1 => "Onelevel",
        2 => "Subtree",
        3 => "Children",
        _ => CODE_TEXT_UNKNOWN,
    }
}

/// Symbolic name for a search alias `deref=` value.
pub const fn deref_text(deref: i64) -> &'static str {
    match deref {
        0 => "Never",
        1 => "Searching",
        2 => "Finding",
        3 => "Always",
        _ => CODE_TEXT_UNKNOWN,
    }
}

/// Symbolic name for a bind `method=` value.
pub const fn method_text(method: i64) -> &'static str {
    match method {
        0x00 => "None",
        0x80 => "Simple",
        0xA3 => "SASL",
        _ => CODE_TEXT_UNKNOWN,
    }
}
