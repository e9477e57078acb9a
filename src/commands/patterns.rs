//! Ready-made patterns for regular-expression command nodes.
//!
//! Patterns are anchored by the registry when compiled, so none of these
//! carry `^` or `$` themselves.
//!
//! There are no password-strength patterns. Rules like "at least one digit
//! and one letter" need lookahead, which the `regex` crate does not support,
//! so registering one fails with an invalid-pattern error. Check password
//! strength in the handler instead.

/// A word that does not start with a digit or a dot (at least two characters).
pub const WORD: &str = r"[^\d\s\.]\w+";
/// A quoted string or a bare word.
pub const STRING: &str = r#"("[^"]*"|'[^']*'|[^\d\s\.]\w+)"#;
/// Unsigned integer.
pub const UINT: &str = r"\d+";
/// Signed integer.
pub const INT: &str = r"-?\d+";
/// Signed decimal number.
pub const DECIMAL: &str = r"-?[0-9]+(\.[0-9]+)?";
/// Unsigned 16-bit integer (0..=65535).
pub const UINT16: &str =
    r"(\d{1,4}|[1-5]\d{4}|6[0-4]\d{3}|65[0-4]\d{2}|655[0-2]\d|6553[0-5])";
/// Signed 16-bit integer (-32768..=32767).
pub const INT16: &str = r"(-?(\d{1,4}|[0-2]\d{4}|31\d{3}|32[0-6]\d{2}|327[0-5]\d|3276[0-7])|-32768)";
/// Hexadecimal digits.
pub const HEX: &str = r"[0-9a-fA-F]+";
/// Exactly one byte in hex.
pub const HEX1BYTE: &str = r"[0-9a-fA-F]{2}";
/// Exactly two bytes in hex.
pub const HEX2BYTE: &str = r"[0-9a-fA-F]{4}";
/// Dotted-quad IPv4 address.
pub const IP: &str = r"((25[0-5]|2[0-4]\d|[01]?\d{1,2})\.){3}(25[0-5]|2[0-4]\d|[01]?\d{1,2})";
/// TCP/UDP port.
pub const PORT: &str = UINT16;
/// Phone number, local or mobile notation.
pub const PHONE: &str = r"(09\d{2}-*\d{3}-*\d{3}|\(*0\d\)*-*\d{3,4}-*\d{4})";
/// E-mail address.
pub const EMAIL: &str = r"\w+((-\w+)|(\.\w+))*@[A-Za-z0-9]+((\.|-)[A-Za-z0-9]+)*\.[A-Za-z]+";
