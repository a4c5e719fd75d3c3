//! Conversion between the escaped form stored in the file and the text shown to translators.
//!
//! Only `\"` and `\\` are touched. Sequences such as `\n` are kept as two characters,
//! the game interprets them at display time.

/// File literal -> display text.
pub fn decode(fragment: &str) -> String {
    fragment.replace("\\\"", "\"").replace("\\\\", "\\")
}

/// Display text -> file literal. Mirror of [`decode`].
pub fn encode(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

/// True when the byte at `pos` is not escaped by an odd run of backslashes before it.
pub(crate) fn is_unescaped(s: &str, pos: usize) -> bool {
    let run = s.as_bytes()[..pos]
        .iter()
        .rev()
        .take_while(|&&b| b == b'\\')
        .count();
    run % 2 == 0
}
