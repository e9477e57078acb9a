//! Line editing through the reader, driven by key scripts.

use ishell::editor::{ReadOutcome, Reader};
use ishell::terminal::MemoryTerminal;
use pretty_assertions::assert_eq;
use tokio_util::sync::CancellationToken;

fn read(reader: &mut Reader, term: &MemoryTerminal, script: &str) -> ReadOutcome {
    term.push_script(script).unwrap();
    let mut handle = term.clone();
    reader
        .read(&mut handle, "> ", None, "", None, &CancellationToken::new())
        .unwrap()
}

#[test]
fn test_backspace_after_moving_left() {
    let term = MemoryTerminal::new(40, 5);
    let mut reader = Reader::new();
    let outcome = read(
        &mut reader,
        &term,
        "type:hello,key:left,key:left,key:backspace,key:enter",
    );
    assert_eq!(outcome, ReadOutcome::Completed("helo".to_string()));
    assert_eq!(term.line(0), "> helo");
}

#[test]
fn test_wide_glyph_backspace_blanks_two_columns() {
    let term = MemoryTerminal::new(40, 5);
    let mut reader = Reader::new();
    term.push_script("type:\u{4f60}\u{597d},key:backspace").unwrap();
    let mut handle = term.clone();
    let outcome = reader
        .read(&mut handle, "> ", None, "", None, &CancellationToken::new())
        .unwrap();
    assert_eq!(outcome, ReadOutcome::Aborted);
    assert_eq!(term.line(0), "> \u{4f60}");
    assert_eq!(term.cursor(), (4, 0));
}

#[test]
fn test_history_skips_consecutive_duplicates() {
    let term = MemoryTerminal::new(40, 10);
    let mut reader = Reader::new();
    for line in ["foo", "foo", "bar"] {
        read(&mut reader, &term, &format!("type:{line},key:enter"));
    }
    assert_eq!(reader.history().entries(), ["foo", "bar"]);

    let outcome = read(&mut reader, &term, "key:up,key:up,key:enter");
    assert_eq!(outcome, ReadOutcome::Completed("foo".to_string()));
    let outcome = read(&mut reader, &term, "key:up,key:up,key:down,key:enter");
    assert_eq!(outcome, ReadOutcome::Completed("foo".to_string()));
}

#[test]
fn test_history_pools_are_separate() {
    let term = MemoryTerminal::new(40, 10);
    let mut reader = Reader::new();
    read(&mut reader, &term, "type:show version,key:enter");
    reader.history_mut().set_pool("lab");
    assert!(reader.history().is_empty());
    read(&mut reader, &term, "type:ping,key:enter");
    reader.history_mut().set_pool("default");
    assert_eq!(reader.history().entries(), ["show version"]);
}

#[test]
fn test_emacs_bindings() {
    let term = MemoryTerminal::new(40, 10);
    let mut reader = Reader::new();
    let outcome = read(
        &mut reader,
        &term,
        "type:show interface,key:ctrl+w,type:version,key:ctrl+a,key:ctrl+d,type:S,key:enter",
    );
    assert_eq!(outcome, ReadOutcome::Completed("Show version".to_string()));

    let outcome = read(&mut reader, &term, "type:abc,key:ctrl+u,type:xy,key:ctrl+t,key:enter");
    assert_eq!(outcome, ReadOutcome::Completed("yx".to_string()));

    let outcome = read(
        &mut reader,
        &term,
        "type:show run,key:ctrl+b,key:ctrl+b,key:ctrl+b,key:ctrl+k,key:enter",
    );
    assert_eq!(outcome, ReadOutcome::Completed("show ".to_string()));
}

#[test]
fn test_long_line_wraps_and_edits_across_rows() {
    let term = MemoryTerminal::new(10, 5);
    let mut reader = Reader::new();
    let outcome = read(
        &mut reader,
        &term,
        "type:abcdefghijkl,key:home,key:delete,key:end,key:backspace,key:enter",
    );
    assert_eq!(outcome, ReadOutcome::Completed("bcdefghijk".to_string()));
    assert_eq!(term.line(0), "> bcdefghi");
    assert_eq!(term.line(1), "jk");
}

#[test]
fn test_escape_clears_line() {
    let term = MemoryTerminal::new(40, 5);
    let mut reader = Reader::new();
    let outcome = read(&mut reader, &term, "type:garbage,key:esc,type:ok,key:enter");
    assert_eq!(outcome, ReadOutcome::Completed("ok".to_string()));
    assert_eq!(term.line(0), "> ok");
}

#[test]
fn test_password_read_hides_input() {
    let term = MemoryTerminal::new(40, 5);
    let mut reader = Reader::new();
    term.push_script("type:hunter2,key:left,key:backspace,key:enter").unwrap();
    let mut handle = term.clone();
    let outcome = reader
        .read_password(&mut handle, "Password: ", None, &CancellationToken::new())
        .unwrap();
    assert_eq!(outcome, ReadOutcome::Completed("hunte2".to_string()));
    assert!(!term.transcript().contains("hunter"));
    assert!(reader.history().is_empty());
}
