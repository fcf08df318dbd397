use gitfs::{
    oid::FORMAT,
    parse::{self, error},
    ObjectKind, Oid,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use crate::memory::{batch_record, oid};

const COMMIT: &str = "\
tree 50d6ef440728217febf9e35716d8b0296608d7f8
parent 0ad95dbdfe9fdf81938ca419cf740469173e2022
author Nora Linden <nora@example.com> 1669292989 +0000
committer Nora Linden <nora@example.com> 1669292989 +0000

Organise the listing decoders

* keep entries in listing order
";

const NO_HEADER_END: &str = "\
tree 50d6ef440728217febf9e35716d8b0296608d7f8
author Nora Linden <nora@example.com> 1669292989 +0000
";

const NO_TREE: &str = "\
parent 0ad95dbdfe9fdf81938ca419cf740469173e2022
author Nora Linden <nora@example.com> 1669292989 +0000

no snapshot here
";

#[test]
fn commit_tree_found_among_other_headers() {
    assert_eq!(
        parse::commit_tree(COMMIT.as_bytes()).unwrap(),
        Oid::try_from("50d6ef440728217febf9e35716d8b0296608d7f8").unwrap(),
    );
}

#[test]
fn commit_tree_requires_header_terminator() {
    assert_eq!(
        parse::commit_tree(NO_HEADER_END.as_bytes()),
        Err(error::Commit::MissingHeaderEnd),
    );
}

#[test]
fn commit_tree_requires_tree_header() {
    assert_eq!(
        parse::commit_tree(NO_TREE.as_bytes()),
        Err(error::Commit::MissingTree),
    );
}

#[test]
fn commit_tree_honors_first_tree_header() {
    let payload = format!("tree {}\ntree {}\n\nbody\n", oid(b'1'), oid(b'2'));
    assert_eq!(parse::commit_tree(payload.as_bytes()).unwrap(), oid(b'1'));
}

#[test]
fn commit_tree_rejects_tree_in_message_only() {
    let payload = format!("parent {}\n\ntree {}\n", oid(b'9'), oid(b'1'));
    assert_eq!(
        parse::commit_tree(payload.as_bytes()),
        Err(error::Commit::MissingTree),
    );
}

fn commit_payload(tree: Oid) -> Vec<u8> {
    format!("tree {tree}\n\nsnapshot\n").into_bytes()
}

#[test]
fn batch_preserves_encounter_order() {
    let mut buffer = Vec::new();
    buffer.extend_from_slice(&batch_record(oid(b'a'), &commit_payload(oid(b'1'))));
    buffer.extend_from_slice(&batch_record(oid(b'b'), &commit_payload(oid(b'2'))));
    buffer.extend_from_slice(&batch_record(oid(b'c'), &commit_payload(oid(b'3'))));

    let records = parse::commit_batch(&buffer).unwrap();
    assert_eq!(
        records.iter().map(|r| (r.id, r.tree)).collect::<Vec<_>>(),
        vec![
            (oid(b'a'), oid(b'1')),
            (oid(b'b'), oid(b'2')),
            (oid(b'c'), oid(b'3')),
        ],
    );
}

#[test]
fn batch_stops_at_empty_remainder() {
    assert_eq!(parse::commit_batch(b"").unwrap(), vec![]);
}

#[test]
fn batch_stops_at_short_trailing_line() {
    let mut buffer = batch_record(oid(b'a'), &commit_payload(oid(b'1')));
    buffer.extend_from_slice(b"aaaa commit");

    let records = parse::commit_batch(&buffer).unwrap();
    assert_eq!(records.len(), 1);
}

#[test]
fn batch_stops_at_blank_line() {
    let mut buffer = batch_record(oid(b'a'), &commit_payload(oid(b'1')));
    buffer.extend_from_slice(b"\nleftover");

    let records = parse::commit_batch(&buffer).unwrap();
    assert_eq!(records.len(), 1);
}

#[test]
fn batch_accepts_record_flush_with_buffer() {
    let payload = commit_payload(oid(b'1'));
    let mut buffer = format!("{} commit {}\n", oid(b'a'), payload.len()).into_bytes();
    buffer.extend_from_slice(&payload);
    // No separator after the last payload byte.

    let records = parse::commit_batch(&buffer).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].tree, oid(b'1'));
}

#[test]
fn batch_rejects_wrong_field_count() {
    let buffer = format!("{} commit\n", oid(b'a'));
    assert!(matches!(
        parse::commit_batch(buffer.as_bytes()),
        Err(error::Batch::Fields(_)),
    ));
}

#[test]
fn batch_rejects_short_id() {
    let buffer = "abc123 commit 10\n";
    assert!(matches!(
        parse::commit_batch(buffer.as_bytes()),
        Err(error::Batch::Id(..)),
    ));
}

#[test]
fn batch_rejects_non_commit_records() {
    let buffer = format!("{} blob 4\nhi!\n\n", oid(b'a'));
    assert!(matches!(
        parse::commit_batch(buffer.as_bytes()),
        Err(error::Batch::Kind(_)),
    ));
}

#[test]
fn batch_rejects_bad_size() {
    let buffer = format!("{} commit -4\n", oid(b'a'));
    assert!(matches!(
        parse::commit_batch(buffer.as_bytes()),
        Err(error::Batch::Size(_)),
    ));
}

#[test]
fn batch_rejects_truncated_payload() {
    let buffer = format!("{} commit 9999\ntree x\n\n", oid(b'a'));
    assert!(matches!(
        parse::commit_batch(buffer.as_bytes()),
        Err(error::Batch::Truncated { .. }),
    ));
}

#[test]
fn batch_rejects_payload_without_tree() {
    let buffer = batch_record(oid(b'a'), b"parent none\n\nbody\n");
    assert!(matches!(
        parse::commit_batch(&buffer),
        Err(error::Batch::Commit {
            err: error::Commit::MissingTree,
            ..
        }),
    ));
}

fn listing_row(mode: &str, kind: &str, id: Oid, name: &[u8]) -> Vec<u8> {
    let mut row = format!("{mode} {kind} {id}\t").into_bytes();
    row.extend_from_slice(name);
    row.push(0);
    row
}

#[test]
fn tree_listing_preserves_order_and_modes() {
    let mut buffer = Vec::new();
    buffer.extend_from_slice(&listing_row("100644", "blob", oid(b'1'), b"README.md"));
    buffer.extend_from_slice(&listing_row("040000", "tree", oid(b'2'), b"src"));
    buffer.extend_from_slice(&listing_row("120000", "blob", oid(b'3'), b"link"));
    buffer.extend_from_slice(&listing_row("100755", "blob", oid(b'4'), b"run.sh"));

    let entries = parse::tree_listing(&buffer).unwrap();
    assert_eq!(
        entries
            .iter()
            .map(|e| (e.mode, e.kind, e.id, e.name.as_slice()))
            .collect::<Vec<_>>(),
        vec![
            (0o100644, ObjectKind::Blob, oid(b'1'), &b"README.md"[..]),
            (0o040000, ObjectKind::Tree, oid(b'2'), &b"src"[..]),
            (0o120000, ObjectKind::Blob, oid(b'3'), &b"link"[..]),
            (0o100755, ObjectKind::Blob, oid(b'4'), &b"run.sh"[..]),
        ],
    );
}

#[test]
fn tree_listing_keeps_names_verbatim() {
    let name = b"caf\xe9 \tdu \nmonde";
    let buffer = listing_row("100644", "blob", oid(b'1'), name);

    let entries = parse::tree_listing(&buffer).unwrap();
    assert_eq!(entries[0].name, name.to_vec());
}

#[test]
fn tree_listing_rejects_missing_tab() {
    let buffer = format!("100644 blob {} README.md", oid(b'1'));
    assert!(matches!(
        parse::tree_listing(buffer.as_bytes()),
        Err(error::Tree::MissingTab(_)),
    ));
}

#[test]
fn tree_listing_rejects_wrong_field_count() {
    let buffer = format!("100644 {}\tREADME.md\0", oid(b'1'));
    assert!(matches!(
        parse::tree_listing(buffer.as_bytes()),
        Err(error::Tree::Fields(_)),
    ));
}

#[test]
fn tree_listing_rejects_bad_mode() {
    let buffer = format!("10x644 blob {}\tREADME.md\0", oid(b'1'));
    assert!(matches!(
        parse::tree_listing(buffer.as_bytes()),
        Err(error::Tree::Mode(_)),
    ));
}

#[test]
fn tree_listing_rejects_submodule_entries() {
    let buffer = format!("160000 commit {}\tvendored\0", oid(b'1'));
    assert!(matches!(
        parse::tree_listing(buffer.as_bytes()),
        Err(error::Tree::Kind(_)),
    ));
}

#[test]
fn tree_listing_rejects_malformed_id() {
    let buffer = "100644 blob zzz\tREADME.md\0";
    assert!(matches!(
        parse::tree_listing(buffer.as_bytes()),
        Err(error::Tree::Id(..)),
    ));
}

#[test]
fn tree_listing_rejects_missing_nul() {
    let buffer = format!("100644 blob {}\tREADME.md", oid(b'1'));
    assert!(matches!(
        parse::tree_listing(buffer.as_bytes()),
        Err(error::Tree::MissingNul(_)),
    ));
}

fn hex_oid() -> impl Strategy<Value = Oid> {
    proptest::collection::vec(proptest::sample::select(b"0123456789abcdef".to_vec()), 40)
        .prop_map(|hex| Oid::from_hex(FORMAT, &hex).unwrap())
}

fn entry_name() -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(any::<u8>().prop_filter("no NUL", |b| *b != 0), 1..16)
}

proptest! {
    #[test]
    fn batch_decodes_any_well_formed_listing(
        expected in proptest::collection::vec((hex_oid(), hex_oid()), 0..8),
    ) {
        let mut buffer = Vec::new();
        for (id, tree) in &expected {
            buffer.extend_from_slice(&batch_record(*id, &commit_payload(*tree)));
        }

        let records = parse::commit_batch(&buffer).unwrap();
        prop_assert_eq!(records.len(), expected.len());
        for (record, (id, tree)) in records.iter().zip(&expected) {
            prop_assert_eq!(record.id, *id);
            prop_assert_eq!(record.tree, *tree);
        }
    }

    #[test]
    fn tree_decodes_any_well_formed_listing(
        expected in proptest::collection::vec(
            (
                proptest::sample::select(vec!["100644", "100755", "040000", "120000"]),
                proptest::sample::select(vec!["blob", "tree"]),
                hex_oid(),
                entry_name(),
            ),
            0..8,
        ),
    ) {
        let mut buffer = Vec::new();
        for (mode, kind, id, name) in &expected {
            buffer.extend_from_slice(&listing_row(mode, kind, *id, name));
        }

        let entries = parse::tree_listing(&buffer).unwrap();
        prop_assert_eq!(entries.len(), expected.len());
        for (entry, (mode, _, id, name)) in entries.iter().zip(&expected) {
            prop_assert_eq!(entry.mode, u32::from_str_radix(mode, 8).unwrap());
            prop_assert_eq!(entry.id, *id);
            prop_assert_eq!(&entry.name, name);
        }
    }
}
