//! End-to-end lifecycle tests: partition invariants, two-phase move
//! rollback, retention, and the full create/trash/restore/publish flow.

mod common;

use common::{FlakyAdapter, ctx, mem_manager};
use pretty_assertions::assert_eq;
use satchel::domain::{AccountContext, Note, TagRef};
use satchel::lifecycle::{LifecycleError, NoteLifecycleManager};
use satchel::retention::TrashRetentionPolicy;

#[test]
fn id_lives_in_at_most_one_collection() {
    let mgr = mem_manager();
    let ctx = ctx();
    let note = mgr.save_note(&ctx, Note::new("solo", "x")).unwrap();

    let in_collections = || {
        let active = mgr
            .list_notes(&ctx)
            .unwrap()
            .iter()
            .filter(|n| n.id == note.id)
            .count();
        let drafts = mgr
            .list_drafts(&ctx)
            .unwrap()
            .iter()
            .filter(|n| n.id == note.id)
            .count();
        let trash = mgr
            .list_trash(&ctx)
            .unwrap()
            .iter()
            .filter(|n| n.id == note.id)
            .count();
        active + drafts + trash
    };

    assert_eq!(in_collections(), 1);
    mgr.soft_delete(&ctx, &note.id).unwrap();
    assert_eq!(in_collections(), 1);
    mgr.restore(&ctx, &note.id).unwrap();
    assert_eq!(in_collections(), 1);
    mgr.soft_delete(&ctx, &note.id).unwrap();
    mgr.permanent_delete(&ctx, &note.id).unwrap();
    assert_eq!(in_collections(), 0);
}

#[test]
fn failed_trash_write_rolls_active_back() {
    let mgr = NoteLifecycleManager::with_adapter(FlakyAdapter::new());
    let ctx = ctx();
    let note = mgr.save_note(&ctx, Note::new("survivor", "x")).unwrap();

    mgr.store().adapter().fail_writes_to("alice::trash");
    let err = mgr.soft_delete(&ctx, &note.id).unwrap_err();
    assert!(matches!(err, LifecycleError::Store(_)));
    mgr.store().adapter().heal();

    let active = mgr.list_notes(&ctx).unwrap();
    assert_eq!(active.len(), 1, "failed move must leave active intact");
    assert_eq!(active[0].id, note.id);
    assert!(active[0].deleted_at.is_none());
    assert!(mgr.list_trash(&ctx).unwrap().is_empty());
}

#[test]
fn failed_active_write_keeps_note_in_trash_on_restore() {
    let mgr = NoteLifecycleManager::with_adapter(FlakyAdapter::new());
    let ctx = ctx();
    let note = mgr.save_note(&ctx, Note::new("stuck", "x")).unwrap();
    mgr.soft_delete(&ctx, &note.id).unwrap();

    mgr.store().adapter().fail_writes_to("alice::notes");
    let err = mgr.restore(&ctx, &note.id).unwrap_err();
    assert!(matches!(err, LifecycleError::Store(_)));
    mgr.store().adapter().heal();

    let trash = mgr.list_trash(&ctx).unwrap();
    assert_eq!(trash.len(), 1, "failed restore must put the entry back");
    assert_eq!(trash[0].id, note.id);
    assert!(trash[0].deleted_at.is_some());
    assert!(mgr.list_notes(&ctx).unwrap().is_empty());

    // A later retry succeeds against the healed backend.
    let restored = mgr.restore(&ctx, &note.id).unwrap();
    assert_eq!(restored.id, note.id);
    assert!(restored.deleted_at.is_none());
}

#[test]
fn accounts_do_not_see_each_other() {
    let mgr = mem_manager();
    let alice = AccountContext::signed_in("alice");
    let bob = AccountContext::signed_in("bob");

    mgr.save_note(&alice, Note::new("alices", "x")).unwrap();
    assert!(mgr.list_notes(&bob).unwrap().is_empty());
    assert!(mgr.tag_index(&bob).unwrap().is_empty());
}

#[test]
fn anonymous_reads_work_but_mutations_require_login() {
    let mgr = mem_manager();
    let anon = AccountContext::anonymous();

    assert!(mgr.list_notes(&anon).unwrap().is_empty());
    assert!(mgr.list_trash(&anon).unwrap().is_empty());

    let err = mgr.save_note(&anon, Note::new("nope", "x")).unwrap_err();
    assert!(err.needs_login());
}

#[test]
fn full_note_journey() {
    let mgr = mem_manager();
    let ctx = ctx();

    // Draft first, then publish.
    let mut draft = Note::new("Reading notes", "chapter one");
    draft.tags = vec![TagRef::ai("books")];
    let draft = mgr.save_draft(&ctx, draft).unwrap();
    let published = mgr.publish_draft(&ctx, &draft.id).unwrap();
    assert_ne!(published.id, draft.id);
    assert!(mgr.list_drafts(&ctx).unwrap().is_empty());

    // The published note feeds the derived indexes.
    assert_eq!(mgr.tag_index(&ctx).unwrap(), vec!["books"]);

    // Trash it; an immediate retention pass keeps a fresh entry.
    mgr.soft_delete(&ctx, &published.id).unwrap();
    let policy = TrashRetentionPolicy::new(mgr.store());
    let report = policy.auto_clean(&ctx).unwrap();
    assert_eq!(report.evicted, 0);
    assert_eq!(report.kept, 1);

    // Restore and confirm it is clean and indexed again.
    let restored = mgr.restore(&ctx, &published.id).unwrap();
    assert!(restored.deleted_at.is_none());
    assert_eq!(mgr.list_notes(&ctx).unwrap().len(), 1);
    assert_eq!(mgr.tag_index(&ctx).unwrap(), vec!["books"]);
}
