use super::*;
use pretty_assertions::assert_eq;

#[test]
fn duplicate_resume_ready_commits_one_attachment() {
    let (mut state, mut tables) = streaming();
    apply(&mut state, &mut tables, StreamEvent::ResumeReady(attachment("u1")));
    apply(&mut state, &mut tables, StreamEvent::ResumeReady(attachment("u1")));
    apply(&mut state, &mut tables, StreamEvent::Final("Done".to_string()));

    assert_eq!(placeholder(&state).attachments, vec![attachment("u1")]);
}

#[test]
fn resume_ready_alone_does_not_touch_the_message() {
    let (mut state, mut tables) = streaming();
    let effects = apply(&mut state, &mut tables, StreamEvent::ResumeReady(attachment("u1")));

    assert_eq!(effects, vec![ChatEffect::RequestFrame]);
    assert!(placeholder(&state).attachments.is_empty());
    assert_eq!(tables.pending_for(&assistant_id()), Some(&attachment("u1")));
}

#[test]
fn later_resume_ready_replaces_pending_attachment() {
    let (mut state, mut tables) = streaming();
    apply(&mut state, &mut tables, StreamEvent::ResumeReady(attachment("u1")));
    apply(&mut state, &mut tables, StreamEvent::ResumeReady(attachment("u2")));
    apply(&mut state, &mut tables, StreamEvent::Final("Done".to_string()));

    assert_eq!(placeholder(&state).attachments, vec![attachment("u2")]);
}

#[test]
fn repeated_final_does_not_duplicate_committed_attachment() {
    let (mut state, mut tables) = streaming();
    apply(&mut state, &mut tables, StreamEvent::ResumeReady(attachment("u1")));
    apply(&mut state, &mut tables, StreamEvent::Final("Do".to_string()));
    apply(&mut state, &mut tables, StreamEvent::Final("Done".to_string()));

    assert_eq!(placeholder(&state).attachments, vec![attachment("u1")]);
}

#[test]
fn resume_ready_after_final_waits_for_next_final() {
    let (mut state, mut tables) = streaming();
    apply(&mut state, &mut tables, StreamEvent::Final("Done".to_string()));
    apply(&mut state, &mut tables, StreamEvent::ResumeReady(attachment("u1")));
    assert!(placeholder(&state).attachments.is_empty());

    settle(&mut state, &mut tables, SettleOutcome::Success);
    assert!(placeholder(&state).attachments.is_empty());
    assert_eq!(tables.pending_for(&assistant_id()), None);
}

#[test]
fn error_does_not_commit_pending_attachment() {
    let (mut state, mut tables) = streaming();
    apply(&mut state, &mut tables, StreamEvent::ResumeReady(attachment("u1")));
    apply(
        &mut state,
        &mut tables,
        StreamEvent::Error {
            message: "boom".to_string(),
            trace: None,
        },
    );

    assert_eq!(placeholder(&state).content, "Error: boom");
    assert!(placeholder(&state).attachments.is_empty());
}
