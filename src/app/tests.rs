use super::*;
use crate::formset::FormsetManager;
use crate::model::{FieldConfig, FieldKindName, ManagementConfig, PageConfig, TemplateConfig};
use serde_json::json;

// One saved block (index 0) and one empty block (index 1).
fn education() -> AppState {
    let page = PageConfig {
        title: "Education".into(),
        namespace: "education_set".into(),
        id_prefix: "id_".into(),
        management: ManagementConfig {
            total_forms: 2,
            min_num_forms: 1,
            ..Default::default()
        },
        template: TemplateConfig {
            fields: vec![
                FieldConfig {
                    role: "school".into(),
                    kind: FieldKindName::Select,
                    options: vec!["MIT".into(), "ETH".into()],
                    ..Default::default()
                },
                FieldConfig {
                    role: "degree".into(),
                    ..Default::default()
                },
            ],
        },
        bound: vec![[("degree".to_string(), json!("BSc"))].into_iter().collect()],
        ..Default::default()
    };
    let formset = FormsetManager::new(page.to_setup()).unwrap();
    AppState::new(page, formset)
}

fn toast_of(effects: &[Effect]) -> Option<(&str, ToastLevel)> {
    effects.iter().find_map(|e| match e {
        Effect::ShowToast { text, level, .. } => Some((text.as_str(), *level)),
        _ => None,
    })
}

#[test]
fn add_focuses_new_block_and_refreshes_payload() {
    let mut st = education();
    let effects = update(&mut st, AppMsg::AddBlock);
    // bound block and first empty block hold two field rows each
    assert_eq!(st.selected, 4);
    assert_eq!(st.formset.record().total_count, 3);
    assert_eq!(st.formset.record().min_required_count, 2);
    assert!(st.payload_viewer.text.contains("\"education_set-2-degree\""));
    assert!(st.payload_viewer.text.contains("\"education_set-TOTAL_FORMS\": \"3\""));
    assert_eq!(toast_of(&effects), Some(("Added block 2", ToastLevel::Info)));
}

#[test]
fn saved_blocks_and_the_last_block_are_not_removed() {
    let mut st = education();
    st.selected = 0;
    let effects = update(&mut st, AppMsg::RemoveFocused);
    assert_eq!(
        toast_of(&effects),
        Some(("Saved entries cannot be removed here", ToastLevel::Info))
    );

    st.selected = 2;
    let effects = update(&mut st, AppMsg::RemoveFocused);
    assert_eq!(
        toast_of(&effects),
        Some(("At least one entry must remain", ToastLevel::Info))
    );
    assert_eq!(st.formset.record().total_count, 2);
    assert_eq!(st.formset.live_indices(), vec![1]);
}

#[test]
fn remove_by_trigger_compacts_and_clamps_cursor() {
    let mut st = education();
    let _ = update(&mut st, AppMsg::AddBlock);
    st.selected = 5;
    let effects = update(&mut st, AppMsg::RemoveTrigger("education_set-delete-1".into()));
    assert_eq!(
        toast_of(&effects),
        Some(("Removed education_set-delete-1", ToastLevel::Info))
    );
    assert_eq!(st.selected, 3);
    assert_eq!(st.formset.live_indices(), vec![1]);
    assert_eq!(st.formset.record().total_count, 2);

    // with a single dynamic block every remove is absorbed by the floor, malformed or not
    let effects = update(&mut st, AppMsg::RemoveTrigger("education_set-delete-x".into()));
    assert_eq!(
        toast_of(&effects),
        Some(("At least one entry must remain", ToastLevel::Info))
    );
}

#[test]
fn malformed_trigger_is_reported_and_changes_nothing() {
    let mut st = education();
    let _ = update(&mut st, AppMsg::AddBlock);
    for bad in ["education_set-delete-x", "education_set-delete-9", "material_set-delete-0"] {
        let effects = update(&mut st, AppMsg::RemoveTrigger(bad.into()));
        assert!(matches!(toast_of(&effects), Some((_, ToastLevel::Error))), "{bad}");
    }
    assert_eq!(st.formset.live_indices(), vec![1, 2]);
    assert_eq!(st.formset.record().total_count, 3);
}

#[test]
fn remove_focused_drops_the_block_under_the_cursor() {
    let mut st = education();
    let _ = update(&mut st, AppMsg::AddBlock);
    let _ = update(&mut st, AppMsg::AddBlock);
    let kept = st.formset.blocks()[2].handle;
    // degree of the middle block (index 2)
    st.selected = 5;
    let effects = update(&mut st, AppMsg::RemoveFocused);
    assert_eq!(
        toast_of(&effects),
        Some(("Removed education_set-delete-1", ToastLevel::Info))
    );
    assert_eq!(st.formset.live_indices(), vec![1, 2]);
    assert_eq!(st.formset.block(kept).map(|b| b.index), Some(2));
    assert_eq!(st.formset.record().total_count, 3);
}

#[test]
fn edit_survives_renumbering_of_its_block() {
    let mut st = education();
    let _ = update(&mut st, AppMsg::AddBlock);
    // degree of the new block
    st.selected = 5;
    let _ = update(&mut st, AppMsg::BeginEdit);
    assert!(st.editor.is_some());
    for c in "PhD".chars() {
        let _ = update(&mut st, AppMsg::EditChar(c));
    }
    // the block in front goes away; ours moves from index 2 to 1
    let _ = update(&mut st, AppMsg::RemoveTrigger("education_set-delete-0".into()));
    let _ = update(&mut st, AppMsg::CommitEdit);
    assert!(st.editor.is_none());
    let sub = st.formset.submission();
    assert!(sub.contains(&("education_set-1-degree".to_string(), "PhD".to_string())));
    assert!(st.payload_viewer.text.contains("\"education_set-1-degree\": \"PhD\""));
}

#[test]
fn cancel_discards_the_edit() {
    let mut st = education();
    st.selected = 3;
    let _ = update(&mut st, AppMsg::BeginEdit);
    let _ = update(&mut st, AppMsg::EditChar('x'));
    let _ = update(&mut st, AppMsg::CancelEdit);
    assert!(st.editor.is_none());
    assert!(st
        .formset
        .submission()
        .contains(&("education_set-1-degree".to_string(), String::new())));
}

#[test]
fn selects_cycle_instead_of_editing() {
    let mut st = education();
    st.selected = 2;
    let _ = update(&mut st, AppMsg::CycleOption(1));
    let _ = update(&mut st, AppMsg::BeginEdit);
    assert!(st.editor.is_none());
    let sub = st.formset.submission();
    assert!(sub.contains(&("education_set-1-school".to_string(), "ETH".to_string())));
}

#[test]
fn set_value_by_name_reports_unknown_fields() {
    let mut st = education();
    let effects = update(
        &mut st,
        AppMsg::SetValue {
            name: "education_set-1-degree".into(),
            value: "MSc".into(),
        },
    );
    assert!(effects.is_empty());
    let effects = update(
        &mut st,
        AppMsg::SetValue {
            name: "education_set-7-degree".into(),
            value: "MSc".into(),
        },
    );
    assert_eq!(
        toast_of(&effects),
        Some(("No field named education_set-7-degree", ToastLevel::Error))
    );
}

#[test]
fn submit_without_command_prints_on_exit() {
    let mut st = education();
    let effects = update(&mut st, AppMsg::Submit);
    assert!(st.print_on_exit);
    assert!(!st.submitting);
    assert!(matches!(toast_of(&effects), Some((_, ToastLevel::Info))));
}

#[test]
fn submit_round_trip_shows_reply_until_next_change() {
    let mut st = education();
    st.page.submit_cmd = Some("cat".into());
    let effects = update(&mut st, AppMsg::Submit);
    match effects.as_slice() {
        [Effect::RunSubmit { cmdline, payload }] => {
            assert_eq!(cmdline, "cat");
            assert!(payload.contains("\"education_set-TOTAL_FORMS\": \"2\""));
        }
        other => panic!("expected RunSubmit, got {other:?}"),
    }
    assert!(st.submitting);
    // no second submit while one is running
    assert!(update(&mut st, AppMsg::Submit).is_empty());

    let effects = update(
        &mut st,
        AppMsg::SubmitDone {
            outcome: Ok(json!({"saved": 2})),
        },
    );
    assert_eq!(toast_of(&effects), Some(("Submitted", ToastLevel::Success)));
    assert!(!st.submitting);
    assert!(st.status_text.is_none());
    assert!(st.show_payload);
    assert_eq!(st.payload_viewer.title, "Submit reply");
    assert!(st.payload_viewer.text.contains("\"saved\": 2"));

    let _ = update(&mut st, AppMsg::AddBlock);
    assert_eq!(st.payload_viewer.title, "Payload");
    assert!(st.reply.is_none());
}

#[test]
fn failed_submit_is_reported() {
    let mut st = education();
    st.submitting = true;
    let effects = update(
        &mut st,
        AppMsg::SubmitDone {
            outcome: Err("Command failed: false".into()),
        },
    );
    assert!(!st.submitting);
    assert_eq!(
        toast_of(&effects),
        Some(("Submit failed: Command failed: false", ToastLevel::Error))
    );
    assert!(st.reply.is_none());
}

#[test]
fn focus_only_moves_to_a_visible_payload() {
    let mut st = education();
    let _ = update(&mut st, AppMsg::ToggleFocus);
    assert_eq!(st.focus, Focus::Blocks);
    let _ = update(&mut st, AppMsg::TogglePayload);
    let _ = update(&mut st, AppMsg::ToggleFocus);
    assert_eq!(st.focus, Focus::Payload);
    let _ = update(&mut st, AppMsg::TogglePayload);
    assert!(!st.show_payload);
    assert_eq!(st.focus, Focus::Blocks);
}

#[test]
fn copy_and_quit() {
    let mut st = education();
    let effects = update(&mut st, AppMsg::CopyPayload);
    match effects.as_slice() {
        [Effect::CopyToClipboard { text }] => assert!(text.contains("education_set-0-degree")),
        other => panic!("expected CopyToClipboard, got {other:?}"),
    }
    let _ = update(&mut st, AppMsg::Quit);
    assert!(st.should_quit);
}
