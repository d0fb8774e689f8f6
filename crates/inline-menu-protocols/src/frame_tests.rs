use serde_json::json;

use super::*;

#[test]
fn test_decode_focus_report() {
    let message: FrameMessage = serde_json::from_value(json!({
        "command": "updateFocusedFieldData",
        "focusedFieldData": {
            "focusedFieldRects": {"top": 100.0, "left": 50.0, "width": 200.0, "height": 30.0},
            "focusedFieldStyles": {"paddingRight": "0px", "paddingLeft": "0px"}
        }
    }))
    .unwrap();

    match message {
        FrameMessage::UpdateFocusedFieldData { focused_field_data } => {
            assert_eq!(focused_field_data.focused_field_rects.left, 50.0);
        }
        other => panic!("unexpected message: {:?}", other),
    }
}

#[test]
fn test_decode_unknown_command() {
    let message: FrameMessage = serde_json::from_value(json!({
        "command": "someFutureCommand",
        "payload": {"anything": true}
    }))
    .unwrap();
    assert_eq!(message, FrameMessage::Unknown);
}

#[test]
fn test_decode_unit_command_ignores_extra_fields() {
    let message: FrameMessage = serde_json::from_value(json!({
        "command": "triggerAutofillOverlayReposition",
        "extra": 1
    }))
    .unwrap();
    assert_eq!(message, FrameMessage::TriggerAutofillOverlayReposition);
}

#[test]
fn test_decode_close_defaults() {
    let message: FrameMessage =
        serde_json::from_value(json!({"command": "closeAutofillInlineMenu"})).unwrap();
    assert_eq!(
        message,
        FrameMessage::CloseAutofillInlineMenu {
            overlay_element: None,
            force_close_inline_menu: false,
        }
    );
}

#[test]
fn test_decode_element_closed() {
    let message: FrameMessage = serde_json::from_value(json!({
        "command": "autofillOverlayElementClosed",
        "overlayElement": "autofill-inline-menu-list"
    }))
    .unwrap();
    assert_eq!(
        message,
        FrameMessage::AutofillOverlayElementClosed {
            overlay_element: SurfaceKind::List,
        }
    );
    assert_eq!(message.command_name(), "autofillOverlayElementClosed");
}

#[test]
fn test_encode_sub_frame_probe() {
    let request = FrameRequest::GetSubFrameOffsets {
        sub_frame_url: "https://inner.example/".to_string(),
        sub_frame_id: FrameId(4),
    };
    assert_eq!(
        serde_json::to_value(&request).unwrap(),
        json!({
            "command": "getSubFrameOffsets",
            "subFrameUrl": "https://inner.example/",
            "subFrameId": 4
        })
    );
}

#[test]
fn test_encode_open_inline_menu() {
    let request = FrameRequest::OpenAutofillInlineMenu {
        is_focusing_field_element: false,
        is_opening_full_inline_menu: true,
        auth_status: AuthStatus::Unlocked,
    };
    let value = serde_json::to_value(&request).unwrap();
    assert_eq!(value["command"], "openAutofillInlineMenu");
    assert_eq!(value["isOpeningFullInlineMenu"], true);
    assert_eq!(value["authStatus"], "unlocked");
}

#[test]
fn test_page_details_has_fields() {
    let tab = TabContext::new(TabId(1));
    let details = PageDetails {
        frame_id: FrameId::TOP,
        tab: tab.clone(),
        details: json!({"fields": [{"opid": "__0"}]}),
        source_url: None,
    };
    assert!(details.has_fields());

    let empty = PageDetails {
        frame_id: FrameId::TOP,
        tab,
        details: json!({"fields": []}),
        source_url: None,
    };
    assert!(!empty.has_fields());
}
