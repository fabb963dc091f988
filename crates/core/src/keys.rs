//! CDP keyboard event construction.
//!
//! Named keys are dispatched as a rawKeyDown/keyUp pair with full key
//! identity so form controls react the way they would to a physical press.
//! Enter additionally carries a char event with `\r`, which is what actually
//! submits forms.

use chromiumoxide::cdp::browser_protocol::input::{DispatchKeyEventParams, DispatchKeyEventType};

use crate::error::{Error, Result};

struct KeySpec {
    key: &'static str,
    code: &'static str,
    virtual_key: i64,
    /// Text payload for the char event, when the key produces one.
    text: Option<&'static str>,
}

fn spec_for(key: &str) -> Option<KeySpec> {
    match key {
        "Enter" => Some(KeySpec {
            key: "Enter",
            code: "Enter",
            virtual_key: 13,
            text: Some("\r"),
        }),
        "Tab" => Some(KeySpec {
            key: "Tab",
            code: "Tab",
            virtual_key: 9,
            text: None,
        }),
        "ArrowDown" => Some(KeySpec {
            key: "ArrowDown",
            code: "ArrowDown",
            virtual_key: 40,
            text: None,
        }),
        _ => None,
    }
}

/// Builds the dispatch sequence for a named key press.
pub(crate) fn key_events(key: &str) -> Result<Vec<DispatchKeyEventParams>> {
    let spec = spec_for(key).ok_or_else(|| Error::Input(format!("unsupported key: {key}")))?;

    let mut events = Vec::with_capacity(3);
    events.push(
        DispatchKeyEventParams::builder()
            .r#type(DispatchKeyEventType::RawKeyDown)
            .key(spec.key)
            .code(spec.code)
            .windows_virtual_key_code(spec.virtual_key)
            .native_virtual_key_code(spec.virtual_key)
            .build()
            .map_err(Error::Input)?,
    );
    if let Some(text) = spec.text {
        events.push(
            DispatchKeyEventParams::builder()
                .r#type(DispatchKeyEventType::Char)
                .text(text)
                .build()
                .map_err(Error::Input)?,
        );
    }
    events.push(
        DispatchKeyEventParams::builder()
            .r#type(DispatchKeyEventType::KeyUp)
            .key(spec.key)
            .code(spec.code)
            .windows_virtual_key_code(spec.virtual_key)
            .native_virtual_key_code(spec.virtual_key)
            .build()
            .map_err(Error::Input)?,
    );
    Ok(events)
}

/// Char event carrying a single typed character.
pub(crate) fn char_event(c: char) -> Result<DispatchKeyEventParams> {
    DispatchKeyEventParams::builder()
        .r#type(DispatchKeyEventType::Char)
        .text(c.to_string())
        .build()
        .map_err(Error::Input)
}
