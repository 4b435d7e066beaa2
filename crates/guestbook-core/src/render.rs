//! Declarative rendering of bubbles into view elements.
//!
//! Layout stays pure; this module turns a [`Bubble`] into the markup and
//! inline style a page needs to draw it, with no side effects.

use crate::bubble::{Bubble, BubbleState};
use serde::Serialize;
use std::borrow::Cow;

pub const DISMISS_HINT: &str = "클릭하여 닫기";

/// One element ready to be written into the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BubbleView {
    pub entry_id: String,
    pub class: String,
    pub style: String,
    pub inner_html: String,
    /// Whether clicks and touches should be forwarded.
    pub interactive: bool,
}

/// Escapes text for use as HTML element content.
pub fn escape_html(text: &str) -> Cow<'_, str> {
    html_escape::encode_text(text)
}

/// Builds the view for one bubble. The name line is omitted for entries
/// stored under `anonymous_name`.
pub fn render_bubble(bubble: &Bubble, anonymous_name: &str) -> BubbleView {
    let entry = bubble.entry();
    let p = bubble.placement();

    let mut style = format!(
        "left: {}px; top: {}px; transform: scale({}); background-color: {}; \
         border-color: {}; animation-delay: {}s; animation-duration: {}s; max-width: {}px;",
        p.x,
        p.y,
        p.scale,
        p.color.bg,
        p.color.border,
        p.animation_delay,
        p.animation_duration,
        p.max_width,
    );
    let class = match bubble.state() {
        BubbleState::Entering { .. } => {
            style.push_str(" transition: opacity 0.6s ease-out, transform 0.6s ease-out;");
            "floating-bubble entering"
        }
        BubbleState::Idle => "floating-bubble",
        BubbleState::Dismissing { .. } => {
            style.push_str(" animation: fadeOut 0.4s ease-out forwards; pointer-events: none;");
            "floating-bubble dismissing"
        }
    };

    let name_line = if entry.name == anonymous_name {
        String::new()
    } else {
        format!(r#"<div class="bubble-name">{}</div>"#, escape_html(&entry.name))
    };
    let inner_html = format!(
        r#"<div class="bubble-content">{name_line}<div class="bubble-text">{}</div></div><div class="bubble-click-hint">{DISMISS_HINT}</div>"#,
        escape_html(&entry.answer),
    );

    BubbleView {
        entry_id: entry.id.clone(),
        class: class.to_string(),
        style,
        inner_html,
        interactive: bubble.is_interactive(),
    }
}
