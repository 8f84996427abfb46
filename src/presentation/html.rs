use serde_json::Value as Json;

use crate::presentation::bound::{BoundBlock, BoundKind, Renderer};
use crate::presentation::context::PresentationContext;
use crate::value::BlockValue;

// ============================================================================
// HTML renderer: plain markup, no templates
// ============================================================================

/// Minimal HTML renderer for bound block trees.
///
/// Every value and message is escaped. Lists emit their hidden `-added`
/// counter and one hidden `-id-N` input per row so a re-submission carries
/// item identities.
#[derive(Debug, Clone, Default)]
pub struct HtmlRenderer;

impl Renderer for HtmlRenderer {
    fn render(&self, bound: &BoundBlock) -> String {
        let mut out = String::new();
        render_into(bound, &mut out);
        out
    }
}

fn render_into(bound: &BoundBlock, out: &mut String) {
    let ctx = &bound.context;
    match bound.kind {
        BoundKind::Field => render_field(ctx, out),
        BoundKind::Record => {
            out.push_str(&format!(
                "<div class=\"record-block\" id=\"{}\">\n",
                escape_html(&ctx.id)
            ));
            render_messages(ctx, out);
            for child in &bound.children {
                render_into(child, out);
            }
            out.push_str("</div>\n");
        }
        BoundKind::List => {
            out.push_str(&format!(
                "<div class=\"list-block\" id=\"{}\">\n",
                escape_html(&ctx.id)
            ));
            render_messages(ctx, out);
            if let Some(added_key) = attr_str(ctx, "added_key") {
                let count = ctx.get("count").unwrap_or(Json::from(0));
                out.push_str(&format!(
                    "<input type=\"hidden\" name=\"{}\" value=\"{}\">\n",
                    escape_html(&added_key),
                    count
                ));
            }
            for child in &bound.children {
                render_into(child, out);
            }
            out.push_str("</div>\n");
        }
        BoundKind::ListItem => {
            out.push_str(&format!(
                "<div class=\"list-item\" id=\"{}\">\n",
                escape_html(&ctx.id)
            ));
            let id_key = attr_str(ctx, "id_key");
            if let (Some(id_key), Some(item_id)) = (id_key, attr_str(ctx, "item_id")) {
                out.push_str(&format!(
                    "<input type=\"hidden\" name=\"{}\" value=\"{}\">\n",
                    escape_html(&id_key),
                    escape_html(&item_id)
                ));
            }
            for child in &bound.children {
                render_into(child, out);
            }
            out.push_str("</div>\n");
        }
    }
}

fn render_field(ctx: &PresentationContext, out: &mut String) {
    let input_type = attr_str(ctx, "input_type").unwrap_or_else(|| "text".to_string());
    let label = attr_str(ctx, "label").unwrap_or_default();
    let required = ctx.get("required").and_then(|v| v.as_bool()).unwrap_or(false);
    let render_value = ctx.get("render_value").and_then(|v| v.as_bool()).unwrap_or(true);
    let value = if render_value { display_text(&ctx.value) } else { String::new() };

    let class = if ctx.has_errors() { "field error" } else { "field" };
    out.push_str(&format!("<div class=\"{}\">\n", class));
    out.push_str(&format!(
        "<label for=\"{}\">{}</label>\n",
        escape_html(&ctx.id),
        escape_html(&label)
    ));
    let required_attr = if required { " required" } else { "" };

    match input_type.as_str() {
        "checkbox" => {
            let checked = matches!(ctx.value, BlockValue::Scalar(Json::Bool(true)));
            out.push_str(&format!(
                "<input type=\"checkbox\" name=\"{}\" id=\"{}\"{}{}>\n",
                escape_html(&ctx.key),
                escape_html(&ctx.id),
                if checked { " checked" } else { "" },
                required_attr,
            ));
        }
        "select" => {
            out.push_str(&format!(
                "<select name=\"{}\" id=\"{}\"{}>\n",
                escape_html(&ctx.key),
                escape_html(&ctx.id),
                required_attr,
            ));
            let choices = ctx.get("choices").unwrap_or(Json::Array(Vec::new()));
            for choice in choices.as_array().into_iter().flatten() {
                let choice_value = choice.get(0).and_then(Json::as_str).unwrap_or("");
                let choice_label = choice.get(1).and_then(Json::as_str).unwrap_or(choice_value);
                let selected = if choice_value == value { " selected" } else { "" };
                out.push_str(&format!(
                    "<option value=\"{}\"{}>{}</option>\n",
                    escape_html(choice_value),
                    selected,
                    escape_html(choice_label)
                ));
            }
            out.push_str("</select>\n");
        }
        other => {
            out.push_str(&format!(
                "<input type=\"{}\" name=\"{}\" id=\"{}\" value=\"{}\"{}>\n",
                escape_html(other),
                escape_html(&ctx.key),
                escape_html(&ctx.id),
                escape_html(&value),
                required_attr,
            ));
        }
    }
    render_messages(ctx, out);
    out.push_str("</div>\n");
}

fn render_messages(ctx: &PresentationContext, out: &mut String) {
    let messages = ctx.own_messages();
    if messages.is_empty() {
        return;
    }
    out.push_str("<ul class=\"errorlist\">\n");
    for msg in messages {
        out.push_str(&format!("<li>{}</li>\n", escape_html(&msg)));
    }
    out.push_str("</ul>\n");
}

fn attr_str(ctx: &PresentationContext, key: &str) -> Option<String> {
    ctx.get(key).and_then(|v| v.as_str().map(str::to_string))
}

fn display_text(value: &BlockValue) -> String {
    match value {
        BlockValue::Scalar(Json::String(s)) => s.clone(),
        BlockValue::Scalar(Json::Null) | BlockValue::Empty => String::new(),
        BlockValue::Scalar(other) => other.to_string(),
        _ => String::new(),
    }
}

/// Escape HTML special characters.
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
