// src/api/wire.rs
//! Wire codec between the domain model and the store's JSON records.
//!
//! Decoding is lenient: an unknown block type becomes `Unsupported`, an unknown
//! color becomes `default`. Encoding is strict: anything the store would
//! reject is reported as a `SchemaError` before a request is built.

use super::responses::ChildRecord;
use crate::constants::RICH_TEXT_SEGMENT_CAP;
use crate::error::{AppError, SchemaError};
use crate::model::blocks::*;
use crate::model::common::BlockCommon;
use crate::model::{Block, Page, PageTitle, Parent, PropertyPatch, PropertyPatches};
use crate::parsing::inline::split_long_spans;
use crate::types::{plain_text, Annotations, BlockId, Color, PageId, TextSpan, ValidatedUrl};
use serde_json::{json, Map, Value};

/// Code language the store uses for untagged code.
const PLAIN_TEXT_LANGUAGE: &str = "plain text";

// --- Decoding ---

/// Convert one record of a children listing.
pub fn convert_block(record: &Value) -> Result<ChildRecord, AppError> {
    let block_type = record
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| AppError::MalformedResponse("block record has no 'type'".to_string()))?;
    let has_children = record
        .get("has_children")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let body = record.get(block_type).unwrap_or(&Value::Null);

    if block_type == "table_row" {
        let cells = body
            .get("cells")
            .and_then(Value::as_array)
            .map(|cells| cells.iter().map(convert_rich_text_array).collect())
            .unwrap_or_default();
        return Ok(ChildRecord::TableRow(cells));
    }

    let common = convert_block_common(record)?;
    let block = match block_type {
        "paragraph" => Block::Paragraph(ParagraphBlock {
            common,
            content: convert_text_block_content(body),
        }),
        "heading_1" | "heading_2" | "heading_3" => Block::Heading(HeadingBlock {
            common,
            level: block_type.as_bytes()[8] - b'0',
            content: convert_text_block_content(body),
        }),
        "bulleted_list_item" => Block::BulletedListItem(BulletedListItemBlock {
            common,
            content: convert_text_block_content(body),
        }),
        "numbered_list_item" => Block::NumberedListItem(NumberedListItemBlock {
            common,
            content: convert_text_block_content(body),
        }),
        "to_do" => Block::ToDo(ToDoBlock {
            common,
            content: convert_text_block_content(body),
            checked: body.get("checked").and_then(Value::as_bool).unwrap_or(false),
        }),
        "quote" => Block::Quote(QuoteBlock {
            common,
            content: convert_text_block_content(body),
        }),
        "callout" => Block::Callout(CalloutBlock {
            common,
            icon: body.get("icon").and_then(convert_icon),
            content: convert_text_block_content(body),
        }),
        "toggle" => Block::Toggle(ToggleBlock {
            common,
            content: convert_text_block_content(body),
        }),
        "code" => {
            let language = body
                .get("language")
                .and_then(Value::as_str)
                .filter(|lang| *lang != PLAIN_TEXT_LANGUAGE)
                .unwrap_or_default()
                .to_string();
            Block::Code(CodeBlock {
                common,
                language,
                rich_text: rich_text_field(body, "rich_text"),
            })
        }
        "divider" => Block::Divider(DividerBlock { common }),
        "table" => Block::Table(TableBlock {
            common,
            has_header: body
                .get("has_column_header")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            rows: Vec::new(),
        }),
        "image" => Block::Image(ImageBlock {
            common,
            url: convert_file_url(body),
            caption: rich_text_field(body, "caption"),
        }),
        "child_page" => Block::ChildPage(ChildPageBlock {
            common,
            title: body
                .get("title")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        }),
        other => {
            log::debug!("Unsupported block type from store: {}", other);
            Block::Unsupported(UnsupportedBlock {
                common,
                block_type: other.to_string(),
            })
        }
    };

    Ok(ChildRecord::Block {
        block,
        has_children,
    })
}

/// Convert a page object; the title is the page's `title`-typed property.
pub fn convert_page(record: &Value) -> Result<Page, AppError> {
    let id = record
        .get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| AppError::MalformedResponse("page record has no 'id'".to_string()))?;

    let title = record
        .get("properties")
        .and_then(Value::as_object)
        .and_then(|properties| {
            properties
                .values()
                .find(|p| p.get("type").and_then(Value::as_str) == Some("title"))
        })
        .map(|p| plain_text(&rich_text_field(p, "title")))
        .unwrap_or_default();

    Ok(Page {
        id: PageId::parse(id)?,
        title: PageTitle::new(title),
        url: record
            .get("url")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        archived: record
            .get("archived")
            .or_else(|| record.get("in_trash"))
            .and_then(Value::as_bool)
            .unwrap_or(false),
    })
}

/// Ids of the blocks an append call created, in order.
pub fn convert_created_ids(response: &Value) -> Result<Vec<BlockId>, AppError> {
    let results = response
        .get("results")
        .and_then(Value::as_array)
        .ok_or_else(|| AppError::MalformedResponse("append response has no 'results'".to_string()))?;
    results
        .iter()
        .map(|record| {
            let id = record.get("id").and_then(Value::as_str).ok_or_else(|| {
                AppError::MalformedResponse("created block has no 'id'".to_string())
            })?;
            Ok(BlockId::parse(id)?)
        })
        .collect()
}

fn convert_block_common(record: &Value) -> Result<BlockCommon, AppError> {
    let id = match record.get("id").and_then(Value::as_str) {
        Some(id) => Some(BlockId::parse(id)?),
        None => None,
    };
    Ok(BlockCommon {
        id,
        children: Vec::new(),
    })
}

fn convert_text_block_content(body: &Value) -> TextBlockContent {
    TextBlockContent {
        rich_text: rich_text_field(body, "rich_text"),
        color: body
            .get("color")
            .and_then(Value::as_str)
            .map(Color::from_api_str)
            .unwrap_or_default(),
    }
}

fn rich_text_field(body: &Value, field: &str) -> Vec<TextSpan> {
    body.get(field)
        .map(convert_rich_text_array)
        .unwrap_or_default()
}

fn convert_rich_text_array(items: &Value) -> Vec<TextSpan> {
    items
        .as_array()
        .map(|items| items.iter().map(convert_rich_text).collect())
        .unwrap_or_default()
}

/// Text items keep their content and link; mentions and equations keep
/// their plain text and href.
fn convert_rich_text(item: &Value) -> TextSpan {
    let text = item.get("text");
    let content = text
        .and_then(|t| t.get("content"))
        .or_else(|| item.get("plain_text"))
        .and_then(Value::as_str)
        .unwrap_or_default();
    let link = text
        .and_then(|t| t.get("link"))
        .and_then(|l| l.get("url"))
        .or_else(|| item.get("href"))
        .and_then(Value::as_str)
        .map(str::to_string);

    TextSpan {
        content: content.to_string(),
        annotations: item
            .get("annotations")
            .map(convert_annotations)
            .unwrap_or_default(),
        link,
    }
}

fn convert_annotations(value: &Value) -> Annotations {
    let flag = |name: &str| value.get(name).and_then(Value::as_bool).unwrap_or(false);
    Annotations {
        bold: flag("bold"),
        italic: flag("italic"),
        strikethrough: flag("strikethrough"),
        underline: flag("underline"),
        code: flag("code"),
        color: value
            .get("color")
            .and_then(Value::as_str)
            .map(Color::from_api_str)
            .unwrap_or_default(),
    }
}

fn convert_icon(icon: &Value) -> Option<Icon> {
    match icon.get("type").and_then(Value::as_str)? {
        "emoji" => icon.get("emoji").and_then(Value::as_str).map(Icon::emoji),
        "external" => icon
            .get("external")
            .and_then(|e| e.get("url"))
            .and_then(Value::as_str)
            .map(|url| Icon::External {
                url: url.to_string(),
            }),
        _ => None,
    }
}

/// The URL of an external or uploaded file object.
fn convert_file_url(body: &Value) -> String {
    let kind = body.get("type").and_then(Value::as_str).unwrap_or("external");
    body.get(kind)
        .and_then(|f| f.get("url"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

// --- Encoding ---

/// Encode a block for creation, without its children.
///
/// Table rows travel inline as `table_row` children since a table cannot be
/// created empty.
pub fn encode_block(block: &Block) -> Result<Value, SchemaError> {
    let (block_type, mut body) = encode_block_body(block)?;

    if let Block::Table(table) = block {
        let width = table.table_width();
        let rows: Vec<Value> = table
            .rows
            .iter()
            .map(|row| {
                let mut cells: Vec<Value> = row.iter().map(|cell| encode_rich_text(cell)).collect();
                cells.resize(width, json!([]));
                json!({"object": "block", "type": "table_row", "table_row": {"cells": cells}})
            })
            .collect();
        body["children"] = Value::Array(rows);
    }

    Ok(json!({"object": "block", "type": block_type, block_type: body}))
}

/// Checks that every block in the tree, children included, would encode.
///
/// Returns the first violation in depth-first order. Writers call this before
/// touching the store so a bad block deep in a tree cannot leave a page
/// half-written.
pub fn validate_tree(blocks: &[Block]) -> Result<(), SchemaError> {
    let mut stack: Vec<&Block> = blocks.iter().rev().collect();
    while let Some(block) = stack.pop() {
        encode_block_body(block)?;
        stack.extend(block.children().iter().rev());
    }
    Ok(())
}

/// Encode a block's own content for an update call.
pub fn encode_block_update(block: &Block) -> Result<Value, SchemaError> {
    let (block_type, mut body) = encode_block_body(block)?;
    if let Some(fields) = body.as_object_mut() {
        fields.remove("table_width");
    }
    Ok(json!({ block_type: body }))
}

fn encode_block_body(block: &Block) -> Result<(&'static str, Value), SchemaError> {
    let encoded = match block {
        Block::Paragraph(b) => ("paragraph", encode_text_block_content(&b.content)),
        Block::Heading(b) => {
            let block_type = match b.level {
                1 => "heading_1",
                2 => "heading_2",
                3 => "heading_3",
                other => {
                    return Err(SchemaError::InvalidField {
                        field: "heading.level".to_string(),
                        reason: format!("level must be 1 to 3, got {}", other),
                    })
                }
            };
            (block_type, encode_text_block_content(&b.content))
        }
        Block::BulletedListItem(b) => ("bulleted_list_item", encode_text_block_content(&b.content)),
        Block::NumberedListItem(b) => ("numbered_list_item", encode_text_block_content(&b.content)),
        Block::ToDo(b) => {
            let mut body = encode_text_block_content(&b.content);
            body["checked"] = json!(b.checked);
            ("to_do", body)
        }
        Block::Quote(b) => ("quote", encode_text_block_content(&b.content)),
        Block::Callout(b) => {
            let mut body = encode_text_block_content(&b.content);
            if let Some(icon) = &b.icon {
                body["icon"] = encode_icon(icon);
            }
            ("callout", body)
        }
        Block::Toggle(b) => ("toggle", encode_text_block_content(&b.content)),
        Block::Code(b) => {
            let language = if b.language.is_empty() {
                PLAIN_TEXT_LANGUAGE
            } else {
                b.language.as_str()
            };
            (
                "code",
                json!({"rich_text": encode_rich_text(&b.rich_text), "language": language}),
            )
        }
        Block::Divider(_) => ("divider", json!({})),
        Block::Table(b) => (
            "table",
            json!({
                "table_width": b.table_width(),
                "has_column_header": b.has_header,
                "has_row_header": false,
            }),
        ),
        Block::Image(b) => {
            let url = ValidatedUrl::parse(&b.url).map_err(|e| SchemaError::InvalidField {
                field: "image.url".to_string(),
                reason: e.to_string(),
            })?;
            (
                "image",
                json!({
                    "type": "external",
                    "external": {"url": url.as_str()},
                    "caption": encode_rich_text(&b.caption),
                }),
            )
        }
        Block::ChildPage(_) => {
            return Err(SchemaError::UnsupportedBlock {
                block_type: "child_page".to_string(),
            })
        }
        Block::Unsupported(b) => {
            return Err(SchemaError::UnsupportedBlock {
                block_type: b.block_type.clone(),
            })
        }
    };
    Ok(encoded)
}

fn encode_text_block_content(content: &TextBlockContent) -> Value {
    json!({
        "rich_text": encode_rich_text(&content.rich_text),
        "color": content.color.as_str(),
    })
}

/// Encode spans, splitting any longer than the segment cap.
pub fn encode_rich_text(spans: &[TextSpan]) -> Value {
    let spans = split_long_spans(spans.to_vec(), RICH_TEXT_SEGMENT_CAP);
    Value::Array(
        spans
            .iter()
            .map(|span| {
                let link = span.link.as_ref().map(|url| json!({"url": url}));
                json!({
                    "type": "text",
                    "text": {"content": span.content, "link": link},
                    "annotations": {
                        "bold": span.annotations.bold,
                        "italic": span.annotations.italic,
                        "strikethrough": span.annotations.strikethrough,
                        "underline": span.annotations.underline,
                        "code": span.annotations.code,
                        "color": span.annotations.color.as_str(),
                    },
                })
            })
            .collect(),
    )
}

fn encode_icon(icon: &Icon) -> Value {
    match icon {
        Icon::Emoji { emoji } => json!({"type": "emoji", "emoji": emoji}),
        Icon::External { url } => json!({"type": "external", "external": {"url": url}}),
    }
}

/// Encode a page parent.
pub fn encode_parent(parent: &Parent) -> Value {
    match parent {
        Parent::Page { page_id } => json!({"type": "page_id", "page_id": page_id.to_dashed()}),
        Parent::Database { database_id } => {
            json!({"type": "database_id", "database_id": database_id.to_dashed()})
        }
    }
}

/// The `properties` object of a page title.
pub fn encode_title(title: &str) -> Value {
    json!({"title": {"title": encode_rich_text(&[TextSpan::plain(title)])}})
}

/// Encode validated property updates as a `properties` object.
pub fn encode_properties(patches: &PropertyPatches) -> Result<Value, SchemaError> {
    let mut properties = Map::new();
    for (name, patch) in patches {
        patch.validate(name.as_str())?;
        let value = match patch {
            PropertyPatch::Title(spans) => json!({"title": encode_rich_text(spans)}),
            PropertyPatch::RichText(spans) => json!({"rich_text": encode_rich_text(spans)}),
            PropertyPatch::Number(n) => json!({"number": n}),
            PropertyPatch::Select(option) => {
                json!({"select": option.as_ref().map(|name| json!({"name": name}))})
            }
            PropertyPatch::Status(option) => {
                json!({"status": option.as_ref().map(|name| json!({"name": name}))})
            }
            PropertyPatch::MultiSelect(options) => json!({
                "multi_select": options.iter().map(|name| json!({"name": name})).collect::<Vec<_>>()
            }),
            PropertyPatch::Date { start, end } => json!({"date": {"start": start, "end": end}}),
            PropertyPatch::Checkbox(checked) => json!({"checkbox": checked}),
            PropertyPatch::Url(url) => json!({"url": url.as_ref().map(ValidatedUrl::as_str)}),
            PropertyPatch::Email(email) => json!({"email": email}),
            PropertyPatch::PhoneNumber(phone) => json!({"phone_number": phone}),
        };
        properties.insert(name.as_str().to_string(), value);
    }
    Ok(Value::Object(properties))
}
