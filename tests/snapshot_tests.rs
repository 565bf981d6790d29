// tests/snapshot_tests.rs
//! Snapshot tests for rendering block trees.
//!
//! Uses the `insta` crate with inline snapshots; review changes with
//! `cargo insta review`.

use notionmd::{
    parse_document, render_block, render_document, Annotations, Block, BlockCommon, BlockId,
    CalloutBlock, ChildPageBlock, CodeBlock, Color, Icon, TableBlock, TextBlockContent, TextSpan,
    UnsupportedBlock,
};
use pretty_assertions::assert_eq;

const TEST_BLOCK_ID: &str = "0123456789abcdef0123456789abcdef";

fn text(s: &str) -> Vec<TextSpan> {
    vec![TextSpan::plain(s)]
}

/// A page as the fetcher would assemble it, children attached.
fn fetched_page() -> Vec<Block> {
    let mut notes = Block::paragraph(text("Notes from Monday"));
    notes.set_children(vec![Block::bulleted(text("carried over"), vec![])]);

    vec![
        Block::heading(1, text("Weekly sync")),
        Block::Callout(CalloutBlock {
            common: BlockCommon::default(),
            icon: Some(Icon::emoji("📌")),
            content: TextBlockContent {
                rich_text: vec![
                    TextSpan::plain("Read "),
                    TextSpan::styled("first", Annotations::bold()),
                ],
                color: Color::Default,
            },
        }),
        notes,
        Block::toggle(
            text("Decisions"),
            vec![
                Block::bulleted(text("ship it"), vec![]),
                Block::todo(text("follow up"), false, vec![]),
            ],
        ),
        Block::Code(CodeBlock {
            common: BlockCommon::default(),
            language: String::new(),
            rich_text: text("let x = 1;"),
        }),
        Block::Table(TableBlock {
            common: BlockCommon::default(),
            has_header: true,
            rows: vec![
                vec![text("Owner"), text("Task")],
                vec![text("Ana"), text("Review")],
            ],
        }),
        Block::image("https://example.com/board.png", text("Board photo")),
        Block::ChildPage(ChildPageBlock {
            common: BlockCommon::default(),
            title: "Archive".to_string(),
        }),
        Block::Unsupported(UnsupportedBlock {
            common: BlockCommon::new(BlockId::parse(TEST_BLOCK_ID).unwrap()),
            block_type: "synced_block".to_string(),
        }),
    ]
}

#[test]
fn snapshot_fetched_page() {
    let rendered = render_document(&fetched_page());
    insta::assert_snapshot!(rendered.trim_end(), @r#"
# Weekly sync

> [!NOTE]
> Read **first**

Notes from Monday

- carried over

<details>
<summary>Decisions</summary>

- ship it
- [ ] follow up

</details>

```
let x = 1;
```

| Owner | Task |
| --- | --- |
| Ana | Review |

![Board photo](https://example.com/board.png)

📄 **Archive**

<!-- unsupported block: synced_block (0123456789abcdef0123456789abcdef) -->
"#);
}

#[test]
fn snapshot_nested_lists() {
    let blocks = parse_document("- fruit\n  1. apple\n  1. pear\n     - [x] ripe\n- veg");
    insta::assert_snapshot!(render_document(&blocks).trim_end(), @r"
- fruit
  1. apple
  1. pear
     - [x] ripe
- veg
");
}

#[test]
fn snapshot_escaped_paragraph() {
    let block = Block::paragraph(text("# literal\n- also literal\n> and this\nplain *star*"));
    insta::assert_snapshot!(render_block(&block, 0), @r"
\# literal
\- also literal
\> and this
plain \*star\*
");
}

#[test]
fn test_indented_callout_prefixes_every_line() {
    let blocks = parse_document("> [!IMPORTANT] Backups\n> run nightly");
    assert_eq!(
        render_block(&blocks[0], 2),
        "  > [!IMPORTANT]\n  > Backups run nightly"
    );
}
