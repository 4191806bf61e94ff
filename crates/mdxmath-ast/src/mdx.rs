//! Minimal MDX printer.
//!
//! Only what is needed to show transformed math in context: block nodes are
//! separated by blank lines, JSX flow elements put their children on
//! indented lines, and text elements stay on one line.
//!
//! ```text
//! Hey this is math <Math>{\frac{a}{b}}</Math>
//!
//! <Math display>
//!   {\frac{a}{b}}
//! </Math>
//! ```

use crate::tree::{Attribute, JsxElement, Node, Table};

/// Prints a node and its subtree as MDX. A root always ends with a newline.
pub fn to_mdx(node: &Node) -> String {
    match node {
        Node::Root(root) => {
            let mut out = blocks(&root.children, "\n\n");
            out.push('\n');
            out
        }
        _ => print(node),
    }
}

/// Joins printed blocks; nodes that print nothing leave no gap.
fn blocks(children: &[Node], separator: &str) -> String {
    children
        .iter()
        .map(print)
        .filter(|block| !block.is_empty())
        .collect::<Vec<_>>()
        .join(separator)
}

fn inline(children: &[Node]) -> String {
    children.iter().map(print).collect()
}

fn print(node: &Node) -> String {
    match node {
        Node::Root(p) => blocks(&p.children, "\n\n"),
        Node::Paragraph(p) => inline(&p.children),
        Node::Heading(h) => format!("{} {}", "#".repeat(h.depth.max(1) as usize), inline(&h.children)),
        Node::Blockquote(p) => prefix_lines(&blocks(&p.children, "\n\n"), "> "),
        Node::List(list) => list
            .children
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let marker = if list.ordered {
                    format!("{}. ", i + 1)
                } else {
                    "- ".to_string()
                };
                let body = print(item);
                let indent = " ".repeat(marker.len());
                let mut lines = body.lines();
                let first = lines.next().unwrap_or_default();
                let rest: Vec<String> = lines
                    .map(|line| {
                        if line.is_empty() {
                            String::new()
                        } else {
                            format!("{indent}{line}")
                        }
                    })
                    .collect();
                if rest.is_empty() {
                    format!("{marker}{first}")
                } else {
                    format!("{marker}{first}\n{}", rest.join("\n"))
                }
            })
            .collect::<Vec<_>>()
            .join("\n"),
        Node::ListItem(p) => blocks(&p.children, "\n\n"),
        Node::Emphasis(p) => format!("*{}*", inline(&p.children)),
        Node::Strong(p) => format!("**{}**", inline(&p.children)),
        Node::Link(link) => match &link.title {
            Some(title) => format!("[{}]({} \"{}\")", inline(&link.children), link.url, title),
            None => format!("[{}]({})", inline(&link.children), link.url),
        },
        Node::Text(t) => t.value.clone(),
        Node::InlineCode(c) => format!("`{}`", c.value),
        Node::Code(code) => format!(
            "```{}\n{}\n```",
            code.lang.as_deref().unwrap_or_default(),
            code.value
        ),
        Node::Html(h) => h.value.clone(),
        Node::Break => "\\\n".to_string(),
        Node::ThematicBreak => "***".to_string(),
        Node::Math(m) => format!("$$\n{}\n$$", m.value),
        Node::InlineMath(m) => format!("${}$", m.value),
        Node::MdxJsxFlowElement(element) => flow_element(element),
        Node::MdxJsxTextElement(element) => text_element(element),
        Node::MdxFlowExpression(e) | Node::MdxTextExpression(e) => format!("{{{}}}", e.value),
        Node::Delete(p) => format!("~~{}~~", inline(&p.children)),
        Node::Image(image) => {
            let alt = image.alt.as_deref().unwrap_or_default();
            match &image.title {
                Some(title) => format!("![{alt}]({} \"{title}\")", image.url),
                None => format!("![{alt}]({})", image.url),
            }
        }
        Node::Table(table) => print_table(table),
        Node::TableRow(row) => table_row(&row.children),
        Node::TableCell(cell) => inline(&cell.children),
        Node::Yaml(y) => format!("---\n{}\n---", y.value),
        // Unknown literals (`mdxjsEsm`, ...) print their source text.
        Node::Other(value) => value
            .get("value")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string(),
    }
}

fn table_row(cells: &[Node]) -> String {
    let cells: Vec<String> = cells.iter().map(print).collect();
    format!("| {} |", cells.join(" | "))
}

/// GFM pipe table; the delimiter row follows the first row.
fn print_table(table: &Table) -> String {
    let mut rows = table.children.iter().map(print);
    let Some(head) = rows.next() else {
        return String::new();
    };
    let columns = table.children[0].children().map_or(0, <[Node]>::len);
    let delimiter: Vec<&str> = (0..columns)
        .map(|i| match table.align.get(i).and_then(Option::as_deref) {
            Some("left") => ":--",
            Some("right") => "--:",
            Some("center") => ":-:",
            _ => "---",
        })
        .collect();

    let mut lines = vec![head, format!("| {} |", delimiter.join(" | "))];
    lines.extend(rows);
    lines.join("\n")
}

fn open_tag(element: &JsxElement) -> String {
    let mut tag = format!("<{}", element.name);
    for attribute in &element.attributes {
        match attribute {
            Attribute::MdxJsxAttribute(attr) => match &attr.value {
                Some(value) => tag.push_str(&format!(" {}=\"{}\"", attr.name, value)),
                None => tag.push_str(&format!(" {}", attr.name)),
            },
            Attribute::MdxJsxExpressionAttribute(expr) => {
                tag.push_str(&format!(" {{{}}}", expr.value))
            }
        }
    }
    tag
}

fn flow_element(element: &JsxElement) -> String {
    let open = open_tag(element);
    if element.children.is_empty() {
        return format!("{open} />");
    }
    let body = prefix_lines(&blocks(&element.children, "\n\n"), "  ");
    format!("{open}>\n{body}\n</{}>", element.name)
}

fn text_element(element: &JsxElement) -> String {
    let open = open_tag(element);
    if element.children.is_empty() {
        return format!("{open} />");
    }
    format!("{open}>{}</{}>", inline(&element.children), element.name)
}

/// Prefixes every non-empty line; empty lines keep a trimmed prefix.
fn prefix_lines(text: &str, prefix: &str) -> String {
    text.split('\n')
        .map(|line| {
            if line.is_empty() {
                prefix.trim_end().to_string()
            } else {
                format!("{prefix}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
