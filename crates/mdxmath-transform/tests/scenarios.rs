use mdxmath_ast::mdx::to_mdx;
use mdxmath_ast::{Attribute, Literal, Node, Parent};
use mdxmath_syntax::TemplateParser;
use mdxmath_transform::{Options, TransformError, Transcoder, transform, transform_with_default_parser};

fn text(value: &str) -> Node {
    Node::Text(Literal {
        value: value.to_string(),
    })
}

fn inline_math(value: &str) -> Node {
    Node::InlineMath(Literal {
        value: value.to_string(),
    })
}

fn block_math(value: &str) -> Node {
    Node::Math(Literal {
        value: value.to_string(),
    })
}

fn paragraph(children: Vec<Node>) -> Node {
    Node::Paragraph(Parent { children })
}

fn root(children: Vec<Node>) -> Node {
    Node::Root(Parent { children })
}

fn source_of(node: Node) -> (String, bool) {
    let options = Options::new();
    let transcoder = Transcoder::new(&options, &TemplateParser).unwrap();
    let replacement = transcoder.transcode(&node).unwrap();
    (replacement.expression_source, replacement.is_block)
}

#[test]
fn inline_math_without_marker() {
    let (source, is_block) = source_of(inline_math(r"\frac{a}{b}"));
    assert_eq!(source, r"\frac{a}{b}");
    assert!(!is_block);
}

#[test]
fn block_math_without_marker() {
    let options = Options::new();
    let transcoder = Transcoder::new(&options, &TemplateParser).unwrap();
    let replacement = transcoder.transcode(&block_math(r"\frac{a}{b}")).unwrap();
    assert_eq!(replacement.expression_source, r"\frac{a}{b}");

    let Node::MdxJsxFlowElement(element) = replacement.into_node() else {
        panic!("block math should become a flow element");
    };
    assert_eq!(element.name, "Math");
    assert_eq!(element.attributes, vec![Attribute::flag("display")]);
}

#[test]
fn marker_expression_becomes_substitution() {
    let (source, _) = source_of(inline_math(r"\pi = \js{Math.PI}"));
    assert_eq!(source, r"\pi = ${Math.PI}");
}

#[test]
fn marker_expression_keeps_inner_braces() {
    let (source, _) = source_of(inline_math(r"\pi = \js{myFunc({ a: 10 })}"));
    assert_eq!(source, r"\pi = ${myFunc({ a: 10 })}");
}

#[test]
fn marker_without_brace_is_text() {
    let (source, _) = source_of(inline_math(r"\pi = \js"));
    assert_eq!(source, r"\pi = \js");
}

#[test]
fn unterminated_expression_fails_the_document() {
    let tree = root(vec![paragraph(vec![
        inline_math(r"\alpha"),
        inline_math(r"\pi = \js{Math.PI"),
    ])]);
    let err = transform_with_default_parser(tree, &Options::new()).unwrap_err();
    match err {
        TransformError::ExpressionSyntax { kind, template, .. } => {
            assert_eq!(kind, "inlineMath");
            assert_eq!(template, r"\pi = ${Math.PI");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn replacement_keeps_sibling_positions() {
    let tree = root(vec![
        paragraph(vec![
            text("a "),
            inline_math("x"),
            text(" b "),
            inline_math("y"),
            text(" c"),
        ]),
        block_math("z"),
        paragraph(vec![text("end")]),
    ]);

    let tree = transform_with_default_parser(tree, &Options::new()).unwrap();
    let children = tree.children().unwrap();
    let kinds: Vec<_> = children[0]
        .children()
        .unwrap()
        .iter()
        .map(Node::kind)
        .collect();
    assert_eq!(
        kinds,
        ["text", "mdxJsxTextElement", "text", "mdxJsxTextElement", "text"]
    );
    assert_eq!(children[1].kind(), "mdxJsxFlowElement");
    assert_eq!(children[2], paragraph(vec![text("end")]));
}

#[test]
fn nested_containers_are_reached() {
    let tree = root(vec![Node::Blockquote(Parent {
        children: vec![paragraph(vec![Node::Emphasis(Parent {
            children: vec![inline_math(r"\js{n}^2")],
        })])],
    })]);
    let tree = transform_with_default_parser(tree, &Options::new()).unwrap();
    assert_eq!(to_mdx(&tree), "> *<Math>{${n}^2}</Math>*\n");
}

#[test]
fn custom_element_name_and_delimiters() {
    let options = Options::new()
        .with_element_name("Katex")
        .with_delimiters("[[", "]]");
    let tree = root(vec![paragraph(vec![inline_math(r"x = [[value]]")])]);
    let tree = transform_with_default_parser(tree, &options).unwrap();

    let actual = &tree.children().unwrap()[0].children().unwrap()[0];
    let Node::MdxJsxTextElement(element) = actual else {
        panic!("expected a text element, got {}", actual.kind());
    };
    assert_eq!(element.name, "Katex");
    let [Node::MdxTextExpression(expression)] = element.children.as_slice() else {
        panic!("expected one expression child");
    };
    assert_eq!(expression.value, "x = ${value}");
    assert!(expression.data.is_some());
}

#[test]
fn delimited_and_marker_modes_diverge_on_nested_braces() {
    let input = "A{B{C}D}E";
    let delimited = Options::new().with_delimiters("{", "}");
    let marker = Options::new().with_marker("A");

    let tree = || root(vec![paragraph(vec![inline_math(input)])]);
    let expression_of = |tree: &Node| -> String {
        let element = &tree.children().unwrap()[0].children().unwrap()[0];
        match &element.children().unwrap()[0] {
            Node::MdxTextExpression(expression) => expression.value.clone(),
            other => panic!("unexpected {}", other.kind()),
        }
    };

    // Delimited mode closes at the first `}`; `D}E` stays text.
    let tokenized = mdxmath_transform::tokenize(input, "{", "}").unwrap();
    assert_eq!(tokenized, "A${B{C}D}E");
    let tree_a = transform_with_default_parser(tree(), &delimited).unwrap();
    assert_eq!(expression_of(&tree_a), "A${B{C}D}E");

    let tree_b = transform_with_default_parser(tree(), &marker).unwrap();
    assert_eq!(expression_of(&tree_b), "${B{C}D}E");
}

#[test]
fn options_are_reused_across_documents() {
    let options = Options::new();
    let doc = || root(vec![paragraph(vec![inline_math(r"\js{1 + 1}")])]);

    let first = transform(doc(), &options, &TemplateParser).unwrap();
    let second = transform(doc(), &options, &TemplateParser).unwrap();
    assert_eq!(to_mdx(&first), to_mdx(&second));
    assert_eq!(options, Options::new());
}

#[test]
fn invalid_options_fail_before_traversal() {
    let tree = root(vec![paragraph(vec![text("no math")])]);
    let err = transform_with_default_parser(tree, &Options::new().with_marker("")).unwrap_err();
    assert!(matches!(err, TransformError::Config(_)));
}

#[test]
fn documents_without_math_are_unchanged() {
    let tree = root(vec![
        Node::Heading(mdxmath_ast::tree::Heading {
            depth: 2,
            children: vec![text("Title")],
        }),
        paragraph(vec![text("plain")]),
    ]);
    let out = transform_with_default_parser(tree.clone(), &Options::new()).unwrap();
    assert_eq!(out, tree);
}

#[test]
fn markers_inside_a_string_expression_stay_text() {
    let options = Options::new();
    let transcoder = Transcoder::new(&options, &TemplateParser).unwrap();
    let replacement = transcoder
        .transcode(&inline_math(r#"\js{"\js{\js{1 + 1}}"}"#))
        .unwrap();
    assert_eq!(replacement.expression_source, r#"${"\js{\js{1 + 1}}"}"#);
    assert_eq!(
        replacement.parsed_expression.substitutions(),
        vec![r#""\js{\js{1 + 1}}""#.to_string()]
    );
}

#[test]
fn math_inside_gfm_containers_is_replaced() {
    let tree = mdxmath_ast::from_json(
        r#"{"type":"root","children":[
            {"type":"mdxjsEsm","value":"import Math from './Math'"},
            {"type":"table","align":[null],"children":[
                {"type":"tableRow","children":[
                    {"type":"tableCell","children":[{"type":"inlineMath","value":"\\js{n}"}]}
                ]}
            ]},
            {"type":"paragraph","children":[
                {"type":"delete","children":[{"type":"inlineMath","value":"x"}]}
            ]}
        ]}"#,
    )
    .unwrap();
    let out = transform_with_default_parser(tree, &Options::new()).unwrap();
    let children = out.children().unwrap();

    assert_eq!(children[0].kind(), "unknown");
    let cell = &children[1].children().unwrap()[0].children().unwrap()[0];
    assert_eq!(cell.children().unwrap()[0].kind(), "mdxJsxTextElement");
    let deleted = &children[2].children().unwrap()[0];
    assert_eq!(deleted.children().unwrap()[0].kind(), "mdxJsxTextElement");

    assert_eq!(
        to_mdx(&out),
        "import Math from './Math'\n\n| <Math>{${n}}</Math> |\n| --- |\n\n~~<Math>{x}</Math>~~\n"
    );
}

#[test]
fn printed_expressions_are_not_escaped() {
    let tree = root(vec![
        paragraph(vec![text("Hey this is math with JS "), inline_math(r"\pi = \js{Math.PI}")]),
        block_math(r"\pi = \js{Math.PI}"),
    ]);
    let out = transform_with_default_parser(tree, &Options::new()).unwrap();
    assert_eq!(
        to_mdx(&out),
        "Hey this is math with JS <Math>{\\pi = ${Math.PI}}</Math>\n\n<Math display>\n  {\\pi = ${Math.PI}}\n</Math>\n"
    );
}
