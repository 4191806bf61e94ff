#![no_main]
use libfuzzer_sys::fuzz_target;
use mdxmath_syntax::{ExpressionParser, TemplateParser};
use mdxmath_transform::{TokenTag, Tokenizer, wrap_raw};

fuzz_target!(|data: &[u8]| {
    let s = String::from_utf8_lossy(data);

    // Tokenizing is total in both modes, and tokens cover the input exactly.
    let tokenizers = [Tokenizer::marker("\\js"), Tokenizer::delimited("{", "}")];
    for tokenizer in tokenizers.into_iter().flatten() {
        let covered: String = tokenizer.tokens(&s).iter().map(|t| t.text).collect();
        assert_eq!(covered, s);

        // Regions never overlap: boundaries go enter, exit, enter, ...
        let mut open = false;
        for token in tokenizer.tokens(&s) {
            match token.tag {
                TokenTag::EnterExpression => assert!(!open, "region opened twice"),
                TokenTag::ExitExpression => assert!(open, "region closed while not open"),
                TokenTag::Literal => continue,
            }
            open = !open;
        }

        let template = tokenizer.normalize(&s);
        let _ = TemplateParser.parse_expression(&wrap_raw(&template));
    }

    // Raw input straight into the parser.
    let _ = TemplateParser.parse_expression(&s);
});
