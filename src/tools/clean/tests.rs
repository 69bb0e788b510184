#![cfg(test)]
mod tests {
    use crate::tools::clean::*;
    use serde_json::json;

    fn clean(text: &str) -> String {
        clean_text(text).unwrap()
    }

    #[test]
    fn test_html_entities_named() {
        assert_eq!(clean("&amp;"), "&");
        assert_eq!(clean("&lt;"), "<");
        assert_eq!(clean("&gt;"), ">");
        assert_eq!(clean("&quot;"), "\"");
        assert_eq!(clean("&apos;"), "'");
        // nbsp is decoded but then normalized by whitespace normalization
        assert_eq!(clean("&nbsp;"), "");
        assert_eq!(clean("caf&eacute;"), "café");
    }

    #[test]
    fn test_html_entities_numeric() {
        assert_eq!(clean("&#39;"), "'");
        assert_eq!(clean("&#x27;"), "'");
        assert_eq!(clean("&#34;"), "\"");
        assert_eq!(clean("&#233;t&#xE9;"), "été");
    }

    #[test]
    fn test_html_entities_combined() {
        assert_eq!(clean("&lt;div&gt;"), "<div>");
        assert_eq!(clean("Tom &amp; Jerry"), "Tom & Jerry");
        assert_eq!(clean("It&#39;s &quot;great&quot;"), "It's \"great\"");
    }

    #[test]
    fn test_mojibake_repair() {
        assert_eq!(clean("schÃ¶n"), "schön");
        assert_eq!(clean("L&AMP;AMP;ATILDE;&AMP;AMP;SUP3;PEZ"), "LóPEZ");
        assert_eq!(clean("Ã la mode"), "à la mode");
        assert_eq!(clean("â€œquotedâ€\u{9D} and itâ€™s"), "\"quoted\" and it's");
    }

    #[test]
    fn test_unicode_normalization() {
        let precomposed = "\u{00E9}";
        let decomposed = "e\u{0301}";
        assert_eq!(clean(precomposed), clean(decomposed));
        assert_eq!(clean(decomposed), "\u{00E9}");
    }

    #[test]
    fn test_control_characters() {
        assert_eq!(clean("hello\x00world"), "helloworld");
        assert_eq!(clean("\x1b[1mbold\x1b[0m"), "bold");
        assert_eq!(clean("\u{FEFF}text"), "text");
    }

    #[test]
    fn test_line_breaks_fold_to_spaces() {
        assert_eq!(clean("line1\nline2"), "line1 line2");
        assert_eq!(clean("a\r\nb\tc"), "a b c");
        assert_eq!(clean("First\r\nSecond\rThird\u{2028}Fourth"), "First Second Third Fourth");
    }

    #[test]
    fn test_whitespace_normalization() {
        assert_eq!(clean("hello   world\n\nfoo"), "hello world foo");
        assert_eq!(clean("  trim  me  "), "trim me");
        assert_eq!(clean("lots\t\t\tof\t\ttabs"), "lots of tabs");
        assert_eq!(clean("   padded text   "), "padded text");
    }

    #[test]
    fn test_placeholder_glyphs_removed() {
        assert_eq!(clean("broken\u{FFFD}text"), "brokentext");
        assert_eq!(clean("\u{2022} item one \u{2022} item two"), "item one item two");
    }

    #[test]
    fn test_placeholder_glyphs_from_repair_removed() {
        // mojibake for a bullet only becomes a bullet during repair
        assert_eq!(clean("â€¢ item"), "item");
    }

    #[test]
    fn test_custom_placeholder_glyphs() {
        let opts = CleanOptions {
            placeholder_glyphs: PlaceholderGlyphs::default().with_glyph("\u{25A1}"),
            ..Default::default()
        };
        assert_eq!(normalize("box\u{25A1}ed \u{2022}", &opts).unwrap(), "boxed");

        let none = CleanOptions {
            placeholder_glyphs: PlaceholderGlyphs::new(Vec::<String>::new()),
            ..Default::default()
        };
        assert_eq!(normalize("\u{2022} kept", &none).unwrap(), "\u{2022} kept");
    }

    #[test]
    fn test_placeholder_glyphs_ignore_empty_and_duplicates() {
        let glyphs = PlaceholderGlyphs::new(["", "*", "*"]);
        assert_eq!(glyphs.iter().collect::<Vec<_>>(), vec!["*"]);
        assert_eq!(glyphs.strip("a*b"), "ab");
    }

    #[test]
    fn test_ascii_restriction() {
        let result = clean_text_ascii("héllo wörld").unwrap();
        assert_eq!(result, "hllo wrld");
        assert!(result.chars().all(|c| (c as u32) <= 127));
    }

    #[test]
    fn test_ascii_restriction_after_repair() {
        // repair first, then drop: the curly quotes are straightened, the ö is dropped
        assert_eq!(clean_text_ascii("â€œschÃ¶nâ€\u{9D}").unwrap(), "\"schn\"");
        assert_eq!(clean_text_ascii("日本 text").unwrap(), "text");
    }

    #[test]
    fn test_empty_and_whitespace() {
        assert_eq!(clean(""), "");
        assert_eq!(clean("   "), "");
        assert_eq!(clean("\n\n\n"), "");
        assert_eq!(clean("\t\t\t"), "");
    }

    #[test]
    fn test_no_changes_needed() {
        assert_eq!(clean("perfect text"), "perfect text");
        assert_eq!(clean("hello-world"), "hello-world");
        assert_eq!(clean("a/b/c"), "a/b/c");
    }

    #[test]
    fn test_unicode_characters() {
        assert_eq!(clean("Hello 👋 World 🌍"), "Hello 👋 World 🌍");
        assert_eq!(clean("Café"), "Café");
        assert_eq!(clean("日本語"), "日本語");
    }

    #[test]
    fn test_typographic_cleanup() {
        assert_eq!(clean("\u{201C}Smart\u{201D} \u{FB01}le"), "\"Smart\" file");
        assert_eq!(clean("ＦＵＬＬ\u{3000}ｗｉｄｔｈ"), "FULL width");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let inputs = [
            "hello   world\n\nfoo",
            "schÃ¶n",
            "caf&eacute; \u{2022} bar",
            "L&AMP;AMP;ATILDE;&AMP;AMP;SUP3;PEZ",
            "â€¢ item â€œxâ€\u{9D}",
            "\u{FB01}ne\r\n\tＬＯＵＤ  text",
            "Ã la mode",
        ];
        for input in inputs {
            let once = clean(input);
            assert_eq!(clean(&once), once, "input: {input:?}");
        }
    }

    #[test]
    fn test_idempotent_when_line_breaks_touch_mojibake() {
        let inputs = [
            "Ã\ra m\u{9d}\r\r",
            "Â\n; ",
            "ð•¢\rœ\u{a0}x\u{a0}",
            "Ã\n\u{a0}la",
            "â€\r\nœ x",
            "caf\u{c3}\r\n\u{a9} ok",
        ];
        for input in inputs {
            let once = clean(input);
            assert_eq!(clean(&once), once, "input: {input:?}");
        }
    }

    #[test]
    fn test_entity_exposed_by_glyph_removal_is_decoded() {
        assert_eq!(clean("&amâ€¢p;"), "&");
        assert_eq!(clean("&am\u{2022}p;"), "&");
        assert_eq!(clean_text_ascii("&am\u{e9}p;").unwrap(), "&");
        assert_eq!(clean_text_ascii("&").unwrap(), "&");
    }

    #[test]
    fn test_deep_escape_nesting_is_not_fatal() {
        let text = format!("a &{}b", "amp;".repeat(20));
        assert_eq!(clean(&text), "a &b");

        let opts = CleanOptions::default();
        let value = json!(format!("&{}", "amp;".repeat(32)));
        assert_eq!(normalize_value(value, &opts).unwrap(), json!("&"));
    }

    #[test]
    fn test_normalize_value_passes_non_strings_through() {
        let opts = CleanOptions::default();
        for value in [
            json!(null),
            json!(true),
            json!(3.5),
            json!(""),
            json!(["  a  "]),
            json!({"k": "  v  "}),
        ] {
            assert_eq!(normalize_value(value.clone(), &opts).unwrap(), value);
        }
    }

    #[test]
    fn test_normalize_value_cleans_strings() {
        let opts = CleanOptions::ascii();
        assert_eq!(
            normalize_value(json!("  héllo\nwörld "), &opts).unwrap(),
            json!("hllo wrld")
        );
    }

    #[test]
    fn test_options_deserialize_with_defaults() {
        let opts: CleanOptions = serde_json::from_str(
            r#"{"restrict_to_ascii": true, "placeholder_glyphs": ["*"], "repair": {"uncurl_quotes": false}}"#,
        )
        .unwrap();
        assert!(opts.restrict_to_ascii);
        assert_eq!(opts.placeholder_glyphs.iter().collect::<Vec<_>>(), vec!["*"]);
        assert!(!opts.repair.uncurl_quotes);
        assert!(opts.repair.fix_encoding);

        let empty: CleanOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, CleanOptions::default());
    }
}
