#[cfg(test)]
mod tests {
    use crate::codegen::{generate_flux_code, generate_insert_code};
    use crate::node::CanvasNode;
    use crate::tree::walk_preorder;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn with_id(mut node: CanvasNode, id: &str) -> CanvasNode {
        node.id = id.to_string();
        node
    }

    #[test]
    fn test_empty_forest_page_and_component() {
        assert_eq!(generate_flux_code(&[], "Home", false), "page Home {\n}\n");
        assert_eq!(generate_flux_code(&[], "Widget", true), "component Widget() {\n}\n");
    }

    #[test]
    fn test_button_with_style_and_text() {
        let button = with_id(
            CanvasNode::new("Button")
                .with_prop("content", "Click me")
                .with_style("color", "red"),
            "btn1",
        );
        let out = generate_flux_code(&[button], "Home", false);
        let expected = "\
page Home {
  style {
    .btn1 {
      color: red;
    }
  }

  <Button class=\"btn1\">Click me</Button>
}
";
        assert_eq!(out, expected);
    }

    #[test]
    fn test_expression_vs_literal_props() {
        let input = with_id(
            CanvasNode::new("Input")
                .with_prop("value", "user.name")
                .with_prop("placeholder", "primary"),
            "in1",
        );
        let out = generate_insert_code(&input);
        assert!(out.contains("value={user.name}"), "{out}");
        assert!(out.contains("placeholder=\"primary\""), "{out}");
    }

    #[test]
    fn test_attribute_order_is_declared_then_alphabetical() {
        let node = with_id(
            CanvasNode::new("Input")
                .with_prop("zIndex", 3)
                .with_prop("required", true)
                .with_prop("label", "Name")
                .with_prop("ariaLabel", "name field")
                .with_event("onKeyDown", "check()")
                .with_event("onChange", "name = e.target.value"),
            "in2",
        );
        assert_eq!(
            generate_insert_code(&node),
            "<Input required ariaLabel=\"name field\" zIndex={3} class=\"in2\" \
             onChange={() => { name = e.target.value }} onKeyDown={() => { check() }}>Name</Input>"
        );
    }

    #[test]
    fn test_generation_is_idempotent() {
        let forest = vec![
            CanvasNode::new("Heading").with_prop("content", "Title").with_style("margin", "0"),
            CanvasNode::new("Row")
                .with_prop("gap", 8)
                .with_style("padding", "4px")
                .with_style("align-items", "center")
                .with_child(CanvasNode::new("Button").with_prop("content", "A").with_event("onClick", "a()"))
                .with_child(CanvasNode::new("Image").with_prop("src", "/x.png")),
        ];
        let first = generate_flux_code(&forest, "Home", false);
        let second = generate_flux_code(&forest, "Home", false);
        assert_eq!(first, second);
    }

    #[test]
    fn test_multiple_roots_are_wrapped() {
        let a = with_id(CanvasNode::new("Spacer"), "a");
        let b = with_id(CanvasNode::new("Divider"), "b");
        let out = generate_flux_code(&[a, b], "Home", false);
        assert_eq!(
            out,
            "page Home {\n  <div>\n    <Spacer class=\"a\" />\n    <Divider class=\"b\" />\n  </div>\n}\n"
        );
    }

    #[test]
    fn test_self_closing_and_text_are_exclusive() {
        let forest = vec![
            CanvasNode::new("Text").with_prop("content", "hello"),
            CanvasNode::new("Text"),
            CanvasNode::new("Spacer"),
            // Children on a leaf component are not rendered.
            CanvasNode::new("Button").with_prop("content", "Go").with_child(CanvasNode::new("Icon")),
            CanvasNode::new("Card").with_child(CanvasNode::new("Text").with_prop("content", "inside")),
        ];
        let out = generate_flux_code(&forest, "Home", false);
        for line in out.lines().map(str::trim) {
            if line.ends_with("/>") {
                assert!(!line.contains("</"), "self-closing line also closes: {line}");
            }
        }
        assert!(out.contains(&format!("<Text class=\"{}\">hello</Text>", forest[0].id)));
        assert!(out.contains(&format!("<Text class=\"{}\" />", forest[1].id)));
        assert!(out.contains(&format!("<Button class=\"{}\">Go</Button>", forest[3].id)));
        assert!(!out.contains("<Icon"));
        assert!(out.contains(&format!("<Card class=\"{}\">\n", forest[4].id)));
    }

    #[test]
    fn test_text_prop_becomes_attribute_when_children_render() {
        let card = with_id(
            CanvasNode::new("Card")
                .with_prop("title", "Plans")
                .with_child(with_id(CanvasNode::new("Spacer"), "s1")),
            "c1",
        );
        assert_eq!(
            generate_insert_code(&card),
            "<Card title=\"Plans\" class=\"c1\">\n  <Spacer class=\"s1\" />\n</Card>"
        );
    }

    #[test]
    fn test_every_style_rule_matches_a_class() {
        let forest = vec![CanvasNode::new("Column")
            .with_style("gap", "4px")
            .with_child(CanvasNode::new("Text").with_prop("content", "x").with_style("color", "blue"))
            .with_child(CanvasNode::new("Row").with_child(CanvasNode::new("Badge").with_style("border", "1px solid")))];
        let out = generate_flux_code(&forest, "Home", false);

        let mut styled = Vec::new();
        walk_preorder(&forest, &mut |node| {
            if !node.styles.is_empty() {
                styled.push(node.id.clone());
            }
        });
        assert_eq!(styled.len(), 3);
        for id in styled {
            assert!(out.contains(&format!("    .{} {{\n", id)), "missing rule for {id}");
            assert!(out.contains(&format!("class=\"{}\"", id)), "missing class for {id}");
        }
        let style_at = out.find("style {").unwrap();
        let markup_at = out.find("<Column").unwrap();
        assert!(style_at < markup_at);
    }

    #[test]
    fn test_text_and_attribute_escaping() {
        let node = with_id(
            CanvasNode::new("Text")
                .with_prop("content", "a < b & {c}")
                .with_prop("color", "say \"hi\""),
            "t",
        );
        assert_eq!(
            generate_insert_code(&node),
            "<Text color=\"say &quot;hi&quot;\" class=\"t\">a &lt; b &amp; &#123;c&#125;</Text>"
        );
    }

    #[test]
    fn test_structured_and_boolean_props() {
        let node = with_id(
            CanvasNode::new("Select")
                .with_prop("options", json!(["s", "m"]))
                .with_prop("disabled", true)
                .with_prop("multiple", false)
                .with_prop("placeholder", ""),
            "sel",
        );
        let out = generate_insert_code(&node);
        assert!(out.contains("options={[\"s\",\"m\"]}"), "{out}");
        assert!(out.contains(" disabled "), "{out}");
        assert!(out.contains("multiple={false}"), "{out}");
        assert!(!out.contains("placeholder"), "{out}");
    }

    #[test]
    fn test_unknown_component_renders_children() {
        let node = with_id(CanvasNode::new("section").with_child(with_id(CanvasNode::new("Spacer"), "sp")), "sec");
        assert_eq!(
            generate_insert_code(&node),
            "<section class=\"sec\">\n  <Spacer class=\"sp\" />\n</section>"
        );
    }

    #[test]
    fn test_commented_handler_body_gets_its_own_line() {
        let node = with_id(
            CanvasNode::new("Button")
                .with_prop("content", "Go")
                .with_event("onClick", "count += 1 // bump"),
            "b",
        );
        assert_eq!(
            generate_insert_code(&node),
            "<Button class=\"b\" onClick={() => {\n  count += 1 // bump\n}}>Go</Button>"
        );
    }

    #[test]
    fn test_blank_event_handlers_are_skipped() {
        let node = with_id(CanvasNode::new("Button").with_event("onClick", "  "), "b");
        assert_eq!(generate_insert_code(&node), "<Button class=\"b\" />");
    }
}
