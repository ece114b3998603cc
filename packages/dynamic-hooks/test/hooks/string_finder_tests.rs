/**
 * String Hook Finder Tests
 *
 * Replacing text hooks in a document with anchor elements.
 */

#[cfg(test)]
mod tests {
    use dynamic_hooks::hooks::{
        collect_text, find_enclosing_hooks, find_standalone_hooks, find_string_hooks, PositionCandidate,
    };
    use dynamic_hooks::{Diagnostics, Document, NodeId};
    use regex::Regex;

    fn box_finder() -> impl FnMut(&str, &mut Diagnostics) -> Vec<PositionCandidate> {
        let opening = Regex::new(r"\[box\]").unwrap();
        let closing = Regex::new(r"\[/box\]").unwrap();
        move |content: &str, diagnostics: &mut Diagnostics| {
            let found = find_enclosing_hooks(content, &opening, &closing, true);
            diagnostics.append(found.diagnostics);
            found
                .positions
                .into_iter()
                .map(|p| PositionCandidate::new(0, "box", p))
                .collect()
        }
    }

    fn element_named(doc: &Document, name: &str) -> NodeId {
        doc.descendants(doc.root())
            .into_iter()
            .find(|id| doc.element(*id).is_some_and(|el| el.name == name))
            .unwrap()
    }

    #[test]
    fn should_collect_text_outside_skipped_subtrees() {
        let doc = Document::parse("<div><p>[a]</p><section>[b]</section>tail</div>");
        let section = element_named(&doc, "section");
        let text = collect_text(&doc, doc.root(), |id| id == section);
        assert_eq!(text.content, "[a]tail");
    }

    #[test]
    fn should_keep_the_first_parser_on_duplicates() {
        let mut doc = Document::parse("<p>[hero] and [hero]</p>");
        let root = doc.root();
        let regex = Regex::new(r"\[hero\]").unwrap();
        let outcome = find_string_hooks(
            &mut doc,
            root,
            |content, _| {
                let mut candidates: Vec<PositionCandidate> = find_standalone_hooks(content, &regex)
                    .into_iter()
                    .map(|p| PositionCandidate::new(0, "a", p))
                    .collect();
                candidates.extend(
                    find_standalone_hooks(content, &regex)
                        .into_iter()
                        .take(1)
                        .map(|p| PositionCandidate::new(1, "b", p)),
                );
                candidates
            },
            |_| false,
        );

        assert_eq!(outcome.hooks.len(), 2);
        assert!(outcome.hooks.iter().all(|h| h.parser_name == "a"));
        assert!(outcome.diagnostics.has_warning_containing("Duplicate hook."));
        assert_eq!(
            doc.to_html(),
            "<p><dynamic-component-anchor></dynamic-component-anchor> and \
             <dynamic-component-anchor></dynamic-component-anchor></p>"
        );
    }

    #[test]
    fn should_move_elements_between_tags_into_the_anchor() {
        let mut doc = Document::parse("<div>[box]<p>one</p><p>two</p>[/box]</div>");
        let root = doc.root();
        let outcome = find_string_hooks(&mut doc, root, box_finder(), |_| false);
        assert_eq!(outcome.hooks.len(), 1);
        assert_eq!(
            doc.to_html(),
            "<div><dynamic-component-anchor><p>one</p><p>two</p></dynamic-component-anchor></div>"
        );
    }

    #[test]
    fn should_nest_anchors_of_nested_hooks() {
        let mut doc = Document::parse("<p>[box]a [box]b[/box][/box]</p>");
        let root = doc.root();
        let outcome = find_string_hooks(&mut doc, root, box_finder(), |_| false);
        assert_eq!(outcome.hooks.len(), 2);
        assert_eq!(doc.parent(outcome.hooks[1].anchor), Some(outcome.hooks[0].anchor));
        assert_eq!(
            doc.to_html(),
            "<p><dynamic-component-anchor>a <dynamic-component-anchor>b</dynamic-component-anchor>\
             </dynamic-component-anchor></p>"
        );
    }

    #[test]
    fn should_leave_hooks_spanning_elements_as_text() {
        let html = "<div>[box]<p>x[/box]</p></div>";
        let mut doc = Document::parse(html);
        let root = doc.root();
        let outcome = find_string_hooks(&mut doc, root, box_finder(), |_| false);
        assert!(outcome.hooks.is_empty());
        assert!(outcome.diagnostics.has_warning_containing("same element"));
        assert_eq!(doc.to_html(), html);
    }

    #[test]
    fn should_not_search_skipped_subtrees() {
        let mut doc = Document::parse("<div><p>[box]x[/box]</p><aside>[box]y[/box]</aside></div>");
        let aside = element_named(&doc, "aside");
        let root = doc.root();
        let outcome = find_string_hooks(&mut doc, root, box_finder(), |id| id == aside);
        assert_eq!(outcome.hooks.len(), 1);
        assert_eq!(doc.text_content(aside), "[box]y[/box]");
    }
}
