use scraper::{ElementRef, Node};

pub fn extract_text(node: ElementRef) -> String {
    node.text().collect::<String>()
}

// Some hrefs on the site arrive double-escaped.
pub fn unescape_ampersands(href: &str) -> String {
    href.replace("&amp;", "&")
}

/// Splits an element's content into lines at its `<br>` children.
///
/// Each line is the text of everything between two breaks, with runs of
/// whitespace collapsed. Empty lines are kept so positions stay stable.
pub fn extract_lines(node: ElementRef) -> Vec<String> {
    let mut lines = vec![];
    let mut current = String::new();
    for child in node.children() {
        match child.value() {
            Node::Text(text) => current.push_str(text),
            Node::Element(element) if element.name() == "br" => {
                lines.push(collapse_whitespace(&current));
                current.clear();
            }
            Node::Element(_) => {
                if let Some(nested) = ElementRef::wrap(child) {
                    current.push_str(&extract_text(nested));
                }
            }
            _ => {}
        }
    }
    lines.push(collapse_whitespace(&current));
    lines
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    fn first<'a>(document: &'a Html, css: &str) -> ElementRef<'a> {
        let selector = Selector::parse(css).unwrap();
        document.select(&selector).next().unwrap()
    }

    #[test]
    fn splits_on_line_breaks() {
        let document = Html::parse_fragment(
            "<div>Parkhaus Altstadt<br/>  Tübinger Straße 2 <br>71083 Herrenberg</div>",
        );
        let lines = extract_lines(first(&document, "div"));
        assert_eq!(
            lines,
            vec!["Parkhaus Altstadt", "Tübinger Straße 2", "71083 Herrenberg"]
        );
    }

    #[test]
    fn keeps_nested_text_and_empty_lines() {
        let document =
            Html::parse_fragment("<div><br/><span>Hilde-Domin-\n Straße</span> 4<br/></div>");
        let lines = extract_lines(first(&document, "div"));
        assert_eq!(lines, vec!["", "Hilde-Domin- Straße 4", ""]);
    }

    #[test]
    fn unescapes_double_escaped_ampersands() {
        assert_eq!(
            unescape_ampersands("index.php?id=1&amp;view=2"),
            "index.php?id=1&view=2"
        );
    }
}
