//! Read-only access to a rendered page.
//!
//! Field extraction only needs a handful of tree queries, so it is written
//! against [`Node`] rather than a particular HTML engine. Pages fetched
//! through the browser are parsed with `scraper` and walked as
//! [`ElementRef`]s.

use scraper::{ElementRef, Selector};

/// The element queries field extraction relies on.
pub trait Node: Sized {
    /// Descendants matching a CSS selector, in document order.
    fn select_all(&self, css: &str) -> Vec<Self>;
    /// True if this element itself matches a CSS selector.
    fn is(&self, css: &str) -> bool;
    fn element_children(&self) -> Vec<Self>;
    fn parent_element(&self) -> Option<Self>;
    /// The next sibling that is an element, skipping text and comments.
    fn next_element(&self) -> Option<Self>;
    /// Text content with whitespace runs collapsed to single spaces.
    fn text_content(&self) -> String;
    fn attribute(&self, name: &str) -> Option<String>;

    fn first(&self, css: &str) -> Option<Self> {
        self.select_all(css).into_iter().next()
    }
}

fn parse_selector(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(selector) => Some(selector),
        Err(e) => {
            log::warn!("Invalid selector {:?}: {}", css, e);
            None
        }
    }
}

impl<'a> Node for ElementRef<'a> {
    fn select_all(&self, css: &str) -> Vec<Self> {
        match parse_selector(css) {
            Some(selector) => self.select(&selector).collect(),
            None => Vec::new(),
        }
    }

    fn is(&self, css: &str) -> bool {
        parse_selector(css).is_some_and(|selector| selector.matches(self))
    }

    fn element_children(&self) -> Vec<Self> {
        self.children().filter_map(ElementRef::wrap).collect()
    }

    fn parent_element(&self) -> Option<Self> {
        self.parent().and_then(ElementRef::wrap)
    }

    fn next_element(&self) -> Option<Self> {
        self.next_siblings().find_map(ElementRef::wrap)
    }

    fn text_content(&self) -> String {
        self.text()
            .flat_map(str::split_whitespace)
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.value().attr(name).map(str::to_string)
    }
}

/// Where a field lives relative to the landmarks around it.
#[derive(Clone, Copy, Debug)]
pub enum Locator {
    /// The first element matching a selector.
    Css(&'static str),
    /// The element right after a `container` that holds a `marker`,
    /// provided it matches `next` (`container:has(marker) + next`).
    AfterMarked {
        container: &'static str,
        marker: &'static str,
        next: &'static str,
    },
    /// The first `target` inside a `container` that holds a `marker`
    /// (`container:has(marker) target`).
    InsideMarked {
        container: &'static str,
        marker: &'static str,
        target: &'static str,
    },
    /// The element right after a `tag` whose whole text is `label`,
    /// provided it matches `next`.
    AfterLabel {
        tag: &'static str,
        label: &'static str,
        next: &'static str,
    },
}

impl Locator {
    pub fn resolve<N: Node>(&self, root: &N) -> Option<N> {
        match *self {
            Locator::Css(css) => root.first(css),
            Locator::AfterMarked {
                container,
                marker,
                next,
            } => marked(root, container, marker).find_map(|elem| {
                let sibling = elem.next_element()?;
                sibling.is(next).then_some(sibling)
            }),
            Locator::InsideMarked {
                container,
                marker,
                target,
            } => marked(root, container, marker).find_map(|elem| elem.first(target)),
            Locator::AfterLabel { tag, label, next } => {
                root.select_all(tag).into_iter().find_map(|elem| {
                    if elem.text_content() != label {
                        return None;
                    }
                    let sibling = elem.next_element()?;
                    sibling.is(next).then_some(sibling)
                })
            }
        }
    }
}

/// Reads the text at a locator. Missing elements and blank text are `None`.
pub fn extract_field<N: Node>(root: &N, locator: &Locator) -> Option<String> {
    let text = locator.resolve(root)?.text_content();
    (!text.is_empty()).then_some(text)
}

/// Every `container` below `root` that has a `marker` somewhere inside it.
pub fn marked<'n, N: Node + 'n>(
    root: &N,
    container: &str,
    marker: &'n str,
) -> impl Iterator<Item = N> + 'n {
    root.select_all(container)
        .into_iter()
        .filter(move |elem| elem.first(marker).is_some())
}

#[cfg(test)]
mod tests {
    use scraper::Html;

    use super::*;

    const PAGE: &str = r#"
        <html><body>
          <div class="about">
            <svg><path fill="url(#AboutIcon)"></path></svg>
            <div>Data</div>
          </div>
          <div class="company">
            <svg data-testid="ApartmentRoundedIcon"></svg>
            <h2>  Acme
              Analytics </h2>
          </div>
          <div class="details">
            <div>Type of work</div>
            <div>Full-time</div>
            <div>Experience</div>
            <span>Mid</span>
          </div>
        </body></html>
    "#;

    #[test]
    fn css() {
        let doc = Html::parse_document(PAGE);
        let root = doc.root_element();
        assert_eq!(
            extract_field(&root, &Locator::Css("div.company h2")).as_deref(),
            Some("Acme Analytics"),
        );
        assert_eq!(extract_field(&root, &Locator::Css("h1")), None);
    }

    #[test]
    fn after_marked() {
        let doc = Html::parse_document(PAGE);
        let locator = Locator::AfterMarked {
            container: "svg",
            marker: "path[fill*='AboutIcon']",
            next: "div",
        };
        assert_eq!(
            extract_field(&doc.root_element(), &locator).as_deref(),
            Some("Data"),
        );
    }

    #[test]
    fn inside_marked() {
        let doc = Html::parse_document(PAGE);
        let locator = Locator::InsideMarked {
            container: "div",
            marker: "svg[data-testid='ApartmentRoundedIcon']",
            target: "h2",
        };
        assert_eq!(
            extract_field(&doc.root_element(), &locator).as_deref(),
            Some("Acme Analytics"),
        );
    }

    #[test]
    fn after_label() {
        let doc = Html::parse_document(PAGE);
        let root = doc.root_element();
        let label = |label| Locator::AfterLabel {
            tag: "div",
            label,
            next: "div",
        };

        assert_eq!(
            extract_field(&root, &label("Type of work")).as_deref(),
            Some("Full-time"),
        );
        // The sibling after "Experience" is not a div.
        assert_eq!(extract_field(&root, &label("Experience")), None);
        assert_eq!(extract_field(&root, &label("Operating mode")), None);
    }

    #[test]
    fn invalid_selector_finds_nothing() {
        let doc = Html::parse_document(PAGE);
        assert!(doc.root_element().select_all("div[").is_empty());
        assert!(!doc.root_element().is("::"));
    }

    #[test]
    fn navigation() {
        let doc = Html::parse_document(PAGE);
        let root = doc.root_element();
        let details = root.first("div.details").unwrap();

        assert_eq!(details.element_children().len(), 4);
        let label = details.first("div").unwrap();
        assert_eq!(label.next_element().unwrap().text_content(), "Full-time");
        assert_eq!(
            label.parent_element().unwrap().attribute("class").as_deref(),
            Some("details"),
        );
    }
}
