use crate::model::Card;
use crate::model::CardKind;
use crate::model::Line;
use crate::model::Reference;
use crate::model::ViewModel;

/// Renders the complete card page: table of contents first, then one
/// `div.card` per card with the card index as its id.
pub fn render_page(view: &ViewModel) -> String {
    let config = &view.config;
    let mut page = Markup::default();

    page.raw("<!DOCTYPE html>\n");
    page.open("html", &[("lang", config.lang.as_str())]);
    page.open("head", &[]);
    page.void("meta", &[("charset", "utf-8")]);
    page.void(
        "meta",
        &[
            ("name", "viewport"),
            (
                "content",
                "width=device-width, initial-scale=1.0, viewport-fit=cover",
            ),
        ],
    );
    page.element("title", &[], &config.title);
    page.open("style", &[]);
    page.raw(&view.stylesheet);
    page.raw("\n");
    page.close("style");
    page.close("head");

    page.open("body", &[]);
    page.open("nav", &[("class", "toc")]);
    for (index, card) in view.cards.iter().enumerate() {
        let href = format!("#{index}");
        page.element(
            "a",
            &[("class", "toc-article"), ("href", href.as_str())],
            card.toc_label(&config.references_title),
        );
    }
    page.close("nav");

    page.open("div", &[("class", "container")]);
    for (index, card) in view.cards.iter().enumerate() {
        render_card(&mut page, view, index, card);
    }
    page.close("div");

    if let Some(script) = &config.script {
        page.open("script", &[("src", script.as_str()), ("defer", "")]);
        page.close("script");
    }
    page.close("body");
    page.close("html");

    page.finish()
}

fn render_card(page: &mut Markup, view: &ViewModel, index: usize, card: &Card) {
    let id = index.to_string();
    match card.kind {
        CardKind::Title => {
            page.open("div", &[("id", id.as_str()), ("class", "card title-card")]);
            page.element("h1", &[], &card.chapter);
            render_lines(page, view, index, &card.lines);
        }
        CardKind::Article => {
            page.open("div", &[("id", id.as_str()), ("class", "card")]);
            page.element("h2", &[("class", "chapter-title")], &card.chapter);
            page.element("h3", &[("class", "article-number")], &card.article);
            render_lines(page, view, index, &card.lines);
        }
        CardKind::References => {
            let config = &view.config;
            page.open(
                "div",
                &[("id", id.as_str()), ("class", "card title-card references-card")],
            );
            page.open("div", &[("class", "references-section")]);
            page.element("h2", &[("class", "references-title")], &config.references_title);
            page.open("div", &[("class", "references-list")]);
            for reference in &config.references {
                render_link(page, reference);
            }
            page.close("div");
            page.close("div");
            if let Some(credits) = &config.credits {
                page.open("div", &[("class", "credits-section")]);
                render_link(page, credits);
                page.close("div");
            }
        }
    }
    page.close("div");
}

fn render_lines(page: &mut Markup, view: &ViewModel, card_index: usize, lines: &[Line]) {
    page.open("div", &[("class", "article-text")]);
    for (line_index, line) in lines.iter().enumerate() {
        page.open("p", &[]);
        match &line.translation {
            Some(translation) => {
                let toggle = translate_toggle_id(line_index, card_index);
                page.void(
                    "input",
                    &[
                        ("class", "translate-toggle"),
                        ("id", toggle.as_str()),
                        ("type", "checkbox"),
                    ],
                );
                page.open("label", &[("class", "translatable"), ("for", toggle.as_str())]);
                page.element("span", &[("lang", view.config.lang.as_str())], &line.text);
                page.element(
                    "span",
                    &[("lang", view.config.translation_lang.as_str())],
                    translation,
                );
                page.close("label");
            }
            None => page.text(&line.text),
        }
        page.close("p");
    }
    page.close("div");
}

fn render_link(page: &mut Markup, reference: &Reference) {
    page.open("p", &[]);
    page.element("a", &[("href", reference.url.as_str())], &reference.label);
    page.close("p");
}

/// Id shared by a line's toggle checkbox and its label.
pub fn translate_toggle_id(line_index: usize, card_index: usize) -> String {
    format!("tr_{line_index}_{card_index}")
}

#[derive(Default)]
struct Markup {
    out: String,
}

impl Markup {
    fn open(&mut self, tag: &str, attrs: &[(&str, &str)]) {
        self.start_tag(tag, attrs, false);
        self.out.push('\n');
    }

    fn void(&mut self, tag: &str, attrs: &[(&str, &str)]) {
        self.start_tag(tag, attrs, true);
        self.out.push('\n');
    }

    fn close(&mut self, tag: &str) {
        self.out.push_str("</");
        self.out.push_str(tag);
        self.out.push_str(">\n");
    }

    /// `<tag>text</tag>` on one line.
    fn element(&mut self, tag: &str, attrs: &[(&str, &str)], text: &str) {
        self.start_tag(tag, attrs, false);
        self.out.push_str(&escape_text(text));
        self.close(tag);
    }

    fn text(&mut self, text: &str) {
        self.out.push_str(&escape_text(text));
        self.out.push('\n');
    }

    fn raw(&mut self, html: &str) {
        self.out.push_str(html);
    }

    fn start_tag(&mut self, tag: &str, attrs: &[(&str, &str)], self_closing: bool) {
        self.out.push('<');
        self.out.push_str(tag);
        for (name, value) in attrs {
            self.out.push(' ');
            self.out.push_str(name);
            if !value.is_empty() {
                self.out.push_str("=\"");
                self.out.push_str(&escape_attribute(value));
                self.out.push('"');
            }
        }
        self.out.push_str(if self_closing { " />" } else { ">" });
    }

    fn finish(self) -> String {
        self.out
    }
}

pub fn escape_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

pub fn escape_attribute(input: &str) -> String {
    escape_text(input).replace('"', "&quot;")
}
