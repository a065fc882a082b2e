use serde::Deserialize;
use sm_core::ScrollmarkError;
use sm_core::ScrollmarkResult;

/// One source paragraph. `lt`/`ru` are accepted for `text`/`translation`;
/// other keys are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Paragraph {
    pub chapter: String,
    pub article: String,
    #[serde(alias = "lt")]
    pub text: String,
    #[serde(alias = "ru", default)]
    pub translation: String,
}

/// Parses a JSON array of paragraphs.
pub fn parse_paragraphs(json: &str) -> ScrollmarkResult<Vec<Paragraph>> {
    serde_json::from_str(json)
        .map_err(|error| ScrollmarkError::new("page.paragraphs.invalid_json", error.to_string()))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Reference {
    pub label: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    pub title: String,
    pub lang: String,
    /// Language of the optional translation line.
    pub translation_lang: String,
    /// Script included at the end of `<body>`.
    pub script: Option<String>,
    pub references_title: String,
    pub references: Vec<Reference>,
    pub credits: Option<Reference>,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            title: "Scrollmark".to_owned(),
            lang: "lt".to_owned(),
            translation_lang: "ru".to_owned(),
            script: None,
            references_title: "References".to_owned(),
            references: Vec::new(),
            credits: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardKind {
    /// Cards of the first chapter.
    Title,
    Article,
    /// Closing card with references and credits.
    References,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub text: String,
    pub translation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub kind: CardKind,
    pub chapter: String,
    pub article: String,
    pub lines: Vec<Line>,
}

impl Card {
    /// Label used for the card's table-of-contents entry.
    pub fn toc_label<'a>(&'a self, references_title: &'a str) -> &'a str {
        match self.kind {
            CardKind::Title => &self.chapter,
            CardKind::Article if self.article.is_empty() => &self.chapter,
            CardKind::Article => &self.article,
            CardKind::References => references_title,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewModel {
    pub config: PageConfig,
    pub stylesheet: String,
    pub cards: Vec<Card>,
}

impl ViewModel {
    /// Groups paragraphs by chapter and then by article, both in first-seen
    /// order, and appends the references card. The card index is its id.
    pub fn build(config: &PageConfig, stylesheet: impl Into<String>, paragraphs: &[Paragraph]) -> Self {
        let mut chapters: Vec<(&str, Vec<(&str, Vec<&Paragraph>)>)> = Vec::new();
        for paragraph in paragraphs {
            let chapter_index = match chapters
                .iter()
                .position(|(chapter, _)| *chapter == paragraph.chapter)
            {
                Some(index) => index,
                None => {
                    chapters.push((paragraph.chapter.as_str(), Vec::new()));
                    chapters.len() - 1
                }
            };

            let articles = &mut chapters[chapter_index].1;
            match articles
                .iter_mut()
                .find(|(article, _)| *article == paragraph.article)
            {
                Some((_, group)) => group.push(paragraph),
                None => articles.push((paragraph.article.as_str(), vec![paragraph])),
            }
        }

        let mut cards = Vec::new();
        for (chapter_index, (chapter, articles)) in chapters.into_iter().enumerate() {
            let kind = if chapter_index == 0 {
                CardKind::Title
            } else {
                CardKind::Article
            };
            for (article, group) in articles {
                cards.push(Card {
                    kind,
                    chapter: chapter.to_owned(),
                    article: article.to_owned(),
                    lines: group
                        .into_iter()
                        .map(|paragraph| Line {
                            text: paragraph.text.clone(),
                            translation: Some(paragraph.translation.clone())
                                .filter(|translation| !translation.is_empty()),
                        })
                        .collect(),
                });
            }
        }

        cards.push(Card {
            kind: CardKind::References,
            chapter: String::new(),
            article: String::new(),
            lines: Vec::new(),
        });

        Self {
            config: config.clone(),
            stylesheet: stylesheet.into(),
            cards,
        }
    }
}
