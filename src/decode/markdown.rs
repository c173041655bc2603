use super::{DecodeError, Decoder};
use pulldown_cmark::{Parser, html as md_html};

/// CommonMark to HTML. Never fails: any text is valid Markdown.
#[derive(Debug, Clone, Copy, Default)]
pub struct Markdown;

impl Decoder for Markdown {
    fn decode(&self, body: &str) -> Result<String, DecodeError> {
        let parser = Parser::new(body);
        let mut html = String::new();
        md_html::push_html(&mut html, parser);
        Ok(html)
    }
}
