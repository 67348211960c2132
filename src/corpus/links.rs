use std::collections::HashMap;

use html_escape::decode_html_entities;
use lol_html::{element, rewrite_str, RewriteStrSettings};

use crate::app::{BinderyError, Result};
use crate::corpus::Corpus;

/// Point every internal link at the local file of the post it references.
///
/// Runs over the whole corpus at once: posts link forwards as well as
/// backwards, and older posts get edited to link to newer ones. Returns the
/// number of rewritten links. Running it again is a no-op since local names
/// never equal a remote URL.
pub fn rewrite_links(corpus: &mut Corpus) -> Result<usize> {
    let targets: HashMap<String, String> = corpus
        .iter()
        .map(|post| (post.remote_url.clone(), post.local_name.clone()))
        .collect();

    tracing::info!("Rewriting post links across {} posts", targets.len());

    let mut total = 0;
    for post in corpus.posts_mut() {
        let (body, count) = rewrite_body(&post.body, &targets)?;
        if count > 0 {
            tracing::debug!("{}: {} links rewritten", post.local_name, count);
            post.body = body;
            total += count;
        }
    }

    Ok(total)
}

/// Rewrite the `href` of each `<a>` whose value is a key of `targets`.
///
/// The attribute is compared after entity decoding, otherwise literally: no
/// trailing slash, scheme, query or fragment normalization. Everything but
/// the matched `href` values is passed through untouched.
pub fn rewrite_body(html: &str, targets: &HashMap<String, String>) -> Result<(String, usize)> {
    let mut count = 0;

    let output = rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![element!("a[href]", |el| {
                if let Some(raw) = el.get_attribute("href") {
                    let href = decode_html_entities(&raw);
                    if let Some(local) = targets.get(&*href) {
                        el.set_attribute("href", local)?;
                        count += 1;
                    }
                }
                Ok(())
            })],
            ..RewriteStrSettings::new()
        },
    )
    .map_err(|e| BinderyError::Rewrite(e.to_string()))?;

    Ok((output, count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::CorpusBuilder;
    use crate::domain::FeedItem;

    const U1: &str = "https://blog.example.com/2011/first/";
    const U2: &str = "https://blog.example.com/2011/second/";
    const U3: &str = "https://blog.example.com/2012/third/";

    fn item(url: &str, body: &str) -> FeedItem {
        FeedItem {
            title: url.into(),
            url: url.into(),
            body: body.into(),
            date: String::new(),
            author: String::new(),
        }
    }

    fn corpus(items: Vec<FeedItem>) -> Corpus {
        let mut builder = CorpusBuilder::new();
        builder.extend(items);
        builder.finish()
    }

    fn targets() -> HashMap<String, String> {
        HashMap::from([(U2.to_string(), "p0001.html".to_string())])
    }

    #[test]
    fn test_link_rewritten_text_unchanged() {
        let html = format!(r#"<p>Read <a href="{}">text</a> first.</p>"#, U2);
        let (out, count) = rewrite_body(&html, &targets()).unwrap();
        assert_eq!(out, r#"<p>Read <a href="p0001.html">text</a> first.</p>"#);
        assert_eq!(count, 1);
    }

    #[test]
    fn test_other_attributes_and_markup_preserved() {
        let html = format!(
            r#"<a class="internal" href="{}" title="Second &amp; more">the <em>second</em> post</a>"#,
            U2
        );
        let (out, _) = rewrite_body(&html, &targets()).unwrap();
        assert_eq!(
            out,
            r#"<a class="internal" href="p0001.html" title="Second &amp; more">the <em>second</em> post</a>"#
        );
    }

    #[test]
    fn test_entity_encoded_href_matches() {
        let url = "https://blog.example.com/?p=12&lang=en";
        let targets = HashMap::from([(url.to_string(), "p0007.html".to_string())]);
        let html = r#"<a href="https://blog.example.com/?p=12&amp;lang=en">x</a>"#;

        let (out, count) = rewrite_body(html, &targets).unwrap();
        assert_eq!(out, r#"<a href="p0007.html">x</a>"#);
        assert_eq!(count, 1);
    }

    #[test]
    fn test_matching_is_exact() {
        let variants = [
            "https://blog.example.com/2011/second",
            "http://blog.example.com/2011/second/",
            "https://blog.example.com/2011/second/#comments",
            "https://blog.example.com/2011/second/?replytocom=5",
        ];
        for variant in variants {
            let html = format!(r#"<a href="{}">x</a>"#, variant);
            let (out, count) = rewrite_body(&html, &targets()).unwrap();
            assert_eq!(out, html, "{} should not be rewritten", variant);
            assert_eq!(count, 0);
        }
    }

    #[test]
    fn test_only_anchor_hrefs_are_touched() {
        let html = format!(
            r#"<p>{u}</p><img src="{u}"><a name="top">{u}</a><link href="{u}">"#,
            u = U2
        );
        let (out, count) = rewrite_body(&html, &targets()).unwrap();
        assert_eq!(out, html);
        assert_eq!(count, 0);
    }

    #[test]
    fn test_multiple_links_on_one_line() {
        let html = format!(
            r#"<a href="{u}">one</a> and <a href="https://elsewhere.com/">out</a> and <a href="{u}">two</a>"#,
            u = U2
        );
        let (out, count) = rewrite_body(&html, &targets()).unwrap();
        assert_eq!(
            out,
            r#"<a href="p0001.html">one</a> and <a href="https://elsewhere.com/">out</a> and <a href="p0001.html">two</a>"#
        );
        assert_eq!(count, 2);
    }

    #[test]
    fn test_unclosed_markup_is_tolerated() {
        let html = format!(r#"<p><a href="{}">dangling"#, U2);
        let (out, count) = rewrite_body(&html, &targets()).unwrap();
        assert_eq!(out, r#"<p><a href="p0001.html">dangling"#);
        assert_eq!(count, 1);
    }

    #[test]
    fn test_forward_backward_and_self_references() {
        let mut corpus = corpus(vec![
            item(U1, &format!(r#"<a href="{}">later</a>"#, U3)),
            item(U2, &format!(r#"<a href="{}">me</a> <a href="{}">before</a>"#, U2, U1)),
            item(U3, "<p>no links</p>"),
        ]);

        let count = rewrite_links(&mut corpus).unwrap();

        assert_eq!(count, 3);
        assert_eq!(corpus.get(U1).unwrap().body, r#"<a href="p0002.html">later</a>"#);
        assert_eq!(
            corpus.get(U2).unwrap().body,
            r#"<a href="p0001.html">me</a> <a href="p0000.html">before</a>"#
        );
        assert_eq!(corpus.get(U3).unwrap().body, "<p>no links</p>");
    }

    #[test]
    fn test_rewrite_is_idempotent() {
        let mut corpus = corpus(vec![
            item(U1, &format!(r#"<a href="{}">2</a> <a href="{}">3</a>"#, U2, U3)),
            item(U2, &format!(r#"<a href="{}">1</a>"#, U1)),
            item(U3, ""),
        ]);

        rewrite_links(&mut corpus).unwrap();
        let once: Vec<String> = corpus.iter().map(|p| p.body.clone()).collect();

        let second = rewrite_links(&mut corpus).unwrap();
        let twice: Vec<String> = corpus.iter().map(|p| p.body.clone()).collect();

        assert_eq!(second, 0);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_links_outside_corpus_untouched() {
        let body = r#"<a href="https://blog.example.com/2013/never-fetched/">?</a>"#;
        let mut corpus = corpus(vec![item(U1, body)]);

        assert_eq!(rewrite_links(&mut corpus).unwrap(), 0);
        assert_eq!(corpus.get(U1).unwrap().body, body);
    }
}
