use chrono::NaiveDate;

use crate::html::{escape, indent, PageShell};
use crate::markdown;
use crate::models::Article;

/// Renders the complete HTML document for one article.
pub fn render_article(shell: &PageShell, article: &Article) -> String {
    let body = markdown::to_html(&article.body);

    let mut content = String::new();
    content.push_str("<article>\n");
    content.push_str(&format!("  <h1>{}</h1>\n", escape(&article.title)));
    if let Some(byline) = byline(article) {
        content.push_str(&format!("  <p class=\"byline\">{byline}</p>\n"));
    }
    if !body.trim().is_empty() {
        content.push_str(&format!("  {}\n", indent(&body, 1)));
    }
    content.push_str("</article>\n");
    content.push_str("<nav>\n  <a href=\"index.html\">&larr; All articles</a>\n</nav>\n");

    shell.render(Some(article.title.as_str()), &content)
}

/// Renders the listing page linking every article, newest first.
pub fn render_index(shell: &PageShell, articles: &[Article]) -> String {
    let mut content = format!("<h1>{}</h1>\n", escape(shell.site_title()));

    if articles.is_empty() {
        content.push_str("<p>No articles yet.</p>\n");
        return shell.render(None, &content);
    }

    content.push_str("<ul class=\"articles\">\n");
    for article in newest_first(articles) {
        content.push_str(&format!(
            "  <li><a href=\"{}\">{}</a>",
            escape(&article.filename),
            escape(&article.title)
        ));
        if let Some(date) = article.created {
            content.push_str(&format!(" {}", time_tag(date)));
        }
        content.push_str("</li>\n");
    }
    content.push_str("</ul>\n");

    shell.render(None, &content)
}

/// Dated articles by date descending, then undated, each group by slug
/// descending.
fn newest_first(articles: &[Article]) -> Vec<&Article> {
    let mut sorted: Vec<&Article> = articles.iter().collect();
    // `None` sorts below every date, so undated articles land last
    sorted.sort_by(|a, b| (b.created, &b.slug).cmp(&(a.created, &a.slug)));
    sorted
}

fn byline(article: &Article) -> Option<String> {
    let author = article.author.as_deref().map(|a| format!("By {}", escape(a)));
    let date = article.created.map(time_tag);

    match (author, date) {
        (Some(author), Some(date)) => Some(format!("{author} &middot; {date}")),
        (Some(only), None) | (None, Some(only)) => Some(only),
        (None, None) => None,
    }
}

fn time_tag(date: NaiveDate) -> String {
    format!(
        "<time datetime=\"{}\">{}</time>",
        date.format("%Y-%m-%d"),
        date.format("%B %-d, %Y")
    )
}

/// `(href, text)` of every article link on a rendered index page.
#[cfg(test)]
pub(crate) fn index_links(page: &str) -> Vec<(String, String)> {
    use scraper::{Html, Selector};

    let doc = Html::parse_document(page);
    let selector = Selector::parse("ul.articles a").unwrap();
    doc.select(&selector)
        .map(|a| {
            (
                a.value().attr("href").unwrap_or_default().to_string(),
                a.text().collect(),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SiteConfig;

    fn shell() -> PageShell {
        let config = SiteConfig {
            author: Some("Ada".to_string()),
            ..SiteConfig::default()
        };
        PageShell::new(&config, 2024)
    }

    fn article(slug: &str, title: &str, created: Option<NaiveDate>) -> Article {
        Article {
            title: title.to_string(),
            author: Some("Ada".to_string()),
            created,
            slug: slug.to_string(),
            filename: format!("{slug}.html"),
            body: "Body text".to_string(),
        }
    }

    #[test]
    fn article_page_has_title_byline_and_body() {
        let page = render_article(
            &shell(),
            &article("2024-01-01", "Hello", NaiveDate::from_ymd_opt(2024, 1, 1)),
        );

        assert!(page.contains("<h1>Hello</h1>"));
        assert!(page.contains("<p>Body text</p>"));
        assert!(page.contains("<title>Hello | Blog</title>"));
        assert!(page.contains(
            "By Ada &middot; <time datetime=\"2024-01-01\">January 1, 2024</time>"
        ));
        assert!(page.contains("<a href=\"index.html\">&larr; All articles</a>"));
    }

    #[test]
    fn article_page_escapes_title() {
        let page = render_article(&shell(), &article("x", "<script> & co", None));
        assert!(page.contains("<h1>&lt;script&gt; &amp; co</h1>"));
        assert!(!page.contains("<script>"));
    }

    #[test]
    fn article_without_author_or_date_has_no_byline() {
        let mut bare = article("notes", "Notes", None);
        bare.author = None;
        let page = render_article(&shell(), &bare);
        assert!(!page.contains("byline"));
    }

    #[test]
    fn title_only_article_has_no_empty_body_line() {
        let mut empty = article("notes", "Notes", None);
        empty.body = String::new();
        let page = render_article(&shell(), &empty);
        assert!(page.contains("<h1>Notes</h1>\n        <p class=\"byline\">By Ada</p>\n      </article>"));
    }

    #[test]
    fn index_links_every_article_newest_first() {
        let articles = vec![
            article("2023-05-01", "Older", NaiveDate::from_ymd_opt(2023, 5, 1)),
            article("about-me", "About", None),
            article("2024-01-01", "Hello", NaiveDate::from_ymd_opt(2024, 1, 1)),
        ];
        let page = render_index(&shell(), &articles);

        assert_eq!(
            index_links(&page),
            vec![
                ("2024-01-01.html".to_string(), "Hello".to_string()),
                ("2023-05-01.html".to_string(), "Older".to_string()),
                ("about-me.html".to_string(), "About".to_string()),
            ]
        );
        assert!(page.contains("<title>Blog</title>"));
    }

    #[test]
    fn index_order_does_not_depend_on_input_order() {
        let mut articles = vec![
            article("b", "B", None),
            article("a", "A", None),
            article("2024-01-01", "Hello", NaiveDate::from_ymd_opt(2024, 1, 1)),
        ];
        let first = render_index(&shell(), &articles);
        articles.reverse();
        assert_eq!(first, render_index(&shell(), &articles));
    }

    #[test]
    fn empty_index_says_so() {
        let page = render_index(&shell(), &[]);
        assert!(page.contains("<p>No articles yet.</p>"));
        assert!(index_links(&page).is_empty());
    }
}
