use chrono::{DateTime, TimeZone, Utc};
use pretty_assertions::assert_eq;
use sitemapgen::{
    GeneratorOptions, NewsAccess, NewsGenre, NewsUrlOptions, Precision, Publication,
    SitemapGenerator, SitemapUrl, W3cDateFormat,
};
use sitemapgen_storage::MockDestination;

fn write_single(url: SitemapUrl) -> String {
    let options = GeneratorOptions {
        date_format: W3cDateFormat::new(Precision::Second),
        ..GeneratorOptions::news()
    };
    let mut generator =
        SitemapGenerator::with_options("http://www.example.com", MockDestination::new(), options)
            .unwrap();
    generator.add_url(url).unwrap();

    let output = generator.write().unwrap();
    assert_eq!(output.sitemaps.len(), 1, "too many files: {output:?}");
    assert_eq!(output.sitemaps[0].name, "sitemap.xml");
    assert!(output.index.is_none());
    generator.destination().read_to_string("sitemap.xml").unwrap()
}

fn crisis_averted() -> NewsUrlOptions {
    NewsUrlOptions::new(
        "Crisis Averted",
        "http://www.example.com/index.html",
        Publication::new("Fox News", "en").unwrap(),
        DateTime::<Utc>::UNIX_EPOCH,
    )
    .unwrap()
}

#[test]
fn test_required_fields() {
    let sitemap = write_single(crisis_averted().build().unwrap());

    let expected = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
        <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\" xmlns:news=\"http://www.google.com/schemas/sitemap-news/0.9\" >\n\
        \x20 <url>\n\
        \x20   <loc>http://www.example.com/index.html</loc>\n\
        \x20   <news:news>\n\
        \x20     <news:publication>\n\
        \x20       <news:name>Fox News</news:name>\n\
        \x20       <news:language>en</news:language>\n\
        \x20     </news:publication>\n\
        \x20     <news:publication_date>1970-01-01T00:00:00Z</news:publication_date>\n\
        \x20     <news:title>Crisis Averted</news:title>\n\
        \x20   </news:news>\n\
        \x20 </url>\n\
        </urlset>";
    assert_eq!(sitemap, expected);
}

#[test]
fn test_all_fields() {
    let url = crisis_averted()
        .keywords(["Klaatu", "Barrata", "Nicto"])
        .access(NewsAccess::Subscription)
        .genres([NewsGenre::Blog, NewsGenre::PressRelease])
        .build()
        .unwrap();
    let sitemap = write_single(url);

    let expected = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
        <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\" xmlns:news=\"http://www.google.com/schemas/sitemap-news/0.9\" >\n\
        \x20 <url>\n\
        \x20   <loc>http://www.example.com/index.html</loc>\n\
        \x20   <news:news>\n\
        \x20     <news:publication>\n\
        \x20       <news:name>Fox News</news:name>\n\
        \x20       <news:language>en</news:language>\n\
        \x20     </news:publication>\n\
        \x20     <news:access>Subscription</news:access>\n\
        \x20     <news:genres>Blog, PressRelease</news:genres>\n\
        \x20     <news:publication_date>1970-01-01T00:00:00Z</news:publication_date>\n\
        \x20     <news:title>Crisis Averted</news:title>\n\
        \x20     <news:keywords>Klaatu, Barrata, Nicto</news:keywords>\n\
        \x20   </news:news>\n\
        \x20 </url>\n\
        </urlset>";
    assert_eq!(sitemap, expected);
}

#[test]
fn test_keyword_list_splits_and_trims() {
    let url = crisis_averted()
        .keyword_list(" Klaatu ,Barrata,, Nicto")
        .build()
        .unwrap();
    let sitemap = write_single(url);

    assert!(sitemap.contains("<news:keywords>Klaatu, Barrata, Nicto</news:keywords>"));
}

#[test]
fn test_news_file_limit_is_one_thousand() {
    let mut generator =
        SitemapGenerator::with_options("http://www.example.com", MockDestination::new(), GeneratorOptions::news())
            .unwrap();
    let publication = Publication::new("Fox News", "en").unwrap();
    for i in 0..1001 {
        generator
            .add_url(
                NewsUrlOptions::new(
                    format!("Story {i}"),
                    &format!("http://www.example.com/story/{i}"),
                    publication.clone(),
                    DateTime::<Utc>::UNIX_EPOCH,
                )
                .unwrap()
                .build()
                .unwrap(),
            )
            .unwrap();
    }

    let output = generator.write().unwrap();
    let counts: Vec<usize> = output.sitemaps.iter().map(|f| f.url_count).collect();
    assert_eq!(counts, vec![1000, 1]);
    assert_eq!(
        generator.destination().names(),
        vec!["sitemap1.xml", "sitemap2.xml", "sitemap_index.xml"]
    );
}

#[test]
fn test_blank_keywords_render_no_tag() {
    let url = crisis_averted().keywords(["", "  "]).build().unwrap();
    assert!(url.news().unwrap().keywords().is_empty());

    let sitemap = write_single(url);

    assert!(!sitemap.contains("news:keywords"));
}

#[test]
fn test_index_lastmod_from_publication_date() {
    let options = GeneratorOptions {
        max_urls: 1,
        date_format: W3cDateFormat::new(Precision::Second),
        ..GeneratorOptions::news()
    };
    let mut generator =
        SitemapGenerator::with_options("http://www.example.com", MockDestination::new(), options)
            .unwrap();
    let publication = Publication::new("Fox News", "en").unwrap();
    let published = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
    for i in 0..2 {
        generator
            .add_url(
                NewsUrlOptions::new(
                    format!("Story {i}"),
                    &format!("http://www.example.com/story/{i}"),
                    publication.clone(),
                    published,
                )
                .unwrap()
                .build()
                .unwrap(),
            )
            .unwrap();
    }

    let output = generator.write().unwrap();

    let lastmods: Vec<_> = output.sitemaps.iter().map(|f| f.last_modified).collect();
    assert_eq!(lastmods, vec![Some(published), Some(published)]);
    let index = generator
        .destination()
        .read_to_string("sitemap_index.xml")
        .unwrap();
    assert_eq!(index.matches("<lastmod>2024-01-02T03:04:05Z</lastmod>").count(), 2);
}
