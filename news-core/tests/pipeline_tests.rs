use news_core::pipeline::{dedup, filter_categories, finalize, sort_newest_first};
use news_core::settings::{NewsSettings, CATEGORY_WHITELIST_KEY};
use news_core::{parse_document, NewsItem, RawItem, SettingsMap};

fn item(title: &str, link: &str, created_at: Option<&str>) -> NewsItem {
    let mut raw: RawItem = [("title", title), ("link", link)].into_iter().collect();
    if let Some(date) = created_at {
        raw.insert("pubDate", date);
    }
    NewsItem::from_raw(&raw, 0).expect("item has a title")
}

fn whitelist(categories: &str) -> NewsSettings {
    let mut map = SettingsMap::new();
    map.insert(CATEGORY_WHITELIST_KEY.to_string(), categories.to_string());
    NewsSettings::resolve(&map)
}

#[test]
fn normalization_is_idempotent() {
    let xml = r#"<haberler><haber haber_id="5">
        <baslik>Borsa güne yükselişle başladı</baslik>
        <ozet>BIST 100 endeksi   güne yükselişle başladı.</ozet>
        <resim>https://cdn.test/a.jpg</resim>
        <tarih>2024-10-21 09:45:00</tarih>
        <haber_link>haber/ekonomi/borsa-5.html</haber_link>
    </haber></haberler>"#;
    let raw = parse_document(xml).unwrap();
    let first = NewsItem::from_raw(&raw[0], 0).unwrap();
    let second = NewsItem::from_raw(&raw[0], 0).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.id, 5);
    assert_eq!(first.image_url, "https://cdn.test/a.jpg");
    assert_eq!(first.link, "https://www.trthaber.com/haber/ekonomi/borsa-5.html");
    assert_eq!(first.category, "ekonomi");
}

#[test]
fn relative_link_is_absolutized_without_double_slashes() {
    let normalized = item("Örnek", "haber/ornek-123", None);
    assert_eq!(normalized.link, "https://www.trthaber.com/haber/ornek-123");
    assert!(!normalized.link.trim_start_matches("https://").contains("//"));
}

#[test]
fn slug_only_link_is_uncategorized_and_kept_by_default_whitelist() {
    let normalized = item("Örnek", "haber/ornek-123", None);
    assert_eq!(normalized.category, "");

    let kept = finalize(vec![normalized], &NewsSettings::default());
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].title, "Örnek");
}

#[test]
fn dedup_keeps_first_of_same_link_and_title() {
    let mut first = item("Faiz karari aciklandi", "https://x.test/1", None);
    first.body = "first body".into();
    let mut duplicate = item("  FAIZ KARARI ACIKLANDI ", "https://x.test/1", None);
    duplicate.body = "second body".into();
    let other_link = item("Faiz karari aciklandi", "https://y.test/1", None);

    let merged = dedup(vec![first.clone(), duplicate, other_link]);
    assert_eq!(merged.len(), 2);
    assert_eq!(merged[0], first);
    assert_eq!(merged[1].link, "https://y.test/1");
}

#[test]
fn uncategorized_items_survive_any_whitelist() {
    let settings = whitelist(r#"["nothing-matches"]"#);
    let items = vec![
        item("Plain", "https://x.test/news/1", None),
        item("Sports", "https://www.trthaber.com/haber/spor/1.html", None),
    ];
    let kept = filter_categories(items, &settings);
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].title, "Plain");
    assert!(kept[0].category.is_empty());
}

#[test]
fn categorized_items_need_a_whitelisted_category() {
    let settings = whitelist(r#"["EKONOMI"]"#);
    let items = vec![
        item("Eco", "https://www.trthaber.com/haber/ekonomi/1.html", None),
        item("Pol", "https://www.trthaber.com/haber/gundem/2.html", None),
    ];
    let kept = filter_categories(items, &settings);
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].title, "Eco");
}

#[test]
fn undated_items_sort_last_in_insertion_order() {
    let items = vec![
        item("undated-a", "https://x.test/a", None),
        item("old", "https://x.test/o", Some("Mon, 21 Oct 2024 07:00:00 GMT")),
        item("undated-b", "https://x.test/b", Some("sometime")),
        item("new", "https://x.test/n", Some("2024-10-21T09:00:00Z")),
    ];
    let titles: Vec<String> = sort_newest_first(items)
        .into_iter()
        .map(|item| item.title)
        .collect();
    assert_eq!(titles, vec!["new", "old", "undated-a", "undated-b"]);
}

#[test]
fn finalize_caps_after_filtering() {
    let mut map = SettingsMap::new();
    map.insert("news_max_items".into(), "2".into());
    map.insert(CATEGORY_WHITELIST_KEY.into(), r#"["ekonomi"]"#.into());
    let settings = NewsSettings::resolve(&map);

    let items = vec![
        item("spor", "https://www.trthaber.com/haber/spor/1", Some("2024-10-21T12:00:00Z")),
        item("a", "https://x.test/a", Some("2024-10-21T09:00:00Z")),
        item("b", "https://x.test/b", Some("2024-10-21T11:00:00Z")),
        item("c", "https://x.test/c", Some("2024-10-21T10:00:00Z")),
    ];
    let titles: Vec<String> = finalize(items, &settings)
        .into_iter()
        .map(|item| item.title)
        .collect();
    assert_eq!(titles, vec!["b", "c"]);
}
