//! HTML rendering for the gallery page.

use crate::models::GalleryItem;
use maud::{DOCTYPE, Markup, html};

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; margin: 2rem; background: #fafafa; color: #222; }
header { display: flex; flex-wrap: wrap; gap: 2rem; align-items: flex-end; margin-bottom: 2rem; }
.grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(220px, 1fr)); gap: 1rem; }
.card { background: #fff; border: 1px solid #ddd; border-radius: 6px; padding: .75rem; }
.card img { display: block; max-width: 200px; max-height: 200px; margin: 0 auto .5rem; }
.card dl { display: grid; grid-template-columns: auto 1fr; gap: .1rem .5rem; margin: 0; font-size: .85rem; }
.card dt { color: #777; }
.empty { color: #777; }
"#;

/// Full gallery page: search form, upload form, one card per item.
pub fn gallery_page(items: &[GalleryItem], search: Option<&str>) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { "Photo Gallery" }
                style { (maud::PreEscaped(STYLE)) }
            }
            body {
                header {
                    h1 { "Photo Gallery" }
                    form method="get" action="/" {
                        input type="search" name="search" placeholder="Camera model"
                            value=(search.unwrap_or_default());
                        button type="submit" { "Search" }
                        @if search.is_some_and(|s| !s.is_empty()) {
                            " " a href="/" { "Clear" }
                        }
                    }
                    form method="post" action="/upload" enctype="multipart/form-data" {
                        input type="file" name="photos" accept="image/*" multiple;
                        button type="submit" { "Upload" }
                    }
                }
                @if items.is_empty() {
                    p.empty { "No images yet." }
                } @else {
                    section.grid {
                        @for item in items {
                            (card(item))
                        }
                    }
                }
            }
        }
    }
}

fn card(item: &GalleryItem) -> Markup {
    html! {
        figure.card {
            a href=(item.original_url) {
                img src=(item.thumbnail_url) alt=(item.name) loading="lazy";
            }
            figcaption {
                strong { (item.name) }
                dl {
                    dt { "Camera" } dd { (item.camera) }
                    dt { "Make" } dd { (item.make) }
                    dt { "Taken" } dd { (item.date) }
                }
            }
        }
    }
}
