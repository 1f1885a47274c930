//! Server-rendered HTML for the employee pages.
//!
//! - **Login** (`/employee-login`): password form that posts back to itself
//! - **Quote builder** (`/quote-builder`): design/size/cases form plus the
//!   estimate for the current selection
//!
//! Uses [maud](https://maud.lambda.xyz/) so every interpolated value is
//! escaped.

use crate::auth::LOGIN_PATH;
use crate::quote::{
    DESIGNS, Dollars, MIN_CASES, Quote, QuoteError, QuoteRequest, effective_cases, find_design,
    group_thousands,
};
use maud::{DOCTYPE, Markup, html};

const CSS: &str = "\
body{font-family:system-ui,sans-serif;margin:0;background:#f6f4ef;color:#222}\
main{max-width:40rem;margin:3rem auto;padding:0 1rem}\
h1{font-size:1.6rem}\
form{display:grid;gap:.75rem;margin:1.5rem 0}\
label{display:grid;gap:.25rem;font-weight:600}\
input,select,button{font:inherit;padding:.5rem}\
button{background:#2d5b3a;color:#fff;border:0;cursor:pointer}\
.error{color:#a11;font-weight:600}\
.note{color:#666;font-size:.9rem}\
table.estimate{width:100%;border-collapse:collapse}\
table.estimate th,table.estimate td{text-align:left;padding:.4rem;border-bottom:1px solid #ddd}\
tr.total td,tr.total th{font-weight:700}";

/// Renders the base HTML document structure
fn base_document(title: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                meta name="robots" content="noindex";
                title { (title) " | Bagco" }
                style { (CSS) }
            }
            body {
                main { (content) }
            }
        }
    }
}

/// Employee login form. `next` is carried through as a hidden field.
pub fn login_page(next: &str, error: Option<&str>) -> Markup {
    let content = html! {
        h1 { "Employee Login" }
        p.note { "Enter the team password to open the quote builder." }
        @if let Some(message) = error {
            p.error role="alert" { (message) }
        }
        form method="post" action=(LOGIN_PATH) {
            input type="hidden" name="next" value=(next);
            label {
                "Password"
                input type="password" name="password" autocomplete="current-password" required autofocus;
            }
            button type="submit" { "Sign in" }
        }
    };
    base_document("Employee Login", content)
}

/// Quote builder form with the estimate for `request`.
pub fn quote_builder_page(request: &QuoteRequest, result: &Result<Quote, QuoteError>) -> Markup {
    let sizes = find_design(&request.design)
        .map(|d| d.sizes())
        .unwrap_or_default();
    let selected_size = match result {
        Ok(q) => q.size.as_str(),
        Err(_) => request.size.as_str(),
    };

    let content = html! {
        h1 { "Quote Builder" }
        form method="get" action="/quote-builder" {
            label {
                "Design"
                select name="design" {
                    @for design in DESIGNS {
                        option value=(design.id)
                            selected[design.id.eq_ignore_ascii_case(request.design.trim())] {
                            (design.label)
                        }
                    }
                }
            }
            label {
                "Size"
                select name="size" {
                    @for size in &sizes {
                        option value=(size) selected[*size == selected_size] { "#" (size) }
                    }
                }
            }
            label {
                "Cases (minimum " (MIN_CASES) ")"
                input type="number" name="cases" min=(MIN_CASES) step="1"
                    value=(effective_cases(request.cases));
            }
            label {
                input type="checkbox" name="reorder" value="true" checked[request.reorder];
                "Reorder (no setup fee)"
            }
            button type="submit" { "Update estimate" }
        }
        @match result {
            Ok(quote) => {
                (estimate_table(quote))
            }
            Err(err) => {
                p.error { (err.to_string()) }
            }
        }
    };
    base_document("Quote Builder", content)
}

fn estimate_table(quote: &Quote) -> Markup {
    html! {
        @if quote.size_substituted {
            p.note { "Size #" (quote.size) " substituted: the requested size is not offered for " (quote.design) "." }
        }
        table.estimate {
            tr { th { "Design" } td { (quote.design) } }
            tr { th { "Size" } td { "#" (quote.size) " (" (quote.dimensions) ")" } }
            tr { th { "Cases" } td { (quote.cases) } }
            tr { th { "Bags" } td { (group_thousands(quote.units)) } }
            tr { th { "Price per case" } td { (Dollars(quote.case_price_cents).to_string()) } }
            tr { th { "Subtotal" } td { (Dollars(quote.subtotal_cents).to_string()) } }
            @if quote.setup_fee_cents > 0 {
                tr { th { "Art/plate setup" } td { (Dollars(quote.setup_fee_cents).to_string()) } }
            }
            tr.total { th { "Estimated total" } td { (Dollars(quote.total_cents).to_string()) } }
        }
        p.note { "Estimates exclude freight and tax. Final pricing is confirmed by the sales team." }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quote::quote;

    fn request(design: &str, size: &str, cases: f64, reorder: bool) -> QuoteRequest {
        QuoteRequest {
            design: design.to_string(),
            size: size.to_string(),
            cases,
            reorder,
        }
    }

    #[test]
    fn base_document_includes_doctype() {
        let doc = base_document("Test", html! { p { "test" } }).into_string();
        assert!(doc.starts_with("<!DOCTYPE html>"));
        assert!(doc.contains("<title>Test | Bagco</title>"));
    }

    #[test]
    fn login_page_carries_next_and_posts_back() {
        let page = login_page("/quote-builder/estimate", None).into_string();
        assert!(page.contains(r#"action="/employee-login""#));
        assert!(page.contains(r#"name="next" value="/quote-builder/estimate""#));
        assert!(!page.contains("role=\"alert\""));
    }

    #[test]
    fn login_page_shows_error() {
        let page = login_page("/quote-builder", Some("Invalid password")).into_string();
        assert!(page.contains("Invalid password"));
    }

    #[test]
    fn login_page_escapes_next() {
        let page = login_page("/\"><script>", None).into_string();
        assert!(!page.contains("<script>"));
    }

    #[test]
    fn quote_page_shows_totals() {
        let req = request("GS", "25", 4.0, false);
        let page = quote_builder_page(&req, &quote(&req)).into_string();
        assert!(page.contains("$263.64"));
        assert!(page.contains("Art/plate setup"));
        assert!(page.contains("$313.64"));
        assert!(page.contains("8,000"));
    }

    #[test]
    fn quote_page_reorder_hides_setup_fee() {
        let req = request("GS", "25", 4.0, true);
        let page = quote_builder_page(&req, &quote(&req)).into_string();
        assert!(!page.contains("Art/plate setup"));
    }

    #[test]
    fn quote_page_lists_only_design_sizes() {
        let req = request("PlasticGS", "32", 4.0, false);
        let page = quote_builder_page(&req, &quote(&req)).into_string();
        assert!(page.contains(r#"<option value="35">"#));
        assert!(!page.contains(r#"<option value="21""#));
    }

    #[test]
    fn quote_page_cases_input_shows_billed_count() {
        for (cases, shown) in [(f64::INFINITY, "4"), (f64::NAN, "4"), (1.0, "4"), (10.7, "10")] {
            let req = request("DS", "25", cases, false);
            let page = quote_builder_page(&req, &quote(&req)).into_string();
            assert!(
                page.contains(&format!(r#"name="cases" min="4" step="1" value="{shown}""#)),
                "cases={cases}"
            );
            assert!(!page.contains(r#"value="inf""#));
        }
    }

    #[test]
    fn quote_page_reports_unknown_design() {
        let req = request("XL", "25", 4.0, false);
        let page = quote_builder_page(&req, &quote(&req)).into_string();
        assert!(page.contains("Unknown bag design: XL"));
        assert!(!page.contains("Estimated total"));
    }
}
